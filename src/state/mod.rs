//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `LinkState`: where a single link is in the fetch, convert, write pipeline

mod link_state;

pub use link_state::LinkState;
