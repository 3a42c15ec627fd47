/// Link state definitions for tracking one link through the pipeline
///
/// This module defines every state a link can be in between being handed to
/// the crawler and having its outcome recorded.
use std::fmt;

/// Represents the current state of a link in the crawl pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    // ===== Active States =====
    /// Link is waiting for its task to start
    Pending,

    /// Page is being requested
    Fetching,

    /// Page was fetched and its metadata extracted
    Extracted,

    /// Page markup is being converted to Markdown
    Converting,

    /// Markdown is ready to be written
    Converted,

    /// Clipping is being written to disk
    Writing,

    // ===== Outcome States =====
    /// Fetch exceeded its deadline or the batch was cancelled
    TimedOut,

    /// Any stage failed for a reason other than a timeout
    Failed,

    /// Clipping was written successfully
    Written,

    // ===== Final State =====
    /// Outcome has been handed to the collector
    Recorded,
}

impl LinkState {
    /// Returns true if the pipeline has stopped for this link
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::TimedOut | Self::Failed | Self::Written | Self::Recorded
        )
    }

    /// Returns true if the link is still moving through the pipeline
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Written)
    }

    /// Returns true if the state represents a failure; timeouts included
    pub fn is_error(&self) -> bool {
        matches!(self, Self::TimedOut | Self::Failed)
    }

    /// Returns true if moving from `self` to `next` follows the pipeline order
    ///
    /// `Pending` may fail directly when the batch is cancelled before the
    /// link starts.
    pub fn can_transition_to(&self, next: LinkState) -> bool {
        use LinkState::*;
        matches!(
            (self, next),
            (Pending, Fetching)
                | (Pending, TimedOut)
                | (Pending, Failed)
                | (Fetching, TimedOut)
                | (Fetching, Failed)
                | (Fetching, Extracted)
                | (Extracted, Converting)
                | (Converting, Failed)
                | (Converting, Converted)
                | (Converted, Writing)
                | (Writing, Failed)
                | (Writing, Written)
                | (TimedOut, Recorded)
                | (Failed, Recorded)
                | (Written, Recorded)
        )
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Extracted => "extracted",
            Self::Converting => "converting",
            Self::Converted => "converted",
            Self::Writing => "writing",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
            Self::Written => "written",
            Self::Recorded => "recorded",
        }
    }

    /// Returns all possible link states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Fetching,
            Self::Extracted,
            Self::Converting,
            Self::Converted,
            Self::Writing,
            Self::TimedOut,
            Self::Failed,
            Self::Written,
            Self::Recorded,
        ]
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
