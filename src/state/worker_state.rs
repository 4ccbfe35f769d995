/// Worker state definitions for the page-processing loop
///
/// A worker cycles `Idle -> Fetching -> Indexing -> Classifying -> Enqueueing -> Idle`
/// until it receives a shutdown sentinel and moves to `Stopped`.
use std::fmt;

/// Represents where a worker is in its loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Blocked on the frontier waiting for a job
    Idle,

    /// Performing the HTTP request for a page
    Fetching,

    /// Extracting content and handing it to the indexer
    Indexing,

    /// Selecting child URLs from the page's links
    Classifying,

    /// Offering discovered children to the frontier
    Enqueueing,

    /// Received a shutdown sentinel; the worker has exited its loop
    Stopped,
}

impl WorkerState {
    /// Returns true if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns true if the worker holds a dequeued job in this state
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Fetching | Self::Indexing | Self::Classifying | Self::Enqueueing
        )
    }

    /// Returns the state that follows this one in a normal page cycle
    ///
    /// `Stopped` has no successor.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Fetching),
            Self::Fetching => Some(Self::Indexing),
            Self::Indexing => Some(Self::Classifying),
            Self::Classifying => Some(Self::Enqueueing),
            Self::Enqueueing => Some(Self::Idle),
            Self::Stopped => None,
        }
    }

    /// Returns true if moving from this state to `to` is allowed
    ///
    /// Besides the normal cycle, a failing page jumps straight from any busy
    /// state back to `Idle`, and an idle worker may stop.
    pub fn can_transition_to(&self, to: WorkerState) -> bool {
        if self.next() == Some(to) {
            return true;
        }
        match (self, to) {
            (from, Self::Idle) if from.is_busy() => true,
            (Self::Idle, Self::Stopped) => true,
            _ => false,
        }
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Indexing => "indexing",
            Self::Classifying => "classifying",
            Self::Enqueueing => "enqueueing",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
