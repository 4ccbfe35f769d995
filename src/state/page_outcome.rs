/// Outcome of processing a single page
///
/// Every processed URL produces exactly one log line tagged with the outcome.
use crate::CrawlError;
use std::fmt;

/// How processing a page ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page fetched, extracted and its children classified
    Ok,

    /// The server answered with a non-200 status
    Error(String),

    /// Anything else went wrong: connection failure, extraction, indexing or a panic
    Except(String),
}

impl PageOutcome {
    /// Maps a page-processing error to its outcome
    ///
    /// Bad HTTP statuses are reported as `ERROR`; every other failure is
    /// reported as `EXCEPT`.
    pub fn from_error(error: &CrawlError) -> Self {
        match error {
            CrawlError::HttpStatus { .. } => Self::Error(error.to_string()),
            _ => Self::Except(error.to_string()),
        }
    }

    /// Returns true if the page was processed successfully
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns the tag used in the per-page log line
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Error(_) => "ERROR",
            Self::Except(_) => "EXCEPT",
        }
    }

    /// Returns the failure description, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ok => None,
            Self::Error(reason) | Self::Except(reason) => Some(reason),
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
