//! State module for tracking crawl progress
//!
//! This module provides the state types shared by the worker pool and the
//! crawl controller.
//!
//! # Components
//!
//! - `WorkerState`: Where a worker currently is in its page-processing loop
//! - `PageOutcome`: How processing a single page ended (OK / ERROR / EXCEPT)
//! - `SessionStats`: Per-crawl counters updated concurrently by the workers

mod page_outcome;
mod session_stats;
mod worker_state;

// Re-export main types
pub use page_outcome::PageOutcome;
pub use session_stats::SessionStats;
pub use worker_state::WorkerState;
