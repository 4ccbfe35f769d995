//! Crawl frontier: pending work, duplicate suppression and completion tracking
//!
//! This module handles:
//! - A FIFO queue of URLs waiting to be visited
//! - The seen set guaranteeing each URL is enqueued at most once per crawl
//! - An outstanding-work counter covering queued *and* in-flight URLs
//! - Shutdown sentinels that tell idle workers to exit
//!
//! # Completion
//!
//! The counter is incremented when a URL is enqueued and decremented only when
//! a worker calls [`Frontier::complete`] after processing it. A momentarily
//! empty queue therefore does not mean the crawl is over: a worker still
//! fetching a page may be about to enqueue its children.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{watch, Notify};

/// A unit of work handed to a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Visit this URL
    Visit(String),

    /// No more work; the worker should exit
    Shutdown,
}

/// State guarded by the frontier lock
#[derive(Debug, Default)]
struct Pending {
    queue: VecDeque<Job>,
    seen: HashSet<String>,
}

/// Concurrent work queue shared by all workers of one crawl
pub struct Frontier {
    pending: Mutex<Pending>,
    available: Notify,
    outstanding: watch::Sender<usize>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        let (outstanding, _) = watch::channel(0);
        Self {
            pending: Mutex::new(Pending::default()),
            available: Notify::new(),
            outstanding,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes a visit while the lock is held, keeping queue and counter in step
    fn push_visit(&self, pending: &mut Pending, url: String) {
        pending.queue.push_back(Job::Visit(url));
        self.outstanding.send_modify(|count| *count += 1);
    }

    /// Enqueues a URL without consulting the seen set
    ///
    /// The URL is counted as outstanding until a worker completes it.
    pub fn enqueue(&self, url: impl Into<String>) {
        {
            let mut pending = self.lock();
            self.push_visit(&mut pending, url.into());
        }
        self.available.notify_one();
    }

    /// Enqueues a URL unless it has been seen before
    ///
    /// The membership check, the insert into the seen set and the enqueue happen
    /// under one lock, so concurrent offers of the same URL enqueue it once.
    ///
    /// # Returns
    ///
    /// * `true` - The URL was new and has been enqueued
    /// * `false` - The URL was already seen; nothing was enqueued
    pub fn offer(&self, url: impl Into<String>) -> bool {
        let url = url.into();
        {
            let mut pending = self.lock();
            if pending.seen.contains(&url) {
                return false;
            }
            pending.seen.insert(url.clone());
            self.push_visit(&mut pending, url);
        }
        self.available.notify_one();
        true
    }

    /// Marks every seed as seen and enqueues it, in one critical section
    ///
    /// No worker can dequeue a seed before all seeds are in the seen set, so a
    /// seed discovered as a link on another seed is never enqueued twice.
    /// Duplicate seeds collapse into one.
    ///
    /// # Returns
    ///
    /// The number of seeds enqueued
    pub fn seed<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut enqueued = 0;
        {
            let mut pending = self.lock();
            for url in urls {
                let url = url.into();
                if pending.seen.insert(url.clone()) {
                    self.push_visit(&mut pending, url);
                    enqueued += 1;
                }
            }
        }
        for _ in 0..enqueued {
            self.available.notify_one();
        }
        enqueued
    }

    /// Waits until a job is available and takes it
    ///
    /// Dequeuing a visit does not change the outstanding count; the item stays
    /// outstanding until [`Frontier::complete`] is called for it.
    pub async fn dequeue(&self) -> Job {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            // Register before checking the queue so a push in between is not missed
            notified.as_mut().enable();

            if let Some(job) = self.lock().queue.pop_front() {
                return job;
            }

            notified.await;
        }
    }

    /// Marks one previously dequeued visit as finished
    pub fn complete(&self) {
        let mut underflow = false;
        self.outstanding.send_modify(|count| {
            if *count == 0 {
                underflow = true;
            } else {
                *count -= 1;
            }
        });

        if underflow {
            tracing::warn!("complete() called with no outstanding work; ignoring");
        }
    }

    /// Waits until no URL is queued or being processed
    ///
    /// Returns immediately if nothing is outstanding.
    pub async fn wait_until_empty(&self) {
        let mut outstanding = self.outstanding.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = outstanding.wait_for(|count| *count == 0).await;
    }

    /// Pushes one shutdown sentinel per worker
    ///
    /// Sentinels are not outstanding work. They queue behind any remaining
    /// visits, so workers drain real work before exiting.
    pub fn shutdown(&self, workers: usize) {
        {
            let mut pending = self.lock();
            for _ in 0..workers {
                pending.queue.push_back(Job::Shutdown);
            }
        }
        for _ in 0..workers {
            self.available.notify_one();
        }
    }

    /// Number of URLs queued or in flight
    pub fn outstanding(&self) -> usize {
        *self.outstanding.borrow()
    }

    /// Number of jobs waiting in the queue (sentinels included)
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of distinct URLs ever offered or seeded
    pub fn seen_count(&self) -> usize {
        self.lock().seen.len()
    }

    /// Returns true if the URL is in the seen set
    pub fn has_seen(&self, url: &str) -> bool {
        self.lock().seen.contains(url)
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}
