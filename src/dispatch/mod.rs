//! Marshals completions back onto the UI-safe context.
//!
//! Fetches run on Tokio tasks; their callbacks must not. A [`MainQueue`] is
//! the sending half handed to background work, a [`MainLoop`] is owned by
//! the UI thread and runs whatever has been posted, in post order.

use tokio::sync::mpsc;
use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Creates a connected queue/loop pair.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
///
/// let (queue, mut main_loop) = cachefetch::dispatch::main_queue();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// for i in 0..3 {
///     let seen = Arc::clone(&seen);
///     queue.post(move || seen.lock().unwrap().push(i));
/// }
///
/// assert_eq!(main_loop.run_pending(), 3);
/// assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
/// ```
pub fn main_queue() -> (MainQueue, MainLoop) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MainQueue { tx }, MainLoop { rx })
}

/// Cloneable handle for posting completions to the main loop.
#[derive(Debug, Clone)]
pub struct MainQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl MainQueue {
    /// Enqueues `job` to run on the main loop.
    ///
    /// Returns `false` if the loop has been dropped; the job is discarded.
    pub fn post<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.tx.send(Box::new(job)).is_err() {
            debug!("main loop gone, dropping completion");
            return false;
        }
        true
    }
}

/// Receiving half: runs posted completions on the thread that drives it.
#[derive(Debug)]
pub struct MainLoop {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl MainLoop {
    /// Runs every completion queued so far without waiting. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Waits for the next completion and runs it.
    ///
    /// Returns `false` once every [`MainQueue`] has been dropped and the
    /// queue is empty.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Runs completions until every [`MainQueue`] handle is dropped.
    pub async fn run(mut self) {
        while self.run_next().await {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn post_after_loop_dropped() {
        let (queue, main_loop) = main_queue();
        drop(main_loop);
        assert!(!queue.post(|| {}));
    }

    #[test]
    fn run_pending_on_empty_queue() {
        let (_queue, mut main_loop) = main_queue();
        assert_eq!(main_loop.run_pending(), 0);
    }

    #[tokio::test]
    async fn run_drains_until_senders_dropped() {
        let (queue, main_loop) = main_queue();
        let count = Arc::new(AtomicUsize::new(0));

        let worker = {
            let queue = queue.clone();
            let count = Arc::clone(&count);
            tokio::spawn(async move {
                for _ in 0..5 {
                    let count = Arc::clone(&count);
                    queue.post(move || {
                        count.fetch_add(1, Ordering::SeqCst);
                    });
                }
            })
        };
        drop(queue);

        worker.await.unwrap();
        main_loop.run().await;
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }
}
