/**
 * In-flight request accounting.
 *
 * The counter goes up when the sender queues a request and down when that
 * request reaches a terminal state: delivered, failed, skipped as malformed,
 * or discarded at shutdown. `wait` blocks until it reaches zero.
 *
 * Same `Mutex` + `Condvar` pairing as a flush signal, except the predicate
 * is a count rather than a one-shot flag, so it can be waited on repeatedly.
 */
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

pub struct InFlight {
    count: Mutex<usize>,
    drained: Condvar,
}

impl InFlight {
    pub fn new() -> Self {
        Self {
            count: Mutex::new(0),
            drained: Condvar::new(),
        }
    }

    pub fn add(&self, n: usize) {
        *self.lock() += n;
    }

    /// Marks `n` requests as finished and wakes waiters once drained.
    pub fn release(&self, n: usize) {
        let mut count = self.lock();
        *count = count.saturating_sub(n);
        if *count == 0 {
            self.drained.notify_all();
        }
    }

    pub fn current(&self) -> usize {
        *self.lock()
    }

    /// Blocks until the counter is zero. Returns immediately if it already is.
    pub fn wait(&self) {
        let guard = self.lock();
        let _drained = self
            .drained
            .wait_while(guard, |count| *count > 0)
            .unwrap_or_else(|e| e.into_inner());
    }

    /**
     * Like `wait`, bounded by `timeout`.
     *
     * # Returns
     * `true` if the counter reached zero in time, `false` on timeout.
     */
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (_count, result) = self
            .drained
            .wait_timeout_while(guard, timeout, |count| *count > 0)
            .unwrap_or_else(|e| e.into_inner());
        !result.timed_out()
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * Releases one in-flight slot when dropped.
 *
 * Moved into each send thread so the slot is returned even if the transport
 * panics, or if the thread never starts and the closure is dropped unrun.
 */
pub(crate) struct Completion {
    tracker: Arc<InFlight>,
}

impl Completion {
    pub(crate) fn new(tracker: Arc<InFlight>) -> Self {
        Self { tracker }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.tracker.release(1);
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Instant;

    use super::*;

    #[test]
    fn test_wait_returns_immediately_when_nothing_sent() {
        let tracker = InFlight::new();
        let started = Instant::now();
        tracker.wait();
        assert!(started.elapsed() < Duration::from_millis(100));
        assert!(tracker.wait_timeout(Duration::ZERO));
    }

    #[test]
    fn test_wait_timeout_expires_while_requests_pending() {
        let tracker = InFlight::new();
        tracker.add(2);
        tracker.release(1);

        assert_eq!(tracker.current(), 1);
        assert!(!tracker.wait_timeout(Duration::from_millis(20)));
    }

    #[test]
    fn test_wait_wakes_when_last_completion_drops() {
        let tracker = Arc::new(InFlight::new());
        tracker.add(3);

        let workers: Vec<_> = (0..3)
            .map(|i| {
                let completion = Completion::new(Arc::clone(&tracker));
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(10 * (i + 1)));
                    drop(completion);
                })
            })
            .collect();

        assert!(tracker.wait_timeout(Duration::from_secs(5)));
        assert_eq!(tracker.current(), 0);

        for worker in workers {
            worker.join().unwrap();
        }
    }

    #[test]
    fn test_completion_releases_on_panic() {
        let tracker = Arc::new(InFlight::new());
        tracker.add(1);

        let completion = Completion::new(Arc::clone(&tracker));
        let result = thread::spawn(move || {
            let _completion = completion;
            panic!("transport blew up");
        })
        .join();

        assert!(result.is_err());
        assert_eq!(tracker.current(), 0);
    }

    #[test]
    fn test_release_never_underflows() {
        let tracker = InFlight::new();
        tracker.release(5);
        assert_eq!(tracker.current(), 0);
    }
}
