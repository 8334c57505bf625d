/**
 * Unbounded FIFO work queue shared between producers and the dispatcher.
 *
 * Any number of threads may `push`; exactly one consumer (the dispatcher)
 * calls `pop`. Neither operation blocks beyond the mutex window.
 *
 * The queue is closed once, when the dispatcher shuts down. `close` hands
 * back everything still queued so the caller can account for it, and any
 * later `push` returns its item instead of silently stranding it.
 */
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

pub struct WorkQueue<T> {
    state: Mutex<State<T>>,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                items: VecDeque::new(),
                closed: false,
            }),
        }
    }

    /// Appends `item` to the tail. Returns it back if the queue is closed.
    pub fn push(&self, item: T) -> Result<(), T> {
        let mut state = self.lock();
        if state.closed {
            return Err(item);
        }
        state.items.push_back(item);
        Ok(())
    }

    /// Removes and returns the head, or `None` when empty.
    pub fn pop(&self) -> Option<T> {
        self.lock().items.pop_front()
    }

    /// Snapshot; may be stale by the time the caller acts on it.
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Closes the queue and returns the remaining items in FIFO order.
    pub fn close(&self) -> Vec<T> {
        let mut state = self.lock();
        state.closed = true;
        state.items.drain(..).collect()
    }

    /*
     * No code path panics while holding the lock, but a poisoned mutex
     * must not take the whole dispatcher down with it.
     */
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
