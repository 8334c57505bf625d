/**
 * RAII handle on the dispatcher thread.
 *
 * Owned by `TelegramSender`. Holds the sending half of the stop channel and
 * the dispatcher's join handle. Stopping drops the channel, which wakes the
 * dispatcher's `select!`, then joins the thread. By the time `stop` returns
 * the queue is closed, queued requests are discarded and every send thread
 * has finished.
 *
 * ```ignore
 * {
 *     let sender = TelegramSender::new(options)?;
 *     sender.send("deploy finished")?;
 *     sender.wait();
 * }   // <-- sender dropped here, the guard stops the dispatcher
 * ```
 */
use std::thread::JoinHandle;

use tracing::error;

pub struct DispatcherGuard {
    stop: Option<crossbeam_channel::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DispatcherGuard {
    pub(crate) fn new(stop: crossbeam_channel::Sender<()>, handle: JoinHandle<()>) -> Self {
        Self {
            stop: Some(stop),
            handle: Some(handle),
        }
    }

    /// Stops the dispatcher and waits for it to wind down. Idempotent.
    pub fn stop(&mut self) {
        drop(self.stop.take());

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("dispatcher thread panicked during shutdown");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DispatcherGuard {
    fn drop(&mut self) {
        self.stop();
    }
}
