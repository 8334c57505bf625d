/**
 * `TelegramSender`: the public entry point.
 *
 * Lifecycle:
 * 1. `TelegramSender::new(options)` validates the options, creates the
 *    queue and the in-flight tracker, and spawns the dispatcher thread.
 * 2. `send(text)` builds one request per configured chat and queues it.
 *    It never waits for the network.
 * 3. `wait()` blocks until every queued request has reached a terminal state.
 * 4. `shutdown()` or drop stops the dispatcher (see `DispatcherGuard`).
 *
 * The sender is `Sync`; share it behind an `Arc` to send from many threads.
 */
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::{ConfigError, SendError};
use crate::guard::DispatcherGuard;
use crate::options::Options;
use crate::protocol::request::SendRequest;
use crate::transport::{Dispatcher, HttpTransport, InFlight, Transport, WorkQueue};

pub struct TelegramSender {
    options: Options,
    queue: Arc<WorkQueue<SendRequest>>,
    in_flight: Arc<InFlight>,
    dispatcher: DispatcherGuard,
}

impl TelegramSender {
    /**
     * Creates a sender that delivers over HTTP with `ureq`.
     *
     * # Errors
     * `ConfigError::MissingBotToken` / `ConfigError::NoChatIds` when the
     * options are incomplete; nothing is spawned in that case.
     */
    pub fn new(options: Options) -> Result<Self, ConfigError> {
        options.validate()?;
        let transport = HttpTransport::new(options.timeout());
        Self::with_transport(options, transport)
    }

    /**
     * Creates a sender that hands every request to `transport`.
     *
     * Validation is identical to `new`.
     */
    pub fn with_transport(
        options: Options,
        transport: impl Transport,
    ) -> Result<Self, ConfigError> {
        options.validate()?;

        let queue = Arc::new(WorkQueue::new());
        let in_flight = Arc::new(InFlight::new());

        let dispatcher = Dispatcher::new(
            Arc::clone(&queue),
            Arc::clone(&in_flight),
            Arc::new(transport),
            options.rps,
        )
        .spawn()?;

        Ok(Self {
            options,
            queue,
            in_flight,
            dispatcher,
        })
    }

    /**
     * Queues `message` once for every configured chat, in configuration order.
     *
     * Returns as soon as the requests are queued. Delivery failures are
     * logged by the dispatcher and never reported here.
     *
     * # Errors
     * - `SendError::Construction` if the request for some chat cannot be
     *   built. Requests already queued for earlier chats in this call stay
     *   queued; later chats are not attempted.
     * - `SendError::Stopped` if the dispatcher is no longer running.
     */
    pub fn send(&self, message: &str) -> Result<(), SendError> {
        for chat_id in &self.options.chat_ids {
            let request = SendRequest::build(
                &self.options.api_base,
                &self.options.bot_token,
                chat_id,
                message,
            )?;

            self.in_flight.add(1);
            if self.queue.push(request).is_err() {
                self.in_flight.release(1);
                return Err(SendError::Stopped);
            }

            debug!(chat_id = %chat_id, "request added to queue");
        }

        Ok(())
    }

    /// Blocks until every queued request has been delivered, failed or discarded.
    pub fn wait(&self) {
        self.in_flight.wait();
    }

    /// Bounded `wait`. Returns `false` if requests were still pending at `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.in_flight.wait_timeout(timeout)
    }

    /// Requests queued but not yet dispatched.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Requests queued or dispatched that have not reached a terminal state.
    pub fn in_flight(&self) -> usize {
        self.in_flight.current()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /**
     * Stops the dispatcher. Queued requests that were not dispatched yet
     * are discarded; requests already on the wire are allowed to finish.
     *
     * Call `wait()` first to deliver everything.
     */
    pub fn shutdown(mut self) {
        self.dispatcher.stop();
    }
}
