/**
 * Paced dispatcher that drains the work queue.
 *
 * ```text
 *  ┌──────────────┐   push    ┌───────────┐  1 pop / tick  ┌──────────────────┐
 *  │ TelegramSender│ ───────► │ WorkQueue │ ─────────────► │ dispatcher thread │
 *  │ (any thread)  │          └───────────┘                └────────┬─────────┘
 *  └──────────────┘                                                  │ spawn
 *                                                         ┌──────────▼─────────┐
 *                                                         │ herald-send thread │ × N
 *                                                         │ Transport::execute │
 *                                                         └────────────────────┘
 * ```
 *
 * The tick only grants permission to *start* a send. The HTTP call itself
 * runs on its own thread, so a slow response never delays the next tick and
 * any number of calls may be in flight at once.
 *
 * Ticks come from `crossbeam_channel::tick`: a tick that finds the queue
 * empty is simply lost, nothing accumulates for later bursts.
 *
 * The loop runs until the stop channel disconnects (see `DispatcherGuard`).
 * On the way out it closes the queue, discards whatever is still queued and
 * joins every send thread it started.
 */
use std::io;
use std::num::NonZeroU32;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, Receiver};
use tracing::{debug, error, info, warn};

use super::http::Transport;
use super::queue::WorkQueue;
use super::tracker::{Completion, InFlight};
use crate::error::DispatchError;
use crate::guard::DispatcherGuard;
use crate::protocol::request::SendRequest;

pub struct Dispatcher {
    queue: Arc<WorkQueue<SendRequest>>,
    in_flight: Arc<InFlight>,
    transport: Arc<dyn Transport>,
    interval: Duration,
    /// Send threads started and not yet joined.
    tasks: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(
        queue: Arc<WorkQueue<SendRequest>>,
        in_flight: Arc<InFlight>,
        transport: Arc<dyn Transport>,
        rps: NonZeroU32,
    ) -> Self {
        Self {
            queue,
            in_flight,
            transport,
            interval: tick_interval(rps),
            tasks: Vec::new(),
        }
    }

    /**
     * Moves the dispatcher onto its own thread.
     *
     * The returned guard owns the stop channel and the join handle;
     * dropping it stops the loop.
     */
    pub fn spawn(self) -> io::Result<DispatcherGuard> {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);

        let handle = thread::Builder::new()
            .name("herald-dispatcher".into())
            .spawn(move || self.run(stop_rx))?;

        Ok(DispatcherGuard::new(stop_tx, handle))
    }

    fn run(mut self, stop: Receiver<()>) {
        /*
         * A panic in the loop must still release every queued request,
         * otherwise `wait()` callers would hang forever.
         */
        let result = catch_unwind(AssertUnwindSafe(|| self.run_loop(&stop)));
        if result.is_err() {
            error!("dispatcher loop panicked, shutting down");
        }

        self.shutdown();
    }

    fn run_loop(&mut self, stop: &Receiver<()>) {
        let ticker = crossbeam_channel::tick(self.interval);

        let interval_ms = self.interval.as_secs_f64() * 1000.0;
        info!(interval_ms, "dispatcher started");

        loop {
            select! {
                recv(ticker) -> _ => self.on_tick(),
                recv(stop) -> _ => break,
            }
        }
    }

    fn on_tick(&mut self) {
        self.reap_finished();

        if self.queue.is_empty() {
            return;
        }

        let Some(request) = self.queue.pop() else {
            return;
        };

        if let Err(err) = request.check_well_formed() {
            error!(
                chat_id = %request.chat_id(),
                error = %err,
                "skipping malformed request"
            );
            self.in_flight.release(1);
            return;
        }

        self.dispatch(request);
    }

    fn dispatch(&mut self, request: SendRequest) {
        let transport = Arc::clone(&self.transport);
        let completion = Completion::new(Arc::clone(&self.in_flight));
        let chat_id = request.chat_id().to_string();

        debug!(chat_id = %chat_id, "dispatching message");

        let spawned = thread::Builder::new()
            .name("herald-send".into())
            .spawn(move || {
                let _completion = completion;
                deliver(transport.as_ref(), &request);
            });

        match spawned {
            Ok(handle) => self.tasks.push(handle),
            // The closure was dropped unrun, which already released its slot.
            Err(err) => error!(
                chat_id = %chat_id,
                error = %err,
                "failed to spawn send thread, dropping message"
            ),
        }
    }

    /// Joins send threads that have already finished.
    fn reap_finished(&mut self) {
        let mut i = 0;
        while i < self.tasks.len() {
            if self.tasks[i].is_finished() {
                join_task(self.tasks.swap_remove(i));
            } else {
                i += 1;
            }
        }
    }

    fn shutdown(&mut self) {
        let discarded = self.queue.close();
        if !discarded.is_empty() {
            warn!(
                discarded = discarded.len(),
                "dispatcher stopped with queued messages, discarding them"
            );
            self.in_flight.release(discarded.len());
        }

        let in_flight = self.tasks.len();
        if in_flight > 0 {
            debug!(in_flight, "waiting for send threads to finish");
        }
        for handle in self.tasks.drain(..) {
            join_task(handle);
        }

        info!("dispatcher stopped");
    }
}

/// Period between ticks: one second divided by `rps`, never shorter than 1 ns.
pub fn tick_interval(rps: NonZeroU32) -> Duration {
    (Duration::from_secs(1) / rps.get()).max(Duration::from_nanos(1))
}

/// Body of a send thread: one attempt, outcome goes to the log.
fn deliver(transport: &dyn Transport, request: &SendRequest) {
    match transport.execute(request) {
        Ok(()) => debug!(chat_id = %request.chat_id(), "message delivered"),
        Err(DispatchError::Status { status, body }) => warn!(
            chat_id = %request.chat_id(),
            status,
            body = %body,
            "unexpected status code"
        ),
        Err(err) => warn!(
            chat_id = %request.chat_id(),
            error = %err,
            "failed to send message"
        ),
    }
}

fn join_task(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        error!("send thread panicked");
    }
}
