/**
 * Transport layer: queueing, pacing and HTTP delivery.
 *
 * - `queue`: unbounded FIFO shared by producers and the dispatcher
 * - `tracker`: in-flight counter behind `wait()`
 * - `http`: `Transport` trait and the `ureq` implementation
 * - `dispatcher`: the paced loop and its per-request send threads
 */

pub mod dispatcher;
pub mod http;
pub mod queue;
pub mod tracker;

pub use dispatcher::Dispatcher;
pub use http::{HttpTransport, Transport};
pub use queue::WorkQueue;
pub use tracker::InFlight;
