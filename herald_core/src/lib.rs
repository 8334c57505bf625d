/*!
 * Herald Core: rate-limited Telegram message dispatch.
 *
 * Callers queue messages with `TelegramSender::send`; a background
 * dispatcher starts at most `rps` HTTP calls per second, each on its own
 * thread, and logs the outcome. Delivery is best-effort: one attempt per
 * request, no retries, no persistence.
 *
 * End users usually depend on the `herald` facade crate, which re-exports
 * this API and installs a log subscriber.
 *
 * # Module structure
 *
 * - `protocol/`: what we send (request construction, constants)
 * - `transport/`: how we deliver (queue, in-flight tracker, dispatcher, HTTP)
 * - `client`: `TelegramSender`, the public handle
 * - `options`: configuration and environment loading
 * - `guard`: stops the dispatcher on drop
 * - `error`: error taxonomy
 *
 * # Example
 *
 * ```ignore
 * let sender = herald_core::TelegramSender::new(
 *     herald_core::Options::new("123456:ABC", ["-1001234"]),
 * )?;
 *
 * sender.send("backup finished")?;
 * sender.wait();
 * ```
 */

mod client;
mod error;
mod guard;
mod options;
mod protocol;
mod transport;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use client::TelegramSender;
pub use error::{ConfigError, DispatchError, SendError};
pub use guard::DispatcherGuard;
pub use options::{
    Options, ENV_API_BASE, ENV_BOT_TOKEN, ENV_CHAT_IDS, ENV_RPS, ENV_TIMEOUT_SECS,
};
pub use protocol::constants::{DEFAULT_API_BASE, DEFAULT_RPS, DEFAULT_TIMEOUT_SECS};
pub use protocol::request::SendRequest;
pub use transport::dispatcher::tick_interval;
pub use transport::{HttpTransport, InFlight, Transport, WorkQueue};
