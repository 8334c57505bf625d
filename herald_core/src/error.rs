/*!
 * Error types for the dispatcher.
 *
 * Only `ConfigError` and `SendError` ever reach the caller. `DispatchError`
 * values are produced on background threads and end up in the log.
 */
use thiserror::Error;

/// Construction-time failures. No background thread exists when these are returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("telegram bot token is required")]
    MissingBotToken,

    #[error("at least one chat ID is required")]
    NoChatIds,

    #[error("invalid environment variable {var}: {reason}")]
    InvalidEnv { var: &'static str, reason: String },

    #[error("failed to spawn dispatcher thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Failures surfaced synchronously from `TelegramSender::send`.
#[derive(Debug, Error)]
pub enum SendError {
    /// The request for one recipient could not be built. Requests already
    /// queued for earlier recipients of the same call stay queued.
    #[error("failed to build request for chat {chat_id}: {reason}")]
    Construction { chat_id: String, reason: String },

    /// The dispatcher has shut down and no longer accepts work.
    #[error("dispatcher has stopped, message was not queued")]
    Stopped,
}

/// Failures of a single dispatched request. Logged, never retried.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("unexpected status code {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed request: {0}")]
    Malformed(String),
}

impl DispatchError {
    /// Wraps any transport-level error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }
}
