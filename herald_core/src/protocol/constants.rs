/**
 * Defaults baked into `Options`.
 */
use std::num::NonZeroU32;

/// Base URL of the Telegram Bot API.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Default ceiling on started sends per second.
pub const DEFAULT_RPS: NonZeroU32 = match NonZeroU32::new(20) {
    Some(rps) => rps,
    None => unreachable!(),
};

/// Default global timeout for a single HTTP call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Bot API method used for every request.
pub const SEND_MESSAGE_METHOD: &str = "sendMessage";
