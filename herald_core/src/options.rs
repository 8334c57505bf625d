/**
 * Configuration for a `TelegramSender`.
 *
 * Only two values are mandatory: the bot token and at least one chat ID.
 * The rest default to the public Bot API at 20 started sends per second.
 *
 * # Example
 * ```ignore
 * let options = herald_core::Options {
 *     rps: NonZeroU32::new(50).unwrap(),
 *     ..herald_core::Options::new("123456:ABC", ["-1001234", "42"])
 * };
 * ```
 *
 * `Options` also derives `Deserialize` (every field optional, missing ones
 * take their defaults) so it can sit inside a host application's config.
 */
use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::protocol::constants::{DEFAULT_API_BASE, DEFAULT_RPS, DEFAULT_TIMEOUT_SECS};

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_CHAT_IDS: &str = "TELEGRAM_CHAT_IDS";
pub const ENV_RPS: &str = "TELEGRAM_RPS";
pub const ENV_API_BASE: &str = "TELEGRAM_API_BASE";
pub const ENV_TIMEOUT_SECS: &str = "TELEGRAM_TIMEOUT_SECS";

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Bot API token, e.g. `123456:ABC-DEF...`. Must not be empty.
    pub bot_token: String,

    /// Recipients. Every `send` produces one request per entry, in this order.
    /// Must not be empty.
    pub chat_ids: Vec<String>,

    /// Maximum number of sends *started* per second.
    pub rps: NonZeroU32,

    /// Bot API base URL. Override for self-hosted Bot API servers or tests.
    pub api_base: String,

    /// Global timeout for a single HTTP call.
    pub timeout_secs: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_ids: Vec::new(),
            rps: DEFAULT_RPS,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Options {
    pub fn new<I, S>(bot_token: impl Into<String>, chat_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bot_token: bot_token.into(),
            chat_ids: chat_ids.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /**
     * The only validation performed: a non-empty token and a non-empty
     * recipient list. Individual chat IDs are checked when a request is
     * built for them.
     */
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot_token.is_empty() {
            return Err(ConfigError::MissingBotToken);
        }

        if self.chat_ids.is_empty() {
            return Err(ConfigError::NoChatIds);
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /**
     * Reads options from the process environment.
     *
     * | Variable | Meaning |
     * |---|---|
     * | `TELEGRAM_BOT_TOKEN` | bot token |
     * | `TELEGRAM_CHAT_IDS` | comma-separated chat IDs |
     * | `TELEGRAM_RPS` | optional, sends per second (> 0) |
     * | `TELEGRAM_API_BASE` | optional, Bot API base URL |
     * | `TELEGRAM_TIMEOUT_SECS` | optional, per-request timeout |
     *
     * Missing token or chat IDs are not reported here; `validate` (run by
     * `TelegramSender::new`) catches them. Unparsable numbers are reported
     * as `ConfigError::InvalidEnv`.
     */
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut options = Self {
            bot_token: lookup(ENV_BOT_TOKEN).unwrap_or_default(),
            chat_ids: lookup(ENV_CHAT_IDS)
                .map(|raw| parse_chat_ids(&raw))
                .unwrap_or_default(),
            ..Default::default()
        };

        if let Some(raw) = lookup(ENV_RPS) {
            options.rps = raw.trim().parse().map_err(|e| ConfigError::InvalidEnv {
                var: ENV_RPS,
                reason: format!("{raw:?} is not a positive integer: {e}"),
            })?;
        }

        if let Some(raw) = lookup(ENV_API_BASE) {
            options.api_base = raw;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            options.timeout_secs = raw.trim().parse().map_err(|e| ConfigError::InvalidEnv {
                var: ENV_TIMEOUT_SECS,
                reason: format!("{raw:?} is not a number of seconds: {e}"),
            })?;
        }

        Ok(options)
    }
}

fn parse_chat_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.bot_token.is_empty() {
            "<empty>"
        } else {
            "<redacted>"
        };

        f.debug_struct("Options")
            .field("bot_token", &token)
            .field("chat_ids", &self.chat_ids)
            .field("rps", &self.rps)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
