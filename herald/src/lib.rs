/**
 * Herald: rate-limited Telegram notifications.
 *
 * This is the crate applications depend on. It re-exports the core API and
 * wires up logging through a single `init` call.
 *
 * # Quick start
 *
 * ```ignore
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let sender = herald::init(herald::Options::from_env()?)?;
 *
 *     sender.send("nightly build finished")?;
 *     sender.wait();
 *     Ok(())
 * }
 * ```
 *
 * # Without the bundled subscriber
 *
 * ```ignore
 * let sender = herald::init(herald::Options {
 *     install_logging: false,
 *     ..herald::Options::new("123456:ABC", ["-1001234"])
 * })?;
 * ```
 */
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Re-exports from herald_core: the public surface area
// ---------------------------------------------------------------------------

pub use herald_core::{
    ConfigError, DispatchError, HttpTransport, SendError, SendRequest, TelegramSender, Transport,
    DEFAULT_API_BASE, DEFAULT_RPS, DEFAULT_TIMEOUT_SECS,
};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/**
 * Configuration for `herald::init`.
 *
 * Same fields as `herald_core::Options` plus addon flags:
 * - `install_logging` = `true`
 */
#[derive(Clone)]
pub struct Options {
    pub bot_token: String,
    pub chat_ids: Vec<String>,
    pub rps: NonZeroU32,
    pub api_base: String,
    pub timeout_secs: u64,

    /// Install a `tracing-subscriber` fmt subscriber (filter from `RUST_LOG`,
    /// `info` by default). Skipped when the application already set one.
    pub install_logging: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self::from(herald_core::Options::default())
    }
}

impl Options {
    pub fn new<I, S>(bot_token: impl Into<String>, chat_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from(herald_core::Options::new(bot_token, chat_ids))
    }

    /// See `herald_core::Options::from_env` for the variables read.
    pub fn from_env() -> Result<Self, ConfigError> {
        herald_core::Options::from_env().map(Self::from)
    }
}

impl From<herald_core::Options> for Options {
    fn from(core: herald_core::Options) -> Self {
        Self {
            bot_token: core.bot_token,
            chat_ids: core.chat_ids,
            rps: core.rps,
            api_base: core.api_base,
            timeout_secs: core.timeout_secs,
            install_logging: true,
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
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
            .field("install_logging", &self.install_logging)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

/**
 * Validates `options`, installs logging if requested, and starts a sender.
 *
 * Validation runs first, so a bad configuration neither touches the global
 * subscriber nor spawns a thread.
 */
pub fn init(options: Options) -> Result<TelegramSender, ConfigError> {
    /*
     * Split Options into the core part and addon flags.
     */
    let core_options = herald_core::Options {
        bot_token: options.bot_token,
        chat_ids: options.chat_ids,
        rps: options.rps,
        api_base: options.api_base,
        timeout_secs: options.timeout_secs,
    };
    core_options.validate()?;

    if options.install_logging {
        install_logging();
    }

    TelegramSender::new(core_options)
}

// ---------------------------------------------------------------------------
// Logging addon
// ---------------------------------------------------------------------------

/// Ensures the subscriber is only attempted once per process.
static LOGGING_INSTALLED: AtomicBool = AtomicBool::new(false);

/**
 * Installs a fmt subscriber filtered by `RUST_LOG` (default `info`).
 *
 * Idempotent. If the application already registered a global subscriber,
 * that one wins and this is a silent no-op.
 */
pub fn install_logging() {
    if LOGGING_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_enable_logging() {
        let options = Options::new("t", ["1"]);
        assert!(options.install_logging);
        assert_eq!(options.rps, DEFAULT_RPS);
        assert_eq!(options.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_debug_matches_core_options() {
        let secret = Options::new("123:secret", ["1"]);
        let printed = format!("{secret:?}");
        assert!(!printed.contains("123:secret"));
        assert!(printed.contains("<redacted>"));

        let empty = Options::new("", ["1"]);
        assert!(format!("{empty:?}").contains("<empty>"));
        assert!(format!("{:?}", herald_core::Options::new("", ["1"])).contains("<empty>"));
    }

    #[test]
    fn test_init_rejects_bad_config_before_starting() {
        let result = init(Options {
            install_logging: false,
            ..Options::new("", ["1"])
        });
        assert!(matches!(result, Err(ConfigError::MissingBotToken)));

        let result = init(Options {
            install_logging: false,
            ..Options::new("t", Vec::<String>::new())
        });
        assert!(matches!(result, Err(ConfigError::NoChatIds)));
    }

    #[test]
    fn test_init_starts_sender() {
        let sender = init(Options {
            // Nothing listens here; the test never sends.
            api_base: "http://127.0.0.1:1".into(),
            ..Options::new("t", ["1"])
        })
        .unwrap();

        assert_eq!(sender.options().chat_ids, vec!["1"]);
        assert!(sender.wait_timeout(std::time::Duration::from_millis(10)));
        sender.shutdown();
    }

    #[test]
    fn test_install_logging_is_idempotent() {
        install_logging();
        install_logging();
        assert!(LOGGING_INSTALLED.load(Ordering::SeqCst));
    }
}
