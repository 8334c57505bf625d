/**
 * Minimal harness for the Herald dispatcher.
 *
 * Export a bot token and one or more chat IDs, then run:
 *
 *   TELEGRAM_BOT_TOKEN=123:ABC TELEGRAM_CHAT_IDS=-1001,42 cargo run -p herald_demo
 *   ... cargo run -p herald_demo -- "custom text" "another message"
 *   RUST_LOG=herald_core=debug ... cargo run -p herald_demo   # per-request logs
 */
use std::process::ExitCode;
use std::time::{Duration, Instant};

fn main() -> ExitCode {
    let mut messages: Vec<String> = std::env::args().skip(1).collect();
    if messages.is_empty() {
        messages.push("Hello from Herald!".to_string());
    }

    let options = match herald::Options::from_env() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("[demo] {e}");
            return ExitCode::FAILURE;
        }
    };

    let sender = match herald::init(options) {
        Ok(sender) => sender,
        Err(e) => {
            eprintln!("[demo] {e}");
            return ExitCode::FAILURE;
        }
    };

    let started = Instant::now();
    for message in &messages {
        if let Err(e) = sender.send(message) {
            eprintln!("[demo] could not queue {message:?}: {e}");
        }
    }
    println!(
        "[demo] queued {} request(s) at {} per second",
        sender.in_flight(),
        sender.options().rps
    );

    if !sender.wait_timeout(Duration::from_secs(60)) {
        eprintln!("[demo] gave up with {} request(s) still pending", sender.in_flight());
    }
    println!("[demo] done in {:?}", started.elapsed());

    sender.shutdown();
    ExitCode::SUCCESS
}
