//! CLI commands and shared plumbing

mod config;
mod context;
mod paths;
pub mod style;
mod trigger;

pub use config::run_config;
pub use context::CommandContext;
pub use paths::{PathFormat, PathsOptions, run_paths};
pub use trigger::{TriggerOptions, run_trigger};

use anstream::println;
use async_trait::async_trait;
use branchbot::trigger::ProgressCallback;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Progress reporter that prints indented status lines
pub struct CliProgress;

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        println!("  {message}");
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise verbosity picks the level. Logs go
/// to stderr so stdout stays machine-readable.
pub fn init_tracing(verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init()
            .ok();
    }
}
