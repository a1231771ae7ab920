//! Wrapper around `tracing_subscriber` for logging.
//!
//! Configures service-wide logging to go to stderr at the `INFO` level. `RUST_LOG` can be used
//! to change the level, e.g. `RUST_LOG=debug`.
//!
//! ### Example
//!
//! ```rust
//! use medport::prelude::*;
//!
//! Logger::init(&Config::default());
//! ```
use crate::colors;
use crate::config::Config;
use once_cell::sync::OnceCell;
use tracing_subscriber::{filter::LevelFilter, fmt, util::SubscriberInitExt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

pub struct Logger;

impl Logger {
    /// Configure logging service-wide.
    ///
    /// Calling this multiple times is safe. Logger will be initialized only once.
    pub fn init(config: &Config) {
        INITIALIZED.get_or_init(|| {
            colors::set_tty(config.tty);
            setup_logging(config.tty);
            config.log_info();
        });
    }
}

fn setup_logging(ansi: bool) {
    // Another subscriber may already be installed, e.g. by tests.
    let _ = fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(ansi)
        .with_file(false)
        .with_target(false)
        .finish()
        .try_init();
}
