//! Demon recruitment negotiation library
//!
//! Re-exports modules for use by the game binary and the balance tools.

pub mod alignment;
pub mod config;
pub mod console;
pub mod data;
pub mod error;
pub mod harness;
pub mod negotiation;

use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG` (default `warn`), so game text on
/// stdout stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
