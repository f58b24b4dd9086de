pub mod config;
pub mod error;
pub mod types;

pub use config::{DatasetConfig, EnsembleConfig, GeneralConfig, RetrievalConfig};
pub use error::{EnsembleError, Result};
pub use types::*;

/// Install a global tracing subscriber.
///
/// Honors `RUST_LOG` when set, otherwise defaults to `info`. Safe to call
/// more than once; later calls are no-ops.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .ok();
}
