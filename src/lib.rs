//! Medical document analysis: classify each file, hand it to a
//! kind-specific agent, and aggregate the results into one report.

pub mod agents;
pub mod config;
pub mod error;
pub mod llm;
pub mod report;

pub use agents::{AnalysisReport, Coordinator, DocumentKind, DocumentOutcome};
pub use config::AnalysisConfig;
pub use error::AnalysisError;

use tracing_subscriber::EnvFilter;

/// Initialize tracing with the RUST_LOG env filter
///
/// Default: warn for dependencies, info for this crate.
/// Use RUST_LOG=debug for per-document extraction logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,medassist_core=info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
