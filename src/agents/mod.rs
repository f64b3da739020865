//! Multi-Agent Document Analysis
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  1. CLASSIFY: extension + MIME guess → text / image / structured  │
//! │  2. DISPATCH: one agent per kind (unknown → text)                 │
//! │     - TextAgent: pdf-extract / lossy read → LLM or local regexes  │
//! │     - StructuredAgent: csv / calamine → lab scan or data profile  │
//! │     - ImageAgent: image header → filename-keyword placeholder     │
//! │  3. AGGREGATE: outcomes in input order → summary + recommendations│
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Agents return report text for every input. Failures are described in
//! that text rather than returned as errors.

mod coordinator;
mod image_agent;
mod progress;
mod structured_agent;
mod table;
mod text_agent;

pub mod classifier;
pub mod types;


use async_trait::async_trait;
use std::path::Path;

pub use classifier::classify;
pub use coordinator::{generate_summary, BoilerplateRecommendations, Coordinator, RecommendationStrategy};
pub use image_agent::{FilenameHeuristic, ImageAgent, ImageInterpreter, ImageMetadata, ImageModality};
pub use progress::{progress_channel, ProgressSink};
pub use structured_agent::{flag_result, LabFlag, StructuredAgent};
pub use table::Table;
pub use text_agent::{simulate_analysis, TextAgent};
pub use types::{
    AnalysisPhase, AnalysisProgress, AnalysisReport, DocumentKind, DocumentOutcome, DocumentRef,
};

/// A unit of document-specific processing: one path in, one report out
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn process_document(&self, path: &Path) -> String;
}
