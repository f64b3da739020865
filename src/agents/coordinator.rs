//! Coordinator Agent
//!
//! Runs one analysis over an ordered list of documents: classify each path,
//! dispatch it to the matching agent, then build the summary and the
//! recommendations from the collected outcomes.
//!
//! Documents are processed one at a time in input order. A panic inside an
//! agent is caught here and recorded as that document's content; the run
//! always continues with the next path.

use super::classifier::classify;
use super::image_agent::ImageAgent;
use super::progress::ProgressSink;
use super::structured_agent::StructuredAgent;
use super::text_agent::TextAgent;
use super::types::*;
use super::DocumentAnalyzer;
use crate::config::AnalysisConfig;
use crate::error::panic_message;
use crate::llm::{GeminiClient, LlmBackend, NoLlm};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Builds the recommendations block of a report
pub trait RecommendationStrategy: Send + Sync {
    fn recommend(&self, documents: &[DocumentOutcome]) -> String;
}

/// Placeholder: the same advice for every report, not derived from content
#[derive(Debug, Default, Clone, Copy)]
pub struct BoilerplateRecommendations;

impl RecommendationStrategy for BoilerplateRecommendations {
    fn recommend(&self, _documents: &[DocumentOutcome]) -> String {
        let mut recommendations = String::from("RECOMMENDATIONS BASED ON DOCUMENT ANALYSIS\n\n");
        recommendations.push_str("1. Please discuss these findings with your healthcare provider.\n");
        recommendations.push_str("2. Regular follow-up is recommended for monitoring.\n");
        recommendations.push_str("3. Consider additional testing as advised by your physician.\n\n");
        recommendations.push_str(
            "DISCLAIMER: These are automated suggestions and not a substitute for professional medical advice.",
        );
        recommendations
    }
}

pub struct Coordinator {
    text_agent: Arc<dyn DocumentAnalyzer>,
    image_agent: Arc<dyn DocumentAnalyzer>,
    structured_agent: Arc<dyn DocumentAnalyzer>,
    recommendations: Arc<dyn RecommendationStrategy>,
}

impl Coordinator {
    /// Create a coordinator; a Gemini backend is used when the config carries a key
    pub fn new(config: &AnalysisConfig) -> Result<Self, String> {
        let llm: Arc<dyn LlmBackend> = if config.llm.has_api_key() {
            Arc::new(GeminiClient::new(config.llm.clone())?)
        } else {
            Arc::new(NoLlm)
        };
        Ok(Self::with_llm(config, llm))
    }

    /// Create a coordinator around an explicit LLM backend
    pub fn with_llm(config: &AnalysisConfig, llm: Arc<dyn LlmBackend>) -> Self {
        Self::with_agents(
            Arc::new(TextAgent::new(llm, config.max_analysis_chars)),
            Arc::new(ImageAgent::default()),
            Arc::new(StructuredAgent::new()),
        )
    }

    pub fn with_agents(
        text_agent: Arc<dyn DocumentAnalyzer>,
        image_agent: Arc<dyn DocumentAnalyzer>,
        structured_agent: Arc<dyn DocumentAnalyzer>,
    ) -> Self {
        Self {
            text_agent,
            image_agent,
            structured_agent,
            recommendations: Arc::new(BoilerplateRecommendations),
        }
    }

    pub fn with_recommendations(mut self, strategy: Arc<dyn RecommendationStrategy>) -> Self {
        self.recommendations = strategy;
        self
    }

    /// Analyze documents in order and aggregate the results
    pub async fn analyze_documents<P: AsRef<Path>>(
        &self,
        paths: &[P],
        progress: Option<&ProgressSink>,
    ) -> AnalysisReport {
        let never = AtomicBool::new(false);
        self.analyze_documents_with_abort(paths, progress, &never).await
    }

    /// Same as [`Self::analyze_documents`], stopping before the next document
    /// once `abort` is set. The report covers the documents already processed.
    pub async fn analyze_documents_with_abort<P: AsRef<Path>>(
        &self,
        paths: &[P],
        progress: Option<&ProgressSink>,
        abort: &AtomicBool,
    ) -> AnalysisReport {
        let total = paths.len();
        let notify = |phase: AnalysisPhase, current: usize, file: Option<&str>, message: String| {
            if let Some(sink) = progress {
                sink.status(phase, current, total, file, message);
            }
        };

        tracing::info!("[Coordinator] Analyzing {} documents", total);
        notify(AnalysisPhase::Starting, 0, None, "Analyzing documents...".to_string());

        let mut documents = Vec::with_capacity(total);

        for (i, path) in paths.iter().enumerate() {
            if abort.load(Ordering::SeqCst) {
                tracing::info!("[Coordinator] Aborted after {} of {} documents", i, total);
                notify(
                    AnalysisPhase::Aborted,
                    i,
                    None,
                    format!("Analysis aborted after {} of {} documents", i, total),
                );
                break;
            }

            let doc = DocumentRef {
                path: path.as_ref().to_path_buf(),
                kind: classify(path.as_ref()),
            };
            let filename = doc.filename();

            notify(
                AnalysisPhase::Processing,
                i + 1,
                Some(filename.as_str()),
                format!("Processing document {} of {}...", i + 1, total),
            );

            let content = self.process_with_agent(&doc, i + 1, &notify).await;

            documents.push(DocumentOutcome {
                filename,
                kind: doc.kind,
                content,
            });
        }

        notify(
            AnalysisPhase::Summarizing,
            documents.len(),
            None,
            "Generating summary and recommendations...".to_string(),
        );

        let summary = generate_summary(&documents);
        let recommendations = self.recommendations.recommend(&documents);

        notify(AnalysisPhase::Complete, documents.len(), None, "Analysis complete".to_string());
        tracing::info!("[Coordinator] Finished: {} documents analyzed", documents.len());

        AnalysisReport {
            documents,
            summary,
            recommendations,
        }
    }

    fn agent_for(&self, kind: DocumentKind) -> (&Arc<dyn DocumentAnalyzer>, &'static str) {
        match kind {
            DocumentKind::Text => (&self.text_agent, "Processing text document..."),
            DocumentKind::Image => (&self.image_agent, "Processing image document..."),
            DocumentKind::Structured => (&self.structured_agent, "Processing structured document..."),
            DocumentKind::Unknown => (
                &self.text_agent,
                "Unknown document type, attempting text processing...",
            ),
        }
    }

    async fn process_with_agent<F>(&self, doc: &DocumentRef, current: usize, notify: &F) -> String
    where
        F: Fn(AnalysisPhase, usize, Option<&str>, String),
    {
        let filename = doc.filename();
        let (agent, message) = self.agent_for(doc.kind);
        notify(AnalysisPhase::Dispatching, current, Some(filename.as_str()), message.to_string());

        tracing::debug!(
            "[Coordinator] {} -> {} agent",
            doc.path.display(),
            doc.kind
        );

        match AssertUnwindSafe(agent.process_document(&doc.path))
            .catch_unwind()
            .await
        {
            Ok(content) if content.trim().is_empty() => {
                tracing::warn!("[Coordinator] Empty result for {}", doc.path.display());
                "No analysis result was produced for this document.".to_string()
            }
            Ok(content) => content,
            Err(panic) => {
                let message = format!("Error processing document: {}", panic_message(panic.as_ref()));
                tracing::error!("[Coordinator] Agent panicked on {}: {}", doc.path.display(), message);
                notify(AnalysisPhase::DocumentFailed, current, Some(filename.as_str()), message.clone());
                message
            }
        }
    }
}

/// Digest of every outcome: filename, kind, and the first three non-blank
/// lines of its content
pub fn generate_summary(documents: &[DocumentOutcome]) -> String {
    let mut summary = String::from("MEDICAL DOCUMENT ANALYSIS SUMMARY\n\n");

    for doc in documents {
        summary.push_str(&format!("Document: {} (Type: {})\n", doc.filename, doc.kind));

        let points = doc
            .content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(3);
        for point in points {
            summary.push_str(&format!("- {}\n", point));
        }

        summary.push('\n');
    }

    summary
}
