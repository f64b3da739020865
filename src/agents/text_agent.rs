//! Text Extraction Agent
//!
//! Pulls plain text out of text-like documents and turns it into a structured
//! summary (patient info, diagnoses, medications, labs).
//!
//! ## Strategy
//! 1. Extract text by extension (PDF page by page, lossy plain-text reads)
//! 2. With an LLM key: send a truncated copy of the text with a fixed prompt
//! 3. Without one: run the local regex analysis

use super::classifier::extension_of;
use super::DocumentAnalyzer;
use crate::error::{panic_message, AnalysisError};
use crate::llm::LlmBackend;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;

pub const NO_TEXT_MESSAGE: &str = "Could not extract text from document.";

/// Word formats are not parsed yet; this text stands in for their content
pub const WORD_PLACEHOLDER: &str =
    "[Word document text extraction is not implemented. Convert the document to PDF or plain text for analysis.]";

const TRUNCATION_MARKER: &str = "...[truncated]";

const SYSTEM_PROMPT: &str = "You are a medical document analysis assistant. \
Your task is to extract and organize key information from medical documents.
Focus on facts and clinical details rather than interpretation.
Format your response in a clear, structured way with headings and bullet points.";

static PATIENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Patient:?\s*([A-Za-z][A-Za-z \t]*)").expect("valid regex"));
static DOB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"DOB:?\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})").expect("valid regex"));
static DIAGNOSIS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Diagnosis:?\s*([^\s:][^\r\n]*)").expect("valid regex"));
static MEDICATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\s+(\d+\s*mg)").expect("valid regex"));

pub struct TextAgent {
    llm: Arc<dyn LlmBackend>,
    max_analysis_chars: usize,
}

impl TextAgent {
    pub fn new(llm: Arc<dyn LlmBackend>, max_analysis_chars: usize) -> Self {
        Self {
            llm,
            max_analysis_chars,
        }
    }

    /// Extract raw text, dispatching on the file extension
    async fn extract_text(&self, path: &Path) -> Result<String, AnalysisError> {
        match extension_of(path).as_deref() {
            Some("pdf") => extract_pdf(path).await,
            Some("txt" | "text") => {
                let bytes = tokio::fs::read(path).await?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            Some("docx" | "doc") => Ok(WORD_PLACEHOLDER.to_string()),
            _ => match tokio::fs::read(path).await {
                Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
                Err(e) => {
                    tracing::debug!("[TextAgent] Raw read failed for {}: {}", path.display(), e);
                    Err(AnalysisError::UnsupportedFormat("document"))
                }
            },
        }
    }

    async fn analyze_text(&self, text: &str) -> String {
        if !self.llm.is_configured() {
            tracing::debug!("[TextAgent] No LLM configured, using local analysis");
            return simulate_analysis(text);
        }

        let prompt = build_analysis_prompt(&truncate_for_analysis(text, self.max_analysis_chars));
        let response = self.llm.complete(SYSTEM_PROMPT, &[], &prompt).await;

        if response.trim().is_empty() {
            tracing::warn!("[TextAgent] LLM returned an empty response");
            return "The analysis service returned an empty response.".to_string();
        }
        response
    }
}

#[async_trait]
impl DocumentAnalyzer for TextAgent {
    async fn process_document(&self, path: &Path) -> String {
        let text = match self.extract_text(path).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("[TextAgent] Extraction failed for {}: {}", path.display(), e);
                return e.to_string();
            }
        };

        if text.trim().is_empty() {
            return NO_TEXT_MESSAGE.to_string();
        }

        tracing::debug!(
            "[TextAgent] Extracted {} chars from {}",
            text.len(),
            path.display()
        );

        self.analyze_text(&text).await
    }
}

/// Extract PDF text page by page, separating pages with a blank line.
/// pdf-extract can panic on malformed fonts, so the call is isolated.
async fn extract_pdf(path: &Path) -> Result<String, AnalysisError> {
    let bytes = tokio::fs::read(path).await?;

    let pages = tokio::task::spawn_blocking(move || {
        std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(&bytes))
    })
    .await?;

    match pages {
        Ok(Ok(pages)) => {
            let mut text = String::new();
            for page in &pages {
                text.push_str(page);
                text.push_str("\n\n");
            }
            tracing::debug!("[TextAgent] PDF: {} pages, {} chars", pages.len(), text.len());
            Ok(text)
        }
        Ok(Err(e)) => Err(AnalysisError::Pdf(e.to_string())),
        Err(panic) => Err(AnalysisError::Pdf(format!(
            "extractor panicked ({}) - likely malformed fonts",
            panic_message(panic.as_ref())
        ))),
    }
}

/// Cut text to `max_chars` characters, marking the cut
pub fn truncate_for_analysis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{}", &text[..idx], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

fn build_analysis_prompt(text: &str) -> String {
    format!(
        r#"Analyze this medical document and extract key information:
- Patient information
- Diagnoses
- Medications and dosages
- Lab values and test results
- Treatment recommendations
- Follow-up instructions

Format the results in a structured, readable way.

Document text:
{}
"#,
        text
    )
}

/// Deterministic regex analysis used when no LLM is configured
pub fn simulate_analysis(text: &str) -> String {
    let mut analysis = String::from("DOCUMENT ANALYSIS\n\n");

    let patient_name = PATIENT_RE
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Not found".to_string());
    let dob = DOB_RE
        .captures(text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "Not found".to_string());

    analysis.push_str("PATIENT INFORMATION:\n");
    analysis.push_str(&format!("- Name: {}\n", patient_name));
    analysis.push_str(&format!("- DOB: {}\n\n", dob));

    analysis.push_str("DIAGNOSES:\n");
    match DIAGNOSIS_RE.captures(text) {
        Some(c) => analysis.push_str(&format!("- {}\n\n", c[1].trim())),
        None => analysis.push_str("- No clear diagnoses found\n\n"),
    }

    analysis.push_str("MEDICATIONS:\n");
    let mut meds_found = false;
    for c in MEDICATION_RE.captures_iter(text) {
        analysis.push_str(&format!("- {}: {}\n", &c[1], &c[2]));
        meds_found = true;
    }
    if !meds_found {
        analysis.push_str("- No medications clearly identified\n");
    }
    analysis.push('\n');

    analysis.push_str(
        "NOTE: This analysis was generated locally without an LLM. \
Configure an API key for a comprehensive analysis.",
    );

    analysis
}
