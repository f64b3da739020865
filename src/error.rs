//! Error taxonomy for document analysis.
//!
//! Agents never hand these to the coordinator: every variant is rendered
//! through `Display` and becomes the report text for its document.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0} file not found.")]
    NotFound(&'static str),

    #[error("Error extracting text: {0}")]
    Read(#[from] std::io::Error),

    #[error("Unsupported {0} format.")]
    UnsupportedFormat(&'static str),

    #[error("Error extracting PDF text: {0}")]
    Pdf(String),

    #[error("Error extracting data: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Error extracting data: {0}")]
    Csv(String),

    #[error("Error processing image: {0}")]
    Image(String),

    #[error("Error communicating with Gemini API: {0}")]
    Backend(String),

    #[error("LLM request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Error processing document: {0}")]
    Task(String),
}

impl From<csv::Error> for AnalysisError {
    fn from(e: csv::Error) -> Self {
        AnalysisError::Csv(e.to_string())
    }
}

impl From<tokio::task::JoinError> for AnalysisError {
    fn from(e: tokio::task::JoinError) -> Self {
        AnalysisError::Task(e.to_string())
    }
}

/// Extract a readable message from a caught panic payload
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_report_wording() {
        assert_eq!(
            AnalysisError::UnsupportedFormat("structured data").to_string(),
            "Unsupported structured data format."
        );
        assert_eq!(AnalysisError::NotFound("Image").to_string(), "Image file not found.");
        assert_eq!(
            AnalysisError::Csv("No columns to parse from file".into()).to_string(),
            "Error extracting data: No columns to parse from file"
        );
    }

    #[test]
    fn test_panic_message_variants() {
        let s: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(s.as_ref()), "boom");
        let s: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(s.as_ref()), "bang");
        let s: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(s.as_ref()), "unknown panic");
    }
}
