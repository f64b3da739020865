//! Shared types for the document analysis agents

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Coarse document category used to route a document to an agent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Text,
    Image,
    Structured,
    Unknown,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Structured => "structured",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path paired with its inferred kind for the duration of one run
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRef {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

impl DocumentRef {
    /// Final path component, or the whole path when there is none
    pub fn filename(&self) -> String {
        file_name_of(&self.path)
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Analysis of one input document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentOutcome {
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    /// Agent report; never empty, failures are described here
    pub content: String,
}

/// Aggregate output of one analysis run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub documents: Vec<DocumentOutcome>,
    pub summary: String,
    pub recommendations: String,
}

/// Progress event for host updates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisProgress {
    pub phase: AnalysisPhase,
    pub current: usize,
    pub total: usize,
    pub current_file: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    Starting,
    Processing,
    Dispatching,
    DocumentFailed,
    Summarizing,
    Complete,
    Aborted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&DocumentKind::Structured).unwrap(), "\"structured\"");
        assert_eq!(DocumentKind::Image.to_string(), "image");
    }

    #[test]
    fn test_outcome_uses_type_key() {
        let outcome = DocumentOutcome {
            filename: "labs.csv".to_string(),
            kind: DocumentKind::Structured,
            content: "report".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["type"], "structured");
        assert_eq!(json["filename"], "labs.csv");
    }

    #[test]
    fn test_document_ref_filename() {
        let doc = DocumentRef {
            path: PathBuf::from("/data/docs/scan.png"),
            kind: DocumentKind::Image,
        };
        assert_eq!(doc.filename(), "scan.png");
    }
}
