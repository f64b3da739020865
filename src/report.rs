//! Report persistence
//!
//! A finished analysis is saved twice: pretty JSON for reloading and a plain
//! text rendering for reading. Both share the stem
//! `<patient>_Report_<YYYYmmdd_HHMMSS>`.

use crate::agents::AnalysisReport;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

pub struct ReportWriter {
    reports_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    /// Write the JSON and text forms of `report`, returning (json, txt) paths
    pub fn write(&self, report: &AnalysisReport, patient: &str) -> Result<(PathBuf, PathBuf), String> {
        self.write_at(report, patient, Local::now())
    }

    fn write_at(
        &self,
        report: &AnalysisReport,
        patient: &str,
        now: DateTime<Local>,
    ) -> Result<(PathBuf, PathBuf), String> {
        fs::create_dir_all(&self.reports_dir)
            .map_err(|e| format!("Failed to create reports directory: {}", e))?;

        let stem = format!(
            "{}_Report_{}",
            sanitize_name(patient),
            now.format("%Y%m%d_%H%M%S")
        );
        let json_path = self.reports_dir.join(format!("{}.json", stem));
        let text_path = self.reports_dir.join(format!("{}.txt", stem));

        let json = serde_json::to_string_pretty(report)
            .map_err(|e| format!("Failed to serialize report: {}", e))?;
        fs::write(&json_path, json).map_err(|e| format!("Failed to write report: {}", e))?;

        let text = render_text(report, patient, &now.format("%Y-%m-%d %H:%M:%S").to_string());
        fs::write(&text_path, text).map_err(|e| format!("Failed to write report: {}", e))?;

        tracing::info!("[Report] Saved {}", json_path.display());
        Ok((json_path, text_path))
    }
}

/// Plain-text rendering with SUMMARY, DOCUMENT ANALYSIS and RECOMMENDATIONS
pub fn render_text(report: &AnalysisReport, patient: &str, date: &str) -> String {
    let mut out = String::from("Medical Document Analysis Report\n");
    out.push_str(&format!("Patient: {}\n", patient));
    out.push_str(&format!("Date: {}\n\n", date));

    out.push_str("SUMMARY\n=======\n");
    out.push_str(&report.summary);
    out.push_str("\n\n");

    out.push_str("DOCUMENT ANALYSIS\n=================\n");
    for doc in &report.documents {
        out.push_str(&format!("Document: {}\n", doc.filename));
        out.push_str(&format!("Type: {}\n", doc.kind));
        out.push_str("Content:\n");
        out.push_str(&doc.content);
        out.push_str("\n\n");
    }

    out.push_str("RECOMMENDATIONS\n===============\n");
    out.push_str(&report.recommendations);
    out
}

/// Parse a JSON report written by [`ReportWriter::write`]
pub fn load_report(path: &Path) -> Result<AnalysisReport, String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("Failed to read report: {}", e))?;
    serde_json::from_str(&raw).map_err(|e| format!("Invalid report file: {}", e))
}

/// Keep file-name-safe characters; everything else becomes '_'
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "patient".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{DocumentKind, DocumentOutcome};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample_report() -> AnalysisReport {
        AnalysisReport {
            documents: vec![DocumentOutcome {
                filename: "labs.csv".to_string(),
                kind: DocumentKind::Structured,
                content: "LABORATORY RESULTS ANALYSIS".to_string(),
            }],
            summary: "MEDICAL DOCUMENT ANALYSIS SUMMARY\n\n".to_string(),
            recommendations: "RECOMMENDATIONS BASED ON DOCUMENT ANALYSIS".to_string(),
        }
    }

    #[test]
    fn test_write_and_reload() {
        let dir = tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("reports"));
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        let (json_path, text_path) = writer.write_at(&sample_report(), "Jane Doe", now).unwrap();

        assert_eq!(
            json_path.file_name().unwrap().to_str().unwrap(),
            "Jane_Doe_Report_20240309_140507.json"
        );
        assert_eq!(
            text_path.file_name().unwrap().to_str().unwrap(),
            "Jane_Doe_Report_20240309_140507.txt"
        );
        assert_eq!(load_report(&json_path).unwrap(), sample_report());

        let text = std::fs::read_to_string(&text_path).unwrap();
        assert!(text.contains("Patient: Jane Doe\nDate: 2024-03-09 14:05:07\n"));
        assert!(text.contains("Document: labs.csv\nType: structured\nContent:\n"));
    }

    #[test]
    fn test_json_uses_type_field() {
        let json = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(json["documents"][0]["type"], "structured");
    }

    #[test]
    fn test_render_section_order() {
        let text = render_text(&sample_report(), "Jane", "2024-01-01 00:00:00");
        let summary = text.find("SUMMARY\n=======").unwrap();
        let analysis = text.find("DOCUMENT ANALYSIS\n=================").unwrap();
        let recs = text.find("RECOMMENDATIONS\n===============").unwrap();
        assert!(summary < analysis && analysis < recs);
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Jane Doe"), "Jane_Doe");
        assert_eq!(sanitize_name("../etc"), "___etc");
        assert_eq!(sanitize_name("   "), "patient");
    }

    #[test]
    fn test_load_invalid_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_report(&path).unwrap_err().starts_with("Invalid report file"));
    }
}
