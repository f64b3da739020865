//! Structured-Data Agent
//!
//! Loads CSV / Excel tables and reports on them. Tables whose column names
//! look like laboratory results get an abnormal-result scan; everything else
//! gets a completeness check and a row sample.

use super::classifier::extension_of;
use super::table::{read_csv, read_excel, Table};
use super::DocumentAnalyzer;
use crate::error::AnalysisError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Column-name fragments that mark a table as lab data
const LAB_COLUMN_TERMS: [&str; 15] = [
    "test", "lab", "result", "value", "reference", "range", "unit", "normal", "high", "low",
    "wbc", "rbc", "hgb", "plt", "glucose",
];

const NOTE: &str = "\nNOTE: This is an automated heuristic analysis of structured data. \
Findings should be reviewed by a qualified healthcare provider.";

#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredAgent;

impl StructuredAgent {
    pub fn new() -> Self {
        Self
    }

    async fn load(&self, path: &Path) -> Result<Table, AnalysisError> {
        let owned: PathBuf = path.to_path_buf();
        match extension_of(path).as_deref() {
            Some("csv") => tokio::task::spawn_blocking(move || read_csv(&owned)).await?,
            Some("xlsx" | "xls") => tokio::task::spawn_blocking(move || read_excel(&owned)).await?,
            _ => Err(AnalysisError::UnsupportedFormat("structured data")),
        }
    }
}

#[async_trait]
impl DocumentAnalyzer for StructuredAgent {
    async fn process_document(&self, path: &Path) -> String {
        match self.load(path).await {
            Ok(table) => analyze_table(&table),
            Err(e) => {
                tracing::warn!("[StructuredAgent] Load failed for {}: {}", path.display(), e);
                e.to_string()
            }
        }
    }
}

/// High / low flag for a lab result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabFlag {
    High,
    Low,
}

impl LabFlag {
    pub fn label(&self) -> &'static str {
        match self {
            LabFlag::High => "HIGH",
            LabFlag::Low => "LOW",
        }
    }
}

/// One scanned row of lab data
#[derive(Debug, Clone, PartialEq)]
pub struct LabRow<'a> {
    pub test_name: &'a str,
    pub result: &'a str,
    pub reference_range: Option<&'a str>,
}

/// Role assignment for lab columns; later matching columns replace earlier ones
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LabColumns {
    pub test: Option<usize>,
    pub result: Option<usize>,
    pub reference: Option<usize>,
}

pub fn is_lab_data(columns: &[String]) -> bool {
    columns.iter().any(|col| {
        let col = col.to_lowercase();
        LAB_COLUMN_TERMS.iter().any(|term| col.contains(term))
    })
}

pub fn identify_lab_columns(columns: &[String]) -> LabColumns {
    let mut roles = LabColumns::default();
    for (idx, col) in columns.iter().enumerate() {
        let col = col.to_lowercase();
        if col.contains("test") || col.contains("name") {
            roles.test = Some(idx);
        } else if col.contains("result") || col.contains("value") {
            roles.result = Some(idx);
        } else if col.contains("reference") || col.contains("range") || col.contains("normal") {
            roles.reference = Some(idx);
        }
    }
    roles
}

/// Flag a raw result by the letters it contains.
///
/// Any `H`/`h` means high, otherwise any `L`/`l` means low. Text such as
/// `mmHg` or `LDH` therefore flags too.
pub fn flag_result(result: &str) -> Option<LabFlag> {
    if result.contains(['H', 'h']) {
        Some(LabFlag::High)
    } else if result.contains(['L', 'l']) {
        Some(LabFlag::Low)
    } else {
        None
    }
}

/// Render the full report for a loaded table. The filename is left to the
/// report header so it appears once per document.
pub fn analyze_table(table: &Table) -> String {
    let mut analysis = String::from("STRUCTURED DATA ANALYSIS\n\n");

    analysis.push_str("DATA OVERVIEW:\n");
    analysis.push_str(&format!("- Rows: {}\n", table.row_count()));
    analysis.push_str(&format!("- Columns: {}\n", table.column_count()));
    analysis.push_str(&format!("- Column names: {}\n\n", table.columns.join(", ")));

    if is_lab_data(&table.columns) {
        analysis.push_str(&analyze_lab_data(table));
    } else {
        analysis.push_str(&analyze_generic_data(table));
    }

    analysis.push_str(NOTE);
    analysis
}

fn analyze_lab_data(table: &Table) -> String {
    let mut analysis = String::from("LABORATORY DATA ANALYSIS:\n");
    let roles = identify_lab_columns(&table.columns);

    let (Some(test_col), Some(result_col)) = (roles.test, roles.result) else {
        analysis.push_str("Statistical summary of numerical columns:\n");
        analysis.push_str(&numeric_summary(table));
        return analysis;
    };

    analysis.push_str("Potentially abnormal results:\n");
    let mut abnormal_found = false;

    for row in &table.rows {
        let (Some(test_name), Some(result)) = (row[test_col].as_deref(), row[result_col].as_deref())
        else {
            continue;
        };

        let lab = LabRow {
            test_name,
            result,
            reference_range: roles.reference.and_then(|idx| row[idx].as_deref()),
        };

        if let Some(flag) = flag_result(lab.result) {
            abnormal_found = true;
            analysis.push_str(&format!(
                "- {}: {} ({}) - Reference: {}\n",
                lab.test_name,
                lab.result,
                flag.label(),
                lab.reference_range.unwrap_or("N/A")
            ));
        }
    }

    if !abnormal_found {
        analysis.push_str("- No clearly abnormal results identified in the data\n");
    }

    analysis
}

fn numeric_summary(table: &Table) -> String {
    let mut summary = String::new();

    for (idx, col) in table.columns.iter().enumerate() {
        let Some(values) = table.numeric_values(idx) else {
            continue;
        };
        if values.is_empty() {
            continue;
        }

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        summary.push_str(&format!("- {}:\n", col));
        summary.push_str(&format!("  Average: {:.2}\n", mean));
        summary.push_str(&format!("  Min: {:.2}\n", min));
        summary.push_str(&format!("  Max: {:.2}\n", max));
    }

    summary
}

fn analyze_generic_data(table: &Table) -> String {
    let mut analysis = String::from("GENERAL DATA ANALYSIS:\n");

    let missing: Vec<(&String, usize)> = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, col)| (col, table.missing_count(idx)))
        .filter(|(_, count)| *count > 0)
        .collect();

    if missing.is_empty() {
        analysis.push_str("No missing values found in the data.\n");
    } else {
        analysis.push_str("Columns with missing values:\n");
        for (col, count) in missing {
            let pct = count as f64 / table.row_count() as f64 * 100.0;
            analysis.push_str(&format!("- {}: {} missing values ({:.1}%)\n", col, count, pct));
        }
    }

    analysis.push_str("\nSample data (first 3 rows):\n");

    let sample: Vec<String> = table
        .rows
        .iter()
        .take(3)
        .map(|row| {
            let fields: Vec<String> = table
                .columns
                .iter()
                .zip(row)
                .map(|(col, cell)| format!("{}: {}", col, cell.as_deref().unwrap_or("nan")))
                .collect();
            format!("- {}", fields.join(" | "))
        })
        .collect();

    analysis.push_str(&sample.join("\n"));
    analysis
}
