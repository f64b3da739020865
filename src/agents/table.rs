//! Tabular data loading for CSV and Excel documents
//!
//! Cells keep their display text; `None` marks a missing value. Numeric
//! interpretation happens per column on demand.

use crate::error::AnalysisError;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Field values read as missing in CSV input
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub type Cell = Option<String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    /// Every row has exactly `columns.len()` cells
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    pub fn missing_count(&self, idx: usize) -> usize {
        self.column(idx).filter(|c| c.is_none()).count()
    }

    /// Values of a column when every present cell is numeric, `None` otherwise
    pub fn numeric_values(&self, idx: usize) -> Option<Vec<f64>> {
        let mut values = Vec::new();
        for cell in self.column(idx).flatten() {
            values.push(parse_number(cell)?);
        }
        Some(values)
    }

    fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn csv_cell(field: &str) -> Cell {
    if NA_VALUES.contains(&field) {
        None
    } else {
        Some(field.to_string())
    }
}

/// Parse a comma-delimited file with a header row
pub fn read_csv(path: &Path) -> Result<Table, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(AnalysisError::Csv("No columns to parse from file".to_string()));
    }

    let mut table = Table {
        columns: headers.iter().map(str::to_string).collect(),
        rows: Vec::new(),
    };

    for record in reader.records() {
        let record = record?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        table.push_row(record.iter().take(table.columns.len()).map(csv_cell).collect());
    }

    tracing::debug!(
        "[Table] CSV {} rows x {} columns from {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(table)
}

fn excel_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::Error(_) => None,
        other => Some(other.to_string()),
    }
}

/// Read the first worksheet of an .xlsx / .xls workbook, first row as header
pub fn read_excel(path: &Path) -> Result<Table, AnalysisError> {
    let mut workbook = open_workbook_auto(path)?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(AnalysisError::Csv("Workbook has no worksheets".to_string())),
    };

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| AnalysisError::Csv("No columns to parse from file".to_string()))?;

    let mut table = Table {
        columns: header
            .iter()
            .enumerate()
            .map(|(i, cell)| match excel_cell(cell) {
                Some(name) => name,
                None => format!("Unnamed: {}", i),
            })
            .collect(),
        rows: Vec::new(),
    };

    for row in rows {
        let cells: Vec<Cell> = row.iter().map(excel_cell).collect();
        // Trailing blank rows inside the used range carry no data
        if cells.iter().all(Option::is_none) {
            continue;
        }
        table.push_row(cells);
    }

    tracing::debug!(
        "[Table] Excel {} rows x {} columns from {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::tests::write_xlsx;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_read_csv_with_missing_values() {
        let file = csv_file("name,age\nAnn,34\nBob,\n\nCid,NA\n");
        let table = read_csv(file.path()).unwrap();

        assert_eq!(table.columns, vec!["name", "age"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.missing_count(1), 2);
        assert_eq!(table.numeric_values(1), Some(vec![34.0]));
        assert_eq!(table.numeric_values(0), None);
    }

    #[test]
    fn test_read_csv_quoted_fields_and_short_rows() {
        let file = csv_file("test,comment\n\"Glucose, fasting\",\"said \"\"hi\"\"\"\nLDL\n");
        let table = read_csv(file.path()).unwrap();

        assert_eq!(table.rows[0][0].as_deref(), Some("Glucose, fasting"));
        assert_eq!(table.rows[0][1].as_deref(), Some("said \"hi\""));
        assert_eq!(table.rows[1], vec![Some("LDL".to_string()), None]);
    }

    #[test]
    fn test_read_empty_csv_is_error() {
        let file = csv_file("");
        let err = read_csv(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Error extracting data:"));
    }

    #[test]
    fn test_read_excel_first_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labs.xlsx");
        write_xlsx(
            &path,
            &[
                (
                    "Labs",
                    vec![
                        vec!["Test", "", "Result"],
                        vec!["Glucose", "fasting", "110H"],
                        vec!["", "", ""],
                        vec!["Sodium", "", "140"],
                    ],
                ),
                ("Notes", vec![vec!["ignored"], vec!["1"]]),
            ],
        );

        let table = read_excel(&path).unwrap();

        // Blank header cells get positional names; the blank row is dropped
        assert_eq!(table.columns, vec!["Test", "Unnamed: 1", "Result"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.rows[0],
            vec![
                Some("Glucose".to_string()),
                Some("fasting".to_string()),
                Some("110H".to_string())
            ]
        );
        assert_eq!(
            table.rows[1],
            vec![Some("Sodium".to_string()), None, Some("140".to_string())]
        );
        assert_eq!(table.missing_count(1), 1);
    }

    #[test]
    fn test_read_excel_garbage_is_error() {
        let mut file = NamedTempFile::with_suffix(".xlsx").unwrap();
        write!(file, "not a workbook").unwrap();
        let err = read_excel(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Error extracting data:"));
    }
}
