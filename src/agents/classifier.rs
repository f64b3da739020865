//! Document type classification
//!
//! Routes a path to an agent using its extension and a guessed MIME type.
//! Never touches the file itself.

use super::types::DocumentKind;
use std::path::Path;

const SPREADSHEET_MIME_TYPES: [&str; 2] = [
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// Lower-cased extension without the dot
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
}

/// Classify a document path. Unknown types fall back to text.
pub fn classify(path: &Path) -> DocumentKind {
    let ext = extension_of(path);

    match ext.as_deref() {
        Some("pdf" | "txt" | "docx" | "doc" | "rtf") => return DocumentKind::Text,
        Some("jpg" | "jpeg" | "png" | "bmp" | "gif" | "tiff") => return DocumentKind::Image,
        Some("csv" | "xls" | "xlsx") => return DocumentKind::Structured,
        _ => {}
    }

    if let Some(mime) = mime_guess::from_path(path).first() {
        let essence = mime.essence_str();
        if essence.starts_with("text/") {
            return DocumentKind::Text;
        }
        if essence.starts_with("image/") {
            return DocumentKind::Image;
        }
        if SPREADSHEET_MIME_TYPES.contains(&essence) {
            return DocumentKind::Structured;
        }
    }

    DocumentKind::Text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(p: &str) -> DocumentKind {
        classify(Path::new(p))
    }

    #[test]
    fn test_text_extensions() {
        for p in ["a.pdf", "a.txt", "a.docx", "a.doc", "a.rtf", "REPORT.PDF"] {
            assert_eq!(kind(p), DocumentKind::Text, "{}", p);
        }
    }

    #[test]
    fn test_image_extensions() {
        for p in ["a.jpg", "a.jpeg", "a.png", "a.bmp", "a.gif", "a.tiff", "Scan.JPG"] {
            assert_eq!(kind(p), DocumentKind::Image, "{}", p);
        }
    }

    #[test]
    fn test_structured_extensions() {
        for p in ["a.csv", "a.xls", "a.xlsx", "LABS.CSV"] {
            assert_eq!(kind(p), DocumentKind::Structured, "{}", p);
        }
    }

    #[test]
    fn test_mime_fallback() {
        // Not in the extension tables, but mime_guess knows them
        assert_eq!(kind("notes.md"), DocumentKind::Text);
        assert_eq!(kind("photo.webp"), DocumentKind::Image);
    }

    #[test]
    fn test_unknown_defaults_to_text() {
        assert_eq!(kind("mystery.zzqx"), DocumentKind::Text);
        assert_eq!(kind("no_extension"), DocumentKind::Text);
    }
}
