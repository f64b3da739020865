//! Image Agent
//!
//! Reads image header metadata and attaches a modality guess. No pixel
//! content is interpreted: the only `ImageInterpreter` is the filename
//! heuristic, which stands in until a vision model is wired up.

use super::types::file_name_of;
use super::DocumentAnalyzer;
use crate::error::AnalysisError;
use async_trait::async_trait;
use image::{ColorType, ImageDecoder, ImageFormat, ImageReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DISCLAIMER: &str = "\nDISCLAIMER: This analysis is based on file metadata only.\n\
No actual medical image analysis has been performed.\n\
Always consult with a qualified healthcare provider for proper interpretation.";

/// Header facts about an image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMetadata {
    pub filename: String,
    pub format: String,
    pub mode: String,
    pub width: u32,
    pub height: u32,
}

/// Imaging modality guessed for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageModality {
    XRay,
    Mri,
    Ct,
    Ultrasound,
    Undetermined,
}

impl ImageModality {
    /// Keyword match on the lower-cased filename; earlier keywords win
    pub fn from_filename(filename: &str) -> Self {
        let name = filename.to_lowercase();
        if name.contains("xray") || name.contains("x-ray") {
            Self::XRay
        } else if name.contains("mri") {
            Self::Mri
        } else if name.contains("ct") {
            Self::Ct
        } else if name.contains("ultrasound") {
            Self::Ultrasound
        } else {
            Self::Undetermined
        }
    }

    fn narrative(&self) -> &'static str {
        match self {
            Self::XRay => "Image appears to be an X-ray.\n\
Analysis would identify anatomical structures and potential abnormalities.\n",
            Self::Mri => "Image appears to be an MRI scan.\n\
Analysis would assess soft tissue structures and potential pathologies.\n",
            Self::Ct => "Image appears to be a CT scan.\n\
Analysis would evaluate cross-sectional anatomy and potential abnormalities.\n",
            Self::Ultrasound => "Image appears to be an ultrasound.\n\
Analysis would examine soft tissue structures and potential findings.\n",
            Self::Undetermined => "Image type not determined from filename.\n\
Full analysis would identify the image type and relevant medical findings.\n",
        }
    }
}

/// Turns image metadata into the content section of the report
pub trait ImageInterpreter: Send + Sync {
    fn interpret(&self, metadata: &ImageMetadata) -> String;
}

/// Placeholder interpreter: guesses the modality from filename keywords only
#[derive(Debug, Default, Clone, Copy)]
pub struct FilenameHeuristic;

impl ImageInterpreter for FilenameHeuristic {
    fn interpret(&self, metadata: &ImageMetadata) -> String {
        let mut section = String::from(
            "Pixel content is not analyzed. The modality below is guessed from the filename.\n\n",
        );
        section.push_str(ImageModality::from_filename(&metadata.filename).narrative());
        section
    }
}

pub struct ImageAgent {
    interpreter: Arc<dyn ImageInterpreter>,
}

impl Default for ImageAgent {
    fn default() -> Self {
        Self::new(Arc::new(FilenameHeuristic))
    }
}

impl ImageAgent {
    pub fn new(interpreter: Arc<dyn ImageInterpreter>) -> Self {
        Self { interpreter }
    }
}

#[async_trait]
impl DocumentAnalyzer for ImageAgent {
    async fn process_document(&self, path: &Path) -> String {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return AnalysisError::NotFound("Image").to_string();
        }

        let mut analysis = String::from("MEDICAL IMAGE ANALYSIS\n\n");

        let owned: PathBuf = path.to_path_buf();
        let metadata = match tokio::task::spawn_blocking(move || read_metadata(&owned)).await {
            Ok(result) => result,
            Err(e) => Err(AnalysisError::from(e)),
        };

        let metadata = match metadata {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("[ImageAgent] Could not read {}: {}", path.display(), e);
                analysis.push_str(&format!("{}\n", e));
                return analysis;
            }
        };

        analysis.push_str(&format!("Format: {}\n", metadata.format));
        analysis.push_str(&format!("Mode: {}\n", metadata.mode));
        analysis.push_str(&format!(
            "Dimensions: {} x {} pixels\n\n",
            metadata.width, metadata.height
        ));

        analysis.push_str("IMAGE CONTENT:\n");
        analysis.push_str(&self.interpreter.interpret(&metadata));
        analysis.push_str(DISCLAIMER);
        analysis
    }
}

/// Read format, colour mode and dimensions from the header without decoding pixels
pub fn read_metadata(path: &Path) -> Result<ImageMetadata, AnalysisError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| AnalysisError::Image(e.to_string()))?;

    let format = reader
        .format()
        .ok_or_else(|| AnalysisError::Image("Unrecognized image format".to_string()))?;

    let decoder = reader
        .into_decoder()
        .map_err(|e| AnalysisError::Image(e.to_string()))?;
    let (width, height) = decoder.dimensions();

    Ok(ImageMetadata {
        filename: file_name_of(path),
        format: format_name(format),
        mode: color_mode(decoder.color_type()),
        width,
        height,
    })
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        ImageFormat::Bmp => "BMP".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        other => format!("{:?}", other).to_uppercase(),
    }
}

fn color_mode(color: ColorType) -> String {
    match color {
        ColorType::L8 => "L".to_string(),
        ColorType::La8 => "LA".to_string(),
        ColorType::Rgb8 => "RGB".to_string(),
        ColorType::Rgba8 => "RGBA".to_string(),
        ColorType::L16 => "I;16".to_string(),
        ColorType::La16 => "LA;16".to_string(),
        ColorType::Rgb16 => "RGB;16".to_string(),
        ColorType::Rgba16 => "RGBA;16".to_string(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_modality_from_filename() {
        assert_eq!(ImageModality::from_filename("chest_XRAY.png"), ImageModality::XRay);
        assert_eq!(ImageModality::from_filename("knee-x-ray.jpg"), ImageModality::XRay);
        assert_eq!(ImageModality::from_filename("brain_mri.png"), ImageModality::Mri);
        assert_eq!(ImageModality::from_filename("abdomen_CT.png"), ImageModality::Ct);
        assert_eq!(ImageModality::from_filename("ultrasound_12w.png"), ImageModality::Ultrasound);
        assert_eq!(ImageModality::from_filename("holiday.png"), ImageModality::Undetermined);
    }

    #[test]
    fn test_ct_keyword_matches_inside_words() {
        // Substring match: "doctor" contains "ct"
        assert_eq!(ImageModality::from_filename("doctor_note.png"), ImageModality::Ct);
    }

    #[tokio::test]
    async fn test_png_metadata_and_xray_narrative() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chest_xray.png");
        RgbImage::new(64, 32).save(&path).unwrap();

        let report = ImageAgent::default().process_document(&path).await;

        assert!(report.starts_with("MEDICAL IMAGE ANALYSIS\n\nFormat: PNG\n"));
        assert!(!report.contains("chest_xray.png"));
        assert!(report.contains("Format: PNG\n"));
        assert!(report.contains("Mode: RGB\n"));
        assert!(report.contains("Dimensions: 64 x 32 pixels\n"));
        assert!(report.contains("Image appears to be an X-ray."));
        assert!(report.contains("No actual medical image analysis has been performed."));
    }

    #[tokio::test]
    async fn test_grayscale_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.png");
        GrayImage::new(8, 8).save(&path).unwrap();

        let metadata = read_metadata(&path).unwrap();
        assert_eq!(metadata.mode, "L");
        assert_eq!((metadata.width, metadata.height), (8, 8));
    }

    #[tokio::test]
    async fn test_missing_image() {
        let report = ImageAgent::default()
            .process_document(Path::new("/definitely/not/here.png"))
            .await;
        assert_eq!(report, "Image file not found.");
    }

    #[tokio::test]
    async fn test_corrupt_image_reports_error_and_stops() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("brain_mri.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let report = ImageAgent::default().process_document(&path).await;
        assert!(report.contains("Error processing image:"), "{}", report);
        assert!(!report.contains("IMAGE CONTENT"));
    }

    struct FixedInterpreter;

    impl ImageInterpreter for FixedInterpreter {
        fn interpret(&self, metadata: &ImageMetadata) -> String {
            format!("model says {}x{}\n", metadata.width, metadata.height)
        }
    }

    #[tokio::test]
    async fn test_interpreter_is_pluggable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.png");
        RgbImage::new(2, 3).save(&path).unwrap();

        let report = ImageAgent::new(Arc::new(FixedInterpreter)).process_document(&path).await;
        assert!(report.contains("model says 2x3"));
    }
}
