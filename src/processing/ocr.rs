use std::path::{Path, PathBuf};

use log::{debug, warn};
use tesseract::Tesseract;

use crate::config::EngineConfig;
use crate::models::{DecodedTextBlock, Script};
use crate::utils::ExtractionError;

/// Black-box text recognizer: image + language hint -> text.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image_path: &Path, language: &str) -> Result<String, ExtractionError>;
}

/// Tesseract through libtesseract, data location injected from config.
pub struct TesseractEngine {
    datapath: Option<PathBuf>,
}

impl TesseractEngine {
    pub fn new(config: &EngineConfig) -> Self {
        TesseractEngine {
            datapath: config.datapath.clone(),
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image_path: &Path, language: &str) -> Result<String, ExtractionError> {
        let datapath = self
            .datapath
            .as_deref()
            .map(|path| {
                path.to_str().ok_or_else(|| {
                    ExtractionError::Config("Tesseract datapath is not valid UTF-8".to_string())
                })
            })
            .transpose()?;
        let image_path_str = image_path
            .to_str()
            .ok_or_else(|| ExtractionError::OcrFailed("Failed to convert path to string".to_string()))?;

        let text = Tesseract::new(datapath, Some(language))
            .map_err(|e| ExtractionError::OcrFailed(format!("Tesseract init error ({}): {}", language, e)))?
            .set_image(image_path_str)
            .map_err(|e| ExtractionError::OcrFailed(format!("Tesseract set image error: {}", e)))?
            .get_text()
            .map_err(|e| ExtractionError::OcrFailed(format!("Tesseract error: {}", e)))?;

        Ok(text)
    }
}

pub struct OcrProcessor;

impl OcrProcessor {
    /// Runs one recognition pass and wraps the result as a text block.
    pub fn decode(
        engine: &dyn OcrEngine,
        image_path: &Path,
        language: &str,
        script: Script,
    ) -> Result<DecodedTextBlock, ExtractionError> {
        let text = engine.recognize(image_path, language)?;
        debug!("OCR result ({}):\n{}", language, text);
        Self::check_script(&text, script);
        Ok(DecodedTextBlock::from_text(script, &text))
    }

    /// Warns when the dominant script of the text is not the one requested.
    pub fn check_script(text: &str, expected: Script) -> bool {
        let detected = whatlang::detect_script(text);
        let matches = match (detected, expected) {
            (Some(whatlang::Script::Latin), Script::Latin) => true,
            (Some(whatlang::Script::Arabic), Script::Arabic) => true,
            _ => false,
        };
        if !matches {
            warn!("Expected {:?} text, detected {:?}", expected, detected);
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedEngine(&'static str);

    impl OcrEngine for CannedEngine {
        fn recognize(&self, _image_path: &Path, _language: &str) -> Result<String, ExtractionError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingEngine;

    impl OcrEngine for FailingEngine {
        fn recognize(&self, _image_path: &Path, language: &str) -> Result<String, ExtractionError> {
            Err(ExtractionError::OcrFailed(format!("no traineddata for {}", language)))
        }
    }

    #[test]
    fn test_decode_splits_lines() {
        let engine = CannedEngine("ROYAUME DU MAROC\n\nELALAMI\n");
        let block = OcrProcessor::decode(&engine, Path::new("card.png"), "fra", Script::Latin).unwrap();
        assert_eq!(block.script(), Script::Latin);
        assert_eq!(block.lines(), &["ROYAUME DU MAROC", "", "ELALAMI", ""]);
    }

    #[test]
    fn test_decode_propagates_engine_failure() {
        let err = OcrProcessor::decode(&FailingEngine, Path::new("card.png"), "ara", Script::Arabic)
            .unwrap_err();
        assert_eq!(err.code(), "ocr_failed");
    }

    #[test]
    fn test_script_check() {
        assert!(OcrProcessor::check_script("ROYAUME DU MAROC CARTE NATIONALE", Script::Latin));
        assert!(OcrProcessor::check_script("المملكة المغربية البطاقة الوطنية", Script::Arabic));
        assert!(!OcrProcessor::check_script("ROYAUME DU MAROC CARTE NATIONALE", Script::Arabic));
    }
}
