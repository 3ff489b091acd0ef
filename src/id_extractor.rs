use log::info;

use crate::config::Config;
use crate::models::*;
use crate::processing::*;
use crate::utils::ExtractionError;
use crate::validation::*;

/// Bilingual identity card extractor.
///
/// Holds only immutable, compiled state, so one instance can serve
/// concurrent callers.
pub struct IdCardExtractor {
    config: Config,
    engine: Box<dyn OcrEngine>,
    latin_fields: FieldExtractor,
    arabic_fields: FieldExtractor,
    aligner: CrossLingualAligner,
}

impl IdCardExtractor {
    /// Extractor backed by Tesseract.
    pub fn new(config: Config) -> Result<Self, ExtractionError> {
        let engine = TesseractEngine::new(&config.engine);
        Self::with_engine(config, Box::new(engine))
    }

    pub fn with_engine(config: Config, engine: Box<dyn OcrEngine>) -> Result<Self, ExtractionError> {
        let latin_fields = FieldExtractor::new(&config.profiles.latin, config.extraction)?;
        let arabic_fields = FieldExtractor::new(&config.profiles.arabic, config.extraction)?;
        let aligner = CrossLingualAligner::new(
            &config.profiles.latin,
            &config.profiles.arabic,
            config.extraction,
        )?;

        Ok(IdCardExtractor {
            config,
            engine,
            latin_fields,
            arabic_fields,
            aligner,
        })
    }

    // Main extraction function that orchestrates the entire process
    pub fn extract(&self, upload: &ImageUpload) -> Result<BilingualRecord, ExtractionError> {
        // Step 1: Reject bad uploads before touching the OCR engine
        let extension = ImageProcessor::validate(upload, &self.config.upload)?;

        // Step 2: Stage the image; the file is deleted when `staged` drops
        let staged = ImageProcessor::stage(upload, &extension, &self.config.upload)?;

        // Step 3: One recognition pass per script
        let engine = &self.config.engine;
        let latin = OcrProcessor::decode(
            self.engine.as_ref(),
            staged.path(),
            &engine.latin_language,
            Script::Latin,
        )?;
        let arabic = OcrProcessor::decode(
            self.engine.as_ref(),
            staged.path(),
            &engine.arabic_language,
            Script::Arabic,
        )?;

        // Step 4: Extract, align and validate
        let record = self.extract_from_blocks(&latin, &arabic)?;
        info!("Extracted identity card {} from {}", record.latin.id_code, upload.file_name);
        Ok(record)
    }

    /// Runs extraction on text that has already been recognized.
    pub fn extract_from_text(&self, latin: &str, arabic: &str) -> Result<BilingualRecord, ExtractionError> {
        let latin = DecodedTextBlock::from_text(Script::Latin, latin);
        let arabic = DecodedTextBlock::from_text(Script::Arabic, arabic);
        self.extract_from_blocks(&latin, &arabic)
    }

    pub fn extract_from_blocks(
        &self,
        latin: &DecodedTextBlock,
        arabic: &DecodedTextBlock,
    ) -> Result<BilingualRecord, ExtractionError> {
        DocumentValidator::validate(
            latin,
            &self.config.profiles.latin,
            arabic,
            &self.config.profiles.arabic,
        )?;

        let latin_record = self.latin_fields.extract(latin);
        let arabic_record = self.arabic_fields.extract(arabic);
        let aligned = self.aligner.align(latin, arabic);

        let record = BilingualRecord::compose(&latin_record, &arabic_record, &aligned);
        RecordValidator::validate(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const LATIN_TEXT: &str = "ROYAUME DU MAROC\nCARTE NATIONALE D'IDENTITE\nELALAMI\nZAINEB\nNé le 12.05.1990\na RABAT\nAB123456";
    const ARABIC_TEXT: &str = "المملكة المغربية\nالبطاقة الوطنية للتعريف\nELALAMI\nزينب\nمزداد بتاريخ 12.05.1990\nالرباط المغرب\nAB123456";

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    struct FakeEngine {
        calls: Arc<AtomicUsize>,
        seen_paths: Arc<std::sync::Mutex<Vec<std::path::PathBuf>>>,
        fail: bool,
    }

    impl OcrEngine for FakeEngine {
        fn recognize(&self, image_path: &Path, language: &str) -> Result<String, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_paths.lock().unwrap().push(image_path.to_path_buf());
            assert!(image_path.exists());
            if self.fail {
                return Err(ExtractionError::OcrFailed("engine down".to_string()));
            }
            Ok(match language {
                "ara" => ARABIC_TEXT.to_string(),
                _ => LATIN_TEXT.to_string(),
            })
        }
    }

    fn extractor(fail: bool) -> (IdCardExtractor, Arc<AtomicUsize>, Arc<std::sync::Mutex<Vec<std::path::PathBuf>>>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen_paths = Arc::new(std::sync::Mutex::new(Vec::new()));
        let engine = FakeEngine {
            calls: calls.clone(),
            seen_paths: seen_paths.clone(),
            fail,
        };
        let extractor = IdCardExtractor::with_engine(Config::default(), Box::new(engine)).unwrap();
        (extractor, calls, seen_paths)
    }

    #[test]
    fn test_extract_bilingual_record() {
        let (extractor, calls, seen_paths) = extractor(false);
        let record = extractor
            .extract(&ImageUpload::new("card.png", PNG_HEADER.to_vec()))
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(record.latin.family_name, "ELALAMI");
        assert_eq!(record.latin.given_name, "ZAINEB");
        assert_eq!(record.latin.date_of_birth, "12.05.1990");
        assert_eq!(record.latin.place_of_birth, "RABAT");
        assert_eq!(record.latin.id_code, "AB123456");

        assert_eq!(record.arabic.family_name, "ELALAMI");
        assert_eq!(record.arabic.given_name, "ELALAMI");
        assert_eq!(record.arabic.place_of_birth, "الرباط المغرب");
        assert_eq!(record.arabic.date_of_birth, "12.05.1990");
        assert_eq!(record.arabic.id_code, "AB123456");

        // staged image is gone once extraction returns
        for path in seen_paths.lock().unwrap().iter() {
            assert!(!path.exists());
        }
    }

    #[test]
    fn test_bmp_rejected_before_ocr() {
        let (extractor, calls, _) = extractor(false);
        let err = extractor
            .extract(&ImageUpload::new("card.bmp", vec![b'B', b'M', 0, 0]))
            .unwrap_err();
        assert_eq!(err.code(), "unsupported_format");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_ocr_failure_removes_staged_image() {
        let (extractor, calls, seen_paths) = extractor(true);
        let err = extractor
            .extract(&ImageUpload::new("card.jpg", PNG_HEADER.to_vec()))
            .unwrap_err();
        assert_eq!(err.code(), "ocr_failed");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!seen_paths.lock().unwrap()[0].exists());
    }

    #[test]
    fn test_missing_id_code_is_incomplete() {
        let (extractor, _, _) = extractor(false);
        let latin = LATIN_TEXT.replace("AB123456", "");
        let arabic = ARABIC_TEXT.replace("AB123456", "");
        let err = extractor.extract_from_text(&latin, &arabic).unwrap_err();
        assert_eq!(err.code(), "incomplete_extraction");
        assert_eq!(err.missing_fields(), &[Field::IdCode]);
    }

    #[test]
    fn test_id_code_falls_back_to_arabic_pass() {
        let (extractor, _, _) = extractor(false);
        let latin = LATIN_TEXT.replace("AB123456", "A8I23456");
        let record = extractor.extract_from_text(&latin, ARABIC_TEXT).unwrap();
        assert_eq!(record.latin.id_code, "AB123456");
        assert_eq!(record.arabic.id_code, "AB123456");
    }

    #[test]
    fn test_non_identity_document_short_circuits() {
        let (extractor, _, _) = extractor(false);
        let err = extractor
            .extract_from_text("FACTURE\nELALAMI\nZAINEB\nAB123456", "فاتورة")
            .unwrap_err();
        assert_eq!(err.code(), "not_an_identity_document");
    }

    #[test]
    fn test_no_shared_lines_leave_arabic_names_empty() {
        let (extractor, _, _) = extractor(false);
        let arabic = "المملكة المغربية\nالبطاقة الوطنية للتعريف\nالعلمي\nزينب";
        let record = extractor.extract_from_text(LATIN_TEXT, arabic).unwrap();
        assert!(record.arabic.family_name.is_empty());
        assert!(record.arabic.given_name.is_empty());
        assert!(record.arabic.place_of_birth.is_empty());
    }

    #[test]
    fn test_flat_output_keys() {
        let (extractor, _, _) = extractor(false);
        let record = extractor.extract_from_text(LATIN_TEXT, ARABIC_TEXT).unwrap();
        let json: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(json["nom_de_famille"], "ELALAMI");
        assert_eq!(json["code_identifiant"], "AB123456");
        assert_eq!(json["رمز_الهوية"], "AB123456");
    }
}
