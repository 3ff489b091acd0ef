pub mod aligner;
pub mod classifier;
pub mod extractor;
pub mod image;
pub mod ocr;

pub use aligner::CrossLingualAligner;
pub use classifier::{ClassifiedLine, IdCodeMatch, LineCategory, LineClassifier};
pub use extractor::{AlignedNameFill, ExtractionPolicy, FieldExtractor, NameOrder};
pub use image::{ImageProcessor, ImageUpload};
pub use ocr::{OcrEngine, OcrProcessor, TesseractEngine};
