pub mod config;
pub mod id_extractor;
pub mod models;
pub mod processing;
pub mod utils;
pub mod validation;

pub use config::Config;
pub use id_extractor::IdCardExtractor;
pub use utils::ExtractionError;
