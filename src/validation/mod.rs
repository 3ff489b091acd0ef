pub mod document;
pub mod record;

pub use document::DocumentValidator;
pub use record::RecordValidator;
