use log::warn;

use crate::models::{BilingualRecord, Field, Script};
use crate::utils::ExtractionError;

pub struct RecordValidator;

impl RecordValidator {
    /// Passes the record through when every mandatory field is present.
    ///
    /// Mandatory fields are checked on the Latin-script variant. The Arabic
    /// variant shares date of birth and identity code verbatim, while its
    /// names come from alignment and may legitimately stay empty.
    pub fn validate(record: BilingualRecord) -> Result<BilingualRecord, ExtractionError> {
        let missing = Self::missing_fields(&record);
        if !missing.is_empty() {
            warn!("Extraction incomplete, missing: {:?}", missing);
            return Err(ExtractionError::IncompleteExtraction(missing));
        }
        Ok(record)
    }

    pub fn missing_fields(record: &BilingualRecord) -> Vec<Field> {
        let fields = record.fields(Script::Latin);
        Field::MANDATORY
            .into_iter()
            .filter(|field| fields.get(*field).trim().is_empty())
            .collect()
    }
}
