use log::warn;

use crate::models::{DecodedTextBlock, LanguageProfile};
use crate::utils::ExtractionError;

pub struct DocumentValidator;

impl DocumentValidator {
    /// Accepts the document when either pass carries all of its script's
    /// identity captions.
    pub fn validate(
        latin: &DecodedTextBlock,
        latin_profile: &LanguageProfile,
        arabic: &DecodedTextBlock,
        arabic_profile: &LanguageProfile,
    ) -> Result<(), ExtractionError> {
        if latin_profile.recognizes_document(&latin.text())
            || arabic_profile.recognizes_document(&arabic.text())
        {
            return Ok(());
        }
        warn!("Identity card captions not found in recognized text");
        Err(ExtractionError::NotAnIdentityDocument)
    }
}
