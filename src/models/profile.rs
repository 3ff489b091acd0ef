use serde::{Deserialize, Serialize};

use crate::models::Script;

/// Vocabulary the classifier and extractor need for one script.
///
/// Defaults describe the Moroccan national identity card (CNIE): French on
/// the Latin side, Arabic on the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageProfile {
    pub script: Script,
    /// Document-title tokens. Lines containing any of them are boilerplate.
    pub boilerplate_tokens: Vec<String>,
    /// Captions that must all appear for the text to count as an identity card.
    pub identity_captions: Vec<String>,
    /// Phrase meaning "born on" that may precede the date of birth.
    pub birth_date_marker: String,
    /// Preposition meaning "at/in" introducing the place of birth.
    pub location_marker: String,
    /// Alternate spelling tried in a second pass when the first finds nothing.
    pub fallback_location_marker: String,
    /// Country-of-birth name in this script, used by the aligner.
    pub country_marker: Option<String>,
}

impl LanguageProfile {
    pub fn latin() -> Self {
        LanguageProfile {
            script: Script::Latin,
            boilerplate_tokens: to_strings(&["ROYAUME", "MAROC", "CARTE", "NATIONALE", "IDENTITE"]),
            identity_captions: to_strings(&["ROYAUME DU MAROC", "CARTE NATIONALE D'IDENTITE"]),
            birth_date_marker: "Né le".to_string(),
            location_marker: "à".to_string(),
            fallback_location_marker: "a".to_string(),
            country_marker: None,
        }
    }

    pub fn arabic() -> Self {
        LanguageProfile {
            script: Script::Arabic,
            boilerplate_tokens: to_strings(&["المملكة", "المغربية", "البطاقة", "الوطنية", "للتعريف"]),
            identity_captions: to_strings(&["المملكة المغربية", "البطاقة الوطنية للتعريف"]),
            birth_date_marker: "مزداد بتاريخ".to_string(),
            location_marker: "ب".to_string(),
            fallback_location_marker: "في".to_string(),
            country_marker: Some("المغرب".to_string()),
        }
    }

    pub fn for_script(script: Script) -> Self {
        match script {
            Script::Latin => Self::latin(),
            Script::Arabic => Self::arabic(),
        }
    }

    /// True when every identity caption occurs somewhere in `text`.
    pub fn recognizes_document(&self, text: &str) -> bool {
        !self.identity_captions.is_empty()
            && self.identity_captions.iter().all(|caption| text.contains(caption.as_str()))
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
