use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::{DecodedTextBlock, Field, LanguageProfile, PartialRecord};
use crate::processing::classifier::{IdCodeMatch, LineCategory, LineClassifier, LocationPass};
use crate::utils::ExtractionError;

/// Which name slot the first capitalised line goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameOrder {
    /// Family name printed above the given name, as on the CNIE.
    #[default]
    FamilyFirst,
    GivenFirst,
}

impl NameOrder {
    pub fn slots(&self) -> [Field; 2] {
        match self {
            NameOrder::FamilyFirst => [Field::FamilyName, Field::GivenName],
            NameOrder::GivenFirst => [Field::GivenName, Field::FamilyName],
        }
    }
}

/// How a line shared verbatim by both scripts fills the aligned name slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignedNameFill {
    /// One shared line fills every name slot that is still empty.
    #[default]
    EveryOpenSlot,
    /// Each shared line fills the next open slot in `NameOrder`.
    OnePerSlot,
}

/// Slot-filling policy shared by every extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPolicy {
    pub name_order: NameOrder,
    pub id_code_match: IdCodeMatch,
    pub aligned_names: AlignedNameFill,
}

/// Fills a PartialRecord from one script's OCR lines.
pub struct FieldExtractor {
    classifier: LineClassifier,
    policy: ExtractionPolicy,
}

impl FieldExtractor {
    pub fn new(profile: &LanguageProfile, policy: ExtractionPolicy) -> Result<Self, ExtractionError> {
        Ok(FieldExtractor {
            classifier: LineClassifier::new(profile, policy.id_code_match)?,
            policy,
        })
    }

    pub fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }

    pub fn extract(&self, block: &DecodedTextBlock) -> PartialRecord {
        let mut record = PartialRecord::new();

        for raw in block.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let classified = self.classifier.classify(line);

            if !record.is_filled(Field::IdCode) && classified.is(LineCategory::IdCodeCandidate) {
                if let Some(code) = self.classifier.id_code_value(line) {
                    fill(&mut record, Field::IdCode, code);
                }
            }

            if classified.is(LineCategory::NameCandidate) {
                if let Some(slot) = self
                    .policy
                    .name_order
                    .slots()
                    .into_iter()
                    .find(|slot| !record.is_filled(*slot))
                {
                    fill(&mut record, slot, line);
                }
            }

            if !record.is_filled(Field::DateOfBirth) && classified.is(LineCategory::DateCandidate) {
                if let Some(date) = self.classifier.date_value(line) {
                    fill(&mut record, Field::DateOfBirth, date);
                }
            }

            if !record.is_filled(Field::PlaceOfBirth) && classified.is(LineCategory::LocationMarker) {
                if let Some(place) = self.classifier.location_value(line, LocationPass::Primary) {
                    fill(&mut record, Field::PlaceOfBirth, place);
                }
            }
        }

        // Second pass with the alternate preposition spelling
        if !record.is_filled(Field::PlaceOfBirth) {
            let fallback = block
                .lines()
                .iter()
                .find_map(|line| self.classifier.location_value(line.trim(), LocationPass::Fallback));
            if let Some(place) = fallback {
                fill(&mut record, Field::PlaceOfBirth, place);
            }
        }

        record
    }
}

fn fill(record: &mut PartialRecord, field: Field, value: &str) {
    if record.fill(field, value) {
        debug!("Filled {} with {:?}", field, value);
    }
}
