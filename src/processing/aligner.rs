//! Positional alignment between the Latin and Arabic OCR passes.
//!
//! This is a low-recall heuristic, not a translation step. Two signals are
//! trusted: a line recognized identically by both passes at the same index
//! (a token both language models render the same way), and the country name
//! appearing in the second-script line. Anything else is left empty rather
//! than guessed.
//!
//! Two filters depart on purpose from taking every identical or marked line
//! literally: boilerplate lines in either script are skipped (the Arabic
//! title contains the country name), and shared dates or identity codes are
//! never taken as names.

use log::debug;

use crate::models::{AlignedFields, DecodedTextBlock, Field, LanguageProfile};
use crate::processing::classifier::{LineCategory, LineClassifier};
use crate::processing::extractor::{AlignedNameFill, ExtractionPolicy, NameOrder};
use crate::utils::ExtractionError;

pub struct CrossLingualAligner {
    primary: LineClassifier,
    secondary: LineClassifier,
    country_marker: Option<String>,
    name_order: NameOrder,
    name_fill: AlignedNameFill,
}

impl CrossLingualAligner {
    pub fn new(
        primary: &LanguageProfile,
        secondary: &LanguageProfile,
        policy: ExtractionPolicy,
    ) -> Result<Self, ExtractionError> {
        Ok(CrossLingualAligner {
            primary: LineClassifier::new(primary, policy.id_code_match)?,
            secondary: LineClassifier::new(secondary, policy.id_code_match)?,
            country_marker: secondary.country_marker.clone().filter(|marker| !marker.is_empty()),
            name_order: policy.name_order,
            name_fill: policy.aligned_names,
        })
    }

    /// Only the common prefix of the two blocks is inspected.
    pub fn align(&self, primary: &DecodedTextBlock, secondary: &DecodedTextBlock) -> AlignedFields {
        let mut aligned = AlignedFields::default();

        for (index, (first, second)) in primary.lines().iter().zip(secondary.lines()).enumerate() {
            let first = first.trim();
            let second = second.trim();
            if second.is_empty() || self.secondary.classify(second).is(LineCategory::Boilerplate) {
                continue;
            }

            if first == second && self.is_shared_name(first) {
                let open_slots = self
                    .name_order
                    .slots()
                    .into_iter()
                    .filter(|slot| name_slot(&aligned, *slot).is_none())
                    .take(match self.name_fill {
                        AlignedNameFill::EveryOpenSlot => 2,
                        AlignedNameFill::OnePerSlot => 1,
                    })
                    .collect::<Vec<_>>();
                for slot in open_slots {
                    debug!("Line {} identical in both scripts, aligned {} = {:?}", index, slot, second);
                    *name_slot_mut(&mut aligned, slot) = Some(second.to_string());
                }
            }

            if aligned.place_of_birth.is_none() {
                if let Some(marker) = &self.country_marker {
                    if second.contains(marker.as_str()) {
                        debug!("Line {} carries country marker, aligned place_of_birth = {:?}", index, second);
                        aligned.place_of_birth = Some(second.to_string());
                    }
                }
            }
        }

        aligned
    }

    fn is_shared_name(&self, line: &str) -> bool {
        let classified = self.primary.classify(line);
        !classified.is(LineCategory::Boilerplate)
            && !classified.is(LineCategory::DateCandidate)
            && !classified.is(LineCategory::IdCodeCandidate)
    }
}

fn name_slot(aligned: &AlignedFields, field: Field) -> &Option<String> {
    match field {
        Field::GivenName => &aligned.given_name,
        _ => &aligned.family_name,
    }
}

fn name_slot_mut(aligned: &mut AlignedFields, field: Field) -> &mut Option<String> {
    match field {
        Field::GivenName => &mut aligned.given_name,
        _ => &mut aligned.family_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Script;

    fn aligner(policy: ExtractionPolicy) -> CrossLingualAligner {
        CrossLingualAligner::new(&LanguageProfile::latin(), &LanguageProfile::arabic(), policy).unwrap()
    }

    #[test]
    fn test_first_identical_line_fills_both_names() {
        let latin = DecodedTextBlock::from_lines(Script::Latin, ["CARTE", "ELALAMI", "ZAINEB"]);
        let arabic = DecodedTextBlock::from_lines(Script::Arabic, ["البطاقة", " ELALAMI ", "زينب"]);
        let aligned = aligner(ExtractionPolicy::default()).align(&latin, &arabic);
        assert_eq!(aligned.family_name.as_deref(), Some("ELALAMI"));
        assert_eq!(aligned.given_name.as_deref(), Some("ELALAMI"));
    }

    #[test]
    fn test_later_identical_lines_do_not_overwrite() {
        let latin = DecodedTextBlock::from_lines(Script::Latin, ["ELALAMI", "ZAINEB"]);
        let arabic = DecodedTextBlock::from_lines(Script::Arabic, ["ELALAMI", "ZAINEB"]);
        let aligned = aligner(ExtractionPolicy::default()).align(&latin, &arabic);
        assert_eq!(aligned.family_name.as_deref(), Some("ELALAMI"));
        assert_eq!(aligned.given_name.as_deref(), Some("ELALAMI"));
    }

    #[test]
    fn test_one_per_slot_fills_names_in_order() {
        let latin = DecodedTextBlock::from_lines(Script::Latin, ["CARTE", "ELALAMI", "ZAINEB"]);
        let arabic = DecodedTextBlock::from_lines(Script::Arabic, ["البطاقة", " ELALAMI ", "ZAINEB"]);
        let policy = ExtractionPolicy {
            aligned_names: AlignedNameFill::OnePerSlot,
            ..ExtractionPolicy::default()
        };
        let aligned = aligner(policy).align(&latin, &arabic);
        assert_eq!(aligned.family_name.as_deref(), Some("ELALAMI"));
        assert_eq!(aligned.given_name.as_deref(), Some("ZAINEB"));
    }

    #[test]
    fn test_one_per_slot_given_first_order() {
        let latin = DecodedTextBlock::from_lines(Script::Latin, ["ELALAMI", "ZAINEB"]);
        let arabic = DecodedTextBlock::from_lines(Script::Arabic, ["ELALAMI", "ZAINEB"]);
        let policy = ExtractionPolicy {
            name_order: NameOrder::GivenFirst,
            aligned_names: AlignedNameFill::OnePerSlot,
            ..ExtractionPolicy::default()
        };
        let aligned = aligner(policy).align(&latin, &arabic);
        assert_eq!(aligned.given_name.as_deref(), Some("ELALAMI"));
        assert_eq!(aligned.family_name.as_deref(), Some("ZAINEB"));
    }

    #[test]
    fn test_no_shared_lines_no_fill() {
        let latin = DecodedTextBlock::from_lines(Script::Latin, ["ELALAMI", "ZAINEB", "à RABAT"]);
        let arabic = DecodedTextBlock::from_lines(Script::Arabic, ["العلمي", "زينب", "الرباط"]);
        let aligned = aligner(ExtractionPolicy::default()).align(&latin, &arabic);
        assert_eq!(aligned, AlignedFields::default());
    }

    #[test]
    fn test_shared_titles_codes_and_dates_are_not_names() {
        let latin = DecodedTextBlock::from_lines(Script::Latin, ["", "CARTE", "AB123456", "12.05.1990"]);
        let arabic = DecodedTextBlock::from_lines(Script::Arabic, ["", "CARTE", "AB123456", "12.05.1990"]);
        let aligned = aligner(ExtractionPolicy::default()).align(&latin, &arabic);
        assert!(aligned.family_name.is_none());
        assert!(aligned.given_name.is_none());
    }

    #[test]
    fn test_country_marker_fills_place_verbatim() {
        let latin = DecodedTextBlock::from_lines(Script::Latin, ["ROYAUME DU MAROC", "a RABAT", "x"]);
        let arabic =
            DecodedTextBlock::from_lines(Script::Arabic, ["المملكة المغربية", " الرباط المغرب ", "المغرب"]);
        let aligned = aligner(ExtractionPolicy::default()).align(&latin, &arabic);
        assert_eq!(aligned.place_of_birth.as_deref(), Some("الرباط المغرب"));
    }

    #[test]
    fn test_trailing_lines_of_longer_block_are_ignored() {
        let latin = DecodedTextBlock::from_lines(Script::Latin, ["A"]);
        let arabic = DecodedTextBlock::from_lines(Script::Arabic, ["B", "ELALAMI", "الرباط المغرب"]);
        let aligned = aligner(ExtractionPolicy::default()).align(&latin, &arabic);
        assert_eq!(aligned, AlignedFields::default());
    }
}
