// Line classification for OCR output of identity cards.
// Each line is matched against a pattern table and tagged with every
// category it satisfies. Deciding what to do with a tag is left to the extractor.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::LanguageProfile;
use crate::utils::ExtractionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LineCategory {
    NameCandidate,
    DateCandidate,
    IdCodeCandidate,
    LocationMarker,
    Boilerplate,
}

/// How strictly an identity code has to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdCodeMatch {
    /// The whole trimmed line must be the code.
    #[default]
    ExactLine,
    /// The code may appear anywhere in the line.
    Substring,
}

/// Which location preposition to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationPass {
    Primary,
    Fallback,
}

/// A line together with the categories it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    pub text: &'a str,
    pub categories: BTreeSet<LineCategory>,
}

impl<'a> ClassifiedLine<'a> {
    pub fn is(&self, category: LineCategory) -> bool {
        self.categories.contains(&category)
    }
}

lazy_static! {
    // dd.mm.yyyy, dd-mm-yyyy, dd/mm/yyyy
    static ref DATE_PATTERN: Regex = Regex::new(r"(\d{2}[-./]\d{2}[-./]\d{4})").unwrap();

    // Two or more capitals followed by at least six digits, e.g. EE926239
    static ref ID_CODE_EXACT: Regex = Regex::new(r"^[A-Z]{2,}\d{6,}$").unwrap();
    static ref ID_CODE_ANYWHERE: Regex = Regex::new(r"[A-Z]{2,}\d{6,}").unwrap();
}

enum Rule {
    ContainsAny(Vec<String>),
    Uppercase,
    Pattern(Regex),
}

impl Rule {
    fn matches(&self, line: &str) -> bool {
        match self {
            Rule::ContainsAny(tokens) => {
                let upper = line.to_uppercase();
                tokens.iter().any(|token| upper.contains(token.as_str()))
            }
            Rule::Uppercase => is_uppercase_name(line),
            Rule::Pattern(pattern) => pattern.is_match(line),
        }
    }
}

/// Stateless classifier compiled from a language profile.
pub struct LineClassifier {
    table: Vec<(LineCategory, Rule)>,
    id_code_match: IdCodeMatch,
    birth_date: Regex,
    location: Regex,
    fallback_location: Regex,
}

impl LineClassifier {
    pub fn new(profile: &LanguageProfile, id_code_match: IdCodeMatch) -> Result<Self, ExtractionError> {
        let boilerplate = profile
            .boilerplate_tokens
            .iter()
            .filter(|token| !token.is_empty())
            .map(|token| token.to_uppercase())
            .collect();

        let birth_date = compile(&format!(
            r"{}\s*(\d{{2}}[-./]\d{{2}}[-./]\d{{4}})",
            regex::escape(&profile.birth_date_marker)
        ))?;
        let location = location_pattern(&profile.location_marker)?;
        let fallback_location = location_pattern(&profile.fallback_location_marker)?;

        let id_code = match id_code_match {
            IdCodeMatch::ExactLine => Regex::clone(&ID_CODE_EXACT),
            IdCodeMatch::Substring => Regex::clone(&ID_CODE_ANYWHERE),
        };

        let table = vec![
            (LineCategory::Boilerplate, Rule::ContainsAny(boilerplate)),
            (LineCategory::NameCandidate, Rule::Uppercase),
            (LineCategory::DateCandidate, Rule::Pattern(Regex::clone(&DATE_PATTERN))),
            (LineCategory::IdCodeCandidate, Rule::Pattern(id_code)),
            (LineCategory::LocationMarker, Rule::Pattern(location.clone())),
        ];

        Ok(LineClassifier {
            table,
            id_code_match,
            birth_date,
            location,
            fallback_location,
        })
    }

    pub fn classify<'a>(&self, line: &'a str) -> ClassifiedLine<'a> {
        let mut categories: BTreeSet<LineCategory> = self
            .table
            .iter()
            .filter(|(_, rule)| rule.matches(line))
            .map(|(category, _)| *category)
            .collect();

        // Document titles are written in capitals too
        if categories.contains(&LineCategory::Boilerplate) {
            categories.remove(&LineCategory::NameCandidate);
        }

        ClassifiedLine { text: line, categories }
    }

    /// Date of birth in the line, preferring one introduced by the "born on" marker.
    pub fn date_value<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.birth_date
            .captures(line)
            .and_then(|captures| captures.get(1))
            .or_else(|| DATE_PATTERN.find(line))
            .map(|found| found.as_str())
    }

    pub fn id_code_value<'a>(&self, line: &'a str) -> Option<&'a str> {
        let found = match self.id_code_match {
            IdCodeMatch::ExactLine => ID_CODE_EXACT.find(line),
            IdCodeMatch::Substring => ID_CODE_ANYWHERE.find(line),
        };
        found.map(|found| found.as_str())
    }

    /// Everything after the location marker, trimmed.
    pub fn location_value<'a>(&self, line: &'a str, pass: LocationPass) -> Option<&'a str> {
        let pattern = match pass {
            LocationPass::Primary => &self.location,
            LocationPass::Fallback => &self.fallback_location,
        };
        pattern
            .captures(line)
            .and_then(|captures| captures.get(1))
            .map(|found| found.as_str().trim())
            .filter(|value| !value.is_empty())
    }
}

fn compile(pattern: &str) -> Result<Regex, ExtractionError> {
    Regex::new(pattern)
        .map_err(|e| ExtractionError::Config(format!("Invalid marker pattern {}: {}", pattern, e)))
}

// Marker must stand alone as a word and be followed by a word character.
fn location_pattern(marker: &str) -> Result<Regex, ExtractionError> {
    if marker.trim().is_empty() {
        return Err(ExtractionError::Config("Location marker must not be empty".to_string()));
    }
    compile(&format!(r"(?:^|\s){}\s+(\w.*)$", regex::escape(marker.trim())))
}

// Capital letters only, ignoring whitespace. Apostrophes and hyphens are
// accepted on top of that so compound names such as EL-ALAMI or D'ARC still
// qualify; a line made only of them does not.
fn is_uppercase_name(line: &str) -> bool {
    let mut has_letter = false;
    for c in line.chars().filter(|c| !c.is_whitespace()) {
        if c.is_alphabetic() && c.is_uppercase() {
            has_letter = true;
        } else if c != '\'' && c != '-' {
            return false;
        }
    }
    has_letter
}
