use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Writing system a text block was recognized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Script {
    Latin,
    Arabic,
}

/// The five slots of an identity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    GivenName,
    FamilyName,
    DateOfBirth,
    PlaceOfBirth,
    IdCode,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::GivenName,
        Field::FamilyName,
        Field::DateOfBirth,
        Field::PlaceOfBirth,
        Field::IdCode,
    ];

    /// Fields that must be non-empty for a record to leave the extractor.
    pub const MANDATORY: [Field; 4] = [
        Field::GivenName,
        Field::FamilyName,
        Field::DateOfBirth,
        Field::IdCode,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::GivenName => "given_name",
            Field::FamilyName => "family_name",
            Field::DateOfBirth => "date_of_birth",
            Field::PlaceOfBirth => "place_of_birth",
            Field::IdCode => "id_code",
        }
    }

    /// Output key used in the flat record for the given script.
    pub fn label(&self, script: Script) -> &'static str {
        match (script, self) {
            (Script::Latin, Field::GivenName) => "prénom",
            (Script::Latin, Field::FamilyName) => "nom_de_famille",
            (Script::Latin, Field::DateOfBirth) => "date_de_naissance",
            (Script::Latin, Field::PlaceOfBirth) => "lieu_de_naissance",
            (Script::Latin, Field::IdCode) => "code_identifiant",
            (Script::Arabic, Field::GivenName) => "الاسم_الأول",
            (Script::Arabic, Field::FamilyName) => "اسم_العائلة",
            (Script::Arabic, Field::DateOfBirth) => "تاريخ_الميلاد",
            (Script::Arabic, Field::PlaceOfBirth) => "مكان_الميلاد",
            (Script::Arabic, Field::IdCode) => "رمز_الهوية",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered lines recognized by one OCR pass over one document image.
#[derive(Debug, Clone)]
pub struct DecodedTextBlock {
    script: Script,
    lines: Vec<String>,
}

impl DecodedTextBlock {
    /// Splits raw OCR output into lines. Blank lines are kept so that line
    /// indices stay comparable between the two script passes.
    pub fn from_text(script: Script, text: &str) -> Self {
        DecodedTextBlock {
            script,
            lines: text.split('\n').map(|line| line.to_string()).collect(),
        }
    }

    pub fn from_lines<I, S>(script: Script, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DecodedTextBlock {
            script,
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn script(&self) -> Script {
        self.script
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Full text, lines joined back with newlines.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Per-script extraction result. A slot is written at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRecord {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub place_of_birth: Option<String>,
    pub id_code: Option<String>,
}

impl PartialRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn is_filled(&self, field: Field) -> bool {
        self.slot(field).is_some()
    }

    /// Fills `field` if it is still empty. Returns whether the value was taken.
    /// Empty values never fill a slot.
    pub fn fill(&mut self, field: Field, value: impl Into<String>) -> bool {
        let value = value.into();
        let slot = self.slot_mut(field);
        if slot.is_some() || value.is_empty() {
            return false;
        }
        *slot = Some(value);
        true
    }

    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::GivenName => &self.given_name,
            Field::FamilyName => &self.family_name,
            Field::DateOfBirth => &self.date_of_birth,
            Field::PlaceOfBirth => &self.place_of_birth,
            Field::IdCode => &self.id_code,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::GivenName => &mut self.given_name,
            Field::FamilyName => &mut self.family_name,
            Field::DateOfBirth => &mut self.date_of_birth,
            Field::PlaceOfBirth => &mut self.place_of_birth,
            Field::IdCode => &mut self.id_code,
        }
    }
}

/// Fields derived for the second script by line alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignedFields {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub place_of_birth: Option<String>,
}

/// The five fields as rendered in one script. Empty strings mark missing values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFields {
    pub given_name: String,
    pub family_name: String,
    pub date_of_birth: String,
    pub place_of_birth: String,
    pub id_code: String,
}

impl ScriptFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::GivenName => &self.given_name,
            Field::FamilyName => &self.family_name,
            Field::DateOfBirth => &self.date_of_birth,
            Field::PlaceOfBirth => &self.place_of_birth,
            Field::IdCode => &self.id_code,
        }
    }
}

/// Final bilingual identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualRecord {
    pub latin: ScriptFields,
    pub arabic: ScriptFields,
}

impl BilingualRecord {
    /// Merges both per-script partials with the aligner output.
    ///
    /// Date of birth and identity code come from the Latin partial when it has
    /// them, else from the Arabic partial, and are copied verbatim into both
    /// variants. Arabic names come from alignment only; the Arabic place of
    /// birth prefers the aligned value over the Arabic partial's.
    pub fn compose(latin: &PartialRecord, arabic: &PartialRecord, aligned: &AlignedFields) -> Self {
        let shared = |field: Field| {
            latin
                .get(field)
                .or_else(|| arabic.get(field))
                .unwrap_or_default()
                .to_string()
        };
        let date_of_birth = shared(Field::DateOfBirth);
        let id_code = shared(Field::IdCode);

        BilingualRecord {
            latin: ScriptFields {
                given_name: latin.get(Field::GivenName).unwrap_or_default().to_string(),
                family_name: latin.get(Field::FamilyName).unwrap_or_default().to_string(),
                date_of_birth: date_of_birth.clone(),
                place_of_birth: latin.get(Field::PlaceOfBirth).unwrap_or_default().to_string(),
                id_code: id_code.clone(),
            },
            arabic: ScriptFields {
                given_name: aligned.given_name.clone().unwrap_or_default(),
                family_name: aligned.family_name.clone().unwrap_or_default(),
                date_of_birth,
                place_of_birth: aligned
                    .place_of_birth
                    .as_deref()
                    .or_else(|| arabic.get(Field::PlaceOfBirth))
                    .unwrap_or_default()
                    .to_string(),
                id_code,
            },
        }
    }

    pub fn fields(&self, script: Script) -> &ScriptFields {
        match script {
            Script::Latin => &self.latin,
            Script::Arabic => &self.arabic,
        }
    }

    /// Flat mapping of localized field key to value, both scripts included.
    pub fn to_flat_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for script in [Script::Latin, Script::Arabic] {
            let fields = self.fields(script);
            for field in Field::ALL {
                map.insert(field.label(script).to_string(), fields.get(field).to_string());
            }
        }
        map
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_flat_map())
    }
}
