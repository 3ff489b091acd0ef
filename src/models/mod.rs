pub mod profile;
pub mod record;

pub use profile::LanguageProfile;
pub use record::{
    AlignedFields, BilingualRecord, DecodedTextBlock, Field, PartialRecord, Script, ScriptFields,
};
