//! The résumé document model exchanged with the extraction service and the editor.
//!
//! Every list field deserializes to an empty `Vec` when absent or `null`, so renderers
//! iterate unconditionally. Wire keys are camelCase.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub personal_info: PersonalInfo,
    #[serde(deserialize_with = "string_or_empty")]
    pub summary: String,
    #[serde(deserialize_with = "list_or_empty")]
    pub experiences: Vec<Experience>,
    #[serde(deserialize_with = "list_or_empty")]
    pub education: Vec<Education>,
    #[serde(deserialize_with = "list_or_empty")]
    pub skills: Vec<String>,
    pub additional_info: AdditionalInfo,
    #[serde(deserialize_with = "list_or_empty")]
    pub custom_blocks: Vec<CustomBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    #[serde(deserialize_with = "string_or_empty")]
    pub full_name: String,
    #[serde(deserialize_with = "string_or_empty")]
    pub job_title: String,
    #[serde(deserialize_with = "string_or_empty")]
    pub email: String,
    #[serde(deserialize_with = "string_or_empty")]
    pub phone: String,
    #[serde(deserialize_with = "string_or_empty")]
    pub location: String,
    /// Opaque photo reference (URL or data URI). Never inspected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    #[serde(deserialize_with = "string_or_empty")]
    pub role: String,
    #[serde(deserialize_with = "string_or_empty")]
    pub company: String,
    #[serde(deserialize_with = "string_or_empty")]
    pub location: String,
    /// Free-form label, e.g. "2020 - 2023" or "Jan 2022 - Present".
    #[serde(deserialize_with = "string_or_empty")]
    pub duration: String,
    #[serde(deserialize_with = "list_or_empty")]
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    #[serde(deserialize_with = "string_or_empty")]
    pub degree: String,
    #[serde(deserialize_with = "string_or_empty")]
    pub school: String,
    #[serde(deserialize_with = "string_or_empty")]
    pub location: String,
    #[serde(deserialize_with = "string_or_empty")]
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalInfo {
    #[serde(deserialize_with = "list_or_empty")]
    pub languages: Vec<String>,
    #[serde(deserialize_with = "list_or_empty")]
    pub certifications: Vec<String>,
    #[serde(deserialize_with = "list_or_empty")]
    pub interests: Vec<String>,
}

/// A user-inserted free-form block attached to a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomBlock {
    pub id: String,
    /// Section key the block is displayed after (e.g. "experiences").
    pub section: String,
    pub kind: BlockKind,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Title,
    Text,
}

/// Colours offered for custom blocks. `None` inherits the template colour.
pub const BLOCK_PALETTE: &[(&str, Option<&str>)] = &[
    ("default", None),
    ("blue", Some("#1d4ed8")),
    ("slate", Some("#475569")),
    ("emerald", Some("#059669")),
    ("rose", Some("#e11d48")),
];

/// Extraction models sometimes emit `null` where a list is expected.
fn list_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Document {
    /// True when nothing renderable remains (used to reject empty extraction results).
    pub fn is_blank(&self) -> bool {
        let p = &self.personal_info;
        p.full_name.trim().is_empty()
            && p.job_title.trim().is_empty()
            && self.summary.trim().is_empty()
            && self.experiences.is_empty()
            && self.education.is_empty()
            && self.skills.is_empty()
    }
}
