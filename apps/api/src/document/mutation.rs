//! Immutable document mutations used by every template's edit affordances.
//!
//! All operations take `&Document` and return a fresh `Document`; the input is never
//! touched, so callers can compare revisions by value. Paths that do not resolve are
//! rejected with a [`PathError`] instead of creating intermediate structure.
//!
//! # Auto-clean
//! An experience entry never survives with an empty `description`: removing (or
//! overwriting with an empty list) its last bullet removes the entry itself, shifting
//! later entries down by one.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::document::path::{
    BlockField, EducationField, ExperienceField, FieldPath, InfoList, PathError, PersonalField,
};
use crate::models::document::{
    AdditionalInfo, BlockKind, CustomBlock, Document, Education, Experience, BLOCK_PALETTE,
};

/// Placeholder bullet of a freshly inserted experience.
pub const NEW_EXPERIENCE_BULLET: &str = "Nouvelle mission ou réalisation clé...";

/// Section keys a custom block may be attached to.
const BLOCK_SECTIONS: &[&str] = &[
    "summary",
    "experiences",
    "education",
    "skills",
    "additionalInfo",
];

// ────────────────────────────────────────────────────────────────────────────
// Values and mutations
// ────────────────────────────────────────────────────────────────────────────

/// Value written by [`update`]. On the wire: a string, an array of strings, or `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    /// Resets the target to its empty value (`""`, `[]` or no photo).
    #[default]
    Clear,
}

impl FieldValue {
    fn into_text(self, path: &FieldPath) -> Result<String, PathError> {
        match self {
            FieldValue::Text(s) => Ok(s),
            FieldValue::Clear => Ok(String::new()),
            FieldValue::List(_) => Err(mismatch(path, "a string")),
        }
    }

    fn into_optional_text(self, path: &FieldPath) -> Result<Option<String>, PathError> {
        match self {
            FieldValue::Text(s) if s.trim().is_empty() => Ok(None),
            FieldValue::Text(s) => Ok(Some(s)),
            FieldValue::Clear => Ok(None),
            FieldValue::List(_) => Err(mismatch(path, "a string or null")),
        }
    }

    fn into_list(self, path: &FieldPath) -> Result<Vec<String>, PathError> {
        match self {
            FieldValue::List(items) => Ok(items),
            FieldValue::Clear => Ok(Vec::new()),
            FieldValue::Text(_) => Err(mismatch(path, "a list of strings")),
        }
    }

    /// Record lists (experiences, education, blocks) can only be cleared through `update`.
    fn require_clear(self, path: &FieldPath) -> Result<(), PathError> {
        match self {
            FieldValue::Clear => Ok(()),
            FieldValue::List(items) if items.is_empty() => Ok(()),
            _ => Err(mismatch(path, "null or an empty list")),
        }
    }
}

/// A single edit issued by the editor. Serialized with an `op` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    Update {
        path: FieldPath,
        #[serde(default)]
        value: FieldValue,
    },
    RemoveAt {
        path: FieldPath,
        index: usize,
    },
    AddExperience,
    AddEducation,
    AddBlock {
        section: String,
        kind: BlockKind,
        #[serde(default)]
        color: Option<String>,
    },
    SetPhoto {
        #[serde(default)]
        photo: Option<String>,
    },
}

impl Mutation {
    /// Section-level delete: clears the section to its empty value, keeping the key.
    pub fn clear(path: FieldPath) -> Self {
        Mutation::Update {
            path,
            value: FieldValue::Clear,
        }
    }
}

/// Applies a mutation, returning the next document.
pub fn apply(doc: &Document, mutation: &Mutation) -> Result<Document, PathError> {
    match mutation {
        Mutation::Update { path, value } => update(doc, path, value.clone()),
        Mutation::RemoveAt { path, index } => remove_at(doc, path, *index),
        Mutation::AddExperience => Ok(prepend_experience(doc)),
        Mutation::AddEducation => Ok(append_education(doc)),
        Mutation::AddBlock {
            section,
            kind,
            color,
        } => append_custom_block(doc, section, *kind, color.as_deref()),
        Mutation::SetPhoto { photo } => update(
            doc,
            &FieldPath::Personal(PersonalField::Photo),
            photo.clone().map(FieldValue::Text).unwrap_or_default(),
        ),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core operations
// ────────────────────────────────────────────────────────────────────────────

/// Replaces the leaf addressed by `path` with `value`.
pub fn update(doc: &Document, path: &FieldPath, value: FieldValue) -> Result<Document, PathError> {
    let mut next = doc.clone();

    match path {
        FieldPath::Personal(field) => {
            let info = &mut next.personal_info;
            match field {
                PersonalField::FullName => info.full_name = value.into_text(path)?,
                PersonalField::JobTitle => info.job_title = value.into_text(path)?,
                PersonalField::Email => info.email = value.into_text(path)?,
                PersonalField::Phone => info.phone = value.into_text(path)?,
                PersonalField::Location => info.location = value.into_text(path)?,
                PersonalField::Photo => info.photo = value.into_optional_text(path)?,
            }
        }
        FieldPath::Summary => next.summary = value.into_text(path)?,
        FieldPath::Skills => next.skills = value.into_list(path)?,
        FieldPath::Skill(i) => *slot(&mut next.skills, *i, path)? = value.into_text(path)?,
        FieldPath::Experiences => {
            value.require_clear(path)?;
            next.experiences.clear();
        }
        FieldPath::ExperienceField(i, field) => {
            let text = value.into_text(path)?;
            let experience = slot(&mut next.experiences, *i, path)?;
            *experience_slot(experience, *field) = text;
        }
        FieldPath::Description(i) => {
            let bullets = value.into_list(path)?;
            let experience = slot(&mut next.experiences, *i, path)?;
            experience.description = bullets;
            if experience.description.is_empty() {
                debug!("description of experience {i} emptied, removing entry");
                next.experiences.remove(*i);
            }
        }
        FieldPath::Bullet(i, j) => {
            let text = value.into_text(path)?;
            let experience = slot(&mut next.experiences, *i, path)?;
            *slot(&mut experience.description, *j, path)? = text;
        }
        FieldPath::Education => {
            value.require_clear(path)?;
            next.education.clear();
        }
        FieldPath::EducationField(i, field) => {
            let text = value.into_text(path)?;
            let education = slot(&mut next.education, *i, path)?;
            *education_slot(education, *field) = text;
        }
        FieldPath::AdditionalInfo => {
            value.require_clear(path)?;
            next.additional_info = AdditionalInfo::default();
        }
        FieldPath::Info(list) => {
            *info_slot(&mut next.additional_info, *list) = value.into_list(path)?;
        }
        FieldPath::InfoItem(list, i) => {
            let text = value.into_text(path)?;
            *slot(info_slot(&mut next.additional_info, *list), *i, path)? = text;
        }
        FieldPath::CustomBlocks => {
            value.require_clear(path)?;
            next.custom_blocks.clear();
        }
        FieldPath::BlockField(i, BlockField::Content) => {
            let text = value.into_text(path)?;
            slot(&mut next.custom_blocks, *i, path)?.content = text;
        }
        FieldPath::BlockField(i, BlockField::Color) => {
            let color = value.into_optional_text(path)?;
            slot(&mut next.custom_blocks, *i, path)?.color = color;
        }
    }

    Ok(next)
}

/// Reads the text leaf addressed by `path`. List and record paths are rejected.
pub fn read_text(doc: &Document, path: &FieldPath) -> Result<String, PathError> {
    fn get<'a, T>(items: &'a [T], index: usize, path: &FieldPath) -> Result<&'a T, PathError> {
        items.get(index).ok_or_else(|| PathError::IndexOutOfRange {
            path: path.to_string(),
            index,
            len: items.len(),
        })
    }

    let info = &doc.personal_info;
    let text = match path {
        FieldPath::Personal(PersonalField::FullName) => info.full_name.clone(),
        FieldPath::Personal(PersonalField::JobTitle) => info.job_title.clone(),
        FieldPath::Personal(PersonalField::Email) => info.email.clone(),
        FieldPath::Personal(PersonalField::Phone) => info.phone.clone(),
        FieldPath::Personal(PersonalField::Location) => info.location.clone(),
        FieldPath::Personal(PersonalField::Photo) => info.photo.clone().unwrap_or_default(),
        FieldPath::Summary => doc.summary.clone(),
        FieldPath::Skill(i) => get(&doc.skills, *i, path)?.clone(),
        FieldPath::ExperienceField(i, field) => {
            let mut experience = get(&doc.experiences, *i, path)?.clone();
            std::mem::take(experience_slot(&mut experience, *field))
        }
        FieldPath::Bullet(i, j) => get(&get(&doc.experiences, *i, path)?.description, *j, path)?.clone(),
        FieldPath::EducationField(i, field) => {
            let mut education = get(&doc.education, *i, path)?.clone();
            std::mem::take(education_slot(&mut education, *field))
        }
        FieldPath::InfoItem(list, i) => {
            let mut info = doc.additional_info.clone();
            std::mem::take(slot(info_slot(&mut info, *list), *i, path)?)
        }
        FieldPath::BlockField(i, BlockField::Content) => get(&doc.custom_blocks, *i, path)?.content.clone(),
        FieldPath::BlockField(i, BlockField::Color) => {
            get(&doc.custom_blocks, *i, path)?.color.clone().unwrap_or_default()
        }
        _ => return Err(mismatch(path, "a text field")),
    };
    Ok(text)
}

/// Removes the element at `index` from the list addressed by `path`.
pub fn remove_at(doc: &Document, path: &FieldPath, index: usize) -> Result<Document, PathError> {
    let mut next = doc.clone();

    match path {
        FieldPath::Skills => remove_item(&mut next.skills, index, path)?,
        FieldPath::Experiences => remove_item(&mut next.experiences, index, path)?,
        FieldPath::Description(i) => {
            let experience = slot(&mut next.experiences, *i, path)?;
            remove_item(&mut experience.description, index, path)?;
            if experience.description.is_empty() {
                debug!("last bullet of experience {i} removed, removing entry");
                next.experiences.remove(*i);
            }
        }
        FieldPath::Education => remove_item(&mut next.education, index, path)?,
        FieldPath::Info(list) => remove_item(info_slot(&mut next.additional_info, *list), index, path)?,
        FieldPath::CustomBlocks => remove_item(&mut next.custom_blocks, index, path)?,
        _ => {
            return Err(PathError::NotAList {
                path: path.to_string(),
            })
        }
    }

    Ok(next)
}

/// Inserts a placeholder experience at the top of the list.
pub fn prepend_experience(doc: &Document) -> Document {
    let mut next = doc.clone();
    next.experiences.insert(
        0,
        Experience {
            role: "Nouveau poste".to_string(),
            company: "Entreprise".to_string(),
            location: "Ville, Pays".to_string(),
            duration: format!("{} - Présent", Utc::now().year()),
            description: vec![NEW_EXPERIENCE_BULLET.to_string()],
        },
    );
    next
}

/// Appends a placeholder education entry.
pub fn append_education(doc: &Document) -> Document {
    let mut next = doc.clone();
    next.education.push(Education {
        degree: "Nouveau diplôme".to_string(),
        school: "École / Université".to_string(),
        location: "Ville, Pays".to_string(),
        year: Utc::now().year().to_string(),
    });
    next
}

/// Appends a custom title/text block attached to `section`.
///
/// `color` must be one of the [`BLOCK_PALETTE`] hex values; `None` inherits the
/// template colour.
pub fn append_custom_block(
    doc: &Document,
    section: &str,
    kind: BlockKind,
    color: Option<&str>,
) -> Result<Document, PathError> {
    if !BLOCK_SECTIONS.contains(&section) {
        return Err(PathError::UnknownSegment {
            path: "customBlocks".to_string(),
            segment: section.to_string(),
        });
    }
    let color = match color {
        None | Some("inherit") => None,
        Some(hex) if BLOCK_PALETTE.iter().any(|(_, c)| *c == Some(hex)) => Some(hex.to_string()),
        Some(_) => {
            return Err(PathError::TypeMismatch {
                path: "customBlocks".to_string(),
                expected: "a palette colour",
            })
        }
    };

    let mut next = doc.clone();
    next.custom_blocks.push(CustomBlock {
        id: Uuid::new_v4().to_string(),
        section: section.to_string(),
        kind,
        content: match kind {
            BlockKind::Title => "Nouveau titre".to_string(),
            BlockKind::Text => "Nouveau paragraphe".to_string(),
        },
        color,
    });
    Ok(next)
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn mismatch(path: &FieldPath, expected: &'static str) -> PathError {
    PathError::TypeMismatch {
        path: path.to_string(),
        expected,
    }
}

fn slot<'a, T>(items: &'a mut [T], index: usize, path: &FieldPath) -> Result<&'a mut T, PathError> {
    let len = items.len();
    items.get_mut(index).ok_or_else(|| PathError::IndexOutOfRange {
        path: path.to_string(),
        index,
        len,
    })
}

fn remove_item<T>(items: &mut Vec<T>, index: usize, path: &FieldPath) -> Result<(), PathError> {
    if index >= items.len() {
        return Err(PathError::IndexOutOfRange {
            path: path.to_string(),
            index,
            len: items.len(),
        });
    }
    items.remove(index);
    Ok(())
}

fn experience_slot(experience: &mut Experience, field: ExperienceField) -> &mut String {
    match field {
        ExperienceField::Role => &mut experience.role,
        ExperienceField::Company => &mut experience.company,
        ExperienceField::Location => &mut experience.location,
        ExperienceField::Duration => &mut experience.duration,
    }
}

fn education_slot(education: &mut Education, field: EducationField) -> &mut String {
    match field {
        EducationField::Degree => &mut education.degree,
        EducationField::School => &mut education.school,
        EducationField::Location => &mut education.location,
        EducationField::Year => &mut education.year,
    }
}

fn info_slot(info: &mut AdditionalInfo, list: InfoList) -> &mut Vec<String> {
    match list {
        InfoList::Languages => &mut info.languages,
        InfoList::Certifications => &mut info.certifications,
        InfoList::Interests => &mut info.interests,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::fixtures::{experience, sample_document};

    fn path(raw: &str) -> FieldPath {
        FieldPath::parse(raw).unwrap()
    }

    // ── update ──────────────────────────────────────────────────────────────

    #[test]
    fn test_update_does_not_touch_input() {
        let doc = sample_document();
        let snapshot = doc.clone();
        let next = update(
            &doc,
            &path("experiences.1.role"),
            FieldValue::Text("Staff Engineer".to_string()),
        )
        .unwrap();

        assert_eq!(doc, snapshot, "input document must be untouched");
        assert_eq!(next.experiences[1].role, "Staff Engineer");

        // Only the addressed leaf differs.
        let mut expected = doc.clone();
        expected.experiences[1].role = "Staff Engineer".to_string();
        assert_eq!(next, expected);
    }

    #[test]
    fn test_update_bullet_leaf() {
        let doc = sample_document();
        let next = update(
            &doc,
            &path("experiences.0.description.1"),
            FieldValue::Text("Cut p99 latency by 55%".to_string()),
        )
        .unwrap();
        assert_eq!(next.experiences[0].description[1], "Cut p99 latency by 55%");
        assert_eq!(next.experiences[0].description.len(), 2);
    }

    #[test]
    fn test_update_out_of_range_index_fails() {
        let doc = sample_document();
        let err = update(
            &doc,
            &path("experiences.9.role"),
            FieldValue::Text("x".to_string()),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PathError::IndexOutOfRange {
                path: "experiences.9.role".to_string(),
                index: 9,
                len: 2,
            }
        );
    }

    #[test]
    fn test_update_rejects_kind_mismatch() {
        let doc = sample_document();
        let err = update(&doc, &path("summary"), FieldValue::List(vec![])).unwrap_err();
        assert!(matches!(err, PathError::TypeMismatch { .. }));

        let err = update(&doc, &path("skills"), FieldValue::Text("Rust".into())).unwrap_err();
        assert!(matches!(err, PathError::TypeMismatch { .. }));
    }

    #[test]
    fn test_section_clear_keeps_key_with_empty_value() {
        let doc = sample_document();
        let next = apply(&doc, &Mutation::clear(FieldPath::Experiences)).unwrap();
        assert!(next.experiences.is_empty());
        let next = apply(&next, &Mutation::clear(FieldPath::Summary)).unwrap();
        assert_eq!(next.summary, "");

        let json = serde_json::to_value(&next).unwrap();
        assert_eq!(json["experiences"], serde_json::json!([]));
        assert_eq!(json["summary"], serde_json::json!(""));
    }

    #[test]
    fn test_record_list_cannot_be_overwritten_with_strings() {
        let doc = sample_document();
        let err = update(
            &doc,
            &FieldPath::Education,
            FieldValue::List(vec!["MIT".to_string()]),
        )
        .unwrap_err();
        assert!(matches!(err, PathError::TypeMismatch { .. }));
    }

    #[test]
    fn test_emptying_description_through_update_removes_entry() {
        let doc = sample_document();
        let next = update(&doc, &path("experiences.0.description"), FieldValue::List(vec![])).unwrap();
        assert_eq!(next.experiences.len(), 1);
        assert_eq!(next.experiences[0].role, "Engineer");
    }

    #[test]
    fn test_photo_set_and_cleared() {
        let doc = sample_document();
        let with_photo = apply(
            &doc,
            &Mutation::SetPhoto {
                photo: Some("data:image/png;base64,AAAA".to_string()),
            },
        )
        .unwrap();
        assert!(with_photo.personal_info.photo.is_some());
        let cleared = apply(&with_photo, &Mutation::SetPhoto { photo: None }).unwrap();
        assert!(cleared.personal_info.photo.is_none());
        assert_eq!(cleared.personal_info.location, doc.personal_info.location);
    }

    #[test]
    fn test_read_text_follows_paths() {
        let doc = sample_document();
        assert_eq!(read_text(&doc, &path("experiences.0.description.1")).unwrap(), "Cut p99 latency by 40%");
        assert_eq!(read_text(&doc, &path("education.0.school")).unwrap(), "INSA Lyon");
        assert_eq!(read_text(&doc, &path("additionalInfo.languages.1")).unwrap(), "English");
        assert_eq!(read_text(&doc, &path("personalInfo.photo")).unwrap(), "");
        assert!(matches!(
            read_text(&doc, &FieldPath::Skills),
            Err(PathError::TypeMismatch { .. })
        ));
        assert!(matches!(
            read_text(&doc, &path("skills.7")),
            Err(PathError::IndexOutOfRange { .. })
        ));
    }

    // ── remove_at ───────────────────────────────────────────────────────────

    #[test]
    fn test_removing_last_bullet_removes_experience_and_shifts() {
        let mut doc = sample_document();
        doc.experiences.push(experience("Intern", &["Wrote tests"]));
        // [Senior Engineer(2 bullets), Engineer(1 bullet), Intern(1 bullet)]

        let next = remove_at(&doc, &path("experiences.1.description"), 0).unwrap();
        assert_eq!(next.experiences.len(), 2);
        assert_eq!(next.experiences[0].role, "Senior Engineer");
        assert_eq!(next.experiences[1].role, "Intern", "later entries shift down");
        assert!(next.experiences.iter().all(|e| !e.description.is_empty()));
    }

    #[test]
    fn test_removing_placeholder_bullet_of_new_experience() {
        let doc = prepend_experience(&sample_document());
        assert_eq!(doc.experiences[0].description, vec![NEW_EXPERIENCE_BULLET]);

        let next = apply(
            &doc,
            &Mutation::RemoveAt {
                path: FieldPath::Description(0),
                index: 0,
            },
        )
        .unwrap();
        assert_eq!(next.experiences.len(), 2);
        assert_eq!(next.experiences[0].role, "Senior Engineer");
    }

    #[test]
    fn test_removing_non_last_bullet_keeps_entry() {
        let doc = sample_document();
        let next = remove_at(&doc, &FieldPath::Description(0), 0).unwrap();
        assert_eq!(next.experiences.len(), 2);
        assert_eq!(next.experiences[0].description, vec!["Cut p99 latency by 40%"]);
    }

    #[test]
    fn test_remove_at_keeps_duplicate_skills_order() {
        let doc = sample_document(); // ["Rust", "PostgreSQL", "Rust"]
        let next = remove_at(&doc, &FieldPath::Skills, 0).unwrap();
        assert_eq!(next.skills, vec!["PostgreSQL", "Rust"]);
    }

    #[test]
    fn test_remove_at_on_leaf_fails() {
        let doc = sample_document();
        assert!(matches!(
            remove_at(&doc, &FieldPath::Summary, 0),
            Err(PathError::NotAList { .. })
        ));
        assert!(matches!(
            remove_at(&doc, &FieldPath::Education, 3),
            Err(PathError::IndexOutOfRange { .. })
        ));
    }

    // ── insertions ──────────────────────────────────────────────────────────

    #[test]
    fn test_add_experience_prepends_and_add_education_appends() {
        let doc = sample_document();
        let next = apply(&doc, &Mutation::AddExperience).unwrap();
        assert_eq!(next.experiences.len(), 3);
        assert_eq!(next.experiences[0].role, "Nouveau poste");
        let next = apply(&next, &Mutation::AddEducation).unwrap();
        assert_eq!(next.education.len(), 2);
        assert_eq!(next.education[1].degree, "Nouveau diplôme");
    }

    #[test]
    fn test_add_block_validates_section_and_colour() {
        let doc = sample_document();
        let next = append_custom_block(&doc, "experiences", BlockKind::Title, Some("#1d4ed8")).unwrap();
        assert_eq!(next.custom_blocks.len(), 1);
        assert_eq!(next.custom_blocks[0].color.as_deref(), Some("#1d4ed8"));

        assert!(append_custom_block(&doc, "hobbies", BlockKind::Text, None).is_err());
        assert!(append_custom_block(&doc, "skills", BlockKind::Text, Some("#ff00ff")).is_err());
        let inherit = append_custom_block(&doc, "skills", BlockKind::Text, Some("inherit")).unwrap();
        assert!(inherit.custom_blocks[0].color.is_none());
    }

    // ── wire form ───────────────────────────────────────────────────────────

    #[test]
    fn test_mutation_wire_form() {
        let m: Mutation = serde_json::from_str(
            r#"{"op": "update", "path": "experiences.0.description", "value": ["a", "b"]}"#,
        )
        .unwrap();
        assert_eq!(
            m,
            Mutation::Update {
                path: FieldPath::Description(0),
                value: FieldValue::List(vec!["a".to_string(), "b".to_string()]),
            }
        );

        let m: Mutation = serde_json::from_str(r#"{"op": "update", "path": "summary", "value": null}"#).unwrap();
        assert_eq!(m, Mutation::clear(FieldPath::Summary));

        let m: Mutation =
            serde_json::from_str(r#"{"op": "removeAt", "path": "skills", "index": 2}"#).unwrap();
        assert_eq!(
            m,
            Mutation::RemoveAt {
                path: FieldPath::Skills,
                index: 2
            }
        );

        assert!(serde_json::from_str::<Mutation>(r#"{"op": "update", "path": "bogus.path"}"#).is_err());
    }
}
