//! Typed addressing into a [`Document`](crate::models::document::Document).
//!
//! The wire form stays the dot-delimited string used by the editor
//! (`experiences.0.description.2`); inside the service every path is parsed into a
//! [`FieldPath`] once, so mutation code matches on variants instead of walking strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty mutation path")]
    Empty,

    #[error("unknown segment '{segment}' in path '{path}'")]
    UnknownSegment { path: String, segment: String },

    #[error("expected a numeric index at '{segment}' in path '{path}'")]
    ExpectedIndex { path: String, segment: String },

    #[error("path '{path}' continues past a leaf")]
    TrailingSegments { path: String },

    #[error("path '{path}' addresses an entry, not a field")]
    NotAField { path: String },

    #[error("index {index} out of range for '{path}' (len {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("'{path}' expects {expected}")]
    TypeMismatch { path: String, expected: &'static str },

    #[error("'{path}' is not a list")]
    NotAList { path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    FullName,
    JobTitle,
    Email,
    Phone,
    Location,
    Photo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceField {
    Role,
    Company,
    Location,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationField {
    Degree,
    School,
    Location,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoList {
    Languages,
    Certifications,
    Interests,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockField {
    Content,
    Color,
}

/// A parsed mutation target. Indices are checked against the document when applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldPath {
    Personal(PersonalField),
    Summary,
    Skills,
    Skill(usize),
    Experiences,
    ExperienceField(usize, ExperienceField),
    Description(usize),
    Bullet(usize, usize),
    Education,
    EducationField(usize, EducationField),
    AdditionalInfo,
    Info(InfoList),
    InfoItem(InfoList, usize),
    CustomBlocks,
    BlockField(usize, BlockField),
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.trim().is_empty() {
            return Err(PathError::Empty);
        }
        let segments: Vec<&str> = raw.split('.').collect();
        let unknown = |segment: &str| PathError::UnknownSegment {
            path: raw.to_string(),
            segment: segment.to_string(),
        };
        let index = |segment: &str| {
            segment
                .parse::<usize>()
                .map_err(|_| PathError::ExpectedIndex {
                    path: raw.to_string(),
                    segment: segment.to_string(),
                })
        };
        let trailing = || PathError::TrailingSegments {
            path: raw.to_string(),
        };
        let entry = || PathError::NotAField {
            path: raw.to_string(),
        };

        let path = match segments.as_slice() {
            ["summary"] => FieldPath::Summary,
            ["personalInfo"] => return Err(entry()),
            ["personalInfo", field] => FieldPath::Personal(match *field {
                "fullName" => PersonalField::FullName,
                "jobTitle" => PersonalField::JobTitle,
                "email" => PersonalField::Email,
                "phone" => PersonalField::Phone,
                "location" => PersonalField::Location,
                "photo" => PersonalField::Photo,
                other => return Err(unknown(other)),
            }),
            ["skills"] => FieldPath::Skills,
            ["skills", i] => FieldPath::Skill(index(*i)?),
            ["experiences"] => FieldPath::Experiences,
            ["experiences", i] => {
                index(*i)?;
                return Err(entry());
            }
            ["experiences", i, "description"] => FieldPath::Description(index(*i)?),
            ["experiences", i, "description", j] => FieldPath::Bullet(index(*i)?, index(*j)?),
            ["experiences", i, field] => FieldPath::ExperienceField(
                index(*i)?,
                match *field {
                    "role" => ExperienceField::Role,
                    "company" => ExperienceField::Company,
                    "location" => ExperienceField::Location,
                    "duration" => ExperienceField::Duration,
                    other => return Err(unknown(other)),
                },
            ),
            ["education"] => FieldPath::Education,
            ["education", i] => {
                index(*i)?;
                return Err(entry());
            }
            ["education", i, field] => FieldPath::EducationField(
                index(*i)?,
                match *field {
                    "degree" => EducationField::Degree,
                    "school" => EducationField::School,
                    "location" => EducationField::Location,
                    "year" => EducationField::Year,
                    other => return Err(unknown(other)),
                },
            ),
            ["additionalInfo"] => FieldPath::AdditionalInfo,
            ["additionalInfo", list] => {
                FieldPath::Info(parse_info_list(list).ok_or_else(|| unknown(*list))?)
            }
            ["additionalInfo", list, i] => FieldPath::InfoItem(
                parse_info_list(list).ok_or_else(|| unknown(*list))?,
                index(*i)?,
            ),
            ["customBlocks"] => FieldPath::CustomBlocks,
            ["customBlocks", i] => {
                index(*i)?;
                return Err(entry());
            }
            ["customBlocks", i, field] => FieldPath::BlockField(
                index(*i)?,
                match *field {
                    "content" => BlockField::Content,
                    "color" => BlockField::Color,
                    other => return Err(unknown(other)),
                },
            ),
            [first, ..] => {
                let known = [
                    "summary",
                    "personalInfo",
                    "skills",
                    "experiences",
                    "education",
                    "additionalInfo",
                    "customBlocks",
                ];
                if known.contains(first) {
                    return Err(trailing());
                }
                return Err(unknown(*first));
            }
            [] => return Err(PathError::Empty),
        };
        Ok(path)
    }

    /// True for paths addressing an ordered sequence (valid targets for `remove_at`).
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            FieldPath::Skills
                | FieldPath::Experiences
                | FieldPath::Description(_)
                | FieldPath::Education
                | FieldPath::Info(_)
                | FieldPath::CustomBlocks
        )
    }

    /// Prose fields edited in a multiline input; everything else is single-line.
    pub fn is_multiline(&self) -> bool {
        matches!(
            self,
            FieldPath::Summary | FieldPath::Bullet(..) | FieldPath::BlockField(_, BlockField::Content)
        )
    }
}

fn parse_info_list(segment: &str) -> Option<InfoList> {
    match segment {
        "languages" => Some(InfoList::Languages),
        "certifications" => Some(InfoList::Certifications),
        "interests" => Some(InfoList::Interests),
        _ => None,
    }
}

impl InfoList {
    pub fn key(self) -> &'static str {
        match self {
            InfoList::Languages => "languages",
            InfoList::Certifications => "certifications",
            InfoList::Interests => "interests",
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Personal(field) => {
                let key = match field {
                    PersonalField::FullName => "fullName",
                    PersonalField::JobTitle => "jobTitle",
                    PersonalField::Email => "email",
                    PersonalField::Phone => "phone",
                    PersonalField::Location => "location",
                    PersonalField::Photo => "photo",
                };
                write!(f, "personalInfo.{key}")
            }
            FieldPath::Summary => f.write_str("summary"),
            FieldPath::Skills => f.write_str("skills"),
            FieldPath::Skill(i) => write!(f, "skills.{i}"),
            FieldPath::Experiences => f.write_str("experiences"),
            FieldPath::ExperienceField(i, field) => {
                let key = match field {
                    ExperienceField::Role => "role",
                    ExperienceField::Company => "company",
                    ExperienceField::Location => "location",
                    ExperienceField::Duration => "duration",
                };
                write!(f, "experiences.{i}.{key}")
            }
            FieldPath::Description(i) => write!(f, "experiences.{i}.description"),
            FieldPath::Bullet(i, j) => write!(f, "experiences.{i}.description.{j}"),
            FieldPath::Education => f.write_str("education"),
            FieldPath::EducationField(i, field) => {
                let key = match field {
                    EducationField::Degree => "degree",
                    EducationField::School => "school",
                    EducationField::Location => "location",
                    EducationField::Year => "year",
                };
                write!(f, "education.{i}.{key}")
            }
            FieldPath::AdditionalInfo => f.write_str("additionalInfo"),
            FieldPath::Info(list) => write!(f, "additionalInfo.{}", list.key()),
            FieldPath::InfoItem(list, i) => write!(f, "additionalInfo.{}.{i}", list.key()),
            FieldPath::CustomBlocks => f.write_str("customBlocks"),
            FieldPath::BlockField(i, field) => {
                let key = match field {
                    BlockField::Content => "content",
                    BlockField::Color => "color",
                };
                write!(f, "customBlocks.{i}.{key}")
            }
        }
    }
}

impl TryFrom<String> for FieldPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FieldPath::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_bullet() {
        assert_eq!(
            FieldPath::parse("experiences.0.description.2").unwrap(),
            FieldPath::Bullet(0, 2)
        );
    }

    #[test]
    fn test_display_matches_wire_form() {
        for raw in [
            "summary",
            "personalInfo.fullName",
            "personalInfo.photo",
            "skills",
            "skills.4",
            "experiences",
            "experiences.3.duration",
            "experiences.1.description",
            "experiences.1.description.0",
            "education.0.school",
            "additionalInfo",
            "additionalInfo.languages",
            "additionalInfo.interests.2",
            "customBlocks",
            "customBlocks.0.color",
        ] {
            assert_eq!(FieldPath::parse(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn test_unknown_segment() {
        assert!(matches!(
            FieldPath::parse("personalInfo.nickname"),
            Err(PathError::UnknownSegment { .. })
        ));
        assert!(matches!(
            FieldPath::parse("projects"),
            Err(PathError::UnknownSegment { .. })
        ));
    }

    #[test]
    fn test_non_numeric_index() {
        assert!(matches!(
            FieldPath::parse("experiences.first.role"),
            Err(PathError::ExpectedIndex { .. })
        ));
    }

    #[test]
    fn test_entry_and_trailing_paths_rejected() {
        assert!(matches!(
            FieldPath::parse("experiences.0"),
            Err(PathError::NotAField { .. })
        ));
        assert!(matches!(
            FieldPath::parse("summary.text"),
            Err(PathError::TrailingSegments { .. })
        ));
        assert_eq!(FieldPath::parse(""), Err(PathError::Empty));
    }

    #[test]
    fn test_serde_uses_string_form() {
        let json = serde_json::to_string(&FieldPath::Bullet(2, 1)).unwrap();
        assert_eq!(json, "\"experiences.2.description.1\"");
        let back: FieldPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FieldPath::Bullet(2, 1));
        assert!(serde_json::from_str::<FieldPath>("\"nope.1\"").is_err());
    }
}
