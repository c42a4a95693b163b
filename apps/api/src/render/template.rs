//! The `Template` trait and the building blocks shared by the bundled templates.

use serde::Serialize;

use crate::document::mutation::Mutation;
use crate::document::path::{
    BlockField, EducationField, ExperienceField, FieldPath, InfoList, PersonalField,
};
use crate::editor::Activation;
use crate::layout::metrics::FontFamily;
use crate::layout::tokens::LayoutTokens;
use crate::models::document::{BlockKind, Document};
use crate::render::tree::{FieldNode, Node, Page, Role, TextStyle};

/// Catalogue entry shown by the template picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMeta {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub has_photo: bool,
    pub style: &'static str,
}

pub trait Template: Send + Sync {
    fn meta(&self) -> &TemplateMeta;

    fn id(&self) -> &'static str {
        self.meta().id
    }

    /// Gesture that opens a field for editing.
    fn activation(&self) -> Activation {
        Activation::Click
    }

    fn font(&self) -> FontFamily;

    /// Renders `doc` with the given spacing/typography tokens. Templates read every
    /// spacing and size from `tokens` and never choose their own.
    fn render(&self, doc: &Document, tokens: &LayoutTokens) -> Page;
}

/// Per-render helper binding the document, tokens, and the template's edit gesture.
pub(crate) struct Builder<'a> {
    pub doc: &'a Document,
    pub tokens: &'a LayoutTokens,
    pub activation: Activation,
}

impl<'a> Builder<'a> {
    pub fn new(template: &dyn Template, doc: &'a Document, tokens: &'a LayoutTokens) -> Self {
        Self {
            doc,
            tokens,
            activation: template.activation(),
        }
    }

    /// Base font size plus `delta` pixels.
    pub fn px(&self, delta: f32) -> f32 {
        self.tokens.base_font_px + delta
    }

    pub fn field(&self, path: FieldPath, value: &str, style: TextStyle) -> Node {
        Node::Field(FieldNode {
            multiline: path.is_multiline(),
            path,
            value: value.to_string(),
            activation: self.activation,
            style,
        })
    }

    pub fn personal(&self, field: PersonalField, style: TextStyle) -> Node {
        let info = &self.doc.personal_info;
        let value = match field {
            PersonalField::FullName => info.full_name.as_str(),
            PersonalField::JobTitle => info.job_title.as_str(),
            PersonalField::Email => info.email.as_str(),
            PersonalField::Phone => info.phone.as_str(),
            PersonalField::Location => info.location.as_str(),
            PersonalField::Photo => info.photo.as_deref().unwrap_or_default(),
        };
        self.field(FieldPath::Personal(field), value, style)
    }

    /// Photo leaf, if the document has one.
    pub fn photo(&self, size_px: f32) -> Option<Node> {
        self.doc.personal_info.photo.as_ref().map(|src| Node::Photo {
            src: src.clone(),
            size_px,
        })
    }

    /// Contact fields that have a value.
    pub fn contact(&self, style: &TextStyle) -> Vec<Node> {
        let info = &self.doc.personal_info;
        [
            (PersonalField::Email, &info.email),
            (PersonalField::Phone, &info.phone),
            (PersonalField::Location, &info.location),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(field, _)| self.personal(field, style.clone()))
        .collect()
    }

    /// A titled section with a delete affordance that clears it.
    pub fn section(&self, title: Node, clear: FieldPath, mut body: Vec<Node>) -> Node {
        let header = Node::stack(
            Role::SectionTitle,
            0.0,
            vec![title, Node::action("Supprimer la section", Mutation::clear(clear))],
        );
        let mut children = vec![header];
        children.append(&mut body);
        Node::stack(Role::Section, self.tokens.item_gap_px, children)
    }

    /// A section followed by the custom blocks attached to `key`. `None` when both are empty.
    pub fn optional_section(
        &self,
        key: &str,
        title: Node,
        clear: FieldPath,
        mut body: Vec<Node>,
        blocks: &BlockStyles,
    ) -> Option<Node> {
        body.extend(self.custom_blocks(key, blocks));
        if body.is_empty() {
            return None;
        }
        Some(self.section(title, clear, body))
    }

    pub fn summary(&self, style: TextStyle) -> Option<Node> {
        if self.doc.summary.trim().is_empty() {
            return None;
        }
        Some(self.field(FieldPath::Summary, &self.doc.summary, style))
    }

    /// One node per experience: header lines, then the bullet list.
    pub fn experiences(&self, styles: &EntryStyles) -> Vec<Node> {
        self.doc
            .experiences
            .iter()
            .enumerate()
            .map(|(i, exp)| {
                let field = |f: ExperienceField, value: &str, style: &TextStyle| {
                    self.field(FieldPath::ExperienceField(i, f), value, style.clone())
                };
                let header = Node::stack(
                    Role::EntryHeader,
                    2.0,
                    vec![
                        Node::inline(
                            Role::EntryHeader,
                            8.0,
                            vec![
                                field(ExperienceField::Role, &exp.role, &styles.title),
                                field(ExperienceField::Duration, &exp.duration, &styles.meta),
                            ],
                        ),
                        Node::inline(
                            Role::EntryHeader,
                            8.0,
                            vec![
                                field(ExperienceField::Company, &exp.company, &styles.subtitle),
                                field(ExperienceField::Location, &exp.location, &styles.meta),
                            ],
                        ),
                        Node::action(
                            "Supprimer l'expérience",
                            Mutation::RemoveAt {
                                path: FieldPath::Experiences,
                                index: i,
                            },
                        ),
                    ],
                );
                let bullets = exp
                    .description
                    .iter()
                    .enumerate()
                    .map(|(j, bullet)| {
                        Node::stack(
                            Role::Bullet,
                            0.0,
                            vec![
                                self.field(FieldPath::Bullet(i, j), bullet, styles.body.clone()),
                                Node::action(
                                    "Supprimer la ligne",
                                    Mutation::RemoveAt {
                                        path: FieldPath::Description(i),
                                        index: j,
                                    },
                                ),
                            ],
                        )
                    })
                    .collect();
                Node::stack(
                    Role::Entry,
                    self.tokens.item_gap_px / 2.0,
                    vec![header, Node::stack(Role::Bullets, 2.0, bullets)],
                )
            })
            .collect()
    }

    pub fn education(&self, styles: &EntryStyles) -> Vec<Node> {
        self.doc
            .education
            .iter()
            .enumerate()
            .map(|(i, edu)| {
                let field = |f: EducationField, value: &str, style: &TextStyle| {
                    self.field(FieldPath::EducationField(i, f), value, style.clone())
                };
                Node::stack(
                    Role::Entry,
                    2.0,
                    vec![
                        Node::inline(
                            Role::EntryHeader,
                            8.0,
                            vec![
                                field(EducationField::Degree, &edu.degree, &styles.title),
                                field(EducationField::Year, &edu.year, &styles.meta),
                            ],
                        ),
                        Node::inline(
                            Role::EntryHeader,
                            8.0,
                            vec![
                                field(EducationField::School, &edu.school, &styles.subtitle),
                                field(EducationField::Location, &edu.location, &styles.meta),
                            ],
                        ),
                        Node::action(
                            "Supprimer la formation",
                            Mutation::RemoveAt {
                                path: FieldPath::Education,
                                index: i,
                            },
                        ),
                    ],
                )
            })
            .collect()
    }

    /// Skills as wrapped tags, each removable.
    pub fn skill_tags(&self, style: &TextStyle) -> Vec<Node> {
        self.doc
            .skills
            .iter()
            .enumerate()
            .flat_map(|(i, skill)| {
                [
                    self.field(FieldPath::Skill(i), skill, style.clone()),
                    Node::action(
                        "Supprimer",
                        Mutation::RemoveAt {
                            path: FieldPath::Skills,
                            index: i,
                        },
                    ),
                ]
            })
            .collect()
    }

    /// Non-empty additional-info lists as `(label, items)` pairs.
    pub fn info_lists(&self, style: &TextStyle) -> Vec<(&'static str, Node)> {
        let info = &self.doc.additional_info;
        [
            (InfoList::Languages, "Langues", &info.languages),
            (InfoList::Certifications, "Certifications", &info.certifications),
            (InfoList::Interests, "Centres d'intérêt", &info.interests),
        ]
        .into_iter()
        .filter(|(_, _, items)| !items.is_empty())
        .map(|(list, label, items)| {
            let children = items
                .iter()
                .enumerate()
                .map(|(i, item)| self.field(FieldPath::InfoItem(list, i), item, style.clone()))
                .collect();
            (label, Node::inline(Role::Tags, 8.0, children))
        })
        .collect()
    }

    pub fn has_additional_info(&self) -> bool {
        let info = &self.doc.additional_info;
        !(info.languages.is_empty() && info.certifications.is_empty() && info.interests.is_empty())
    }

    /// Custom blocks attached to `section`, in insertion order.
    pub fn custom_blocks(&self, section: &str, styles: &BlockStyles) -> Vec<Node> {
        self.doc
            .custom_blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| block.section == section)
            .map(|(i, block)| {
                let base = match block.kind {
                    BlockKind::Title => &styles.title,
                    BlockKind::Text => &styles.text,
                };
                let style = match &block.color {
                    Some(color) => base.clone().color(color.clone()),
                    None => base.clone(),
                };
                Node::stack(
                    Role::Block,
                    0.0,
                    vec![
                        self.field(FieldPath::BlockField(i, BlockField::Content), &block.content, style),
                        Node::action(
                            "Supprimer le bloc",
                            Mutation::RemoveAt {
                                path: FieldPath::CustomBlocks,
                                index: i,
                            },
                        ),
                    ],
                )
            })
            .collect()
    }
}

/// Text styles for experience and education entries.
#[derive(Debug, Clone)]
pub(crate) struct EntryStyles {
    pub title: TextStyle,
    pub subtitle: TextStyle,
    pub meta: TextStyle,
    pub body: TextStyle,
}

#[derive(Debug, Clone)]
pub(crate) struct BlockStyles {
    pub title: TextStyle,
    pub text: TextStyle,
}
