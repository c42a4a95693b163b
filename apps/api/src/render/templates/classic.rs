//! Serif "executive" layout. Fields open on double-click so single clicks can be
//! used to select text.

use crate::document::path::{FieldPath, PersonalField};
use crate::editor::Activation;
use crate::layout::metrics::FontFamily;
use crate::layout::tokens::LayoutTokens;
use crate::models::document::Document;
use crate::render::template::{BlockStyles, Builder, EntryStyles, Template, TemplateMeta};
use crate::render::tree::{Align, Column, Node, Page, Role, TextStyle};

const INK: &str = "#0f172a";
const MUTED: &str = "#94a3b8";

pub struct Classic;

static META: TemplateMeta = TemplateMeta {
    id: "classic",
    name: "Executive",
    category: "Finance/Legal",
    has_photo: false,
    style: "Classic Serif",
};

impl Template for Classic {
    fn meta(&self) -> &TemplateMeta {
        &META
    }

    fn activation(&self) -> Activation {
        Activation::DoubleClick
    }

    fn font(&self) -> FontFamily {
        FontFamily::EbGaramond
    }

    fn render(&self, doc: &Document, tokens: &LayoutTokens) -> Page {
        let b = Builder::new(self, doc, tokens);

        let heading = |text: &str| Node::text(text, TextStyle::sized(b.px(-4.0)).bold().upper().color(MUTED));
        let blocks = BlockStyles {
            title: TextStyle::sized(b.px(0.0)).bold().upper().color(INK),
            text: TextStyle::sized(b.px(-1.0)).color("#475569"),
        };
        let entry = EntryStyles {
            title: TextStyle::sized(b.px(0.0)).bold().upper().color(INK),
            subtitle: TextStyle::sized(b.px(-1.0)).italic().color("#334155"),
            meta: TextStyle::sized(b.px(-4.0)).bold().upper().color(MUTED),
            body: TextStyle::sized(b.px(-2.0)).color("#475569"),
        };

        let header = Node::centered(
            Role::Header,
            4.0,
            vec![
                b.personal(
                    PersonalField::FullName,
                    TextStyle::sized(b.px(16.0)).bold().upper().color(INK),
                ),
                b.personal(
                    PersonalField::JobTitle,
                    TextStyle::sized(b.px(0.0)).upper().color("#64748b"),
                ),
                Node::Inline {
                    role: Role::Contact,
                    gap_px: 16.0,
                    align: Align::Center,
                    children: b.contact(&TextStyle::sized(b.px(-3.0)).bold().upper().color("#475569")),
                },
            ],
        );

        let mut children = vec![header, Node::Rule { color: Some(INK.to_string()) }];
        children.extend(b.optional_section(
            "summary",
            heading("Profil"),
            FieldPath::Summary,
            b.summary(TextStyle::sized(b.px(-1.0)).italic().color("#334155"))
                .into_iter()
                .collect(),
            &blocks,
        ));
        children.extend(b.optional_section(
            "experiences",
            heading("Parcours professionnel"),
            FieldPath::Experiences,
            b.experiences(&entry),
            &blocks,
        ));
        children.extend(b.optional_section(
            "education",
            heading("Formation"),
            FieldPath::Education,
            b.education(&entry),
            &blocks,
        ));

        // Skills and languages/interests share a two-column footer.
        let mut footer = Vec::new();
        let tags = b.skill_tags(&TextStyle::sized(b.px(-2.0)).color("#334155"));
        footer.extend(b.optional_section(
            "skills",
            heading("Compétences"),
            FieldPath::Skills,
            if tags.is_empty() {
                Vec::new()
            } else {
                vec![Node::inline(Role::Tags, 8.0, tags)]
            },
            &blocks,
        ));
        if b.has_additional_info() {
            let body = b
                .info_lists(&TextStyle::sized(b.px(-2.0)).color("#334155"))
                .into_iter()
                .map(|(_, items)| items)
                .collect();
            footer.extend(b.optional_section(
                "additionalInfo",
                heading("Langues & Loisirs"),
                FieldPath::AdditionalInfo,
                body,
                &blocks,
            ));
        }
        match footer.len() {
            0 => {}
            1 => children.append(&mut footer),
            _ => {
                let width = 1.0 / footer.len() as f32;
                children.push(Node::Columns {
                    gap_px: tokens.gap_px,
                    columns: footer
                        .into_iter()
                        .map(|body| Column {
                            width,
                            padding_px: 0.0,
                            fill: None,
                            body,
                        })
                        .collect(),
                });
            }
        }

        Page {
            template_id: META.id.to_string(),
            font: self.font(),
            accent: INK.to_string(),
            tokens: *tokens,
            padding_px: tokens.padding_px,
            body: Node::stack(Role::Main, tokens.gap_px, children),
        }
    }
}
