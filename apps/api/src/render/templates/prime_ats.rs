//! Single-column, ATS-friendly layout with a blue accent and an optional photo
//! beside the header.

use crate::document::path::{FieldPath, PersonalField};
use crate::layout::metrics::FontFamily;
use crate::layout::tokens::LayoutTokens;
use crate::models::document::Document;
use crate::render::template::{BlockStyles, Builder, EntryStyles, Template, TemplateMeta};
use crate::render::tree::{Column, Node, Page, Role, TextStyle};

const ACCENT: &str = "#1d4ed8";

pub struct PrimeAts;

static META: TemplateMeta = TemplateMeta {
    id: "prime-ats",
    name: "Prime ATS",
    category: "Tech/Product",
    has_photo: true,
    style: "Professional Blue",
};

impl Template for PrimeAts {
    fn meta(&self) -> &TemplateMeta {
        &META
    }

    fn font(&self) -> FontFamily {
        FontFamily::Inter
    }

    fn render(&self, doc: &Document, tokens: &LayoutTokens) -> Page {
        let b = Builder::new(self, doc, tokens);

        let heading = |text: &str| Node::text(text, TextStyle::sized(b.px(4.0)).bold().upper().color(ACCENT));
        let blocks = BlockStyles {
            title: TextStyle::sized(b.px(4.0)).bold().color(ACCENT),
            text: TextStyle::sized(b.px(0.0)),
        };
        let entry = EntryStyles {
            title: TextStyle::sized(b.px(4.0)).bold().color("#111827"),
            subtitle: TextStyle::sized(b.px(0.0)).bold().color("#4b5563"),
            meta: TextStyle::sized(b.px(-2.0)).bold().color("#2563eb"),
            body: TextStyle::sized(b.px(0.0)).color("#374151"),
        };

        let identity = Node::stack(
            Role::Header,
            4.0,
            vec![
                b.personal(
                    PersonalField::FullName,
                    TextStyle::sized(b.px(22.0)).bold().upper().color(ACCENT),
                ),
                b.personal(
                    PersonalField::JobTitle,
                    TextStyle::sized(b.px(10.0)).bold().color("#374151"),
                ),
                Node::inline(
                    Role::Contact,
                    24.0,
                    b.contact(&TextStyle::sized(b.px(0.0)).color("#4b5563")),
                ),
            ],
        );
        let header = match b.photo(112.0) {
            Some(photo) => Node::Columns {
                gap_px: tokens.gap_px,
                columns: vec![
                    Column {
                        width: 0.8,
                        padding_px: 0.0,
                        fill: None,
                        body: identity,
                    },
                    Column {
                        width: 0.2,
                        padding_px: 0.0,
                        fill: None,
                        body: photo,
                    },
                ],
            },
            None => identity,
        };

        let mut children = vec![header, Node::Rule { color: Some(ACCENT.to_string()) }];
        children.extend(b.optional_section(
            "summary",
            heading("Profil"),
            FieldPath::Summary,
            b.summary(TextStyle::sized(b.px(0.0)).italic().color("#374151"))
                .into_iter()
                .collect(),
            &blocks,
        ));
        children.extend(b.optional_section(
            "experiences",
            heading("Expérience professionnelle"),
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
        let tags = b.skill_tags(&TextStyle::sized(b.px(-1.0)).bold().color("#1e40af"));
        children.extend(b.optional_section(
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
                .info_lists(&TextStyle::sized(b.px(-1.0)))
                .into_iter()
                .map(|(label, items)| {
                    Node::inline(
                        Role::Tags,
                        8.0,
                        vec![Node::text(format!("{label} :"), TextStyle::sized(b.px(-1.0)).bold()), items],
                    )
                })
                .collect();
            children.extend(b.optional_section(
                "additionalInfo",
                heading("Informations complémentaires"),
                FieldPath::AdditionalInfo,
                body,
                &blocks,
            ));
        }

        Page {
            template_id: META.id.to_string(),
            font: self.font(),
            accent: ACCENT.to_string(),
            tokens: *tokens,
            padding_px: tokens.padding_px,
            body: Node::stack(Role::Main, tokens.gap_px, children),
        }
    }
}
