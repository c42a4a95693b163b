//! Minimalist single column: centered header, hairline rules, no colour.

use crate::document::path::{FieldPath, PersonalField};
use crate::layout::metrics::FontFamily;
use crate::layout::tokens::LayoutTokens;
use crate::models::document::Document;
use crate::render::template::{BlockStyles, Builder, EntryStyles, Template, TemplateMeta};
use crate::render::tree::{Align, Node, Page, Role, TextStyle};

const INK: &str = "#111827";
const MUTED: &str = "#6b7280";

pub struct Minimal;

static META: TemplateMeta = TemplateMeta {
    id: "minimal",
    name: "Pure ATS",
    category: "Design/Marketing",
    has_photo: true,
    style: "Minimalist",
};

impl Template for Minimal {
    fn meta(&self) -> &TemplateMeta {
        &META
    }

    fn font(&self) -> FontFamily {
        FontFamily::Lato
    }

    fn render(&self, doc: &Document, tokens: &LayoutTokens) -> Page {
        let b = Builder::new(self, doc, tokens);

        let heading = |text: &str| Node::text(text, TextStyle::sized(b.px(0.0)).bold().upper().color(MUTED));
        let blocks = BlockStyles {
            title: TextStyle::sized(b.px(2.0)).bold().color(INK),
            text: TextStyle::sized(b.px(0.0)).color(INK),
        };
        let entry = EntryStyles {
            title: TextStyle::sized(b.px(2.0)).bold().color(INK),
            subtitle: TextStyle::sized(b.px(-3.0)).bold().upper().color(MUTED),
            meta: TextStyle::sized(b.px(-3.0)).bold().color(INK),
            body: TextStyle::sized(b.px(0.0)).color(INK),
        };

        let mut header = Vec::new();
        header.extend(b.photo(96.0));
        header.push(b.personal(
            PersonalField::FullName,
            TextStyle::sized(b.px(30.0)).bold().upper().color(INK),
        ));
        header.push(b.personal(
            PersonalField::JobTitle,
            TextStyle::sized(b.px(2.0)).upper().color(MUTED),
        ));
        header.push(Node::Inline {
            role: Role::Contact,
            gap_px: 12.0,
            align: Align::Center,
            children: b.contact(&TextStyle::sized(b.px(-2.0)).bold().upper().color(MUTED)),
        });

        let mut children = vec![
            Node::centered(Role::Header, tokens.item_gap_px / 2.0, header),
            Node::Rule { color: Some(INK.to_string()) },
        ];
        children.extend(b.optional_section(
            "summary",
            heading("Professional Summary"),
            FieldPath::Summary,
            b.summary(TextStyle::sized(b.px(0.0)).italic().color("#374151"))
                .into_iter()
                .collect(),
            &blocks,
        ));
        children.extend(b.optional_section(
            "experiences",
            heading("Professional Experience"),
            FieldPath::Experiences,
            b.experiences(&entry),
            &blocks,
        ));
        children.extend(b.optional_section(
            "education",
            heading("Education"),
            FieldPath::Education,
            b.education(&entry),
            &blocks,
        ));
        let tags = b.skill_tags(&TextStyle::sized(b.px(-1.0)).color(INK));
        children.extend(b.optional_section(
            "skills",
            heading("Expertise & Skills"),
            FieldPath::Skills,
            if tags.is_empty() {
                Vec::new()
            } else {
                vec![Node::inline(Role::Tags, 10.0, tags)]
            },
            &blocks,
        ));
        if b.has_additional_info() {
            let body = b
                .info_lists(&TextStyle::sized(b.px(-1.0)).color(INK))
                .into_iter()
                .flat_map(|(label, items)| {
                    [
                        Node::text(label, TextStyle::sized(b.px(-4.0)).bold().upper().color(MUTED)),
                        items,
                    ]
                })
                .collect();
            children.extend(b.optional_section(
                "additionalInfo",
                heading("Additional Information"),
                FieldPath::AdditionalInfo,
                body,
                &blocks,
            ));
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
