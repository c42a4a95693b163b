//! Two-column layout: dark emerald sidebar (identity, contact, skills) and a main
//! column with the narrative sections. The default template.

use crate::document::path::{FieldPath, PersonalField};
use crate::layout::metrics::FontFamily;
use crate::layout::tokens::LayoutTokens;
use crate::models::document::Document;
use crate::render::template::{BlockStyles, Builder, EntryStyles, Template, TemplateMeta};
use crate::render::tree::{Column, Node, Page, Role, TextStyle};

const SIDEBAR_FILL: &str = "#064e3b";
const SIDEBAR_INK: &str = "#ecfdf5";
const ACCENT: &str = "#059669";

pub struct Professional;

static META: TemplateMeta = TemplateMeta {
    id: "professional",
    name: "Professional",
    category: "General",
    has_photo: true,
    style: "Emerald Sidebar",
};

impl Template for Professional {
    fn meta(&self) -> &TemplateMeta {
        &META
    }

    fn font(&self) -> FontFamily {
        FontFamily::Inter
    }

    fn render(&self, doc: &Document, tokens: &LayoutTokens) -> Page {
        let b = Builder::new(self, doc, tokens);

        let heading = |text: &str, color: &str| {
            Node::text(text, TextStyle::sized(b.px(-2.0)).bold().upper().color(color))
        };
        let blocks = BlockStyles {
            title: TextStyle::sized(b.px(2.0)).bold(),
            text: TextStyle::sized(b.px(0.0)),
        };

        // Sidebar
        let mut identity = Vec::new();
        identity.extend(b.photo(112.0));
        identity.push(b.personal(
            PersonalField::FullName,
            TextStyle::sized(b.px(10.0)).bold().color("#ffffff"),
        ));
        identity.push(b.personal(
            PersonalField::JobTitle,
            TextStyle::sized(b.px(-4.0)).bold().upper().color("#a7f3d0"),
        ));

        let mut sidebar = vec![Node::centered(Role::Header, tokens.item_gap_px / 2.0, identity)];
        let contact = b.contact(&TextStyle::sized(b.px(-3.0)).color(SIDEBAR_INK));
        if !contact.is_empty() {
            sidebar.push(Node::stack(
                Role::Section,
                tokens.item_gap_px / 2.0,
                std::iter::once(heading("Contact", "#6ee7b7")).chain(contact).collect(),
            ));
        }
        let tags = b.skill_tags(&TextStyle::sized(b.px(-4.0)).color(SIDEBAR_INK));
        sidebar.extend(b.optional_section(
            "skills",
            heading("Expertise", "#6ee7b7"),
            FieldPath::Skills,
            if tags.is_empty() {
                Vec::new()
            } else {
                vec![Node::inline(Role::Tags, 6.0, tags)]
            },
            &blocks,
        ));
        if b.has_additional_info() {
            let lists = b.info_lists(&TextStyle::sized(b.px(-3.0)).color(SIDEBAR_INK));
            let body = lists
                .into_iter()
                .flat_map(|(label, items)| {
                    [
                        Node::text(label, TextStyle::sized(b.px(-5.0)).bold().upper().color("#34d399")),
                        items,
                    ]
                })
                .collect();
            sidebar.extend(b.optional_section(
                "additionalInfo",
                heading("Plus", "#6ee7b7"),
                FieldPath::AdditionalInfo,
                body,
                &blocks,
            ));
        }

        // Main column
        let entry = EntryStyles {
            title: TextStyle::sized(b.px(2.0)).bold().color("#0f172a"),
            subtitle: TextStyle::sized(b.px(0.0)).bold().color(ACCENT),
            meta: TextStyle::sized(b.px(-3.0)).upper().color("#64748b"),
            body: TextStyle::sized(b.px(0.0)).color("#334155"),
        };
        let mut main = Vec::new();
        main.extend(b.optional_section(
            "summary",
            heading("Profil", ACCENT),
            FieldPath::Summary,
            b.summary(TextStyle::sized(b.px(0.0)).italic()).into_iter().collect(),
            &blocks,
        ));
        main.extend(b.optional_section(
            "experiences",
            heading("Expérience professionnelle", ACCENT),
            FieldPath::Experiences,
            b.experiences(&entry),
            &blocks,
        ));
        main.extend(b.optional_section(
            "education",
            heading("Formation", ACCENT),
            FieldPath::Education,
            b.education(&entry),
            &blocks,
        ));

        let body = Node::Columns {
            gap_px: 0.0,
            columns: vec![
                Column {
                    width: 0.33,
                    padding_px: tokens.padding_px * 0.66,
                    fill: Some(SIDEBAR_FILL.to_string()),
                    body: Node::stack(Role::Sidebar, tokens.gap_px * 1.5, sidebar),
                },
                Column {
                    width: 0.67,
                    padding_px: tokens.padding_px,
                    fill: None,
                    body: Node::stack(Role::Main, tokens.gap_px, main),
                },
            ],
        };

        Page {
            template_id: META.id.to_string(),
            font: self.font(),
            accent: ACCENT.to_string(),
            tokens: *tokens,
            padding_px: 0.0,
            body,
        }
    }
}
