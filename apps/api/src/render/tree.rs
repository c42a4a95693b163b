//! Render tree produced by templates and consumed by the measurer and the HTML export.
//!
//! The tree is deliberately small: vertical stacks, side-by-side columns, inline
//! wrapping runs, and leaves. Everything that affects height (font size, gaps,
//! column widths) is carried explicitly so the tree can be measured without CSS.

use serde::Serialize;

use crate::document::mutation::Mutation;
use crate::document::path::FieldPath;
use crate::editor::Activation;
use crate::layout::metrics::FontFamily;
use crate::layout::tokens::LayoutTokens;

/// Left indent of a bullet item, marker included.
pub const BULLET_INDENT_PX: f32 = 16.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Header,
    Section,
    SectionTitle,
    Entry,
    EntryHeader,
    Bullets,
    Bullet,
    Sidebar,
    Main,
    Contact,
    Tags,
    Block,
}

impl Role {
    pub fn class(self) -> &'static str {
        match self {
            Role::Header => "cv-header",
            Role::Section => "cv-section",
            Role::SectionTitle => "cv-section-title",
            Role::Entry => "cv-entry",
            Role::EntryHeader => "cv-entry-header",
            Role::Bullets => "cv-bullets",
            Role::Bullet => "cv-bullet",
            Role::Sidebar => "cv-sidebar",
            Role::Main => "cv-main",
            Role::Contact => "cv-contact",
            Role::Tags => "cv-tags",
            Role::Block => "cv-block",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Weight {
    #[default]
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Align {
    #[default]
    Start,
    Center,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_px: f32,
    pub weight: Weight,
    pub uppercase: bool,
    pub italic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TextStyle {
    pub fn sized(font_px: f32) -> Self {
        Self {
            font_px,
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = Weight::Bold;
        self
    }

    pub fn upper(mut self) -> Self {
        self.uppercase = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// An editable leaf bound to a document path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNode {
    pub path: FieldPath,
    pub value: String,
    pub multiline: bool,
    pub activation: Activation,
    pub style: TextStyle,
}

/// A delete affordance; takes no vertical space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionNode {
    pub label: String,
    pub mutation: Mutation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Fraction of the available width.
    pub width: f32,
    pub padding_px: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    pub body: Node,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum Node {
    /// Vertical stack.
    Stack {
        role: Role,
        gap_px: f32,
        align: Align,
        children: Vec<Node>,
    },
    /// Side-by-side columns.
    Columns { gap_px: f32, columns: Vec<Column> },
    /// Single-line items wrapped onto as many rows as needed.
    Inline {
        role: Role,
        gap_px: f32,
        align: Align,
        children: Vec<Node>,
    },
    Text { text: String, style: TextStyle },
    Field(FieldNode),
    Action(ActionNode),
    Photo { src: String, size_px: f32 },
    Rule {
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
}

impl Node {
    pub fn stack(role: Role, gap_px: f32, children: Vec<Node>) -> Self {
        Node::Stack {
            role,
            gap_px,
            align: Align::Start,
            children,
        }
    }

    pub fn centered(role: Role, gap_px: f32, children: Vec<Node>) -> Self {
        Node::Stack {
            role,
            gap_px,
            align: Align::Center,
            children,
        }
    }

    pub fn inline(role: Role, gap_px: f32, children: Vec<Node>) -> Self {
        Node::Inline {
            role,
            gap_px,
            align: Align::Start,
            children,
        }
    }

    pub fn text(text: impl Into<String>, style: TextStyle) -> Self {
        Node::Text {
            text: text.into(),
            style,
        }
    }

    pub fn action(label: impl Into<String>, mutation: Mutation) -> Self {
        Node::Action(ActionNode {
            label: label.into(),
            mutation,
        })
    }

    /// Depth-first visit of every node, parents before children.
    #[cfg(test)]
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        match self {
            Node::Stack { children, .. } | Node::Inline { children, .. } => {
                for child in children {
                    child.walk(visit);
                }
            }
            Node::Columns { columns, .. } => {
                for column in columns {
                    column.body.walk(visit);
                }
            }
            _ => {}
        }
    }
}

/// A fully rendered page: the body plus page-level styling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub template_id: String,
    pub font: FontFamily,
    pub accent: String,
    pub tokens: LayoutTokens,
    /// Page padding applied by the template; `0` for templates whose columns pad themselves.
    pub padding_px: f32,
    pub body: Node,
}

#[cfg(test)]
impl Page {
    pub fn fields(&self) -> Vec<&FieldNode> {
        let mut out = Vec::new();
        self.body.walk(&mut |node| {
            if let Node::Field(field) = node {
                out.push(field);
            }
        });
        out
    }

    pub fn actions(&self) -> Vec<&ActionNode> {
        let mut out = Vec::new();
        self.body.walk(&mut |node| {
            if let Node::Action(action) = node {
                out.push(action);
            }
        });
        out
    }

    /// Text of every visible leaf in document order.
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.body.walk(&mut |node| match node {
            Node::Text { text, .. } => out.push(text.as_str()),
            Node::Field(field) => out.push(field.value.as_str()),
            _ => {}
        });
        out
    }
}
