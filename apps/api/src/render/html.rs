//! Self-contained HTML export of a rendered page, sized to A4.
//!
//! Layout tokens become inline styles and the scale becomes a CSS transform, so the
//! file prints identically to what the editor shows. Edit affordances and empty-field
//! placeholders are not exported.

use crate::layout::engine::{A4_HEIGHT_PX, A4_WIDTH_PX};
use crate::render::tree::{Align, Node, Page, TextStyle, Weight, BULLET_INDENT_PX, LINE_HEIGHT};

pub fn to_html(page: &Page, title: &str) -> String {
    let tokens = &page.tokens;
    let mut out = String::with_capacity(16 * 1024);

    out.push_str("<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape(title)));
    out.push_str("<style>\n");
    out.push_str("@page { size: A4; margin: 0; }\n");
    out.push_str("html, body { margin: 0; padding: 0; background: #ffffff; }\n");
    out.push_str(&format!(
        ".cv-page {{ width: {A4_WIDTH_PX}px; height: {A4_HEIGHT_PX}px; overflow: hidden; margin: 0 auto; }}\n"
    ));
    out.push_str(&format!(
        ".cv-content {{ box-sizing: border-box; width: {A4_WIDTH_PX}px; line-height: {LINE_HEIGHT}; transform-origin: top left; }}\n"
    ));
    out.push_str(&format!(
        ".cv-bullet {{ position: relative; padding-left: {BULLET_INDENT_PX}px; }}\n"
    ));
    out.push_str(".cv-bullet::before { content: \"\\2022\"; position: absolute; left: 4px; }\n");
    out.push_str(".cv-field.multiline { white-space: pre-wrap; }\n");
    out.push_str("</style>\n</head>\n<body>\n");

    out.push_str("<div class=\"cv-page\">\n");
    out.push_str(&format!(
        "<div class=\"cv-content\" data-template=\"{}\" style=\"font-family: {}; font-size: {}px; padding: {}px; transform: scale({}); color: #111827;\">\n",
        escape(&page.template_id),
        page.font.css_stack(),
        tokens.base_font_px,
        page.padding_px,
        tokens.scale,
    ));
    write_node(&mut out, &page.body);
    out.push_str("</div>\n</div>\n</body>\n</html>\n");
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Stack {
            role,
            gap_px,
            align,
            children,
        } => {
            let align = match align {
                Align::Center => " align-items: center; text-align: center;",
                Align::Start => "",
            };
            out.push_str(&format!(
                "<div class=\"{}\" style=\"display: flex; flex-direction: column; gap: {gap_px}px;{align}\">",
                role.class()
            ));
            for child in children {
                write_node(out, child);
            }
            out.push_str("</div>\n");
        }
        Node::Columns { gap_px, columns } => {
            out.push_str(&format!("<div style=\"display: flex; gap: {gap_px}px;\">"));
            for column in columns {
                let fill = column
                    .fill
                    .as_deref()
                    .map(|c| format!(" background: {};", escape(c)))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "<div style=\"box-sizing: border-box; width: {:.2}%; padding: {}px;{fill}\">",
                    column.width * 100.0,
                    column.padding_px,
                ));
                write_node(out, &column.body);
                out.push_str("</div>");
            }
            out.push_str("</div>\n");
        }
        Node::Inline {
            role,
            gap_px,
            align,
            children,
        } => {
            let justify = match align {
                Align::Center => " justify-content: center;",
                Align::Start => "",
            };
            out.push_str(&format!(
                "<div class=\"{}\" style=\"display: flex; flex-wrap: wrap; gap: {gap_px}px;{justify}\">",
                role.class()
            ));
            for child in children {
                write_node(out, child);
            }
            out.push_str("</div>\n");
        }
        Node::Text { text, style } => {
            out.push_str(&format!("<span style=\"{}\">{}</span>", css(style), escape(text)));
        }
        Node::Field(field) => {
            if field.value.trim().is_empty() {
                return;
            }
            let class = if field.multiline {
                "cv-field multiline"
            } else {
                "cv-field"
            };
            out.push_str(&format!(
                "<span class=\"{class}\" data-path=\"{}\" style=\"{}\">{}</span>",
                field.path,
                css(&field.style),
                escape(&field.value)
            ));
        }
        Node::Action(_) => {}
        Node::Photo { src, size_px } => {
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"\" style=\"width: {size_px}px; height: {size_px}px; object-fit: cover; border-radius: 50%;\">",
                escape(src)
            ));
        }
        Node::Rule { color } => {
            out.push_str(&format!(
                "<hr style=\"border: 0; border-top: 1px solid {}; margin: 0;\">\n",
                escape(color.as_deref().unwrap_or("#e5e7eb"))
            ));
        }
    }
}

fn css(style: &TextStyle) -> String {
    let mut css = format!("font-size: {}px;", style.font_px);
    if style.weight == Weight::Bold {
        css.push_str(" font-weight: 700;");
    }
    if style.uppercase {
        css.push_str(" text-transform: uppercase;");
    }
    if style.italic {
        css.push_str(" font-style: italic;");
    }
    if let Some(color) = &style.color {
        css.push_str(&format!(" color: {};", escape(color)));
    }
    css
}

/// Escapes text for use in element content and double-quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
