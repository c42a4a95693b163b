//! Height measurement of rendered pages.
//!
//! In the editor the browser reports real heights. The server has no layout engine, so
//! [`EstimatedMeasurer`] walks the render tree and estimates heights from the static
//! font-metric tables: greedy word wrap over the available width, `LINE_HEIGHT × font`
//! per line. Estimates are close enough to pick a ladder state for export.

use crate::editor::placeholder;
use crate::layout::engine::A4_WIDTH_PX;
use crate::layout::metrics::{get_metrics, FontMetricTable};
use crate::render::tree::{Node, Page, Role, TextStyle, Weight, BULLET_INDENT_PX, LINE_HEIGHT};

/// Bold glyphs run wider than the regular tables.
const BOLD_WIDTH_FACTOR: f32 = 1.06;

/// Measures the unscaled content height of a page, in CSS pixels.
/// `None` means the page could not be measured.
pub trait Measurer: Send + Sync {
    fn measure(&self, page: &Page) -> Option<f32>;
}

#[derive(Debug, Clone, Copy)]
pub struct EstimatedMeasurer {
    pub page_width_px: f32,
}

impl Default for EstimatedMeasurer {
    fn default() -> Self {
        Self {
            page_width_px: A4_WIDTH_PX,
        }
    }
}

impl Measurer for EstimatedMeasurer {
    fn measure(&self, page: &Page) -> Option<f32> {
        let metrics = get_metrics(page.font);
        let inner = self.page_width_px - 2.0 * page.padding_px;
        if inner <= 0.0 {
            return None;
        }
        let height = node_height(metrics, &page.body, inner) + 2.0 * page.padding_px;
        Some(height)
    }
}

fn node_height(metrics: &FontMetricTable, node: &Node, width: f32) -> f32 {
    match node {
        Node::Stack {
            role,
            gap_px,
            children,
            ..
        } => {
            let width = if *role == Role::Bullet {
                width - BULLET_INDENT_PX
            } else {
                width
            };
            let heights: Vec<f32> = children
                .iter()
                .map(|child| node_height(metrics, child, width))
                .filter(|h| *h > 0.0)
                .collect();
            stacked(&heights, *gap_px)
        }
        Node::Columns { gap_px, columns } => {
            let available = width - gap_px * columns.len().saturating_sub(1) as f32;
            columns
                .iter()
                .map(|column| {
                    let inner = available * column.width - 2.0 * column.padding_px;
                    node_height(metrics, &column.body, inner.max(1.0)) + 2.0 * column.padding_px
                })
                .fold(0.0, f32::max)
        }
        Node::Inline { gap_px, children, .. } => inline_height(metrics, children, *gap_px, width),
        Node::Text { text, style } => text_height(metrics, text, style, width),
        Node::Field(field) => {
            let shown = if field.value.is_empty() {
                placeholder(field.multiline)
            } else {
                field.value.as_str()
            };
            text_height(metrics, shown, &field.style, width)
        }
        Node::Action(_) => 0.0,
        Node::Photo { size_px, .. } => *size_px,
        Node::Rule { .. } => 1.0,
    }
}

fn stacked(heights: &[f32], gap: f32) -> f32 {
    if heights.is_empty() {
        return 0.0;
    }
    heights.iter().sum::<f32>() + gap * (heights.len() - 1) as f32
}

/// Flex-wrap layout: leaves sit side by side and wrap to a new row when full;
/// container children take a row of their own.
fn inline_height(metrics: &FontMetricTable, children: &[Node], gap: f32, width: f32) -> f32 {
    let mut rows: Vec<f32> = Vec::new();
    let mut row_width = 0.0_f32;
    let mut row_height = 0.0_f32;

    for child in children {
        let leaf = match child {
            Node::Text { text, style } => Some((text.as_str(), style)),
            Node::Field(field) if !field.value.is_empty() => Some((field.value.as_str(), &field.style)),
            Node::Field(field) => Some((placeholder(field.multiline), &field.style)),
            _ => None,
        };
        match leaf {
            Some((text, style)) => {
                let w = (text_width(metrics, text, style)).min(width);
                let h = text_height(metrics, text, style, width);
                if row_width > 0.0 && row_width + gap + w > width {
                    rows.push(row_height);
                    row_width = 0.0;
                    row_height = 0.0;
                }
                row_width += if row_width > 0.0 { gap + w } else { w };
                row_height = row_height.max(h);
            }
            None => {
                let h = node_height(metrics, child, width);
                if h <= 0.0 {
                    continue;
                }
                if row_width > 0.0 {
                    rows.push(row_height);
                    row_width = 0.0;
                    row_height = 0.0;
                }
                rows.push(h);
            }
        }
    }
    if row_width > 0.0 {
        rows.push(row_height);
    }
    stacked(&rows, gap)
}

fn styled(text: &str, style: &TextStyle) -> String {
    if style.uppercase {
        text.to_uppercase()
    } else {
        text.to_string()
    }
}

fn text_width(metrics: &FontMetricTable, text: &str, style: &TextStyle) -> f32 {
    let factor = if style.weight == Weight::Bold {
        BOLD_WIDTH_FACTOR
    } else {
        1.0
    };
    metrics.measure_str(&styled(text, style)) * style.font_px * factor
}

fn text_height(metrics: &FontMetricTable, text: &str, style: &TextStyle, width: f32) -> f32 {
    if style.font_px <= 0.0 || width <= 0.0 {
        return 0.0;
    }
    let factor = if style.weight == Weight::Bold {
        BOLD_WIDTH_FACTOR
    } else {
        1.0
    };
    let max_width_em = width / (style.font_px * factor);
    let lines = metrics.wrapped_lines(&styled(text, style), max_width_em).max(1);
    lines as f32 * style.font_px * LINE_HEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tokens::{DensityLevel, LayoutTokens, TypographyLevel};
    use crate::models::document::fixtures::{dense_document, sample_document};
    use crate::render::TemplateRegistry;

    fn height(template: &str, doc: &crate::models::document::Document, tokens: LayoutTokens) -> f32 {
        let page = TemplateRegistry::builtin().resolve(template).render(doc, &tokens);
        EstimatedMeasurer::default().measure(&page).unwrap()
    }

    #[test]
    fn test_more_content_is_taller() {
        for template in ["professional", "prime-ats", "minimal", "classic"] {
            let small = height(template, &sample_document(), LayoutTokens::default());
            let large = height(template, &dense_document(), LayoutTokens::default());
            assert!(large > small, "{template}: {large} <= {small}");
        }
    }

    #[test]
    fn test_tighter_density_is_shorter() {
        let doc = dense_document();
        for template in ["professional", "prime-ats", "minimal", "classic"] {
            let normal = height(template, &doc, LayoutTokens::default());
            let tight = height(
                template,
                &doc,
                LayoutTokens::new(DensityLevel::Tight, TypographyLevel::Normal, 1.0),
            );
            let tiny = height(
                template,
                &doc,
                LayoutTokens::new(DensityLevel::ExtraTight, TypographyLevel::Tiny, 1.0),
            );
            assert!(tight < normal, "{template}");
            assert!(tiny < tight, "{template}");
        }
    }

    #[test]
    fn test_dense_document_overflows_a4() {
        let h = height("prime-ats", &dense_document(), LayoutTokens::default());
        assert!(h > 1122.0, "six experiences with five bullets must overflow, got {h}");
    }

    #[test]
    fn test_scale_does_not_change_measured_height() {
        let doc = sample_document();
        let full = height("minimal", &doc, LayoutTokens::default());
        let scaled = height(
            "minimal",
            &doc,
            LayoutTokens::new(DensityLevel::Normal, TypographyLevel::Normal, 0.85),
        );
        assert_eq!(full, scaled);
    }

    #[test]
    fn test_wrapping_inline_row() {
        let metrics = get_metrics(crate::layout::metrics::FontFamily::Inter);
        let style = TextStyle::sized(10.0);
        let tags: Vec<Node> = (0..30).map(|i| Node::text(format!("Skill {i}"), style.clone())).collect();
        let narrow = inline_height(metrics, &tags, 4.0, 150.0);
        let wide = inline_height(metrics, &tags, 4.0, 700.0);
        assert!(narrow > wide);
        assert_eq!(inline_height(metrics, &[], 4.0, 700.0), 0.0);
    }
}
