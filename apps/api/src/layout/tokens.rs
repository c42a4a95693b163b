//! Layout density and typography policy tables, and the token set passed to templates.

use serde::{Deserialize, Serialize};

/// Spacing preset. Ordered from least to most aggressive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DensityLevel {
    #[default]
    Normal,
    Tight,
    ExtraTight,
}

/// Base font size preset. Ordered from least to most aggressive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypographyLevel {
    #[default]
    Normal,
    Small,
    Tiny,
}

/// Spacing values for one density level, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spacing {
    pub padding_px: f32,
    pub gap_px: f32,
    pub item_gap_px: f32,
}

impl DensityLevel {
    pub fn tighter(self) -> Option<Self> {
        match self {
            DensityLevel::Normal => Some(DensityLevel::Tight),
            DensityLevel::Tight => Some(DensityLevel::ExtraTight),
            DensityLevel::ExtraTight => None,
        }
    }

    pub fn looser(self) -> Option<Self> {
        match self {
            DensityLevel::Normal => None,
            DensityLevel::Tight => Some(DensityLevel::Normal),
            DensityLevel::ExtraTight => Some(DensityLevel::Tight),
        }
    }

    /// normal: 3rem/1.5rem/1rem, tight: 2rem/1rem/0.5rem, extra-tight: 1.5rem/0.5rem/0.25rem.
    pub fn spacing(self) -> Spacing {
        match self {
            DensityLevel::Normal => Spacing {
                padding_px: 48.0,
                gap_px: 24.0,
                item_gap_px: 16.0,
            },
            DensityLevel::Tight => Spacing {
                padding_px: 32.0,
                gap_px: 16.0,
                item_gap_px: 8.0,
            },
            DensityLevel::ExtraTight => Spacing {
                padding_px: 24.0,
                gap_px: 8.0,
                item_gap_px: 4.0,
            },
        }
    }
}

impl TypographyLevel {
    pub fn smaller(self) -> Option<Self> {
        match self {
            TypographyLevel::Normal => Some(TypographyLevel::Small),
            TypographyLevel::Small => Some(TypographyLevel::Tiny),
            TypographyLevel::Tiny => None,
        }
    }

    pub fn larger(self) -> Option<Self> {
        match self {
            TypographyLevel::Normal => None,
            TypographyLevel::Small => Some(TypographyLevel::Normal),
            TypographyLevel::Tiny => Some(TypographyLevel::Small),
        }
    }

    pub fn base_font_px(self) -> f32 {
        match self {
            TypographyLevel::Normal => 14.0,
            TypographyLevel::Small => 13.0,
            TypographyLevel::Tiny => 12.0,
        }
    }
}

/// Styling inputs handed to a template for one render. Templates read spacing and font
/// size from here and never compute their own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTokens {
    pub padding_px: f32,
    pub gap_px: f32,
    pub item_gap_px: f32,
    pub base_font_px: f32,
    /// Uniform post-layout shrink factor in (0, 1].
    pub scale: f32,
}

impl LayoutTokens {
    pub fn new(density: DensityLevel, typography: TypographyLevel, scale: f32) -> Self {
        let spacing = density.spacing();
        Self {
            padding_px: spacing.padding_px,
            gap_px: spacing.gap_px,
            item_gap_px: spacing.item_gap_px,
            base_font_px: typography.base_font_px(),
            scale,
        }
    }
}

impl Default for LayoutTokens {
    fn default() -> Self {
        Self::new(DensityLevel::Normal, TypographyLevel::Normal, 1.0)
    }
}
