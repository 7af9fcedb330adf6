//! Fill/background style types

use super::Color;

/// Fill style for cell background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillStyle {
    /// No fill (transparent)
    #[default]
    None,

    /// Solid color fill
    Solid { color: Color },

    /// Pattern fill
    Pattern {
        pattern: PatternType,
        foreground: Color,
        background: Color,
    },
}

impl FillStyle {
    /// Create a solid fill with the given color
    pub fn solid(color: Color) -> Self {
        FillStyle::Solid { color }
    }

    /// Check if this is a "no fill"
    pub fn is_none(&self) -> bool {
        matches!(self, FillStyle::None)
    }

    /// The color of a solid fill, if any
    pub fn solid_color(&self) -> Option<Color> {
        match self {
            FillStyle::Solid { color } => Some(*color),
            _ => None,
        }
    }
}

/// Pattern fill types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PatternType {
    /// No pattern
    #[default]
    None,
    /// Solid (100% foreground)
    Solid,
    /// 50% gray
    MediumGray,
    /// 75% gray
    DarkGray,
    /// 25% gray
    LightGray,
    /// 12.5% gray
    Gray125,
    /// 6.25% gray
    Gray0625,
    /// Any of the hatched/striped patterns
    Other,
}

impl PatternType {
    /// Parse the `patternType` attribute of a `<patternFill>` element
    pub fn from_xlsx(s: &str) -> Self {
        match s {
            "none" => PatternType::None,
            "solid" => PatternType::Solid,
            "mediumGray" => PatternType::MediumGray,
            "darkGray" => PatternType::DarkGray,
            "lightGray" => PatternType::LightGray,
            "gray125" => PatternType::Gray125,
            "gray0625" => PatternType::Gray0625,
            _ => PatternType::Other,
        }
    }
}
