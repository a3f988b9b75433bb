//! Text formatting carried by Text and Title items.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
}

/// Smallest font size the formatting controls will step down to.
pub const MIN_FONT_SIZE: f64 = 8.0;

/// Formatting of a block of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Alignment used for lines without an explicit entry in `line_aligns`.
    pub align: TextAlign,
    /// Per-line alignment, indexed by line number.
    pub line_aligns: Vec<TextAlign>,
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub decoration: TextDecoration,
    /// CSS colour string, `None` for the theme default.
    pub color: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            align: TextAlign::Left,
            line_aligns: vec![TextAlign::Left],
            font_size: 16.0,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            decoration: TextDecoration::None,
            color: None,
        }
    }
}

impl TextStyle {
    /// Style for a freshly created title.
    pub fn title() -> Self {
        Self {
            font_size: 48.0,
            font_weight: FontWeight::Bold,
            ..Self::default()
        }
    }

    /// Effective alignment of line `line`.
    pub fn line_align(&self, line: usize) -> TextAlign {
        self.line_aligns.get(line).copied().unwrap_or(self.align)
    }

    /// Align line `line` of `text`. Missing entries before it are filled
    /// with the block default so earlier lines keep their current look.
    /// Returns false when `text` has no such line or nothing changed.
    pub fn set_line_align(&mut self, text: &str, line: usize, align: TextAlign) -> bool {
        if line >= text.split('\n').count() || self.line_aligns.get(line) == Some(&align) {
            return false;
        }
        if self.line_aligns.len() <= line {
            self.line_aligns.resize(line + 1, self.align);
        }
        self.line_aligns[line] = align;
        true
    }

    /// Align every line of `text`.
    pub fn align_all(&mut self, text: &str, align: TextAlign) {
        let lines = text.split('\n').count();
        self.align = align;
        self.line_aligns = vec![align; lines];
    }

    /// Step the font size by `delta`, never below [`MIN_FONT_SIZE`].
    pub fn step_font_size(&mut self, delta: f64) {
        self.font_size = (self.font_size + delta).max(MIN_FONT_SIZE);
    }
}
