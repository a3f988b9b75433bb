//! Per-canvas presentation settings, persisted with the document.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridStyle {
    #[default]
    Dots,
    Lines,
}

/// Board-wide look. Missing fields in stored data take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardSettings {
    /// HSL triple, e.g. `"72 56% 63%"`.
    pub accent_color: String,
    pub show_grid: bool,
    pub grid_style: GridStyle,
    pub grid_opacity: f64,
    pub vignette_intensity: f64,
    /// Item opacity when the item has no override.
    pub default_opacity: f64,
    /// Item background blur (px) when the item has no override.
    pub default_background_blur: f64,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            accent_color: "72 56% 63%".to_string(),
            show_grid: true,
            grid_style: GridStyle::Dots,
            grid_opacity: 0.5,
            vignette_intensity: 0.5,
            default_opacity: 1.0,
            default_background_blur: 0.0,
        }
    }
}

/// Shallow update for [`BoardSettings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
    pub accent_color: Option<String>,
    pub show_grid: Option<bool>,
    pub grid_style: Option<GridStyle>,
    pub grid_opacity: Option<f64>,
    pub vignette_intensity: Option<f64>,
    pub default_opacity: Option<f64>,
    pub default_background_blur: Option<f64>,
}

impl BoardSettings {
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(color) = &patch.accent_color {
            self.accent_color = color.clone();
        }
        if let Some(show) = patch.show_grid {
            self.show_grid = show;
        }
        if let Some(style) = patch.grid_style {
            self.grid_style = style;
        }
        if let Some(opacity) = patch.grid_opacity {
            self.grid_opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(vignette) = patch.vignette_intensity {
            self.vignette_intensity = vignette.clamp(0.0, 1.0);
        }
        if let Some(opacity) = patch.default_opacity {
            self.default_opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(blur) = patch.default_background_blur {
            self.default_background_blur = blur.max(0.0);
        }
    }
}
