//! Engine tuning knobs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable constants for the canvas engine.
///
/// Every field has a default matching the shipped product, so a partial
/// JSON config only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Smallest zoom factor reachable by wheel or slider.
    pub zoom_min: f64,
    /// Largest zoom factor reachable by wheel or slider.
    pub zoom_max: f64,
    /// Multiplicative zoom step per wheel notch.
    pub wheel_zoom_factor: f64,
    /// Resize floor for width and height, in canvas units.
    pub min_item_size: f64,
    /// Fixed height of link items.
    pub link_height: f64,
    /// Height assumed for auto-height items when testing overlap or routing.
    pub auto_height_fallback: f64,
    /// Length of the rendered arrowhead, in canvas units.
    pub arrowhead_length: f64,
    /// Widest an intake image may be placed, in canvas units.
    pub image_max_width: f64,
    /// Resize/endpoint handle hit radius, in screen pixels.
    pub handle_tolerance: f64,
    /// Arrow stroke hit distance, in screen pixels.
    pub arrow_hit_tolerance: f64,
    /// Pointer travel (screen pixels) that turns a secondary click into a drag.
    pub drag_threshold: f64,
    /// Quiet period before a save is requested, in milliseconds.
    pub save_debounce_ms: u64,
    /// Maximum number of history entries kept.
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zoom_min: 0.5,
            zoom_max: 3.0,
            wheel_zoom_factor: 1.1,
            min_item_size: 40.0,
            link_height: 52.0,
            auto_height_fallback: 100.0,
            arrowhead_length: 10.0,
            image_max_width: 400.0,
            handle_tolerance: 12.0,
            arrow_hit_tolerance: 6.0,
            drag_threshold: 3.0,
            save_debounce_ms: 1000,
            history_limit: 200,
        }
    }
}

impl EngineConfig {
    /// Debounce window as a [`Duration`].
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    /// Parse a config from JSON; omitted fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{"zoomMax": 5.0}"#).unwrap();
        assert!((config.zoom_max - 5.0).abs() < f64::EPSILON);
        assert!((config.min_item_size - 40.0).abs() < f64::EPSILON);
        assert_eq!(config.save_debounce(), Duration::from_secs(1));
    }
}
