//! Viewport: the on-screen window onto the canvas plane.

use kurbo::{Affine, Point, Rect, Size, Vec2};

use crate::config::EngineConfig;
use crate::geometry::{self, ViewState, ZoomRange};

/// Viewport owns the view transform plus the placement of the canvas element
/// inside the host window.
///
/// Pan is stored in screen pixels relative to `origin`, zoom as a plain scale
/// factor. All gestures go through [`geometry`] so the conversions stay exact
/// inverses of each other.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Current zoom and pan.
    pub view: ViewState,
    /// Screen position of the canvas element's top-left corner.
    pub origin: Point,
    /// Size of the canvas element in screen pixels.
    pub size: Size,
    range: ZoomRange,
    wheel_factor: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Viewport {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            view: ViewState::default(),
            origin: Point::ZERO,
            size: Size::new(1280.0, 800.0),
            range: ZoomRange::new(config.zoom_min, config.zoom_max),
            wheel_factor: config.wheel_zoom_factor,
        }
    }

    /// Place the canvas element inside the host window.
    pub fn set_bounds(&mut self, origin: Point, size: Size) {
        self.origin = origin;
        self.size = size;
    }

    pub fn zoom(&self) -> f64 {
        self.view.zoom
    }

    pub fn zoom_range(&self) -> ZoomRange {
        self.range
    }

    /// Canvas → screen transform for rendering.
    pub fn transform(&self) -> Affine {
        self.view.transform(self.origin)
    }

    pub fn screen_to_canvas(&self, p: Point) -> Point {
        geometry::screen_to_canvas(p, self.origin, &self.view)
    }

    pub fn canvas_to_screen(&self, p: Point) -> Point {
        geometry::canvas_to_screen(p, self.origin, &self.view)
    }

    /// Convert a screen-space delta to canvas units.
    pub fn screen_delta_to_canvas(&self, delta: Vec2) -> Vec2 {
        delta / self.view.zoom
    }

    /// Screen position of the viewport centre.
    pub fn screen_center(&self) -> Point {
        self.origin + Vec2::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    /// Canvas point currently under the viewport centre.
    pub fn canvas_center(&self) -> Point {
        self.screen_to_canvas(self.screen_center())
    }

    /// Canvas-space rectangle currently visible.
    pub fn visible_rect(&self) -> Rect {
        let a = self.screen_to_canvas(self.origin);
        let b = self.screen_to_canvas(self.origin + self.size.to_vec2());
        geometry::rect_from_points(a, b)
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.view.pan += delta;
    }

    /// Wheel zoom about the pointer. Negative `delta_y` (wheel up) zooms in.
    pub fn wheel(&mut self, pointer: Point, delta_y: f64) {
        if delta_y == 0.0 {
            return;
        }
        let factor = if delta_y < 0.0 {
            self.wheel_factor
        } else {
            1.0 / self.wheel_factor
        };
        self.zoom_at(pointer, factor);
    }

    /// Multiply the zoom by `factor`, keeping the canvas point under the
    /// screen point `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        self.view = geometry::zoom_about(anchor, self.origin, &self.view, factor, self.range);
    }

    /// Slider input: absolute zoom anchored on the viewport centre.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.view = geometry::zoom_to(self.screen_center(), self.origin, &self.view, zoom, self.range);
    }

    /// Back to zoom 1, no pan.
    pub fn reset(&mut self) {
        self.view = ViewState::default();
    }

    /// Zoom and pan so `bounds` fills the viewport minus `padding` pixels per side.
    pub fn fit_to_bounds(&mut self, bounds: Rect, padding: f64) {
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            self.reset();
            return;
        }

        let avail_w = (self.size.width - padding * 2.0).max(1.0);
        let avail_h = (self.size.height - padding * 2.0).max(1.0);
        let zoom = self.range.clamp((avail_w / bounds.width()).min(avail_h / bounds.height()));

        let center = bounds.center();
        self.view = ViewState {
            zoom,
            pan: Vec2::new(
                self.size.width / 2.0 - center.x * zoom,
                self.size.height / 2.0 - center.y * zoom,
            ),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::default();
        assert_eq!(viewport.view.pan, Vec2::ZERO);
        assert!((viewport.zoom() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wheel_up_zooms_in_about_pointer() {
        let mut viewport = Viewport::default();
        viewport.set_bounds(Point::new(0.0, 60.0), Size::new(800.0, 600.0));
        let pointer = Point::new(300.0, 260.0);
        let before = viewport.screen_to_canvas(pointer);

        viewport.wheel(pointer, -100.0);

        assert!((viewport.zoom() - 1.1).abs() < 1e-12);
        let after = viewport.screen_to_canvas(pointer);
        assert!((before - after).hypot() < 1e-9);
    }

    #[test]
    fn test_wheel_down_zooms_out() {
        let mut viewport = Viewport::default();
        viewport.wheel(Point::ZERO, 100.0);
        assert!((viewport.zoom() - 1.0 / 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_slider_anchors_on_center() {
        let mut viewport = Viewport::default();
        viewport.set_bounds(Point::new(10.0, 10.0), Size::new(400.0, 300.0));
        viewport.pan_by(Vec2::new(25.0, -40.0));
        let center_before = viewport.canvas_center();

        viewport.set_zoom(2.5);

        assert!((viewport.zoom() - 2.5).abs() < f64::EPSILON);
        assert!((viewport.canvas_center() - center_before).hypot() < 1e-9);
    }

    #[test]
    fn test_slider_clamps() {
        let mut viewport = Viewport::default();
        viewport.set_zoom(10.0);
        assert!((viewport.zoom() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_to_bounds_centers_content() {
        let mut viewport = Viewport::default();
        viewport.set_bounds(Point::ZERO, Size::new(1000.0, 1000.0));
        let bounds = Rect::new(100.0, 100.0, 500.0, 300.0);

        viewport.fit_to_bounds(bounds, 100.0);

        assert!((viewport.zoom() - 2.0).abs() < 1e-12);
        let screen = viewport.canvas_to_screen(bounds.center());
        assert!((screen - Point::new(500.0, 500.0)).hypot() < 1e-9);
    }

    #[test]
    fn test_visible_rect_tracks_pan() {
        let mut viewport = Viewport::default();
        viewport.set_bounds(Point::ZERO, Size::new(200.0, 100.0));
        viewport.pan_by(Vec2::new(-50.0, 0.0));
        let visible = viewport.visible_rect();
        assert!((visible.x0 - 50.0).abs() < f64::EPSILON);
        assert!((visible.width() - 200.0).abs() < f64::EPSILON);
    }
}
