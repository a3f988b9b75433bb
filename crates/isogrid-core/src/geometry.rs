//! Pure geometry: coordinate transforms, zoom math, overlap tests and
//! arrow routing.
//!
//! Screen points are in host-window pixels. Canvas points live in the
//! infinite board plane. The viewport origin is the screen position of the
//! canvas element's top-left corner, so a screen point maps to canvas space as
//! `(p - origin - pan) / zoom`.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom and pan of one board visit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Scale factor, always positive.
    pub zoom: f64,
    /// Translation in screen pixels, relative to the viewport origin.
    pub pan: Vec2,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

impl ViewState {
    pub fn new(zoom: f64, pan: Vec2) -> Self {
        Self { zoom, pan }
    }

    /// Canvas → screen transform for a viewport whose top-left sits at `origin`.
    pub fn transform(&self, origin: Point) -> Affine {
        Affine::translate(origin.to_vec2() + self.pan) * Affine::scale(self.zoom)
    }
}

/// Inclusive zoom bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }
}

/// Convert a screen point to canvas space.
pub fn screen_to_canvas(p: Point, origin: Point, view: &ViewState) -> Point {
    Point::new(
        (p.x - origin.x - view.pan.x) / view.zoom,
        (p.y - origin.y - view.pan.y) / view.zoom,
    )
}

/// Convert a canvas point to screen space. Inverse of [`screen_to_canvas`].
pub fn canvas_to_screen(p: Point, origin: Point, view: &ViewState) -> Point {
    Point::new(
        p.x * view.zoom + view.pan.x + origin.x,
        p.y * view.zoom + view.pan.y + origin.y,
    )
}

/// Scale the view by `factor` while keeping the canvas point under `anchor`
/// (a screen point) fixed.
///
/// The resulting zoom is clamped to `range`; the pan is solved from the
/// clamped zoom so the anchor invariant holds even at the bounds.
pub fn zoom_about(anchor: Point, origin: Point, view: &ViewState, factor: f64, range: ZoomRange) -> ViewState {
    zoom_to(anchor, origin, view, view.zoom * factor, range)
}

/// Like [`zoom_about`] but targeting an absolute zoom level (slider input).
pub fn zoom_to(anchor: Point, origin: Point, view: &ViewState, target_zoom: f64, range: ZoomRange) -> ViewState {
    let zoom = range.clamp(target_zoom);
    let under_anchor = screen_to_canvas(anchor, origin, view);
    let local = anchor - origin;
    ViewState {
        zoom,
        pan: Vec2::new(local.x - under_anchor.x * zoom, local.y - under_anchor.y * zoom),
    }
}

/// Normalized rectangle spanned by two corner points.
pub fn rect_from_points(a: Point, b: Point) -> Rect {
    Rect::from_points(a, b).abs()
}

/// Strict axis-aligned overlap: rectangles that merely touch do not intersect.
pub fn rect_intersects_rect(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

/// Intersection of segments `p1→p2` and `p3→p4`, if they cross.
pub fn segment_intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let den = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if den.abs() < f64::EPSILON {
        return None;
    }

    let t = ((p1.x - p3.x) * (p3.y - p4.y) - (p1.y - p3.y) * (p3.x - p4.x)) / den;
    let u = -((p1.x - p2.x) * (p1.y - p3.y) - (p1.y - p2.y) * (p1.x - p3.x)) / den;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Point::new(p1.x + t * (p2.x - p1.x), p1.y + t * (p2.y - p1.y)))
    } else {
        None
    }
}

/// Where the segment `from→to` leaves `rect`, choosing the crossing closest to
/// `from` among all four edges.
pub fn rect_boundary_crossing(from: Point, to: Point, rect: Rect) -> Option<Point> {
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    (0..4)
        .filter_map(|i| segment_intersection(from, to, corners[i], corners[(i + 1) % 4]))
        .min_by(|a, b| from.distance(*a).total_cmp(&from.distance(*b)))
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}

/// Pull `end` back towards `start` by `head_len` so a marker drawn at the
/// shaft end puts its tip at `end`. Segments shorter than the head collapse
/// onto `start`.
pub fn shorten_end(start: Point, end: Point, head_len: f64) -> Point {
    let dir = end - start;
    let length = dir.hypot();
    if length < f64::EPSILON {
        return end;
    }
    if length < head_len {
        return start;
    }
    end - dir * (head_len / length)
}

/// One end of a connector: either a free canvas point or an item rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Terminal {
    Point(Point),
    Rect(Rect),
}

impl Terminal {
    pub fn center(&self) -> Point {
        match self {
            Terminal::Point(p) => *p,
            Terminal::Rect(r) => r.center(),
        }
    }

    fn attach(&self, toward: Point) -> Option<Point> {
        match self {
            Terminal::Point(p) => Some(*p),
            Terminal::Rect(r) => rect_boundary_crossing(r.center(), toward, *r),
        }
    }
}

/// Resolved geometry of a connector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowRoute {
    /// Where the shaft starts.
    pub start: Point,
    /// Where the arrowhead tip touches.
    pub end: Point,
    /// Shaft end, `end` pulled back by the arrowhead length.
    pub shaft_end: Point,
}

/// Route a connector between two rectangles along the line joining their
/// centres. See [`route_terminals`].
pub fn route_arrow(from: Rect, to: Rect, head_len: f64) -> ArrowRoute {
    route_terminals(Terminal::Rect(from), Terminal::Rect(to), head_len)
}

/// Route a connector between two terminals.
///
/// Rectangle terminals attach where the centre-to-centre segment crosses their
/// boundary. When the centres coincide or a crossing does not exist
/// (overlapping rectangles), both ends fall back to the centres, unshortened.
pub fn route_terminals(from: Terminal, to: Terminal, head_len: f64) -> ArrowRoute {
    let from_center = from.center();
    let to_center = to.center();
    let fallback = ArrowRoute {
        start: from_center,
        end: to_center,
        shaft_end: to_center,
    };

    if from_center.distance(to_center) < f64::EPSILON {
        return fallback;
    }

    match (from.attach(to_center), to.attach(from_center)) {
        (Some(start), Some(end)) => ArrowRoute {
            start,
            end,
            shaft_end: shorten_end(start, end, head_len),
        },
        _ => fallback,
    }
}

/// Is `p` on the boundary of `rect` (within `eps`)?
pub fn on_rect_boundary(p: Point, rect: Rect, eps: f64) -> bool {
    let within_x = p.x >= rect.x0 - eps && p.x <= rect.x1 + eps;
    let within_y = p.y >= rect.y0 - eps && p.y <= rect.y1 + eps;
    let on_vertical = (p.x - rect.x0).abs() <= eps || (p.x - rect.x1).abs() <= eps;
    let on_horizontal = (p.y - rect.y0).abs() <= eps || (p.y - rect.y1).abs() <= eps;
    within_x && within_y && (on_vertical || on_horizontal)
}
