//! Pan/zoom model for the map group: a translate + uniform scale transform,
//! clamped to a scale range and to a translate extent in content space.

pub const DEFAULT_MIN_ZOOM: f64 = 1.0;
pub const DEFAULT_MAX_ZOOM: f64 = 8.0;
/// Per-axis pointer travel (px) before a press turns into a pan.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 50.0;
/// Wheel pixels per doubling of scale is `1 / WHEEL_SENSITIVITY`.
const WHEEL_SENSITIVITY: f64 = 0.002;
const LINE_DELTA_PX: f64 = 25.0;
const PAGE_DELTA_PX: f64 = 500.0;

/// Affine transform applied to the geography group: `screen = content * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn invert(&self, sx: f64, sy: f64) -> (f64, f64) {
        ((sx - self.x) / self.k, (sy - self.y) / self.k)
    }

    /// SVG `transform` attribute value for the geography group.
    pub fn to_svg(&self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

/// Axis-aligned rectangle in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub const UNBOUNDED: Self = Self {
        min_x: f64::NEG_INFINITY,
        min_y: f64::NEG_INFINITY,
        max_x: f64::INFINITY,
        max_y: f64::INFINITY,
    };

    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Self {
            min_x: min[0].min(max[0]),
            min_y: min[1].min(max[1]),
            max_x: min[0].max(max[0]),
            max_y: min[1].max(max[1]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub translate_extent: Extent,
    /// Size of the on-screen viewport the transform maps into.
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub drag_threshold: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            translate_extent: Extent::UNBOUNDED,
            viewport_width: 800.0,
            viewport_height: 600.0,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
        }
    }
}

impl ZoomConfig {
    fn clamp_scale(&self, k: f64) -> f64 {
        let (lo, hi) = if self.min_zoom <= self.max_zoom {
            (self.min_zoom, self.max_zoom)
        } else {
            (self.max_zoom, self.min_zoom)
        };
        if k.is_finite() { k.clamp(lo, hi) } else { lo }
    }

    /// Shift the transform so the viewport, seen in content space, stays
    /// inside the translate extent; centred on an axis where the extent is
    /// narrower than the viewport.
    fn constrain(&self, t: Transform) -> Transform {
        let k = self.clamp_scale(t.k);
        let t = Transform { k, ..t };
        let ext = &self.translate_extent;
        let (vx0, vy0) = t.invert(0.0, 0.0);
        let (vx1, vy1) = t.invert(self.viewport_width, self.viewport_height);
        let shift_x = axis_shift(vx0 - ext.min_x, vx1 - ext.max_x);
        let shift_y = axis_shift(vy0 - ext.min_y, vy1 - ext.max_y);
        Transform {
            x: t.x + k * shift_x,
            y: t.y + k * shift_y,
            k,
        }
    }
}

fn axis_shift(d0: f64, d1: f64) -> f64 {
    if d1 > d0 {
        return (d0 + d1) / 2.0;
    }
    let low = d0.min(0.0);
    if low != 0.0 { low } else { d1.max(0.0) }
}

/// Convert a wheel event's `deltaY` into pixels given its `deltaMode`
/// (0 = pixels, 1 = lines, 2 = pages).
pub fn normalize_wheel_delta(delta_y: f64, delta_mode: u32) -> f64 {
    match delta_mode {
        0 => delta_y,
        1 => delta_y * LINE_DELTA_PX,
        _ => delta_y * PAGE_DELTA_PX,
    }
}

/// What a completed press/release turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Released within the dead zone: treat as a click on whatever is under the pointer.
    Click,
    /// The press moved far enough to pan; must not select anything.
    Pan,
    /// Release without a matching press.
    None,
}

#[derive(Debug, Clone, Copy)]
struct DragGesture {
    start: (f64, f64),
    last: (f64, f64),
    origin: Transform,
    panning: bool,
}

/// Owns the map transform and turns pointer/wheel/pinch input into updates.
#[derive(Debug, Clone)]
pub struct PanZoom {
    config: ZoomConfig,
    transform: Transform,
    gesture: Option<DragGesture>,
    /// Viewport units per on-screen pixel; the drag threshold is in pixels.
    units_per_px: f64,
}

impl PanZoom {
    pub fn new(config: ZoomConfig) -> Self {
        let transform = config.constrain(Transform::IDENTITY);
        Self {
            config,
            transform,
            gesture: None,
            units_per_px: 1.0,
        }
    }

    /// Tell the controller how large the viewport is drawn on screen, so the
    /// drag threshold keeps its pixel size when the map is scaled down.
    pub fn set_units_per_px(&mut self, units_per_px: f64) {
        if units_per_px.is_finite() && units_per_px > 0.0 {
            self.units_per_px = units_per_px;
        }
    }

    fn drag_threshold(&self) -> f64 {
        self.config.drag_threshold * self.units_per_px
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn is_panning(&self) -> bool {
        self.gesture.is_some_and(|g| g.panning)
    }

    pub fn is_pressed(&self) -> bool {
        self.gesture.is_some()
    }

    /// Wheel zoom toward `(px, py)`; positive `delta` (scroll down) zooms out.
    pub fn zoom_at(&mut self, delta: f64, px: f64, py: f64) -> Transform {
        let factor = (-delta * WHEEL_SENSITIVITY).exp2();
        self.zoom_by(factor, px, py)
    }

    /// Multiply the scale by `factor`, keeping the screen point `(px, py)` fixed
    /// unless the result has to be clamped.
    pub fn zoom_by(&mut self, factor: f64, px: f64, py: f64) -> Transform {
        let t = self.transform;
        let k = self.config.clamp_scale(t.k * factor);
        let ratio = k / t.k;
        let next = Transform {
            x: px - (px - t.x) * ratio,
            y: py - (py - t.y) * ratio,
            k,
        };
        self.transform = self.config.constrain(next);
        if let Some(gesture) = self.gesture.as_mut() {
            gesture.origin = self.transform;
            gesture.start = gesture.last;
        }
        self.transform
    }

    pub fn pointer_down(&mut self, px: f64, py: f64) {
        self.gesture = Some(DragGesture {
            start: (px, py),
            last: (px, py),
            origin: self.transform,
            panning: false,
        });
    }

    /// Returns the new transform while panning, `None` while still inside the dead zone.
    pub fn pointer_move(&mut self, px: f64, py: f64) -> Option<Transform> {
        let threshold = self.drag_threshold();
        let gesture = self.gesture.as_mut()?;
        gesture.last = (px, py);
        let dx = px - gesture.start.0;
        let dy = py - gesture.start.1;
        if !gesture.panning && exceeds(dx, dy, threshold) {
            gesture.panning = true;
        }
        if !gesture.panning {
            return None;
        }
        let origin = gesture.origin;
        self.transform = self.config.constrain(Transform {
            x: origin.x + dx,
            y: origin.y + dy,
            k: origin.k,
        });
        Some(self.transform)
    }

    pub fn pointer_up(&mut self, px: f64, py: f64) -> GestureOutcome {
        let Some(gesture) = self.gesture.take() else {
            return GestureOutcome::None;
        };
        let dx = px - gesture.start.0;
        let dy = py - gesture.start.1;
        if gesture.panning || exceeds(dx, dy, self.drag_threshold()) {
            GestureOutcome::Pan
        } else {
            GestureOutcome::Click
        }
    }

    /// Pointer left or the browser cancelled the gesture; keep the current transform.
    pub fn pointer_cancel(&mut self) {
        self.gesture = None;
    }
}

fn exceeds(dx: f64, dy: f64, threshold: f64) -> bool {
    dx.abs() > threshold || dy.abs() > threshold
}
