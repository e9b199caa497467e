use serde::{Deserialize, Serialize};

/// Maps between pixel x-coordinates and timeline seconds for one view
/// window, and carries the pan/zoom operations gestures drive.
///
/// Times are whole seconds; pixel positions are fractional. Conversions
/// from pixels round to the nearest second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    view_min: i64,
    view_max: i64,
    width_px: f64,
}

impl TimeScale {
    pub fn new(view_min: i64, view_max: i64, width_px: f64) -> Self {
        debug_assert!(view_min < view_max, "view window must be non-empty");
        debug_assert!(width_px > 0.0, "view width must be positive");
        Self { view_min, view_max, width_px }
    }

    pub fn view_min(&self) -> i64 {
        self.view_min
    }

    pub fn view_max(&self) -> i64 {
        self.view_max
    }

    pub fn width_px(&self) -> f64 {
        self.width_px
    }

    pub fn duration(&self) -> i64 {
        self.view_max - self.view_min
    }

    fn seconds_per_px(&self) -> f64 {
        self.duration() as f64 / self.width_px
    }

    /// The time under pixel `x`. Positions outside the window extrapolate.
    pub fn time_at(&self, x: f64) -> i64 {
        let dt = (x * self.seconds_per_px()).round() as i64;
        self.view_min + dt
    }

    /// The pixel position of time `t`.
    pub fn x_at(&self, t: i64) -> f64 {
        (t - self.view_min) as f64 / self.seconds_per_px()
    }

    /// A pixel span converted to a time span, rounded to whole seconds.
    pub fn span_of_px(&self, px: f64) -> i64 {
        (px * self.seconds_per_px()).round() as i64
    }

    pub fn set_width_px(&mut self, width_px: f64) {
        debug_assert!(width_px > 0.0, "view width must be positive");
        self.width_px = width_px;
    }

    /// Shift the view window by `dt` seconds.
    pub fn pan_by(&mut self, dt: i64) {
        self.view_min += dt;
        self.view_max += dt;
    }

    /// Shift the view window by a pixel delta (positive pans right).
    pub fn pan_px(&mut self, dx: f64) {
        self.pan_by(self.span_of_px(dx));
    }

    /// Zoom by `factor` (> 1 zooms in), keeping the time under pixel
    /// `anchor_x` at the same pixel. The window never collapses below one
    /// second.
    pub fn zoom_about_px(&mut self, anchor_x: f64, factor: f64) {
        debug_assert!(factor > 0.0, "zoom factor must be positive");
        let anchor_t = self.time_at(anchor_x);
        let new_duration = ((self.duration() as f64 / factor).round() as i64).max(1);
        let frac = (anchor_x / self.width_px).clamp(0.0, 1.0);
        let new_min = anchor_t - (frac * new_duration as f64).round() as i64;
        self.view_min = new_min;
        self.view_max = new_min + new_duration;
    }
}
