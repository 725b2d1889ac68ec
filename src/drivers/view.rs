//! Data-space to screen-space mapping for the I-V plot.
//!
//! X is a channel's sense voltage and Y its current, both in ADC counts.
//! Two scaling policies exist:
//! - fixed: native device window divided by the zoom level and shifted by the pan offset;
//! - auto: the window hugs the visible data with a 10 % margin.
//!
//! On screen the X axis is mirrored (larger voltage further left) to match the
//! probe polarity printed on the tracer, and Y grows upward.
use crate::drivers::codec::{Channel, Triplet};
/// Upper rail of the sense ADC as wired on the tracer.
pub const ADC_MAX: f64 = 2800.0;
/// Drive voltage at which the DUT sees zero volts.
pub const ADC_ORIGIN: f64 = 2048.0;
const FIXED_Y_RANGE: f64 = ADC_MAX - 700.0;
const AUTO_PAD_FRACTION: f64 = 0.1;
const AUTO_FALLBACK_PAD: f64 = 100.0;
const FIT_PAD_FRACTION: f64 = 0.2;
pub const ZOOM_STEP: f64 = 1.2;
pub const MIN_ZOOM: f64 = 0.1;
/// Screen rectangle the plot is drawn into, top-left origin, Y down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}
/// Visible data window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}
impl Bounds {
    /// The fixed window at zoom 1 without pan: full ADC range on X, and a
    /// current window weighted 7:1 toward negative values.
    pub fn native() -> Self {
        Self {
            x_min: 0.0,
            x_max: ADC_MAX,
            y_min: -FIXED_Y_RANGE * 7.0 / 8.0,
            y_max: FIXED_Y_RANGE / 8.0,
        }
    }
    pub fn x_span(&self) -> f64 {
        self.x_max - self.x_min
    }
    pub fn y_span(&self) -> f64 {
        self.y_max - self.y_min
    }
    fn center(&self) -> (f64, f64) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }
    /// Position inside the window as fractions; a zero-width axis yields 0.5.
    pub fn normalize(&self, x: f64, y: f64) -> (f64, f64) {
        let nx = if self.x_max != self.x_min {
            (x - self.x_min) / self.x_span()
        } else {
            0.5
        };
        let ny = if self.y_max != self.y_min {
            (y - self.y_min) / self.y_span()
        } else {
            0.5
        };
        (nx, ny)
    }
    pub fn map_to_screen(&self, point: (f64, f64), viewport: Viewport) -> (f32, f32) {
        let (nx, ny) = self.normalize(point.0, point.1);
        let px = viewport.left + viewport.width - (nx as f32 * viewport.width);
        let py = viewport.top + viewport.height - (ny as f32 * viewport.height);
        (px, py)
    }
    /// Axis annotations at 0 %, 50 % and 100 % of the plot, as
    /// (screen fraction from left/bottom, data value).
    pub fn axis_labels(&self) -> AxisLabels {
        let at = |i: f64| i / 10.0;
        let x = [0.0, 5.0, 10.0].map(|i| (at(i) as f32, self.x_min + self.x_span() * (10.0 - i) / 10.0));
        let y = [0.0, 5.0, 10.0].map(|i| (at(i) as f32, self.y_min + self.y_span() * i / 10.0));
        AxisLabels { x, y }
    }
}
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisLabels {
    pub x: [(f32, f64); 3],
    pub y: [(f32, f64); 3],
}
/// Zoom and pan of the fixed-scale view. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    pub zoom_level: f64,
    pub pan_offset_x: f64,
    pub pan_offset_y: f64,
}
impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom_level: 1.0,
            pan_offset_x: 0.0,
            pan_offset_y: 0.0,
        }
    }
}
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
    state: ViewState,
}
impl ViewTransform {
    pub fn state(&self) -> ViewState {
        self.state
    }
    pub fn fixed_bounds(&self) -> Bounds {
        let base = Bounds::native();
        let (cx, cy) = base.center();
        let cx = cx + self.state.pan_offset_x;
        let cy = cy + self.state.pan_offset_y;
        let half_x = base.x_span() / self.state.zoom_level / 2.0;
        let half_y = base.y_span() / self.state.zoom_level / 2.0;
        Bounds {
            x_min: cx - half_x,
            x_max: cx + half_x,
            y_min: cy - half_y,
            y_max: cy + half_y,
        }
    }
    /// Window in effect for this redraw. Auto-scale without data falls back to the fixed window.
    pub fn bounds(&self, auto_scale: bool, visible: &[&Triplet]) -> Bounds {
        if auto_scale {
            if let Some(bounds) = auto_bounds(visible) {
                return bounds;
            }
        }
        self.fixed_bounds()
    }
    /// One-shot zoom/pan so every visible point, plus a 20 % margin, fits the
    /// fixed window. Never zooms in past native scale. Returns false when
    /// there is nothing to fit.
    pub fn fit_to_window(&mut self, visible: &[&Triplet]) -> bool {
        let Some(data) = extent(visible) else {
            return false;
        };
        let x_pad = data.x_span() * FIT_PAD_FRACTION;
        let y_pad = data.y_span() * FIT_PAD_FRACTION;
        let padded = Bounds {
            x_min: data.x_min - x_pad,
            x_max: data.x_max + x_pad,
            y_min: data.y_min - y_pad,
            y_max: data.y_max + y_pad,
        };
        let base = Bounds::native();
        let zoom_x = if padded.x_span() > 0.0 {
            base.x_span() / padded.x_span()
        } else {
            1.0
        };
        let zoom_y = if padded.y_span() > 0.0 {
            base.y_span() / padded.y_span()
        } else {
            1.0
        };
        let (data_cx, data_cy) = padded.center();
        let (base_cx, base_cy) = base.center();
        self.state = ViewState {
            zoom_level: zoom_x.min(zoom_y).clamp(MIN_ZOOM, 1.0),
            pan_offset_x: data_cx - base_cx,
            pan_offset_y: data_cy - base_cy,
        };
        true
    }
    pub fn reset_view(&mut self) {
        self.state = ViewState::default();
    }
    /// Scroll zoom: ×1.2 per step in, ÷1.2 per step out, floored at 0.1.
    pub fn zoom_steps(&mut self, steps: i32) {
        let factor = ZOOM_STEP.powi(steps);
        self.state.zoom_level = (self.state.zoom_level * factor).max(MIN_ZOOM);
    }
    /// Pan by a screen-space drag so the curve follows the pointer.
    pub fn pan_by_pixels(&mut self, dx: f32, dy: f32, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let base = Bounds::native();
        let x_visible = base.x_span() / self.state.zoom_level;
        let y_visible = base.y_span() / self.state.zoom_level;
        self.state.pan_offset_x += dx as f64 * x_visible / width as f64;
        self.state.pan_offset_y += dy as f64 * y_visible / height as f64;
    }
}
/// Auto-scale window: data extent padded by 10 % per axis, or by 100 counts
/// when an axis has no spread.
pub fn auto_bounds(visible: &[&Triplet]) -> Option<Bounds> {
    let data = extent(visible)?;
    let (x_min, x_max) = pad_axis(data.x_min, data.x_max);
    let (y_min, y_max) = pad_axis(data.y_min, data.y_max);
    Some(Bounds {
        x_min,
        x_max,
        y_min,
        y_max,
    })
}
fn pad_axis(min: f64, max: f64) -> (f64, f64) {
    let pad = if max > min {
        (max - min) * AUTO_PAD_FRACTION
    } else {
        AUTO_FALLBACK_PAD
    };
    (min - pad, max + pad)
}
/// Min/max over both channels of every visible sweep.
fn extent(visible: &[&Triplet]) -> Option<Bounds> {
    let mut points = visible
        .iter()
        .flat_map(|t| t.points(Channel::Ch1).chain(t.points(Channel::Ch2)));
    let (x0, y0) = points.next()?;
    let init = Bounds {
        x_min: x0,
        x_max: x0,
        y_min: y0,
        y_max: y0,
    };
    Some(points.fold(init, |b, (x, y)| Bounds {
        x_min: b.x_min.min(x),
        x_max: b.x_max.max(x),
        y_min: b.y_min.min(y),
        y_max: b.y_max.max(y),
    }))
}
#[cfg(test)]
mod tests {
    use super::*;
    const VIEWPORT: Viewport = Viewport {
        left: 100.0,
        top: 50.0,
        width: 400.0,
        height: 300.0,
    };
    fn flat(level: i32, n: usize) -> Triplet {
        Triplet::from_streams(vec![level; n], vec![level; n], vec![level; n])
    }
    /// Both channels sweep `raw` with the given currents.
    fn sweep(raw: &[i32], current: &[i32]) -> Triplet {
        let drive: Vec<i32> = raw.iter().zip(current).map(|(r, i)| r + i).collect();
        Triplet::from_streams(drive, raw.to_vec(), raw.to_vec())
    }
    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }
    #[test]
    fn native_window_matches_device_range() {
        let b = ViewTransform::default().fixed_bounds();
        assert_eq!(b, Bounds::native());
        assert_eq!(b.x_min, 0.0);
        assert_eq!(b.x_max, 2800.0);
        assert_eq!(b.y_max, 262.5);
        assert_eq!(b.y_min, -1837.5);
    }
    #[test]
    fn zoom_and_pan_shrink_and_shift_the_window() {
        let mut view = ViewTransform::default();
        view.zoom_steps(1);
        view.pan_by_pixels(0.0, 0.0, 10.0, 10.0);
        let b = view.fixed_bounds();
        assert!(close(b.x_span(), 2800.0 / 1.2));
        assert!(close(b.y_span(), 2100.0 / 1.2));
        assert!(close((b.x_min + b.x_max) / 2.0, 1400.0));
        view.reset_view();
        view.pan_by_pixels(28.0, 21.0, 280.0, 210.0);
        let b = view.fixed_bounds();
        assert!(close(view.state().pan_offset_x, 280.0));
        assert!(close(view.state().pan_offset_y, 210.0));
        assert!(close(b.x_min, 280.0));
        assert!(close(b.y_max, 472.5));
    }
    #[test]
    fn screen_mapping_mirrors_x_and_flips_y() {
        let b = Bounds::native();
        assert_eq!(b.map_to_screen((0.0, b.y_min), VIEWPORT), (500.0, 350.0));
        assert_eq!(b.map_to_screen((2800.0, b.y_max), VIEWPORT), (100.0, 50.0));
        let (px, _) = b.map_to_screen((700.0, 0.0), VIEWPORT);
        assert!((px - 400.0).abs() < 1e-3);
    }
    #[test]
    fn degenerate_axes_map_to_center() {
        let b = Bounds {
            x_min: 5.0,
            x_max: 5.0,
            y_min: -1.0,
            y_max: -1.0,
        };
        assert_eq!(b.normalize(123.0, 456.0), (0.5, 0.5));
        assert_eq!(b.map_to_screen((0.0, 0.0), VIEWPORT), (300.0, 200.0));
    }
    #[test]
    fn auto_scale_pads_by_a_tenth() {
        let t = sweep(&[1000, 2000], &[-300, 200]);
        let b = auto_bounds(&[&t]).unwrap();
        assert!(close(b.x_min, 900.0));
        assert!(close(b.x_max, 2100.0));
        assert!(close(b.y_min, -350.0));
        assert!(close(b.y_max, 250.0));
    }
    #[test]
    fn auto_scale_uses_fallback_padding_on_flat_data() {
        let t = sweep(&[40, 60], &[0, 0]);
        let b = auto_bounds(&[&t]).unwrap();
        assert!(close(b.y_min, -100.0));
        assert!(close(b.y_max, 100.0));
        assert!(close(b.x_min, 38.0));
        let all_same = flat(2048, 336);
        let b = auto_bounds(&[&all_same]).unwrap();
        assert_eq!((b.x_min, b.x_max), (1948.0, 2148.0));
        assert_eq!((b.y_min, b.y_max), (-100.0, 100.0));
    }
    #[test]
    fn auto_scale_ignores_zoom_and_covers_every_visible_sweep() {
        let a = sweep(&[100, 200], &[0, 10]);
        let b = sweep(&[300, 500], &[-50, 0]);
        let mut view = ViewTransform::default();
        view.zoom_steps(4);
        let bounds = view.bounds(true, &[&a, &b]);
        assert_eq!(bounds, auto_bounds(&[&a, &b]).unwrap());
        assert!(close(bounds.x_min, 60.0));
        assert!(close(bounds.x_max, 540.0));
        assert_eq!(view.bounds(true, &[]), view.fixed_bounds());
    }
    #[test]
    fn fit_caps_zoom_at_native_scale() {
        let t = sweep(&[1000, 2000], &[500, -500]);
        let mut view = ViewTransform::default();
        assert!(view.fit_to_window(&[&t]));
        let s = view.state();
        assert_eq!(s.zoom_level, 1.0);
        assert!(close(s.pan_offset_x, 100.0));
        assert!(close(s.pan_offset_y, 787.5));
    }
    #[test]
    fn fit_zooms_out_for_wide_data() {
        let t = sweep(&[0, 4000], &[0, 0]);
        let mut view = ViewTransform::default();
        view.fit_to_window(&[&t]);
        let s = view.state();
        assert!(close(s.zoom_level, 0.5));
        assert!(close(s.pan_offset_x, 600.0));
        assert!(close(s.pan_offset_y, 787.5));
        let b = view.fixed_bounds();
        assert!(close(b.x_min, -800.0));
        assert!(close(b.x_max, 4800.0));
    }
    #[test]
    fn fit_without_data_is_a_no_op() {
        let mut view = ViewTransform::default();
        view.zoom_steps(2);
        let before = view.state();
        assert!(!view.fit_to_window(&[]));
        assert_eq!(view.state(), before);
    }
    #[test]
    fn reset_after_fit_restores_native_view() {
        let t = sweep(&[12, 3999], &[-2000, 1500]);
        let mut view = ViewTransform::default();
        view.fit_to_window(&[&t]);
        view.pan_by_pixels(13.0, -7.0, 300.0, 200.0);
        view.reset_view();
        assert_eq!(view.state().zoom_level, 1.0);
        assert_eq!(view.state().pan_offset_x, 0.0);
        assert_eq!(view.state().pan_offset_y, 0.0);
    }
    #[test]
    fn zoom_out_is_floored() {
        let mut view = ViewTransform::default();
        view.zoom_steps(3);
        assert!(close(view.state().zoom_level, 1.728));
        for _ in 0..40 {
            view.zoom_steps(-1);
        }
        assert_eq!(view.state().zoom_level, MIN_ZOOM);
    }
    #[test]
    fn axis_labels_run_right_to_left_on_x() {
        let labels = Bounds::native().axis_labels();
        assert_eq!(labels.x[0], (0.0, 2800.0));
        assert_eq!(labels.x[1], (0.5, 1400.0));
        assert_eq!(labels.x[2], (1.0, 0.0));
        assert_eq!(labels.y[0], (0.0, -1837.5));
        assert_eq!(labels.y[2], (1.0, 262.5));
    }
}
