// src/visualizer.rs
use crate::config::{ColorScheme, Rgb};
use crate::drivers::{Bounds, Channel, ExcitationMode, Triplet, Variant, Viewport, ADC_ORIGIN};
use crate::engine::PlotSnapshot;
use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Rounding, Shape, Stroke, Vec2};

const MARGIN_LEFT: f32 = 110.0;
const MARGIN_RIGHT: f32 = 30.0;
const MARGIN_TOP: f32 = 50.0;
const MARGIN_BOTTOM: f32 = 80.0;
const GRID_DIVISIONS: usize = 10;

fn rgb(c: Rgb) -> Color32 {
    Color32::from_rgb(c[0], c[1], c[2])
}

/// Resolved colors for one redraw.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub background: Color32,
    pub dut1: Color32,
    pub dut2: Color32,
    pub dut1_dimmed: Color32,
    pub dut2_dimmed: Color32,
    pub grid_background: Color32,
    pub grid: Color32,
    pub crosshair: Color32,
    pub label: Color32,
    pub axis_title: Color32,
    pub border: Color32,
    pub dut_voltage: Color32,
}

impl From<&ColorScheme> for Palette {
    fn from(c: &ColorScheme) -> Self {
        Self {
            background: rgb(c.background),
            dut1: rgb(c.dut1_trace),
            dut2: rgb(c.dut2_trace),
            dut1_dimmed: rgb(c.dut1_dimmed),
            dut2_dimmed: rgb(c.dut2_dimmed),
            grid_background: rgb(c.grid_background),
            grid: rgb(c.grid),
            crosshair: rgb(c.crosshair),
            label: rgb(c.label),
            axis_title: rgb(c.axis_title),
            border: rgb(c.border),
            dut_voltage: rgb(c.dut_voltage),
        }
    }
}

/// Inner plotting rectangle for the space the painter was given.
pub fn plot_rect(outer: Rect) -> Rect {
    Rect::from_min_max(
        outer.min + Vec2::new(MARGIN_LEFT, MARGIN_TOP),
        outer.max - Vec2::new(MARGIN_RIGHT, MARGIN_BOTTOM),
    )
}

fn viewport(rect: Rect) -> Viewport {
    Viewport {
        left: rect.left(),
        top: rect.top(),
        width: rect.width(),
        height: rect.height(),
    }
}

fn to_pos(bounds: &Bounds, point: (f64, f64), rect: Rect) -> Pos2 {
    let (x, y) = bounds.map_to_screen(point, viewport(rect));
    Pos2::new(x, y)
}

/// Mode label for the status line; alternating shows which variant is bright.
pub fn mode_caption(mode: ExcitationMode, last: Option<Variant>) -> String {
    match (mode, last) {
        (ExcitationMode::Alternating, Some(Variant::Weak)) => "ALT[W-bright T-dim]".to_owned(),
        (ExcitationMode::Alternating, Some(Variant::Strong)) => "ALT[T-bright W-dim]".to_owned(),
        (mode, _) => mode.label().to_owned(),
    }
}

// 通道统计：最小值、最大值、均值、点数
pub fn channel_summary(label: &str, currents: &[i32]) -> Option<String> {
    let min = currents.iter().min()?;
    let max = currents.iter().max()?;
    let mean = currents.iter().map(|v| *v as i64).sum::<i64>() / currents.len() as i64;
    Some(format!(
        "{label}: {min}-{max}  Mean: {mean}  Pts: {}",
        currents.len()
    ))
}

/// Paint the I-V plot into `outer`.
pub fn draw_plot(painter: &egui::Painter, outer: Rect, snap: &PlotSnapshot<'_>, palette: &Palette) {
    painter.rect_filled(outer, Rounding::same(0.0), palette.background);
    let rect = plot_rect(outer);
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return;
    }
    painter.rect_filled(rect, Rounding::same(0.0), palette.grid_background);

    // 标题
    let title = if snap.flags.auto_scale {
        "I-V Characteristics - Dual DUT Comparison [AUTO-SCALE]".to_owned()
    } else {
        format!(
            "I-V Characteristics - Dual DUT Comparison [FIXED] Zoom:{:.2}x",
            snap.view.zoom_level
        )
    };
    painter.text(
        Pos2::new(rect.center().x, rect.top() - 25.0),
        Align2::CENTER_CENTER,
        title,
        FontId::proportional(16.0),
        palette.axis_title,
    );

    let Some(active) = snap.active.filter(|t| !t.is_empty()) else {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "No Data",
            FontId::proportional(16.0),
            Color32::WHITE,
        );
        draw_border(painter, rect, palette);
        return;
    };

    draw_grid(painter, rect, palette);
    draw_crosshairs(painter, rect, &snap.bounds, palette);

    let single = snap.flags.single_channel;
    if let Some(dimmed) = snap.dimmed {
        draw_sweep(painter, rect, &snap.bounds, dimmed, single, palette.dut1_dimmed, palette.dut2_dimmed);
    }
    draw_sweep(painter, rect, &snap.bounds, active, single, palette.dut1, palette.dut2);

    draw_axis_labels(painter, rect, &snap.bounds, palette);
    draw_legend(painter, rect, single, palette);
    draw_border(painter, rect, palette);

    if snap.flags.paused {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "PAUSED",
            FontId::proportional(48.0),
            Color32::YELLOW,
        );
    }
}

fn draw_grid(painter: &egui::Painter, rect: Rect, palette: &Palette) {
    let stroke = Stroke::new(1.0, palette.grid);
    for i in 0..=GRID_DIVISIONS {
        let f = i as f32 / GRID_DIVISIONS as f32;
        let x = rect.left() + f * rect.width();
        let y = rect.top() + f * rect.height();
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
    }
}

fn draw_crosshairs(painter: &egui::Painter, rect: Rect, bounds: &Bounds, palette: &Palette) {
    let stroke = Stroke::new(2.0, palette.crosshair);
    let (nx, ny) = bounds.normalize(ADC_ORIGIN, 0.0);
    if (0.0..=1.0).contains(&nx) {
        let x = to_pos(bounds, (ADC_ORIGIN, 0.0), rect).x;
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
    }
    if (0.0..=1.0).contains(&ny) {
        let y = to_pos(bounds, (ADC_ORIGIN, 0.0), rect).y;
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
    }
}

fn draw_sweep(
    painter: &egui::Painter,
    rect: Rect,
    bounds: &Bounds,
    sweep: &Triplet,
    single_channel: bool,
    ch1: Color32,
    ch2: Color32,
) {
    draw_trace(painter, rect, bounds, sweep, Channel::Ch1, ch1);
    if !single_channel {
        draw_trace(painter, rect, bounds, sweep, Channel::Ch2, ch2);
    }
}

fn draw_trace(
    painter: &egui::Painter,
    rect: Rect,
    bounds: &Bounds,
    sweep: &Triplet,
    channel: Channel,
    color: Color32,
) {
    if sweep.len() < 2 {
        return;
    }
    let points: Vec<Pos2> = sweep
        .points(channel)
        .map(|p| to_pos(bounds, p, rect))
        .collect();
    // 裁剪到绘图区，平移/缩放后曲线可能越界
    painter
        .with_clip_rect(rect)
        .add(Shape::line(points, Stroke::new(1.5, color)));
}

fn draw_axis_labels(painter: &egui::Painter, rect: Rect, bounds: &Bounds, palette: &Palette) {
    let labels = bounds.axis_labels();
    let font = FontId::proportional(12.0);
    for (frac, value) in labels.x {
        painter.text(
            Pos2::new(rect.left() + frac * rect.width(), rect.bottom() + 20.0),
            Align2::CENTER_CENTER,
            format!("{}", value as i64),
            font.clone(),
            palette.label,
        );
    }
    for (frac, value) in labels.y {
        painter.text(
            Pos2::new(rect.left() - 20.0, rect.bottom() - frac * rect.height()),
            Align2::RIGHT_CENTER,
            format!("{}", value as i64),
            font.clone(),
            palette.label,
        );
    }
    painter.text(
        Pos2::new(rect.center().x, rect.bottom() + 50.0),
        Align2::CENTER_CENTER,
        "DUT Voltage",
        FontId::proportional(16.0),
        palette.dut_voltage,
    );
    painter.text(
        Pos2::new(rect.left() - 80.0, rect.center().y),
        Align2::CENTER_CENTER,
        "Current",
        FontId::proportional(16.0),
        palette.axis_title,
    );
}

fn draw_legend(painter: &egui::Painter, rect: Rect, single_channel: bool, palette: &Palette) {
    let origin = rect.left_top() + Vec2::new(20.0, 30.0);
    let mut entries = vec![("DUT1 (CH1 - Black Lead)", palette.dut1)];
    if !single_channel {
        entries.push(("DUT2 (CH2 - Red Lead)", palette.dut2));
    }
    for (i, (text, color)) in entries.into_iter().enumerate() {
        let y = origin.y + i as f32 * 30.0;
        painter.line_segment(
            [Pos2::new(origin.x, y), Pos2::new(origin.x + 40.0, y)],
            Stroke::new(4.0, color),
        );
        painter.text(
            Pos2::new(origin.x + 50.0, y),
            Align2::LEFT_CENTER,
            text,
            FontId::proportional(12.0),
            color,
        );
    }
}

fn draw_border(painter: &egui::Painter, rect: Rect, palette: &Palette) {
    painter.rect_stroke(rect, Rounding::same(0.0), Stroke::new(2.0, palette.border));
}
