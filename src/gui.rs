// src/gui.rs
use eframe::egui;
use egui::{Color32, Key, RichText, Sense};
use log::{info, warn};
use std::time::{Duration, Instant};
use crate::config::{ColorScheme, ConfigFile, KeyBinds};
use crate::drivers::{DeviceLink, SerialBackend, SystemSerial};
use crate::engine::CurveTracer;
use crate::types::*;
use crate::visualizer::{self, Palette};

// 20 Hz 采集节拍
const TICK_PERIOD: Duration = Duration::from_millis(50);

/// Resolve a configured key name. Accepts single letters, `space`,
/// `escape`/`esc` and `f1`..`f12`, case-insensitively.
pub fn parse_key(name: &str) -> Option<Key> {
    let name = name.trim().to_ascii_lowercase();
    let key = match name.as_str() {
        "space" => Key::Space,
        "escape" | "esc" => Key::Escape,
        "a" => Key::A,
        "b" => Key::B,
        "c" => Key::C,
        "d" => Key::D,
        "e" => Key::E,
        "f" => Key::F,
        "g" => Key::G,
        "h" => Key::H,
        "i" => Key::I,
        "j" => Key::J,
        "k" => Key::K,
        "l" => Key::L,
        "m" => Key::M,
        "n" => Key::N,
        "o" => Key::O,
        "p" => Key::P,
        "q" => Key::Q,
        "r" => Key::R,
        "s" => Key::S,
        "t" => Key::T,
        "u" => Key::U,
        "v" => Key::V,
        "w" => Key::W,
        "x" => Key::X,
        "y" => Key::Y,
        "z" => Key::Z,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        _ => return None,
    };
    Some(key)
}

/// What a key press asks the app to do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KeyCommand {
    Quit,
    ToggleSettings,
    Core(UserAction),
}

/// Key table built from the configured names. Unknown names are logged and skipped.
pub fn key_table(binds: &KeyBinds) -> Vec<(Key, KeyCommand)> {
    let named = [
        (&binds.quit, KeyCommand::Quit),
        (&binds.pause, KeyCommand::Core(UserAction::TogglePause)),
        (&binds.single_channel, KeyCommand::Core(UserAction::ToggleSingleChannel)),
        (&binds.auto_scale, KeyCommand::Core(UserAction::ToggleAutoScale)),
        (&binds.fit_window, KeyCommand::Core(UserAction::FitToWindow)),
        (&binds.reset_view, KeyCommand::Core(UserAction::ResetView)),
        (&binds.cycle_mode, KeyCommand::Core(UserAction::CycleMode)),
        (&binds.settings, KeyCommand::ToggleSettings),
    ];
    let mut table: Vec<(Key, KeyCommand)> = named
        .into_iter()
        .filter_map(|(name, cmd)| match parse_key(name) {
            Some(key) => Some((key, cmd)),
            None => {
                warn!("unknown key name {name:?} in keybinds, ignored");
                None
            }
        })
        .collect();
    if !table.iter().any(|(k, _)| *k == Key::Escape) {
        table.push((Key::Escape, KeyCommand::Quit));
    }
    table
}

/// Labels of the bindings whose key name does not parse.
pub fn unknown_keybinds(binds: &KeyBinds) -> Vec<&'static str> {
    binds
        .entries()
        .into_iter()
        .filter(|(_, name)| parse_key(name).is_none())
        .map(|(label, _)| label)
        .collect()
}

pub fn controls_hint(binds: &KeyBinds) -> String {
    let k = |name: &str| name.trim().to_uppercase();
    format!(
        "{}=mode {}=pause {}=single {}=auto {}=fit {}=reset {}=settings {}=quit | Drag=pan Wheel=zoom",
        k(&binds.cycle_mode),
        k(&binds.pause),
        k(&binds.single_channel),
        k(&binds.auto_scale),
        k(&binds.fit_window),
        k(&binds.reset_view),
        k(&binds.settings),
        k(&binds.quit),
    )
}

// 设置窗口的编辑草稿
struct SettingsDraft {
    serial_port: String,
    window_width: u32,
    window_height: u32,
    colors: ColorScheme,
    keybinds: KeyBinds,
    available_ports: Vec<String>,
}

pub struct CurveTracerApp {
    tracer: CurveTracer<SystemSerial>,
    config: ConfigFile,
    palette: Palette,
    keys: Vec<(Key, KeyCommand)>,
    last_tick: Instant,
    status: LinkStatus,
    settings: Option<SettingsDraft>,
}

impl CurveTracerApp {
    pub fn new(mut config: ConfigFile) -> Self {
        let mut tracer = CurveTracer::new(DeviceLink::system());
        let status = tracer.connect(&mut config);
        Self::with_tracer(tracer, config, status)
    }

    fn with_tracer(tracer: CurveTracer<SystemSerial>, config: ConfigFile, status: LinkStatus) -> Self {
        Self {
            palette: Palette::from(&config.config.colors),
            keys: key_table(&config.config.keybinds),
            tracer,
            config,
            last_tick: Instant::now(),
            status,
            settings: None,
        }
    }

    fn open_settings(&mut self) {
        let available_ports = SystemSerial.available_ports().unwrap_or_else(|e| {
            warn!("could not list serial ports: {e}");
            Vec::new()
        });
        self.settings = Some(SettingsDraft {
            serial_port: self.config.config.serial_port.clone(),
            window_width: self.config.config.window_width,
            window_height: self.config.config.window_height,
            colors: self.config.config.colors.clone(),
            keybinds: self.config.config.keybinds.clone(),
            available_ports,
        });
        self.tracer.apply(UserAction::OpenSettings);
    }

    fn close_settings(&mut self) {
        self.settings = None;
        self.tracer.apply(UserAction::CloseSettings);
    }

    /// Commit the draft to the config file and rebuild colors and key table.
    /// Returns whether the window size changed.
    fn apply_draft(&mut self, draft: &SettingsDraft) -> bool {
        let cfg = &mut self.config.config;
        let resized = cfg.window_width != draft.window_width || cfg.window_height != draft.window_height;
        cfg.serial_port = draft.serial_port.trim().to_owned();
        cfg.window_width = draft.window_width;
        cfg.window_height = draft.window_height;
        cfg.colors = draft.colors.clone();
        cfg.keybinds = draft.keybinds.clone();
        self.palette = Palette::from(&self.config.config.colors);
        self.keys = key_table(&self.config.config.keybinds);
        if let Err(e) = self.config.save() {
            warn!("could not save settings: {e:#}");
        }
        resized
    }

    fn save_and_reconnect(&mut self, ctx: &egui::Context, draft: SettingsDraft) {
        if self.apply_draft(&draft) {
            ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(
                draft.window_width as f32,
                draft.window_height as f32,
            )));
        }
        self.tracer.disconnect();
        self.status = self.tracer.connect(&mut self.config);
        info!("reconnect: {:?}", self.status);
        self.close_settings();
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        // 设置窗口打开时只有 Escape 生效（关闭窗口），其余按键留给输入框
        if self.settings.is_some() {
            if ctx.input(|i| i.key_pressed(Key::Escape)) {
                self.close_settings();
            }
            return;
        }
        let pressed: Vec<KeyCommand> = ctx.input(|i| {
            self.keys
                .iter()
                .filter(|(key, _)| i.key_pressed(*key))
                .map(|(_, cmd)| *cmd)
                .collect()
        });
        for cmd in pressed {
            match cmd {
                KeyCommand::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
                KeyCommand::ToggleSettings => {
                    self.open_settings();
                    break;
                }
                KeyCommand::Core(action) => self.tracer.apply(action),
            }
        }
    }

    fn settings_window(&mut self, ctx: &egui::Context) {
        let Some(mut draft) = self.settings.take() else {
            return;
        };
        let mut open = true;
        let mut save = false;
        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Serial port");
                ui.text_edit_singleline(&mut draft.serial_port);
                if !draft.available_ports.is_empty() {
                    ui.horizontal_wrapped(|ui| {
                        for port in &draft.available_ports {
                            if ui.small_button(port).clicked() {
                                draft.serial_port = port.clone();
                            }
                        }
                    });
                }
                ui.separator();
                ui.horizontal(|ui| {
                    ui.label("Window");
                    ui.add(egui::DragValue::new(&mut draft.window_width).clamp_range(400..=4000));
                    ui.label("x");
                    ui.add(egui::DragValue::new(&mut draft.window_height).clamp_range(300..=4000));
                });
                ui.separator();
                egui::CollapsingHeader::new("Color customization").show(ui, |ui| {
                    egui::Grid::new("settings_colors").num_columns(2).show(ui, |ui| {
                        for (label, rgb) in draft.colors.entries_mut() {
                            ui.label(label);
                            ui.color_edit_button_srgb(rgb);
                            ui.end_row();
                        }
                    });
                });
                egui::CollapsingHeader::new("Keybind configuration").show(ui, |ui| {
                    egui::Grid::new("settings_keys").num_columns(3).show(ui, |ui| {
                        for (label, name) in draft.keybinds.entries_mut() {
                            ui.label(label);
                            ui.add(egui::TextEdit::singleline(&mut *name).desired_width(80.0));
                            if parse_key(name.as_str()).is_some() {
                                ui.label("");
                            } else {
                                ui.colored_label(Color32::RED, "unknown key");
                            }
                            ui.end_row();
                        }
                    });
                });
                ui.separator();
                let valid = unknown_keybinds(&draft.keybinds).is_empty();
                if ui
                    .add_enabled(valid, egui::Button::new("Save & Reconnect"))
                    .clicked()
                {
                    save = true;
                }
            });
        if save {
            self.save_and_reconnect(ctx, draft);
        } else if open {
            self.settings = Some(draft);
        } else {
            self.close_settings();
        }
    }

    fn status_text(&self) -> String {
        let snap = self.tracer.snapshot();
        let mut text = format!(
            "Frame: {} | Mode: {}",
            snap.frame_count,
            visualizer::mode_caption(snap.mode, snap.last_variant)
        );
        if snap.flags.paused {
            text.push_str(" [PAUSED]");
        }
        if snap.flags.single_channel {
            text.push_str(" [SINGLE]");
        }
        if self.tracer.settings_open() {
            text.push_str(" [SETTINGS]");
        }
        text.push_str(if snap.flags.auto_scale { " [AUTO]" } else { " [FIXED]" });
        match snap.port {
            Some(port) if snap.connected => text.push_str(&format!(" | {port}")),
            _ => text.push_str(" | disconnected"),
        }
        if let Some(TickOutcome::Failed(variant)) = snap.last_outcome {
            text.push_str(&format!(" | last {variant:?} read failed"));
        }
        text
    }
}

impl eframe::App for CurveTracerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 1. 键盘
        self.handle_keys(ctx);

        // 2. 采集
        if self.last_tick.elapsed() >= TICK_PERIOD {
            self.last_tick = Instant::now();
            self.tracer.tick();
        }

        // 3. 绘制
        egui::TopBottomPanel::top("status").show(ctx, |ui| {
            ui.label(RichText::new(self.status_text()).color(Color32::from_rgb(200, 200, 200)));
            ui.label(
                RichText::new(controls_hint(&self.config.config.keybinds))
                .small()
                .color(Color32::from_rgb(150, 150, 150)),
            );
        });

        egui::TopBottomPanel::bottom("channels").show(ctx, |ui| {
            let snap = self.tracer.snapshot();
            if let Some(active) = snap.active {
                if let Some(line) = visualizer::channel_summary("CH1", &active.ch1_current) {
                    ui.label(RichText::new(line).color(self.palette.dut1));
                }
                if let Some(line) = visualizer::channel_summary("CH2", &active.ch2_current) {
                    ui.label(RichText::new(line).color(self.palette.dut2));
                }
            }
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(self.palette.background))
            .show(ctx, |ui| {
                let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::drag());
                let plot = visualizer::plot_rect(response.rect);

                if self.settings.is_none() {
                    let drag = response.drag_delta();
                    if drag != egui::Vec2::ZERO {
                        self.tracer.apply(UserAction::Pan {
                            dx: drag.x,
                            dy: drag.y,
                            width: plot.width(),
                            height: plot.height(),
                        });
                    }
                    if response.hovered() {
                        let scroll = ui.input(|i| i.scroll_delta.y);
                        if scroll > 0.0 {
                            self.tracer.apply(UserAction::Zoom(1));
                        } else if scroll < 0.0 {
                            self.tracer.apply(UserAction::Zoom(-1));
                        }
                    }
                }

                let snap = self.tracer.snapshot();
                visualizer::draw_plot(&painter, response.rect, &snap, &self.palette);
            });

        self.settings_window(ctx);

        ctx.request_repaint_after(TICK_PERIOD);
    }
}
