// src/config.rs
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
pub const CONFIG_FILE: &str = "curvebug_config.json";
pub type Rgb = [u8; 3];
// 每个表都带 serde(default)：缺失的键取默认值，未知的键忽略，嵌套表逐字段合并。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub background: Rgb,
    pub dut1_trace: Rgb,
    pub dut2_trace: Rgb,
    pub dut1_dimmed: Rgb,
    pub dut2_dimmed: Rgb,
    pub grid_background: Rgb,
    pub grid: Rgb,
    pub crosshair: Rgb,
    pub label: Rgb,
    pub axis_title: Rgb,
    pub border: Rgb,
    pub dut_voltage: Rgb,
}
impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: [0, 0, 0],
            dut1_trace: [50, 150, 255],
            dut2_trace: [255, 50, 50],
            dut1_dimmed: [25, 75, 128],
            dut2_dimmed: [128, 25, 25],
            grid_background: [30, 30, 30],
            grid: [50, 50, 50],
            crosshair: [255, 255, 50],
            label: [200, 200, 200],
            axis_title: [255, 255, 255],
            border: [100, 100, 100],
            dut_voltage: [50, 255, 150],
        }
    }
}
impl ColorScheme {
    /// Editable entries as (display label, color), in settings-window order.
    pub fn entries_mut(&mut self) -> [(&'static str, &mut Rgb); 12] {
        [
            ("Background", &mut self.background),
            ("DUT1 Trace", &mut self.dut1_trace),
            ("DUT2 Trace", &mut self.dut2_trace),
            ("DUT1 Dimmed", &mut self.dut1_dimmed),
            ("DUT2 Dimmed", &mut self.dut2_dimmed),
            ("Grid Background", &mut self.grid_background),
            ("Grid Lines", &mut self.grid),
            ("Crosshair", &mut self.crosshair),
            ("Labels", &mut self.label),
            ("Axis Titles", &mut self.axis_title),
            ("Border", &mut self.border),
            ("DUT Voltage", &mut self.dut_voltage),
        ]
    }
}
/// Key names: a single letter, `space`, `escape`/`esc`, or `f1`..`f12`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBinds {
    pub quit: String,
    pub pause: String,
    pub single_channel: String,
    pub auto_scale: String,
    pub fit_window: String,
    pub reset_view: String,
    pub cycle_mode: String,
    pub settings: String,
}
impl Default for KeyBinds {
    fn default() -> Self {
        Self {
            quit: "q".into(),
            pause: "p".into(),
            single_channel: "s".into(),
            auto_scale: "a".into(),
            fit_window: "f".into(),
            reset_view: "r".into(),
            cycle_mode: "space".into(),
            settings: "f1".into(),
        }
    }
}
impl KeyBinds {
    pub fn entries(&self) -> [(&'static str, &str); 8] {
        [
            ("Quit", self.quit.as_str()),
            ("Pause", self.pause.as_str()),
            ("Single Channel", self.single_channel.as_str()),
            ("Auto Scale", self.auto_scale.as_str()),
            ("Fit to Window", self.fit_window.as_str()),
            ("Reset View", self.reset_view.as_str()),
            ("Cycle Mode", self.cycle_mode.as_str()),
            ("Settings", self.settings.as_str()),
        ]
    }
    pub fn entries_mut(&mut self) -> [(&'static str, &mut String); 8] {
        [
            ("Quit", &mut self.quit),
            ("Pause", &mut self.pause),
            ("Single Channel", &mut self.single_channel),
            ("Auto Scale", &mut self.auto_scale),
            ("Fit to Window", &mut self.fit_window),
            ("Reset View", &mut self.reset_view),
            ("Cycle Mode", &mut self.cycle_mode),
            ("Settings", &mut self.settings),
        ]
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub serial_port: String,
    pub window_width: u32,
    pub window_height: u32,
    pub colors: ColorScheme,
    pub keybinds: KeyBinds,
}
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            serial_port: "COM4".into(),
            window_width: 1080,
            window_height: 1080,
            colors: ColorScheme::default(),
            keybinds: KeyBinds::default(),
        }
    }
}
impl AppConfig {
    /// Overlay a saved document on top of the defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("config file is not valid JSON for this version")
    }
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&text)
    }
    /// A missing or unreadable file is not an error; defaults are used instead.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                info!("configuration loaded from {}", path.display());
                config
            }
            Err(e) => {
                warn!("error loading config: {e:#}, using defaults");
                Self::default()
            }
        }
    }
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        info!("configuration saved to {}", path.display());
        Ok(())
    }
}
/// The one config field the acquisition core reads and writes back.
pub trait PortSetting {
    fn serial_port(&self) -> String;
    /// Persist a port found by auto-detection.
    fn remember_serial_port(&mut self, port: &str) -> Result<()>;
}
/// Configuration bound to the file it was loaded from.
#[derive(Debug)]
pub struct ConfigFile {
    path: PathBuf,
    pub config: AppConfig,
}
impl ConfigFile {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = AppConfig::load_or_default(&path);
        Self { path, config }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn save(&self) -> Result<()> {
        self.config.save(&self.path)
    }
}
impl PortSetting for ConfigFile {
    fn serial_port(&self) -> String {
        self.config.serial_port.clone()
    }
    fn remember_serial_port(&mut self, port: &str) -> Result<()> {
        self.config.serial_port = port.to_owned();
        self.save()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("curvebug-{}-{name}.json", std::process::id()))
    }
    #[test]
    fn partial_document_merges_into_defaults() {
        let cfg = AppConfig::from_json(
            r#"{
                "serial_port": "/dev/ttyACM0",
                "colors": { "grid": [1, 2, 3] },
                "keybinds": { "pause": "x" },
                "theme": "ignored"
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.serial_port, "/dev/ttyACM0");
        assert_eq!(cfg.window_width, 1080);
        assert_eq!(cfg.colors.grid, [1, 2, 3]);
        assert_eq!(cfg.colors.dut1_trace, ColorScheme::default().dut1_trace);
        assert_eq!(cfg.keybinds.pause, "x");
        assert_eq!(cfg.keybinds.cycle_mode, "space");
    }
    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = scratch("malformed");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppConfig::load_or_default(&path), AppConfig::default());
        fs::write(&path, r#"{"window_width": "wide"}"#).unwrap();
        assert_eq!(AppConfig::load_or_default(&path), AppConfig::default());
        fs::remove_file(&path).ok();
        assert_eq!(AppConfig::load_or_default(&path), AppConfig::default());
    }
    #[test]
    fn edited_entries_write_through() {
        let mut colors = ColorScheme::default();
        for (_, rgb) in colors.entries_mut() {
            *rgb = [9, 9, 9];
        }
        assert_eq!(colors.crosshair, [9, 9, 9]);
        assert_eq!(colors.dut_voltage, [9, 9, 9]);
        let mut binds = KeyBinds::default();
        if let Some((_, key)) = binds.entries_mut().into_iter().find(|(l, _)| *l == "Pause") {
            *key = "x".into();
        }
        assert_eq!(binds.pause, "x");
        assert_eq!(binds.entries()[1], ("Pause", "x"));
    }
    #[test]
    fn remembered_port_survives_reload() {
        let path = scratch("port");
        let mut file = ConfigFile::open(&path);
        file.config.window_height = 720;
        file.remember_serial_port("COM9").unwrap();
        let reloaded = ConfigFile::open(&path);
        assert_eq!(reloaded.serial_port(), "COM9");
        assert_eq!(reloaded.config.window_height, 720);
        fs::remove_file(&path).ok();
    }
}
