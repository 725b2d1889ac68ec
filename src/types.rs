// src/types.rs
use crate::drivers::Variant;

// 用户操作：输入层只能通过这些操作改变核心状态
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UserAction {
    CycleMode,
    TogglePause,
    ToggleSingleChannel,
    ToggleAutoScale,
    FitToWindow,
    ResetView,
    // 滚轮：正数放大，负数缩小
    Zoom(i32),
    // 拖拽：像素位移 + 绘图区尺寸
    Pan { dx: f32, dy: f32, width: f32, height: f32 },
    OpenSettings,
    CloseSettings,
}

// 显示开关
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayFlags {
    pub paused: bool,
    pub single_channel: bool,
    pub auto_scale: bool,
}

// 一次采集节拍的结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Acquired(Variant),
    Failed(Variant),
    Skipped(SkipReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Paused,
    SettingsOpen,
    Disconnected,
}

// 连接结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkStatus {
    Connected(String),
    AutoDetected(String),
    Disconnected,
}
