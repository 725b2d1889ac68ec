// src/engine.rs
use log::{debug, info, warn};
use crate::config::PortSetting;
use crate::drivers::{
    decode, Bounds, DeviceLink, ExcitationController, ExcitationMode, SampleStore, SerialBackend,
    SystemSerial, TickError, Triplet, Variant, ViewState, ViewTransform,
};
use crate::types::*;

/// Read-only view of the core handed to the renderer once per redraw.
#[derive(Clone, Copy, Debug)]
pub struct PlotSnapshot<'a> {
    pub active: Option<&'a Triplet>,
    pub dimmed: Option<&'a Triplet>,
    pub bounds: Bounds,
    pub view: ViewState,
    pub mode: ExcitationMode,
    /// Variant of the most recent successful acquisition.
    pub last_variant: Option<Variant>,
    pub flags: DisplayFlags,
    pub connected: bool,
    pub port: Option<&'a str>,
    pub frame_count: u64,
    pub last_outcome: Option<TickOutcome>,
}

/// Application state: device link, stored sweeps, view, and display flags.
///
/// Everything runs on the caller's thread. [`CurveTracer::tick`] blocks for
/// at most the link's acquire timeout (0.5 s by default), which is the
/// worst-case stall of one acquisition tick.
pub struct CurveTracer<B: SerialBackend = SystemSerial> {
    link: DeviceLink<B>,
    excitation: ExcitationController,
    store: SampleStore,
    view: ViewTransform,
    flags: DisplayFlags,
    settings_open: bool,
    frame_count: u64,
    last_outcome: Option<TickOutcome>,
}

impl<B: SerialBackend> CurveTracer<B> {
    pub fn new(link: DeviceLink<B>) -> Self {
        Self {
            link,
            excitation: ExcitationController::default(),
            store: SampleStore::default(),
            view: ViewTransform::default(),
            flags: DisplayFlags::default(),
            settings_open: false,
            frame_count: 0,
            last_outcome: None,
        }
    }

    /// Connect to the configured port; if that fails, probe every port and
    /// remember the one that answers.
    pub fn connect(&mut self, settings: &mut impl PortSetting) -> LinkStatus {
        let configured = settings.serial_port();
        match self.link.connect(&configured) {
            Ok(()) => return LinkStatus::Connected(configured),
            Err(e) => warn!("connection failed: {e}"),
        }
        let Some(detected) = self.link.probe() else {
            warn!("no curve tracer found on any serial port");
            return LinkStatus::Disconnected;
        };
        if let Err(e) = self.link.connect(&detected) {
            warn!("auto-detected port {detected} refused to reopen: {e}");
            return LinkStatus::Disconnected;
        }
        info!("auto-connected to {detected}");
        if let Err(e) = settings.remember_serial_port(&detected) {
            warn!("could not persist detected port: {e:#}");
        }
        LinkStatus::AutoDetected(detected)
    }

    pub fn disconnect(&mut self) {
        self.link.disconnect();
    }

    /// One acquisition step. Failures leave the stored sweeps untouched; the
    /// next tick simply tries again.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = if self.settings_open {
            TickOutcome::Skipped(SkipReason::SettingsOpen)
        } else if self.flags.paused {
            TickOutcome::Skipped(SkipReason::Paused)
        } else if !self.link.is_connected() {
            TickOutcome::Skipped(SkipReason::Disconnected)
        } else {
            let variant = self.excitation.decide_command();
            match self.acquire(variant) {
                Ok(triplet) => {
                    self.store.record_result(variant, triplet);
                    self.frame_count += 1;
                    TickOutcome::Acquired(variant)
                }
                Err(e) => {
                    debug!("acquire {variant:?} failed: {e}");
                    TickOutcome::Failed(variant)
                }
            }
        };
        self.last_outcome = Some(outcome);
        outcome
    }

    fn acquire(&mut self, variant: Variant) -> Result<Triplet, TickError> {
        let raw = self.link.request_frame(variant)?;
        Ok(decode(raw.bytes())?)
    }

    pub fn apply(&mut self, action: UserAction) {
        let mode = self.excitation.mode();
        match action {
            UserAction::CycleMode => {
                let mode = self.excitation.cycle();
                info!("mode: {}", mode.label());
            }
            UserAction::TogglePause => self.flags.paused = !self.flags.paused,
            UserAction::ToggleSingleChannel => {
                self.flags.single_channel = !self.flags.single_channel
            }
            UserAction::ToggleAutoScale => self.flags.auto_scale = !self.flags.auto_scale,
            UserAction::OpenSettings => self.settings_open = true,
            UserAction::CloseSettings => self.settings_open = false,
            // 自动缩放时缩放/平移无效
            _ if self.flags.auto_scale => {}
            UserAction::FitToWindow => {
                let visible = self.store.visible_series(mode);
                self.view.fit_to_window(&visible);
            }
            UserAction::ResetView => {
                if self.store.active_series(mode).is_some() {
                    self.view.reset_view();
                }
            }
            UserAction::Zoom(steps) => self.view.zoom_steps(steps),
            UserAction::Pan {
                dx,
                dy,
                width,
                height,
            } => self.view.pan_by_pixels(dx, dy, width, height),
        }
    }

    pub fn settings_open(&self) -> bool {
        self.settings_open
    }

    pub fn snapshot(&self) -> PlotSnapshot<'_> {
        let mode = self.excitation.mode();
        let visible = self.store.visible_series(mode);
        PlotSnapshot {
            active: self.store.active_series(mode),
            dimmed: self.store.dimmed_series(mode),
            bounds: self.view.bounds(self.flags.auto_scale, &visible),
            view: self.view.state(),
            mode,
            last_variant: self.store.last_variant(),
            flags: self.flags,
            connected: self.link.is_connected(),
            port: self.link.port_name(),
            frame_count: self.frame_count,
            last_outcome: self.last_outcome,
        }
    }
}
