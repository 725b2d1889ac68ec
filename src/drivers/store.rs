use crate::drivers::codec::Triplet;
use crate::drivers::excitation::{ExcitationMode, Variant};
/// Latest sweep per excitation variant.
///
/// A new weak sweep never replaces the stored strong one and vice versa.
#[derive(Debug, Default)]
pub struct SampleStore {
    strong: Option<Triplet>,
    weak: Option<Triplet>,
    last_variant: Option<Variant>,
}
impl SampleStore {
    pub fn record_result(&mut self, variant: Variant, triplet: Triplet) {
        match variant {
            Variant::Strong => self.strong = Some(triplet),
            Variant::Weak => self.weak = Some(triplet),
        }
        self.last_variant = Some(variant);
    }
    pub fn variant(&self, variant: Variant) -> Option<&Triplet> {
        match variant {
            Variant::Strong => self.strong.as_ref(),
            Variant::Weak => self.weak.as_ref(),
        }
    }
    pub fn last_variant(&self) -> Option<Variant> {
        self.last_variant
    }
    fn active_variant(&self, mode: ExcitationMode) -> Option<Variant> {
        match mode {
            ExcitationMode::Strong => Some(Variant::Strong),
            ExcitationMode::Weak => Some(Variant::Weak),
            ExcitationMode::Alternating => self.last_variant,
        }
    }
    /// The sweep to draw at full brightness, or `None` when there is nothing yet.
    pub fn active_series(&self, mode: ExcitationMode) -> Option<&Triplet> {
        self.active_variant(mode).and_then(|v| self.variant(v))
    }
    /// While alternating with both variants populated, the one not shown as active.
    pub fn dimmed_series(&self, mode: ExcitationMode) -> Option<&Triplet> {
        if mode != ExcitationMode::Alternating {
            return None;
        }
        let active = self.active_variant(mode)?;
        self.active_series(mode)?;
        self.variant(active.other())
    }
    /// Every sweep that ends up on screen; what auto-scale and fit-to-window measure.
    pub fn visible_series(&self, mode: ExcitationMode) -> Vec<&Triplet> {
        self.active_series(mode)
            .into_iter()
            .chain(self.dimmed_series(mode))
            .collect()
    }
}
