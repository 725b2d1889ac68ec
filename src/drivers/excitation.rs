/// Which excitation resistor the device drives the DUT through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    /// 4.7 kΩ
    Strong,
    /// 100 kΩ
    Weak,
}
impl Variant {
    /// Single-byte acquisition command understood by the tracer.
    pub fn command(self) -> u8 {
        match self {
            Variant::Strong => b'T',
            Variant::Weak => b'W',
        }
    }
    pub fn other(self) -> Self {
        match self {
            Variant::Strong => Variant::Weak,
            Variant::Weak => Variant::Strong,
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExcitationMode {
    #[default]
    Strong,
    Weak,
    Alternating,
}
impl ExcitationMode {
    pub fn next(self) -> Self {
        match self {
            ExcitationMode::Strong => ExcitationMode::Weak,
            ExcitationMode::Weak => ExcitationMode::Alternating,
            ExcitationMode::Alternating => ExcitationMode::Strong,
        }
    }
    pub fn label(self) -> &'static str {
        match self {
            ExcitationMode::Strong => "4.7K",
            ExcitationMode::Weak => "100K WEAK",
            ExcitationMode::Alternating => "ALT",
        }
    }
}
/// Picks the command for each acquisition tick.
#[derive(Clone, Debug, Default)]
pub struct ExcitationController {
    mode: ExcitationMode,
    next_is_weak: bool,
}
impl ExcitationController {
    pub fn mode(&self) -> ExcitationMode {
        self.mode
    }
    pub fn cycle(&mut self) -> ExcitationMode {
        self.mode = self.mode.next();
        self.mode
    }
    /// In alternating mode the toggle flips on every call, whether or not the
    /// acquisition that follows succeeds.
    pub fn decide_command(&mut self) -> Variant {
        match self.mode {
            ExcitationMode::Strong => Variant::Strong,
            ExcitationMode::Weak => Variant::Weak,
            ExcitationMode::Alternating => {
                let variant = if self.next_is_weak {
                    Variant::Weak
                } else {
                    Variant::Strong
                };
                self.next_is_weak = !self.next_is_weak;
                variant
            }
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn commands(ctrl: &mut ExcitationController, n: usize) -> String {
        (0..n).map(|_| ctrl.decide_command().command() as char).collect()
    }
    #[test]
    fn alternating_interleaves_strong_and_weak() {
        let mut ctrl = ExcitationController::default();
        ctrl.cycle();
        ctrl.cycle();
        assert_eq!(ctrl.mode(), ExcitationMode::Alternating);
        assert_eq!(commands(&mut ctrl, 5), "TWTWT");
    }
    #[test]
    fn fixed_modes_do_not_touch_the_toggle() {
        let mut ctrl = ExcitationController::default();
        assert_eq!(commands(&mut ctrl, 3), "TTT");
        ctrl.cycle();
        let v = ctrl.decide_command();
        assert_eq!(v.command(), b'W');
        assert_eq!(v.other(), Variant::Strong);
        ctrl.cycle();
        assert_eq!(commands(&mut ctrl, 2), "TW");
    }
    #[test]
    fn cycle_wraps_back_to_strong() {
        let mut ctrl = ExcitationController::default();
        let labels: Vec<_> = (0..4).map(|_| ctrl.cycle().label()).collect();
        assert_eq!(labels, ["100K WEAK", "ALT", "4.7K", "100K WEAK"]);
    }
}
