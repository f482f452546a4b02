//! Quantizes a continuous brightness request onto the remote's preset buttons.
//!
//! The infrared protocol has no dimming level, only discrete buttons, so the mapping is lossy.
//! Both thresholds are exclusive: exactly 20 and exactly 80 fall through to the default tier.

use super::button::Brightness;
use super::button::DimmingModes;
use super::button::Tier;

/// Brightness strictly below this selects the night tier (when available).
pub const NIGHT_BELOW: u8 = 20;

/// Brightness strictly above this selects the full tier (when available).
pub const FULL_ABOVE: u8 = 80;

/// Pick the tier for `brightness`. Night takes priority over full.
pub fn resolve(brightness: Brightness, modes: DimmingModes) -> Tier {
    let value = brightness.value();
    if modes.night && value < NIGHT_BELOW {
        Tier::Night
    } else if modes.full && value > FULL_ABOVE {
        Tier::Full
    } else {
        Tier::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::Button;

    fn b(value: i64) -> Brightness {
        Brightness::new(value).unwrap()
    }

    fn all() -> impl Iterator<Item = Brightness> {
        (0..=100).map(b)
    }

    #[test]
    fn test_no_modes_always_on() {
        for brightness in all() {
            assert_eq!(resolve(brightness, DimmingModes::new(false, false)), Tier::Default);
        }
    }

    #[test]
    fn test_night_below_threshold_regardless_of_full() {
        for brightness in (0..20).map(b) {
            assert_eq!(resolve(brightness, DimmingModes::new(false, true)), Tier::Night);
            assert_eq!(resolve(brightness, DimmingModes::new(true, true)), Tier::Night);
        }
    }

    #[test]
    fn test_full_above_threshold() {
        for brightness in (81..=100).map(b) {
            assert_eq!(resolve(brightness, DimmingModes::new(true, false)), Tier::Full);
            assert_eq!(resolve(brightness, DimmingModes::new(true, true)), Tier::Full);
            assert_eq!(resolve(brightness, DimmingModes::new(false, true)), Tier::Default);
        }
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        let both = DimmingModes::new(true, true);
        assert_eq!(resolve(b(19), both), Tier::Night);
        assert_eq!(resolve(b(20), both), Tier::Default);
        assert_eq!(resolve(b(80), both), Tier::Default);
        assert_eq!(resolve(b(81), both), Tier::Full);
    }

    #[test]
    fn test_middle_band_is_default() {
        let both = DimmingModes::new(true, true);
        for brightness in (20..=80).map(b) {
            assert_eq!(resolve(brightness, both).button(), Button::On);
        }
    }

    #[test]
    fn test_night_disabled_low_brightness_is_default() {
        assert_eq!(resolve(b(5), DimmingModes::new(true, false)), Tier::Default);
    }
}
