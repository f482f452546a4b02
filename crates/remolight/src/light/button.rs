use serde::Serialize;
use strum::Display;
use strum::EnumString;
use strum::IntoStaticStr;

/// A single press on the appliance's infrared remote, as understood by the cloud API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Button {
    On,
    #[serde(rename = "on-100")]
    #[strum(serialize = "on-100")]
    On100,
    Night,
    Off,
}

impl Button {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Dimming tier: the discrete preset a brightness value is quantized onto.
///
/// This is what gets sent on the next power-on. `Off` is deliberately not a tier so the
/// cached command can only ever hold one of the three "on" buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Regular "on" button
    Default,
    /// Full brightness ("on-100")
    Full,
    /// Night light ("night")
    Night,
}

impl Tier {
    pub fn button(self) -> Button {
        match self {
            Tier::Default => Button::On,
            Tier::Full => Button::On100,
            Tier::Night => Button::Night,
        }
    }
}

impl From<Tier> for Button {
    fn from(tier: Tier) -> Self {
        tier.button()
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.button().as_str())
    }
}

/// Which optional dimming tiers the physical remote has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DimmingModes {
    /// The remote has a full-brightness button
    pub full: bool,
    /// The remote has a night-light button
    pub night: bool,
}

impl DimmingModes {
    pub fn new(full: bool, night: bool) -> Self {
        Self { full, night }
    }

    /// Brightness is only exposed to the bridge when at least one extra tier exists.
    pub fn dimming_supported(&self) -> bool {
        self.full || self.night
    }

    /// Tier used for power-on before any brightness has been set.
    pub fn initial_tier(&self) -> Tier {
        if self.full {
            Tier::Full
        } else {
            Tier::Default
        }
    }
}

/// Brightness percentage, always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Brightness(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("brightness {0} is outside 0..=100")]
pub struct BrightnessOutOfRange(pub i64);

impl Brightness {
    pub const MAX: Brightness = Brightness(100);

    pub fn new(value: i64) -> Result<Self, BrightnessOutOfRange> {
        match u8::try_from(value) {
            Ok(v) if v <= 100 => Ok(Self(v)),
            _ => Err(BrightnessOutOfRange(value)),
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<i64> for Brightness {
    type Error = BrightnessOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for Brightness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
