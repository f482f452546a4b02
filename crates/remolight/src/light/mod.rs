//! Command mapping and state synchronization for an infrared light.
//!
//! Brightness changes only decide which button "on" means; the button is pressed on the
//! next power-on. See [`resolver`] for the quantization rule.

mod button;
pub mod resolver;
mod synchronizer;

pub use button::Brightness;
pub use button::BrightnessOutOfRange;
pub use button::Button;
pub use button::DimmingModes;
pub use button::Tier;
pub use resolver::resolve;
pub use synchronizer::CommandOutcome;
pub use synchronizer::LightSynchronizer;
pub use synchronizer::PowerReading;
