//! Accessory abstraction for the bridge
//!
//! An accessory is what the bridge sees: static information plus a set of services, each
//! exposing readable/writable characteristics.

mod lightbulb;
mod registry;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

pub use lightbulb::RemoLightbulb;
pub use registry::build_accessories;
pub use registry::AccessoryContext;
pub use registry::AccessoryFactoryResult;
pub use registry::REGISTRY as ACCESSORY_REGISTRY;

/// Static accessory metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessoryInformation {
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub serial_number: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Characteristic {
    On,
    Brightness,
}

impl std::fmt::Display for Characteristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Characteristic::On => f.write_str("on"),
            Characteristic::Brightness => f.write_str("brightness"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    AccessoryInformation,
    Lightbulb,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
    pub kind: ServiceKind,
    pub characteristics: Vec<Characteristic>,
}

/// Value read from or written to a characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Bool(bool),
    Int(i64),
}

/// Why a characteristic access was refused.
///
/// Cloud failures are never reported here; see [`crate::light::PowerReading`].
#[derive(Debug, thiserror::Error)]
pub enum AccessoryError {
    #[error("characteristic '{0}' is not supported by this accessory")]
    Unsupported(Characteristic),

    #[error("invalid value for '{characteristic}': {message}")]
    InvalidValue {
        characteristic: Characteristic,
        message: String,
    },
}

/// Trait that every bridge accessory implements
#[async_trait]
pub trait Accessory: Send + Sync {
    /// Display name, unique among configured accessories
    fn name(&self) -> &str;

    fn information(&self) -> AccessoryInformation;

    /// Services exposed to the bridge, in registration order
    fn services(&self) -> Vec<Service>;

    async fn read(&self, characteristic: Characteristic)
        -> Result<CharacteristicValue, AccessoryError>;

    async fn write(
        &self,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Result<(), AccessoryError>;
}

pub type SharedAccessory = Arc<dyn Accessory>;
