//! Wire types for the Nature Remo cloud API (`/1/appliances`).
//!
//! The appliance list is kept as raw JSON. Only the entry for the configured id is decoded,
//! so a malformed entry for some other appliance cannot hide the light's state.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::error::RemoteError;
use crate::light::Button;

/// The matched entry of `GET /1/appliances`
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Appliance {
    /// Present (and non-null) only for light appliances
    #[serde(default)]
    light: Option<LightAppliance>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct LightAppliance {
    state: LightApplianceState,
}

/// Last known state of a light, as tracked by the cloud from button presses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LightApplianceState {
    /// "on" or "off"
    pub power: String,
}

impl LightApplianceState {
    pub fn is_on(&self) -> bool {
        self.power == "on"
    }
}

/// Form body for `POST /1/appliances/{id}/light`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ButtonForm {
    pub button: Button,
}

/// Find the light state of appliance `id`. The cloud never returns two entries with the
/// same id, so the first match wins.
pub fn find_light_state(
    appliances: &[Value],
    id: &str,
) -> Result<LightApplianceState, RemoteError> {
    let entry = appliances
        .iter()
        .find(|a| a.get("id").and_then(Value::as_str) == Some(id))
        .ok_or_else(|| RemoteError::ApplianceNotFound(id.to_string()))?;

    let appliance = Appliance::deserialize(entry).map_err(RemoteError::Decode)?;
    appliance
        .light
        .map(|light| light.state)
        .ok_or_else(|| RemoteError::NotALight(id.to_string()))
}
