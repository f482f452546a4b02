//! Nature Remo cloud API client.

mod client;
mod error;
mod payload;

#[cfg(test)]
pub use client::MockRemoteClient;
pub use client::NatureRemoClient;
pub use client::RemoteClient;
pub use error::RemoteError;
pub use payload::find_light_state;
pub use payload::ButtonForm;
pub use payload::LightApplianceState;
