pub mod accessory;
pub mod api;
pub mod config;
pub mod light;
pub mod remo;

pub use config::Config;
pub use config::ConfigError;
pub use config::LogLevel;
pub use light::Brightness;
pub use light::Button;
pub use light::LightSynchronizer;
pub use light::Tier;
