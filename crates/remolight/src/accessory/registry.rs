use linkme::distributed_slice;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::SharedAccessory;
use crate::config::AccessoryConfig;
use crate::config::CloudConfig;
use crate::config::Config;

/// Result type for accessory factory functions
///
/// `Ok(None)` means the factory does not handle this accessory kind.
pub type AccessoryFactoryResult = anyhow::Result<Option<SharedAccessory>>;

pub struct AccessoryContext<'a> {
    pub cloud: &'a CloudConfig,
    pub accessory: &'a AccessoryConfig,
}

#[distributed_slice]
pub static REGISTRY: [fn(&AccessoryContext) -> AccessoryFactoryResult];

/// Build every configured accessory
///
/// An accessory whose kind nobody handles, or whose factory fails, is logged and skipped so
/// that one bad entry does not take the others down.
pub fn build_accessories(config: &Config) -> Vec<SharedAccessory> {
    let mut accessories = Vec::new();

    for accessory in &config.accessories {
        let ctx = AccessoryContext {
            cloud: &config.cloud,
            accessory,
        };
        let name = &accessory.appliance.name;

        let mut built = None;
        for constr in REGISTRY {
            match constr(&ctx) {
                Ok(Some(a)) => {
                    built = Some(a);
                    break;
                }
                Ok(None) => continue,
                Err(e) => {
                    error!("[{}] Failed to set up accessory: {:#}", name, e);
                    break;
                }
            }
        }

        match built {
            Some(a) => {
                info!("[{}] Registered {} accessory", name, accessory.kind);
                accessories.push(a);
            }
            None => warn!(
                "[{}] No accessory registered for kind '{}', skipping",
                name, accessory.kind
            ),
        }
    }

    accessories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessory::ServiceKind;

    #[test]
    fn test_build_nature_remo_light() {
        let config = Config::parse(
            r#"
            [[accessories]]
            name = "Hall"
            id = "a"
            access_token = "t"
            full = true
            "#,
        )
        .unwrap();

        let accessories = build_accessories(&config);
        assert_eq!(accessories.len(), 1);
        assert_eq!(accessories[0].name(), "Hall");
        assert_eq!(accessories[0].services()[1].kind, ServiceKind::Lightbulb);
    }

    #[test]
    fn test_unknown_kind_skipped() {
        let config = Config::parse(
            r#"
            [[accessories]]
            accessory = "SomethingElse"
            name = "Hall"
            id = "a"
            access_token = "t"

            [[accessories]]
            name = "Kitchen"
            id = "b"
            access_token = "t"
            "#,
        )
        .unwrap();

        let accessories = build_accessories(&config);
        assert_eq!(accessories.len(), 1);
        assert_eq!(accessories[0].name(), "Kitchen");
    }
}
