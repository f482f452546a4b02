use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use linkme::distributed_slice;
use tracing::info;

use super::Accessory;
use super::AccessoryError;
use super::AccessoryInformation;
use super::Characteristic;
use super::CharacteristicValue;
use super::Service;
use super::ServiceKind;
use crate::accessory;
use crate::config::NATURE_REMO_LIGHT;
use crate::light::Brightness;
use crate::light::LightSynchronizer;
use crate::remo::NatureRemoClient;
use crate::remo::RemoteClient;

const INFORMATION: AccessoryInformation = AccessoryInformation {
    manufacturer: "Nature, Inc.",
    model: "NatureRemo",
    serial_number: "nature-remo",
};

/// Lightbulb accessory backed by a Nature Remo infrared light
///
/// Brightness is only exposed when the remote has a full or night button.
pub struct RemoLightbulb<C> {
    light: LightSynchronizer<C>,
}

impl<C: RemoteClient> RemoLightbulb<C> {
    pub fn new(light: LightSynchronizer<C>) -> Self {
        Self { light }
    }

    pub fn light(&self) -> &LightSynchronizer<C> {
        &self.light
    }

    fn check_supported(&self, characteristic: Characteristic) -> Result<(), AccessoryError> {
        match characteristic {
            Characteristic::On => Ok(()),
            Characteristic::Brightness if self.light.dimming_supported() => Ok(()),
            Characteristic::Brightness => Err(AccessoryError::Unsupported(characteristic)),
        }
    }
}

#[async_trait]
impl<C: RemoteClient + 'static> Accessory for RemoLightbulb<C> {
    fn name(&self) -> &str {
        self.light.name()
    }

    fn information(&self) -> AccessoryInformation {
        INFORMATION
    }

    fn services(&self) -> Vec<Service> {
        let mut characteristics = vec![Characteristic::On];
        if self.light.dimming_supported() {
            characteristics.push(Characteristic::Brightness);
        }

        vec![
            Service {
                kind: ServiceKind::AccessoryInformation,
                characteristics: Vec::new(),
            },
            Service {
                kind: ServiceKind::Lightbulb,
                characteristics,
            },
        ]
    }

    async fn read(
        &self,
        characteristic: Characteristic,
    ) -> Result<CharacteristicValue, AccessoryError> {
        self.check_supported(characteristic)?;

        match characteristic {
            Characteristic::On => Ok(CharacteristicValue::Bool(self.light.power().await.is_on())),
            Characteristic::Brightness => Ok(CharacteristicValue::Int(i64::from(
                self.light.brightness().value(),
            ))),
        }
    }

    async fn write(
        &self,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Result<(), AccessoryError> {
        self.check_supported(characteristic)?;

        match (characteristic, value) {
            (Characteristic::On, CharacteristicValue::Bool(on)) => {
                // Failures are logged by the synchronizer; the write itself always completes
                self.light.set_power(on).await;
                Ok(())
            }
            (Characteristic::Brightness, CharacteristicValue::Int(value)) => {
                let brightness =
                    Brightness::new(value).map_err(|e| AccessoryError::InvalidValue {
                        characteristic,
                        message: e.to_string(),
                    })?;
                self.light.set_brightness(brightness);
                Ok(())
            }
            (characteristic, value) => Err(AccessoryError::InvalidValue {
                characteristic,
                message: format!("unexpected value {:?}", value),
            }),
        }
    }
}

#[distributed_slice(accessory::ACCESSORY_REGISTRY)]
fn init_nature_remo_light(ctx: &accessory::AccessoryContext) -> accessory::AccessoryFactoryResult {
    if ctx.accessory.kind != NATURE_REMO_LIGHT {
        return Ok(None);
    }

    let appliance = &ctx.accessory.appliance;
    let client = NatureRemoClient::new(ctx.cloud, &appliance.access_token)
        .context("Failed to create Nature Remo client")?;

    info!(
        "[{}] Nature Remo light {} (full={}, night={})",
        appliance.name, appliance.id, appliance.modes.full, appliance.modes.night
    );
    let light = LightSynchronizer::new(appliance, client);
    Ok(Some(Arc::new(RemoLightbulb::new(light))))
}
