use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use tracing::debug;
use tracing::info;
use tracing::warn;

use super::button::Brightness;
use super::button::Button;
use super::button::DimmingModes;
use super::button::Tier;
use super::resolver::resolve;
use crate::config::ApplianceConfig;
use crate::remo::find_light_state;
use crate::remo::RemoteClient;
use crate::remo::RemoteError;

/// Result of reading the power state from the cloud.
///
/// An unreachable cloud is not an error for the bridge: the light is reported as off.
#[derive(Debug)]
pub enum PowerReading {
    Reported(bool),
    Unavailable(RemoteError),
}

impl PowerReading {
    /// Power state to report; unknown state reads as off.
    pub fn is_on(&self) -> bool {
        matches!(self, PowerReading::Reported(true))
    }
}

/// Result of pressing a button through the cloud.
///
/// A failed press is logged but still completes the bridge's write; the next power read
/// is the source of truth.
#[derive(Debug)]
pub enum CommandOutcome {
    Sent(Button),
    Failed { button: Button, error: RemoteError },
}

impl CommandOutcome {
    pub fn button(&self) -> Button {
        match self {
            CommandOutcome::Sent(button) => *button,
            CommandOutcome::Failed { button, .. } => *button,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, CommandOutcome::Sent(_))
    }
}

/// Cached command state. Both fields are written together by `set_brightness`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CommandState {
    /// Last brightness requested through the bridge, never read back from the cloud
    brightness: Brightness,

    /// Tier pressed on the next power-on
    tier: Tier,
}

/// Owns the cached command state of one appliance and mediates all cloud traffic for it.
pub struct LightSynchronizer<C> {
    id: String,
    name: String,
    modes: DimmingModes,
    client: C,
    state: Mutex<CommandState>,
}

impl<C: RemoteClient> LightSynchronizer<C> {
    pub fn new(appliance: &ApplianceConfig, client: C) -> Self {
        let modes = appliance.modes;
        Self {
            id: appliance.id.clone(),
            name: appliance.name.clone(),
            modes,
            client,
            state: Mutex::new(CommandState {
                brightness: Brightness::MAX,
                tier: modes.initial_tier(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimming_supported(&self) -> bool {
        self.modes.dimming_supported()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Tier that the next `set_power(true)` will press
    pub fn tier(&self) -> Tier {
        self.lock().tier
    }

    /// Read the power state from the cloud. Never fails; unknown state reads as off.
    pub async fn power(&self) -> PowerReading {
        match self.fetch_power().await {
            Ok(on) => {
                info!(
                    "[{}] Retrieved light state from Nature Remo cloud: on={}",
                    self.name, on
                );
                PowerReading::Reported(on)
            }
            Err(e) => {
                warn!("[{}] Failed to read light state, reporting off: {}", self.name, e);
                PowerReading::Unavailable(e)
            }
        }
    }

    async fn fetch_power(&self) -> Result<bool, RemoteError> {
        let appliances = self.client.appliances().await?;
        find_light_state(&appliances, &self.id).map(|state| state.is_on())
    }

    /// Press the cached tier's button (on) or "off". Never fails the caller.
    pub async fn set_power(&self, on: bool) -> CommandOutcome {
        let button = if on { self.tier().button() } else { Button::Off };

        match self.client.send_light_button(&self.id, button).await {
            Ok(()) => {
                info!(
                    "[{}] Sent {} button operation to Nature Remo cloud",
                    self.name, button
                );
                CommandOutcome::Sent(button)
            }
            Err(error) => {
                warn!("[{}] Failed to send {} button: {}", self.name, button, error);
                CommandOutcome::Failed { button, error }
            }
        }
    }

    /// Cached brightness. No cloud call: the protocol cannot report brightness.
    pub fn brightness(&self) -> Brightness {
        self.lock().brightness
    }

    /// Record a brightness request and the tier it selects. Nothing is sent until the next
    /// power-on.
    pub fn set_brightness(&self, brightness: Brightness) -> Tier {
        let tier = resolve(brightness, self.modes);
        *self.lock() = CommandState { brightness, tier };
        debug!(
            "[{}] Brightness changed to {}, next power-on sends {}",
            self.name, brightness, tier
        );
        tier
    }

    fn lock(&self) -> MutexGuard<'_, CommandState> {
        // The state is plain Copy data, so a poisoned lock still holds a valid value.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::remo::MockRemoteClient;

    fn appliance(full: bool, night: bool) -> ApplianceConfig {
        ApplianceConfig::new("light-1", "token", "Ceiling", DimmingModes::new(full, night)).unwrap()
    }

    fn sync(
        full: bool,
        night: bool,
        client: MockRemoteClient,
    ) -> LightSynchronizer<MockRemoteClient> {
        LightSynchronizer::new(&appliance(full, night), client)
    }

    fn b(value: i64) -> Brightness {
        Brightness::new(value).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let s = sync(true, false, MockRemoteClient::new());
        assert_eq!(s.brightness(), Brightness::MAX);
        assert_eq!(s.tier(), Tier::Full);
        assert!(s.dimming_supported());

        let s = sync(false, false, MockRemoteClient::new());
        assert_eq!(s.tier(), Tier::Default);
        assert!(!s.dimming_supported());
    }

    #[test]
    fn test_set_brightness_is_stored_unchanged() {
        let s = sync(true, true, MockRemoteClient::new());
        for value in [0, 1, 19, 20, 55, 80, 81, 100] {
            s.set_brightness(b(value));
            assert_eq!(s.brightness(), b(value));
        }
    }

    #[test]
    fn test_set_brightness_idempotent() {
        let s = sync(true, true, MockRemoteClient::new());
        s.set_brightness(b(10));
        let once = s.tier();
        s.set_brightness(b(10));
        assert_eq!(s.tier(), once);
        assert_eq!(once, Tier::Night);
    }

    #[test]
    fn test_set_brightness_sends_nothing() {
        let s = sync(true, true, MockRemoteClient::new());
        s.set_brightness(b(50));
        assert!(s.client().sent_buttons().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_set_brightness_stays_consistent() {
        let s = std::sync::Arc::new(sync(true, true, MockRemoteClient::new()));

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let s = s.clone();
                let value = if i % 2 == 0 { 10 } else { 90 };
                tokio::spawn(async move {
                    for _ in 0..100 {
                        s.set_brightness(b(value));
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let brightness = s.brightness();
        assert!(brightness == b(10) || brightness == b(90));
        assert_eq!(s.tier(), resolve(brightness, s.modes));
    }

    #[tokio::test]
    async fn test_power_on_after_high_brightness_sends_full() {
        let s = sync(true, false, MockRemoteClient::new());
        s.set_brightness(b(90));
        let outcome = s.set_power(true).await;
        assert!(outcome.is_sent());
        assert_eq!(s.client().sent_buttons(), vec![Button::On100]);
    }

    #[tokio::test]
    async fn test_power_on_after_low_brightness_sends_night() {
        let s = sync(false, true, MockRemoteClient::new());
        s.set_brightness(b(10));
        s.set_power(true).await;
        assert_eq!(s.client().sent_buttons(), vec![Button::Night]);
    }

    #[tokio::test]
    async fn test_power_off_always_sends_off() {
        let s = sync(true, true, MockRemoteClient::new());
        s.set_power(false).await;
        s.set_brightness(b(10));
        s.set_power(false).await;
        s.set_brightness(b(95));
        s.set_power(false).await;
        assert_eq!(s.client().sent_buttons(), vec![Button::Off; 3]);
        assert_eq!(s.tier(), Tier::Full);
    }

    #[tokio::test]
    async fn test_power_on_without_dimming_sends_initial_command() {
        let s = sync(false, false, MockRemoteClient::new());
        s.set_power(true).await;
        assert_eq!(s.client().sent_buttons(), vec![Button::On]);

        let s = sync(true, false, MockRemoteClient::new());
        s.set_power(true).await;
        assert_eq!(s.client().sent_buttons(), vec![Button::On100]);
    }

    #[tokio::test]
    async fn test_commands_target_configured_appliance() {
        let s = sync(false, false, MockRemoteClient::new());
        s.set_power(true).await;
        let sent = s.client().sent.lock().unwrap().clone();
        assert_eq!(sent, vec![("light-1".to_string(), Button::On)]);
    }

    #[tokio::test]
    async fn test_failed_command_is_soft() {
        let client = MockRemoteClient {
            command_failure: Some(StatusCode::INTERNAL_SERVER_ERROR),
            ..MockRemoteClient::default()
        };
        let s = sync(true, true, client);
        let outcome = s.set_power(true).await;

        assert!(!outcome.is_sent());
        assert_eq!(outcome.button(), Button::On100);
        assert!(matches!(
            outcome,
            CommandOutcome::Failed {
                error: RemoteError::Status(status),
                ..
            } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
        // The cached tier is untouched by the failure
        assert_eq!(s.tier(), Tier::Full);
    }

    #[tokio::test]
    async fn test_power_reports_cloud_state() {
        let s = sync(false, false, MockRemoteClient::with_light("light-1", "on"));
        assert!(matches!(s.power().await, PowerReading::Reported(true)));

        let s = sync(false, false, MockRemoteClient::with_light("light-1", "off"));
        assert!(matches!(s.power().await, PowerReading::Reported(false)));
    }

    #[tokio::test]
    async fn test_power_unavailable_reads_off() {
        let s = sync(false, false, MockRemoteClient::new());
        let reading = s.power().await;
        assert!(!reading.is_on());
        assert!(matches!(
            reading,
            PowerReading::Unavailable(RemoteError::Status(status))
                if status == StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn test_power_missing_appliance_reads_off() {
        let s = sync(false, false, MockRemoteClient::with_light("other", "on"));
        let reading = s.power().await;
        assert!(!reading.is_on());
        assert!(matches!(
            reading,
            PowerReading::Unavailable(RemoteError::ApplianceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_power_does_not_touch_cached_state() {
        let s = sync(true, true, MockRemoteClient::with_light("light-1", "on"));
        s.set_brightness(b(42));
        s.power().await;
        assert_eq!(s.brightness(), b(42));
        assert_eq!(s.tier(), Tier::Default);
        assert_eq!(
            s.client()
                .list_calls
                .load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn test_full_and_night_scenario() {
        let s = sync(true, true, MockRemoteClient::new());
        assert_eq!(s.tier().button(), Button::On100);

        assert_eq!(s.set_brightness(b(15)), Tier::Night);
        assert_eq!(s.tier().button(), Button::Night);

        let outcome = s.set_power(true).await;
        assert_eq!(outcome.button(), Button::Night);
        assert_eq!(s.client().sent_buttons(), vec![Button::Night]);
    }
}
