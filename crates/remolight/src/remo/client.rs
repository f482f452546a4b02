use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use secrecy::SecretString;
use tracing::debug;

use super::error::RemoteError;
use super::payload::ButtonForm;
use crate::config::CloudConfig;
use crate::light::Button;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Trait for Nature Remo cloud operations
///
/// This trait allows for mocking the cloud for testing purposes
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Fetch every appliance registered in the account, undecoded
    async fn appliances(&self) -> Result<Vec<serde_json::Value>, RemoteError>;

    /// Press a button on a light appliance's remote
    async fn send_light_button(&self, appliance_id: &str, button: Button)
        -> Result<(), RemoteError>;
}

/// Real cloud client using reqwest. One per accessory, since the token is per accessory.
pub struct NatureRemoClient {
    http: reqwest::Client,
    base_url: String,
    token: SecretString,
}

impl NatureRemoClient {
    pub fn new(cloud: &CloudConfig, token: &SecretString) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(cloud.timeout_secs))
            .build()
            .map_err(RemoteError::Client)?;

        Ok(Self {
            http,
            base_url: cloud.base_url.trim_end_matches('/').to_string(),
            token: SecretString::from(token.expose_secret().to_owned()),
        })
    }
}

#[async_trait]
impl RemoteClient for NatureRemoClient {
    async fn appliances(&self) -> Result<Vec<serde_json::Value>, RemoteError> {
        let url = format!("{}/1/appliances", self.base_url);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(RemoteError::Decode)
    }

    async fn send_light_button(
        &self,
        appliance_id: &str,
        button: Button,
    ) -> Result<(), RemoteError> {
        let url = format!("{}/1/appliances/{}/light", self.base_url, appliance_id);
        debug!("POST {} button={}", url, button);

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.token.expose_secret())
            .form(&ButtonForm { button })
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(RemoteError::Status(status)),
        }
    }
}

/// Mock cloud client for testing
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockRemoteClient {
    /// Appliance list to return; `None` simulates the cloud being down (503)
    pub appliances: Option<Vec<serde_json::Value>>,
    /// Status to fail button presses with; `None` accepts them
    pub command_failure: Option<StatusCode>,
    /// Every button press attempted, successful or not
    pub sent: std::sync::Mutex<Vec<(String, Button)>>,
    pub list_calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockRemoteClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloud that knows a single light with the given power state
    pub fn with_light(id: &str, power: &str) -> Self {
        Self {
            appliances: Some(vec![serde_json::json!({
                "id": id,
                "light": {"state": {"power": power}}
            })]),
            ..Self::default()
        }
    }

    pub fn sent_buttons(&self) -> Vec<Button> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, button)| *button)
            .collect()
    }
}

#[cfg(test)]
#[async_trait]
impl RemoteClient for MockRemoteClient {
    async fn appliances(&self) -> Result<Vec<serde_json::Value>, RemoteError> {
        self.list_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.appliances
            .clone()
            .ok_or(RemoteError::Status(StatusCode::SERVICE_UNAVAILABLE))
    }

    async fn send_light_button(
        &self,
        appliance_id: &str,
        button: Button,
    ) -> Result<(), RemoteError> {
        self.sent
            .lock()
            .unwrap()
            .push((appliance_id.to_string(), button));
        match self.command_failure {
            Some(status) => Err(RemoteError::Status(status)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_cloud() -> CloudConfig {
        // Port 9 (discard) is not listening; the connection is refused immediately.
        CloudConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            timeout_secs: 2,
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            NatureRemoClient::new(&unreachable_cloud(), &SecretString::from("t".to_string()))
                .unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9");
    }

    #[tokio::test]
    async fn test_unreachable_cloud_is_transport_error() {
        let client =
            NatureRemoClient::new(&unreachable_cloud(), &SecretString::from("t".to_string()))
                .unwrap();

        let err = client.appliances().await.unwrap_err();
        assert!(matches!(err, RemoteError::Transport(_)), "got {:?}", err);

        let err = client.send_light_button("a", Button::On).await.unwrap_err();
        assert!(matches!(err, RemoteError::Transport(_)), "got {:?}", err);
    }
}
