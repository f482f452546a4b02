use reqwest::StatusCode;

/// Failure talking to the Nature Remo cloud.
///
/// None of these ever reach the bridge: reads degrade to "off" and writes are
/// reported as done. They exist so the failure is logged with a cause.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to Nature Remo cloud failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Nature Remo cloud returned status {0}")]
    Status(StatusCode),

    #[error("malformed response from Nature Remo cloud: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("appliance {0} not found in account")]
    ApplianceNotFound(String),

    #[error("appliance {0} has no light state")]
    NotALight(String),
}
