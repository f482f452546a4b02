use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::accessory::AccessoryError;
use crate::accessory::AccessoryInformation;
use crate::accessory::Characteristic;
use crate::accessory::CharacteristicValue;
use crate::accessory::Service;
use crate::accessory::SharedAccessory;

/// Response for the /v1/ping endpoint
#[derive(Serialize)]
struct PingResponse {
    status: String,
}

/// Response for the /v1/info endpoint
#[derive(Serialize)]
struct InfoResponse {
    version: String,
    hostname: String,
}

/// One entry of the /v1/accessories listing
#[derive(Serialize)]
struct AccessoryResponse {
    name: String,
    information: AccessoryInformation,
    services: Vec<Service>,
}

/// Body of characteristic reads and writes
#[derive(Serialize, Deserialize)]
struct ValueBody {
    value: CharacteristicValue,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Shared application state
struct AppState {
    version: &'static str,
    accessories: HashMap<String, SharedAccessory>,
    /// Names in configuration order, for stable listings
    order: Vec<String>,
}

enum ApiError {
    UnknownAccessory(String),
    Accessory(AccessoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::UnknownAccessory(name) => {
                (StatusCode::NOT_FOUND, format!("unknown accessory '{}'", name))
            }
            ApiError::Accessory(e @ AccessoryError::Unsupported(_)) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            ApiError::Accessory(e @ AccessoryError::InvalidValue { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl AppState {
    fn accessory(&self, name: &str) -> Result<&SharedAccessory, ApiError> {
        self.accessories
            .get(name)
            .ok_or_else(|| ApiError::UnknownAccessory(name.to_string()))
    }
}

/// Handler for GET /v1/ping
#[tracing::instrument]
async fn ping() -> impl IntoResponse {
    tracing::debug!("Handling /v1/ping request");
    (
        StatusCode::OK,
        Json(PingResponse {
            status: "ok".to_string(),
        }),
    )
}

/// Handler for GET /v1/info
#[tracing::instrument(skip(state))]
async fn info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::debug!("Handling /v1/info request");

    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    (
        StatusCode::OK,
        Json(InfoResponse {
            version: state.version.to_string(),
            hostname,
        }),
    )
}

/// Handler for GET /v1/accessories
#[tracing::instrument(skip(state))]
async fn list_accessories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let accessories: Vec<AccessoryResponse> = state
        .order
        .iter()
        .filter_map(|name| state.accessories.get(name))
        .map(|a| AccessoryResponse {
            name: a.name().to_string(),
            information: a.information(),
            services: a.services(),
        })
        .collect();

    Json(accessories)
}

/// Handler for GET /v1/accessories/:name/:characteristic
#[tracing::instrument(skip(state))]
async fn read_characteristic(
    State(state): State<Arc<AppState>>,
    Path((name, characteristic)): Path<(String, Characteristic)>,
) -> Result<Json<ValueBody>, ApiError> {
    let accessory = state.accessory(&name)?;
    let value = accessory
        .read(characteristic)
        .await
        .map_err(ApiError::Accessory)?;
    Ok(Json(ValueBody { value }))
}

/// Handler for PUT /v1/accessories/:name/:characteristic
#[tracing::instrument(skip(state, body))]
async fn write_characteristic(
    State(state): State<Arc<AppState>>,
    Path((name, characteristic)): Path<(String, Characteristic)>,
    Json(body): Json<ValueBody>,
) -> Result<StatusCode, ApiError> {
    let accessory = state.accessory(&name)?;
    accessory
        .write(characteristic, body.value)
        .await
        .map_err(ApiError::Accessory)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create the API router with all endpoints
pub fn create_router(accessories: Vec<SharedAccessory>) -> Router {
    let order = accessories.iter().map(|a| a.name().to_string()).collect();
    let accessories = accessories
        .into_iter()
        .map(|a| (a.name().to_string(), a))
        .collect();

    let state = Arc::new(AppState {
        version: env!("CARGO_PKG_VERSION"),
        accessories,
        order,
    });

    Router::new()
        .route("/v1/ping", get(ping))
        .route("/v1/info", get(info))
        .route("/v1/accessories", get(list_accessories))
        .route(
            "/v1/accessories/:name/:characteristic",
            get(read_characteristic).put(write_characteristic),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP API server
///
/// This function will bind to the specified address and serve the bridge endpoints.
/// It will run until the provided shutdown signal is triggered.
///
/// # Arguments
/// * `listen` - The IP address to listen on (e.g., "127.0.0.1")
/// * `port` - The port to listen on (e.g., 8581)
/// * `accessories` - Accessories to expose
/// * `shutdown_rx` - A oneshot receiver that will trigger graceful shutdown
///
/// # Returns
/// Returns Ok(()) if the server shuts down gracefully, or an error if startup fails
pub async fn serve(
    listen: &str,
    port: u16,
    accessories: Vec<SharedAccessory>,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    let app = create_router(accessories);

    let addr: SocketAddr = format!("{}:{}", listen, port).parse()?;
    tracing::info!("Starting HTTP API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            tracing::info!("HTTP API server shutting down gracefully");
        })
        .await?;

    Ok(())
}
