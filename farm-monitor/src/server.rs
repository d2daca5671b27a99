//! Service HTTP (axum)
//!
//! Routes:
//! - `GET /health`
//! - `GET /api/farm/status`, `GET /api/farm/geometry`
//! - `GET /api/farm/data?variable=NDVI`
//! - `POST /api/farm/process` (`{variables?, start_date?, end_date?}`)
//! - `GET /api/farm/latest`, `GET /api/farm/summary`

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::export::geojson::to_json;
use crate::index::SpectralIndex;
use crate::process::{self, ProcessRequest, DEFAULT_END, DEFAULT_START};
use crate::store::Store;
use crate::summary;

/// État partagé des handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
}

impl AppState {
    pub fn new(config: Config, store: Store) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

/// Erreur renvoyée au client sous la forme `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{:#}", err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "Request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult = std::result::Result<Json<Value>, ApiError>;

/// Exécute une opération bloquante (fichiers, SQLite) hors du runtime
async fn blocking<T, F>(f: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::from(anyhow::anyhow!("Worker task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Construit le routeur avec ses couches (trace, CORS)
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/farm/status", get(farm_status))
        .route("/api/farm/geometry", get(farm_geometry))
        .route("/api/farm/data", get(farm_data))
        .route("/api/farm/process", post(process_farm))
        .route("/api/farm/latest", get(latest_data))
        .route("/api/farm/summary", get(farm_summary))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Démarre le serveur et bloque jusqu'à son arrêt
pub async fn serve(config: Config) -> Result<()> {
    let store = Store::open(&config.database_path)?;
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.bind_address()))?;

    let app = router(AppState::new(config, store));

    info!(%addr, "Starting farm monitor server");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn farm_status(State(state): State<AppState>) -> ApiResult {
    let config = state.config.clone();
    let boundary = blocking(move || Ok(crate::load_boundary(&config)?)).await?;
    let geometry = &boundary.geometry;

    Ok(Json(json!({
        "status": "active",
        "farm_name": state.config.farm_name,
        "location": state.config.farm_location,
        "geometry_source": geometry.source.as_str(),
        "boundary_points": geometry.ring().len(),
        "area_ha": geometry.area_hectares,
        "boundary_checksum": boundary.checksum,
        "data_source": state.config.data_source.as_str(),
        "last_updated": Utc::now().to_rfc3339(),
    })))
}

async fn farm_geometry(State(state): State<AppState>) -> ApiResult {
    let config = state.config.clone();
    let boundary = blocking(move || Ok(crate::load_boundary(&config)?)).await?;
    Ok(Json(Value::Object(to_json(&boundary.geometry))))
}

#[derive(Debug, Deserialize)]
struct DataQuery {
    variable: Option<String>,
}

async fn farm_data(State(state): State<AppState>, Query(query): Query<DataQuery>) -> ApiResult {
    let farm_id = state.config.farm_id.clone();
    let store = state.store.clone();
    let series = blocking(move || store.farm_data(&farm_id, query.variable.as_deref())).await?;
    Ok(Json(serde_json::to_value(series).map_err(anyhow::Error::from)?))
}

#[derive(Debug, Default, Deserialize)]
struct ProcessBody {
    variables: Option<Vec<String>>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl ProcessBody {
    /// Corps vide: valeurs par défaut. Tout autre corps doit être un JSON valide.
    fn from_bytes(body: &[u8]) -> std::result::Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))
    }

    fn validate(self) -> std::result::Result<ProcessRequest, ApiError> {
        let indices = match self.variables {
            Some(names) => {
                SpectralIndex::parse_list(&names).map_err(|e| ApiError::bad_request(e.to_string()))?
            }
            None => SpectralIndex::all().to_vec(),
        };
        if indices.is_empty() {
            return Err(ApiError::bad_request("At least one variable is required"));
        }

        let date = |value: Option<String>, default: &str| {
            process::parse_date(value.as_deref().unwrap_or(default))
                .map_err(|e| ApiError::bad_request(e.to_string()))
        };

        Ok(ProcessRequest {
            indices,
            start: date(self.start_date, DEFAULT_START)?,
            end: date(self.end_date, DEFAULT_END)?,
        })
    }
}

async fn process_farm(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let request = ProcessBody::from_bytes(&body)?.validate()?;

    let report = blocking(move || {
        let boundary = crate::load_boundary(&state.config)?;
        let mut rng = rand::thread_rng();
        process::process_farm(
            &mut rng,
            &state.config,
            &state.store,
            &boundary.geometry,
            &request,
        )
    })
    .await?;

    Ok(Json(serde_json::to_value(report).map_err(anyhow::Error::from)?))
}

async fn latest_data(State(state): State<AppState>) -> ApiResult {
    let farm_id = state.config.farm_id.clone();
    let store = state.store.clone();
    let series = blocking(move || store.farm_data(&farm_id, None)).await?;

    Ok(Json(json!({
        "farm_id": series.farm_id,
        "latest_readings": summary::latest_readings(&series),
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

async fn farm_summary(State(state): State<AppState>) -> ApiResult {
    let farm_id = state.config.farm_id.clone();
    let store = state.store.clone();
    let series = blocking(move || store.farm_data(&farm_id, None)).await?;
    Ok(Json(serde_json::to_value(summary::summarize(&series)).map_err(anyhow::Error::from)?))
}
