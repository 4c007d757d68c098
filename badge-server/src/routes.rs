//! Administrative HTTP surface

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use badge_link::ScanBridge;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::settings::Settings;
use crate::update;
use crate::ws;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<ScanBridge>,
    /// Where admin changes are persisted (not saved when `None`)
    pub settings_path: Option<Arc<PathBuf>>,
    pub update_dir: Arc<PathBuf>,
    /// WebSocket outbound drain interval
    pub flush_every: Duration,
}

impl AppState {
    /// Write the current configuration to the settings file
    fn persist(&self) {
        let Some(path) = self.settings_path.as_deref() else {
            return;
        };
        if let Err(e) = Settings::from(&self.bridge.config()).save(path) {
            warn!("{}", e);
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws::handler))
        .route("/serial_port", get(serial_port))
        .route("/location", get(location))
        .route("/location/{location}", post(set_location))
        .route("/url", get(url).post(set_url))
        .route("/key", post(set_key))
        .route("/active", get(active))
        .route("/active/{active}", post(set_active))
        .route("/version", get(version))
        .route("/update/{versions}", get(get_update))
        .with_state(state)
}

#[derive(Deserialize)]
struct UrlBody {
    url: String,
}

#[derive(Deserialize)]
struct KeyBody {
    key: String,
}

async fn serial_port(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "port": state.bridge.port().unwrap_or_default() }))
}

async fn location(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "location": state.bridge.config().location_key }))
}

async fn set_location(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Json<&'static str> {
    state.bridge.set_location(location);
    state.persist();
    Json("ok")
}

async fn url(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "url": state.bridge.config().target_url }))
}

async fn set_url(State(state): State<AppState>, Json(body): Json<UrlBody>) -> Json<&'static str> {
    state.bridge.set_target_url(body.url);
    state.persist();
    Json("ok")
}

async fn set_key(State(state): State<AppState>, Json(body): Json<KeyBody>) -> Json<&'static str> {
    state.bridge.set_api_key(body.key);
    state.persist();
    Json("ok")
}

async fn active(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "active": state.bridge.config().active }))
}

async fn set_active(
    State(state): State<AppState>,
    Path(active): Path<bool>,
) -> Json<&'static str> {
    state.bridge.set_active(active);
    state.persist();
    Json("ok")
}

async fn version() -> Json<Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

async fn get_update(State(state): State<AppState>, Path(versions): Path<String>) -> Json<Value> {
    info!("Get update files for {}", versions);
    let dir = Arc::clone(&state.update_dir);
    let result = tokio::task::spawn_blocking(move || update::collect(&dir, &versions)).await;

    match result {
        Ok(Ok(files)) => Json(json!({ "status": true, "data": files })),
        Ok(Err(e)) => Json(json!({
            "status": false,
            "data": format!("Wrong versions string (x.y-w.z), error {}", e),
        })),
        Err(e) => Json(json!({
            "status": false,
            "data": format!("Update lookup failed, error {}", e),
        })),
    }
}
