//! Web server for serving the planner page and the JSON API

use axum::{
    Json, Router,
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tower_http::cors::CorsLayer;

use crate::Error;
use crate::config::Settings;
use crate::engine;
use crate::models::{ActivityUpdate, NewActivity};
use crate::storage::Storage;

/// Default port for the web server
pub const DEFAULT_PORT: u16 = 3000;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Storage for the data directory; the mutex serializes read-modify-write cycles
    pub storage: Arc<Mutex<Storage>>,
    /// Broadcast channel for sending updates to WebSocket clients
    pub update_tx: broadcast::Sender<String>,
}

impl AppState {
    pub fn new(storage: Storage) -> Self {
        let (update_tx, _) = broadcast::channel(100);
        Self {
            storage: Arc::new(Mutex::new(storage)),
            update_tx,
        }
    }

    /// Tell connected clients to reload.
    fn notify_reload(&self) {
        // No receivers is fine
        let _ = self.update_tx.send(super::reload_message());
    }
}

/// Error response carrying a JSON `error` body.
struct ApiError(StatusCode, String);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::NotFound(_) => ApiError(StatusCode::NOT_FOUND, "Activity not found".to_string()),
            Error::InvalidInput(msg) => ApiError(StatusCode::BAD_REQUEST, msg),
            other => {
                tracing::error!(error = %other, "request failed");
                ApiError(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Build the router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/settings", get(get_settings).put(put_settings))
        .route("/api/activities", get(get_activities).post(create_activity))
        .route(
            "/api/activities/:id",
            get(get_activity).put(update_activity).delete(delete_activity),
        )
        .route("/ws", get(crate::gui::websocket::ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web server
pub async fn start_server(
    data_dir: &Path,
    port: u16,
    host: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::open(data_dir)?;
    let state = AppState::new(storage);

    // Start file watcher in background
    let watcher_tx = state.update_tx.clone();
    let watcher_path = data_dir.to_path_buf();
    tokio::spawn(async move {
        if let Err(e) = crate::gui::watcher::watch_storage(watcher_path, watcher_tx).await {
            tracing::error!(error = %e, "file watcher stopped");
        }
    });

    let app = router(state);

    let host_addr: std::net::IpAddr = host
        .parse()
        .map_err(|e| format!("Invalid host address '{}': {}", host, e))?;
    let addr = SocketAddr::from((host_addr, port));
    tracing::info!(%addr, data_dir = %data_dir.display(), "starting web server");
    println!("Starting cutover planner at http://{}", addr);
    println!("Press Ctrl+C to stop");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve the main HTML page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("index.html"))
}

/// Get planner settings
async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<Settings>> {
    let storage = state.storage.lock().await;
    Ok(Json(storage.load_settings()?))
}

/// Replace planner settings
async fn put_settings(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Json<Settings>> {
    let settings = Settings::from_json_value(body).map_err(|msg| {
        tracing::debug!(%msg, "rejected settings");
        ApiError(StatusCode::BAD_REQUEST, "Invalid settings format".to_string())
    })?;

    let mut storage = state.storage.lock().await;
    storage.save_settings(&settings)?;
    drop(storage);

    state.notify_reload();
    Ok(Json(settings))
}

/// Get all activities in list order
async fn get_activities(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let storage = state.storage.lock().await;
    let activities = storage.load_activities()?;
    Ok(Json(serde_json::to_value(activities).map_err(Error::from)?))
}

/// Get one activity
async fn get_activity(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let storage = state.storage.lock().await;
    let activity = storage.get_activity(&id)?;
    Ok(Json(serde_json::to_value(activity).map_err(Error::from)?))
}

/// Create an activity
async fn create_activity(
    State(state): State<AppState>,
    Json(request): Json<NewActivity>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let mut storage = state.storage.lock().await;
    let activity = storage.transact(|records, settings| {
        Ok(engine::create(
            records,
            &request,
            &settings.status_vocabulary(),
            Utc::now(),
        ))
    })?;
    drop(storage);

    tracing::info!(id = %activity.id, "created activity via API");
    state.notify_reload();
    Ok((
        StatusCode::CREATED,
        Json(serde_json::to_value(activity).map_err(Error::from)?),
    ))
}

/// Apply a sparse update to an activity
async fn update_activity(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(request): Json<ActivityUpdate>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut storage = state.storage.lock().await;
    let outcome = storage.transact(|records, settings| {
        engine::update(
            records,
            &id,
            &request,
            &settings.status_vocabulary(),
            Utc::now(),
        )
    })?;
    drop(storage);

    tracing::info!(%id, cascaded = outcome.cascaded.len(), "updated activity via API");
    state.notify_reload();
    Ok(Json(
        serde_json::to_value(outcome.activity).map_err(Error::from)?,
    ))
}

/// Delete an activity
async fn delete_activity(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<StatusCode> {
    let mut storage = state.storage.lock().await;
    storage.transact(|records, _| engine::delete(records, &id))?;
    drop(storage);

    tracing::info!(%id, "deleted activity via API");
    state.notify_reload();
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    fn app(env: &TestEnv) -> (Router, broadcast::Receiver<String>) {
        let state = AppState::new(env.init_storage());
        let rx = state.update_tx.subscribe();
        (router(state), rx)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_create_returns_201_and_broadcasts() {
        let env = TestEnv::new();
        let (app, mut rx) = app(&env);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/activities",
            Some(serde_json::json!({ "title": "Backup DB", "editor_name": "Dana" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["title"], "Backup DB");
        assert_eq!(body["status"], "Not Started");
        assert_eq!(body["edit_log"][0]["user"], "Dana");
        assert!(rx.try_recv().unwrap().contains("reload"));

        let (status, list) = send(&app, Method::GET, "/api/activities", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_404() {
        let env = TestEnv::new();
        let (app, _rx) = app(&env);

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/activities/act-missing",
            Some(serde_json::json!({ "title": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Activity not found");
    }

    #[tokio::test]
    async fn test_update_completes_and_cascades() {
        let env = TestEnv::new();
        let (app, _rx) = app(&env);

        let (_, a) = send(
            &app,
            Method::POST,
            "/api/activities",
            Some(serde_json::json!({ "title": "A" })),
        )
        .await;
        let a_id = a["id"].as_str().unwrap().to_string();
        let (_, b) = send(
            &app,
            Method::POST,
            "/api/activities",
            Some(serde_json::json!({ "title": "B", "dependency": a_id })),
        )
        .await;
        let b_id = b["id"].as_str().unwrap().to_string();

        let (status, updated) = send(
            &app,
            Method::PUT,
            &format!("/api/activities/{}", a_id),
            Some(serde_json::json!({ "status": "Completed" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(updated["end_time"].is_string());
        assert_eq!(updated["begin_time"], updated["end_time"]);

        let (_, b_after) = send(&app, Method::GET, &format!("/api/activities/{}", b_id), None).await;
        assert_eq!(b_after["begin_time"], updated["end_time"]);
    }

    #[tokio::test]
    async fn test_delete_is_204_then_404() {
        let env = TestEnv::new();
        let (app, _rx) = app(&env);
        let (_, a) = send(
            &app,
            Method::POST,
            "/api/activities",
            Some(serde_json::json!({ "title": "A" })),
        )
        .await;
        let uri = format!("/api/activities/{}", a["id"].as_str().unwrap());

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_settings_put_requires_phases_and_statuses() {
        let env = TestEnv::new();
        let (app, _rx) = app(&env);

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/settings",
            Some(serde_json::json!({ "phases": ["Only"] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid settings format");

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/settings",
            Some(serde_json::json!({ "phases": ["Only"], "statuses": ["Open", "Done"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["statuses"][1], "Done");

        let (_, shown) = send(&app, Method::GET, "/api/settings", None).await;
        assert_eq!(shown["phases"][0], "Only");
        assert_eq!(shown["appName"], "Production Planner");
    }
}
