//! Web Front End
//!
//! HTTP + WebSocket surface over the keep-awake session:
//! - `GET  /api/status`  current status snapshot
//! - `POST /api/toggle`  start or stop
//! - `POST /api/start`, `POST /api/stop`
//! - `GET  /api/log`     simulated activity log
//! - `GET  /api/events`  WebSocket stream of session events

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use log::{debug, info, warn};
use std::net::SocketAddr;
use tokio::sync::broadcast::{self, error::RecvError};
use tower_http::cors::CorsLayer;

use crate::commands::session::{
    event_payload, get_activity_log, get_status, start_keep_awake, stop_keep_awake,
    toggle_keep_awake, ActivityLogView, KeepAwakeState,
};
use crate::session::{SessionEvent, StatusSnapshot};

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn api_error(err: String) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, err)
}

/// Build the router for a session
pub fn router(state: KeepAwakeState) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/toggle", post(toggle_handler))
        .route("/api/start", post(start_handler))
        .route("/api/stop", post(stop_handler))
        .route("/api/log", get(log_handler))
        .route("/api/events", get(events_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until Ctrl-C, then tear the session down
pub async fn serve(state: KeepAwakeState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Web server listening on http://{}", addr);

    let app = router(state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    state.0.shutdown().await;
    Ok(())
}

async fn status_handler(State(state): State<KeepAwakeState>) -> ApiResult<StatusSnapshot> {
    get_status(&state).await.map(Json).map_err(api_error)
}

async fn toggle_handler(State(state): State<KeepAwakeState>) -> ApiResult<StatusSnapshot> {
    toggle_keep_awake(&state).await.map(Json).map_err(api_error)
}

async fn start_handler(State(state): State<KeepAwakeState>) -> ApiResult<StatusSnapshot> {
    start_keep_awake(&state).await.map(Json).map_err(api_error)
}

async fn stop_handler(State(state): State<KeepAwakeState>) -> ApiResult<StatusSnapshot> {
    stop_keep_awake(&state).await.map(Json).map_err(api_error)
}

async fn log_handler(State(state): State<KeepAwakeState>) -> ApiResult<ActivityLogView> {
    get_activity_log(&state).await.map(Json).map_err(api_error)
}

async fn events_handler(
    ws: WebSocketUpgrade,
    State(state): State<KeepAwakeState>,
) -> impl IntoResponse {
    let rx = state.0.subscribe();
    ws.on_upgrade(move |socket| stream_events(socket, rx))
}

async fn stream_events(mut socket: WebSocket, mut rx: broadcast::Receiver<SessionEvent>) {
    debug!("Event stream client connected");
    loop {
        match rx.recv().await {
            Ok(event) => {
                let text = event_payload(&event).to_string();
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Event stream lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
    debug!("Event stream client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeepAwakeConfig;
    use crate::platform::NoCapability;
    use crate::session::SessionController;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> (Router, KeepAwakeState) {
        let state = KeepAwakeState::new(SessionController::new(
            &KeepAwakeConfig::default(),
            Arc::new(NoCapability),
        ));
        (router(state.clone()), state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let (app, _state) = app();
        let response = app
            .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "Stopped");
        assert_eq!(json["isActive"], false);
    }

    #[tokio::test]
    async fn test_toggle_endpoint() {
        let (app, state) = app();
        let response = app
            .clone()
            .oneshot(Request::post("/api/toggle").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["status"], "Fallback Active");
        assert_eq!(json["mode"], "fallback");

        let response = app
            .oneshot(Request::post("/api/stop").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["status"], "Stopped");
        assert!(!state.0.is_active());
    }

    #[tokio::test]
    async fn test_log_endpoint() {
        let (app, _state) = app();
        let response = app
            .oneshot(Request::get("/api/log").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["text"], "");
        assert_eq!(json["readPosition"], 0);
    }
}
