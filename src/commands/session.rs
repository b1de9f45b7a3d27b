//! Session Commands
//!
//! Front-end commands for the keep-awake session. The web server and the
//! terminal runner both go through these.

use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

use crate::session::{SessionController, SessionEvent, StatusSnapshot};

/// Shared session state handed to front ends
#[derive(Clone)]
pub struct KeepAwakeState(pub Arc<SessionController>);

impl KeepAwakeState {
    pub fn new(controller: SessionController) -> Self {
        Self(Arc::new(controller))
    }
}

/// Activity log view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogView {
    pub text: String,
    pub read_position: usize,
}

/// Get the current status
pub async fn get_status(state: &KeepAwakeState) -> Result<StatusSnapshot, String> {
    Ok(state.0.snapshot())
}

/// Toggle keep-awake on or off
pub async fn toggle_keep_awake(state: &KeepAwakeState) -> Result<StatusSnapshot, String> {
    info!("Toggle requested");
    state.0.toggle().await;
    Ok(state.0.snapshot())
}

/// Start keep-awake
pub async fn start_keep_awake(state: &KeepAwakeState) -> Result<StatusSnapshot, String> {
    state.0.start().await;
    Ok(state.0.snapshot())
}

/// Stop keep-awake
pub async fn stop_keep_awake(state: &KeepAwakeState) -> Result<StatusSnapshot, String> {
    state.0.stop().await;
    Ok(state.0.snapshot())
}

/// Get the simulated activity log
pub async fn get_activity_log(state: &KeepAwakeState) -> Result<ActivityLogView, String> {
    let snapshot = state.0.snapshot();
    Ok(ActivityLogView {
        text: snapshot.log,
        read_position: snapshot.read_position,
    })
}

/// Envelope used when forwarding events to a front end
pub fn event_payload(event: &SessionEvent) -> serde_json::Value {
    let payload = serde_json::to_value(event).unwrap_or_else(|e| {
        debug!("Failed to serialize session event: {}", e);
        serde_json::Value::Null
    });

    serde_json::json!({
        "event": event.event_name(),
        "payload": payload,
    })
}
