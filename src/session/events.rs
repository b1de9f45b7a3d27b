//! Session Events
//!
//! Everything a presentation layer or notification sink observes is
//! broadcast as a `SessionEvent`.

use serde::{Deserialize, Serialize};

use super::state::Mode;

/// Events emitted by the session controller and the fallback simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    /// A transition completed
    #[serde(rename_all = "camelCase")]
    StatusChanged {
        old_mode: Mode,
        new_mode: Mode,
        status: String,
    },

    /// User-facing notice (external revocation)
    Notice(Notice),

    /// One simulated character was appended to the activity log
    Activity {
        character: char,
        length: usize,
    },

    /// The viewport moved
    Scrolled {
        offset: i64,
    },
}

impl SessionEvent {
    /// Channel name for front ends that route by event kind
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::StatusChanged { .. } => "session-status",
            Self::Notice(_) => "session-notice",
            Self::Activity { .. } => "session-activity",
            Self::Scrolled { .. } => "session-scroll",
        }
    }
}

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Default,
    Destructive,
}

/// Structured notice for the notification sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    /// Notice emitted when the platform revokes a held lock
    pub fn released_externally() -> Self {
        Self {
            title: "Wake Lock Released".to_string(),
            description: "Screen lock prevention was stopped by the platform.".to_string(),
            severity: Severity::Destructive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let event = SessionEvent::Activity {
            character: 'P',
            length: 1,
        };
        assert_eq!(event.event_name(), "session-activity");
        assert_eq!(
            SessionEvent::Notice(Notice::released_externally()).event_name(),
            "session-notice"
        );
    }

    #[test]
    fn test_status_event_json_shape() {
        let event = SessionEvent::StatusChanged {
            old_mode: Mode::Idle,
            new_mode: Mode::NativeLock,
            status: "Wake Lock Active".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "statusChanged");
        assert_eq!(json["oldMode"], "idle");
        assert_eq!(json["newMode"], "nativeLock");
        assert_eq!(json["status"], "Wake Lock Active");
    }

    #[test]
    fn test_notice_json_shape() {
        let json = serde_json::to_value(SessionEvent::Notice(Notice::released_externally())).unwrap();
        assert_eq!(json["type"], "notice");
        assert_eq!(json["title"], "Wake Lock Released");
        assert_eq!(json["severity"], "destructive");
    }
}
