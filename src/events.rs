// Events that flow from the transport task to the TUI and storage components
//
// The stream adapter turns raw frames into these typed events; the TUI
// consumes them to update the transcript and trigger re-renders, and storage
// writes them to the session log. Using an enum keeps the channel contract
// pattern-matchable and serializable in one place.

use crate::protocol::{SurfaceOp, UserAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Main event type that flows through the application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")] // Creates JSON like {"type": "OpApplied", ...}
pub enum AppEvent {
    /// The user sent a chat message
    UserMessage {
        timestamp: DateTime<Utc>,
        content: String,
    },

    /// Assistant text for the current turn (replace, not append: the agent
    /// streams the full text so far)
    AssistantText {
        timestamp: DateTime<Utc>,
        content: String,
    },

    /// A protocol operation was applied to the session's surface store
    OpApplied {
        timestamp: DateTime<Utc>,
        op: SurfaceOp,
    },

    /// A user action was forwarded to the agent endpoint
    ActionSent {
        timestamp: DateTime<Utc>,
        action: UserAction,
    },

    /// The turn's frame stream finished cleanly
    TurnComplete {
        timestamp: DateTime<Utc>,
        surface_id: Option<String>,
    },

    /// The turn failed (transport fault or agent-reported error). Surfaces
    /// keep whatever state was applied before the failure.
    TurnFailed {
        timestamp: DateTime<Utc>,
        message: String,
    },
}

impl AppEvent {
    pub fn now_user_message(content: impl Into<String>) -> Self {
        AppEvent::UserMessage {
            timestamp: Utc::now(),
            content: content.into(),
        }
    }

    pub fn now_turn_failed(message: impl Into<String>) -> Self {
        AppEvent::TurnFailed {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

/// Requests from the TUI to the transport task
#[derive(Debug, Clone)]
pub enum ClientCommand {
    /// Start a chat turn with this user message
    SendMessage { content: String },

    /// Report a user action; answered with a fresh frame stream
    SendAction {
        surface_id: String,
        component_id: String,
        action: String,
        data: Option<serde_json::Value>,
    },
}

/// Summary statistics for the status bar
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub turns_completed: usize,
    pub turns_failed: usize,
    pub ops_applied: usize,
    pub actions_sent: usize,
}

impl Stats {
    /// Update counters from one event
    pub fn observe(&mut self, event: &AppEvent) {
        match event {
            AppEvent::OpApplied { .. } => self.ops_applied += 1,
            AppEvent::ActionSent { .. } => self.actions_sent += 1,
            AppEvent::TurnComplete { .. } => self.turns_completed += 1,
            AppEvent::TurnFailed { .. } => self.turns_failed += 1,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::builder;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = AppEvent::OpApplied {
            timestamp: Utc::now(),
            op: builder::delete_surface("s1"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "OpApplied");
        assert_eq!(json["op"]["type"], "deleteSurface");
    }

    #[test]
    fn test_stats_observe() {
        let mut stats = Stats::default();
        stats.observe(&AppEvent::OpApplied {
            timestamp: Utc::now(),
            op: builder::delete_surface("s1"),
        });
        stats.observe(&AppEvent::TurnComplete {
            timestamp: Utc::now(),
            surface_id: None,
        });
        stats.observe(&AppEvent::now_turn_failed("boom"));

        assert_eq!(stats.ops_applied, 1);
        assert_eq!(stats.turns_completed, 1);
        assert_eq!(stats.turns_failed, 1);
        assert_eq!(stats.actions_sent, 0);
    }
}
