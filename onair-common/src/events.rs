//! Engagement event types
//!
//! Events are broadcast in-process via the engagement server's SSE
//! broadcaster and serialized for transmission. Clients that cannot hold the
//! stream fall back to polling the REST endpoints; every event here is also
//! recoverable from the durable store.

use crate::api::{ChatMessage, Milestone};
use serde::{Deserialize, Serialize};

/// OnAir engagement event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngagementEvent {
    /// A durable chat message was accepted and persisted.
    ///
    /// The author's own client also receives this echo of its optimistic
    /// insert; merge boundaries deduplicate by `message.id`.
    ChatMessagePosted { message: ChatMessage },

    /// An ephemeral reaction was accepted. Rendered as a transient overlay,
    /// excluded from the durable message list.
    ReactionPosted { message: ChatMessage },

    /// A milestone row was appended to the activity stream
    MilestoneRecorded { milestone: Milestone },
}

impl EngagementEvent {
    /// SSE event name for this variant
    pub fn event_name(&self) -> &'static str {
        match self {
            EngagementEvent::ChatMessagePosted { .. } => "chat_message",
            EngagementEvent::ReactionPosted { .. } => "reaction",
            EngagementEvent::MilestoneRecorded { .. } => "milestone",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MilestoneKind;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = EngagementEvent::MilestoneRecorded {
            milestone: Milestone {
                id: "m-1".to_string(),
                kind: MilestoneKind::ListeningHours,
                identity_key: Some("l-1".to_string()),
                metadata: serde_json::json!({ "hours": 10 }),
                created_at: 1_700_000_000_000,
            },
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "MilestoneRecorded");
        assert_eq!(value["milestone"]["kind"], "listening_hours");
        assert_eq!(event.event_name(), "milestone");
    }
}
