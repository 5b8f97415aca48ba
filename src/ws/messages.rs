//! WebSocket message envelope for server-originated frames.
//!
//! Chat text sent by clients is relayed verbatim; frames produced by the
//! server (trade notifications, errors) are wrapped in [`WsMessage`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Server-generated message id.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

/// Discriminator for server-originated messages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Server → Client domain event.
    Event,
    /// Server → Client error.
    Error,
}

impl WsMessage {
    /// Wraps `payload` in a fresh envelope.
    #[must_use]
    pub fn new(msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Wraps a serializable domain event.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if `event` cannot be serialized.
    pub fn event<T: Serialize>(event: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(WsMessageType::Event, serde_json::to_value(event)?))
    }

    /// Serializes the envelope to a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn envelope_uses_type_key() {
        let msg = WsMessage::new(WsMessageType::Error, serde_json::json!({"code": 400}));
        let Ok(json) = msg.to_json() else {
            panic!("serialization failed");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&json) else {
            panic!("invalid json");
        };
        assert_eq!(value["type"], "error");
        assert_eq!(value["payload"]["code"], 400);
        assert_eq!(msg.id.len(), 36);
    }
}
