use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PushError;

/// Kitchen-side lifecycle of an order, as carried on the wire and by the
/// authoritative REST read path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Preparing,
    Ready,
    Served,
    #[serde(other)]
    Other,
}

/// Wire `type` discriminator for inbound order frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEventKind {
    New,
    StatusChanged,
    Updated,
}

/// A typed, immutable order notification produced from a validated frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEvent {
    #[serde(rename = "type")]
    pub kind: OrderEventKind,
    pub venue_id: String,
    pub order_id: String,
    pub order_number: i64,
    pub status: OrderStatus,
    #[serde(default)]
    pub payload: Value,
}

/// Authoritative order entity as served by the REST API. Referenced by the
/// urgency classifier, never mutated here.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Parse one inbound frame.
///
/// Returns `Ok(Some(event))` for a recognized frame, `Ok(None)` for a
/// well-formed frame whose `type` we do not know (ignored, not an error),
/// and `Err` for JSON that is malformed or missing required fields.
pub fn parse_frame(text: &str) -> Result<Option<OrderEvent>, PushError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| PushError::Protocol(e.to_string()))?;

    let kind = value
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or_else(|| PushError::Protocol("frame missing type discriminator".to_string()))?;

    match kind {
        "new" | "status_changed" | "updated" => {
            let event: OrderEvent =
                serde_json::from_value(value).map_err(|e| PushError::Protocol(e.to_string()))?;
            Ok(Some(event))
        }
        _ => Ok(None),
    }
}
