//! Wire messages exchanged with the robot control server
//!
//! Both directions use adjacently tagged JSON frames of the form
//! `{"event": "...", "data": {...}}`. Frames that fail to parse are dropped
//! at the transport boundary, never forwarded into the session.

use serde::{Deserialize, Serialize};

/// Snapshot of both stick vectors at send time.
///
/// Created fresh for every send; field values are forwarded exactly as read
/// from the sticks, with no rounding or scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlMessage {
    pub left_x: f32,
    pub left_y: f32,
    pub right_x: f32,
    pub right_y: f32,
}

/// Events sent to the robot control server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Combined movement/steering update
    Move(ControlMessage),
    /// Halt the motors immediately; carries no payload
    EmergencyStop,
}

/// Status discriminator reported by the server
///
/// Only `Error` changes the operator display; the rest are acknowledgments
/// the server sends after handling our events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Connected,
    Ok,
    Stopped,
    Error,
    #[serde(other)]
    Unknown,
}

/// Events received from the robot control server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Status {
        status: ServerStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Log {
        message: String,
    },
}
