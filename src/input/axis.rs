//! Stick state and axis processing (deadzone, inversion)

use crate::config::JoystickConfig;

/// Which physical stick a reading belongs to.
///
/// The left stick drives movement, the right stick steering.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Axis ids used for per-axis configuration lookups
    pub fn axis_ids(self) -> (&'static str, &'static str) {
        match self {
            Side::Left => ("lx", "ly"),
            Side::Right => ("rx", "ry"),
        }
    }
}

/// Buffered raw stick state
///
/// GilRs reports one axis at a time; the buffer keeps the most recent X and Y
/// so the pair can be evaluated together whenever either changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StickBuffer {
    pub x: f32,
    pub y: f32,
}

/// Normalized 2D stick reading, components in [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisVector {
    pub x: f32,
    pub y: f32,
}

impl AxisVector {
    pub const ZERO: AxisVector = AxisVector { x: 0.0, y: 0.0 };
}

/// Evaluate a buffered stick pair against the radial deadzone.
///
/// Returns `None` when the stick rests inside the deadzone (reads as
/// centered). Outside it, the raw components are passed through unmodified
/// apart from configured per-axis inversion.
pub fn process_stick(buffer: StickBuffer, side: Side, config: &JoystickConfig) -> Option<AxisVector> {
    let magnitude = (buffer.x * buffer.x + buffer.y * buffer.y).sqrt();
    if magnitude < config.deadzone {
        return None;
    }

    let (x_id, y_id) = side.axis_ids();
    Some(AxisVector {
        x: apply_inversion(buffer.x, x_id, config),
        y: apply_inversion(buffer.y, y_id, config),
    })
}

/// Apply axis inversion if configured
pub fn apply_inversion(value: f32, axis_id: &str, config: &JoystickConfig) -> f32 {
    if config.invert.get(axis_id).copied().unwrap_or(false) {
        -value
    } else {
        value
    }
}
