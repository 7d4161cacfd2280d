//! Gamepad input support using GilRs
//!
//! Maps the two sticks of one gamepad onto the rover's movement (left) and
//! steering (right) channels, with a configurable emergency-stop button.

pub mod axis;
pub mod joystick;

pub use axis::{AxisVector, Side};
pub use joystick::{list_gamepads_formatted, JoystickEvent, JoystickProvider};
