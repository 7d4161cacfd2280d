//! GilRs joystick provider
//!
//! Runs the (non-Send) gilrs event pump on a dedicated thread and forwards
//! standardized events to the async world over an unbounded channel. Each
//! stick is buffered and evaluated as an X/Y pair, so a single axis change
//! produces one combined vector update for its side.

use anyhow::{anyhow, Result};
use gilrs::{Axis, Button, Event, EventType, Gilrs};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::axis::{process_stick, AxisVector, Side, StickBuffer};
use crate::config::JoystickConfig;

/// Standardized joystick event
#[derive(Debug, Clone, PartialEq)]
pub enum JoystickEvent {
    /// Continuous vector update for one side
    Move { side: Side, vector: AxisVector },
    /// The stick returned to center
    Release { side: Side },
    /// The configured emergency-stop button was pressed
    EmergencyStop,
}

/// Per-side tracking used by the event loop
#[derive(Debug, Default)]
struct SideState {
    buffer: StickBuffer,
    /// True while the stick is deflected outside the deadzone
    active: bool,
    last_sent: Option<AxisVector>,
}

/// GilRs-based joystick provider
pub struct JoystickProvider {
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl JoystickProvider {
    /// Start the provider thread
    ///
    /// Returns the provider handle and the event receiver. The configured
    /// emergency-stop button is validated up front so a typo in the config
    /// is caught at startup rather than silently ignored.
    pub fn start(config: JoystickConfig) -> Result<(Self, mpsc::UnboundedReceiver<JoystickEvent>)> {
        let estop_button = parse_button(&config.emergency_stop_button).ok_or_else(|| {
            anyhow!(
                "Unknown emergency stop button '{}'",
                config.emergency_stop_button
            )
        })?;

        let (event_tx, event_rx) = mpsc::unbounded_channel::<JoystickEvent>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

        std::thread::spawn(move || {
            Self::event_loop_blocking(config, estop_button, event_tx, shutdown_rx);
        });

        Ok((
            Self {
                shutdown_tx: Some(shutdown_tx),
            },
            event_rx,
        ))
    }

    /// Main event loop (runs in dedicated blocking thread)
    fn event_loop_blocking(
        config: JoystickConfig,
        estop_button: Button,
        event_tx: mpsc::UnboundedSender<JoystickEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        // gilrs is initialized in this thread because it is not Send-safe
        let mut gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("GilRs initialized");
                g
            },
            Err(e) => {
                warn!("Failed to initialize GilRs: {}", e);
                return;
            },
        };

        let connected: Vec<_> = gilrs
            .gamepads()
            .filter(|(_, gp)| gp.is_connected())
            .map(|(id, gp)| (id, gp.name().to_string()))
            .collect();

        if connected.is_empty() {
            warn!("No gamepads detected, waiting for hot-plug");
        } else {
            info!("Found {} connected gamepad(s):", connected.len());
            for (id, name) in &connected {
                info!("  - {:?}: \"{}\"", id, name);
            }
        }

        let mut sides: HashMap<Side, SideState> = HashMap::new();

        loop {
            // Check for shutdown signal (non-blocking)
            match shutdown_rx.try_recv() {
                Ok(_) | Err(mpsc::error::TryRecvError::Disconnected) => {
                    info!("Joystick provider shutting down");
                    break;
                },
                Err(mpsc::error::TryRecvError::Empty) => {},
            }

            while let Some(Event { event, .. }) = gilrs.next_event() {
                for joystick_event in convert_event(event, estop_button, &config, &mut sides) {
                    debug!("Joystick event: {:?}", joystick_event);

                    if event_tx.send(joystick_event).is_err() {
                        warn!("Event receiver dropped, shutting down joystick loop");
                        return;
                    }
                }
            }

            // Sleep briefly to avoid busy-waiting
            std::thread::sleep(Duration::from_millis(4));
        }
    }

    /// Shutdown the provider
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
            info!("Joystick provider shutdown requested");
        }
    }
}

impl Drop for JoystickProvider {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Convert a gilrs event into zero or more standardized joystick events
fn convert_event(
    event: EventType,
    estop_button: Button,
    config: &JoystickConfig,
    sides: &mut HashMap<Side, SideState>,
) -> Vec<JoystickEvent> {
    match event {
        EventType::ButtonPressed(button, _) => handle_button(button, estop_button)
            .into_iter()
            .collect(),
        EventType::AxisChanged(axis, value, _) => {
            let (side, horizontal) = match axis {
                Axis::LeftStickX => (Side::Left, true),
                Axis::LeftStickY => (Side::Left, false),
                Axis::RightStickX => (Side::Right, true),
                Axis::RightStickY => (Side::Right, false),
                _ => return vec![],
            };

            let state = sides.entry(side).or_default();
            handle_axis(state, side, horizontal, value, config)
                .into_iter()
                .collect()
        },
        EventType::Disconnected => {
            debug!("Gamepad disconnected");
            handle_disconnect(sides)
        },
        EventType::Connected => {
            debug!("Gamepad connected");
            vec![]
        },
        _ => vec![],
    }
}

/// Only the configured emergency-stop button is acted on
fn handle_button(button: Button, estop_button: Button) -> Option<JoystickEvent> {
    if button == estop_button {
        Some(JoystickEvent::EmergencyStop)
    } else {
        None
    }
}

/// A controller vanishing mid-drive must read as its deflected sticks released
fn handle_disconnect(sides: &mut HashMap<Side, SideState>) -> Vec<JoystickEvent> {
    let mut released = Vec::new();
    for (side, state) in sides.iter_mut() {
        if let Some(event) = release_if_active(state, *side) {
            released.push(event);
        }
        state.buffer = StickBuffer::default();
    }
    released
}

/// Fold one axis change into its side's buffered state
///
/// Emits `Move` when the processed vector changed, `Release` the first time
/// the stick falls back inside the deadzone, nothing otherwise.
fn handle_axis(
    state: &mut SideState,
    side: Side,
    horizontal: bool,
    value: f32,
    config: &JoystickConfig,
) -> Option<JoystickEvent> {
    if horizontal {
        state.buffer.x = value;
    } else {
        state.buffer.y = value;
    }

    match process_stick(state.buffer, side, config) {
        Some(vector) => {
            if state.last_sent == Some(vector) {
                return None;
            }
            state.active = true;
            state.last_sent = Some(vector);
            Some(JoystickEvent::Move { side, vector })
        },
        None => release_if_active(state, side),
    }
}

/// Emit a `Release` once when a previously deflected stick recenters
fn release_if_active(state: &mut SideState, side: Side) -> Option<JoystickEvent> {
    if !state.active {
        return None;
    }
    state.active = false;
    state.last_sent = Some(AxisVector::ZERO);
    Some(JoystickEvent::Release { side })
}

/// Parse a configured button name into a gilrs button
fn parse_button(name: &str) -> Option<Button> {
    let button = match name {
        "south" => Button::South,
        "east" => Button::East,
        "north" => Button::North,
        "west" => Button::West,
        "left_trigger" => Button::LeftTrigger,
        "right_trigger" => Button::RightTrigger,
        "left_trigger2" => Button::LeftTrigger2,
        "right_trigger2" => Button::RightTrigger2,
        "left_thumb" => Button::LeftThumb,
        "right_thumb" => Button::RightThumb,
        "select" => Button::Select,
        "start" => Button::Start,
        "mode" => Button::Mode,
        "dpad_up" => Button::DPadUp,
        "dpad_down" => Button::DPadDown,
        "dpad_left" => Button::DPadLeft,
        "dpad_right" => Button::DPadRight,
        _ => return None,
    };
    Some(button)
}

/// List connected gamepads for the `--list-gamepads` diagnostic
pub fn list_gamepads_formatted() -> Result<()> {
    use colored::*;

    let gilrs = Gilrs::new().map_err(|e| anyhow!("Failed to initialize GilRs: {}", e))?;

    println!("\n{}", "=== Connected Gamepads ===".bold().cyan());

    let mut count = 0;
    for (id, gamepad) in gilrs.gamepads() {
        if gamepad.is_connected() {
            count += 1;
            println!("  {:?}: {}", id, gamepad.name().green());
        }
    }

    if count == 0 {
        println!("  {}", "(none)".yellow());
    }

    Ok(())
}
