//! Control session
//!
//! The one object that owns the transport handle and the two stick vectors.
//! It is constructed once per run and driven mutably from the main event
//! loop, so the vectors are only ever touched from one task and need no
//! locking. Every joystick event updates local state first, then forwards a
//! fresh snapshot of both sides to the server.

use tracing::debug;

use crate::input::{AxisVector, JoystickEvent, Side};
use crate::messages::{ClientEvent, ControlMessage, ServerEvent, ServerStatus};
use crate::status::{Severity, StatusReporter};
use crate::transport::{TransportEvent, TransportHandle};
use crate::video::VideoSignal;

pub struct ControlSession {
    transport: TransportHandle,
    reporter: StatusReporter,
    left: AxisVector,
    right: AxisVector,
}

impl ControlSession {
    pub fn new(transport: TransportHandle, reporter: StatusReporter) -> Self {
        Self {
            transport,
            reporter,
            left: AxisVector::ZERO,
            right: AxisVector::ZERO,
        }
    }

    /// Apply one joystick event and forward the resulting state
    pub fn handle_joystick(&mut self, event: JoystickEvent) {
        match event {
            JoystickEvent::Move { side, vector } => {
                *self.vector_mut(side) = vector;
                self.send_control();
            },
            JoystickEvent::Release { side } => {
                *self.vector_mut(side) = AxisVector::ZERO;
                self.send_control();
                match side {
                    Side::Left => self.reporter.add_log_entry("Movement stopped"),
                    Side::Right => self.reporter.add_log_entry("Steering centered"),
                }
            },
            JoystickEvent::EmergencyStop => self.emergency_stop(),
        }
    }

    /// Emit `emergency_stop` and zero both sides locally
    ///
    /// No zeroed `move` follows: the server's emergency_stop handler halts
    /// the motors itself. The zeroed local vectors show up in the next
    /// regular send.
    pub fn emergency_stop(&mut self) {
        self.transport.emit(ClientEvent::EmergencyStop);
        self.left = AxisVector::ZERO;
        self.right = AxisVector::ZERO;
        self.reporter.add_log_entry("EMERGENCY STOP ACTIVATED");
    }

    /// Snapshot both vectors into one control message and forward it
    ///
    /// One message per triggering input event; no batching, no rate limiting.
    fn send_control(&mut self) {
        let message = ControlMessage {
            left_x: self.left.x,
            left_y: self.left.y,
            right_x: self.right.x,
            right_y: self.right.y,
        };
        debug!(
            "move: L({:.3},{:.3}) R({:.3},{:.3})",
            message.left_x, message.left_y, message.right_x, message.right_y
        );
        self.transport.emit(ClientEvent::Move(message));
    }

    /// Reflect a transport event on the operator surface
    pub fn handle_transport(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                self.reporter.update_status("Connected", Severity::Success);
                self.reporter
                    .add_log_entry("Connected to robot control server");
            },
            TransportEvent::Disconnected => {
                self.reporter.update_status("Disconnected", Severity::Danger);
                self.reporter
                    .add_log_entry("Disconnected from robot control server");
            },
            TransportEvent::Event(ServerEvent::Status { status, message }) => {
                // Non-error statuses are acknowledgments, not display changes
                if status == ServerStatus::Error {
                    let message = message.unwrap_or_else(|| "Unknown error".to_string());
                    self.reporter.update_status(message.clone(), Severity::Danger);
                    self.reporter.add_log_entry(format!("Error: {}", message));
                }
            },
            TransportEvent::Event(ServerEvent::Log { message }) => {
                self.reporter.add_log_entry(message);
            },
        }
    }

    /// Reflect a video feed signal on the banner; last writer wins
    pub fn handle_video(&mut self, signal: VideoSignal) {
        match signal {
            VideoSignal::Active => {
                self.reporter.update_video("Video feed active", Severity::Success);
            },
            VideoSignal::Unavailable => {
                self.reporter
                    .update_video("Video feed unavailable", Severity::Danger);
            },
        }
    }

    pub fn reporter(&self) -> &StatusReporter {
        &self.reporter
    }

    fn vector_mut(&mut self, side: Side) -> &mut AxisVector {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tokio::sync::mpsc::error::TryRecvError;

    fn make_session() -> (ControlSession, tokio::sync::mpsc::UnboundedReceiver<ClientEvent>) {
        let (transport, rx) = TransportHandle::stub();
        let session = ControlSession::new(transport, StatusReporter::new(true));
        (session, rx)
    }

    #[test]
    fn move_sends_snapshot_of_both_sides() {
        let (mut session, mut rx) = make_session();

        session.handle_joystick(JoystickEvent::Move {
            side: Side::Left,
            vector: AxisVector { x: 0.5, y: -0.5 },
        });
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::Move(ControlMessage {
                left_x: 0.5,
                left_y: -0.5,
                right_x: 0.0,
                right_y: 0.0,
            })
        );

        // A right-side update carries the latest left values unchanged
        session.handle_joystick(JoystickEvent::Move {
            side: Side::Right,
            vector: AxisVector { x: 1.0, y: 0.25 },
        });
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::Move(ControlMessage {
                left_x: 0.5,
                left_y: -0.5,
                right_x: 1.0,
                right_y: 0.25,
            })
        );
    }

    #[test]
    fn release_zeroes_one_side_and_keeps_the_other() {
        let (mut session, mut rx) = make_session();

        session.handle_joystick(JoystickEvent::Move {
            side: Side::Left,
            vector: AxisVector { x: 0.3, y: 0.4 },
        });
        session.handle_joystick(JoystickEvent::Move {
            side: Side::Right,
            vector: AxisVector { x: -0.8, y: 0.0 },
        });
        rx.try_recv().unwrap();
        rx.try_recv().unwrap();

        session.handle_joystick(JoystickEvent::Release { side: Side::Left });
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::Move(ControlMessage {
                left_x: 0.0,
                left_y: 0.0,
                right_x: -0.8,
                right_y: 0.0,
            })
        );
        assert!(session
            .reporter()
            .log()
            .iter()
            .any(|entry| entry.message == "Movement stopped"));
    }

    #[test]
    fn emergency_stop_zeroes_both_and_emits_no_move() {
        let (mut session, mut rx) = make_session();

        session.handle_joystick(JoystickEvent::Move {
            side: Side::Left,
            vector: AxisVector { x: 1.0, y: 1.0 },
        });
        rx.try_recv().unwrap();

        session.handle_joystick(JoystickEvent::EmergencyStop);
        assert_eq!(rx.try_recv().unwrap(), ClientEvent::EmergencyStop);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        // The zeroed vectors show up in the next regular send
        session.handle_joystick(JoystickEvent::Move {
            side: Side::Right,
            vector: AxisVector { x: 0.1, y: 0.0 },
        });
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::Move(ControlMessage {
                left_x: 0.0,
                left_y: 0.0,
                right_x: 0.1,
                right_y: 0.0,
            })
        );
        assert!(session
            .reporter()
            .log()
            .iter()
            .any(|entry| entry.message == "EMERGENCY STOP ACTIVATED"));
    }

    #[test]
    fn connect_and_disconnect_drive_the_status_line() {
        let (mut session, _rx) = make_session();

        session.handle_transport(TransportEvent::Connected);
        assert_eq!(
            session.reporter().status(),
            Some(&("Connected".to_string(), Severity::Success))
        );

        session.handle_transport(TransportEvent::Disconnected);
        assert_eq!(
            session.reporter().status(),
            Some(&("Disconnected".to_string(), Severity::Danger))
        );
    }

    #[test]
    fn non_error_status_is_ignored() {
        let (mut session, _rx) = make_session();

        session.handle_transport(TransportEvent::Connected);
        session.handle_transport(TransportEvent::Event(ServerEvent::Status {
            status: ServerStatus::Ok,
            message: Some("x".to_string()),
        }));

        assert_eq!(
            session.reporter().status(),
            Some(&("Connected".to_string(), Severity::Success))
        );
    }

    #[test]
    fn error_status_replaces_the_display_with_its_message() {
        let (mut session, _rx) = make_session();

        session.handle_transport(TransportEvent::Event(ServerEvent::Status {
            status: ServerStatus::Error,
            message: Some("Motor fault".to_string()),
        }));

        assert_eq!(
            session.reporter().status(),
            Some(&("Motor fault".to_string(), Severity::Danger))
        );
        assert!(session
            .reporter()
            .log()
            .iter()
            .any(|entry| entry.message == "Error: Motor fault"));
    }

    #[test]
    fn server_log_events_append() {
        let (mut session, _rx) = make_session();

        session.handle_transport(TransportEvent::Event(ServerEvent::Log {
            message: "Motor controller initialized".to_string(),
        }));

        assert_eq!(session.reporter().log().len(), 1);
    }

    #[test]
    fn video_signals_drive_the_banner_last_writer_wins() {
        let (mut session, _rx) = make_session();

        session.handle_video(VideoSignal::Active);
        session.handle_video(VideoSignal::Unavailable);

        let (banner, severity) = session.reporter().video_banner().unwrap();
        assert!(banner.contains("unavailable"));
        assert_eq!(*severity, Severity::Danger);

        session.handle_video(VideoSignal::Active);
        let (banner, severity) = session.reporter().video_banner().unwrap();
        assert!(banner.contains("active"));
        assert_eq!(*severity, Severity::Success);
    }

    proptest! {
        // The composer forwards vector components exactly, no transformation
        #[test]
        fn control_message_mirrors_vectors_exactly(
            lx in -1.0f32..=1.0,
            ly in -1.0f32..=1.0,
            rx_axis in -1.0f32..=1.0,
            ry in -1.0f32..=1.0,
        ) {
            let (mut session, mut rx) = make_session();

            session.handle_joystick(JoystickEvent::Move {
                side: Side::Left,
                vector: AxisVector { x: lx, y: ly },
            });
            session.handle_joystick(JoystickEvent::Move {
                side: Side::Right,
                vector: AxisVector { x: rx_axis, y: ry },
            });

            rx.try_recv().unwrap();
            let sent = rx.try_recv().unwrap();
            prop_assert_eq!(
                sent,
                ClientEvent::Move(ControlMessage {
                    left_x: lx,
                    left_y: ly,
                    right_x: rx_axis,
                    right_y: ry,
                })
            );
        }
    }
}
