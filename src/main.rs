//! Rover Remote - operator console for the robot control server
//!
//! Reads the two sticks of a gamepad, forwards the combined state over a
//! persistent WebSocket to the robot controller, and mirrors connection,
//! log, and video feed status on the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod input;
mod messages;
mod session;
mod status;
mod transport;
mod video;

use crate::config::AppConfig;
use crate::input::JoystickProvider;
use crate::session::ControlSession;
use crate::status::StatusReporter;
use crate::transport::TransportHandle;
use crate::video::VideoSignal;

/// Rover Remote - drive a two-stick rover from a gamepad over WebSocket
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// List connected gamepads
    #[arg(long)]
    list_gamepads: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level)?;

    info!("Starting Rover Remote...");

    // Handle list gamepads
    if args.list_gamepads {
        input::list_gamepads_formatted()?;
        return Ok(());
    }

    info!("Configuration file: {}", args.config);
    let config = AppConfig::load(&args.config).await?;
    info!("Configuration loaded successfully");

    // Set up shutdown signal
    let shutdown_signal = shutdown_signal();

    run_app(config, shutdown_signal).await?;

    info!("Rover Remote shutdown complete");
    Ok(())
}

async fn run_app(config: AppConfig, shutdown: impl std::future::Future<Output = ()>) -> Result<()> {
    let mut reporter = StatusReporter::new(config.log_panel.enabled);

    // Connect to the robot control server
    let (transport, mut transport_rx) = TransportHandle::connect(&config.transport.url)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to robot control server at {}",
                config.transport.url
            )
        })?;

    // Start joystick input; the console stays usable without it
    let (_provider, mut joystick_rx) = match JoystickProvider::start(config.joystick.clone()) {
        Ok((provider, rx)) => {
            reporter.add_log_entry("Joystick controls initialized");
            (Some(provider), rx)
        },
        Err(e) => {
            warn!("Failed to start joystick input: {}. Continuing without gamepad.", e);
            let (_tx, rx) = mpsc::unbounded_channel();
            (None, rx)
        },
    };

    // Start the video feed watcher if configured
    let mut video_rx = match &config.video {
        Some(video_config) => video::spawn_watcher(video_config.clone()),
        None => {
            let (_tx, rx) = mpsc::unbounded_channel::<VideoSignal>();
            rx
        },
    };

    let mut session = ControlSession::new(transport, reporter);

    info!("Ready to process joystick events!");

    // Main event loop
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(event) = joystick_rx.recv() => {
                session.handle_joystick(event);
            }

            Some(event) = transport_rx.recv() => {
                session.handle_transport(event);
            }

            Some(signal) = video_rx.recv() => {
                session.handle_video(signal);
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }
    }

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Shutdown signal received");
}
