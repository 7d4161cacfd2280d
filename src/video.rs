//! Video feed watcher
//!
//! Probes the robot controller's MJPEG endpoint and reports whether the
//! stream is serving. The stream stays open while frames flow, so a request
//! that succeeds reads as the feed being active until the body ends or
//! errors. Last signal wins; there is no retry.

use futures_util::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::VideoConfig;

/// Feed state change, delivered to the session loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSignal {
    Active,
    Unavailable,
}

/// Spawn the watcher task and return its signal receiver
pub fn spawn_watcher(config: VideoConfig) -> mpsc::UnboundedReceiver<VideoSignal> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        watch(config, tx).await;
    });
    rx
}

async fn watch(config: VideoConfig, tx: mpsc::UnboundedSender<VideoSignal>) {
    let client = match reqwest::Client::builder()
        .connect_timeout(Duration::from_millis(config.timeout_ms))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!("Failed to build video feed client: {}", e);
            let _ = tx.send(VideoSignal::Unavailable);
            return;
        },
    };

    match client.get(&config.url).send().await {
        Ok(response) if response.status().is_success() => {
            debug!("Video feed responding at {}", config.url);
            let _ = tx.send(VideoSignal::Active);

            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                if let Err(e) = chunk {
                    warn!("Video feed stream error: {}", e);
                    break;
                }
            }

            // The MJPEG stream only ends when the feed dies
            let _ = tx.send(VideoSignal::Unavailable);
        },
        Ok(response) => {
            warn!("Video feed returned {}", response.status());
            let _ = tx.send(VideoSignal::Unavailable);
        },
        Err(e) => {
            warn!("Video feed probe failed: {}", e);
            let _ = tx.send(VideoSignal::Unavailable);
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serving_feed_reports_active_then_unavailable_when_it_ends() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/video_feed")
            .with_status(200)
            .with_header("content-type", "multipart/x-mixed-replace; boundary=frame")
            .with_body("--frame\r\n")
            .create_async()
            .await;

        let mut rx = spawn_watcher(VideoConfig {
            url: format!("{}/video_feed", server.url()),
            timeout_ms: 1000,
        });

        assert_eq!(rx.recv().await, Some(VideoSignal::Active));
        // The finite mock body ends the stream, which reads as the feed dying
        assert_eq!(rx.recv().await, Some(VideoSignal::Unavailable));
    }

    #[tokio::test]
    async fn missing_feed_reports_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/video_feed")
            .with_status(404)
            .create_async()
            .await;

        let mut rx = spawn_watcher(VideoConfig {
            url: format!("{}/video_feed", server.url()),
            timeout_ms: 1000,
        });

        assert_eq!(rx.recv().await, Some(VideoSignal::Unavailable));
    }

    #[tokio::test]
    async fn unreachable_feed_reports_unavailable() {
        let mut rx = spawn_watcher(VideoConfig {
            // Port 9 (discard) is never serving HTTP
            url: "http://127.0.0.1:9/video_feed".to_string(),
            timeout_ms: 200,
        });

        assert_eq!(rx.recv().await, Some(VideoSignal::Unavailable));
    }
}
