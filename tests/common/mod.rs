//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;

use vision_relay::config::DemoConfig;
use vision_relay::http::{AppState, DemoServer};

/// Everything a mock relay received.
#[derive(Clone, Default)]
pub struct Captured {
    pub payloads: Arc<Mutex<Vec<Value>>>,
}

#[allow(dead_code)]
impl Captured {
    pub fn count(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<Value> {
        self.payloads.lock().unwrap().clone()
    }
}

/// Start a mock relay answering every POST to `/event` with `status` and `body`.
pub async fn start_mock_relay(status: u16, body: &'static str) -> (SocketAddr, Captured) {
    let captured = Captured::default();
    let status = StatusCode::from_u16(status).unwrap();

    let app = Router::new()
        .route(
            "/event",
            post(move |State(c): State<Captured>, Json(payload): Json<Value>| async move {
                c.payloads.lock().unwrap().push(payload);
                (status, body)
            }),
        )
        .with_state(captured.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, captured)
}

/// Default config pointing at `relay` with a cache under `cache_root`.
pub fn test_config(relay: SocketAddr, cache_root: &std::path::Path) -> DemoConfig {
    let mut config = DemoConfig::default();
    config.relay.server_base = relay.to_string();
    config.relay.timeout_secs = 5;
    config.cache.root = cache_root.to_string_lossy().into_owned();
    config
}

/// Serve `server` on an ephemeral port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_server(server: DemoServer) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("http://{}", addr)
}

/// Build app state for `config`.
#[allow(dead_code)]
pub fn state(config: DemoConfig) -> AppState {
    AppState::new(config).unwrap()
}

/// Small deterministic PNG.
#[allow(dead_code)]
pub fn sample_png(width: u32, height: u32, seed: u8) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([x as u8 ^ seed, y as u8, seed.wrapping_mul(5)])
    });
    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    png
}
