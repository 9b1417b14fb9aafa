//! In-process backend stubs for the console integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use tokio::net::TcpListener;

pub const WAIT: Duration = Duration::from_secs(5);

/// Serve `router` on an ephemeral localhost port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub backend");
    });
    addr
}

/// An address nothing is listening on.
pub async fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind unused port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr
}

/// What the push endpoint does with each connection once the frames are
/// sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterFrames {
    Hold,
    Close,
}

#[derive(Debug)]
pub struct PushScript {
    frames: Vec<String>,
    after: AfterFrames,
    connections: AtomicUsize,
}

impl PushScript {
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Stub `/api/ws` that replays `frames` on every connection.
pub async fn push_backend(
    frames: &[&str],
    after: AfterFrames,
) -> (SocketAddr, Arc<PushScript>) {
    let script = Arc::new(PushScript {
        frames: frames.iter().map(|f| f.to_string()).collect(),
        after,
        connections: AtomicUsize::new(0),
    });
    let router = Router::new()
        .route("/api/ws", get(upgrade))
        .with_state(Arc::clone(&script));
    (serve(router).await, script)
}

async fn upgrade(
    State(script): State<Arc<PushScript>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| replay(socket, script))
}

async fn replay(mut socket: WebSocket, script: Arc<PushScript>) {
    script.connections.fetch_add(1, Ordering::SeqCst);
    for frame in &script.frames {
        if socket.send(Message::Text(frame.clone().into())).await.is_err() {
            return;
        }
    }
    match script.after {
        AfterFrames::Close => {
            let _ = socket.send(Message::Close(None)).await;
        }
        AfterFrames::Hold => {
            while let Some(Ok(message)) = socket.recv().await {
                if matches!(message, Message::Close(_)) {
                    break;
                }
            }
        }
    }
}

pub fn job_json(id: &str, duration: f64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "source_type": "vhs",
        "status": "complete",
        "progress": 100,
        "disc_info": {"title_count": 1, "main_title": 1, "duration": duration},
        "output_path": format!("/captures/{id}.mkv"),
        "file_size": 4_294_967_296u64,
        "started_at": "2026-03-01T10:00:00",
        "completed_at": "2026-03-01T11:00:00",
        "analysis_status": "analyzed",
        "scene_count": 2,
    })
}

pub fn scene_json(job_id: &str, index: u32, start: f64, end: f64) -> serde_json::Value {
    serde_json::json!({
        "id": format!("{job_id}-s{index}"),
        "job_id": job_id,
        "scene_index": index,
        "start_time": start,
        "end_time": end,
        "duration": end - start,
        "thumbnail_path": format!("/thumbs/{job_id}/scene_{index:03}.jpg"),
        "split_path": null,
    })
}
