//! Test helpers: a throwaway downstream server that records what it receives.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::StatusCode,
    Json, Router,
};
use serde_json::Value;
use tokio::{net::TcpListener, sync::Mutex};

/// One request seen by the receiver.
#[derive(Debug, Clone)]
pub struct Captured {
    pub query: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct ReceiverState {
    status: StatusCode,
    reply: Value,
    requests: Arc<Mutex<Vec<Captured>>>,
}

/// Handle on a running receiver.
pub struct Receiver {
    /// URL of the receiver's `/hook` path
    pub url: String,
    requests: Arc<Mutex<Vec<Captured>>>,
}

impl Receiver {
    pub async fn requests(&self) -> Vec<Captured> {
        self.requests.lock().await.clone()
    }
}

async fn record(
    State(state): State<ReceiverState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.requests.lock().await.push(Captured { query, body });
    (state.status, Json(state.reply.clone()))
}

/// Start a receiver that answers every request with `status` and `reply`.
pub async fn spawn_receiver(status: StatusCode, reply: Value) -> Receiver {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = ReceiverState {
        status,
        reply,
        requests: Arc::clone(&requests),
    };

    let app = Router::new().fallback(record).with_state(state);
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("bind receiver");
    let addr = listener.local_addr().expect("receiver address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("receiver server");
    });

    Receiver {
        url: format!("http://{}/hook", addr),
        requests,
    }
}
