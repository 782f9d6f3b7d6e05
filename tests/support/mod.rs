//! Purpose: Loopback stand-in for the identity-resolution service.
//! Exports: `StubServer`, `Recorded`, `closed_endpoint`.
//! Role: Shared fixture for library and CLI integration tests.
//! Invariants: Binds 127.0.0.1 on an ephemeral port; one canned reply per server.
//! Invariants: Every request received is recorded before the reply is sent.
#![allow(dead_code)]

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

#[derive(Clone, Debug)]
pub struct Recorded {
    pub content_type: Option<String>,
    pub body: String,
}

struct Stub {
    status: u16,
    body: String,
    requests: Mutex<Vec<Recorded>>,
}

pub struct StubServer {
    endpoint: String,
    stub: Arc<Stub>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl StubServer {
    pub fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
        listener.set_nonblocking(true).expect("nonblocking");
        let addr = listener.local_addr().expect("local addr");
        let stub = Arc::new(Stub {
            status,
            body: body.to_string(),
            requests: Mutex::new(Vec::new()),
        });
        let (tx, rx) = oneshot::channel::<()>();

        let state = Arc::clone(&stub);
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).expect("listener");
                let app = Router::new()
                    .route("/identify", post(identify))
                    .with_state(state);
                let _ = axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = rx.await;
                    })
                    .await;
            });
        });

        Self {
            endpoint: format!("http://{addr}/identify"),
            stub,
            shutdown: Some(tx),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.stub
            .requests
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn identify(State(stub): State<Arc<Stub>>, headers: HeaderMap, body: String) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    stub.requests
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
        .push(Recorded { content_type, body });
    let status = StatusCode::from_u16(stub.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        stub.body.clone(),
    )
        .into_response()
}

/// An endpoint on a loopback port with nothing listening.
pub fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/identify")
}
