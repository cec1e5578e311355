//! Request-inspection server used by the core integration tests.
//!
//! # Design
//! Every request hitting `/echo` is recorded — method, path, headers, body,
//! plus a generated id — and answered with a small JSON acknowledgement.
//! `GET /requests` returns everything recorded so far, letting tests assert
//! on what actually arrived over the wire (marker headers, encoded bodies).
//! `GET /garbled` deliberately returns text that is not JSON, for exercising
//! decode-failure handling.

use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// One recorded request, as seen by the server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: Uuid,
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Acknowledgement returned by `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EchoReply {
    pub ok: bool,
    pub id: Uuid,
}

pub type Db = Arc<RwLock<Vec<RequestRecord>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/echo", any(echo))
        .route("/requests", get(list_requests))
        .route("/garbled", get(garbled))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(State(db): State<Db>, request: Request) -> Json<EchoReply> {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();

    let record = RequestRecord {
        id: Uuid::new_v4(),
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        headers: parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
        body: String::from_utf8_lossy(&bytes).to_string(),
    };
    let id = record.id;
    db.write().await.push(record);

    Json(EchoReply { ok: true, id })
}

async fn list_requests(State(db): State<Db>) -> Json<Vec<RequestRecord>> {
    let records = db.read().await;
    Json(records.clone())
}

async fn garbled() -> &'static str {
    "this is not json {"
}
