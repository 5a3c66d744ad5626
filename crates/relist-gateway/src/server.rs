//! Line-delimited JSON TCP server.
//!
//! Each line is one request envelope: `{"token": "...", "request": {...}}`.
//! Each response line is `{"ok": ...}` or `{"error": {...}}` with the
//! error's status code alongside.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::api::{ApiError, ApiRequest, ApiResponse};
use crate::handlers::Gateway;

/// One request frame.
#[derive(Debug, Deserialize)]
struct RequestEnvelope {
    /// Bearer token.
    token: String,
    /// The operation.
    request: ApiRequest,
}

/// One response frame.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ResponseEnvelope {
    Ok {
        ok: ApiResponse,
    },
    Err {
        status: u16,
        error: ApiError,
    },
}

fn respond(result: Result<ApiResponse, ApiError>) -> ResponseEnvelope {
    match result {
        Ok(ok) => ResponseEnvelope::Ok { ok },
        Err(error) => ResponseEnvelope::Err { status: error.status_code(), error },
    }
}

/// Serves the gateway on an already-bound listener until the task is
/// aborted.
pub async fn serve(gateway: Arc<Gateway>, listener: TcpListener) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "gateway listening");
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!(%peer, "connection accepted");
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(gateway, stream).await {
                warn!(%peer, error = %e, "connection closed with error");
            }
        });
    }
}

async fn handle_connection(gateway: Arc<Gateway>, stream: TcpStream) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let result = match serde_json::from_str::<RequestEnvelope>(&line) {
            Ok(envelope) => gateway.handle(&envelope.token, envelope.request),
            Err(e) => Err(ApiError::validation(format!("malformed request frame: {e}"))),
        };
        let envelope = respond(result);
        let mut payload = serde_json::to_string(&envelope)
            .unwrap_or_else(|_| r#"{"status":500,"error":{"kind":"internal","message":"encode failure"}}"#.to_string());
        payload.push('\n');
        writer.write_all(payload.as_bytes()).await?;
    }
    Ok(())
}
