//! linkmark RPC Server: JSON-RPC over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.add", "params":{"user_id":"u1","url":"https://..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":{"code":"validation","message":"..."}}
//!
//! Requests are handled concurrently, so responses may arrive out of order;
//! callers match them by `id`. Logs go to stderr.

use std::sync::Arc;
use std::time::Instant;

use linkmark::app::App;
use linkmark::rpc_handler::{handle_method, RpcError};

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const MAX_REQUESTS_PER_SECOND: u32 = 200;

/// Fixed-window rate limiter over all incoming requests.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("linkmark=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn error_response(id: Value, err: RpcError) -> Value {
    json!({"id": id, "error": err})
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config_path = std::env::args().nth(1);
    let app = match App::from_config(config_path) {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!(error = %e, "failed to initialize linkmark");
            std::process::exit(1);
        }
    };

    // Single writer task keeps each response on its own line.
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(msg) = rx.recv().await {
            let line = format!("{msg}\n");
            if stdout.write_all(line.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
                break;
            }
        }
    });

    let _ = tx.send(json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));
    info!("ready");

    let mut rate_limiter = RateLimiter::new(MAX_REQUESTS_PER_SECOND);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let _ = tx.send(error_response(Value::Null, RpcError::validation(format!("parse error: {e}"))));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            let _ = tx.send(error_response(id, RpcError::validation("rate limit exceeded")));
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("").to_string();
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let app = app.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let started = Instant::now();
            let response = match handle_method(&app, &method, &params).await {
                Ok(val) => json!({"id": id, "result": val}),
                Err(err) => error_response(id, err),
            };
            debug!(method = %method, elapsed_ms = started.elapsed().as_millis() as u64, "request handled");
            let _ = tx.send(response);
        });
    }

    // Let in-flight requests finish writing before exiting.
    drop(tx);
    let _ = writer.await;
}
