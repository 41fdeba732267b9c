// src/engine/client.rs
// TCP client for the office bridge (JSON lines, one request in flight at a time)

use super::protocol::{self, Hello, Request, Response};
use super::{Connector, EngineEndpoint, RemoteEngine};
use crate::error::{OfficeError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

struct Link {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

/// A connection to the office bridge.
///
/// Requests are serialized on the single socket; a response is matched to its
/// request by id, and stale responses left over from a timed-out request are skipped.
pub struct BridgeClient {
    link: Mutex<Link>,
    next_id: AtomicU64,
    broken: AtomicBool,
    request_timeout: Duration,
    peer: String,
}

impl BridgeClient {
    /// Open the socket and perform the hello handshake, both bounded by the connect timeout.
    pub async fn connect(endpoint: &EngineEndpoint) -> Result<Self> {
        let peer = endpoint.to_string();

        let stream = tokio::time::timeout(
            endpoint.connect_timeout,
            TcpStream::connect((endpoint.host.as_str(), endpoint.port)),
        )
        .await
        .map_err(|_| {
            OfficeError::Connection(format!(
                "timed out after {:?} connecting to {}",
                endpoint.connect_timeout, peer
            ))
        })?
        .map_err(|e| OfficeError::Connection(format!("failed to connect to {}: {}", peer, e)))?;

        // Requests are small and latency-bound
        let _ = stream.set_nodelay(true);

        let (read_half, write_half) = stream.into_split();
        let client = Self {
            link: Mutex::new(Link {
                reader: BufReader::new(read_half),
                writer: BufWriter::new(write_half),
            }),
            next_id: AtomicU64::new(1),
            broken: AtomicBool::new(false),
            request_timeout: endpoint.request_timeout,
            peer,
        };

        let hello = serde_json::to_value(Hello {
            client: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })?;

        let greeting = tokio::time::timeout(
            endpoint.connect_timeout,
            client.roundtrip(protocol::METHOD_HELLO, hello),
        )
        .await
        .map_err(|_| OfficeError::Connection(format!("{} did not answer the handshake", client.peer)))?
        .map_err(|e| match e {
            OfficeError::RemoteOperation(msg) => {
                OfficeError::Connection(format!("{} rejected the handshake: {}", client.peer, msg))
            }
            other => other,
        })?;

        info!(peer = %client.peer, engine = %greeting, "Connected to office engine");
        Ok(client)
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Whether the link has failed or been closed
    pub fn is_broken(&self) -> bool {
        self.broken.load(Ordering::SeqCst)
    }

    fn mark_broken(&self, reason: &str) {
        if !self.broken.swap(true, Ordering::SeqCst) {
            warn!(peer = %self.peer, reason, "Engine link lost");
        }
    }

    async fn roundtrip(&self, method: &str, params: Value) -> Result<Value> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(OfficeError::Connection(format!(
                "link to {} is closed",
                self.peer
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = Request {
            id,
            method: method.to_string(),
            params,
        };
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');

        let mut link = self.link.lock().await;

        if let Err(e) = write_line(&mut link.writer, &line).await {
            self.mark_broken(&e.to_string());
            return Err(OfficeError::Connection(format!("write to {} failed: {}", self.peer, e)));
        }
        debug!(id, method, "Sent engine request");

        loop {
            let raw = match read_line_bounded(&mut link.reader).await {
                Ok(raw) => raw,
                Err(e) => {
                    self.mark_broken(&e.to_string());
                    return Err(e);
                }
            };

            let response: Response = match serde_json::from_str(&raw) {
                Ok(response) => response,
                Err(e) => {
                    self.mark_broken("unparseable response frame");
                    return Err(OfficeError::Connection(format!(
                        "invalid response from {}: {}",
                        self.peer, e
                    )));
                }
            };

            if response.id != id {
                debug!(expected = id, got = response.id, "Skipping stale engine response");
                continue;
            }

            return match response.error {
                Some(err) => Err(OfficeError::RemoteOperation(err.describe())),
                None => Ok(response.result.unwrap_or(Value::Null)),
            };
        }
    }
}

#[async_trait]
impl RemoteEngine for BridgeClient {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        tokio::time::timeout(self.request_timeout, self.roundtrip(method, params))
            .await
            .map_err(|_| {
                // A read may have been cut mid-frame; the stream can't be trusted after this
                self.mark_broken("request timed out");
                OfficeError::Connection(format!(
                    "{} did not answer {} within {:?}",
                    self.peer, method, self.request_timeout
                ))
            })?
    }

    fn is_alive(&self) -> bool {
        !self.is_broken()
    }

    async fn close(&self) {
        if self.broken.load(Ordering::SeqCst) {
            return;
        }
        let notice = tokio::time::timeout(
            Duration::from_secs(2),
            self.roundtrip(protocol::METHOD_SHUTDOWN, Value::Object(Default::default())),
        )
        .await;
        if let Ok(Err(e)) = notice {
            debug!(peer = %self.peer, error = %e, "Shutdown notice not acknowledged");
        }
        self.broken.store(true, Ordering::SeqCst);
        let mut link = self.link.lock().await;
        let _ = link.writer.shutdown().await;
    }
}

async fn write_line(writer: &mut BufWriter<OwnedWriteHalf>, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}

/// Read one newline-terminated frame, refusing frames over [`protocol::MAX_LINE_BYTES`].
async fn read_line_bounded(reader: &mut BufReader<OwnedReadHalf>) -> Result<String> {
    let mut buf = Vec::with_capacity(4096);
    let limit = protocol::MAX_LINE_BYTES as u64 + 1;
    let n = reader
        .take(limit)
        .read_until(b'\n', &mut buf)
        .await
        .map_err(|e| OfficeError::Connection(format!("read failed: {}", e)))?;

    if n == 0 {
        return Err(OfficeError::Connection("engine closed the connection".to_string()));
    }
    if buf.last() != Some(&b'\n') {
        return Err(if buf.len() > protocol::MAX_LINE_BYTES {
            OfficeError::Connection(format!(
                "engine message exceeds {}MB limit",
                protocol::MAX_LINE_BYTES / (1024 * 1024)
            ))
        } else {
            OfficeError::Connection("connection closed mid-frame (no newline)".to_string())
        });
    }
    buf.pop();

    String::from_utf8(buf)
        .map_err(|e| OfficeError::Connection(format!("invalid UTF-8 from engine: {}", e)))
}

/// Connects to the bridge over TCP
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, endpoint: &EngineEndpoint) -> Result<Arc<dyn RemoteEngine>> {
        let client = BridgeClient::connect(endpoint).await?;
        Ok(Arc::new(client))
    }
}
