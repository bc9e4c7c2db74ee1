#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use nhl_bios_ingest::CoreError;
use nhl_bios_ingest::nhl::{NhlApiClient, Position};
use nhl_bios_ingest::seasons::{FunctionInvoker, InvocationResult, SeasonId};
use nhl_bios_ingest::storage::{BlobStore, StorageError};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Returns the same result on every call and remembers what it was asked.
pub struct FakeInvoker {
    result: InvocationResult,
    pub calls: Mutex<Vec<(String, Vec<u8>)>>,
}

impl FakeInvoker {
    pub fn new(result: InvocationResult) -> Self {
        Self {
            result,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_payload(payload: &str) -> Self {
        Self::new(InvocationResult::completed(payload))
    }

    pub fn with_function_error(payload: &str) -> Self {
        Self::new(InvocationResult::Completed {
            payload: Some(payload.as_bytes().to_vec()),
            function_error: Some("Unhandled".to_string()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FunctionInvoker for FakeInvoker {
    async fn invoke(&self, function_name: &str, payload: &[u8]) -> InvocationResult {
        self.calls
            .lock()
            .unwrap()
            .push((function_name.to_string(), payload.to_vec()));
        self.result.clone()
    }
}

/// Bios documents keyed by (season, position); anything missing is a 404.
#[derive(Default)]
pub struct FakeNhlApi {
    docs: HashMap<(SeasonId, Position), Value>,
    pub requests: Mutex<Vec<(SeasonId, Position)>>,
}

impl FakeNhlApi {
    pub fn with_doc(mut self, season: u32, position: Position, doc: Value) -> Self {
        self.docs.insert((SeasonId(season), position), doc);
        self
    }

    pub fn requested(&self) -> Vec<(SeasonId, Position)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NhlApiClient for FakeNhlApi {
    async fn fetch_player_bios(
        &self,
        season: SeasonId,
        position: Position,
    ) -> Result<Value, CoreError> {
        self.requests.lock().unwrap().push((season, position));
        self.docs.get(&(season, position)).cloned().ok_or_else(|| {
            CoreError::Network(format!("http error - status code 404 for {position} {season}"))
        })
    }

    async fn fetch_schedule(&self, date: NaiveDate) -> Result<Value, CoreError> {
        Ok(json!({ "nextStartDate": date.to_string(), "gameWeek": [] }))
    }
}

pub struct StoredObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

/// In-memory sink; keys listed in `failing` are rejected.
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<Vec<StoredObject>>,
    failing: HashSet<String>,
}

impl MemoryStore {
    pub fn failing_on(key: &str) -> Self {
        Self {
            objects: Mutex::new(Vec::new()),
            failing: HashSet::from([key.to_string()]),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.key.clone())
            .collect()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.failing.contains(key) {
            return Err(StorageError::new("AccessDenied: bucket policy"));
        }
        self.objects.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            body,
            content_type: content_type.to_string(),
        });
        Ok(())
    }
}

pub fn bios_doc(player_id: u64, name: &str) -> Value {
    json!({
        "data": [{ "playerId": player_id, "skaterFullName": name }],
        "total": 1
    })
}

/// Canned reply for [`serve_once`].
pub struct StubResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl StubResponse {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }
}

/// Answers exactly one HTTP request on a local port. The handle resolves to
/// the raw request text, lowercased.
pub async fn serve_once(response: StubResponse) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let mut head = format!(
            "HTTP/1.1 {} Stub\r\ncontent-length: {}\r\nconnection: close\r\n",
            response.status,
            response.body.len()
        );
        for (name, value) in &response.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str("\r\n");
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(response.body.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        request.to_ascii_lowercase()
    });
    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Shared buffer usable as a tracing writer.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Route tracing output on this thread into `logs` until the guard drops.
pub fn capture_logs(logs: &CapturedLogs) -> tracing::subscriber::DefaultGuard {
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    tracing::subscriber::set_default(subscriber)
}
