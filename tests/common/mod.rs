#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;

use openchat::config::AppConfig;
use openchat::conversation::InMemoryStore;
use openchat::llm::{ChatMessage, CompletionProvider, LineStream, ModelInfo, UpstreamError};
use openchat::relay::{RelayEngine, RelayOptions};
use openchat::state::AppState;

pub const DEFAULT_MODEL: &str = "m1";

/// Upstream line for one content delta
pub fn delta(text: &str) -> String {
    format!(
        "data: {}",
        serde_json::json!({ "choices": [{ "delta": { "content": text } }] })
    )
}

pub const DONE: &str = "data: [DONE]";

enum Script {
    Lines(Vec<Result<String, UpstreamError>>),
    Channel(mpsc::UnboundedReceiver<Result<String, UpstreamError>>),
    Fail(UpstreamError),
}

/// A request the mock provider received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Scripted stand-in for the upstream
///
/// Each `open_stream` call consumes the next queued script.
pub struct MockProvider {
    configured: bool,
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<RecordedRequest>>,
    models: Mutex<Vec<ModelInfo>>,
    model_calls: Mutex<usize>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            configured: true,
            scripts: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            models: Mutex::new(Vec::new()),
            model_calls: Mutex::new(0),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    /// Queue a stream that yields `lines` and then closes
    pub fn push_lines<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines = lines.into_iter().map(|l| Ok(l.into())).collect();
        self.scripts.lock().unwrap().push_back(Script::Lines(lines));
    }

    /// Queue a stream that yields `lines` and then fails with `err`
    pub fn push_lines_then_error<S: Into<String>>(&self, lines: Vec<S>, err: UpstreamError) {
        let mut items: Vec<_> = lines.into_iter().map(|l| Ok(l.into())).collect();
        items.push(Err(err));
        self.scripts.lock().unwrap().push_back(Script::Lines(items));
    }

    /// Queue a request that is rejected before any line arrives
    pub fn push_open_error(&self, err: UpstreamError) {
        self.scripts.lock().unwrap().push_back(Script::Fail(err));
    }

    /// Queue a stream fed by hand through the returned sender
    ///
    /// The sender reports closed once the relay drops the stream.
    pub fn push_channel(&self) -> mpsc::UnboundedSender<Result<String, UpstreamError>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.scripts.lock().unwrap().push_back(Script::Channel(rx));
        tx
    }

    pub fn set_models(&self, ids: &[&str]) {
        *self.models.lock().unwrap() = ids
            .iter()
            .map(|id| ModelInfo {
                id: id.to_string(),
                details: serde_json::Map::new(),
            })
            .collect();
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn model_calls(&self) -> usize {
        *self.model_calls.lock().unwrap()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn open_stream(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<LineStream, UpstreamError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
        });

        let script = self.scripts.lock().unwrap().pop_front();
        match script {
            Some(Script::Lines(lines)) => Ok(Box::pin(futures::stream::iter(lines))),
            Some(Script::Channel(rx)) => Ok(Box::pin(UnboundedReceiverStream::new(rx))),
            Some(Script::Fail(err)) => Err(err),
            None => Err(UpstreamError::Transport("no scripted response".to_string())),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, UpstreamError> {
        *self.model_calls.lock().unwrap() += 1;
        Ok(self.models.lock().unwrap().clone())
    }
}

/// Store, mock provider and relay engine wired together
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub provider: Arc<MockProvider>,
    pub engine: RelayEngine,
}

pub fn harness(options: RelayOptions) -> Harness {
    harness_with(MockProvider::new(), options)
}

pub fn harness_with(provider: MockProvider, options: RelayOptions) -> Harness {
    let store = Arc::new(InMemoryStore::new(DEFAULT_MODEL));
    let provider = Arc::new(provider);
    let engine = RelayEngine::new(store.clone(), provider.clone(), options);
    Harness {
        store,
        provider,
        engine,
    }
}

/// Application state backed by the in-memory store and a mock provider
pub fn app_state(provider: MockProvider) -> (AppState, Arc<MockProvider>) {
    let config = AppConfig::default().with_default_model(DEFAULT_MODEL);
    let store = Arc::new(InMemoryStore::new(DEFAULT_MODEL));
    let provider = Arc::new(provider);
    (AppState::new(config, store, provider.clone()), provider)
}

/// Serve one canned HTTP response on an ephemeral local port
///
/// Returns the base URL and a handle resolving to the raw request text.
pub async fn serve_once(status: &str, content_type: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{}/api/v1", addr), handle)
}

/// Accept one request and then go quiet
///
/// With `None` nothing is ever written back. With `Some(chunk)` the response
/// head and that one chunked body part are sent before going quiet.
pub async fn serve_stalled(chunk: Option<&str>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let prefix = chunk.map(|data| {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nTransfer-Encoding: chunked\r\n\r\n{:x}\r\n{}\r\n",
            data.len(),
            data
        )
    });

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        if let Some(prefix) = prefix {
            socket.write_all(prefix.as_bytes()).await.unwrap();
        }
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    format!("http://{}/api/v1", addr)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Drain a relay stream into a vector
pub async fn collect(stream: openchat::relay::RelayStream) -> Vec<openchat::relay::RelayEvent> {
    use futures::StreamExt;
    stream.collect().await
}
