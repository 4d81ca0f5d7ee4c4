//! Loopback fake controller for tests.
//!
//! Listens on an ephemeral localhost port, answers each connection with
//! the reply registered for the request's `cmd`, and records every
//! request it sees. Replies can be swapped between calls, which is how
//! tests stage partial failures.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::transport::Endpoint;

/// Error code answered for commands with no registered reply.
pub const UNKNOWN_COMMAND_CODE: i64 = 99;

/// What the fake controller does for a given command.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Write this JSON document followed by CRLF.
    Json(Value),
    /// Write these exact bytes.
    Raw(Vec<u8>),
    /// Wait, then write this JSON document followed by CRLF.
    Delayed(Duration, Value),
    /// Accept the request but never answer.
    Silent,
    /// Close the connection without answering.
    Close,
}

#[derive(Default)]
struct State {
    replies: HashMap<String, Reply>,
    requests: Vec<Value>,
}

/// A fake controller bound to `127.0.0.1`.
pub struct FakeController {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
    handle: JoinHandle<()>,
}

impl FakeController {
    /// Bind an ephemeral port and start serving.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(State::default()));

        let shared = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve(socket, Arc::clone(&shared)));
            }
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// An endpoint pointing at this fake with a short timeout.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("127.0.0.1")
            .with_port(self.port())
            .with_timeout(Duration::from_secs(2))
    }

    /// Register a reply for `cmd`.
    pub fn reply(&self, cmd: &str, reply: Reply) {
        self.lock().replies.insert(cmd.to_owned(), reply);
    }

    /// Answer `cmd` with `{"cmd": cmd, "data": data}`.
    pub fn reply_data(&self, cmd: &str, data: Value) {
        self.reply(cmd, Reply::Json(json!({ "cmd": cmd, "data": data })));
    }

    /// Answer `cmd` with `{"cmd": cmd, "data": {"error": code}}`.
    pub fn reply_error(&self, cmd: &str, code: i64) {
        self.reply_data(cmd, json!({ "error": code }));
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<Value> {
        self.lock().requests.clone()
    }

    /// The `cmd` of every request received so far.
    pub fn commands(&self) -> Vec<String> {
        self.lock()
            .requests
            .iter()
            .map(|r| r.get("cmd").and_then(Value::as_str).unwrap_or_default().to_owned())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for FakeController {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(mut socket: TcpStream, state: Arc<Mutex<State>>) {
    let (reader, mut writer) = socket.split();
    let mut line = String::new();
    if BufReader::new(reader).read_line(&mut line).await.is_err() {
        return;
    }

    let request: Value = serde_json::from_str(line.trim()).unwrap_or(Value::Null);
    let cmd = request
        .get("cmd")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();

    let reply = {
        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
        state.requests.push(request);
        state.replies.get(&cmd).cloned()
    };

    let bytes = match reply {
        Some(Reply::Json(value)) => {
            let mut bytes = value.to_string().into_bytes();
            bytes.extend_from_slice(b"\r\n");
            bytes
        }
        Some(Reply::Raw(bytes)) => bytes,
        Some(Reply::Delayed(delay, value)) => {
            tokio::time::sleep(delay).await;
            format!("{value}\r\n").into_bytes()
        }
        Some(Reply::Silent) => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            return;
        }
        Some(Reply::Close) => return,
        None => {
            let value = json!({ "cmd": cmd, "data": { "error": UNKNOWN_COMMAND_CODE } });
            format!("{value}\r\n").into_bytes()
        }
    };

    let _ = writer.write_all(&bytes).await;
    let _ = writer.flush().await;
}
