// One-shot TCP transport
//
// The controller speaks one request per TCP connection: connect, write a
// single CRLF-terminated line, read the reply line, close. No pooling and
// no reuse. Every socket operation is bounded by the endpoint timeout and
// the stream is owned by the call, so it is closed on every exit path.

use std::fmt;
use std::future::Future;
use std::io;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::error::Error;

/// Default controller port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default bound for connect, write and each read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const READ_CHUNK: usize = 4096;

/// Replies larger than this are treated as garbage rather than buffered
/// forever.
const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// Where and how long to talk to a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or IP address.
    pub address: String,
    pub port: u16,
    pub timeout: Duration,
}

impl Endpoint {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.address.contains(':') {
            write!(f, "[{}]:{}", self.address, self.port)
        } else {
            write!(f, "{}:{}", self.address, self.port)
        }
    }
}

/// Perform one request/response exchange on a fresh connection.
///
/// Reading stops when the peer closes the connection or when the bytes
/// received so far end in a CR or LF.
pub async fn call(endpoint: &Endpoint, request: &[u8]) -> Result<Vec<u8>, Error> {
    debug!(%endpoint, "connecting to controller");
    let mut stream = bounded(
        endpoint,
        TcpStream::connect((endpoint.address.as_str(), endpoint.port)),
    )
    .await?;

    bounded(endpoint, stream.write_all(request)).await?;
    trace!(bytes = request.len(), "request written");

    let mut buf = BytesMut::with_capacity(READ_CHUNK);
    loop {
        buf.reserve(READ_CHUNK);
        let read = bounded(endpoint, stream.read_buf(&mut buf)).await?;
        if read == 0 {
            trace!("controller closed the connection");
            break;
        }
        if frame_complete(&buf) {
            break;
        }
        if buf.len() > MAX_RESPONSE_BYTES {
            return Err(Error::MalformedResponse {
                message: format!(
                    "response exceeds {MAX_RESPONSE_BYTES} bytes without a line terminator"
                ),
                body: String::from_utf8_lossy(&buf[..256]).into_owned(),
            });
        }
    }

    debug!(%endpoint, bytes = buf.len(), "response received");
    Ok(buf.to_vec())
}

/// A frame is complete once the accumulated bytes end in a terminator.
fn frame_complete(buf: &[u8]) -> bool {
    matches!(buf.last(), Some(b'\r' | b'\n'))
}

/// Bound a socket operation by the endpoint timeout and map failures.
async fn bounded<T>(
    endpoint: &Endpoint,
    operation: impl Future<Output = io::Result<T>>,
) -> Result<T, Error> {
    match tokio::time::timeout(endpoint.timeout, operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) if source.kind() == io::ErrorKind::TimedOut => Err(Error::Timeout {
            timeout: endpoint.timeout,
        }),
        Ok(Err(source)) => Err(Error::Transport {
            address: endpoint.to_string(),
            source,
        }),
        Err(_) => Err(Error::Timeout {
            timeout: endpoint.timeout,
        }),
    }
}
