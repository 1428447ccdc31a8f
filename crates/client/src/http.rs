//! One-shot HTTP/1.1 exchanges with the daemon, driven by hyper on a
//! single-threaded tokio runtime so callers stay synchronous.

use std::future::Future;
use std::io;
use std::time::Duration;

use http_body_util::{BodyExt, Empty, Limited};
use hyper::body::Bytes;
use hyper::client::conn::http1;
use hyper::{header, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, UnixStream};

use crate::endpoint::Endpoint;
use crate::engine::Timeouts;
use crate::error::{ClientError, Result};

/// Largest reply body read before the exchange is abandoned.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const USER_AGENT: &str = concat!("dockhand/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub(crate) struct Reply {
    pub status: StatusCode,
    pub body: Bytes,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).trim().to_string()
    }
}

/// Connects, sends one request and reads the whole reply.
///
/// `timeouts.connect` bounds the connect; `timeouts.io` bounds everything
/// after it, including a reply that trickles in slowly.
pub(crate) fn send(
    endpoint: &Endpoint,
    method: &str,
    path: &str,
    timeouts: Timeouts,
) -> Result<Reply> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(send_async(endpoint, method, path, timeouts))
}

async fn send_async(
    endpoint: &Endpoint,
    method: &str,
    path: &str,
    timeouts: Timeouts,
) -> Result<Reply> {
    let host = endpoint.host_header();
    match endpoint {
        Endpoint::Unix(socket) => {
            let stream = within(timeouts.connect, "connect", UnixStream::connect(socket)).await??;
            within(timeouts.io, "reply", exchange(stream, method, path, host)).await?
        }
        Endpoint::Tcp(addr) => {
            let connect = TcpStream::connect(addr.as_str());
            let stream = within(timeouts.connect, "connect", connect).await??;
            within(timeouts.io, "reply", exchange(stream, method, path, host)).await?
        }
    }
}

async fn within<F: Future>(limit: Duration, what: &str, fut: F) -> Result<F::Output> {
    tokio::time::timeout(limit, fut).await.map_err(|_| {
        ClientError::Connection(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("no {what} within {limit:?}"),
        ))
    })
}

async fn exchange<S>(stream: S, method: &str, path: &str, host: &str) -> Result<Reply>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, conn) = http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|e| ClientError::Protocol(format!("Handshake failed: {e}")))?;
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::trace!(error = %e, "daemon connection closed with error");
        }
    });

    let request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::HOST, host)
        .header(header::USER_AGENT, USER_AGENT)
        .header(header::ACCEPT, "application/json")
        .body(Empty::<Bytes>::new())
        .map_err(|e| ClientError::Protocol(format!("Invalid request: {e}")))?;

    let response = sender
        .send_request(request)
        .await
        .map_err(|e| ClientError::Protocol(format!("Malformed reply: {e}")))?;
    let status = response.status();

    let body = Limited::new(response.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| ClientError::Protocol(format!("Unreadable reply body: {e}")))?
        .to_bytes();

    Ok(Reply { status, body })
}
