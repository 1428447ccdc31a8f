use std::time::Duration;

use dockhand_protocol::{DaemonRequest, ErrorResponse, ProtocolVersion, VersionInfo};
use hyper::StatusCode;

use crate::endpoint::Endpoint;
use crate::error::{ClientError, Result};
use crate::http::{self, Reply};
use crate::provider::{ClientProvider, VersionedClient};

/// Per-request limits: `connect` for establishing the connection, `io` for
/// the whole exchange after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub io: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            io: Duration::from_secs(5),
        }
    }
}

/// Talks to the daemon's HTTP API over a Unix socket or TCP, pinned to one
/// API revision. Each request opens its own connection.
#[derive(Debug, Clone)]
pub struct EngineClient {
    endpoint: Endpoint,
    version: ProtocolVersion,
    timeouts: Timeouts,
}

impl EngineClient {
    /// Validates the endpoint without connecting.
    pub fn new(endpoint: &str, version: ProtocolVersion, timeouts: Timeouts) -> Result<Self> {
        let endpoint = Endpoint::parse(endpoint)?;
        Ok(Self {
            endpoint,
            version,
            timeouts,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn version_info(&self) -> Result<VersionInfo> {
        let reply = self.send_request(DaemonRequest::Version)?;
        serde_json::from_slice(&reply.body).map_err(|e| ClientError::Protocol(e.to_string()))
    }

    fn send_request(&self, request: DaemonRequest) -> Result<Reply> {
        let path = request.path(self.version);
        tracing::trace!(endpoint = %self.endpoint, %path, "sending request");

        let reply = http::send(&self.endpoint, request.method(), &path, self.timeouts)?;

        tracing::debug!(
            %path,
            status = reply.status.as_u16(),
            body_len = reply.body.len(),
            "daemon replied"
        );

        if !reply.is_success() {
            return Err(daemon_error(&reply));
        }
        Ok(reply)
    }
}

fn daemon_error(reply: &Reply) -> ClientError {
    let message = match ErrorResponse::from_json(&reply.body_text()) {
        Ok(err) => err.message,
        Err(_) => reply.body_text(),
    };
    ClientError::Daemon {
        status: reply.status.as_u16(),
        message,
    }
}

impl VersionedClient for EngineClient {
    fn api_version(&self) -> ProtocolVersion {
        self.version
    }

    fn ping(&self) -> Result<()> {
        let reply = self.send_request(DaemonRequest::Ping)?;
        if reply.status != StatusCode::OK {
            return Err(ClientError::Protocol(format!(
                "Unexpected ping status {}",
                reply.status
            )));
        }
        Ok(())
    }
}

/// Stock provider building [`EngineClient`]s.
#[derive(Debug, Clone, Default)]
pub struct EngineProvider {
    timeouts: Timeouts,
}

impl EngineProvider {
    pub fn new(timeouts: Timeouts) -> Self {
        Self { timeouts }
    }
}

impl ClientProvider for EngineProvider {
    type Client = EngineClient;

    fn connect(&self, endpoint: &str, version: ProtocolVersion) -> Result<EngineClient> {
        tracing::debug!(%version, endpoint, "trying to connect to client version");
        EngineClient::new(endpoint, version, self.timeouts).inspect_err(|e| {
            tracing::error!(%version, endpoint, error = %e, "error connecting to client version");
        })
    }
}
