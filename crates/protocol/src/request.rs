use crate::version::ProtocolVersion;

/// Requests the client knows how to issue against the daemon's HTTP API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonRequest {
    Ping,
    Version,
}

impl DaemonRequest {
    pub fn method(&self) -> &'static str {
        match self {
            DaemonRequest::Ping | DaemonRequest::Version => "GET",
        }
    }

    fn endpoint(&self) -> &'static str {
        match self {
            DaemonRequest::Ping => "/_ping",
            DaemonRequest::Version => "/version",
        }
    }

    /// Full request path routed to the given API revision.
    pub fn path(&self, version: ProtocolVersion) -> String {
        format!("{}{}", version.path_prefix(), self.endpoint())
    }
}
