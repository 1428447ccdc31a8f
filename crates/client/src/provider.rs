use dockhand_protocol::ProtocolVersion;

use crate::error::Result;

/// A client bound to a single daemon API revision.
///
/// Clients are shared between every caller of the factory, so they must be
/// usable from many threads at once.
pub trait VersionedClient: Send + Sync {
    fn api_version(&self) -> ProtocolVersion;

    /// Round-trips to the daemon and reports whether it answered on this
    /// client's revision.
    fn ping(&self) -> Result<()>;
}

/// Builds clients for an endpoint and revision.
///
/// Construction may or may not touch the network; the factory always follows
/// a successful `connect` with [`VersionedClient::ping`] before caching.
pub trait ClientProvider: Send + Sync {
    type Client: VersionedClient;

    fn connect(&self, endpoint: &str, version: ProtocolVersion) -> Result<Self::Client>;
}
