//! Lazily constructed, version-keyed clients for a container engine daemon.
//!
//! [`ClientFactory`] hands out one validated client per API revision and can
//! sweep the known revisions to find which ones the daemon answers on.
//! [`EngineProvider`] is the stock [`ClientProvider`] that talks to a real
//! daemon over a Unix socket or TCP.

mod endpoint;
mod engine;
mod error;
mod factory;
mod http;
mod provider;

pub use endpoint::{Endpoint, DEFAULT_TCP_PORT};
pub use engine::{EngineClient, EngineProvider, Timeouts};
pub use error::{ClientError, FactoryError, Result};
pub use factory::ClientFactory;
pub use http::MAX_BODY_BYTES;
pub use provider::{ClientProvider, VersionedClient};

pub use dockhand_protocol::{ProtocolVersion, DEFAULT_VERSION, SUPPORTED_VERSIONS};
