use dockhand_protocol::ProtocolVersion;

/// Failures raised by a provider or by a constructed client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Connection failed: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Daemon error ({status}): {message}")]
    Daemon { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Why [`ClientFactory::get_client`](crate::ClientFactory::get_client) could
/// not hand out a client. Neither outcome is cached.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("Could not construct client for API {version}: {source}")]
    Construction {
        version: ProtocolVersion,
        #[source]
        source: ClientError,
    },

    #[error("Client for API {version} failed its ping: {source}")]
    Liveness {
        version: ProtocolVersion,
        #[source]
        source: ClientError,
    },
}

impl FactoryError {
    pub fn version(&self) -> ProtocolVersion {
        match self {
            FactoryError::Construction { version, .. } | FactoryError::Liveness { version, .. } => {
                *version
            }
        }
    }

    pub fn client_error(&self) -> &ClientError {
        match self {
            FactoryError::Construction { source, .. } | FactoryError::Liveness { source, .. } => {
                source
            }
        }
    }
}
