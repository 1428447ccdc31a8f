mod request;
mod response;
mod types;
mod version;

pub use request::DaemonRequest;
pub use response::ErrorResponse;
pub use types::VersionInfo;
pub use version::{ParseVersionError, ProtocolVersion, DEFAULT_VERSION, SUPPORTED_VERSIONS};
