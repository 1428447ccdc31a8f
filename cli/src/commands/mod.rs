pub mod config;
pub mod info;
pub mod logs;
pub mod ping;
pub mod versions;

use std::sync::Arc;

use color_eyre::eyre::{Report, Result};
use dockhand_client::{ClientError, ClientFactory, EngineClient, EngineProvider, FactoryError};
use dockhand_protocol::ProtocolVersion;

use crate::config::{UserConfig, ENDPOINT_ENV};

/// Builds the factory every daemon-facing command shares.
pub fn build_factory(config: &UserConfig, host: Option<&str>) -> ClientFactory<EngineProvider> {
    let env_host = std::env::var(ENDPOINT_ENV).ok();
    let endpoint = config.resolve_endpoint(host, env_host.as_deref());
    tracing::debug!(%endpoint, "resolved daemon endpoint");

    ClientFactory::new(endpoint, EngineProvider::new(config.timeouts()))
        .with_default_version(config.default_version)
        .with_supported_versions(config.effective_supported_versions())
}

/// Resolves the requested revision, or the factory default.
pub fn resolve_client(
    factory: &ClientFactory<EngineProvider>,
    api_version: Option<ProtocolVersion>,
) -> Result<Arc<EngineClient>> {
    let result = match api_version {
        Some(version) => factory.get_client(version),
        None => factory.get_default_client(),
    };
    result.map_err(explain)
}

/// Points the user at `versions` when the daemon itself turned the
/// revision down.
fn explain(err: FactoryError) -> Report {
    let rejected = matches!(err.client_error(), ClientError::Daemon { .. });
    let report = Report::new(err);
    if rejected {
        report.wrap_err("Run `dockhand versions` to list the API versions this daemon answers on")
    } else {
        report
    }
}
