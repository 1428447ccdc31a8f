use std::time::Instant;

use color_eyre::eyre::Result;
use dockhand_client::{ClientFactory, EngineProvider, VersionedClient};
use dockhand_protocol::ProtocolVersion;

use super::resolve_client;

pub fn run(
    factory: &ClientFactory<EngineProvider>,
    api_version: Option<ProtocolVersion>,
) -> Result<()> {
    let started = Instant::now();
    let client = resolve_client(factory, api_version)?;

    println!(
        "{} answered on API {} in {}",
        client.endpoint(),
        client.api_version(),
        humantime::format_duration(started.elapsed())
    );
    if !client.api_version().is_supported() {
        println!("Note: API {} is outside the known version list", client.api_version());
    }

    Ok(())
}
