use color_eyre::eyre::{bail, Result};
use dockhand_client::{ClientFactory, EngineProvider};
use dockhand_protocol::ProtocolVersion;

pub fn run(factory: &ClientFactory<EngineProvider>, json: bool) -> Result<()> {
    let available = factory.find_available_versions();

    let rendered = render(&available, json)?;
    if !rendered.is_empty() {
        println!("{}", rendered);
    }

    if available.is_empty() {
        bail!(
            "No API versions answered at {} (tried {})",
            factory.endpoint(),
            factory
                .supported_versions()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(())
}

/// JSON array of version strings, or one version per line.
fn render(available: &[ProtocolVersion], json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string(available)?);
    }
    Ok(available
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n"))
}
