use color_eyre::eyre::Result;
use dockhand_client::{ClientFactory, EngineProvider, VersionedClient};
use dockhand_protocol::ProtocolVersion;

use super::resolve_client;

pub fn run(
    factory: &ClientFactory<EngineProvider>,
    api_version: Option<ProtocolVersion>,
    json: bool,
) -> Result<()> {
    let client = resolve_client(factory, api_version)?;
    let info = client.version_info()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Endpoint:     {}", client.endpoint());
    let served = if info.serves(client.api_version()) {
        "served"
    } else {
        "outside the daemon's range"
    };
    println!("Client API:   {} ({})", client.api_version(), served);
    println!("Engine:       {}", info.version);
    println!("Server API:   {}", info.api_version);
    if let Some(min) = info.min_api_version {
        println!("Minimum API:  {}", min);
    }
    println!("OS/Arch:      {}/{}", info.os, info.arch);
    if let Some(kernel) = &info.kernel_version {
        println!("Kernel:       {}", kernel);
    }
    if !info.go_version.is_empty() {
        println!("Go:           {}", info.go_version);
    }
    if !info.git_commit.is_empty() {
        println!("Git commit:   {}", info.git_commit);
    }
    if let Some(built) = info.build_time {
        println!("Built:        {}", built.to_rfc3339());
    }

    Ok(())
}
