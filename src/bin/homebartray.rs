use anyhow::Result;

#[cfg(not(target_os = "macos"))]
fn main() -> Result<()> {
    anyhow::bail!("homebartray is only supported on macOS");
}

#[cfg(target_os = "macos")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    homebar::menu::platform::macos::run()
}
