use anyhow::{Context, Result};
use argus_runtime::Config;

/// `argus config show` — print the effective layered configuration, a
/// diagnostic aid rather than a core responsibility.
pub fn show(config_path: Option<&str>, port_override: Option<u16>) -> Result<()> {
    let mut config =
        Config::load(config_path).context("failed to load configuration")?;
    if let Some(port) = port_override {
        config.listen_port = port;
    }
    let rendered = toml::to_string_pretty(&config).context("failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}
