//! Init command for writing a starter config file.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};

const TEMPLATE: &str = r#"# poe-ha configuration.
# Every setting can also be given as an environment variable, e.g. POE_HA_TOKEN.

# Your name, included in every event sent to Home Assistant.
player_name = "You"

# Home Assistant address: host:port, or a full http(s):// URL.
address = "homeassistant.local:8123"

# Long-lived access token (Home Assistant profile -> Security).
token = ""

# Steam:      C:/Program Files (x86)/Steam/steamapps/common/Path of Exile 2/logs/Client.txt
# Standalone: C:/Program Files (x86)/Grinding Gear Games/Path of Exile 2/logs/Client.txt
log_file = "C:/Program Files (x86)/Steam/steamapps/common/Path of Exile 2/logs/Client.txt"

# Log every line read from the client log.
debug = false
"#;

/// Runs the init command.
pub fn run<W: Write>(writer: &mut W, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    std::fs::write(path, TEMPLATE)
        .with_context(|| format!("failed to write {}", path.display()))?;

    writeln!(writer, "Wrote config template to {}", path.display())?;
    writeln!(writer, "Fill in `token` and check `log_file`, then run `poe-ha`.")?;
    Ok(())
}
