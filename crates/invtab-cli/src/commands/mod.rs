//! Subcommands of the `invtab` binary.

pub mod config;
pub mod extract;

use std::path::Path;

use anyhow::Context;
use invtab_core::InvtabConfig;

/// Load the config given with `--config`, else the user config file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvtabConfig> {
    if let Some(path) = config_path {
        return InvtabConfig::from_file(Path::new(path))
            .with_context(|| format!("failed to load config {}", path));
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        InvtabConfig::from_file(&default_path)
            .with_context(|| format!("failed to load config {}", default_path.display()))
    } else {
        Ok(InvtabConfig::default())
    }
}
