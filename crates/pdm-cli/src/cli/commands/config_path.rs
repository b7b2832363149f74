//! `pdm config-path` – print the default config file location.

use anyhow::Result;
use pdm_core::config;

pub fn run_config_path() -> Result<()> {
    println!("{}", config::config_path()?.display());
    Ok(())
}
