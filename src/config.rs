//! Store and logging settings, read from TOML
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory of the sled database holding the requests.
    pub db_path: PathBuf,
    /// bech32 human-readable part of generated request codes.
    pub code_prefix: String,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("sgpm-requests.db"),
            code_prefix: "sol".to_string(),
            log_filter: "sgpm_workflow=info".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents).context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> anyhow::Result<()> {
        // same rules bech32 applies to the hrp, checked early for a clearer error
        bech32::Hrp::parse(&self.code_prefix)
            .with_context(|| format!("code_prefix '{}' is not a valid bech32 hrp", self.code_prefix))?;
        if self.db_path.as_os_str().is_empty() {
            anyhow::bail!("db_path must not be empty");
        }
        Ok(())
    }
}
