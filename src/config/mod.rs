// ABOUTME: Configuration types and parsing for rollwatch.yml.
// ABOUTME: Handles YAML parsing, file discovery, and validation of durations.

mod init;
mod kubectl;
mod watch;

pub use init::{generate_template_yaml, init_config};
pub use kubectl::KubectlConfig;
pub use watch::WatchConfig;

use crate::error::{Error, Result};
use crate::types::ResourceRef;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "rollwatch.yml";
pub const CONFIG_FILENAME_ALT: &str = "rollwatch.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".rollwatch/config.yml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub resource: ResourceRef,

    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub kubectl: KubectlConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub hooks: HooksConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HooksConfig {
    /// Ask before running a post-operation hook.
    #[serde(default)]
    pub confirm: bool,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// First existing config file in `dir`, in discovery order.
    pub fn find(dir: &Path) -> Option<PathBuf> {
        [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        match Self::find(dir) {
            Some(path) => Self::load(&path),
            None => Err(Error::ConfigNotFound(dir.to_path_buf())),
        }
    }

    /// Like `discover`, but a missing file yields the defaults.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => {
                tracing::debug!("no config file in {}, using defaults", dir.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn template() -> Self {
        Self {
            namespace: Some("default".to_string()),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.watch.interval.is_zero() {
            return Err(Error::InvalidConfig(
                "watch.interval must be greater than zero".to_string(),
            ));
        }
        if self.watch.call_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "watch.call_timeout must be greater than zero".to_string(),
            ));
        }
        if self.kubectl.binary.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "kubectl.binary must not be empty".to_string(),
            ));
        }
        if let Some(namespace) = &self.namespace
            && namespace.trim().is_empty()
        {
            return Err(Error::InvalidConfig(
                "namespace must not be empty when set".to_string(),
            ));
        }
        Ok(())
    }
}
