// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates rollwatch.yml template files.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::ResourceRef;

use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, resource: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let Some(r) = resource {
        config.resource = ResourceRef::parse(r).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

pub fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"resource: {}
namespace: {}
kubectl:
  binary: {}
  # kubeconfig: ~/.kube/config
  # context: my-cluster
watch:
  interval: {}
  call_timeout: {}
  # Give up after this long (default: wait forever)
  # timeout: 1h
hooks:
  # Ask before running .rollwatch/hooks/post-install and friends
  confirm: {}
"#,
        config.resource,
        config.namespace.as_deref().unwrap_or("default"),
        config.kubectl.binary,
        humantime_serde::re::humantime::format_duration(config.watch.interval),
        humantime_serde::re::humantime::format_duration(config.watch.call_timeout),
        config.hooks.confirm,
    )
}
