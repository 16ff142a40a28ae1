// ABOUTME: How rollwatch invokes kubectl against the target cluster.
// ABOUTME: Binary path plus optional kubeconfig and context selection.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct KubectlConfig {
    #[serde(default = "default_binary")]
    pub binary: String,

    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,

    #[serde(default)]
    pub context: Option<String>,
}

fn default_binary() -> String {
    "kubectl".to_string()
}

impl Default for KubectlConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            kubeconfig: None,
            context: None,
        }
    }
}
