// ABOUTME: Update events pushed by the deployment engine.
// ABOUTME: Phases, event kinds, components, and the ProcessUpdate envelope.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Top-level stage of one deployment run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstallationPhase {
    InstallPreRequisites,
    UninstallPreRequisites,
    InstallComponents,
    UninstallComponents,
    /// A stage added by the caller around the deployment, named verbatim.
    Custom(String),
}

impl InstallationPhase {
    pub fn as_str(&self) -> &str {
        match self {
            InstallationPhase::InstallPreRequisites => "InstallPreRequisites",
            InstallationPhase::UninstallPreRequisites => "UninstallPreRequisites",
            InstallationPhase::InstallComponents => "InstallComponents",
            InstallationPhase::UninstallComponents => "UninstallComponents",
            InstallationPhase::Custom(name) => name,
        }
    }

    /// The text shown on this phase's step.
    pub fn label(&self) -> &str {
        match self {
            InstallationPhase::InstallPreRequisites => "Deploying pre-requisites",
            InstallationPhase::UninstallPreRequisites => "Undeploying pre-requisites",
            InstallationPhase::InstallComponents => "Deploying Kyma",
            InstallationPhase::UninstallComponents => "Undeploying Kyma",
            InstallationPhase::Custom(name) => name,
        }
    }

    pub fn is_uninstall(&self) -> bool {
        matches!(
            self,
            InstallationPhase::UninstallPreRequisites | InstallationPhase::UninstallComponents
        )
    }

    /// Label of the step shown for one component finishing in this phase.
    pub fn component_label(&self, component: &str) -> String {
        if self.is_uninstall() {
            format!("Component '{component}' removed")
        } else {
            format!("Component '{component}' deployed")
        }
    }
}

impl From<&str> for InstallationPhase {
    fn from(value: &str) -> Self {
        match value {
            "InstallPreRequisites" => InstallationPhase::InstallPreRequisites,
            "UninstallPreRequisites" => InstallationPhase::UninstallPreRequisites,
            "InstallComponents" => InstallationPhase::InstallComponents,
            "UninstallComponents" => InstallationPhase::UninstallComponents,
            other => InstallationPhase::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for InstallationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InstallationPhase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InstallationPhase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(InstallationPhase::from(s.as_str()))
    }
}

/// What happened to a phase or component.
///
/// For component updates, `Running` means the component finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessEventKind {
    #[serde(alias = "ProcessStart")]
    Start,
    #[serde(alias = "ProcessRunning")]
    Running,
    #[serde(alias = "ProcessFinished")]
    Finished,
    #[serde(alias = "ProcessExecutionFailure")]
    ExecutionFailure,
    #[serde(alias = "ProcessForceQuitFailure")]
    ForceQuitFailure,
}

impl fmt::Display for ProcessEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessEventKind::Start => "Start",
            ProcessEventKind::Running => "Running",
            ProcessEventKind::Finished => "Finished",
            ProcessEventKind::ExecutionFailure => "ExecutionFailure",
            ProcessEventKind::ForceQuitFailure => "ForceQuitFailure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComponentStatus {
    #[default]
    Unknown,
    Installed,
    Error,
}

/// One deployable unit inside a phase.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: ComponentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Component {
    pub fn installed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ComponentStatus::Installed,
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, error: Option<&str>) -> Self {
        Self {
            name: name.into(),
            status: ComponentStatus::Error,
            error: error.map(str::to_string),
        }
    }
}

/// A single entry of the update stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessUpdate {
    pub phase: InstallationPhase,
    pub event: ProcessEventKind,
    #[serde(default)]
    pub component: Component,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessUpdate {
    /// A phase-level update.
    pub fn phase(phase: InstallationPhase, event: ProcessEventKind) -> Self {
        Self {
            phase,
            event,
            component: Component::default(),
            error: None,
        }
    }

    /// A component-level update.
    pub fn component(phase: InstallationPhase, event: ProcessEventKind, component: Component) -> Self {
        Self {
            phase,
            event,
            component,
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn is_component_update(&self) -> bool {
        !self.component.name.is_empty()
    }
}
