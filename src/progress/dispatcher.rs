// ABOUTME: Maps update events onto progress steps, one open step per phase.
// ABOUTME: Not safe to call concurrently; DispatchSession serializes callers.

use std::collections::HashMap;

use crate::step::{Step, StepFactory};

use super::error::DispatchError;
use super::event::{ComponentStatus, InstallationPhase, ProcessEventKind, ProcessUpdate};

/// Translates a stream of `ProcessUpdate`s into step transitions.
///
/// Keeps one open step per phase. Component updates need an open phase and
/// get a fresh step each, since components finish independently and in no
/// guaranteed order. A repeated report of the same component outcome within
/// a phase is dropped.
#[derive(Debug)]
pub struct Dispatcher {
    factory: StepFactory,
    ongoing: HashMap<InstallationPhase, Step>,
    /// Last reported outcome per component (true = succeeded), per phase.
    reported: HashMap<InstallationPhase, HashMap<String, bool>>,
    failed: bool,
}

impl Dispatcher {
    pub fn new(factory: StepFactory) -> Self {
        Self {
            factory,
            ongoing: HashMap::new(),
            reported: HashMap::new(),
            failed: false,
        }
    }

    /// Whether any processed update reported a failure. Never resets.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Phases with a started, unresolved step.
    pub fn ongoing_phases(&self) -> Vec<&InstallationPhase> {
        self.ongoing.keys().collect()
    }

    pub fn is_ongoing(&self, phase: &InstallationPhase) -> bool {
        self.ongoing.contains_key(phase)
    }

    /// Process one update.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation for a duplicate start or a stop without
    /// start, and a deployment failure when the update reports one.
    pub fn dispatch(&mut self, update: ProcessUpdate) -> Result<(), DispatchError> {
        tracing::debug!(
            phase = %update.phase,
            event = %update.event,
            component = %update.component.name,
            "dispatching update"
        );

        match update.event {
            ProcessEventKind::Running if update.is_component_update() => {
                self.close_component(update)
            }
            // Phase-level ticks carry no information.
            ProcessEventKind::Running => Ok(()),
            ProcessEventKind::Start => self.open_phase(update.phase),
            _ if update.is_component_update() => self.close_component(update),
            _ => self.close_phase(update),
        }
    }

    fn open_phase(&mut self, phase: InstallationPhase) -> Result<(), DispatchError> {
        if self.ongoing.contains_key(&phase) {
            return Err(DispatchError::DuplicateStart { phase });
        }

        let mut step = self.factory.new_step(phase.label());
        step.start();
        self.reported.remove(&phase);
        self.ongoing.insert(phase, step);
        Ok(())
    }

    fn close_phase(&mut self, update: ProcessUpdate) -> Result<(), DispatchError> {
        let ProcessUpdate {
            phase, event, error, ..
        } = update;

        let Some(mut step) = self.ongoing.remove(&phase) else {
            return Err(DispatchError::StopWithoutStart { phase });
        };

        if event == ProcessEventKind::Finished {
            step.succeed(Some(&format!("{} finished successfully", phase.label())));
            return Ok(());
        }

        let message = with_detail(format!("{} failed", phase.label()), error.as_deref());
        step.fail(Some(&message));
        self.failed = true;
        Err(DispatchError::PhaseFailed {
            phase,
            event,
            error,
        })
    }

    fn close_component(&mut self, update: ProcessUpdate) -> Result<(), DispatchError> {
        if !self.ongoing.contains_key(&update.phase) {
            return Err(DispatchError::StopWithoutStart {
                phase: update.phase,
            });
        }

        let component = update.component;
        let succeeded = component.status != ComponentStatus::Error;

        let seen = self.reported.entry(update.phase.clone()).or_default();
        if seen.get(&component.name) == Some(&succeeded) {
            tracing::debug!(component = %component.name, "duplicate component report ignored");
            return Ok(());
        }
        seen.insert(component.name.clone(), succeeded);

        let mut step = self
            .factory
            .new_step(update.phase.component_label(&component.name));
        step.start();

        if succeeded {
            step.succeed(None);
            return Ok(());
        }

        let message = with_detail(
            format!("Deployment of component '{}' failed", component.name),
            component.error.as_deref(),
        );
        step.fail(Some(&message));
        self.failed = true;
        Err(DispatchError::ComponentFailed {
            component: component.name,
            message,
        })
    }
}

fn with_detail(message: String, detail: Option<&str>) -> String {
    match detail {
        Some(d) if !d.is_empty() => format!("{message}: {d}"),
        _ => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Component;

    fn start(phase: InstallationPhase) -> ProcessUpdate {
        ProcessUpdate::phase(phase, ProcessEventKind::Start)
    }

    #[test]
    fn phase_level_running_is_ignored() {
        let (factory, recorder) = StepFactory::recording();
        let mut dispatcher = Dispatcher::new(factory);

        let tick = ProcessUpdate::phase(
            InstallationPhase::InstallComponents,
            ProcessEventKind::Running,
        );
        assert!(dispatcher.dispatch(tick).is_ok());
        assert!(recorder.is_empty());
        assert!(!dispatcher.failed());
    }

    #[test]
    fn open_phase_is_tracked_until_closed() {
        let (factory, _recorder) = StepFactory::recording();
        let mut dispatcher = Dispatcher::new(factory);
        let phase = InstallationPhase::InstallPreRequisites;

        dispatcher.dispatch(start(phase.clone())).unwrap();
        assert!(dispatcher.is_ongoing(&phase));

        dispatcher
            .dispatch(ProcessUpdate::phase(phase.clone(), ProcessEventKind::Finished))
            .unwrap();
        assert!(!dispatcher.is_ongoing(&phase));
        assert!(dispatcher.ongoing_phases().is_empty());
    }

    #[test]
    fn failed_component_message_includes_error_text() {
        let (factory, recorder) = StepFactory::recording();
        let mut dispatcher = Dispatcher::new(factory);
        dispatcher
            .dispatch(start(InstallationPhase::InstallComponents))
            .unwrap();

        let err = dispatcher
            .dispatch(ProcessUpdate::component(
                InstallationPhase::InstallComponents,
                ProcessEventKind::ExecutionFailure,
                Component::failed("comp2", Some("helm release stuck")),
            ))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Deployment of component 'comp2' failed: helm release stuck"
        );
        let steps = recorder.steps();
        assert_eq!(steps[1].label, "Component 'comp2' deployed");
        assert_eq!(
            steps[1].message(),
            Some("Deployment of component 'comp2' failed: helm release stuck")
        );
        assert!(dispatcher.failed());
    }

    #[test]
    fn repeated_component_outcome_creates_one_step() {
        let (factory, recorder) = StepFactory::recording();
        let mut dispatcher = Dispatcher::new(factory);
        let phase = InstallationPhase::InstallComponents;
        dispatcher.dispatch(start(phase.clone())).unwrap();

        for event in [ProcessEventKind::Running, ProcessEventKind::Finished] {
            dispatcher
                .dispatch(ProcessUpdate::component(
                    phase.clone(),
                    event,
                    Component::installed("comp1"),
                ))
                .unwrap();
        }
        assert_eq!(recorder.len(), 2);

        // A changed outcome supersedes the earlier report.
        let err = dispatcher.dispatch(ProcessUpdate::component(
            phase,
            ProcessEventKind::ExecutionFailure,
            Component::failed("comp1", None),
        ));
        assert!(err.is_err());
        assert_eq!(recorder.len(), 3);
    }

    #[test]
    fn with_detail_skips_empty_text() {
        assert_eq!(with_detail("x failed".to_string(), Some("")), "x failed");
        assert_eq!(with_detail("x failed".to_string(), None), "x failed");
        assert_eq!(with_detail("x failed".to_string(), Some("boom")), "x failed: boom");
    }
}
