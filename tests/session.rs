// ABOUTME: Integration tests for the single-consumer dispatch session.
// ABOUTME: Checks ordering, concurrent producers, and the drained report.

mod support;

use rollwatch::progress::{
    Component, DispatchSession, InstallationPhase, ProcessEventKind, ProcessUpdate,
};
use rollwatch::step::StepFactory;

#[tokio::test]
async fn updates_from_one_producer_apply_in_order() {
    support::init_tracing();
    let (factory, recorder) = StepFactory::recording();
    let session = DispatchSession::start(factory, 4);
    let sender = session.sender().unwrap();

    for event in [ProcessEventKind::Start, ProcessEventKind::Finished] {
        sender
            .send(ProcessUpdate::phase(
                InstallationPhase::InstallPreRequisites,
                event,
            ))
            .await
            .unwrap();
    }
    drop(sender);

    let report = session.finish().await;
    assert!(!report.failed);
    assert!(report.errors.is_empty());
    assert_eq!(report.unresolved_phases, 0);
    assert_eq!(recorder.len(), 1);
    assert!(recorder.steps()[0].is_successful());
}

#[tokio::test]
async fn concurrent_producers_are_serialized() {
    support::init_tracing();
    let (factory, recorder) = StepFactory::recording();
    let session = DispatchSession::start(factory, 2);
    session
        .sender()
        .unwrap()
        .send(ProcessUpdate::phase(
            InstallationPhase::InstallComponents,
            ProcessEventKind::Start,
        ))
        .await
        .unwrap();

    let mut producers = Vec::new();
    for worker in 0..8 {
        let sender = session.sender().unwrap();
        producers.push(tokio::spawn(async move {
            for i in 0..5 {
                let name = format!("comp-{worker}-{i}");
                sender
                    .send(ProcessUpdate::component(
                        InstallationPhase::InstallComponents,
                        ProcessEventKind::Running,
                        Component::installed(name),
                    ))
                    .await
                    .unwrap();
            }
        }));
    }
    for producer in producers {
        producer.await.unwrap();
    }

    let report = session.finish().await;
    assert!(!report.failed);
    assert!(report.errors.is_empty());
    assert_eq!(report.unresolved_phases, 1);
    assert_eq!(recorder.len(), 41);
    assert!(recorder.steps()[1..].iter().all(|s| s.is_successful()));
}

#[tokio::test]
async fn report_collects_errors_and_open_phases() {
    support::init_tracing();
    let (factory, _recorder) = StepFactory::recording();
    let mut session = DispatchSession::start(factory, 8);
    let mut live_errors = session.take_errors().unwrap();
    assert!(session.take_errors().is_none());
    let sender = session.sender().unwrap();

    let updates = [
        ProcessUpdate::phase(InstallationPhase::InstallComponents, ProcessEventKind::Start),
        ProcessUpdate::phase(InstallationPhase::InstallComponents, ProcessEventKind::Start),
        ProcessUpdate::component(
            InstallationPhase::InstallComponents,
            ProcessEventKind::ExecutionFailure,
            Component::failed("comp2", Some("crashloop")),
        ),
    ];
    for update in updates {
        sender.send(update).await.unwrap();
    }
    drop(sender);

    let report = session.finish().await;
    assert!(report.failed);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.protocol_violations().count(), 1);
    assert_eq!(report.unresolved_phases, 1);

    let first = live_errors.recv().await.unwrap();
    assert!(first.is_protocol_violation());
    let second = live_errors.recv().await.unwrap();
    assert_eq!(
        second.to_string(),
        "Deployment of component 'comp2' failed: crashloop"
    );
    assert!(live_errors.recv().await.is_none());
}

#[tokio::test]
async fn report_keeps_errors_without_a_live_listener() {
    support::init_tracing();
    let (factory, recorder) = StepFactory::recording();
    let session = DispatchSession::start(factory, 8);
    let sender = session.sender().unwrap();

    let updates = [
        ProcessUpdate::phase(InstallationPhase::InstallComponents, ProcessEventKind::Start),
        ProcessUpdate::phase(InstallationPhase::InstallComponents, ProcessEventKind::ExecutionFailure),
        ProcessUpdate::phase(InstallationPhase::InstallComponents, ProcessEventKind::Finished),
    ];
    for update in updates {
        sender.send(update).await.unwrap();
    }
    drop(sender);

    let report = session.finish().await;
    assert!(report.failed);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.protocol_violations().count(), 1);
    assert_eq!(recorder.len(), 1);
}

#[tokio::test]
async fn extra_steps_share_the_session_factory() {
    let (factory, recorder) = StepFactory::recording();
    let session = DispatchSession::start(factory, 1);

    let mut step = session.add_step("Importing certificates");
    step.start();
    step.succeed(None);

    session.finish().await;
    assert_eq!(recorder.labels(), vec!["Importing certificates"]);
    assert!(recorder.steps()[0].is_successful());
}
