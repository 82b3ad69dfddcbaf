//! Workflow execution: context threading and stop-on-failure.

use serde_json::json;
use troupe_agent::Orchestrator;
use troupe_core::{Agent, AgentStatus, ContextKeys, TaskContext};
use troupe_testing::MockProcessor;

fn register(orchestrator: &Orchestrator, name: &str, processor: &MockProcessor) {
    orchestrator.add_agent(Agent::new(name).with_processor(processor.clone()));
}

#[tokio::test]
async fn failing_step_stops_the_workflow() {
    let orchestrator = Orchestrator::default();
    let a = MockProcessor::returning("a-out");
    let b = MockProcessor::failing("b exploded");
    let c = MockProcessor::returning("c-out");
    register(&orchestrator, "A", &a);
    register(&orchestrator, "B", &b);
    register(&orchestrator, "C", &c);
    orchestrator.create_workflow("pipeline", ["A", "B", "C"]);

    let results = orchestrator
        .run_workflow("pipeline", "go", TaskContext::new())
        .await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_success());
    assert!(!results[1].is_success());
    assert_eq!(results[1].error(), Some("b exploded"));
    assert_eq!(c.call_count(), 0);

    let status = orchestrator.get_status();
    assert_eq!(status.agents["A"], AgentStatus::Completed);
    assert_eq!(status.agents["B"], AgentStatus::Failed);
    assert_eq!(status.agents["C"], AgentStatus::Idle);
}

#[tokio::test]
async fn previous_result_is_threaded_to_the_next_step() {
    let orchestrator = Orchestrator::default();
    let a = MockProcessor::returning(json!({"draft": "v1"}));
    let b = MockProcessor::returning("b-out");
    register(&orchestrator, "A", &a);
    register(&orchestrator, "B", &b);
    orchestrator.create_workflow("pair", ["A", "B"]);

    let results = orchestrator
        .run_workflow("pair", "write", TaskContext::new())
        .await;

    assert_eq!(results.len(), 2);
    let seen_by_b = b.last_context().unwrap();
    assert_eq!(
        seen_by_b.get(ContextKeys::PREVIOUS_RESULT),
        results[0].output()
    );
    assert!(
        a.last_context()
            .unwrap()
            .get(ContextKeys::PREVIOUS_RESULT)
            .is_none()
    );
}

#[tokio::test]
async fn every_step_receives_the_initial_task_and_context() {
    let orchestrator = Orchestrator::default();
    let a = MockProcessor::new();
    let b = MockProcessor::new();
    register(&orchestrator, "A", &a);
    register(&orchestrator, "B", &b);
    orchestrator.create_workflow("flow", ["A", "B"]);

    let mut context = TaskContext::new();
    context.insert("tenant".to_string(), json!("acme"));

    orchestrator.run_workflow("flow", "audit", context).await;

    assert_eq!(a.tasks(), vec!["audit"]);
    assert_eq!(b.tasks(), vec!["audit"]);
    assert_eq!(b.last_context().unwrap()["tenant"], json!("acme"));
}

#[tokio::test]
async fn repeated_agent_sees_its_own_previous_output() {
    let orchestrator = Orchestrator::default();
    let looped = MockProcessor::new();
    register(&orchestrator, "loop", &looped);
    orchestrator.create_workflow("twice", ["loop", "loop"]);

    let results = orchestrator
        .run_workflow("twice", "iterate", TaskContext::new())
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(looped.call_count(), 2);
    let contexts = looped.contexts();
    assert_eq!(
        contexts[1].get(ContextKeys::PREVIOUS_RESULT),
        results[0].output()
    );
}

#[tokio::test]
async fn workflow_definition_can_change_between_runs() {
    let orchestrator = Orchestrator::default();
    let a = MockProcessor::new();
    let b = MockProcessor::new();
    register(&orchestrator, "A", &a);
    register(&orchestrator, "B", &b);

    orchestrator.create_workflow("flow", ["A"]);
    assert_eq!(
        orchestrator
            .run_workflow("flow", "t", TaskContext::new())
            .await
            .len(),
        1
    );

    orchestrator.create_workflow("flow", ["A", "B"]);
    assert_eq!(
        orchestrator
            .run_workflow("flow", "t", TaskContext::new())
            .await
            .len(),
        2
    );

    orchestrator.remove_workflow("flow");
    let results = orchestrator
        .run_workflow("flow", "t", TaskContext::new())
        .await;
    assert_eq!(results[0].error(), Some("Workflow 'flow' not found"));
}
