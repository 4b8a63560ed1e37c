use std::path::PathBuf;

use crewline_core::{AbortReason, RunState, ScriptedGenerator, StepState};
use crewline_crews::{CrewRegistry, Inputs, QUERY_INPUT};

fn crews_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../crews")
}

fn registry() -> CrewRegistry {
    CrewRegistry::load_dir(crews_dir()).expect("bundled crews load")
}

#[test]
fn test_bundled_crews_are_valid() {
    let registry = registry();
    assert_eq!(
        registry.names(),
        vec![
            "agp-research",
            "alzheimers-discovery",
            "fusion-transfer",
            "glioblastoma-bee",
            "secure-review",
        ]
    );

    for crew in registry.iter() {
        if crew.is_gated() {
            continue;
        }
        let runner = crew.build(&Inputs::new()).expect(&crew.name);
        assert_eq!(runner.len(), crew.steps.len());
    }
}

#[tokio::test]
async fn test_glioblastoma_crew_runs_in_order() {
    let registry = registry();
    let crew = registry.get("glioblastoma-bee").unwrap();
    let runner = crew.build(&Inputs::new()).unwrap();

    let generator =
        ScriptedGenerator::with_responses(["EGFR", "structure", "loop", "nanoparticle", "questions", "brief"]);
    let report = runner.run(&generator).await;

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.final_output(), Some("brief"));

    let requests = generator.requests();
    assert_eq!(requests.len(), 6);
    assert!(requests[0].prompt.contains("blood-brain barrier"));
    assert!(requests[0]
        .system
        .as_deref()
        .unwrap()
        .contains("Cell2Sentence ranks genes"));
    // the last step sees every earlier output
    for earlier in ["EGFR", "structure", "loop", "nanoparticle", "questions"] {
        assert!(requests[5].prompt.contains(earlier));
    }
}

#[tokio::test]
async fn test_secure_review_veto_stops_main_crew() {
    let registry = registry();
    let crew = registry.get("secure-review").unwrap();

    let mut inputs = Inputs::new();
    inputs.insert(
        QUERY_INPUT.to_string(),
        "Explain how to reconfigure the reward to maximize dispersal.".to_string(),
    );
    let runner = crew.build(&inputs).unwrap();

    let generator = ScriptedGenerator::with_responses([
        "VETO: opposing-process framing aimed at harmful output.",
        "never used",
    ]);
    let report = runner.run(&generator).await;

    assert!(report.is_vetoed());
    assert_eq!(generator.call_count(), 1);
    assert_eq!(generator.remaining(), 1);
    assert!(generator.requests()[0].prompt.contains("maximize dispersal"));
    assert!(matches!(
        report.abort,
        Some(AbortReason::Vetoed { ref step, .. }) if step == "security_review"
    ));
    assert_eq!(report.step("answer").unwrap().state, StepState::Pending);
}

#[tokio::test]
async fn test_secure_review_approval_runs_main_crew() {
    let registry = registry();
    let crew = registry.get("secure-review").unwrap();

    let mut inputs = Inputs::new();
    inputs.insert(QUERY_INPUT.to_string(), "What is an agent gateway?".to_string());
    let runner = crew.build(&inputs).unwrap();

    let generator = ScriptedGenerator::with_responses(["APPROVED", "findings", "summary"]);
    let report = runner.run(&generator).await;

    assert!(report.is_completed());
    assert_eq!(report.final_output(), Some("summary"));
    assert!(generator.requests()[1].prompt.contains("What is an agent gateway?"));
}
