use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use resume_tailor::extraction::CandidateSnapshot;
use resume_tailor::models::{OutreachType, OutreachVariants};
use resume_tailor::orchestrator::JobContext;
use resume_tailor::pipeline::{ScriptedExecutor, StageKind};
use resume_tailor::workflow::{collect, execute, launch, OptimizationResult};
use resume_tailor::{
    App, Config, ContentExtractionHeuristic, Extraction, PipelineController, PipelineEvent,
    RunState, WorkflowInput, WorkflowKind,
};
use serde_json::json;
use tokio_test::assert_ok;

fn pdf_payload() -> serde_json::Value {
    json!({ "pdf_base64": STANDARD.encode(b"%PDF-1.7 tailored") })
}

fn job_input() -> WorkflowInput {
    WorkflowInput {
        job_description: "Backend engineer, Rust and Postgres".to_string(),
        resume_yaml: "cv:\n  name: Ada Lovelace".to_string(),
        ..Default::default()
    }
}

fn optimization_executor() -> ScriptedExecutor {
    ScriptedExecutor::new()
        .succeed(StageKind::Rewrite, json!({ "yaml": "cv:\n  name: Ada (tailored)" }))
        .succeed(
            StageKind::AtsScore,
            json!({ "score": 82, "feedback": "Good coverage", "missing_keywords": ["Kafka"] }),
        )
        .succeed(StageKind::Render, pdf_payload())
}

#[tokio::test]
async fn test_resume_optimization_end_to_end() {
    let executor = Arc::new(optimization_executor());
    let controller = PipelineController::new(executor.clone());
    let mut events = controller.subscribe();

    let run = assert_ok!(launch(&controller, WorkflowKind::ResumeOptimization, job_input()).await);
    assert_eq!(run.state, RunState::Complete);
    assert_eq!(run.outputs.len(), 3);

    let mut states = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let PipelineEvent::StateChanged { state, .. } = event {
            states.push(state);
        }
    }
    assert_eq!(
        states,
        vec![
            RunState::Idle,
            RunState::Running { phase: 0 },
            RunState::Running { phase: 1 },
            RunState::Complete,
        ]
    );

    // 第二组拿到的是改写后的简历
    let ats_request = executor.request_for(StageKind::AtsScore).unwrap();
    assert_eq!(ats_request["resume_yaml"], "cv:\n  name: Ada (tailored)");

    let result: OptimizationResult = assert_ok!(collect(&run));
    assert!(result.document.is_pdf());
    assert_eq!(result.ats.band().label(), "EXCELLENT");
}

#[tokio::test]
async fn test_fractional_ats_score_keeps_complete_result() {
    let executor = Arc::new(
        optimization_executor().succeed(
            StageKind::AtsScore,
            json!({ "score": 87.5, "feedback": "Solid", "missing_keywords": [] }),
        ),
    );
    let controller = PipelineController::new(executor);

    let run = assert_ok!(launch(&controller, WorkflowKind::ResumeOptimization, job_input()).await);
    assert_eq!(run.state, RunState::Complete);

    let result: OptimizationResult = assert_ok!(collect(&run));
    assert_eq!(result.ats.score, 88);
    assert!(result.document.is_pdf());
}

#[tokio::test]
async fn test_render_failure_keeps_earlier_outputs() {
    let executor = Arc::new(
        ScriptedExecutor::new()
            .succeed(StageKind::Rewrite, json!({ "yaml": "cv: tailored" }))
            .succeed(StageKind::AtsScore, json!({ "score": 64 }))
            .fail_after(StageKind::Render, Duration::from_millis(20), "RenderCV error: bad theme"),
    );
    let controller = PipelineController::new(executor);

    let run = assert_ok!(launch(&controller, WorkflowKind::ResumeOptimization, job_input()).await);

    assert_eq!(run.failure_reason(), Some("RenderCV error: bad theme"));
    assert_eq!(run.status_message, "Error: RenderCV error: bad theme");
    assert!(run.outputs.contains_key(&StageKind::Rewrite));
    assert!(run.outputs.contains_key(&StageKind::AtsScore));
    assert!(!run.outputs.contains_key(&StageKind::Render));
}

#[tokio::test]
async fn test_rewrite_failure_never_starts_second_phase() {
    let executor = Arc::new(
        optimization_executor().fail(StageKind::Rewrite, "Invalid API key"),
    );
    let controller = PipelineController::new(executor.clone());

    let run = assert_ok!(launch(&controller, WorkflowKind::ResumeOptimization, job_input()).await);
    assert_eq!(run.failure_reason(), Some("Invalid API key"));
    assert_eq!(executor.called_stages(), vec![StageKind::Rewrite]);
}

#[tokio::test]
async fn test_outreach_sequence_and_single() {
    let sequence = Arc::new(ScriptedExecutor::new().succeed(
        StageKind::GenerateOutreach,
        json!({ "emails": [
            { "label": "Initial", "subject": "Rust role", "body": "Hi" },
            { "label": "Follow-up 1", "subject": "Re: Rust role", "body": "Checking in" },
            { "label": "Follow-up 2", "subject": "Re: Rust role", "body": "Last note" },
        ]}),
    ));
    let input = WorkflowInput {
        outreach_type: OutreachType::ColdEmail,
        ..job_input()
    };

    let controller = PipelineController::new(sequence.clone());
    let mut variants: OutreachVariants =
        assert_ok!(execute(&controller, WorkflowKind::Outreach, input.clone()).await);
    assert_eq!(variants.variant_count(), 3);
    assert_eq!(variants.selected_index(), Some(0));
    assert!(variants.select(2));
    assert_eq!(variants.active_text(), "Last note");
    assert_eq!(
        sequence.request_for(StageKind::GenerateOutreach).unwrap()["outreach_type"],
        "cold_email"
    );

    let single = Arc::new(ScriptedExecutor::new().succeed(
        StageKind::GenerateOutreach,
        json!({ "content": "Hi Grace, I saw the opening..." }),
    ));
    let controller = PipelineController::new(single);
    let variants: OutreachVariants =
        assert_ok!(execute(&controller, WorkflowKind::Outreach, input).await);
    assert_eq!(variants.variant_count(), 0);
    assert_eq!(variants.selected_index(), None);
    assert_eq!(variants.active_text(), "Hi Grace, I saw the opening...");
}

#[test]
fn test_extraction_priority_through_public_api() {
    let snapshot = CandidateSnapshot::new()
        .with(".show-more-less-html__markup", "x".repeat(120))
        .with("main", "y".repeat(900));

    match ContentExtractionHeuristic::default().extract(&snapshot) {
        Extraction::Found { selector, .. } => assert_eq!(selector, ".show-more-less-html__markup"),
        Extraction::NotFound => panic!("expected a match"),
    }
}

#[tokio::test]
async fn test_batch_app_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let jobs = dir.path().join("jobs");
    std::fs::create_dir_all(&jobs).unwrap();
    std::fs::write(jobs.join("base.yaml"), "cv:\n  name: Ada").unwrap();
    std::fs::write(
        jobs.join("acme.toml"),
        r#"
name = "acme_backend"
company = "Acme"
title = "Backend Engineer"
job_description = "Rust services at scale"
resume_path = "base.yaml"
outreach = "cold_email"
"#,
    )
    .unwrap();
    std::fs::write(
        jobs.join("globex.toml"),
        r#"
name = "globex_platform"
company = "Globex"
title = "Platform Engineer"
job_description = "Kubernetes and Rust"
resume_path = "base.yaml"
cover_letter = false
"#,
    )
    .unwrap();

    let executor = Arc::new(
        optimization_executor()
            .succeed(
                StageKind::GenerateCoverLetter,
                json!({ "cover_letter_text": "Dear Hiring Manager," }),
            )
            .succeed(StageKind::RenderCoverLetterPdf, pdf_payload())
            .succeed(StageKind::GenerateOutreach, json!({ "content": "Hello!" })),
    );

    let output_dir = dir.path().join("out");
    let config = Config {
        jobs_folder: jobs.to_string_lossy().to_string(),
        output_dir: output_dir.to_string_lossy().to_string(),
        output_log_file: dir.path().join("run.txt").to_string_lossy().to_string(),
        max_concurrent_jobs: 1,
        ..Default::default()
    };

    let app = App::with_context(JobContext::new(config, executor.clone()));
    let stats = assert_ok!(app.run().await);

    assert_eq!(stats.total, 2);
    assert_eq!(stats.success, 2);
    assert!(output_dir.join("acme_backend.pdf").exists());
    assert!(output_dir.join("acme_backend_Cover_Letter.pdf").exists());
    assert!(output_dir.join("acme_backend_Outreach.txt").exists());
    assert!(output_dir.join("globex_platform.pdf").exists());
    assert!(!output_dir.join("globex_platform_Cover_Letter.pdf").exists());

    let log = std::fs::read_to_string(dir.path().join("run.txt")).unwrap();
    assert!(log.contains("acme_backend | Acme - Backend Engineer | ATS 82"));
}

#[tokio::test]
async fn test_batch_counts_failed_jobs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cv.yaml"), "cv: {}").unwrap();
    std::fs::write(
        dir.path().join("job.toml"),
        r#"
name = "broken"
job_description = "Anything"
resume_path = "cv.yaml"
"#,
    )
    .unwrap();

    let executor = Arc::new(ScriptedExecutor::new().fail(StageKind::Rewrite, "AI rewrite failed"));
    let config = Config {
        jobs_folder: dir.path().to_string_lossy().to_string(),
        output_dir: dir.path().join("out").to_string_lossy().to_string(),
        output_log_file: dir.path().join("run.txt").to_string_lossy().to_string(),
        ..Default::default()
    };

    let stats = assert_ok!(App::with_context(JobContext::new(config, executor)).run().await);
    assert_eq!((stats.success, stats.failed, stats.total), (0, 1, 1));
}
