use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use orchestrator::config::{PipelineConfig, RawPipelineFile, load_and_validate};
use orchestrator::errors::OrchestratorError;

type TestResult = Result<(), Box<dyn Error>>;

fn parse(toml_src: &str) -> Result<PipelineConfig, OrchestratorError> {
    let raw: RawPipelineFile = toml::from_str(toml_src)?;
    PipelineConfig::try_from(raw)
}

#[test]
fn defaults_apply_to_every_step() -> TestResult {
    let cfg = parse(
        r#"
        [defaults]
        log_dir = "out/logs"
        timeout = "90s"
        poll_schedule = ["1s", "3s"]
        success_markers = ["READY"]

        [[step]]
        name = "build"
        description = "Build the image"
        cmd = "make build"

        [[step]]
        name = "push"
        cmd = "make push"
        "#,
    )?;

    assert_eq!(cfg.log_dir, PathBuf::from("out/logs"));
    assert_eq!(cfg.steps.len(), 2);
    for step in &cfg.steps {
        assert_eq!(step.run.log_dir, PathBuf::from("out/logs"));
        assert_eq!(step.run.timeout, Duration::from_secs(90));
        assert_eq!(
            step.run.poll_schedule.intervals(),
            &[Duration::from_secs(1), Duration::from_secs(3)]
        );
        assert_eq!(step.run.success_markers, vec!["READY".to_string()]);
    }
    assert_eq!(cfg.steps[0].description, "Build the image");
    // Description falls back to the name.
    assert_eq!(cfg.steps[1].description, "push");
    Ok(())
}

#[test]
fn step_settings_override_defaults() -> TestResult {
    let cfg = parse(
        r#"
        [defaults]
        timeout = "60s"

        [[step]]
        name = "migrate"
        cmd = "./migrate.sh"
        timeout = "15m"
        success_markers = []
        shell = "bash"
        termination_grace = "500ms"

        [[step]]
        name = "smoke"
        cmd = "./smoke.sh"
        "#,
    )?;

    let migrate = &cfg.steps[0].run;
    assert_eq!(migrate.timeout, Duration::from_secs(15 * 60));
    assert!(migrate.success_markers.is_empty());
    assert_eq!(migrate.shell.as_deref(), Some("bash"));
    assert_eq!(migrate.termination_grace, Duration::from_millis(500));

    let smoke = &cfg.steps[1].run;
    assert_eq!(smoke.timeout, Duration::from_secs(60));
    assert!(!smoke.success_markers.is_empty());
    assert_eq!(smoke.shell, None);
    Ok(())
}

#[test]
fn loads_from_disk() -> TestResult {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        r#"
        [[step]]
        name = "only"
        cmd = "true"
        "#
    )?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.steps.len(), 1);
    assert_eq!(cfg.log_dir, PathBuf::from("scripts/logs"));
    Ok(())
}

#[test]
fn rejects_duplicate_step_names() {
    let res = parse(
        r#"
        [[step]]
        name = "same"
        cmd = "true"

        [[step]]
        name = "same"
        cmd = "false"
        "#,
    );
    assert!(matches!(res, Err(OrchestratorError::Config(_))));
}

#[test]
fn rejects_bad_durations() {
    let res = parse(
        r#"
        [[step]]
        name = "x"
        cmd = "true"
        timeout = "whenever"
        "#,
    );
    match res {
        Err(OrchestratorError::Config(msg)) => assert!(msg.contains("timeout"), "{msg}"),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn rejects_empty_pipeline() {
    assert!(matches!(parse(""), Err(OrchestratorError::Config(_))));
}

#[test]
fn rejects_unsafe_and_reserved_names() {
    for name in ["../up", "with space", "pipeline_summary", ""] {
        let src = format!("[[step]]\nname = \"{name}\"\ncmd = \"true\"\n");
        assert!(
            matches!(parse(&src), Err(OrchestratorError::Config(_))),
            "name {name:?} should be rejected"
        );
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    assert!(matches!(
        parse("[[step]\nname = 1"),
        Err(OrchestratorError::Toml(_))
    ));
}
