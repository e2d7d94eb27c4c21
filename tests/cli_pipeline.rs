#![cfg(unix)]

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::Path;

use clap::Parser;

use orchestrator::cli::CliArgs;
use orchestrator::record::read_summary;

type TestResult = Result<(), Box<dyn Error>>;

fn write_pipeline(dir: &Path, logs: &Path, second_cmd: &str) -> Result<String, Box<dyn Error>> {
    let path = dir.join("Pipeline.toml");
    std::fs::write(
        &path,
        format!(
            r#"
            [defaults]
            log_dir = "{logs}"
            timeout = "10s"
            poll_schedule = ["100ms"]
            success_markers = []

            [[step]]
            name = "first"
            description = "Say hello"
            cmd = "echo hello"

            [[step]]
            name = "second"
            cmd = "{second_cmd}"
            "#,
            logs = logs.display()
        ),
    )?;
    Ok(path.display().to_string())
}

async fn run_cli(argv: &[&str]) -> Result<i32, Box<dyn Error>> {
    let args = CliArgs::try_parse_from(argv.iter().copied())?;
    Ok(orchestrator::run(args).await?)
}

#[tokio::test]
async fn list_exits_zero_without_running_anything() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let logs = dir.path().join("logs");
    let config = write_pipeline(dir.path(), &logs, "exit 1")?;

    let code = run_cli(&["orchestrator", "pipeline", "--config", &config, "--list"]).await?;

    assert_eq!(code, 0);
    assert!(!logs.exists(), "listing must not create records");
    Ok(())
}

#[tokio::test]
async fn pipeline_exit_code_follows_the_steps() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;

    let ok_logs = dir.path().join("ok");
    let ok_config = write_pipeline(dir.path(), &ok_logs, "true")?;
    let code = run_cli(&["orchestrator", "pipeline", "--config", &ok_config]).await?;
    assert_eq!(code, 0);
    assert_eq!(read_summary(&ok_logs)?.steps_succeeded, 2);

    let bad_logs = dir.path().join("bad");
    let bad_config = write_pipeline(dir.path(), &bad_logs, "exit 3")?;
    let code = run_cli(&["orchestrator", "--log-level", "debug", "pipeline", "--config", &bad_config])
        .await?;
    assert_eq!(code, 1);
    let summary = read_summary(&bad_logs)?;
    assert_eq!(summary.steps_executed, 2);
    assert_eq!(summary.steps_failed, 1);
    Ok(())
}

#[tokio::test]
async fn single_run_exit_code_mirrors_the_child() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let logs = dir.path().display().to_string();

    let code = run_cli(&[
        "orchestrator",
        "--name",
        "cli-exit",
        "--cmd",
        "exit 5",
        "--log-dir",
        &logs,
        "--poll-schedule",
        "100ms",
    ])
    .await?;

    assert_eq!(code, 5);
    Ok(())
}
