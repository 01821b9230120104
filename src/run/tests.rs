use super::*;
use crate::Result;
use std::fs;
use tempfile::tempdir;

#[test]
fn captures_stdout() -> Result<()> {
    let output = shell("echo hello").quiet().run()?;
    assert!(output.success());
    assert_eq!(output.stdout_text()?.trim(), "hello");
    Ok(())
}

#[test]
fn merges_stderr_into_capture() -> Result<()> {
    let output = shell("echo warn 1>&2").quiet().run()?;
    assert!(output.stdout_text()?.contains("warn"));
    Ok(())
}

#[test]
fn check_turns_failure_into_error() {
    let result = shell("exit 3").quiet().run();
    match result {
        Err(crate::Error::Command { status, .. }) => assert_eq!(status.code(), Some(3)),
        other => panic!("expected command error, got {other:?}"),
    }
}

#[test]
fn unchecked_failure_reports_code() -> Result<()> {
    let output = shell("exit 7").quiet().check(false).run()?;
    assert!(!output.success());
    assert_eq!(output.code, 7);
    Ok(())
}

#[test]
fn tees_to_log_file() -> Result<()> {
    let temp = tempdir()?;
    let log = temp.path().join("run.log");
    shell("echo teed").quiet().log_to(&log).run()?;
    let contents = fs::read_to_string(&log)?;
    assert!(contents.starts_with("running command:"));
    assert!(contents.contains("teed"));
    Ok(())
}

#[test]
fn kill_on_output_stops_the_child() -> Result<()> {
    let output = shell("echo marker; exec sleep 30")
        .quiet()
        .check(false)
        .kill_on_output("marker")
        .run()?;
    assert!(!output.success());
    assert!(output.stdout_text()?.contains("marker"));
    assert!(output.duration.as_secs() < 25);
    Ok(())
}

#[test]
fn dry_run_skips_execution() -> Result<()> {
    let temp = tempdir()?;
    let target = temp.path().join("made-by-child");
    let output = shell(format!("touch {}", target.display()))
        .quiet()
        .dry_run(true)
        .run()?;
    assert!(output.success());
    assert!(output.stdout.is_empty());
    assert!(!target.exists());
    Ok(())
}

#[test]
fn read_returns_raw_text() -> Result<()> {
    let text = exec("sh").arg("-c").arg("printf 'a\\nb\\n'").read()?;
    assert_eq!(text, "a\nb\n");
    Ok(())
}

#[test]
fn capture_tty_rejects_single_quotes() {
    let result = exec("echo").arg("it's quoted").capture_tty().quiet().run();
    match result {
        Err(crate::Error::Io(err)) => {
            assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput)
        }
        other => panic!("expected an invalid-input error, got {other:?}"),
    }
}

#[test]
fn background_process_can_be_terminated() -> Result<()> {
    let mut background = shell("sleep 30").spawn_background(None)?;
    assert!(background.pid().is_some());
    assert!(!background.stopped()?);
    background.terminate()?;
    assert!(background.stopped()?);
    Ok(())
}

#[test]
fn background_logs_output() -> Result<()> {
    let temp = tempdir()?;
    let log = temp.path().join("bg.log");
    let mut background = shell("echo from-background").spawn_background(Some(&log))?;
    // give the child a moment to run to completion
    for _ in 0..50 {
        if background.stopped()? {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(20));
    }
    let contents = fs::read_to_string(&log)?;
    assert!(contents.contains("from-background"));
    Ok(())
}
