use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::verdict::classify;
use super::workspace::Workspace;
use super::*;

const FAKE_TOOL_SCRIPT: &str = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    broken.mp4)
      echo "broken.mp4: Invalid data found when processing input" >&2
      exit 1
      ;;
    slow.mp4)
      sleep 5
      ;;
    corrupt.mp4)
      echo "Error while decoding stream #0:0: Invalid data found when processing input" >&2
      sleep 5
      ;;
  esac
done
exit 0
"#;

fn settings_for(tool: &str, policy: TimeoutPolicy) -> ValidatorSettings {
    ValidatorSettings {
        tool: tool.to_string(),
        ..ValidatorSettings::new(policy)
    }
}

#[cfg(unix)]
fn write_fake_tool(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-ffmpeg");
    fs::write(&path, FAKE_TOOL_SCRIPT).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl ValidationObserver for RecordingObserver {
    fn on_event(&self, event: &ValidationEvent<'_>) {
        let label = match event {
            ValidationEvent::Started { command } => format!("started:{command}"),
            ValidationEvent::Succeeded { .. } => "succeeded".to_string(),
            ValidationEvent::Failed { verdict } => {
                format!("failed:{}", verdict.failure().map(FailureKind::as_str).unwrap_or("?"))
            }
        };
        self.events.lock().unwrap().push(label);
    }
}

#[test]
fn rejects_other_program_without_running_it() {
    let validator = Validator::new(ValidatorSettings::new(TimeoutPolicy::Strict));
    let verdict = validator.validate("nottool -i in.mp4 out.mp4");
    assert!(!verdict.is_valid());
    assert_eq!(verdict.failure(), Some(FailureKind::Structural));
    assert_eq!(
        verdict.error_message(),
        Some("The command must start with \"ffmpeg\"")
    );
    assert_eq!(verdict.dry_run_command(), None);
}

#[test]
fn rejects_missing_input_before_running() {
    let validator = Validator::new(ValidatorSettings::new(TimeoutPolicy::Strict));
    let verdict = validator.validate("ffmpeg -i -f null -");
    assert_eq!(verdict.failure(), Some(FailureKind::Structural));
    assert!(
        verdict
            .error_message()
            .unwrap()
            .starts_with("Missing input file after -i flag")
    );
}

#[test]
fn missing_tool_is_a_spawn_failure() {
    let tool = "kortar-definitely-missing-tool";
    let validator = Validator::new(settings_for(tool, TimeoutPolicy::Strict));
    let verdict = validator.validate(&format!("{tool} -i in.mp4 out.mp4"));
    assert_eq!(verdict.failure(), Some(FailureKind::Spawn));
    assert!(!verdict.is_retryable());
    assert_eq!(verdict.dry_run_command(), None);
}

#[cfg(unix)]
#[test]
fn successful_dry_run_is_valid() {
    let validator = Validator::new(settings_for("true", TimeoutPolicy::Strict));
    let verdict = validator.validate("  true -i in.mp4 out.mp4 ");
    assert!(verdict.is_valid(), "{verdict:?}");
    assert_eq!(verdict.error_message(), None);
    assert_eq!(verdict.normalized_command(), "true -y -i in.mp4 out.mp4");
    assert_eq!(
        verdict.dry_run_command(),
        Some("true -hide_banner -loglevel error -y -i in.mp4 -f null -")
    );
}

#[cfg(unix)]
#[test]
fn quiet_flags_can_be_disabled() {
    let settings = ValidatorSettings {
        quiet_flags: false,
        ..settings_for("true", TimeoutPolicy::Strict)
    };
    let verdict = Validator::new(settings).validate("true -i in.mp4 out.mp4");
    assert_eq!(
        verdict.dry_run_command(),
        Some("true -y -i in.mp4 -f null -")
    );
}

#[cfg(unix)]
#[test]
fn nonzero_exit_without_stderr_reports_status() {
    let validator = Validator::new(settings_for("false", TimeoutPolicy::Strict));
    let verdict = validator.validate("false -i in.mp4 out.mp4");
    assert_eq!(verdict.failure(), Some(FailureKind::Execution));
    assert_eq!(verdict.exit_code(), Some(1));
    assert_eq!(verdict.error_message(), Some("command exited with status 1"));
    assert!(verdict.is_retryable());
}

#[cfg(unix)]
#[test]
fn stderr_is_reported_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_fake_tool(dir.path());
    let tool = tool.to_str().unwrap();
    let validator = Validator::new(settings_for(tool, TimeoutPolicy::Strict));
    let verdict = validator.validate(&format!("{tool} -i broken.mp4 out.mp4"));
    assert_eq!(verdict.failure(), Some(FailureKind::Execution));
    assert_eq!(
        verdict.error_message(),
        Some("broken.mp4: Invalid data found when processing input")
    );
}

#[cfg(unix)]
#[test]
fn strict_policy_fails_on_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_fake_tool(dir.path());
    let tool = tool.to_str().unwrap();
    let validator = Validator::new(settings_for(tool, TimeoutPolicy::Strict));

    let started = Instant::now();
    let verdict = validator
        .validate_with_timeout(&format!("{tool} -i slow.mp4 out.mp4"), Duration::from_millis(300));
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(!verdict.is_valid());
    assert_eq!(verdict.failure(), Some(FailureKind::Timeout));
    assert_eq!(
        verdict.error_message(),
        Some("command timed out after 0.3 seconds")
    );
}

#[cfg(unix)]
#[test]
fn lenient_policy_accepts_timeout_with_note() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_fake_tool(dir.path());
    let tool = tool.to_str().unwrap();
    let settings = ValidatorSettings {
        timeout: Duration::from_millis(300),
        ..settings_for(tool, TimeoutPolicy::Lenient)
    };
    let verdict = Validator::new(settings).validate(&format!("{tool} -i slow.mp4 out.mp4"));
    assert!(verdict.is_valid());
    assert_eq!(verdict.failure(), None);
    assert!(verdict.note().is_some());
}

#[cfg(unix)]
#[test]
fn lenient_policy_rejects_timeout_after_errors() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_fake_tool(dir.path());
    let tool = tool.to_str().unwrap();
    let settings = ValidatorSettings {
        timeout: Duration::from_millis(500),
        ..settings_for(tool, TimeoutPolicy::Lenient)
    };
    let verdict = Validator::new(settings).validate(&format!("{tool} -i corrupt.mp4 out.mp4"));
    assert!(!verdict.is_valid());
    assert_eq!(verdict.failure(), Some(FailureKind::Execution));
    assert_eq!(
        verdict.error_message(),
        Some("Error while decoding stream #0:0: Invalid data found when processing input")
    );
    assert_eq!(verdict.note(), None);
}

#[cfg(unix)]
#[test]
fn lint_rejects_overlay_outside_filter_complex() {
    let settings = ValidatorSettings {
        lint_filter_graph: true,
        ..settings_for("true", TimeoutPolicy::Strict)
    };
    let verdict =
        Validator::new(settings).validate("true -i a.mp4 -i logo.png -vf overlay=10:10 out.mp4");
    assert_eq!(verdict.failure(), Some(FailureKind::Lint));
    assert_eq!(verdict.error_message(), Some(FILTER_COMPLEX_MESSAGE));
}

#[cfg(unix)]
#[test]
fn observer_sees_start_and_result() {
    let observer = Arc::new(RecordingObserver::default());
    let validator = Validator::new(settings_for("false", TimeoutPolicy::Strict))
        .with_observer(observer.clone());
    validator.validate("false -i a.mp4 b.mp4");
    let events = observer.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec!["started:false -i a.mp4 b.mp4", "failed:execution"]
    );
}

#[cfg(unix)]
#[test]
fn validator_is_shared_across_threads() {
    let validator = Validator::new(settings_for("true", TimeoutPolicy::Strict))
        .with_observer(Arc::new(NoopObserver));
    std::thread::scope(|scope| {
        let handles = (0..4)
            .map(|index| {
                let validator = &validator;
                scope.spawn(move || validator.validate(&format!("true -i in{index}.mp4 out.mp4")))
            })
            .collect::<Vec<_>>();
        for handle in handles {
            assert!(handle.join().unwrap().is_valid());
        }
    });
}

#[cfg(unix)]
#[test]
fn executor_captures_exit_code_and_stderr() {
    let outcome = execute("echo out; echo boom >&2; exit 3", Duration::from_secs(5), "sh");
    assert_eq!(
        outcome,
        ExecutionOutcome::Exited {
            code: 3,
            stdout: "out\n".to_string(),
            stderr: "boom\n".to_string(),
        }
    );
}

#[cfg(unix)]
#[test]
fn executor_kills_the_whole_process_group() {
    let started = Instant::now();
    let outcome = execute("sleep 5 & sleep 5", Duration::from_millis(200), "sh");
    assert!(matches!(outcome, ExecutionOutcome::TimedOut { .. }));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[cfg(unix)]
#[test]
fn executor_runs_in_requested_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("marker.txt"), "").unwrap();
    let outcome = execute_in(
        "test -f marker.txt",
        Duration::from_secs(5),
        "sh",
        Some(dir.path()),
    );
    assert!(matches!(outcome, ExecutionOutcome::Exited { code: 0, .. }));
}

#[cfg(unix)]
#[test]
fn executor_does_not_wait_for_processes_that_left_the_group() {
    let started = Instant::now();
    let outcome = execute(
        "setsid sleep 5 & echo done >&2",
        Duration::from_secs(5),
        "sh",
    );
    assert!(started.elapsed() < Duration::from_secs(4));
    let ExecutionOutcome::Exited { code, stderr, .. } = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(code, 0);
    assert!(stderr.contains("done"));
}

#[test]
fn missing_shell_is_a_spawn_failure() {
    let outcome = execute("true", Duration::from_secs(1), "kortar-no-such-shell");
    assert!(matches!(outcome, ExecutionOutcome::SpawnFailed { .. }));
}

#[test]
fn workspace_is_removed_on_drop() {
    let workspace = Workspace::create("ffmpeg -version").unwrap();
    let path = workspace.path().to_path_buf();
    assert_eq!(
        fs::read_to_string(workspace.script_path()).unwrap(),
        "ffmpeg -version\n"
    );
    drop(workspace);
    assert!(!path.exists());
}

#[test]
fn shell_not_found_status_is_a_spawn_failure() {
    let outcome = ExecutionOutcome::Exited {
        code: 127,
        stdout: String::new(),
        stderr: "sh: 1: ffmpeg: not found\n".to_string(),
    };
    let verdict = classify(
        outcome,
        TimeoutPolicy::Strict,
        Duration::from_secs(10),
        "ffmpeg -y -i a.mp4 b.mp4".to_string(),
        "ffmpeg -y -i a.mp4 -f null -".to_string(),
    );
    assert_eq!(verdict.failure(), Some(FailureKind::Spawn));
    assert_eq!(verdict.exit_code(), Some(127));
    assert!(verdict.error_message().unwrap().contains("ffmpeg: not found"));
}

#[test]
fn signalled_run_is_an_execution_failure() {
    let outcome = ExecutionOutcome::Signalled {
        signal: Some(9),
        stderr: String::new(),
    };
    let verdict = classify(
        outcome,
        TimeoutPolicy::Strict,
        Duration::from_secs(10),
        "ffmpeg -y -i a.mp4 b.mp4".to_string(),
        "ffmpeg -y -i a.mp4 -f null -".to_string(),
    );
    assert_eq!(verdict.failure(), Some(FailureKind::Execution));
    assert_eq!(
        verdict.error_message(),
        Some("command terminated by signal 9")
    );
}

#[test]
fn lenient_timeout_without_stderr_is_valid_with_note() {
    let verdict = classify(
        ExecutionOutcome::TimedOut {
            elapsed: Duration::from_millis(2500),
            stderr: "\n".to_string(),
        },
        TimeoutPolicy::Lenient,
        Duration::from_secs(2),
        "ffmpeg -y -i a.mp4 b.mp4".to_string(),
        "ffmpeg -y -i a.mp4 -f null -".to_string(),
    );
    assert!(verdict.is_valid());
    assert!(verdict.note().unwrap().contains("after 2.5 seconds"));
}

#[test]
fn verdict_serializes_failure_kind() {
    let verdict = ValidationVerdict::invalid(
        FailureKind::Timeout,
        "command timed out after 10 seconds",
        "ffmpeg -y -i a.mp4 b.mp4",
    );
    let json = serde_json::to_value(&verdict).unwrap();
    assert_eq!(json["is_valid"], false);
    assert_eq!(json["failure"], "timeout");
    assert_eq!(json["normalized_command"], "ffmpeg -y -i a.mp4 b.mp4");
    let back: ValidationVerdict = serde_json::from_value(json).unwrap();
    assert_eq!(back, verdict);
}
