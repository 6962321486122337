//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against temporary configuration files.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run the CLI with `--config <config>` and return (stdout, stderr, code).
fn run_cli(config: &Path, args: &[&str], stdin: &str) -> (String, String, i32) {
    let home = config.parent().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_pomotray"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("HOME", home)
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn config_file(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_tasks_default_cycle_json() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&dir.path().join("absent.toml"), &["tasks", "--json"], "");
    assert_eq!(code, 0);

    let tasks: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 8);
    assert_eq!(tasks[0]["name"], "focus");
    assert_eq!(tasks[0]["minutes"], 25);
    assert_eq!(tasks[7]["name"], "break");
    assert_eq!(tasks[7]["minutes"], 30);
    assert_eq!(tasks[7]["in_menu"], true);
}

#[test]
fn test_tasks_custom_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_file(
        dir.path(),
        "[[tasks]]\nname = \"code\"\nminutes = 45\n\n[[tasks]]\nname = \"break\"\n",
    );
    let (stdout, _, code) = run_cli(&config, &["tasks"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout, " 1. code/45  [menu]\n 2. break/5\n");
}

#[test]
fn test_malformed_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_file(dir.path(), "[[tasks]]\nminutes = \"lots\"\n");
    let (_, stderr, code) = run_cli(&config, &["tasks"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "{stderr}");
    assert!(stderr.contains("tasks[0].minutes"), "{stderr}");
}

#[test]
fn test_config_show_and_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_file(dir.path(), "autostart = false\n");

    let (stdout, _, code) = run_cli(&config, &["config", "show"], "");
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["autostart"], false);
    assert_eq!(json["stopped_task"]["name"], "stopped");

    let (stdout, _, code) = run_cli(&config, &["config", "path"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), config.display().to_string());
}

#[test]
fn test_run_status_and_quit() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_file(dir.path(), "autostart = false\n");
    let (stdout, _, code) = run_cli(&config, &["run"], "status\nquit\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("1/8 stopped/25 0m"), "{stdout}");
}

#[cfg(unix)]
#[test]
fn test_run_fires_hooks_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("hooks.log");
    let config = config_file(
        dir.path(),
        &format!(
            "autostart = false\n\n[[tasks]]\ncommand_start = \"echo start0 >> '{0}'\"\ncommand_stop = \"echo stop0 >> '{0}'\"\n\n[[tasks]]\nname = \"break\"\ncommand_start = \"echo start1 >> '{0}'\"\n",
            log.display()
        ),
    );
    let (stdout, stderr, code) = run_cli(&config, &["run"], "start\nnext\nstatus\nquit\n");
    assert_eq!(code, 0, "{stderr}");
    assert!(stdout.contains("2/2 break/5 0m"), "{stdout}");
    assert_eq!(
        std::fs::read_to_string(&log).unwrap(),
        "start0\nstop0\nstart1\n"
    );
}

#[cfg(unix)]
#[test]
fn test_run_survives_failing_autostart_hook() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_file(dir.path(), "[[tasks]]\ncommand_start = \"false\"\n");
    let (stdout, stderr, code) = run_cli(&config, &["run"], "status\nquit\n");
    assert_eq!(code, 0, "{stderr}");
    assert!(stdout.contains("1/1 focus/25 0m \u{23f5}\u{fe0e}"), "{stdout}");
    assert!(stderr.contains("Command 'false' failed"), "{stderr}");
}

#[test]
fn test_run_rejects_unknown_task_number() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_file(dir.path(), "autostart = false\n");
    let (_, stderr, code) = run_cli(&config, &["run"], "task 9\nbogus\nquit\n");
    assert_eq!(code, 0);
    assert!(stderr.contains("no such task: 9 (1-8)"), "{stderr}");
    assert!(stderr.contains("unknown command: bogus"), "{stderr}");
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&dir.path().join("c.toml"), &["completions", "bash"], "");
    assert_eq!(code, 0);
    assert!(stdout.contains("pomotray"));
}
