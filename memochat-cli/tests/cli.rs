use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// The binary with an isolated config directory and no secrets in the env
fn memochat(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_memochat"));
    cmd.arg("--config-dir")
        .arg(dir.path())
        .current_dir(dir.path())
        .env("RUST_LOG", "warn")
        .env_remove("LOG_FORMAT");
    for key in [
        "LANGCHAIN_API_KEY",
        "langchain_api_key",
        "GROQ_API_KEY",
        "groq_api_key",
        "MEMOCHAT__SECRETS__LANGCHAIN_API_KEY",
        "MEMOCHAT__SECRETS__GROQ_API_KEY",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

fn write_secrets(dir: &TempDir) {
    std::fs::write(
        dir.path().join("secrets.toml"),
        "langchain_api_key = \"lsv2-secret-value\"\ngroq_api_key = \"gsk-secret-value\"\n",
    )
    .unwrap();
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn models_lists_ids_in_order_and_marks_default() {
    let dir = TempDir::new().unwrap();
    let output = memochat(&dir).arg("models").output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stdout = stdout_of(&output);
    let ids = [
        "gemma2-9b-it",
        "llama3-groq-70b-8192-tool-use-preview",
        "llama-3.1-8b-instant",
        "lama3-groq-8b-8192-tool-use-preview",
    ];
    let positions: Vec<usize> = ids
        .iter()
        .map(|id| stdout.find(&format!("  {}", id)).expect(id))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(stdout
        .lines()
        .any(|line| line.contains("gemma2-9b-it") && line.contains("(default)")));
}

#[test]
fn ask_without_secrets_fails_naming_missing_keys() {
    let dir = TempDir::new().unwrap();
    let output = memochat(&dir)
        .args(["ask", "--message", "What is 2+2?"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("langchain_api_key"), "stderr: {}", stderr);
    assert!(stderr.contains("groq_api_key"), "stderr: {}", stderr);
}

#[test]
fn serve_without_secrets_refuses_to_start() {
    let dir = TempDir::new().unwrap();
    let output = memochat(&dir)
        .args(["serve", "--host", "127.0.0.1", "--port", "0"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("langchain_api_key"), "stderr: {}", stderr);
    assert!(stderr.contains("groq_api_key"), "stderr: {}", stderr);
    assert!(!stdout_of(&output).contains("Starting memochat"));
}

#[test]
fn ask_with_out_of_range_temperature_is_rejected_before_any_call() {
    let dir = TempDir::new().unwrap();
    write_secrets(&dir);
    let output = memochat(&dir)
        .args(["ask", "--message", "hi", "--temperature", "1.5"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("temperature"));
}

#[test]
fn status_reports_secrets_without_values() {
    let dir = TempDir::new().unwrap();

    let output = memochat(&dir).arg("status").output().unwrap();
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("groq_api_key"));
    assert!(stdout.contains("not configured"));

    write_secrets(&dir);
    let output = memochat(&dir).arg("status").output().unwrap();
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Ready."));
    assert!(!stdout.contains("gsk-secret-value"));
    assert!(!stdout.contains("lsv2-secret-value"));
}

#[test]
fn chat_rejects_empty_line_and_quits() {
    let dir = TempDir::new().unwrap();
    write_secrets(&dir);

    let mut child = memochat(&dir)
        .arg("chat")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"\n\n/history\n/quit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert_eq!(stdout.matches("Please provide a question.").count(), 2);
    assert!(stdout.contains("Conversation History"));
    assert!(stdout.contains("(empty)"));
}
