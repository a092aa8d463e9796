use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn pipesh(args: &[&str], script: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_pipesh"))
        .args(args)
        .env_remove("PIPESH_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    // The shell may exit before reading everything.
    let _ = child.stdin.take().unwrap().write_all(script.as_bytes());
    child.wait_with_output().unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn test_batch_session_has_no_banners() {
    let out = pipesh(&[], "echo one\necho two | cat\n");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "one\ntwo\n");
    assert_eq!(stderr(&out), "");
}

#[test]
fn test_exit_and_die_codes() {
    let out = pipesh(&[], "echo before\nexit\necho after\n");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "before\n");

    let out = pipesh(&[], "die bye now\necho after\n");
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out), "");
    assert_eq!(stderr(&out), "bye now\n");
}

#[test]
fn test_producer_dies_quietly_on_closed_pipe() {
    let out = pipesh(&[], "yes | head -n 1\n");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "y\n");
    assert_eq!(stderr(&out), "");
}

#[test]
fn test_vertical_tab_separates_words() {
    let out = pipesh(&[], "echo\x0bhi\n");
    assert_eq!(stdout(&out), "hi\n");
    assert_eq!(stderr(&out), "");
}

#[test]
fn test_conditional_chain() {
    let out = pipesh(&[], "false\nand echo skipped\nor echo recovered\nand echo chained\n");
    assert_eq!(stdout(&out), "recovered\nchained\n");
}

#[test]
fn test_first_command_conditional_is_error() {
    let out = pipesh(&[], "and echo no\necho yes\n");
    assert_eq!(stdout(&out), "yes\n");
    assert!(stderr(&out).contains("pipesh: syntax error:"), "{}", stderr(&out));
}

#[test]
fn test_syntax_error_keeps_going() {
    let out = pipesh(&[], "true\necho a |\nor echo handled\n");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "handled\n");
    assert!(stderr(&out).starts_with("pipesh: syntax error: "));
}

#[test]
fn test_redirection_round_trip() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("note.txt");
    let file = file.to_str().unwrap();
    let out = pipesh(&[], &format!("echo hello world > {}\ncat < {}\n", file, file));
    assert_eq!(stdout(&out), "hello world\n");
}

#[test]
fn test_cd_persists_between_lines() {
    let out = pipesh(&[], "cd /\npwd\ncd / | true\npwd\n");
    assert_eq!(stdout(&out), "/\n/\n");
}

#[test]
fn test_command_not_found_then_or() {
    let out = pipesh(&[], "no-such-command-for-pipesh\nor echo fallback\n");
    assert_eq!(stdout(&out), "fallback\n");
    assert!(stderr(&out).contains("no-such-command-for-pipesh: command not found"));
}

#[test]
fn test_commands_do_not_read_script() {
    // `cat` gets /dev/null, so the next line is still run by the shell.
    let out = pipesh(&[], "cat\necho still here\n");
    assert_eq!(stdout(&out), "still here\n");
}

#[test]
fn test_unterminated_last_line() {
    let out = pipesh(&[], "echo last");
    assert_eq!(stdout(&out), "last\n");
}

#[test]
fn test_script_argument() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("run.sh");
    fs::write(&script, "echo from script\ndie\n").unwrap();
    let out = pipesh(&[script.to_str().unwrap()], "echo from stdin\n");
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out), "from script\n");
}

#[test]
fn test_missing_script_fails() {
    let out = pipesh(&["/no/such/script.sh"], "");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).starts_with("pipesh: /no/such/script.sh:"));
}

#[test]
fn test_config_search_path() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("pipesh.conf");
    fs::write(&config, "search_path=/no/such/dir\n").unwrap();
    let out = pipesh(&["--config", config.to_str().unwrap()], "echo hidden\nor /bin/echo direct\n");
    assert_eq!(stdout(&out), "direct\n");
    assert!(stderr(&out).contains("echo: command not found"));
}

#[test]
fn test_bad_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("pipesh.conf");
    fs::write(&config, "colour=blue\n").unwrap();
    let out = pipesh(&["--config", config.to_str().unwrap()], "echo never\n");
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out), "");
    assert!(stderr(&out).contains("unknown key: colour"));
}
