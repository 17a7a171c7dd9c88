//! End-to-end tests for the session planning flow.
//!
//! Runs the real binary: draft new → adjust → attach → save → sessions list.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn sp_binary() -> String {
    env!("CARGO_BIN_EXE_sp").to_string()
}

/// Runs `sp` with config and data isolated inside `home`.
fn sp(home: &Path, args: &[&str]) -> Output {
    Command::new(sp_binary())
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local/share"))
        .env("SP_DATABASE_PATH", home.join("sp.db"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run sp")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{what} should succeed: {}",
        stderr(output)
    );
}

#[test]
fn test_full_planning_flow() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    let output = sp(
        home,
        &[
            "draft", "new", "--total", "60", "--name", "U12 Tuesday", "--date", "2026-10-20",
            "warmup", "passing", "possession", "scrimmage",
        ],
    );
    assert_success(&output, "draft new");
    let text = stdout(&output);
    assert!(text.contains("allocated 60 min (balanced)"), "{text}");

    let output = sp(home, &["draft", "adjust", "possession", "27"]);
    assert_success(&output, "draft adjust");
    assert!(stdout(&output).contains("(10 minutes over)"));

    // No drills yet: saving is refused and the draft survives
    let output = sp(home, &["save"]);
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("missing: warmup, passing, possession, scrimmage"),
        "{}",
        stderr(&output)
    );

    let output = sp(home, &["draft", "reset"]);
    assert_success(&output, "draft reset");
    assert!(stdout(&output).contains("(balanced)"));

    let output = sp(
        home,
        &["drills", "add", "rondo", "--name", "Rondo 4v1", "--minutes", "10", "--tag", "warmup"],
    );
    assert_success(&output, "drills add");

    for component in ["warmup", "passing", "possession", "scrimmage"] {
        let output = sp(home, &["draft", "attach", component, "rondo"]);
        assert_success(&output, "draft attach");
    }

    let output = sp(home, &["save"]);
    assert_success(&output, "save");
    let saved = stdout(&output);
    let id = saved
        .trim()
        .strip_prefix("Saved session ")
        .expect("save prints the session id")
        .to_string();

    let output = sp(home, &["draft", "show"]);
    assert!(!output.status.success(), "draft should be cleared after save");

    let output = sp(home, &["sessions", "list"]);
    assert_success(&output, "sessions list");
    let listing = stdout(&output);
    assert!(listing.contains(&id));
    assert!(listing.contains("U12 Tuesday"));

    let output = sp(home, &["sessions", "show", &id]);
    assert_success(&output, "sessions show");
    let text = stdout(&output);
    assert!(text.contains("Total: 60 min, planned 60 min"), "{text}");
    assert!(text.contains("Scrimmage             20  Rondo 4v1"), "{text}");
}

#[test]
fn test_unknown_component_is_rejected() {
    let temp = TempDir::new().unwrap();

    let output = sp(temp.path(), &["draft", "new", "--total", "30", "juggling"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown component: juggling"));
}

#[test]
fn test_configured_component_is_usable() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("custom.toml");
    std::fs::write(
        &config,
        r#"
[[components]]
id = "rondos"
name = "Rondos"
weight = 0.5
"#,
    )
    .unwrap();
    let config = config.to_str().unwrap();

    let output = sp(temp.path(), &["--config", config, "components", "list"]);
    assert_success(&output, "components");
    assert!(stdout(&output).contains("rondos       Rondos             0.50"));

    let output = sp(
        temp.path(),
        &["--config", config, "draft", "new", "--total", "40", "rondos", "cooldown"],
    );
    assert_success(&output, "draft new");
    assert!(stdout(&output).contains("Rondos"));
}

#[test]
fn test_stored_component_and_drill_removal() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    let output = sp(
        home,
        &["components", "add", "finishing", "--name", "Finishing", "--weight", "0.35"],
    );
    assert_success(&output, "components add");

    let output = sp(home, &["components", "list"]);
    assert_success(&output, "components list");
    assert!(stdout(&output).contains("finishing    Finishing          0.35"));

    let output = sp(home, &["draft", "new", "--total", "45", "finishing", "cooldown"]);
    assert_success(&output, "draft new");
    assert!(stdout(&output).contains("Finishing"));

    let output = sp(home, &["drills", "add", "rondo", "--name", "Rondo", "--minutes", "10"]);
    assert_success(&output, "drills add");
    let output = sp(home, &["drills", "remove", "rondo"]);
    assert_success(&output, "drills remove");

    let output = sp(home, &["draft", "attach", "finishing", "rondo"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("drill not found: rondo"));
}

#[test]
fn test_no_command_prints_help() {
    let temp = TempDir::new().unwrap();

    let output = sp(temp.path(), &[]);

    assert_success(&output, "sp");
    assert!(stdout(&output).contains("Usage:"));
}
