//! Integration tests for the waymark CLI
//!
//! These tests run the real binary against tree files written to a
//! temporary directory. They verify that commands work end-to-end without
//! mocking.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const COFFEE: &str = r#"
[options.drink]
title = "Drink"
choices = [
    { value = "espresso", label = "Espresso" },
    { value = "latte", label = "Latte" },
]

[options.milk]
title = "Milk"
choices = [{ value = "oat", label = "Oat milk" }]

[options.shots]
title = "Shots"
default = "1"

[options.size]
title = "Cup size"
choices = [
    { value = "small", label = "Small" },
    { value = "large", label = "Large" },
]

[path]
option = "drink"

[path.branches]
espresso = "order"

[path.branches.latte]
option = "milk"

[path.branches.latte.branches]
"*" = "order"

[partials.order]
option = "shots"

[partials.order.branches."*"]
option = "size"

[partials.order.branches."*".branches]
"*" = {}
"#;

/// Helper to write a tree file into a fresh temp dir
fn tree_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write tree");
    (dir, path)
}

/// Helper to run waymark from inside the temp dir, without color
fn run_waymark(args: &[&str], cwd: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_waymark"))
        .args(args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .env_remove("WAYMARK_LOG")
        .output()
        .expect("Failed to execute waymark")
}

/// Helper to get stdout as string
fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Helper to get stderr as string
fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// =============================================================================
// Basic Command Tests
// =============================================================================

#[test]
fn test_help_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_waymark"))
        .arg("--help")
        .output()
        .expect("Failed to execute");

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("waymark"));
    assert!(out.contains("decision trees"));
    assert!(out.contains("walk"));
    assert!(out.contains("check"));
}

#[test]
fn test_version_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_waymark"))
        .arg("--version")
        .output()
        .expect("Failed to execute");

    assert!(output.status.success());
    assert!(stdout(&output).contains("waymark"));
}

// =============================================================================
// Shell Completion Tests
// =============================================================================

#[test]
fn test_completion_zsh() {
    let output = Command::new(env!("CARGO_BIN_EXE_waymark"))
        .args(["completion", "zsh"])
        .output()
        .expect("Failed to execute");

    assert!(
        output.status.success(),
        "completion zsh failed: {}",
        stderr(&output)
    );
    assert!(
        stdout(&output).contains("#compdef waymark"),
        "zsh completion should contain #compdef"
    );
}

#[test]
fn test_completion_bash() {
    let output = Command::new(env!("CARGO_BIN_EXE_waymark"))
        .args(["completion", "bash"])
        .output()
        .expect("Failed to execute");

    assert!(output.status.success());
    assert!(stdout(&output).contains("_waymark"));
}

// =============================================================================
// Walk Tests
// =============================================================================

#[test]
fn test_walk_marks_skipped_decisions() {
    let (dir, path) = tree_file("coffee.toml", COFFEE);
    let output = run_waymark(&["walk", path.to_str().unwrap(), "latte"], dir.path());

    assert!(output.status.success(), "walk failed: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Latte"));
    assert!(out.contains("Oat milk"));
    assert!(out.contains("(auto)"));
    // shots is editable, so it is skipped with its default and size comes next
    assert!(out.contains("Cup size: Small (small), Large (large)"), "unexpected prompt: {}", out);
}

#[test]
fn test_walk_to_completion() {
    let (dir, path) = tree_file("coffee.toml", COFFEE);
    let output = run_waymark(
        &["walk", path.to_str().unwrap(), "espresso", "large"],
        dir.path(),
    );

    assert!(output.status.success(), "walk failed: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Large"));
    assert!(out.contains("complete"));
}

#[test]
fn test_walk_json_output() {
    let (dir, path) = tree_file("coffee.toml", COFFEE);
    let output = run_waymark(
        &["walk", path.to_str().unwrap(), "latte", "--json"],
        dir.path(),
    );

    assert!(output.status.success(), "walk failed: {}", stderr(&output));
    let json: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("walk --json should print JSON");

    let decisions = json["decisions"].as_array().unwrap();
    let options: Vec<&str> = decisions
        .iter()
        .map(|d| d["option"].as_str().unwrap())
        .collect();
    assert_eq!(options, vec!["drink", "milk", "shots"]);
    assert_eq!(decisions[1]["implicit"], true);
    assert_eq!(decisions[2]["value"], "1");
    assert_eq!(json["complete"], false);
    assert_eq!(json["next"]["option"], "size");
    assert_eq!(json["next"]["editable"], false);
    assert_eq!(json["values"], serde_json::json!(["latte"]));
}

#[test]
fn test_walk_unknown_value_fails() {
    let (dir, path) = tree_file("coffee.toml", COFFEE);
    let output = run_waymark(&["walk", path.to_str().unwrap(), "tea"], dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("tea"));
}

#[test]
fn test_walk_json_tree() {
    let tree = r#"{
        "options": {"color": {"title": "Color", "choices": [{"value": "r", "label": "Red"}]}},
        "path": {"option": "color", "branches": {"r": {}}}
    }"#;
    let (dir, path) = tree_file("colors.json", tree);
    let output = run_waymark(&["walk", path.to_str().unwrap()], dir.path());

    // Single choice with no wildcard is asked, not skipped
    assert!(output.status.success(), "walk failed: {}", stderr(&output));
    assert!(stdout(&output).contains("Red (r)"));
}

// =============================================================================
// Check Tests
// =============================================================================

#[test]
fn test_check_valid_tree() {
    let (dir, path) = tree_file("coffee.toml", COFFEE);
    let output = run_waymark(&["check", path.to_str().unwrap()], dir.path());

    assert!(output.status.success(), "check failed: {}", stdout(&output));
    let out = stdout(&output);
    assert!(out.contains("4 option(s), 1 partial(s), 0 warning(s)"));
}

#[test]
fn test_check_reports_broken_references() {
    let broken = r#"
[options.drink]
choices = [{ value = "tea" }]

[path]
option = "drink"

[path.branches]
tea = "brewing"
"*" = { option = "sugar" }
"#;
    let (dir, path) = tree_file("broken.toml", broken);
    let output = run_waymark(&["check", path.to_str().unwrap()], dir.path());

    assert!(!output.status.success());
    let out = stdout(&output);
    assert!(out.contains("unknown partial 'brewing'"));
    assert!(out.contains("unknown option 'sugar'"));
}

#[test]
fn test_check_unsupported_extension() {
    let (dir, path) = tree_file("coffee.yaml", "path = {}");
    let output = run_waymark(&["check", path.to_str().unwrap()], dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Error"));
}

#[test]
fn test_check_missing_file() {
    let dir = TempDir::new().unwrap();
    let output = run_waymark(&["check", "nope.toml"], dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("nope.toml"));
}

#[test]
fn test_check_bundled_demo() {
    let demo = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/coffee.toml");
    let dir = TempDir::new().unwrap();
    let output = run_waymark(&["check", demo.to_str().unwrap()], dir.path());

    assert!(output.status.success(), "check failed: {}", stdout(&output));
    assert!(stdout(&output).contains("0 warning(s)"));

    let output = run_waymark(&["walk", demo.to_str().unwrap(), "tea", "large"], dir.path());
    assert!(output.status.success(), "walk failed: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Black tea"));
    assert!(out.contains("complete"));
}
