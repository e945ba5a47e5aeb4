//! End-to-end tests for the `harvest` binary.
//!
//! Every test runs inside its own temp directory so a stray `harvest.toml`
//! in the checkout never leaks into the run.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn harvest(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("harvest").expect("binary builds");
    cmd.current_dir(dir.path()).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) {
    fs::write(dir.path().join(name), content).expect("write fixture");
}

fn read(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.path().join(name)).expect("read output")
}

// =============================================================================
// merge
// =============================================================================

#[test]
fn merge_keeps_last_refinement() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "searches.csv",
        "0,APP,X,q1,A,,false,cat,\n500,APP,X,q2,A,,false,cats,\n",
    );

    harvest(&dir)
        .args(["merge", "-s", "searches.csv", "-o", "out.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("processed").and(predicate::str::contains("merge")));

    assert_eq!(read(&dir, "out.csv"), "500,APP,X,q2,A,,false,cats,\n");
}

#[test]
fn merge_click_and_user_change_are_boundaries() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "searches.csv",
        "\
0,APP,X,q1,A,,true,cat,
50,APP,X,q2,A,,false,cat,
100,APP,X,q3,A,,false,dog,
1000,APP,X,q4,B,,false,dog,
",
    );

    harvest(&dir)
        .args(["merge", "-s", "searches.csv", "-o", "out.csv"])
        .assert()
        .success();

    assert_eq!(
        read(&dir, "out.csv"),
        "0,APP,X,q1,A,,true,cat,\n100,APP,X,q3,A,,false,dog,\n1000,APP,X,q4,B,,false,dog,\n"
    );
}

#[test]
fn merge_skips_short_rows() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "searches.csv",
        "0,APP,X,q1,A,,false,cat,\nbroken\n900,APP,X,q2,A,,false,zebra,\n",
    );

    harvest(&dir)
        .args(["merge", "-s", "searches.csv", "-o", "out.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped"));

    assert_eq!(
        read(&dir, "out.csv"),
        "0,APP,X,q1,A,,false,cat,\n900,APP,X,q2,A,,false,zebra,\n"
    );
}

#[test]
fn merge_rejects_negative_threshold() {
    let dir = TempDir::new().unwrap();
    write(&dir, "searches.csv", "0,APP,X,q1,A,,false,cat,\n");

    harvest(&dir)
        .args([
            "merge",
            "-s",
            "searches.csv",
            "-o",
            "out.csv",
            "--edit-distance-threshold",
            "-1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-negative"));

    assert!(!dir.path().join("out.csv").exists());
}

#[test]
fn merge_rejects_conflicting_columns() {
    let dir = TempDir::new().unwrap();
    write(&dir, "searches.csv", "0,APP,X,q1,A,,false,cat,\n");

    harvest(&dir)
        .args(["merge", "-s", "searches.csv", "-o", "out.csv", "--iu", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("index 2"));
}

#[test]
fn merge_missing_input_fails() {
    let dir = TempDir::new().unwrap();

    harvest(&dir)
        .args(["merge", "-s", "nope.csv", "-o", "out.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not open"));
}

#[test]
fn merge_reads_window_from_config() {
    let dir = TempDir::new().unwrap();
    // 500 apart with unrelated text: a new search under the default window,
    // the same search once the window is widened.
    write(
        &dir,
        "searches.csv",
        "0,APP,X,q1,A,,false,cat,\n500,APP,X,q2,A,,false,zebra,\n",
    );
    write(&dir, "harvest.toml", "[session]\ntime_window_ms = 1000\n");

    harvest(&dir)
        .args(["merge", "-s", "searches.csv", "-o", "out.csv"])
        .assert()
        .success();

    assert_eq!(read(&dir, "out.csv"), "500,APP,X,q2,A,,false,zebra,\n");
}

#[test]
fn merge_flag_overrides_config() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "searches.csv",
        "0,APP,X,q1,A,,false,cat,\n500,APP,X,q2,A,,false,zebra,\n",
    );
    write(&dir, "custom.toml", "[session]\ntime_window_ms = 1000\n");

    harvest(&dir)
        .args([
            "--config",
            "custom.toml",
            "merge",
            "-s",
            "searches.csv",
            "-o",
            "out.csv",
            "--time-window-ms",
            "200",
        ])
        .assert()
        .success();

    assert_eq!(
        read(&dir, "out.csv"),
        "0,APP,X,q1,A,,false,cat,\n500,APP,X,q2,A,,false,zebra,\n"
    );
}

#[test]
fn merge_jsonl() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "searches.json",
        "\
{\"timestamp\":0,\"index\":\"X\",\"userID\":\"A\",\"query\":\"cat\",\"hadClick\":false}
{\"timestamp\":500,\"index\":\"X\",\"userID\":\"A\",\"query\":\"cats\",\"hadClick\":false}
",
    );

    harvest(&dir)
        .args([
            "merge",
            "-s",
            "searches.json",
            "-o",
            "out.json",
            "--format",
            "jsonl",
        ])
        .assert()
        .success();

    let out = read(&dir, "out.json");
    assert_eq!(out.lines().count(), 1);
    assert!(out.contains("\"query\":\"cats\""));
    assert!(out.contains("\"timestamp\":500"));
}

// =============================================================================
// conversion and association
// =============================================================================

const LOGS: &str = r#"{"jsonPayload":{"timestamp":0,"index":"products","appID":"APP","queryID":"q1","userID":"A","context":"","query":"cat","queryParameters":""}}
{"jsonPayload":{"timestamp":500,"index":"products","appID":"APP","queryID":"q2","userID":"A","context":"","query":"cats","queryParameters":""}}
{"jsonPayload":{"timestamp":2000,"index":"products","appID":"APP","queryID":"q3","userID":"B","context":"","query":"dog","queryParameters":"page=1"}}
"#;

const CLICK_LOGS: &str = r#"{"jsonPayload":{"timestamp":2100,"appID":"APP","queryID":"q3","position":1,"objectID":"o1"}}
"#;

fn run_ok(dir: &TempDir, args: &[&str]) {
    harvest(dir).args(args).assert().success();
}

#[test]
fn convert_csv_writes_search_rows() {
    let dir = TempDir::new().unwrap();
    write(&dir, "logs.json", LOGS);

    harvest(&dir)
        .args(["convert-csv", "-i", "logs.json", "-o", "logs.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("searches"));

    assert_eq!(
        read(&dir, "logs.csv"),
        "\
0,APP,products,q1,A,,cat,
500,APP,products,q2,A,,cats,
2000,APP,products,q3,B,,dog,page=1
"
    );
}

#[test]
fn full_pipeline() {
    let dir = TempDir::new().unwrap();
    write(&dir, "searches.json", LOGS);
    write(&dir, "clicks.json", CLICK_LOGS);

    run_ok(&dir, &["convert-csv", "-i", "searches.json", "-o", "searches.csv"]);
    run_ok(&dir, &["convert-csv", "-i", "clicks.json", "-o", "clicks.csv"]);
    assert_eq!(read(&dir, "clicks.csv"), "2100,APP,q3,1,o1\n");

    run_ok(
        &dir,
        &[
            "associate",
            "-s",
            "searches.csv",
            "-c",
            "clicks.csv",
            "-o",
            "associated.csv",
        ],
    );
    assert_eq!(
        read(&dir, "associated.csv"),
        "\
0,APP,products,q1,A,,false,cat,
500,APP,products,q2,A,,false,cats,
2000,APP,products,q3,B,,true,dog,page=1
"
    );

    run_ok(&dir, &["merge", "-s", "associated.csv", "-o", "sessions.csv"]);
    assert_eq!(
        read(&dir, "sessions.csv"),
        "\
500,APP,products,q2,A,,false,cats,
2000,APP,products,q3,B,,true,dog,page=1
"
    );

    run_ok(&dir, &["convert-json", "-i", "sessions.csv", "-o", "sessions.json"]);
    let json = read(&dir, "sessions.json");
    let lines: Vec<serde_json::Value> = json
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["queryID"], "q3");
    assert_eq!(lines[1]["hadClick"], true);
    assert_eq!(lines[1]["queryParameters"], "page=1");
}

#[test]
fn convert_json_rejects_conflicting_config_columns() {
    let dir = TempDir::new().unwrap();
    write(&dir, "harvest.toml", "[merge]\nuser = 2\n");
    write(&dir, "sessions.csv", "0,APP,X,q1,A,,false,cat,\n");

    harvest(&dir)
        .args(["convert-json", "-i", "sessions.csv", "-o", "sessions.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("index 2"));

    assert!(!dir.path().join("sessions.json").exists());
}

#[test]
fn merge_jsonl_keeps_lines_verbatim() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "searches.json",
        "\
{\"timestamp\":\"500\",\"userID\":\"A\",\"index\":\"X\",\"query\":\"cat\",\"position\":3}
not json
{\"timestamp\":\"900\",\"userID\":\"B\",\"index\":\"X\",\"query\":\"dog\"}
",
    );

    harvest(&dir)
        .args(["merge", "-s", "searches.json", "-o", "out.json", "--format", "jsonl"])
        .assert()
        .success();

    assert_eq!(
        read(&dir, "out.json"),
        "\
{\"timestamp\":\"500\",\"userID\":\"A\",\"index\":\"X\",\"query\":\"cat\",\"position\":3}
{\"timestamp\":\"900\",\"userID\":\"B\",\"index\":\"X\",\"query\":\"dog\"}
"
    );
}

#[test]
fn associate_missing_click_file_fails() {
    let dir = TempDir::new().unwrap();
    write(&dir, "searches.csv", "0,APP,products,q1,A,,cat,\n");

    harvest(&dir)
        .args(["associate", "-s", "searches.csv", "-c", "missing.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not open").and(predicate::str::contains("missing.csv")));
}

#[test]
fn convert_csv_rejects_bad_json() {
    let dir = TempDir::new().unwrap();
    write(&dir, "logs.json", "{not json\n");

    harvest(&dir)
        .args(["convert-csv", "-i", "logs.json", "-o", "logs.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"));
}

#[test]
fn invalid_config_file_fails() {
    let dir = TempDir::new().unwrap();
    write(&dir, "harvest.toml", "[session\n");
    write(&dir, "searches.csv", "0,APP,X,q1,A,,false,cat,\n");

    harvest(&dir)
        .args(["merge", "-s", "searches.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    let out = harvest(&dir).arg("--help").assert().success();
    let text = String::from_utf8_lossy(&out.get_output().stdout).into_owned();
    for sub in ["convert-csv", "convert-json", "associate", "merge"] {
        assert!(text.contains(sub), "missing {sub} in help");
    }
}
