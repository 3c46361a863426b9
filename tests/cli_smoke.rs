use std::{
    io::Write,
    path::Path,
    process::{Command, Output, Stdio},
};

use serde_json::{Value, json};

fn setup_fixture(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = json!([
        {
            "id": "3",
            "title": "Summer Festival",
            "tags": ["comedy", "school"],
            "artist": ["Ana Ito"],
            "pages": 250,
            "collection": "favs"
        },
        {
            "id": "2",
            "title": "Rainy Season",
            "tags": ["drama"],
            "pages": 150
        },
        {
            "id": "1",
            "title": "Old Stuff",
            "tags": ["comedy"],
            "removed": true
        }
    ]);
    std::fs::write(data_dir.join("catalog.json"), catalog.to_string())?;
    std::fs::write(data_dir.join("collections.json"), r#"["favs"]"#)?;
    Ok(())
}

fn cabinet(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cabinet"))
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env_remove("CABINET_LOG")
        .output()
        .expect("failed to run cabinet")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn search_or_groups_hide_removed_entries()
-> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    let out = stdout_json(&cabinet(
        tempdir.path(),
        &["search", "tag:comedy;tag:drama", "--json"],
    ));
    assert_eq!(out["hit_count"], 2);
    assert_eq!(out["browsing"], false);
    let ids: Vec<&str> = out["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["3", "2"]);
    Ok(())
}

#[test]
fn search_accepts_a_leading_negation() -> Result<(), Box<dyn std::error::Error>>
{
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    let out = stdout_json(&cabinet(
        tempdir.path(),
        &["search", "-tag:drama", "--json"],
    ));
    assert_eq!(out["query"], "-tag:drama");
    assert_eq!(out["hit_count"], 1);
    assert_eq!(out["results"][0]["id"], "3");
    Ok(())
}

#[test]
fn search_threshold_and_comparisons() -> Result<(), Box<dyn std::error::Error>>
{
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    let out = stdout_json(&cabinet(
        tempdir.path(),
        &["search", "pages:>200", "--json"],
    ));
    assert_eq!(out["hit_count"], 1);
    assert_eq!(out["results"][0]["title"], "Summer Festival");

    let out = stdout_json(&cabinet(
        tempdir.path(),
        &["search", "", "-n", "1", "--show-removed", "--json"],
    ));
    assert_eq!(out["browsing"], true);
    assert_eq!(out["results"].as_array().unwrap().len(), 3);
    Ok(())
}

#[test]
fn tags_listing_counts() -> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    let out = stdout_json(&cabinet(tempdir.path(), &["tags", "--json"]));
    assert_eq!(out[0], json!({"tag": "comedy", "count": 2}));
    assert_eq!(out.as_array().unwrap().len(), 3);
    Ok(())
}

#[test]
fn watch_evaluates_the_settled_input() -> Result<(), Box<dyn std::error::Error>>
{
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    let mut child = Command::new(env!("CARGO_BIN_EXE_cabinet"))
        .arg("--data-dir")
        .arg(tempdir.path())
        .args(["watch", "--debounce-ms", "20"])
        .env_remove("CABINET_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    {
        let mut stdin = child.stdin.take().expect("stdin is piped");
        stdin.write_all(b"dra\ndrama\n")?;
    }
    let output = child.wait_with_output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<Value> = stdout
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["input"], "drama");
    assert_eq!(lines[0]["hit_count"], 1);
    assert_eq!(
        lines[0]["commands"][0],
        json!({"command": "replace", "ids": ["2"]})
    );
    Ok(())
}

#[test]
fn sorts_lists_every_order() {
    let tempdir = tempfile::tempdir().unwrap();
    let output = cabinet(tempdir.path(), &["sorts"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["data", "id", "upload", "title", "artist", "score"] {
        assert!(stdout.lines().any(|l| l.starts_with(name)), "{name}");
    }
}
