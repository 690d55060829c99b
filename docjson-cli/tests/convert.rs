use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn read(path: impl AsRef<Path>) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn docs_tree(root: &Path) {
    fs::create_dir_all(root.join("docs/guide")).unwrap();
    fs::write(root.join("docs/guide/a.md"), "hello").unwrap();
    fs::write(root.join("docs/guide/b.rst"), "Intro\n=====\n\nWelcome\n").unwrap();
    fs::write(root.join("docs/index.rst"), "Home\n====\n\nStart here.\n").unwrap();
}

#[test]
fn default_command_writes_one_file_per_subdirectory() {
    let dir = tempdir().unwrap();
    docs_tree(dir.path());

    let mut cmd = cargo_bin_cmd!("docjson");
    cmd.current_dir(dir.path()).arg("docs").arg("-o").arg("out");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("guide.json"))
        .stdout(predicate::str::contains("index.json"));

    assert_eq!(
        read(dir.path().join("out/guide.json")),
        json!({
            "a.md": {"content": "hello"},
            "b.rst": [{"title": "Intro", "content": ["Welcome"], "sections": []}]
        })
    );
    assert_eq!(
        read(dir.path().join("out/index.json")),
        json!([{"title": "Home", "content": ["Start here."], "sections": []}])
    );
}

#[test]
fn configured_paths_are_used_without_arguments() {
    let dir = tempdir().unwrap();
    docs_tree(dir.path());
    fs::write(
        dir.path().join("docjson.toml"),
        "[paths]\ninput_root = \"docs\"\noutput_root = \"json\"\n\n[output]\nmode = \"aggregate\"\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("docjson");
    cmd.current_dir(dir.path()).arg("convert");
    cmd.assert().success();

    let all = read(dir.path().join("json/aggregated_documentation.json"));
    let keys: Vec<&String> = all.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["guide/a.md", "guide/b.rst", "index.rst"]);
}

#[test]
fn extra_flags_override_chunking() {
    let dir = tempdir().unwrap();
    docs_tree(dir.path());

    let mut cmd = cargo_bin_cmd!("docjson");
    cmd.current_dir(dir.path())
        .args(["convert", "docs", "-o", "out", "--mode", "count-chunked"])
        .args(["--extra-num-parts", "2", "--extra-chunk-prefix", "examples_part"]);
    cmd.assert().success();

    assert!(dir.path().join("out/examples_part_1.json").exists());
    assert!(dir.path().join("out/examples_part_2.json").exists());
    assert!(!dir.path().join("out/examples_part_3.json").exists());
    assert_eq!(
        read(dir.path().join("out/examples_part_1.json")),
        json!([
            {"content": "hello"},
            [{"title": "Intro", "content": ["Welcome"], "sections": []}]
        ])
    );
}

#[test]
fn broken_files_are_skipped_unless_failing_fast() {
    let dir = tempdir().unwrap();
    docs_tree(dir.path());
    fs::write(dir.path().join("docs/guide/broken.ipynb"), "{").unwrap();

    let mut cmd = cargo_bin_cmd!("docjson");
    cmd.current_dir(dir.path())
        .args(["convert", "docs", "-o", "out", "--mode", "aggregate"]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("guide/broken.ipynb"));

    let mut cmd = cargo_bin_cmd!("docjson");
    cmd.current_dir(dir.path())
        .args(["convert", "docs", "-o", "out2", "--mode", "aggregate"])
        .arg("--extra-fail-fast");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn zero_parts_is_reported_as_an_error() {
    let dir = tempdir().unwrap();
    docs_tree(dir.path());

    let mut cmd = cargo_bin_cmd!("docjson");
    cmd.current_dir(dir.path())
        .args(["docs", "-o", "out", "--mode", "count-chunked", "--extra-num-parts", "0"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("number of parts"));
}

#[test]
fn missing_input_directory_fails() {
    let dir = tempdir().unwrap();

    let mut cmd = cargo_bin_cmd!("docjson");
    cmd.current_dir(dir.path()).args(["convert", "nowhere", "-o", "out"]);
    cmd.assert().failure().stderr(predicate::str::contains("nowhere"));
}
