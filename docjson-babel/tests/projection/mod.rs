//! End-to-end projection over directories and the structured Markdown mode.

use docjson_babel::{
    collect_directory, publish, FormatRegistry, MarkdownFormat, MarkdownMode, OutputMode,
    ProjectionOptions, PublishSpec,
};
use serde_json::{json, Value};
use std::fs;
use tempfile::tempdir;

const README: &str = include_str!("../fixtures/readme.md");

fn structured_registry() -> FormatRegistry {
    let mut registry = FormatRegistry::default();
    registry.register(MarkdownFormat::new(MarkdownMode::Structured));
    registry
}

#[test]
fn markdown_file_is_wrapped_verbatim() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.md"), "hello").unwrap();

    let collection = collect_directory(
        dir.path(),
        &FormatRegistry::default(),
        &ProjectionOptions::default(),
        false,
    )
    .unwrap();
    assert_eq!(
        serde_json::to_value(&collection).unwrap(),
        json!({"a.md": {"content": "hello"}})
    );
}

#[test]
fn rst_file_with_one_section() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.rst"), "Intro\n=====\n\nWelcome\n").unwrap();

    let collection = collect_directory(
        dir.path(),
        &FormatRegistry::default(),
        &ProjectionOptions::default(),
        false,
    )
    .unwrap();
    assert_eq!(
        serde_json::to_value(&collection).unwrap(),
        json!({"a.rst": [{"title": "Intro", "content": ["Welcome"], "sections": []}]})
    );
}

#[test]
fn structured_markdown_nests_headings() {
    let projection = structured_registry()
        .project(README, "markdown", &ProjectionOptions::default())
        .unwrap();
    let setup = json!({
        "title": "Setup",
        "content": ["install\nrun", "```make```"],
        "sections": []
    });
    assert_eq!(
        serde_json::to_value(projection).unwrap(),
        json!([
            {"title": "Readme", "content": ["Intro text."], "sections": [setup.clone()]},
            setup
        ])
    );
}

#[test]
fn mixed_tree_aggregates_into_one_file() {
    let input = tempdir().unwrap();
    let root = input.path();
    fs::create_dir_all(root.join("notebooks")).unwrap();
    fs::write(root.join("readme.md"), README).unwrap();
    fs::write(
        root.join("guide.rst"),
        include_str!("../fixtures/guide.rst"),
    )
    .unwrap();
    fs::write(
        root.join("notebooks/analysis.ipynb"),
        include_str!("../fixtures/analysis.ipynb"),
    )
    .unwrap();
    fs::write(root.join("notebooks/data.csv"), "a,b\n1,2\n").unwrap();

    let output = tempdir().unwrap();
    let spec = PublishSpec::new(root, output.path()).with_mode(OutputMode::Aggregate);
    let report = publish(
        &spec,
        &FormatRegistry::default(),
        &ProjectionOptions::default(),
    )
    .unwrap();

    assert!(report.failures.is_empty());
    let written: Value = serde_json::from_str(
        &fs::read_to_string(output.path().join("aggregated_documentation.json")).unwrap(),
    )
    .unwrap();
    let keys: Vec<&String> = written.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["guide.rst", "notebooks/analysis.ipynb", "readme.md"]);
    assert_eq!(written["readme.md"], json!({"content": README}));
    assert_eq!(written["guide.rst"][0]["title"], json!("Project Guide"));
}
