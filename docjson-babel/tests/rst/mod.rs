//! reStructuredText fixture tests
//!
//! Parse and project tests/fixtures/guide.rst through the public API.

use docjson_babel::{
    DiagnosticFilter, DiagnosticLevel, Format, FormatRegistry, Projection, ProjectionOptions,
    RstFormat, RstOptions,
};
use serde_json::json;

const GUIDE: &str = include_str!("../fixtures/guide.rst");

fn project(format: &RstFormat, options: &ProjectionOptions) -> serde_json::Value {
    serde_json::to_value(format.project(GUIDE, options).unwrap()).unwrap()
}

#[test]
fn guide_projects_every_section_in_preorder() {
    let value = project(&RstFormat::default(), &ProjectionOptions::default());

    let installation = json!({
        "title": "Installation",
        "content": [
            "Run the installer:",
            "```pip install thing```",
            "first step\nsecond step"
        ],
        "sections": []
    });
    let usage = json!({
        "title": "Usage",
        "content": ["Remember to configure.", "Text with emphasis and code."],
        "sections": []
    });
    assert_eq!(
        value,
        json!([
            {
                "title": "Project Guide",
                "content": ["The guide starts here."],
                "sections": [installation.clone(), usage.clone()]
            },
            installation,
            usage
        ])
    );
}

#[test]
fn unknown_directive_is_reported_with_its_line() {
    let doc = RstFormat::default().parse(GUIDE).unwrap();
    assert_eq!(doc.diagnostics.len(), 1);
    assert_eq!(doc.diagnostics[0].level, DiagnosticLevel::Error);
    assert_eq!(doc.diagnostics[0].line, 23);
    assert_eq!(
        doc.diagnostics[0].message,
        "Unknown directive type \"unknowndirective\"."
    );
}

#[test]
fn inline_diagnostics_are_suppressed_by_the_default_denylist() {
    let format = RstFormat::new(RstOptions {
        inline_diagnostics: true,
    });
    let filtered = project(&format, &ProjectionOptions::default());
    assert_eq!(
        filtered[2]["content"],
        json!(["Remember to configure.", "Text with emphasis and code."])
    );

    let unfiltered = ProjectionOptions {
        filter: DiagnosticFilter::disabled(),
        ..ProjectionOptions::default()
    };
    let leaked = project(&format, &unfiltered);
    assert_eq!(
        leaked[2]["content"][1],
        json!("Unknown directive type \"unknowndirective\".")
    );
}

#[test]
fn subsection_echo_repeats_titles_and_children() {
    let options = ProjectionOptions {
        subsection_echo: true,
        ..ProjectionOptions::default()
    };
    let projection = RstFormat::default().project(GUIDE, &options).unwrap();
    let Projection::Sections(records) = projection else {
        panic!("expected section records");
    };

    let top = &records[0];
    assert_eq!(top.content.len(), 4);
    assert_eq!(top.content[0], "Project Guide");
    assert!(top.content[2].starts_with("InstallationRun the installer:"));
    assert_eq!(top.sections.len(), 2);
}

#[test]
fn registry_dispatches_rst_and_rest_extensions() {
    let registry = FormatRegistry::default();
    assert_eq!(
        registry.detect_format_from_filename("guide.rst"),
        Some("rst".to_string())
    );
    assert_eq!(
        registry.detect_format_from_filename("guide.rest"),
        Some("rst".to_string())
    );
    assert_eq!(registry.detect_format_from_filename("guide.txt"), None);
}
