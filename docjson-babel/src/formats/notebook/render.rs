//! Notebook → Markdown rendering.
//!
//! Follows the layout of a Markdown notebook export:
//!
//! - markdown cells verbatim;
//! - code cells as a fenced block tagged with the kernel language, followed
//!   by their outputs (plain text indented four spaces, Markdown verbatim,
//!   images as `![kind](output_<cell>_<output>.<ext>)` references whose
//!   payloads are discarded);
//! - raw cells only when their format is Markdown.
//!
//! Blocks are separated by one blank line.

use crate::error::FormatError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("valid ANSI pattern"));

const OUTPUT_INDENT: &str = "    ";

/// Image MIME types and the file extension used for their references.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpeg"),
    ("image/svg+xml", "svg"),
    ("image/gif", "gif"),
];

/// Multiline strings are stored either whole or as a list of lines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MultilineString {
    One(String),
    Many(Vec<String>),
}

impl MultilineString {
    fn joined(&self) -> String {
        match self {
            MultilineString::One(text) => text.clone(),
            MultilineString::Many(lines) => lines.concat(),
        }
    }
}

impl Default for MultilineString {
    fn default() -> Self {
        MultilineString::One(String::new())
    }
}

#[derive(Debug, Deserialize)]
struct Notebook {
    nbformat: u32,
    #[serde(default)]
    metadata: NotebookMetadata,
    #[serde(default)]
    cells: Vec<Cell>,
}

#[derive(Debug, Default, Deserialize)]
struct NotebookMetadata {
    #[serde(default)]
    language_info: Option<LanguageInfo>,
    #[serde(default)]
    kernelspec: Option<KernelSpec>,
}

#[derive(Debug, Deserialize)]
struct LanguageInfo {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KernelSpec {
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
enum Cell {
    Markdown {
        #[serde(default)]
        source: MultilineString,
    },
    Code {
        #[serde(default)]
        source: MultilineString,
        #[serde(default)]
        outputs: Vec<Output>,
    },
    Raw {
        #[serde(default)]
        source: MultilineString,
        #[serde(default)]
        metadata: Map<String, Value>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
enum Output {
    Stream {
        #[serde(default)]
        text: MultilineString,
    },
    ExecuteResult {
        #[serde(default)]
        data: Map<String, Value>,
    },
    DisplayData {
        #[serde(default)]
        data: Map<String, Value>,
    },
    Error {
        #[serde(default)]
        traceback: Vec<String>,
    },
    #[serde(other)]
    Unsupported,
}

/// Render notebook JSON source to Markdown text.
pub fn render_notebook(source: &str) -> Result<String, FormatError> {
    let notebook: Notebook = serde_json::from_str(source)
        .map_err(|err| FormatError::ParseError(format!("invalid notebook: {err}")))?;
    if notebook.nbformat < 4 {
        return Err(FormatError::ParseError(format!(
            "unsupported nbformat {} (expected 4)",
            notebook.nbformat
        )));
    }

    let language = notebook_language(&notebook.metadata);
    let mut blocks: Vec<String> = Vec::new();

    for (cell_index, cell) in notebook.cells.iter().enumerate() {
        match cell {
            Cell::Markdown { source } => blocks.push(source.joined()),
            Cell::Code { source, outputs } => {
                let code = source.joined();
                blocks.push(format!("```{language}\n{}\n```", code.trim_end_matches('\n')));
                for (output_index, output) in outputs.iter().enumerate() {
                    if let Some(block) = render_output(output, cell_index, output_index) {
                        blocks.push(block);
                    }
                }
            }
            Cell::Raw { source, metadata } => {
                if is_markdown_raw(metadata) {
                    blocks.push(source.joined());
                }
            }
        }
    }

    let blocks: Vec<String> = blocks
        .into_iter()
        .map(|block| block.trim_end().to_string())
        .filter(|block| !block.is_empty())
        .collect();
    Ok(blocks.join("\n\n"))
}

fn notebook_language(metadata: &NotebookMetadata) -> String {
    metadata
        .language_info
        .as_ref()
        .and_then(|info| info.name.clone())
        .or_else(|| {
            metadata
                .kernelspec
                .as_ref()
                .and_then(|spec| spec.language.clone())
        })
        .unwrap_or_default()
}

fn is_markdown_raw(metadata: &Map<String, Value>) -> bool {
    ["format", "raw_mimetype"].iter().any(|key| {
        metadata
            .get(*key)
            .and_then(Value::as_str)
            .is_some_and(|format| format == "text/markdown")
    })
}

fn render_output(output: &Output, cell_index: usize, output_index: usize) -> Option<String> {
    match output {
        Output::Stream { text } => Some(indent(&text.joined())),
        Output::ExecuteResult { data } | Output::DisplayData { data } => {
            render_data(data, cell_index, output_index)
        }
        Output::Error { traceback } => {
            let text = ANSI_ESCAPE.replace_all(&traceback.join("\n"), "").into_owned();
            Some(indent(&text))
        }
        Output::Unsupported => None,
    }
}

fn render_data(data: &Map<String, Value>, cell_index: usize, output_index: usize) -> Option<String> {
    for (mime, extension) in IMAGE_TYPES {
        if data.contains_key(*mime) {
            return Some(format!(
                "![{extension}](output_{cell_index}_{output_index}.{extension})"
            ));
        }
    }
    if let Some(markdown) = data.get("text/markdown").and_then(value_text) {
        return Some(markdown);
    }
    data.get("text/plain").and_then(value_text).map(|text| indent(&text))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Array(lines) => Some(lines.iter().filter_map(Value::as_str).collect()),
        _ => None,
    }
}

fn indent(text: &str) -> String {
    text.trim_end_matches('\n')
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{OUTPUT_INDENT}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notebook(cells: Value) -> String {
        json!({
            "nbformat": 4,
            "nbformat_minor": 5,
            "metadata": {"language_info": {"name": "python"}},
            "cells": cells,
        })
        .to_string()
    }

    #[test]
    fn renders_markdown_and_code_cells() {
        let source = notebook(json!([
            {"cell_type": "markdown", "metadata": {}, "source": ["# Title\n", "\n", "Intro text"]},
            {"cell_type": "code", "metadata": {}, "execution_count": 1,
             "source": "x = 1\nprint(x)", "outputs": [
                {"output_type": "stream", "name": "stdout", "text": ["1\n"]}
             ]},
        ]));

        let rendered = render_notebook(&source).unwrap();
        assert_eq!(
            rendered,
            "# Title\n\nIntro text\n\n```python\nx = 1\nprint(x)\n```\n\n    1"
        );
    }

    #[test]
    fn images_become_references_and_payloads_are_dropped() {
        let source = notebook(json!([
            {"cell_type": "code", "metadata": {}, "source": "plot()", "outputs": [
                {"output_type": "display_data", "metadata": {},
                 "data": {"image/png": "iVBORw0KGgo=", "text/plain": ["<Figure>"]}}
            ]},
        ]));

        let rendered = render_notebook(&source).unwrap();
        assert_eq!(rendered, "```python\nplot()\n```\n\n![png](output_0_0.png)");
        assert!(!rendered.contains("iVBOR"));
    }

    #[test]
    fn execute_results_prefer_markdown_over_plain_text() {
        let source = notebook(json!([
            {"cell_type": "code", "metadata": {}, "source": "df", "outputs": [
                {"output_type": "execute_result", "execution_count": 2, "metadata": {},
                 "data": {"text/markdown": "**bold**", "text/plain": "bold"}}
            ]},
            {"cell_type": "code", "metadata": {}, "source": "1 + 1", "outputs": [
                {"output_type": "execute_result", "execution_count": 3, "metadata": {},
                 "data": {"text/plain": "2"}}
            ]},
        ]));

        let rendered = render_notebook(&source).unwrap();
        assert!(rendered.contains("```\n\n**bold**\n\n```python"));
        assert!(rendered.ends_with("```\n\n    2"));
    }

    #[test]
    fn error_tracebacks_lose_ansi_colours() {
        let source = notebook(json!([
            {"cell_type": "code", "metadata": {}, "source": "boom()", "outputs": [
                {"output_type": "error", "ename": "NameError", "evalue": "boom",
                 "traceback": ["\u{1b}[0;31mNameError\u{1b}[0m: boom"]}
            ]},
        ]));

        let rendered = render_notebook(&source).unwrap();
        assert!(rendered.ends_with("    NameError: boom"));
    }

    #[test]
    fn raw_cells_only_render_when_markdown() {
        let source = notebook(json!([
            {"cell_type": "raw", "metadata": {"format": "text/markdown"}, "source": "kept"},
            {"cell_type": "raw", "metadata": {"format": "text/latex"}, "source": "\\dropped"},
            {"cell_type": "raw", "metadata": {}, "source": "dropped too"},
        ]));

        assert_eq!(render_notebook(&source).unwrap(), "kept");
    }

    #[test]
    fn kernelspec_language_is_a_fallback() {
        let source = json!({
            "nbformat": 4,
            "nbformat_minor": 2,
            "metadata": {"kernelspec": {"language": "julia", "name": "julia-1.9"}},
            "cells": [{"cell_type": "code", "metadata": {}, "source": "1", "outputs": []}],
        })
        .to_string();
        assert_eq!(render_notebook(&source).unwrap(), "```julia\n1\n```");
    }

    #[test]
    fn old_nbformat_is_rejected() {
        let source = json!({"nbformat": 3, "nbformat_minor": 0, "worksheets": []}).to_string();
        match render_notebook(&source) {
            Err(FormatError::ParseError(msg)) => assert!(msg.contains("nbformat 3")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            render_notebook("{not json"),
            Err(FormatError::ParseError(_))
        ));
    }
}
