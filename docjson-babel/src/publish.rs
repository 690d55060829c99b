//! Output pipeline.
//!
//! Turns an input tree into JSON files on disk. [`PublishSpec`] carries the
//! run parameters (paths, output mode, chunk limits); [`publish`] walks the
//! input, projects every recognised file and writes the output units the
//! mode asks for. [`split_file`] applies the same partitioning passes to a
//! JSON file that was written earlier.
//!
//! For in-memory work, use [`collect_directory`] and the [`split`](crate::split)
//! passes directly.

use crate::collection::{collect_directory, isolate, FileFailure};
use crate::common::ProjectionOptions;
use crate::error::FormatError;
use crate::registry::FormatRegistry;
use crate::split::{split_by_count, split_by_size, split_per_key};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How a run lays out its output files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// `<subdir>.json` per top-level subdirectory, `<stem>.json` per root file.
    #[default]
    PerSubdirectory,
    /// One file per collection key.
    PerFile,
    /// The whole collection in a single file.
    Aggregate,
    /// `<prefix>_<n>.json` chunks bounded by serialized size.
    SizeChunked,
    /// `<prefix>_<n>.json` parts holding an equal share of the values.
    CountChunked,
}

impl OutputMode {
    pub const ALL: [OutputMode; 5] = [
        OutputMode::PerSubdirectory,
        OutputMode::PerFile,
        OutputMode::Aggregate,
        OutputMode::SizeChunked,
        OutputMode::CountChunked,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::PerSubdirectory => "per-subdirectory",
            OutputMode::PerFile => "per-file",
            OutputMode::Aggregate => "aggregate",
            OutputMode::SizeChunked => "size-chunked",
            OutputMode::CountChunked => "count-chunked",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = FormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        OutputMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| {
                let known: Vec<&str> = OutputMode::ALL.iter().map(|m| m.as_str()).collect();
                FormatError::Config(format!(
                    "unknown output mode '{value}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

/// Specifies a publishing run.
///
/// ```ignore
/// let spec = PublishSpec::new("docs", "docs_json")
///     .with_mode(OutputMode::SizeChunked)
///     .with_max_chunk_bytes(512 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSpec {
    pub input_root: PathBuf,
    /// Created when missing.
    pub output_root: PathBuf,
    pub mode: OutputMode,
    /// Size limit for `size-chunked` output, in compact JSON bytes.
    pub max_chunk_bytes: usize,
    /// Number of parts for `count-chunked` output.
    pub num_parts: usize,
    /// File name prefix of chunked output (`<prefix>_<n>.json`).
    pub chunk_prefix: String,
    /// File name of `aggregate` output.
    pub aggregate_file: String,
    /// Spaces per indentation level in written JSON.
    pub indent_width: usize,
    /// Abort on the first unreadable or unparsable file.
    pub fail_fast: bool,
}

pub const DEFAULT_MAX_CHUNK_BYTES: usize = 1024 * 1024;
pub const DEFAULT_NUM_PARTS: usize = 10;
pub const DEFAULT_CHUNK_PREFIX: &str = "part";
pub const DEFAULT_AGGREGATE_FILE: &str = "aggregated_documentation.json";
pub const DEFAULT_INDENT_WIDTH: usize = 4;

impl PublishSpec {
    pub fn new(input_root: impl AsRef<Path>, output_root: impl AsRef<Path>) -> Self {
        Self {
            input_root: input_root.as_ref().to_path_buf(),
            output_root: output_root.as_ref().to_path_buf(),
            mode: OutputMode::default(),
            max_chunk_bytes: DEFAULT_MAX_CHUNK_BYTES,
            num_parts: DEFAULT_NUM_PARTS,
            chunk_prefix: DEFAULT_CHUNK_PREFIX.to_string(),
            aggregate_file: DEFAULT_AGGREGATE_FILE.to_string(),
            indent_width: DEFAULT_INDENT_WIDTH,
            fail_fast: false,
        }
    }

    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_chunk_bytes(mut self, max_chunk_bytes: usize) -> Self {
        self.max_chunk_bytes = max_chunk_bytes;
        self
    }

    pub fn with_num_parts(mut self, num_parts: usize) -> Self {
        self.num_parts = num_parts;
        self
    }

    pub fn with_chunk_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.chunk_prefix = prefix.into();
        self
    }

    pub fn with_aggregate_file(mut self, file_name: impl Into<String>) -> Self {
        self.aggregate_file = file_name.into();
        self
    }

    pub fn with_indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    fn chunk_path(&self, index: usize) -> PathBuf {
        self.output_root
            .join(format!("{}_{}.json", self.chunk_prefix, index + 1))
    }
}

/// What a run wrote, and which inputs it skipped because they failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Written files, in write order.
    pub written: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

/// Project `spec.input_root` and write it out according to `spec.mode`.
///
/// # Errors
///
/// Returns [`FormatError`] if:
/// - the input root is not a directory
/// - the output directory or a file in it cannot be written
/// - chunk parameters are invalid (zero parts or a zero size limit)
/// - `fail_fast` is set and an input file fails
pub fn publish(
    spec: &PublishSpec,
    registry: &FormatRegistry,
    options: &ProjectionOptions,
) -> Result<PublishReport, FormatError> {
    fs::create_dir_all(&spec.output_root).map_err(|err| FormatError::io(&spec.output_root, err))?;

    if spec.mode == OutputMode::PerSubdirectory {
        return publish_per_subdirectory(spec, registry, options);
    }

    let collection = collect_directory(&spec.input_root, registry, options, spec.fail_fast)?;
    let mut report = PublishReport {
        written: Vec::new(),
        failures: collection.failures().to_vec(),
    };
    match spec.mode {
        OutputMode::Aggregate => {
            let path = spec.output_root.join(&spec.aggregate_file);
            write_json(&path, &collection, spec.indent_width)?;
            report.written.push(path);
        }
        _ => {
            let data = Value::Object(collection.to_json_map()?);
            report.written = write_partitioned(data, spec)?;
        }
    }
    Ok(report)
}

/// Re-partition a previously written JSON file into `spec.output_root`.
///
/// Only `per-file`, `size-chunked` and `count-chunked` apply here.
pub fn split_file(json_path: &Path, spec: &PublishSpec) -> Result<PublishReport, FormatError> {
    if !matches!(
        spec.mode,
        OutputMode::PerFile | OutputMode::SizeChunked | OutputMode::CountChunked
    ) {
        return Err(FormatError::NotSupported(format!(
            "'{}' output cannot be produced from a JSON file",
            spec.mode
        )));
    }

    let source = fs::read_to_string(json_path).map_err(|err| FormatError::io(json_path, err))?;
    let data: Value = serde_json::from_str(&source)
        .map_err(|err| FormatError::ParseError(format!("{}: {err}", json_path.display())))?;

    fs::create_dir_all(&spec.output_root).map_err(|err| FormatError::io(&spec.output_root, err))?;
    Ok(PublishReport {
        written: write_partitioned(data, spec)?,
        failures: Vec::new(),
    })
}

/// Serialize as pretty JSON with `indent_width` spaces, non-ASCII kept as is.
pub fn to_pretty_json<T: Serialize + ?Sized>(
    value: &T,
    indent_width: usize,
) -> Result<Vec<u8>, FormatError> {
    let indent = vec![b' '; indent_width];
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
    value.serialize(&mut serializer)?;
    Ok(out)
}

fn publish_per_subdirectory(
    spec: &PublishSpec,
    registry: &FormatRegistry,
    options: &ProjectionOptions,
) -> Result<PublishReport, FormatError> {
    let root = &spec.input_root;
    let mut entries = fs::read_dir(root)
        .map_err(|err| FormatError::io(root, err))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| FormatError::io(root, err))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut report = PublishReport::default();
    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if path.is_dir() {
            let collection = collect_directory(&path, registry, options, spec.fail_fast)?;
            report
                .failures
                .extend(collection.failures().iter().map(|failure| FileFailure {
                    path: format!("{name}/{}", failure.path),
                    message: failure.message.clone(),
                }));
            let target = spec.output_root.join(format!("{name}.json"));
            write_json(&target, &collection, spec.indent_width)?;
            report.written.push(target);
            continue;
        }

        let span = tracing::debug_span!("project_file", path = %name);
        let _entered = span.enter();
        match registry.project_file(&path, options) {
            Ok(Some(projection)) => {
                let stem = path
                    .file_stem()
                    .map_or_else(|| name.clone(), |stem| stem.to_string_lossy().into_owned());
                let target = spec.output_root.join(format!("{stem}.json"));
                write_json(&target, &projection, spec.indent_width)?;
                report.written.push(target);
            }
            Ok(None) => tracing::debug!("no format claims this extension, skipped"),
            Err(error) => isolate(&mut report.failures, name, error, spec.fail_fast)?,
        }
    }
    Ok(report)
}

/// Write the per-file, size-chunked or count-chunked units of `data`.
fn write_partitioned(data: Value, spec: &PublishSpec) -> Result<Vec<PathBuf>, FormatError> {
    let mut written = Vec::new();
    match spec.mode {
        OutputMode::PerFile => {
            for (stem, unit) in split_per_key(expect_object(&data, spec.mode)?) {
                let path = spec.output_root.join(format!("{stem}.json"));
                write_json(&path, &unit, spec.indent_width)?;
                written.push(path);
            }
        }
        OutputMode::SizeChunked => {
            let chunks = split_by_size(expect_object(&data, spec.mode)?, spec.max_chunk_bytes)?;
            for (index, chunk) in chunks.iter().enumerate() {
                let path = spec.chunk_path(index);
                write_json(&path, chunk, spec.indent_width)?;
                written.push(path);
            }
        }
        OutputMode::CountChunked => {
            for (index, part) in split_by_count(data, spec.num_parts)?.iter().enumerate() {
                let path = spec.chunk_path(index);
                write_json(&path, part, spec.indent_width)?;
                written.push(path);
            }
        }
        OutputMode::PerSubdirectory | OutputMode::Aggregate => {
            return Err(FormatError::NotSupported(format!(
                "'{}' output is not a partitioning",
                spec.mode
            )))
        }
    }
    Ok(written)
}

fn expect_object(
    data: &Value,
    mode: OutputMode,
) -> Result<&serde_json::Map<String, Value>, FormatError> {
    data.as_object().ok_or_else(|| {
        FormatError::NotSupported(format!("'{mode}' output needs a top-level JSON object"))
    })
}

fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    indent_width: usize,
) -> Result<(), FormatError> {
    let bytes = to_pretty_json(value, indent_width)?;
    fs::write(path, bytes).map_err(|err| FormatError::io(path, err))?;
    tracing::info!(path = %path.display(), "wrote output");
    Ok(())
}
