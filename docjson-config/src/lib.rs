//! Shared configuration loader for the docjson toolchain.
//!
//! `defaults/docjson.default.toml` is embedded into every binary so that docs
//! and runtime behavior stay in sync. Applications layer user-specific files
//! on top of those defaults via [`Loader`] before deserializing into
//! [`DocjsonConfig`]. The config groups convert into the option types of
//! `docjson-babel` with `From`.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use docjson_babel::{
    DiagnosticFilter, FormatRegistry, MarkdownFormat, MarkdownMode, OutputMode, ProjectionOptions,
    PublishSpec, RstFormat, RstOptions,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/docjson.default.toml");

/// File picked up from the working directory when present.
pub const LOCAL_CONFIG_FILE: &str = "docjson.toml";

/// Top-level configuration consumed by docjson applications.
#[derive(Debug, Clone, Deserialize)]
pub struct DocjsonConfig {
    pub paths: PathsConfig,
    pub output: OutputConfig,
    pub projection: ProjectionConfig,
    pub markdown: MarkdownConfig,
    pub rst: RstConfig,
    pub run: RunConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
}

/// Output layout and chunking knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub mode: OutputMode,
    pub max_chunk_bytes: usize,
    pub num_parts: usize,
    pub chunk_prefix: String,
    pub aggregate_file: String,
    pub indent_width: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionConfig {
    pub subsection_echo: bool,
    pub diagnostic_denylist: Vec<String>,
}

impl From<&ProjectionConfig> for ProjectionOptions {
    fn from(config: &ProjectionConfig) -> Self {
        ProjectionOptions {
            filter: DiagnosticFilter::new(config.diagnostic_denylist.iter()),
            subsection_echo: config.subsection_echo,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub mode: MarkdownModeConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownModeConfig {
    Verbatim,
    Structured,
}

impl From<MarkdownModeConfig> for MarkdownMode {
    fn from(mode: MarkdownModeConfig) -> Self {
        match mode {
            MarkdownModeConfig::Verbatim => MarkdownMode::Verbatim,
            MarkdownModeConfig::Structured => MarkdownMode::Structured,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RstConfig {
    pub inline_diagnostics: bool,
}

impl From<&RstConfig> for RstOptions {
    fn from(config: &RstConfig) -> Self {
        RstOptions {
            inline_diagnostics: config.inline_diagnostics,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub fail_fast: bool,
}

impl From<&DocjsonConfig> for PublishSpec {
    fn from(config: &DocjsonConfig) -> Self {
        let output = &config.output;
        PublishSpec::new(&config.paths.input_root, &config.paths.output_root)
            .with_mode(output.mode)
            .with_max_chunk_bytes(output.max_chunk_bytes)
            .with_num_parts(output.num_parts)
            .with_chunk_prefix(output.chunk_prefix.clone())
            .with_aggregate_file(output.aggregate_file.clone())
            .with_indent_width(output.indent_width)
            .with_fail_fast(config.run.fail_fast)
    }
}

impl DocjsonConfig {
    /// Default registry with the Markdown and reStructuredText formats
    /// configured from this config.
    pub fn registry(&self) -> FormatRegistry {
        let mut registry = FormatRegistry::with_defaults();
        registry.register(MarkdownFormat::new(self.markdown.mode.into()));
        registry.register(RstFormat::new((&self.rst).into()));
        registry
    }

    pub fn projection_options(&self) -> ProjectionOptions {
        (&self.projection).into()
    }

    pub fn publish_spec(&self) -> PublishSpec {
        self.into()
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<DocjsonConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<DocjsonConfig, ConfigError> {
    Loader::new().build()
}
