// Command-line interface for docjson
//
// This binary projects documentation sources (reStructuredText, Markdown, Jupyter notebooks) into
// nested JSON. The work is done by the docjson-babel library; this crate only wires configuration,
// logging and the shell together.
//
// Usage:
//  docjson [<input>] [-o <dir>] [--mode <mode>]            - Run the configured pipeline (default)
//  docjson convert [<input>] [-o <dir>] [--mode <mode>]    - Same as above (explicit)
//  docjson project <file> [--from <format>]                - Print one file's projection as JSON
//  docjson inspect <file> [--from <format>]                - Print the parsed tree and diagnostics
//  docjson split <json> --mode <mode> [-o <dir>]           - Re-partition a written JSON file
//  docjson --list-formats                                  - List registered source formats
//
// Configuration:
//
// Defaults are embedded (see docjson-config); ./docjson.toml and --config <path> are layered on top.
//
// Extra Parameters:
//
// Configuration knobs can be overridden with --extra-<parameter-name> <value>.
// Boolean knobs can omit the value (defaults to "true").
// Example:
//  docjson docs --mode size-chunked --extra-max-chunk-bytes 500000

use clap::{Arg, ArgAction, Command, ValueHint};
use docjson_babel::tree::treeviz;
use docjson_babel::{publish, split_file, FormatRegistry, OutputMode};
use docjson_config::{DocjsonConfig, Loader, MarkdownModeConfig, LOCAL_CONFIG_FILE};
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["convert", "project", "inspect", "split", "help"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = if let Some(key) = arg.strip_prefix("--extra-") {
            Some(key)
        } else {
            arg.strip_prefix("--extras-")
        };

        if let Some(key) = key_opt {
            // A following argument that is not a flag is this key's value
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn mode_arg(modes: &[OutputMode]) -> Arg {
    let names: Vec<&'static str> = modes.iter().map(|mode| mode.as_str()).collect();
    Arg::new("mode")
        .long("mode")
        .value_name("MODE")
        .value_parser(clap::builder::PossibleValuesParser::new(names))
        .value_hint(ValueHint::Other)
}

fn build_cli() -> Command {
    Command::new("docjson")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Project reStructuredText, Markdown and notebooks into nested JSON")
        .long_about(
            "docjson walks a documentation tree and writes its content as JSON records that keep \
            each document's section hierarchy.\n\n\
            Commands:\n  \
            - convert: run the configured pipeline over a directory (default)\n  \
            - project: print the projection of a single file\n  \
            - inspect: print the parsed tree of a single file\n  \
            - split:   re-partition a JSON file written earlier\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to override configuration knobs:\n  \
            max-chunk-bytes, num-parts, chunk-prefix, indent-width, subsection-echo,\n  \
            markdown-mode, inline-diagnostics, fail-fast.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            docjson docs -o docs_json                          # One JSON file per subdirectory\n  \
            docjson docs --mode aggregate                      # Everything in one file\n  \
            docjson project guide.rst                          # Print one projection\n  \
            docjson split all.json --mode count-chunked -o out # Re-partition a file",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List registered source formats")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a docjson.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log progress at info level (RUST_LOG is used otherwise)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Project a directory and write the JSON output (default command)")
                .long_about(
                    "Walk the input directory, project every .rst/.rest, .md/.markdown and \
                    .ipynb file and write the result in the configured output mode.\n\n\
                    Output modes:\n  \
                    - per-subdirectory: <subdir>.json per top-level directory, <stem>.json per root file\n  \
                    - per-file:         one file per document\n  \
                    - aggregate:        the whole collection in one file\n  \
                    - size-chunked:     <prefix>_<n>.json of bounded size\n  \
                    - count-chunked:    <prefix>_<n>.json holding equal shares\n\n\
                    Input and output default to paths.input_root and paths.output_root.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input directory (defaults to the configured input_root)")
                        .index(1)
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output directory (defaults to the configured output_root)")
                        .value_hint(ValueHint::DirPath),
                )
                .arg(mode_arg(&OutputMode::ALL).help("Output mode (defaults to output.mode)")),
        )
        .subcommand(
            Command::new("project")
                .about("Print the JSON projection of one file")
                .arg(
                    Arg::new("file")
                        .help("Source file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the parsed tree and diagnostics of one file")
                .arg(
                    Arg::new("file")
                        .help("Source file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("split")
                .about("Re-partition a JSON mapping written earlier")
                .arg(
                    Arg::new("json")
                        .help("JSON file holding an object (or an array, for count-chunked)")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output directory (defaults to the configured output_root)")
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    mode_arg(&[
                        OutputMode::PerFile,
                        OutputMode::SizeChunked,
                        OutputMode::CountChunked,
                    ])
                    .help("Partitioning to apply")
                    .required(true),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A leading path means the default command was meant
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_logging(matches.get_flag("verbose"));

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);
    for key in extra_params.keys() {
        tracing::warn!("ignoring unknown option --extra-{key}");
    }

    if matches.get_flag("list-formats") {
        handle_list_formats_command(&config);
        return;
    }

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches.get_one::<String>("input").map(|s| s.as_str());
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            let mode = sub_matches.get_one::<String>("mode").map(|s| s.as_str());
            handle_convert_command(input, output, mode, &mut config);
        }
        // Only global flags were given: run the configured pipeline
        None => handle_convert_command(None, None, None, &mut config),
        Some(("project", sub_matches)) => {
            let file = sub_matches
                .get_one::<String>("file")
                .expect("file is required");
            let from = sub_matches.get_one::<String>("from").map(|s| s.as_str());
            handle_project_command(file, from, &config);
        }
        Some(("inspect", sub_matches)) => {
            let file = sub_matches
                .get_one::<String>("file")
                .expect("file is required");
            let from = sub_matches.get_one::<String>("from").map(|s| s.as_str());
            handle_inspect_command(file, from, &config);
        }
        Some(("split", sub_matches)) => {
            let json = sub_matches
                .get_one::<String>("json")
                .expect("json is required");
            let mode = sub_matches
                .get_one::<String>("mode")
                .expect("mode is required");
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_split_command(json, mode, output, &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Log to stderr. `--verbose` shows info events; otherwise RUST_LOG decides, defaulting to warn.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(context: &str, err: impl Display) -> ! {
    eprintln!("Error: {context}: {err}");
    std::process::exit(1);
}

fn handle_convert_command(
    input: Option<&str>,
    output: Option<&str>,
    mode: Option<&str>,
    config: &mut DocjsonConfig,
) {
    if let Some(input) = input {
        config.paths.input_root = input.into();
    }
    if let Some(output) = output {
        config.paths.output_root = output.into();
    }
    if let Some(mode) = mode {
        config.output.mode = mode
            .parse()
            .unwrap_or_else(|e| fail("invalid --mode", e));
    }

    let spec = config.publish_spec();
    let report = publish(&spec, &config.registry(), &config.projection_options())
        .unwrap_or_else(|e| fail("conversion failed", e));

    for path in &report.written {
        println!("{}", path.display());
    }
    if !report.failures.is_empty() {
        eprintln!("Skipped {} file(s) that failed:", report.failures.len());
        for failure in &report.failures {
            eprintln!("  {}: {}", failure.path, failure.message);
        }
    }
}

/// Resolve the format for `file`: explicit `--from`, else the file extension.
fn resolve_format(registry: &FormatRegistry, file: &str, from: Option<&str>) -> String {
    if let Some(format) = from {
        if let Err(e) = registry.get(format) {
            fail("unknown --from format", e);
        }
        return format.to_string();
    }
    match registry.detect_format_from_filename(file) {
        Some(detected) => detected,
        None => {
            eprintln!("Error: Could not detect format from filename '{file}'");
            eprintln!("Please specify --from explicitly");
            std::process::exit(1);
        }
    }
}

fn handle_project_command(file: &str, from: Option<&str>, config: &DocjsonConfig) {
    let registry = config.registry();
    let format = resolve_format(&registry, file, from);
    let source =
        fs::read_to_string(file).unwrap_or_else(|e| fail(&format!("reading '{file}'"), e));

    let projection = registry
        .project(&source, &format, &config.projection_options())
        .unwrap_or_else(|e| fail("projection failed", e));
    let bytes = docjson_babel::publish::to_pretty_json(&projection, config.output.indent_width)
        .unwrap_or_else(|e| fail("serialization failed", e));
    println!("{}", String::from_utf8_lossy(&bytes));
}

fn handle_inspect_command(file: &str, from: Option<&str>, config: &DocjsonConfig) {
    let registry = config.registry();
    let format = resolve_format(&registry, file, from);
    let source =
        fs::read_to_string(file).unwrap_or_else(|e| fail(&format!("reading '{file}'"), e));

    let doc = registry
        .parse(&source, &format)
        .unwrap_or_else(|e| fail("parse failed", e));
    print!("{}", treeviz::render(&doc));
}

fn handle_split_command(json: &str, mode: &str, output: Option<&str>, config: &DocjsonConfig) {
    let mode: OutputMode = mode
        .parse()
        .unwrap_or_else(|e| fail("invalid --mode", e));
    let mut spec = config.publish_spec().with_mode(mode);
    if let Some(output) = output {
        spec.output_root = output.into();
    }

    let report =
        split_file(Path::new(json), &spec).unwrap_or_else(|e| fail("split failed", e));
    for path in &report.written {
        println!("{}", path.display());
    }
}

fn handle_list_formats_command(config: &DocjsonConfig) {
    let registry = config.registry();
    println!("Available formats:");
    for name in registry.list_formats() {
        let Ok(format) = registry.get(&name) else {
            continue;
        };
        let extensions: Vec<String> = format
            .file_extensions()
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect();
        println!(
            "  {name:<10} {} ({})",
            format.description(),
            extensions.join(", ")
        );
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> DocjsonConfig {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn apply_config_overrides(config: &mut DocjsonConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = extra_params.remove("max-chunk-bytes") {
        config.output.max_chunk_bytes = parse_usize_arg("max-chunk-bytes", &raw);
    }
    if let Some(raw) = extra_params.remove("num-parts") {
        config.output.num_parts = parse_usize_arg("num-parts", &raw);
    }
    if let Some(raw) = extra_params.remove("indent-width") {
        config.output.indent_width = parse_usize_arg("indent-width", &raw);
    }
    if let Some(prefix) = take_override(extra_params, &["chunk-prefix", "prefix"]) {
        config.output.chunk_prefix = prefix;
    }
    if let Some(raw) = take_override(extra_params, &["subsection-echo", "echo"]) {
        config.projection.subsection_echo = parse_bool_arg("subsection-echo", &raw);
    }
    if let Some(raw) = extra_params.remove("inline-diagnostics") {
        config.rst.inline_diagnostics = parse_bool_arg("inline-diagnostics", &raw);
    }
    if let Some(raw) = extra_params.remove("fail-fast") {
        config.run.fail_fast = parse_bool_arg("fail-fast", &raw);
    }
    if let Some(raw) = extra_params.remove("markdown-mode") {
        config.markdown.mode = match raw.to_lowercase().as_str() {
            "verbatim" => MarkdownModeConfig::Verbatim,
            "structured" => MarkdownModeConfig::Structured,
            other => {
                eprintln!(
                    "Invalid value '{other}' for --extra-markdown-mode (expected verbatim or structured)"
                );
                std::process::exit(1);
            }
        };
    }
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = map.remove(*key) {
            return Some(value);
        }
    }
    None
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}

fn parse_usize_arg(flag: &str, raw: &str) -> usize {
    raw.parse().unwrap_or_else(|_| {
        eprintln!("Invalid number '{raw}' for --extra-{flag}");
        std::process::exit(1);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_extra_args_empty() {
        let args = args(&["docjson", "project", "guide.rst"]);
        let (cleaned, extra) = parse_extra_args(&args);

        assert_eq!(cleaned, args);
        assert!(extra.is_empty());
    }

    #[test]
    fn test_parse_extra_args_single_param() {
        let (cleaned, extra) = parse_extra_args(&args(&[
            "docjson",
            "docs",
            "--extra-num-parts",
            "4",
        ]));

        assert_eq!(cleaned, args(&["docjson", "docs"]));
        assert_eq!(extra.len(), 1);
        assert_eq!(extra.get("num-parts"), Some(&"4".to_string()));
    }

    #[test]
    fn test_parse_extra_args_mixed_with_regular_args() {
        let (cleaned, extra) = parse_extra_args(&args(&[
            "docjson",
            "convert",
            "--extra-chunk-prefix",
            "examples_part",
            "docs",
            "-o",
            "out",
        ]));

        assert_eq!(cleaned, args(&["docjson", "convert", "docs", "-o", "out"]));
        assert_eq!(extra.get("chunk-prefix"), Some(&"examples_part".to_string()));
    }

    #[test]
    fn test_parse_extra_args_boolean_flag() {
        let (cleaned, extra) = parse_extra_args(&args(&[
            "docjson",
            "--extra-fail-fast",
            "--extra-subsection-echo",
            "docs",
        ]));

        // "docs" is taken as the value of the preceding key
        assert_eq!(cleaned, args(&["docjson"]));
        assert_eq!(extra.get("fail-fast"), Some(&"true".to_string()));
        assert_eq!(extra.get("subsection-echo"), Some(&"docs".to_string()));
    }

    #[test]
    fn test_parse_extra_args_boolean_flag_at_end() {
        let (cleaned, extra) =
            parse_extra_args(&args(&["docjson", "docs", "--extra-inline-diagnostics"]));

        assert_eq!(cleaned, args(&["docjson", "docs"]));
        assert_eq!(extra.get("inline-diagnostics"), Some(&"true".to_string()));
    }

    #[test]
    fn test_parse_extra_args_allows_extras_alias() {
        let (_, extra) = parse_extra_args(&args(&["docjson", "docs", "--extras-num-parts", "2"]));
        assert_eq!(extra.get("num-parts"), Some(&"2".to_string()));
    }

    #[test]
    fn apply_config_overrides_updates_known_flags() {
        let mut config = load_cli_config(None);
        let mut extras = HashMap::new();
        extras.insert("max-chunk-bytes".to_string(), "2048".to_string());
        extras.insert("num-parts".to_string(), "3".to_string());
        extras.insert("chunk-prefix".to_string(), "chunk".to_string());
        extras.insert("subsection-echo".to_string(), "yes".to_string());
        extras.insert("markdown-mode".to_string(), "structured".to_string());
        extras.insert("fail-fast".to_string(), "true".to_string());

        apply_config_overrides(&mut config, &mut extras);

        assert_eq!(config.output.max_chunk_bytes, 2048);
        assert_eq!(config.output.num_parts, 3);
        assert_eq!(config.output.chunk_prefix, "chunk");
        assert!(config.projection.subsection_echo);
        assert_eq!(config.markdown.mode, MarkdownModeConfig::Structured);
        assert!(config.run.fail_fast);
        assert!(extras.is_empty());
    }

    #[test]
    fn unknown_extras_are_left_in_place() {
        let mut config = load_cli_config(None);
        let mut extras = HashMap::new();
        extras.insert("colour".to_string(), "true".to_string());

        apply_config_overrides(&mut config, &mut extras);
        assert_eq!(extras.len(), 1);
    }

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }
}
