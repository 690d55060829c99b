use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the output modes in docjson-babel's publish module.
// Build scripts can't depend on the crate they build, so the list is repeated here.
const OUTPUT_MODES: &[&str] = &[
    "per-subdirectory",
    "per-file",
    "aggregate",
    "size-chunked",
    "count-chunked",
];

const SPLIT_MODES: &[&str] = &["per-file", "size-chunked", "count-chunked"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("docjson")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Project reStructuredText, Markdown and notebooks into nested JSON")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .arg(Arg::new("input").index(1).value_hint(ValueHint::DirPath))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .value_parser(clap::builder::PossibleValuesParser::new(OUTPUT_MODES)),
                ),
        )
        .subcommand(
            Command::new("project")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("from").long("from").value_hint(ValueHint::Other)),
        )
        .subcommand(
            Command::new("inspect")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("from").long("from").value_hint(ValueHint::Other)),
        )
        .subcommand(
            Command::new("split")
                .arg(
                    Arg::new("json")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .required(true)
                        .value_parser(clap::builder::PossibleValuesParser::new(SPLIT_MODES)),
                ),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "docjson", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "docjson", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "docjson", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
