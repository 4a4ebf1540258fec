use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::{arg, value_parser, ArgMatches, Command};

use crate::commands::{build_dfa, rules_path_arg};
use crate::config::Config;

pub fn compile() -> Command {
    super::command("compile")
        .about("Compile rules to binary form")
        // Keep options sorted alphabetically by their long name.
        // For instance, --bar goes before --foo.
        .arg(rules_path_arg())
        .arg(
            arg!(-o --"output" <OUTPUT_PATH>)
                .help("Output file with the compiled DFA")
                .default_value("output.rlx")
                .value_parser(value_parser!(PathBuf)),
        )
}

pub fn exec_compile(
    args: &ArgMatches,
    config: &Config,
) -> anyhow::Result<()> {
    let rules_path = args.get_one::<PathBuf>("RULES_PATH").unwrap();
    let output_path = args.get_one::<PathBuf>("output").unwrap();

    let dfa = build_dfa(rules_path, config)?;

    let output_file = File::create(output_path).with_context(|| {
        format!("can not write `{}`", output_path.display())
    })?;

    Ok(dfa.serialize_into(&output_file)?)
}
