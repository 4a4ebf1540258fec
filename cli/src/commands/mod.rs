mod compile;
mod dfa;
mod nfa;
mod run;

pub use compile::*;
pub use dfa::*;
pub use nfa::*;
pub use run::*;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{arg, command, crate_authors, value_parser, Arg, Command};
use relex::{Compiler, Dfa, Nfa};

use crate::config::Config;
use crate::{commands, help, APP_HELP_TEMPLATE};

pub fn command(name: &'static str) -> Command {
    Command::new(name).help_template(
        r#"{about-with-newline}
{usage-heading}
  {usage}

{all-args}
"#,
    )
}

pub fn cli() -> Command {
    command!()
        .author(crate_authors!("\n")) // requires `cargo` feature
        .arg_required_else_help(true)
        .arg(
            arg!(-C --config <CONFIG_FILE> "Config file")
                .value_parser(existing_path_parser)
                .long_help(help::CONFIG_FILE),
        )
        .help_template(APP_HELP_TEMPLATE)
        .subcommand_required(true)
        .subcommands(vec![
            commands::nfa(),
            commands::dfa(),
            commands::compile(),
            commands::run(),
        ])
}

/// The `<RULES_PATH>` argument shared by all commands.
fn rules_path_arg() -> Arg {
    arg!(<RULES_PATH>)
        .help("Path to a lex source file")
        .long_help(help::RULES_PATH_LONG_HELP)
        .value_parser(value_parser!(PathBuf))
}

/// Parses a path and makes sure that it exists.
fn existing_path_parser(input: &str) -> Result<PathBuf, anyhow::Error> {
    let path = PathBuf::from(input);
    if path.try_exists()? {
        Ok(path)
    } else {
        Err(anyhow!("file not found"))
    }
}

/// Reads the source file at `path` and adds it to a new compiler that uses
/// the limits in `config`.
fn new_compiler(path: &Path, config: &Config) -> anyhow::Result<Compiler> {
    let src = fs::read_to_string(path)
        .with_context(|| format!("can not read `{}`", path.display()))?;

    let mut compiler = Compiler::new();

    compiler
        .limits(config.limits)
        .add_source(&src)
        .with_context(|| format!("can not compile `{}`", path.display()))?;

    Ok(compiler)
}

pub fn build_nfa(path: &Path, config: &Config) -> anyhow::Result<Nfa> {
    Ok(new_compiler(path, config)?.build_nfa()?)
}

pub fn build_dfa(path: &Path, config: &Config) -> anyhow::Result<Dfa> {
    Ok(new_compiler(path, config)?.build()?)
}
