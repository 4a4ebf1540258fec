use std::path::PathBuf;

use clap::{ArgMatches, Command};

use crate::commands::{build_dfa, rules_path_arg};
use crate::config::Config;

pub fn dfa() -> Command {
    super::command("dfa")
        .about("Print the DFA transition table built from the rules")
        .arg(rules_path_arg())
}

pub fn exec_dfa(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let rules_path = args.get_one::<PathBuf>("RULES_PATH").unwrap();
    let dfa = build_dfa(rules_path, config)?;

    print!("{}", dfa);

    Ok(())
}
