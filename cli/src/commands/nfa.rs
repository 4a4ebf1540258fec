use std::path::PathBuf;

use clap::{arg, ArgMatches, Command};

use crate::commands::{build_nfa, rules_path_arg};
use crate::config::Config;

pub fn nfa() -> Command {
    super::command("nfa")
        .about("Print the NFA built from the rules")
        .arg(rules_path_arg())
        .arg(
            arg!(-g --"graphviz")
                .help("Print the NFA in Graphviz's DOT format"),
        )
}

pub fn exec_nfa(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let rules_path = args.get_one::<PathBuf>("RULES_PATH").unwrap();
    let nfa = build_nfa(rules_path, config)?;

    if args.get_flag("graphviz") {
        print!("{}", nfa.graphviz());
    } else {
        print!("{}", nfa);
    }

    Ok(())
}
