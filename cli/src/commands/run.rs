use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::{arg, ArgAction, ArgMatches, Command};
use relex::Dfa;
use yansi::Color::{Green, Red};
use yansi::Paint;

use crate::commands::{build_dfa, rules_path_arg};
use crate::config::Config;
use crate::help;

pub fn run() -> Command {
    super::command("run")
        .about("Run strings through the DFA and print the accepted actions")
        // Keep options sorted alphabetically by their long name.
        // For instance, --bar goes before --foo.
        .arg(rules_path_arg())
        .arg(
            arg!(<INPUT>)
                .help("String to run through the DFA")
                .action(ArgAction::Append),
        )
        .arg(
            arg!(-c --"compiled-rules")
                .help("Indicate that RULES_PATH is a file with a compiled DFA")
                .long_help(help::COMPILED_RULES_LONG_HELP),
        )
}

pub fn exec_run(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let rules_path = args.get_one::<PathBuf>("RULES_PATH").unwrap();
    let inputs = args.get_many::<String>("INPUT").unwrap();

    let dfa = if args.get_flag("compiled-rules") {
        let file = File::open(rules_path).with_context(|| {
            format!("can not open `{}`", rules_path.display())
        })?;
        Dfa::deserialize_from(file).with_context(|| {
            format!("can not load `{}`", rules_path.display())
        })?
    } else {
        build_dfa(rules_path, config)?
    };

    for input in inputs {
        let accepted = dfa
            .run(input.as_bytes())
            .and_then(|state| dfa.accept(state));

        match accepted {
            Some((action, _)) => {
                println!("{}: {}", input, action.paint(Green))
            }
            None => println!("{}: {}", input, "no match".paint(Red)),
        }
    }

    Ok(())
}
