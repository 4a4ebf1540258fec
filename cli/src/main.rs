mod commands;
mod config;
mod help;

#[cfg(test)]
mod tests;

use std::{io, process};

use crossterm::tty::IsTty;
use yansi::Color::Red;
use yansi::Paint;

use crate::commands::cli;
use crate::config::{load_config_from_file, Config};

const APP_HELP_TEMPLATE: &str = r#"relex {version}, lex rules into automata.

{author-with-newline}
{before-help}{usage-heading}
  {usage}

{all-args}{after-help}
"#;

const EXIT_ERROR: i32 = 1;
const CONFIG_FILE: &str = ".relex.toml";

/// Loads the config file passed with `--config`, or the one in the home
/// directory. A missing or invalid config file in the home directory is
/// ignored, but errors in the file passed with `--config` are reported.
fn load_config(args: &clap::ArgMatches) -> anyhow::Result<Config> {
    if let Some(path) = args.get_one::<std::path::PathBuf>("config") {
        return Ok(load_config_from_file(path)?);
    }

    Ok(match home::home_dir() {
        Some(home_path) if !home_path.as_os_str().is_empty() => {
            load_config_from_file(&home_path.join(CONFIG_FILE))
                .unwrap_or_default()
        }
        _ => Config::default(),
    })
}

fn main() -> anyhow::Result<()> {
    // Enable support for ANSI escape codes in Windows. In other platforms
    // this is a no-op.
    if let Err(err) = enable_ansi_support::enable_ansi_support() {
        println!("could not enable ANSI support: {}", err)
    }

    #[cfg(feature = "logging")]
    env_logger::init();

    // If stdout is not a tty (for example, because it was redirected to a
    // file) turn off colors.
    if !io::stdout().is_tty() {
        yansi::disable();
    }

    let args = cli().get_matches();

    let result = load_config(&args).and_then(|config| {
        log::debug!("using limits {:?}", config.limits);
        match args.subcommand() {
            Some(("nfa", args)) => commands::exec_nfa(args, &config),
            Some(("dfa", args)) => commands::exec_dfa(args, &config),
            Some(("compile", args)) => commands::exec_compile(args, &config),
            Some(("run", args)) => commands::exec_run(args, &config),
            _ => unreachable!(),
        }
    });

    if let Err(err) = result {
        if let Some(source) = err.source() {
            eprintln!("{} {}: {}", "error:".paint(Red).bold(), err, source);
        } else {
            eprintln!("{} {}", "error:".paint(Red).bold(), err);
        }
        process::exit(EXIT_ERROR);
    }

    Ok(())
}
