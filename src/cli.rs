// src/cli.rs
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf, process::ExitCode};

use crate::core::config::DEFAULT_CONFIG_FILE;
use crate::core::models::Deficiency;
use crate::t;

pub mod commands;

/// Exit status when at least one completed case reported issues.
pub const EXIT_ISSUES: u8 = 1;
/// Exit status when the run could not complete.
pub const EXIT_FATAL: u8 = 2;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` or `--lang=<VALUE>` argument.
pub fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if let Some(value) = args.iter().find_map(|arg| arg.strip_prefix("--lang=")) {
        return Some(value.to_string());
    }
    let pos = args.iter().position(|arg| arg == "--lang")?;
    args.get(pos + 1).cloned()
}

fn parse_deficiency(value: &str) -> Result<Deficiency, String> {
    value.parse::<Deficiency>().map_err(|e| e.to_string())
}

fn deficiency_arg(locale: &str) -> Arg {
    Arg::new("deficiency")
        .short('d')
        .long("deficiency")
        .help(t!("arg_deficiency", locale = locale).to_string())
        .value_name("KIND")
        .required(true)
        .value_parser(parse_deficiency)
        .action(ArgAction::Set)
}

pub fn build_cli(locale: &str) -> Command {
    Command::new("cvd-matrix")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cmd_run_about", locale = locale).to_string())
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help(t!("arg_config", locale = locale).to_string())
                        .value_name("CONFIG")
                        .default_value(DEFAULT_CONFIG_FILE)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("target")
                        .long("target")
                        .help(t!("arg_target", locale = locale).to_string())
                        .value_name("TARGET")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("screenshots")
                        .long("screenshots")
                        .help(t!("arg_screenshots", locale = locale).to_string())
                        .value_name("DIR")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("only")
                        .long("only")
                        .help(t!("arg_only", locale = locale).to_string())
                        .value_name("TEXT")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help(t!("arg_html", locale = locale).to_string())
                        .value_name("HTML")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help(t!("arg_json", locale = locale).to_string())
                        .value_name("JSON")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cmd_init_about", locale = locale).to_string())
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("arg_non_interactive", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("arg_force", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about(t!("cmd_simulate_about", locale = locale).to_string())
                .arg(
                    Arg::new("color")
                        .help(t!("arg_color", locale = locale).to_string())
                        .value_name("HEX")
                        .required(true)
                        .allow_hyphen_values(true)
                        .action(ArgAction::Set),
                )
                .arg(deficiency_arg(locale)),
        )
        .subcommand(
            Command::new("rewrite")
                .about(t!("cmd_rewrite_about", locale = locale).to_string())
                .arg(
                    Arg::new("input")
                        .help(t!("arg_css_file", locale = locale).to_string())
                        .value_name("CSS_FILE")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(deficiency_arg(locale))
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("arg_output", locale = locale).to_string())
                        .value_name("OUT")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
}

/// Parses the command line and runs the selected subcommand.
///
/// Returns the process exit code; errors are fatal and mapped to
/// [`EXIT_FATAL`] by the caller.
pub async fn run() -> Result<ExitCode> {
    // Pre-parse language and initialize i18n first.
    let explicit_language = pre_parse_language();
    if let Some(language) = &explicit_language {
        rust_i18n::set_locale(crate::match_locale(language));
    }
    let language = rust_i18n::locale().to_string();

    let matches = build_cli(&language).get_matches();
    dispatch(&matches, explicit_language.is_some()).await
}

async fn dispatch(matches: &ArgMatches, explicit_language: bool) -> Result<ExitCode> {
    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let options = commands::run::RunOptions {
                config: run_matches
                    .get_one::<PathBuf>("config")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
                target: run_matches.get_one::<String>("target").cloned(),
                screenshots: run_matches.get_one::<PathBuf>("screenshots").cloned(),
                only: run_matches
                    .get_many::<String>("only")
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default(),
                html: run_matches.get_one::<PathBuf>("html").cloned(),
                json: run_matches.get_one::<PathBuf>("json").cloned(),
                explicit_language,
            };
            commands::run::execute(options).await
        }
        Some(("init", init_matches)) => {
            let non_interactive = init_matches.get_flag("non-interactive");
            let force = init_matches.get_flag("force");
            commands::init::run_init_wizard(non_interactive, force)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(("simulate", sim_matches)) => {
            let color = sim_matches
                .get_one::<String>("color")
                .map(String::as_str)
                .unwrap_or_default();
            let deficiency = required_deficiency(sim_matches)?;
            commands::simulate::execute(color, deficiency)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(("rewrite", rewrite_matches)) => {
            let input = rewrite_matches
                .get_one::<PathBuf>("input")
                .cloned()
                .unwrap_or_default();
            let deficiency = required_deficiency(rewrite_matches)?;
            let output = rewrite_matches.get_one::<PathBuf>("output").cloned();
            commands::rewrite::execute(&input, deficiency, output.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        // `subcommand_required` makes clap print help and exit before this is reached.
        _ => Ok(ExitCode::SUCCESS),
    }
}

fn required_deficiency(matches: &ArgMatches) -> Result<Deficiency> {
    matches
        .get_one::<Deficiency>("deficiency")
        .copied()
        .ok_or_else(|| anyhow::anyhow!(t!("missing_deficiency").to_string()))
}
