use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Context;
use chrono::{Local, NaiveDateTime, SubsecRound};
use clap::Parser;

use workwear_cli::{Cli, Command, OutputMode, execute, format_error, format_output, shell};
use workwear_infra::{CsvTableStore, Tracker, TrackerConfig};

const HISTORY_FILE: &str = ".workwear_history";

fn main() -> ExitCode {
    let cli = Cli::parse();
    workwear_observability::init();

    let mode = OutputMode::from_json_flag(cli.json);
    match run(cli, mode) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            ExitCode::FAILURE
        }
    }
}

/// Local wall-clock time in whole seconds, as stored in the issuance table.
fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

fn run(cli: Cli, mode: OutputMode) -> anyhow::Result<ExitCode> {
    let config = TrackerConfig::from_env()?.with_overrides(cli.data_dir, cli.low_stock);
    let store = CsvTableStore::new(&config);
    let mut tracker = Tracker::open(store, config.low_stock_threshold)
        .with_context(|| format!("cannot open data directory {}", config.data_dir().display()))?;

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell if io::stdin().is_terminal() => {
            let history = config.data_dir().join(HISTORY_FILE);
            shell::run_interactive(&mut tracker, mode, Some(&history), now)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Shell => {
            let stdin = io::stdin();
            let failures = shell::run_pipe(
                &mut tracker,
                stdin.lock(),
                &mut io::stdout(),
                &mut io::stderr(),
                mode,
                now,
            )?;
            Ok(if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        command => {
            let output = execute(&mut tracker, &command, now())?;
            println!("{}", format_output(&output, mode)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
