//! Shell loop with rustyline.
//!
//! Interactive mode: prompt, history, `help`/`quit`.
//! Pipe mode: read lines from any reader, execute each.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{anyhow, bail};
use chrono::NaiveDateTime;
use clap::{CommandFactory, Parser};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use workwear_infra::{TableStore, Tracker};

use crate::commands::ShellLine;
use crate::execute::execute;
use crate::format::{OutputMode, format_error, format_output};

const PROMPT: &str = "workwear> ";

/// What one shell line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Blank line or comment.
    Nothing,
    Print(String),
    Quit,
}

/// Interpret one line. Errors leave the session running.
pub fn run_line<S: TableStore>(
    tracker: &mut Tracker<S>,
    line: &str,
    mode: OutputMode,
    now: NaiveDateTime,
) -> anyhow::Result<Step> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Step::Nothing);
    }

    let tokens = shlex::split(trimmed).ok_or_else(|| anyhow!("invalid quoting: {trimmed}"))?;
    match tokens.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] => return Ok(Step::Nothing),
        ["quit" | "exit"] => return Ok(Step::Quit),
        ["help"] => return Ok(Step::Print(help(None))),
        ["help", command] => return Ok(Step::Print(help(Some(*command)))),
        _ => {}
    }

    let parsed = match ShellLine::try_parse_from(&tokens) {
        Ok(parsed) => parsed,
        Err(e) if !e.use_stderr() => return Ok(Step::Print(e.to_string().trim_end().to_string())),
        Err(e) => bail!("{}", e.to_string().trim_end()),
    };

    let output = execute(tracker, &parsed.command, now)?;
    Ok(Step::Print(format_output(&output, mode)?))
}

fn help(command: Option<&str>) -> String {
    let text = match command {
        Some(name) => match ShellLine::try_parse_from([name, "--help"]) {
            Ok(_) => String::new(),
            Err(e) => e.to_string(),
        },
        None => {
            let mut usage = ShellLine::command().render_help().to_string();
            usage.push_str("\nShell commands: help [COMMAND], quit, exit\n");
            usage
        }
    };
    text.trim_end().to_string()
}

/// Pipe mode: run every line of `input`, printing results to `out` and
/// errors to `err`. Returns the number of failed lines.
pub fn run_pipe<S, R, W, E>(
    tracker: &mut Tracker<S>,
    input: R,
    out: &mut W,
    err: &mut E,
    mode: OutputMode,
    clock: impl Fn() -> NaiveDateTime,
) -> io::Result<usize>
where
    S: TableStore,
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut failures = 0;
    for line in input.lines() {
        let line = line?;
        match run_line(tracker, &line, mode, clock()) {
            Ok(Step::Nothing) => {}
            Ok(Step::Print(text)) => writeln!(out, "{text}")?,
            Ok(Step::Quit) => break,
            Err(e) => {
                failures += 1;
                writeln!(err, "{}", format_error(&e, mode))?;
            }
        }
    }
    out.flush()?;
    Ok(failures)
}

/// Interactive mode with line editing and history.
pub fn run_interactive<S: TableStore>(
    tracker: &mut Tracker<S>,
    mode: OutputMode,
    history: Option<&Path>,
    clock: impl Fn() -> NaiveDateTime,
) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new()?;
    if let Some(path) = history {
        let _ = rl.load_history(path);
    }

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.trim());
                }
                match run_line(tracker, &line, mode, clock()) {
                    Ok(Step::Nothing) => {}
                    Ok(Step::Print(text)) => println!("{text}"),
                    Ok(Step::Quit) => break,
                    Err(e) => eprintln!("{}", format_error(&e, mode)),
                }
            }
            // Ctrl-C: fresh prompt
            Err(ReadlineError::Interrupted) => continue,
            // Ctrl-D
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(path) = history {
        if let Err(e) = rl.save_history(path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to save shell history");
        }
    }
    Ok(())
}
