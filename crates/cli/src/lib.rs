//! Command-line front end: one-shot commands and an interactive shell over
//! the tracker.

pub mod commands;
pub mod execute;
pub mod format;
pub mod shell;

pub use commands::{Cli, Command, ReportArgs, ShellLine};
pub use execute::{Output, execute};
pub use format::{OutputMode, format_error, format_output};
pub use shell::{Step, run_interactive, run_line, run_pipe};
