//! Command-line grammar, shared by one-shot invocations and the shell.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use workwear_issuance::{IssuanceFilter, WorkerFilter};

#[derive(Debug, Parser)]
#[command(name = "workwear", version, about = "Workwear stock and issuance tracker")]
pub struct Cli {
    /// Directory holding the CSV tables (default: $WORKWEAR_DATA_DIR or ".")
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Flag stock below this quantity (default: $WORKWEAR_LOW_STOCK_THRESHOLD or 5)
    #[arg(long, global = true)]
    pub low_stock: Option<u32>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Without a command, start the interactive shell
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// One line typed at the shell prompt.
#[derive(Debug, Parser)]
#[command(name = "workwear", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Add pieces of a type and size to stock
    AddStock {
        garment_type: String,
        size: String,
        quantity: u32,
    },
    /// Issue pieces from stock to a worker
    Issue {
        worker: String,
        garment_type: String,
        size: String,
        quantity: u32,
    },
    /// Make a garment type selectable before it is stocked
    RegisterType { name: String },
    /// Make a worker selectable before anything is issued to them
    RegisterWorker { name: String },
    /// List known garment types
    Types,
    /// List sizes in stock for a type
    Sizes { garment_type: String },
    /// List known workers
    Workers {
        /// List the report selector instead: "(all)" then every worker in the log
        #[arg(long)]
        report: bool,
    },
    /// Show current stock, flagging low quantities
    Stock {
        /// Write the listing to a CSV file instead of printing it
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Show issuance entries, newest first
    Log(ReportArgs),
    /// Show total pieces issued per worker
    Summary(ReportArgs),
    /// Show pieces issued per worker and type
    Pivot(ReportArgs),
    /// Start the interactive shell
    Shell,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct ReportArgs {
    /// Only this worker ("(all)" for everyone)
    #[arg(long)]
    pub worker: Option<String>,

    /// First day to include, YYYY-MM-DD (default: oldest entry)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to include, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Write the report to a CSV file instead of printing it
    #[arg(long)]
    pub export: Option<PathBuf>,
}

impl ReportArgs {
    pub fn filter(&self) -> IssuanceFilter {
        IssuanceFilter {
            worker: WorkerFilter::parse(self.worker.as_deref()),
            from: self.from,
            to: self.to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
        ShellLine::command().debug_assert();
    }

    #[test]
    fn parses_issue_with_global_flags() {
        let cli = Cli::try_parse_from([
            "workwear", "--data-dir", "/tmp/ww", "issue", "Anna", "Jacket", "M", "3", "--json",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/ww")));
        assert!(cli.json);
        assert_eq!(
            cli.command,
            Some(Command::Issue {
                worker: "Anna".to_string(),
                garment_type: "Jacket".to_string(),
                size: "M".to_string(),
                quantity: 3,
            })
        );
    }

    #[test]
    fn no_command_means_shell() {
        let cli = Cli::try_parse_from(["workwear"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn report_args_build_filters() {
        let line = ShellLine::try_parse_from(["log", "--worker", "(all)", "--from", "2024-03-01"]).unwrap();
        let Command::Log(args) = line.command else {
            panic!("expected log");
        };
        let filter = args.filter();
        assert_eq!(filter.worker, WorkerFilter::All);
        assert_eq!(filter.from, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(filter.to, None);
    }

    #[test]
    fn bad_date_is_a_parse_error() {
        assert!(ShellLine::try_parse_from(["summary", "--to", "March"]).is_err());
        assert!(ShellLine::try_parse_from(["add-stock", "Jacket", "M", "-2"]).is_err());
    }
}
