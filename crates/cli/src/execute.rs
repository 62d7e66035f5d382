//! Runs one parsed command against the tracker.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::NaiveDateTime;

use workwear_infra::table::rows;
use workwear_infra::{IssueReceipt, TableStore, Tracker};
use workwear_inventory::StockLine;
use workwear_issuance::{IssuanceEntry, IssuancePivot, WorkerTotal};
use workwear_vocabulary::VocabularyKind;

use crate::commands::{Command, ReportArgs};

/// Result of a command, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Added {
        garment_type: String,
        size: String,
        quantity: u32,
        on_hand: u32,
    },
    Issued(IssueReceipt),
    Registered {
        kind: VocabularyKind,
        name: String,
    },
    Names(Vec<String>),
    Stock(Vec<StockLine>),
    Log(Vec<IssuanceEntry>),
    Summary(Vec<WorkerTotal>),
    Pivot(IssuancePivot),
    Exported {
        path: PathBuf,
        rows: usize,
    },
}

/// Execute `command`. `now` stamps issuance entries and closes open-ended
/// report ranges.
pub fn execute<S: TableStore>(
    tracker: &mut Tracker<S>,
    command: &Command,
    now: NaiveDateTime,
) -> anyhow::Result<Output> {
    let output = match command {
        Command::AddStock {
            garment_type,
            size,
            quantity,
        } => {
            let on_hand = tracker.add_stock(garment_type, size, *quantity)?;
            Output::Added {
                garment_type: garment_type.clone(),
                size: size.clone(),
                quantity: *quantity,
                on_hand,
            }
        }
        Command::Issue {
            worker,
            garment_type,
            size,
            quantity,
        } => Output::Issued(tracker.issue(worker, garment_type, size, *quantity, now)?),
        Command::RegisterType { name } => Output::Registered {
            kind: VocabularyKind::Type,
            name: tracker.register_type(name)?.into_inner(),
        },
        Command::RegisterWorker { name } => Output::Registered {
            kind: VocabularyKind::Worker,
            name: tracker.register_worker(name)?.into_inner(),
        },
        Command::Types => Output::Names(tracker.known_types().into_iter().map(|t| t.into_inner()).collect()),
        Command::Sizes { garment_type } => Output::Names(
            tracker
                .list_sizes(garment_type)?
                .into_iter()
                .map(|s| s.into_inner())
                .collect(),
        ),
        Command::Workers { report: false } => {
            Output::Names(tracker.known_workers().into_iter().map(|w| w.into_inner()).collect())
        }
        Command::Workers { report: true } => Output::Names(tracker.report_worker_choices()),
        Command::Stock { export } => {
            let lines = tracker.stock_lines();
            match export {
                Some(path) => export_csv(path, lines.len(), |file| rows::write_stock_report(file, &lines))?,
                None => Output::Stock(lines),
            }
        }
        Command::Log(args) => {
            let entries = tracker.query(&bounded(tracker, args, now));
            match &args.export {
                Some(path) => export_csv(path, entries.len(), |file| rows::write_issuance(file, &entries))?,
                None => Output::Log(entries),
            }
        }
        Command::Summary(args) => {
            let totals = tracker.summarize(&bounded(tracker, args, now));
            match &args.export {
                Some(path) => export_csv(path, totals.len(), |file| rows::write_summary(file, &totals))?,
                None => Output::Summary(totals),
            }
        }
        Command::Pivot(args) => {
            let pivot = tracker.pivot(&bounded(tracker, args, now));
            match &args.export {
                Some(path) => export_csv(path, pivot.rows.len(), |file| rows::write_pivot(file, &pivot))?,
                None => Output::Pivot(pivot),
            }
        }
        Command::Shell => bail!("already in the shell"),
    };
    Ok(output)
}

fn bounded<S: TableStore>(
    tracker: &Tracker<S>,
    args: &ReportArgs,
    now: NaiveDateTime,
) -> workwear_issuance::IssuanceFilter {
    tracker.default_bounds(args.filter(), now.date())
}

fn export_csv<E>(path: &Path, rows: usize, write: impl FnOnce(File) -> Result<(), E>) -> anyhow::Result<Output>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    write(file).with_context(|| format!("cannot write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows, "report exported");
    Ok(Output::Exported {
        path: path.to_path_buf(),
        rows,
    })
}
