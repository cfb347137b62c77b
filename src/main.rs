use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use split_ledger::application::expenses::{ExpenseService, Summary};
use split_ledger::application::import::{ExpenseImporter, ImportReport};
use split_ledger::domain::expense::{Expense, ExpenseId, ExpensePatch, ExpenseQuery, NewExpense};
use split_ledger::domain::member::Member;
use split_ledger::domain::ports::ExpenseStoreBox;
use split_ledger::domain::settlement::{Rounding, SettlementPolicy};
use split_ledger::infrastructure::in_memory::InMemoryExpenseStore;
use split_ledger::interfaces::csv::expense_reader::ExpenseReader;
use split_ledger::interfaces::csv::report_writer::ReportWriter;
use split_ledger::interfaces::view::{
    ExpenseView, ImportSummaryView, ImportView, SummaryView, expense_views,
};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "SPLIT_LEDGER_DB", global = true)]
    db_path: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Csv, global = true)]
    format: Format,

    /// Decimal places for suggested transfers, or "exact"
    #[arg(long, default_value = "0", value_parser = parse_rounding, global = true)]
    precision: Rounding,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Import expenses from a CSV export of the expense sheet, then print the summary
    Import {
        /// Input expenses CSV file
        input: PathBuf,
    },
    /// Print balances and suggested transfers for all active expenses
    Summary,
    /// List expenses, newest first
    List {
        /// Include removed expenses
        #[arg(long)]
        all: bool,
        #[arg(long)]
        paid_by: Option<Member>,
        /// Case-insensitive text to look for in descriptions
        #[arg(long)]
        search: Option<String>,
    },
    /// Record a new expense
    Add {
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        description: String,
        #[arg(long)]
        paid_by: Member,
        /// Comma-separated members sharing the expense
        #[arg(long, value_delimiter = ',', required = true)]
        participants: Vec<Member>,
    },
    /// Change fields of an existing expense
    Update {
        id: u64,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        paid_by: Option<Member>,
        #[arg(long, value_delimiter = ',')]
        participants: Option<Vec<Member>>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Remove an expense (it is kept, but no longer counted)
    Remove { id: u64 },
}

fn parse_rounding(value: &str) -> std::result::Result<Rounding, String> {
    if value.eq_ignore_ascii_case("exact") {
        return Ok(Rounding::Exact);
    }
    value
        .parse::<u32>()
        .map(Rounding::DecimalPlaces)
        .map_err(|_| format!("expected a number of decimal places or \"exact\", got '{}'", value))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("split_ledger=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_store(db_path: Option<PathBuf>) -> Result<ExpenseStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = split_ledger::infrastructure::rocksdb::RocksDBStore::open(path)
                .into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(path) => {
            tracing::warn!(
                path = %path.display(),
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Box::new(InMemoryExpenseStore::new()))
        }
        None => Ok(Box::new(InMemoryExpenseStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let policy = SettlementPolicy {
        rounding: cli.precision,
        ..SettlementPolicy::default()
    };
    let service = ExpenseService::new(open_store(cli.db_path)?, policy);
    let format = cli.format;

    match cli.command {
        Command::Import { input } => {
            let file = File::open(input).into_diagnostic()?;
            let rows = ExpenseReader::new(file).rows();
            let report = ExpenseImporter::new(&service).import_rows(rows).await;
            print_import_diagnostics(&report);

            let summary = service.summary().await.into_diagnostic()?;
            match format {
                Format::Csv => write_report_csv(&summary)?,
                Format::Json => write_json(&ImportSummaryView {
                    import: ImportView::from(&report),
                    summary: SummaryView::from(&summary),
                })?,
            }
        }
        Command::Summary => {
            let summary = service.summary().await.into_diagnostic()?;
            match format {
                Format::Csv => write_report_csv(&summary)?,
                Format::Json => write_json(&SummaryView::from(&summary))?,
            }
        }
        Command::List {
            all,
            paid_by,
            search,
        } => {
            let query = ExpenseQuery {
                is_active: if all { None } else { Some(true) },
                paid_by,
                search,
            };
            let expenses = service.find_all(&query).await.into_diagnostic()?;
            write_expenses(format, &expenses)?;
        }
        Command::Add {
            amount,
            description,
            paid_by,
            participants,
        } => {
            let expense = service
                .create(NewExpense {
                    amount,
                    description,
                    paid_by,
                    participants,
                })
                .await
                .into_diagnostic()?;
            write_expense(format, &expense)?;
        }
        Command::Update {
            id,
            amount,
            description,
            paid_by,
            participants,
            active,
        } => {
            let patch = ExpensePatch {
                amount,
                description,
                paid_by,
                participants,
                is_active: active,
            };
            let expense = service
                .update(ExpenseId(id), patch)
                .await
                .into_diagnostic()?;
            write_expense(format, &expense)?;
        }
        Command::Remove { id } => {
            let expense = service.remove(ExpenseId(id)).await.into_diagnostic()?;
            write_expense(format, &expense)?;
        }
    }

    Ok(())
}

fn print_import_diagnostics(report: &ImportReport) {
    for unmapped in &report.unmapped {
        eprintln!(
            "Warning: row {}: '{}' in {} is not a known member, counted as {}",
            unmapped.row, unmapped.original, unmapped.field, unmapped.member
        );
    }
    for error in &report.errors {
        eprintln!("Error importing row {}: {}", error.row, error.error);
    }
}

fn write_report_csv(summary: &Summary) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer.write_report(&summary.report).into_diagnostic()
}

fn write_expenses(format: Format, expenses: &[Expense]) -> Result<()> {
    match format {
        Format::Csv => {
            let stdout = io::stdout();
            let mut writer = ReportWriter::new(stdout.lock());
            writer.write_expenses(expenses).into_diagnostic()
        }
        Format::Json => write_json(&expense_views(expenses)),
    }
}

fn write_expense(format: Format, expense: &Expense) -> Result<()> {
    match format {
        Format::Csv => write_expenses(format, std::slice::from_ref(expense)),
        Format::Json => write_json(&ExpenseView::from(expense)),
    }
}

fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value).into_diagnostic()?;
    writeln!(out).into_diagnostic()?;
    Ok(())
}
