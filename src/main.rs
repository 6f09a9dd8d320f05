//! xlsxdb command line tool.
//!
//! Reads every selected sheet of a workbook into typed datasets and inserts
//! each dataset into the table its sheet describes. Parsing is all-or-nothing:
//! no database is touched unless every sheet parses.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use xlsxdb::logging::init_logging;
use xlsxdb::{LoaderBuilder, SheetSelector, XlsxToDbError};

#[derive(Parser)]
#[command(name = "xlsxdb")]
#[command(about = "Load self-describing Excel sheets into relational databases")]
#[command(version)]
#[command(long_about = "
xlsxdb - load typed rows from Excel workbooks into relational databases

Each sheet describes its own target:
- Column B, rows 1-7: driver, user, password, host, port, database, table
- From row 9, columns A-B: column name and type label (ends at a blank name)
- Row 1 from column C: data header; rows below it hold the data

SUPPORTED DRIVERS:
- PostgreSQL
- MySQL
- SQLite (the database field is the file path)

EXAMPLES:
  xlsxdb --file import.xlsx
  xlsxdb --file import.xlsx --sheet orders --sheet customers
  xlsxdb --file import.xlsx --dry-run
")]
struct Cli {
    /// Workbook to load
    #[arg(short, long, env = "XLSXDB_FILE", help = "Path to the .xlsx workbook")]
    file: PathBuf,

    /// Sheets to load (defaults to all sheets in file order)
    #[arg(long = "sheet", help = "Sheet name to load; repeat for several sheets")]
    sheets: Vec<String>,

    /// Parse only
    #[arg(long, help = "Parse the workbook and print the datasets as JSON without inserting")]
    dry_run: bool,

    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), XlsxToDbError> {
    let selector = if cli.sheets.is_empty() {
        SheetSelector::All
    } else {
        SheetSelector::Names(cli.sheets)
    };

    let loader = LoaderBuilder::new().with_sheet_selector(selector).build()?;
    let datasets = loader.load_path(&cli.file)?;

    if cli.dry_run {
        let json = serde_json::to_string_pretty(&datasets).map_err(std::io::Error::from)?;
        println!("{}", json);
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let total = datasets.len();
        for (index, dataset) in datasets.into_iter().enumerate() {
            let sheet = dataset.sheet().to_string();
            let inserted = dataset.insert().await?;
            info!(sheet = %sheet, inserted, "dataset {}/{} done", index + 1, total);
        }
        Ok::<(), XlsxToDbError>(())
    })
}
