use clap::{Parser, ValueEnum};
use marketledger::application::marketplace::Marketplace;
use marketledger::domain::ports::MarketStoreHandle;
use marketledger::infrastructure::in_memory::InMemoryStore;
use marketledger::interfaces::csv::command_reader::CommandReader;
use marketledger::interfaces::csv::report_writer::ReportWriter;
use marketledger::interfaces::handler::CommandHandler;
use marketledger::telemetry;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Report {
    /// One row per user with the final balance.
    Users,
    /// One row per item with its final status.
    Items,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "MARKET_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Which report to print to stdout once all commands are applied.
    #[arg(long, value_enum, default_value_t = Report::Users)]
    report: Report,
}

fn open_store(db_path: Option<PathBuf>) -> Result<MarketStoreHandle> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            use marketledger::infrastructure::rocksdb::RocksDBStore;
            info!(path = %path.display(), "using persistent storage");
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(path) => {
            warn!(
                path = %path.display(),
                "persistent storage requested via --db-path, but the storage-rocksdb feature is not enabled; falling back to in-memory storage"
            );
            Ok(Arc::new(InMemoryStore::new()))
        }
        None => Ok(Arc::new(InMemoryStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    let market = Arc::new(Marketplace::new(open_store(cli.db_path)?));
    let handler = CommandHandler::new(Arc::clone(&market));

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    let (mut applied, mut rejected) = (0usize, 0usize);
    for (index, cmd_result) in reader.commands().enumerate() {
        // Header is line 1.
        let line = index + 2;
        match cmd_result {
            Ok(cmd) => {
                let op = cmd.op;
                match handler.handle(cmd).await {
                    Ok(()) => applied += 1,
                    Err(e) => {
                        rejected += 1;
                        warn!(line, ?op, status = e.status_code(), error = %e, "command rejected");
                    }
                }
            }
            Err(e) => {
                rejected += 1;
                warn!(line, error = %e, "error reading command");
            }
        }
    }
    info!(applied, rejected, "all commands processed");

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    match cli.report {
        Report::Users => writer
            .write_users(&market.users().await.into_diagnostic()?)
            .into_diagnostic()?,
        Report::Items => {
            let (items, categories) =
                tokio::try_join!(market.items(), market.categories()).into_diagnostic()?;
            writer.write_items(&items, &categories).into_diagnostic()?
        }
    }

    Ok(())
}
