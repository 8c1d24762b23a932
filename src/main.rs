use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use txstore::application::service::TransactionService;
use txstore::infrastructure::{StoreConfig, open_store};
use txstore::interfaces::csv::transaction_reader::TransactionReader;
use txstore::interfaces::csv::transaction_writer::TransactionWriter;
use txstore::logging::{LogFormat, init_logging};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input transactions CSV file
    input: PathBuf,

    /// Path to a persistent RocksDB directory (optional).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// SQLite database URL, e.g. sqlite://txns.db (optional).
    #[arg(long, conflicts_with = "db_path")]
    database_url: Option<String>,

    /// Only print transactions of these orders. Repeatable.
    #[arg(long = "order-id")]
    order_ids: Vec<String>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging("warn", cli.log_format);

    let config = StoreConfig::from_options(cli.db_path, cli.database_url);
    let service = TransactionService::new(open_store(&config).await.into_diagnostic()?);

    // Import transactions
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = TransactionReader::new(file);
    let mut batch = Vec::new();
    for tx_result in reader.transactions() {
        match tx_result {
            Ok(tx) => batch.push(tx),
            Err(e) => {
                eprintln!("Error reading transaction: {}", e);
            }
        }
    }
    service.record_all(batch).await.into_diagnostic()?;

    // Query what the store now holds
    let store = service.store();
    let transactions = if cli.order_ids.is_empty() {
        store.find_all().await
    } else {
        store.find_all_by_order_ids(&cli.order_ids).await
    }
    .into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = TransactionWriter::new(stdout.lock());
    writer.write_transactions(&transactions).into_diagnostic()?;

    Ok(())
}
