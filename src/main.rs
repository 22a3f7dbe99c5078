use std::{
    error::Error,
    fs::File,
    path::{Path, PathBuf},
};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use recycling_machine::{machine, CatalogEntry, Ledger};

/// Replays a recycling machine session and prints one receipt per action.
#[derive(Parser, Debug)]
#[clap(name = "rcm", version)]
struct Cli {
    /// Session file with `action,type,amount` rows.
    input: PathBuf,

    /// Machine id shown in the summary.
    #[clap(long, env = "RCM_ID", default_value = "RCM-1")]
    id: String,

    /// Machine location shown in the summary.
    #[clap(long, env = "RCM_LOCATION", default_value = "unknown")]
    location: String,

    /// Extra `type,price` rows applied over the default catalog.
    #[clap(long)]
    catalog: Option<PathBuf>,

    /// Log every accepted item.
    #[clap(short, long)]
    verbose: bool,
}

fn reader(path: &Path) -> Result<csv::Reader<File>, Box<dyn Error>> {
    let file = File::open(path)?;

    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All) // hand-written files are space padded
        .flexible(true)
        .from_reader(file))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut ledger = Ledger::new(cli.id, cli.location);

    if let Some(path) = &cli.catalog {
        for entry in reader(path)?.deserialize::<CatalogEntry>() {
            let entry = entry?;
            ledger.upsert_catalog_entry(entry.item_type(), entry.price_per_weight())?;
        }
    }

    for entry in ledger.catalog().iter() {
        debug!(item_type = entry.item_type(), price = %entry.price_per_weight(), "accepting");
    }
    info!(
        id = ledger.id(),
        location = ledger.location(),
        entries = ledger.catalog().len(),
        "machine ready"
    );

    let mut wtr = csv::WriterBuilder::new().from_writer(std::io::stdout());

    let mut rdr = reader(&cli.input)?;
    let headers = rdr.headers()?.clone();

    for record in rdr.records() {
        wtr.serialize(machine::replay(&record?, &headers, &mut ledger))?;
    }

    wtr.flush()?;

    for transaction in ledger.transactions() {
        debug!(%transaction, "in machine");
    }
    info!(summary = %ledger.summarize(), "session finished");

    Ok(())
}
