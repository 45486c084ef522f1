//! feedtable: import an XML feed into a new table
//!
//! Usage:
//!   # Import into the in-process store and show the first rows
//!   feedtable products.xml --table products --preview
//!
//!   # Remote feed into PostgreSQL, positional column names
//!   feedtable https://example.com/feed.xml --backend postgres --db-name shop --positional
//!
//! Set RUST_LOG (e.g. `RUST_LOG=debug`) to change log verbosity.

use clap::{Parser, ValueEnum};
use feedtable::datatypes::column::storage_names;
use feedtable::importer::preview::default_preview_columns;
use feedtable::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// In-process store, gone when the command exits
    Memory,
    Postgres,
    Mysql,
}

#[derive(Parser, Debug)]
#[command(name = "feedtable")]
#[command(about = "Import an XML feed of repeated records into a new table", long_about = None)]
struct Args {
    /// Local path or http(s) URL of the feed
    #[arg(value_name = "LOCATION")]
    location: String,

    /// Table to create (default: table_<unix seconds>)
    #[arg(long, short = 't')]
    table: Option<String>,

    /// Name columns col_1..col_n instead of after the feed's elements
    #[arg(long)]
    positional: bool,

    /// Keep importing when a row is rejected and report it at the end
    #[arg(long)]
    skip_failed_rows: bool,

    /// Seconds to wait for a remote feed
    #[arg(long, default_value_t = 30)]
    fetch_timeout: u64,

    /// Print imported rows after the import
    #[arg(long)]
    preview: bool,

    /// Comma-separated columns to preview (default: the first three)
    #[arg(long, value_delimiter = ',', requires = "preview")]
    columns: Vec<String>,

    /// Preview every column
    #[arg(long, requires = "preview", conflicts_with = "columns")]
    all_columns: bool,

    /// Maximum rows to preview
    #[arg(long, default_value_t = 20)]
    preview_limit: usize,

    /// Characters shown per value in the preview
    #[arg(long, default_value_t = 20)]
    display_width: usize,

    #[arg(long, value_enum, default_value_t = Backend::Memory)]
    backend: Backend,

    #[arg(long)]
    db_host: Option<String>,

    #[arg(long)]
    db_port: Option<u16>,

    #[arg(long)]
    db_user: Option<String>,

    #[arg(long)]
    db_password: Option<String>,

    #[arg(long)]
    db_name: Option<String>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Import failed: {}", e.detail());
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> FeedResult<()> {
    let config = ImportConfig {
        use_original_names: !args.positional,
        failure_policy: if args.skip_failed_rows {
            FailurePolicy::SkipAndContinue
        } else {
            FailurePolicy::Abort
        },
        fetch_timeout_secs: args.fetch_timeout,
        preview_limit: args.preview_limit,
        display_width: args.display_width,
        ..ImportConfig::default()
    };

    match args.backend {
        Backend::Memory => import_with(&FeedImporter::new(MemoryStore::new(), config), &args).await,
        Backend::Postgres => {
            let defaults = PostgresConfig::default();
            let pg_config = PostgresConfig {
                host: args.db_host.clone().unwrap_or(defaults.host),
                port: args.db_port.unwrap_or(defaults.port),
                user: args.db_user.clone().unwrap_or(defaults.user),
                password: args.db_password.clone().unwrap_or(defaults.password),
                database: args.db_name.clone().unwrap_or(defaults.database),
                pool_size: defaults.pool_size,
            };
            let store = PostgresStore::connect(pg_config).await?;
            import_with(&FeedImporter::new(store, config), &args).await
        }
        Backend::Mysql => {
            let defaults = MySqlConfig::default();
            let mysql_config = MySqlConfig {
                host: args.db_host.clone().unwrap_or(defaults.host),
                port: args.db_port.unwrap_or(defaults.port),
                user: args.db_user.clone().unwrap_or(defaults.user),
                password: args.db_password.clone().unwrap_or(defaults.password),
                database: args.db_name.clone().unwrap_or(defaults.database),
            };
            let importer = FeedImporter::new(MySqlStore::connect(mysql_config).await?, config);
            let result = import_with(&importer, &args).await;
            importer.into_store().disconnect().await?;
            result
        }
    }
}

async fn import_with<S: TableStore>(importer: &FeedImporter<S>, args: &Args) -> FeedResult<()> {
    let table = args.table.clone().unwrap_or_else(default_table_name);

    let summary = importer.run(&args.location, &table).await?;

    println!("Discovered {} columns:", summary.columns.len());
    for column in &summary.columns {
        println!("  {}", column);
    }

    let report = &summary.report;
    println!(
        "Imported {} of {} records into '{}' ({} failed)",
        report.inserted,
        summary.records,
        summary.table,
        report.failed()
    );
    for failure in &report.failures {
        println!("  record {}: {}", failure.record + 1, failure.message);
    }

    if args.preview {
        let columns = if args.all_columns {
            storage_names(&summary.columns)
        } else if !args.columns.is_empty() {
            args.columns.iter().map(|c| c.trim().to_string()).collect()
        } else {
            default_preview_columns(&summary.columns)
        };

        let preview = importer.preview(&table, &columns).await?;
        println!("{}", preview.render(importer.config().display_width)?);
    }

    Ok(())
}

fn default_table_name() -> String {
    format!("table_{}", chrono::Utc::now().timestamp())
}
