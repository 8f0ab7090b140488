//! docsql CLI
//!
//! Runs SQL-dialect statements against a document store kept in a JSON
//! snapshot file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use docsql_cli::{load_store, parse_args, save_store, ExecOutput, QueryOutput};
use docsql_core::transport::DEFAULT_PAGE_SIZE;
use docsql_core::{PreconditionPolicy, Session, SessionConfig};

/// SQL-dialect statements over a document store.
#[derive(Parser)]
#[command(name = "docsql")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Snapshot file holding the store content.
    #[arg(short, long, env = "DOCSQL_DATA", default_value = "docsql.json")]
    data: PathBuf,

    /// What UPDATE does on a stale concurrency token: suppress or surface.
    #[arg(short, long, env = "DOCSQL_PRECONDITION", default_value_t = PreconditionPolicy::Suppress)]
    precondition: PreconditionPolicy,

    /// Documents per query page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a collection (and its database) in the snapshot.
    CreateCollection {
        /// Database name.
        db: String,
        /// Collection name.
        coll: String,
    },

    /// Run an INSERT, UPSERT, UPDATE or DELETE.
    ///
    /// The last argument is the partition key value.
    Exec {
        /// Statement text.
        sql: String,
        /// Arguments, as JSON or plain strings.
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run a SELECT and print the rows.
    Query {
        /// Statement text.
        sql: String,
        /// Arguments, as JSON or plain strings.
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = load_store(&cli.data, cli.page_size)?;
    let session = Session::with_config(
        store,
        SessionConfig {
            precondition_policy: cli.precondition,
        },
    );

    match cli.command {
        Commands::CreateCollection { db, coll } => {
            session.transport().create_collection(&db, &coll);
            save_store(&cli.data, session.transport())?;
            info!("Collection {db}.{coll} is ready.");
        }

        Commands::Exec { sql, args } => {
            let result = session.exec(&sql, &parse_args(&args))?;
            save_store(&cli.data, session.transport())?;
            println!("{}", serde_json::to_string_pretty(&ExecOutput::from(result))?);
        }

        Commands::Query { sql, args } => {
            let rows = session.query(&sql, &parse_args(&args))?;
            println!("{}", serde_json::to_string_pretty(&QueryOutput::from(rows))?);
        }
    }

    Ok(())
}
