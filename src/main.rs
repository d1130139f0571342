//! CLI entry point for the bag-of-words store.
//!
//! Provides commands for ingesting text from direct input, files, and URLs,
//! and for querying the closest stored document.

use bowdb::{Settings, Store, StoreError, ingest};
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;
use std::process::ExitCode;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

#[derive(Parser)]
#[command(
    name = "bowdb",
    version,
    about = "Minimal persistent bag-of-words vector store",
    styles = clap_cargo_style()
)]
struct Cli {
    /// Override the data directory from configuration
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert raw text into the store
    Insert {
        /// Text to insert
        text: String,

        /// Collection to file the document under
        #[arg(long, short)]
        collection: Option<String>,
    },

    /// Insert the contents of a UTF-8 text file
    InsertFile {
        /// Path of the file to ingest
        path: PathBuf,

        #[arg(long, short)]
        collection: Option<String>,
    },

    /// Fetch a URL and insert the response body
    InsertUrl {
        /// URL to fetch
        url: String,

        #[arg(long, short)]
        collection: Option<String>,
    },

    /// Find the stored document closest to the given text
    Closest {
        /// Query text
        text: String,
    },

    /// Show record count, vocabulary size, and data location
    Info,
}

/// Exit codes follow Unix conventions: 0 success, 1 general error,
/// 3 no result found, 5 I/O failure, 6 configuration error.
fn exit_code_for(error: &StoreError) -> u8 {
    match error {
        StoreError::Persistence { .. }
        | StoreError::SnapshotCorrupted { .. }
        | StoreError::FileRead { .. }
        | StoreError::Fetch { .. } => 5,
        StoreError::Config { .. } => 6,
        StoreError::TokenIdNotFound { .. } | StoreError::General(_) => 1,
    }
}

fn run(cli: Cli) -> Result<u8, StoreError> {
    let mut settings = Settings::load()?;
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }

    let mut store = Store::open(&settings)?;
    let collection = |explicit: Option<String>| {
        explicit.unwrap_or_else(|| settings.default_collection.clone())
    };

    match cli.command {
        Commands::Insert { text, collection: c } => {
            let id = ingest::insert_text(&mut store, &collection(c), &text)?;
            println!("{id}");
        }
        Commands::InsertFile { path, collection: c } => {
            let id = ingest::insert_file(&mut store, &collection(c), &path)?;
            println!("{id}");
        }
        Commands::InsertUrl { url, collection: c } => {
            let id = ingest::insert_url(&mut store, &collection(c), &url)?;
            println!("{id}");
        }
        Commands::Closest { text } => match ingest::find_closest(&store, &text)? {
            Some(found) => {
                println!("id:         {}", found.record_id);
                println!("collection: {}", found.collection);
                println!("score:      {}", found.score);
                println!("text:       {}", found.text);
            }
            None => {
                eprintln!("Store is empty, nothing to match against.");
                return Ok(3);
            }
        },
        Commands::Info => {
            println!("data dir:   {}", settings.data_dir.display());
            println!("records:    {}", store.len());
            println!("vocabulary: {} tokens", store.vocabulary().len());
        }
    }

    Ok(0)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error [{}]: {e}", e.status_code());
            ExitCode::from(exit_code_for(&e))
        }
    }
}
