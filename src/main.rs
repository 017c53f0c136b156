//! CLI entry point for pemstore.
//!
//! Stores named PEM keys as encrypted parameters in AWS SSM Parameter
//! Store and caches fetched copies under `$HOME/.ssh/pemstore`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use pemstore::commands::{self, DeleteOutcome};
use pemstore::local::{self, CleanOutcome};
use pemstore::session;
use pemstore::store::SsmStore;
use pemstore::{Error, name};

const EXIT_ERR_KNOWN: u8 = 1;
const EXIT_ERR_UNKNOWN: u8 = 2;

#[derive(Parser)]
#[command(name = "pemstore")]
#[command(about = "Store PEM keys in AWS SSM Parameter Store", long_about = None)]
struct Cli {
    /// AWS profile to use (falls back to AWS_PROFILE)
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Prompt for an MFA token code and assume an STS session
    #[arg(long, global = true, default_value_t = false)]
    mfa: bool,

    /// Do the action forcefully; applies to store, clean and delete
    #[arg(short, long, global = true, default_value_t = false)]
    force: bool,

    /// Namespace prefix for remote parameter names
    #[arg(long, global = true, default_value = name::DEFAULT_PREFIX)]
    prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a key from the remote store into the local pemstore
    Get {
        key: String,
    },
    /// Upload a local PEM file (default: the cached copy) under a key
    Store {
        key: String,
        #[arg(value_name = "SOURCE")]
        source: Option<PathBuf>,
    },
    /// List all keys under the namespace
    List,
    /// Delete the locally cached copy of a key
    Clean {
        key: String,
    },
    /// Delete a key from the remote store
    Delete {
        key: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok(); // Load .env file

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    tracing_subscriber::registry().with(stderr_layer).init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_known() => {
            error!("{err}");
            ExitCode::from(EXIT_ERR_KNOWN)
        }
        Err(err) => {
            match std::error::Error::source(&err) {
                Some(cause) => error!(cause = %cause, "{err}"),
                None => error!("{err}"),
            }
            ExitCode::from(EXIT_ERR_UNKNOWN)
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let Cli {
        profile,
        mfa,
        force,
        prefix,
        command,
    } = cli;

    let root = local::ensure_cache_root()?;

    match command {
        Commands::Get { key } => {
            let store = connect(profile, mfa, &prefix).await?;
            let path = commands::get(&store, &root, &key).await?;
            println!("Got pem file to the local");
            println!("Key: {key}");
            println!("Stored in: {}", path.display());
        }
        Commands::Store { key, source } => {
            let store = connect(profile, mfa, &prefix).await?;
            let path = commands::store(&store, &root, &key, source, force).await?;
            println!("Stored pem into pemstore");
            println!("Key: {key}");
            println!("File: {}", path.display());
        }
        Commands::List => {
            let store = connect(profile, mfa, &prefix).await?;
            for key in commands::list(&store).await? {
                println!("{key}");
            }
        }
        Commands::Clean { key } => match commands::clean(&root, &key, force)? {
            (path, CleanOutcome::Absent) => {
                info!(path = %path.display(), "no file to clean up");
            }
            (path, CleanOutcome::WouldDelete) => {
                info!(path = %path.display(), "found specified file in pemstore");
                info!("add --force to delete");
            }
            (path, CleanOutcome::Deleted) => {
                println!("Cleaned up downloaded file: {}", path.display());
            }
        },
        Commands::Delete { key } => {
            let store = connect(profile, mfa, &prefix).await?;
            match commands::delete(&store, &key, force).await? {
                DeleteOutcome::WouldDelete => {
                    info!(key, "found specified key");
                    info!("add --force to delete");
                }
                DeleteOutcome::Deleted => {
                    println!("Deleted pem: {key}");
                }
            }
        }
    }

    Ok(())
}

/// One-shot remote store setup: resolve credentials (optionally through an
/// MFA session) and bind the SSM client to the namespace prefix.
async fn connect(profile: Option<String>, mfa: bool, prefix: &str) -> Result<SsmStore, Error> {
    let config = session::load_sdk_config(profile, mfa).await?;
    Ok(SsmStore::new(&config, prefix))
}
