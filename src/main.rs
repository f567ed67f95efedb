use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use idb_manager::config::{self, IdbConfig};
use idb_manager::idb::{IdbManager, IdbSelector};
use idb_manager::logging;

#[derive(Parser)]
#[command(name = "idb-manager")]
#[command(version, about = "Manage versioned instrument databases (IDB)")]
struct Cli {
    /// Catalog root (overrides the config file)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Config file (defaults to <data dir>/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List complete installed versions
    List,
    /// Check whether a version is installed and complete
    Has { version: String },
    /// Print the version valid at a time, or the latest installed one
    Find {
        /// UTC timestamp in RFC 3339 form, e.g. 2020-06-06T00:00:00Z
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Download a version from the remote repository
    Download {
        version: String,
        /// Replace an existing local copy
        #[arg(long)]
        force: bool,
    },
    /// Open an IDB and print what it contains
    Info {
        #[arg(conflicts_with = "at")]
        version: Option<String>,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        /// Download the version first if it is not installed
        #[arg(long)]
        fetch: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init_logging(&config::log_path(), cli.log_json)
        .context("failed to initialize logging")?;

    let config_path = cli.config.unwrap_or_else(config::config_path);
    let mut config = IdbConfig::load(&config_path)?;
    if let Some(root) = cli.root {
        config.data_root = Some(root);
    }

    let mut manager = IdbManager::from_config(&config)?;

    match cli.command {
        Command::List => {
            for version in manager.list_versions() {
                println!("{}", version);
            }
        }
        Command::Has { version } => {
            println!("{}", manager.has_version(&version));
        }
        Command::Find { at } => {
            println!("{}", manager.find_version(at)?);
        }
        Command::Download { version, force } => {
            let path = manager.download_version(&version, force)?;
            println!("{}", path.display());
        }
        Command::Info { version, at, fetch } => {
            let selector = match version {
                Some(version) => IdbSelector::from(version),
                None => IdbSelector::from(at),
            };

            let idb = if fetch {
                manager.get_idb_or_download(selector)?.scoped()
            } else {
                manager.get_idb_scoped(selector)?
            };

            println!("version: {}", idb.version_label());
            println!("path:    {}", idb.path().display());
            println!("tables:  {}", idb.table_names()?.join(", "));
        }
    }

    Ok(())
}
