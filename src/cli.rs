use std::path::{Path, PathBuf};

mod list;
mod request;
mod soldier;
mod status;
mod terminal;

use anyhow::Context;
use basevisit::{Config, FileStore, Store};
use clap::ArgAction;
use request::RequestCommand;
use soldier::SoldierCommand;
use status::Status;
use terminal::Colorize;
use tracing::instrument;

/// Name of the configuration file in the data directory.
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the data directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(&self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show soldier and request counts (default)
    Status(Status),

    /// Initialize a new data directory
    Init,

    /// Add, list and inspect soldiers
    #[command(subcommand)]
    Soldier(SoldierCommand),

    /// Create, list and review base-visit requests
    #[command(subcommand)]
    Request(RequestCommand),
}

impl Command {
    fn run(self, root: &Path) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root)?,
            Self::Init => Init::run(root)?,
            Self::Soldier(command) => command.run(root)?,
            Self::Request(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument]
    fn run(root: &Path) -> anyhow::Result<()> {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            anyhow::bail!(
                "Data directory already initialized (found existing {})",
                config_path.display()
            );
        }

        std::fs::create_dir_all(root)
            .with_context(|| format!("Failed to create {}", root.display()))?;

        Config::default()
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create {CONFIG_FILE}: {e}"))?;

        // opening the store writes the default soldiers
        let store = open_store(root)?;

        println!(
            "{}",
            format!("Initialized data directory in {}", root.display()).success()
        );
        println!("  Created: {CONFIG_FILE}");
        println!(
            "  Seeded {} soldiers into {}",
            store.soldiers().len(),
            store
                .blob()
                .path_for(basevisit::storage::SOLDIERS_KEY)
                .display()
        );
        println!();
        println!("Next steps:");
        println!("  visit soldier add --full-name \"...\" --personal-number ... --id-number ...");
        println!("  visit request new single-day --soldier <ID> --arrival 2026-01-01");

        Ok(())
    }
}

/// Opens the record store kept in `root`.
fn open_store(root: &Path) -> anyhow::Result<Store<FileStore>> {
    Store::open(FileStore::new(root.to_path_buf()))
        .with_context(|| format!("Failed to open data directory {}", root.display()))
}

fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}
