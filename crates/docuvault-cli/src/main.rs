//! Command-line front end over the docuvault manager façade.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docuvault::core::config::DmsConfig;
use docuvault::core::manager::DocumentManager;
use docuvault::plugins::registry::WorkerRegistry;
use docuvault::storage::LocalStorage;
use docuvault::types::TagAction;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "docuvault",
    version,
    about = "Store, retrieve and tag documents through rule-matched plugin pipelines"
)]
struct Cli {
    /// Configuration file with document type rules and plugin bindings.
    #[arg(long, global = true, default_value = "dms.toml")]
    config: PathBuf,

    /// Override the storage root from the configuration.
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store a file as a new revision of a document code.
    Store {
        code: String,
        file: PathBuf,
        /// Tags to attach after storing; repeatable.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Retrieve a revision (latest when --revision is omitted).
    Retrieve {
        code: String,
        #[arg(long)]
        revision: Option<u32>,
        /// Write the payload here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete one revision, or the whole document when --revision is omitted.
    Delete {
        code: String,
        #[arg(long)]
        revision: Option<u32>,
    },
    /// Print the document's metadata record as JSON.
    Info { code: String },
    /// Print the number of stored revisions.
    Revisions { code: String },
    /// Add or remove tags on an existing document.
    Tag {
        code: String,
        #[arg(long = "add")]
        add: Vec<String>,
        #[arg(long = "remove")]
        remove: Vec<String>,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("docuvault={level},docuvault_cli={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_manager(cli: &Cli) -> Result<DocumentManager> {
    let config = DmsConfig::from_toml_file(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    let registry = WorkerRegistry::with_builtin_workers().context("registering built-in plugins")?;
    let root = cli.storage.clone().unwrap_or_else(|| config.storage_root.clone());
    tracing::debug!(config = %cli.config.display(), storage = %root.display(), "configuration loaded");
    let backend = Arc::new(LocalStorage::new(root));
    DocumentManager::from_config(&config, &registry, backend).context("building document manager")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let manager = build_manager(&cli)?;

    match &cli.command {
        Command::Store { code, file, tags } => {
            let content =
                std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
            let actions: Vec<TagAction> = tags.iter().cloned().map(TagAction::Add).collect();
            let document = manager.handle_store(code, content, &actions).await?;
            println!(
                "stored {} revision {} ({})",
                document.code,
                document.revision.unwrap_or(0),
                document.mimetype.as_deref().unwrap_or("unknown type"),
            );
        }
        Command::Retrieve {
            code,
            revision,
            output,
        } => {
            let document = manager.handle_retrieve(code, *revision).await?;
            let content = document.content.unwrap_or_default();
            match output {
                Some(path) => {
                    std::fs::write(path, &content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    eprintln!(
                        "retrieved {} revision {} -> {}",
                        code,
                        document.revision.unwrap_or(0),
                        path.display()
                    );
                }
                None => std::io::stdout().write_all(&content)?,
            }
        }
        Command::Delete { code, revision } => {
            manager.handle_delete(code, *revision).await?;
            match revision {
                Some(rev) => println!("deleted {code} revision {rev}"),
                None => println!("deleted {code}"),
            }
        }
        Command::Info { code } => {
            let record = manager.document_info(code).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Revisions { code } => {
            let count = manager.revision_count(code).await?;
            println!("{count}");
        }
        Command::Tag { code, add, remove } => {
            let mut tags = manager.document_info(code).await?.tags;
            for tag in add {
                tags = manager.add_tag(code, tag).await?;
            }
            for tag in remove {
                tags = manager.remove_tag(code, tag).await?;
            }
            for tag in &tags {
                println!("{tag}");
            }
        }
    }

    Ok(())
}
