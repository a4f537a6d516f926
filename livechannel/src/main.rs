//! livechannel: channel store maintenance tool.
//!
//! Reconciles channel lists exported by TV input sources into the SQLite
//! channel store and inspects the stored rows.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info, warn};

use livechannel::config::{ConfigFile, DEFAULT_LOG_DIR, DEFAULT_RETENTION_DAYS};
use livechannel::database::{Database, LogoSlot};
use livechannel::inputs::InputRegistry;
use livechannel::logging;
use livechannel::logo_fetcher::LogoFetcher;
use livechannel::reconcile::StalePolicy;
use livechannel::sync::ChannelSync;
use livechannel::types::{Channel, NaturalKey};
use livechannel::DatabaseHandle;

/// livechannel - TV input channel store tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to ./livechannel.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database file path
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Days to keep rotated log files
    #[arg(long)]
    log_retention_days: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile an input's channels with a JSON channel list
    Sync {
        /// Input source id
        #[arg(short, long)]
        input: String,
        /// JSON file holding an array of channels
        #[arg(short, long)]
        file: PathBuf,
        /// Delete stored channels missing from the list
        #[arg(long)]
        delete_stale: bool,
        /// Do not fetch channel logos
        #[arg(long)]
        no_logos: bool,
    },
    /// List stored channels
    List {
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Show one channel by row id
    Show {
        #[arg(long)]
        id: i64,
    },
    /// Find a channel by natural key
    Find {
        #[arg(short, long)]
        input: String,
        #[arg(long)]
        sid: i32,
        #[arg(long)]
        tsid: i32,
        #[arg(long)]
        onid: i32,
    },
    /// Delete channels by row id
    Delete {
        #[arg(long, required = true, num_args = 1..)]
        id: Vec<i64>,
    },
    /// Delete every channel of an input
    DeleteAll {
        #[arg(short, long)]
        input: String,
    },
    /// List configured input sources
    Inputs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let file_config = match ConfigFile::locate(args.config.as_deref()) {
        Some(path) => match ConfigFile::load(&path) {
            Ok(c) => {
                eprintln!("Loaded config from: {}", path.display());
                c
            }
            Err(e) => {
                eprintln!("Failed to load config file: {}", e);
                return Err(e.into());
            }
        },
        None => ConfigFile::default(),
    };

    // Command line takes precedence over the config file
    let log_dir = args.log_dir.clone().unwrap_or_else(|| {
        PathBuf::from(file_config.logging.log_dir.as_deref().unwrap_or(DEFAULT_LOG_DIR))
    });
    let log_retention_days = args
        .log_retention_days
        .or(file_config.logging.retention_days)
        .unwrap_or(DEFAULT_RETENTION_DAYS);
    let _log_guard = logging::init_logging(
        &log_dir,
        log_retention_days,
        args.verbose,
        file_config.logging.level.as_deref(),
    )?;

    let db_path = args
        .database
        .clone()
        .unwrap_or_else(|| file_config.database_path());
    info!("Opening database: {:?}", db_path);
    let db = match Database::open(&db_path) {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };
    let db: DatabaseHandle = Arc::new(tokio::sync::Mutex::new(db));

    let registry = InputRegistry::new(file_config.input_snapshot()?);

    match args.command {
        Command::Sync {
            input,
            file,
            delete_stale,
            no_logos,
        } => {
            if !registry.snapshot().contains(&input) {
                warn!("Input {} is not listed in the configuration", input);
            }
            let desired = read_channel_file(&file)?;

            let mut options = file_config.reconcile_options();
            if delete_stale {
                options = options.with_stale(StalePolicy::Delete);
            }
            let mut sync = ChannelSync::new(db.clone(), options);
            if !no_logos {
                sync = sync.with_logo_fetcher(LogoFetcher::new(db.clone(), file_config.logo_config()));
            }

            let outcome = sync.sync(&input, &desired).await?;
            let report = &outcome.report;
            info!(
                "Sync of {}: {} inserted, {} updated, {} deleted, {} failed",
                input, report.inserted, report.updated, report.deleted, report.failed
            );

            let (logos_stored, logos_failed) = match outcome.logos {
                Some(handle) => {
                    let logos = handle.join().await?;
                    for failure in &logos.failed {
                        warn!("Logo {} from {} failed: {}", failure.slot, failure.source, failure.error);
                    }
                    (logos.stored.len(), logos.failed.len())
                }
                None => (0, 0),
            };

            if args.json {
                let value = serde_json::json!({
                    "input": input,
                    "inserted": report.inserted,
                    "updated": report.updated,
                    "deleted": report.deleted,
                    "failed": report.failed,
                    "duplicates": report.duplicates.iter().map(NaturalKey::to_string).collect::<Vec<_>>(),
                    "unmatched": report.unmatched,
                    "written": report.written,
                    "logos_stored": logos_stored,
                    "logos_failed": logos_failed,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!(
                    "{}: {} inserted, {} updated, {} deleted, {} failed, {} duplicates, {} unmatched",
                    input,
                    report.inserted,
                    report.updated,
                    report.deleted,
                    report.failed,
                    report.duplicates.len(),
                    report.unmatched.len()
                );
                if logos_stored + logos_failed > 0 {
                    println!("logos: {} stored, {} failed", logos_stored, logos_failed);
                }
            }
        }
        Command::List { input } => {
            let db = db.lock().await;
            let channels = match &input {
                Some(input) => db.get_channels_by_input(input)?,
                None => db.get_channels()?,
            };
            print_channels(&channels, args.json)?;
        }
        Command::Show { id } => {
            let db = db.lock().await;
            let channel = db.require_channel(id)?;
            let logo = db.get_logo_record(LogoSlot::for_channel(id))?;
            if args.json {
                let value = serde_json::json!({
                    "channel": channel,
                    "logo_bytes": logo.as_ref().map(|l| l.size),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", channel);
                match logo {
                    Some(logo) => println!(
                        "logo: {} bytes from {}",
                        logo.size,
                        logo.source_uri.as_deref().unwrap_or("-")
                    ),
                    None => println!("logo: none"),
                }
            }
        }
        Command::Find {
            input,
            sid,
            tsid,
            onid,
        } => {
            let key = NaturalKey::new(sid, tsid, onid);
            let channel = find_channel(&*db.lock().await, &input, &key)?;
            print_channels(std::slice::from_ref(&channel), args.json)?;
        }
        Command::Delete { id } => {
            let deleted = db.lock().await.delete_channels(&id)?;
            info!("Deleted {} of {} channels", deleted, id.len());
            println!("deleted {}", deleted);
        }
        Command::DeleteAll { input } => {
            let deleted = db.lock().await.delete_all_channels(&input)?;
            info!("Deleted {} channels of input {}", deleted, input);
            println!("deleted {}", deleted);
        }
        Command::Inputs => {
            let snapshot = registry.snapshot();
            if args.json {
                let inputs: Vec<_> = snapshot.iter().collect();
                println!("{}", serde_json::to_string_pretty(&inputs)?);
            } else {
                let db = db.lock().await;
                for source in snapshot.iter() {
                    println!(
                        "{:<48} {:<20} {:?} channels={}{}",
                        source.id,
                        source.label,
                        source.state,
                        db.count_channels(&source.id)?,
                        if source.has_setup() { " (setup)" } else { "" }
                    );
                }
            }
        }
    }

    Ok(())
}

/// Look up a channel by natural key. A missing channel is an error so that
/// `main` returns normally and the log writer is flushed.
fn find_channel(
    db: &Database,
    input: &str,
    key: &NaturalKey,
) -> Result<Channel, Box<dyn std::error::Error>> {
    db.get_channel_by_key(input, key)?
        .ok_or_else(|| format!("No channel {} for input {}", key, input).into())
}

fn read_channel_file(path: &Path) -> Result<Vec<Channel>, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let channels: Vec<Channel> = serde_json::from_str(&contents)
        .map_err(|e| format!("Invalid channel list {}: {}", path.display(), e))?;
    Ok(channels)
}

fn print_channels(channels: &[Channel], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(channels)?);
        return Ok(());
    }

    println!(
        "{:>6} {:>6} {:>6} {:>6} {:<8} {:<32} INPUT",
        "ID", "SID", "TSID", "ONID", "NUMBER", "NAME"
    );
    for ch in channels {
        println!(
            "{:>6} {:>6} {:>6} {:>6} {:<8} {:<32} {}",
            ch.id.map(|id| id.to_string()).unwrap_or_default(),
            ch.service_id,
            ch.transport_stream_id,
            ch.original_network_id,
            ch.display_number.as_deref().unwrap_or("-"),
            ch.display_name.as_deref().unwrap_or("-"),
            ch.input_id.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
