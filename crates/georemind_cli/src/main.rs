//! Developer CLI over the reminder core.
//!
//! # Responsibility
//! - Drive save/list/get/clear against a local reminder database.
//! - Simulate geofence arrivals and print the notifications they produce.
//!
//! Configuration comes from `GEOREMIND_*` environment variables, with
//! `--db` taking precedence over `GEOREMIND_DB_PATH`.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use georemind_core::{
    init_from_config, ArrivalOutcome, CollectingDispatcher, CoreConfig, GeofenceEvent,
    LogDispatcher, NotificationDispatcher, ReminderCore, ReminderDraft, ReminderRecord, RepoError,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "georemind", version, about = "Location reminder core CLI")]
struct Cli {
    /// Reminder database file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate and save a reminder.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        location: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Reuse an existing id instead of generating one.
        #[arg(long)]
        id: Option<String>,
    },
    /// List every stored reminder.
    List,
    /// Show one reminder.
    Get { id: String },
    /// Delete every reminder.
    Clear,
    /// Simulate entering the regions of the given reminder ids.
    Arrive {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Replay a geofence event JSON document (`-` reads stdin).
    Event { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CoreConfig::from_env().context("invalid environment configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    init_from_config(&config)
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;

    let core = ReminderCore::open(&config)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;

    match cli.command {
        Command::Add {
            title,
            description,
            location,
            lat,
            lon,
            id,
        } => {
            let draft = ReminderDraft {
                id,
                title: Some(title),
                description: Some(description),
                location_label: Some(location),
                latitude: lat,
                longitude: lon,
            };
            let saved = core.service().validate_and_save(draft).await?;
            println!("saved {}", saved.record.id);
            if let Some(geofence) = saved.geofence {
                println!("geofence {}", serde_json::to_string(&geofence)?);
            }
        }
        Command::List => {
            let list = core.service().list_reminders().await?;
            if list.no_data {
                println!("no reminders");
            }
            for record in &list.items {
                print_record(record);
            }
        }
        Command::Get { id } => match core.service().get_reminder(&id).await {
            Ok(record) => print_record(&record),
            Err(RepoError::NotFound) => bail!("{}: {id}", RepoError::NotFound),
            Err(err) => return Err(err.into()),
        },
        Command::Clear => {
            core.service().clear_reminders().await?;
            println!("cleared");
        }
        Command::Arrive { ids } => deliver(&core, GeofenceEvent::entered(ids)).await?,
        Command::Event { path } => {
            let raw = read_input(&path)?;
            let event: GeofenceEvent =
                serde_json::from_str(&raw).context("malformed geofence event")?;
            deliver(&core, event).await?;
        }
    }

    Ok(())
}

async fn deliver(core: &ReminderCore, event: GeofenceEvent) -> Result<()> {
    let dispatcher = Arc::new(CollectingDispatcher::new());
    let outcome = core
        .resolver(Arc::clone(&dispatcher))
        .handle_event(&event)
        .await;

    // Printed for the operator and mirrored into the rotating log.
    for payload in dispatcher.drain() {
        println!("notify {}", serde_json::to_string(&payload)?);
        LogDispatcher.notify(payload);
    }
    match outcome {
        ArrivalOutcome::Resolved(summary) => println!(
            "resolved dispatched={} missing={} failed={}",
            summary.dispatched, summary.missing, summary.failed
        ),
        other => println!("dropped {other:?}"),
    }
    Ok(())
}

fn print_record(record: &ReminderRecord) {
    let coordinates = record
        .coordinates()
        .map_or_else(|| "-".to_string(), |(lat, lon)| format!("{lat},{lon}"));
    println!(
        "{}\t{}\t{}\t{}\t{}",
        record.id, record.title, record.description, record.location_label, coordinates
    );
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_add_with_negative_longitude() {
        let cli = Cli::try_parse_from([
            "georemind",
            "add",
            "--title",
            "Buy milk",
            "--description",
            "2% milk",
            "--location",
            "Corner Store",
            "--lat",
            "40.0",
            "--lon",
            "-73.0",
        ])
        .unwrap();

        match cli.command {
            Command::Add { lat, lon, id, .. } => {
                assert_eq!(lat, Some(40.0));
                assert_eq!(lon, Some(-73.0));
                assert!(id.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn arrive_requires_at_least_one_id() {
        assert!(Cli::try_parse_from(["georemind", "arrive"]).is_err());
    }
}
