pub mod actions;
pub mod interactive;
pub mod output;
pub mod shutdown;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use interactive::{Interactive, TICK_BUFFER};
use output::{print_readout, print_records, print_session, print_summary};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};

use crate::{
    console::Console,
    storage::{
        checkpoint::load_session,
        local::{FileStorage, STORAGE_FILE_NAME},
        record_store::RecordStore,
    },
    tracker::{
        driver::SessionDriver,
        machine::{MachineConfig, DEFAULT_ALERT_THRESHOLD},
        TrackerConfig,
    },
    utils::{
        clock::{Clock, DefaultClock},
        dir::application_path,
        logging::{enable_logging, LOG_PREFIX},
        reference_clock::{ClockReadout, FixedZoneClock},
    },
};

#[derive(Parser, Debug)]
#[command(name = "timetracker", version, long_about = None)]
#[command(about = "Track time spent on activities, with pauses and comments", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable trace logging, also printed to stdout")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct ReferenceArgs {
    #[arg(
        long,
        default_value_t = FixedZoneClock::MEXICO_CITY_OFFSET_HOURS,
        allow_negative_numbers = true,
        help = "UTC offset in hours of the reference clock"
    )]
    reference_offset: i32,
    #[arg(long, default_value = "Mexico City", help = "Name shown next to the reference clock")]
    reference_label: String,
}

impl ReferenceArgs {
    fn clock(&self) -> Result<FixedZoneClock> {
        FixedZoneClock::new(self.reference_label.clone(), self.reference_offset)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Track sessions interactively")]
    Run {
        #[arg(
            long,
            default_value_t = DEFAULT_ALERT_THRESHOLD,
            help = "Active seconds after which an alert is shown"
        )]
        alert_at: u64,
        #[arg(long, conflicts_with = "alert_at", help = "Never show the active time alert")]
        no_alert: bool,
        #[command(flatten)]
        reference: ReferenceArgs,
        #[arg(long, default_value = ".", help = "Directory for saved files and reports")]
        out: PathBuf,
    },
    #[command(about = "Display clocks and the session left open by the last run")]
    Status {
        #[command(flatten)]
        reference: ReferenceArgs,
    },
    #[command(about = "Display all records")]
    Records,
    #[command(about = "Display time per activity")]
    Summary,
    #[command(about = "Save records into a JSON file")]
    Save {
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    #[command(about = "Replace records with the ones from a JSON file")]
    Import {
        path: PathBuf,
        #[arg(long, short, help = "Don't ask for confirmation")]
        yes: bool,
    },
    #[command(about = "Write a text report of the project")]
    Report {
        #[arg(long)]
        project: Option<String>,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    #[command(about = "Delete all records")]
    Clear {
        #[arg(long, short, help = "Don't ask for confirmation")]
        yes: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = application_path(args.dir)?;
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(LOG_PREFIX, &app_dir.join("logs"), logging_level, args.log)?;

    let storage = Arc::new(FileStorage::open(app_dir.join(STORAGE_FILE_NAME)).await?);
    info!("Using storage {:?}", storage.path());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    // Only the interactive mode cancels it, one-shot commands keep the default Ctrl-C behavior.
    let shutdown = CancellationToken::new();

    match args.commands {
        Commands::Run {
            alert_at,
            no_alert,
            reference,
            out,
        } => {
            let config = TrackerConfig {
                machine: MachineConfig {
                    alert_threshold: (!no_alert).then_some(alert_at),
                },
                ..Default::default()
            };
            info!("Starting interactive mode with {config:?}");
            let (sender, receiver) = mpsc::channel(TICK_BUFFER);
            let (driver, recovery) = SessionDriver::open(storage, clock, config, sender).await?;
            let mut interactive = Interactive::new(
                driver,
                Console::stdin(shutdown.clone()),
                Box::new(reference.clock()?),
                out,
            );
            interactive.announce_recovery(&recovery);
            interactive.run(receiver, shutdown).await
        }
        Commands::Status { reference } => {
            print_readout(&ClockReadout::read(clock.as_ref(), &reference.clock()?));
            match load_session(&storage).await? {
                Some(session) => print_session(&session),
                None => println!("No session in progress"),
            }
            Ok(())
        }
        Commands::Records => {
            print_records(open_store(storage).await?.records());
            Ok(())
        }
        Commands::Summary => {
            print_summary(open_store(storage).await?.records());
            Ok(())
        }
        Commands::Save { name, out } => {
            let store = open_store(storage).await?;
            if let Some(path) =
                actions::save(store.records(), &mut Console::stdin(shutdown), name, &out).await?
            {
                println!("Saved into {}", path.display());
            }
            Ok(())
        }
        Commands::Import { path, yes } => {
            let mut store = open_store(storage).await?;
            if actions::import(&mut store, &mut Console::stdin(shutdown), &path, yes).await? {
                println!("Imported {} records", store.records().len());
            }
            Ok(())
        }
        Commands::Report { project, out } => {
            let store = open_store(storage).await?;
            let today = clock.now().date_naive();
            if let Some(path) =
                actions::report(store.records(), &mut Console::stdin(shutdown), project, &out, today)
                    .await?
            {
                println!("Report written into {}", path.display());
            }
            Ok(())
        }
        Commands::Clear { yes } => {
            let mut store = open_store(storage).await?;
            if actions::clear(&mut store, &mut Console::stdin(shutdown), yes).await? {
                println!("Records deleted");
            }
            Ok(())
        }
    }
}

async fn open_store(storage: Arc<FileStorage>) -> Result<RecordStore<Arc<FileStorage>>> {
    let mut store = RecordStore::new(storage);
    store.restore().await?;
    Ok(store)
}
