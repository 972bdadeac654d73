use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::{io::AsyncBufRead, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    console::{Console, Interrupted, Prompter},
    storage::local::LocalStorage,
    tracker::{
        activity::Activity,
        comment::capture_comment,
        driver::{Notice, Recovery, SessionDriver},
        machine::{Event, TransitionError},
        ticker::Tick,
    },
    utils::reference_clock::{ClockReadout, ReferenceClock},
};

use super::{
    actions,
    output::{
        print_activity_menu, print_readout, print_record_saved, print_records, print_session,
        print_summary,
    },
    shutdown::detect_shutdown,
};

/// Ticks queued while a prompt is waiting for the user.
pub const TICK_BUFFER: usize = 64;

#[derive(Debug, Parser)]
#[command(multicall = true)]
struct InteractiveLine {
    #[command(subcommand)]
    command: InteractiveCommand,
}

#[derive(Debug, Subcommand)]
enum InteractiveCommand {
    #[command(about = "Start a session. Optionally select the activity right away")]
    Start { activity: Vec<String> },
    #[command(about = "Select the activity of a started session, by number or name")]
    Select {
        #[arg(required = true, num_args = 1..)]
        activity: Vec<String>,
    },
    #[command(about = "Go back without selecting an activity")]
    Cancel,
    #[command(about = "Pause or resume the session")]
    Pause,
    #[command(about = "Stop the session and save it as a record")]
    Stop,
    #[command(about = "Show clocks and the current session")]
    Status,
    #[command(about = "Show all records")]
    Records,
    #[command(about = "Show time per activity")]
    Summary,
    #[command(about = "Save records into a JSON file")]
    Save { name: Option<String> },
    #[command(about = "Replace records with the ones from a JSON file")]
    Import { path: PathBuf },
    #[command(about = "Write a text report of the project")]
    Report { project: Option<String> },
    #[command(about = "Delete all records")]
    Clear,
    #[command(about = "Leave, the session keeps its state until next time", alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

enum Input {
    Line(Option<String>),
    Tick(Tick),
    Shutdown,
}

/// The interactive tracker: user commands and timer ticks funnel into one [SessionDriver].
pub struct Interactive<S: LocalStorage + Clone, P: Prompter> {
    driver: SessionDriver<S>,
    prompter: P,
    reference: Box<dyn ReferenceClock>,
    out_dir: PathBuf,
}

impl<S: LocalStorage + Clone, P: Prompter> Interactive<S, P> {
    pub fn new(
        driver: SessionDriver<S>,
        prompter: P,
        reference: Box<dyn ReferenceClock>,
        out_dir: PathBuf,
    ) -> Self {
        Self {
            driver,
            prompter,
            reference,
            out_dir,
        }
    }

    pub fn driver(&self) -> &SessionDriver<S> {
        &self.driver
    }

    pub fn announce_recovery(&mut self, recovery: &Recovery) {
        if let Some(count) = recovery.records {
            self.prompter
                .alert(&format!("Records recovered ({count})"));
        }
        if let Some(session) = recovery.session {
            self.prompter.alert("Resumed the previous session");
            print_session(&session);
        }
    }

    /// Runs one command line. Errors are the command's own, the session stays usable.
    pub async fn execute(&mut self, line: &str) -> Result<Flow> {
        let words = line.split_whitespace().collect::<Vec<_>>();
        if words.is_empty() {
            return Ok(Flow::Continue);
        }
        let command = match InteractiveLine::try_parse_from(words) {
            Ok(v) => v.command,
            Err(e) => {
                e.print()?;
                return Ok(Flow::Continue);
            }
        };
        info!("Executing {command:?}");

        match command {
            InteractiveCommand::Start { activity } => {
                self.handle(Event::Start).await?;
                if activity.is_empty() {
                    print_activity_menu();
                } else {
                    self.select(&activity).await?;
                }
            }
            InteractiveCommand::Select { activity } => self.select(&activity).await?,
            InteractiveCommand::Cancel => self.handle(Event::Cancel).await?,
            InteractiveCommand::Pause => {
                self.handle(Event::Pause).await?;
                print_session(self.driver.state());
            }
            InteractiveCommand::Stop => self.stop().await?,
            InteractiveCommand::Status => {
                let readout = ClockReadout::read(self.driver.clock(), self.reference.as_ref());
                print_readout(&readout);
                print_session(self.driver.state());
                println!("Records: {}", self.driver.records().len());
            }
            InteractiveCommand::Records => print_records(self.driver.records()),
            InteractiveCommand::Summary => print_summary(self.driver.records()),
            InteractiveCommand::Save { name } => {
                if let Some(path) =
                    actions::save(self.driver.records(), &mut self.prompter, name, &self.out_dir)
                        .await?
                {
                    println!("Saved into {}", path.display());
                }
            }
            InteractiveCommand::Import { path } => {
                if actions::import(self.driver.store_mut(), &mut self.prompter, &path, false)
                    .await?
                {
                    println!("Imported {} records", self.driver.records().len());
                }
            }
            InteractiveCommand::Report { project } => {
                let today = self.driver.now().date_naive();
                if let Some(path) = actions::report(
                    self.driver.records(),
                    &mut self.prompter,
                    project,
                    &self.out_dir,
                    today,
                )
                .await?
                {
                    println!("Report written into {}", path.display());
                }
            }
            InteractiveCommand::Clear => {
                if actions::clear(self.driver.store_mut(), &mut self.prompter, false).await? {
                    println!("Records deleted");
                }
            }
            InteractiveCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn select(&mut self, words: &[String]) -> Result<()> {
        let activity = words.join(" ").parse::<Activity>()?;
        let at = self.driver.now();
        self.handle(Event::SelectActivity { activity, at }).await?;
        println!("Tracking {activity}");
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        let state = self.driver.state();
        if !state.is_tracking() {
            return Err(TransitionError::Invalid {
                phase: state.phase,
                event: "stop",
            }
            .into());
        }
        // The session ends when the user asks for it, not once the comment is typed.
        let at = self.driver.now();
        let comment = capture_comment(&mut self.prompter).await?;
        self.handle(Event::Stop { comment, at }).await
    }

    async fn handle(&mut self, event: Event) -> Result<()> {
        let notices = self.driver.handle(event).await?;
        self.show(notices);
        Ok(())
    }

    pub async fn on_tick(&mut self, tick: Tick) -> Result<()> {
        let notices = self.driver.on_tick(tick).await?;
        self.show(notices);
        Ok(())
    }

    fn show(&mut self, notices: Vec<Notice>) {
        for notice in notices {
            match notice {
                Notice::ActiveThreshold(seconds) => self
                    .prompter
                    .alert(&format!("\x07You have been active for {seconds} seconds")),
                Notice::RecordSaved(record) => print_record_saved(&record),
            }
        }
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.driver.shutdown().await
    }
}

impl<S: LocalStorage + Clone, R: AsyncBufRead + Unpin + Send> Interactive<S, Console<R>> {
    /// Serves commands until `quit`, end of input or Ctrl-C. Ctrl-C also abandons an open prompt,
    /// leaving the session as it was before the command. The state is checkpointed on the way out
    /// no matter how the loop ended.
    pub async fn run(
        mut self,
        mut ticks: mpsc::Receiver<Tick>,
        shutdown: CancellationToken,
    ) -> Result<()> {
        tokio::spawn(detect_shutdown(shutdown.clone()));

        println!("Type `help` to list commands");
        self.prompter.prompt_marker();
        loop {
            let input = tokio::select! {
                biased;
                _ = shutdown.cancelled() => Input::Shutdown,
                line = self.prompter.next_line() => Input::Line(line?),
                Some(tick) = ticks.recv() => Input::Tick(tick),
            };

            match input {
                Input::Shutdown | Input::Line(None) => break,
                Input::Line(Some(line)) => {
                    match self.execute(&line).await {
                        Ok(Flow::Quit) => break,
                        Ok(Flow::Continue) => (),
                        Err(e) if e.is::<Interrupted>() => {
                            info!("Command {line:?} interrupted");
                            break;
                        }
                        Err(e) => {
                            error!("Command {line:?} failed: {e:?}");
                            self.prompter.alert(&format!("{e:#}"));
                        }
                    }
                    self.prompter.prompt_marker();
                }
                Input::Tick(tick) => {
                    if let Err(e) = self.on_tick(tick).await {
                        error!("Failed to process tick {tick:?}: {e:?}");
                    }
                }
            }
        }

        shutdown.cancel();
        self.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use anyhow::Result;
    use tempfile::{tempdir, TempDir};
    use tokio::{
        io::{duplex, AsyncWriteExt, BufReader},
        sync::mpsc,
    };
    use tokio_util::sync::CancellationToken;

    use crate::{
        console::{Console, Interrupted, MockPrompter, Prompter},
        storage::{
            checkpoint::load_session,
            local::{FileStorage, STORAGE_FILE_NAME},
        },
        tracker::{
            activity::Activity, driver::SessionDriver, machine::MachineConfig, state::Phase,
            ticker::Tick, TrackerConfig,
        },
        utils::{
            clock::{test_clock::TestClock, Clock},
            reference_clock::FixedZoneClock,
        },
    };

    use super::{Flow, Interactive};

    async fn interactive<P: Prompter>(
        dir: &TempDir,
        prompter: P,
    ) -> Result<(Interactive<Arc<FileStorage>, P>, mpsc::Receiver<Tick>)> {
        let storage = Arc::new(FileStorage::open(dir.path().join(STORAGE_FILE_NAME)).await?);
        let clock: Arc<dyn Clock> = Arc::new(TestClock::new());
        let (sender, receiver) = mpsc::channel(16);
        let config = TrackerConfig {
            tick_interval: Duration::from_secs(3600),
            machine: MachineConfig::default(),
        };
        let (driver, _) = SessionDriver::open(storage, clock, config, sender).await?;
        let reference = Box::new(FixedZoneClock::new("Mexico City", -6)?);
        Ok((
            Interactive::new(driver, prompter, reference, dir.path().to_path_buf()),
            receiver,
        ))
    }

    async fn tick(session: &mut Interactive<Arc<FileStorage>, MockPrompter>, count: usize) -> Result<()> {
        for _ in 0..count {
            let generation = session.driver().ticker_generation().unwrap();
            session.on_tick(Tick { generation }).await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_session_from_commands() -> Result<()> {
        let dir = tempdir()?;
        let mut prompter = MockPrompter::new();
        prompter
            .expect_ask()
            .times(1)
            .returning(|_| Ok(Some("reviewed the queue".into())));
        let (mut session, _ticks) = interactive(&dir, prompter).await?;

        assert_eq!(session.execute("start").await?, Flow::Continue);
        assert_eq!(
            session.driver().state().phase,
            Phase::AwaitingActivitySelection
        );
        session.execute("select revisión del código").await?;
        assert_eq!(session.driver().state().activity, Some(Activity::CodeReview));

        tick(&mut session, 2).await?;
        session.execute("pause").await?;
        tick(&mut session, 1).await?;
        session.execute("stop").await?;

        let records = session.driver().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].active_seconds, 2);
        assert_eq!(records[0].inactive_seconds, 1);
        assert_eq!(records[0].comment, "reviewed the queue");
        Ok(())
    }

    #[tokio::test]
    async fn test_start_with_activity_and_alert() -> Result<()> {
        let dir = tempdir()?;
        let mut prompter = MockPrompter::new();
        prompter.expect_alert().times(1).return_const(());
        let (mut session, _ticks) = interactive(&dir, prompter).await?;

        session.execute("start 3").await?;
        assert_eq!(session.driver().state().phase, Phase::Running);
        tick(&mut session, 45).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_commands() -> Result<()> {
        let dir = tempdir()?;
        let mut prompter = MockPrompter::new();
        prompter.expect_ask().never();
        let (mut session, _ticks) = interactive(&dir, prompter).await?;

        assert!(session.execute("stop").await.is_err());
        assert!(session.execute("pause").await.is_err());
        session.execute("start").await?;
        assert!(session.execute("select 12").await.is_err());
        assert_eq!(
            session.driver().state().phase,
            Phase::AwaitingActivitySelection
        );
        assert_eq!(session.execute("dance").await?, Flow::Continue);
        assert_eq!(session.execute("   ").await?, Flow::Continue);
        assert_eq!(session.execute("exit").await?, Flow::Quit);
        Ok(())
    }

    #[tokio::test]
    async fn test_shutdown_abandons_the_comment_prompt() -> Result<()> {
        let dir = tempdir()?;
        let (_input, reader) = duplex(256);
        let shutdown = CancellationToken::new();
        let console = Console::new(BufReader::new(reader), shutdown.clone());
        let (mut session, _ticks) = interactive(&dir, console).await?;

        session.execute("start 3").await?;
        shutdown.cancel();
        let error = session.execute("stop").await.unwrap_err();
        assert!(error.is::<Interrupted>());
        assert_eq!(session.driver().state().phase, Phase::Running);
        assert!(session.driver().records().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_interrupt_during_stop_keeps_the_session() -> Result<()> {
        let dir = tempdir()?;
        let (mut input, reader) = duplex(256);
        let shutdown = CancellationToken::new();
        let console = Console::new(BufReader::new(reader), shutdown.clone());
        let (session, ticks) = interactive(&dir, console).await?;

        input.write_all(b"start 3\nstop\n").await?;
        let path = dir.path().join(STORAGE_FILE_NAME);
        let interrupt = shutdown.clone();
        let watched = path.clone();
        let watcher = async move {
            // Interrupt once the session is running, the comment prompt is next.
            loop {
                let storage = FileStorage::open(watched.clone()).await?;
                if load_session(&storage).await?.is_some() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
            interrupt.cancel();
            anyhow::Ok(())
        };
        let (ran, watched) = tokio::join!(session.run(ticks, shutdown), watcher);
        ran?;
        watched?;

        let storage = FileStorage::open(path).await?;
        let restored = load_session(&storage).await?.unwrap();
        assert_eq!(restored.phase, Phase::Running);
        assert_eq!(restored.activity, Some(Activity::Code));
        Ok(())
    }
}
