use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace};

use crate::{
    storage::{
        checkpoint::{load_session, save_session},
        entities::Record,
        local::LocalStorage,
        record_store::RecordStore,
    },
    utils::clock::Clock,
};

use super::{
    machine::{transition, Effect, Event, Transition},
    state::SessionState,
    ticker::{Tick, Ticker},
    TrackerConfig,
};

/// Things the user should hear about after an event was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ActiveThreshold(u64),
    RecordSaved(Record),
}

/// What [SessionDriver::open] found from a previous run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Recovery {
    /// Amount of recovered records, if a records checkpoint existed.
    pub records: Option<usize>,
    pub session: Option<SessionState>,
}

/// Executes the effects of the [state machine](super::machine): owns the session, the record store
/// and the ticker. The machine decides, the driver does.
pub struct SessionDriver<S: LocalStorage + Clone> {
    state: SessionState,
    config: TrackerConfig,
    storage: S,
    store: RecordStore<S>,
    clock: Arc<dyn Clock>,
    ticks: mpsc::Sender<Tick>,
    ticker: Option<Ticker>,
    generation: u64,
}

impl<S: LocalStorage + Clone> SessionDriver<S> {
    /// Restores records and any open session from `storage`. A restored session resumes ticking
    /// right away.
    pub async fn open(
        storage: S,
        clock: Arc<dyn Clock>,
        config: TrackerConfig,
        ticks: mpsc::Sender<Tick>,
    ) -> Result<(Self, Recovery)> {
        let mut store = RecordStore::new(storage.clone());
        let records = store.restore().await?;
        let session = load_session(&storage).await?;

        let mut driver = Self {
            state: session.unwrap_or_default(),
            config,
            storage,
            store,
            clock,
            ticks,
            ticker: None,
            generation: 0,
        };

        if driver.state.is_tracking() {
            info!("Resuming session {:?}", driver.state);
            driver.start_ticker();
        }

        Ok((driver, Recovery { records, session }))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn records(&self) -> &[Record] {
        self.store.records()
    }

    pub fn store_mut(&mut self) -> &mut RecordStore<S> {
        &mut self.store
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// Generation of the running ticker. Only ticks carrying it are counted.
    pub fn ticker_generation(&self) -> Option<u64> {
        self.ticker.as_ref().map(Ticker::generation)
    }

    #[instrument(skip(self), fields(phase = %self.state.phase))]
    pub async fn handle(&mut self, event: Event) -> Result<Vec<Notice>> {
        let Transition { state, effects } = transition(&self.state, event, &self.config.machine)?;
        self.state = state;

        let mut notices = vec![];
        for effect in effects {
            trace!("Executing {effect:?}");
            match effect {
                Effect::CancelTicker => self.cancel_ticker(),
                Effect::StartTicker => self.start_ticker(),
                Effect::EmitRecord(record) => {
                    info!("Session finished {record:?}");
                    if let Err(e) = self.store.append(record.clone()).await {
                        // The session is over either way, its keys can't outlive it. The record
                        // stays in memory for the next records checkpoint.
                        save_session(&self.storage, &self.state).await?;
                        return Err(e);
                    }
                    notices.push(Notice::RecordSaved(record));
                }
                Effect::Alert { active_seconds } => {
                    notices.push(Notice::ActiveThreshold(active_seconds))
                }
                Effect::Checkpoint => save_session(&self.storage, &self.state).await?,
            }
        }
        Ok(notices)
    }

    pub async fn on_tick(&mut self, tick: Tick) -> Result<Vec<Notice>> {
        match self.ticker_generation() {
            Some(generation) if generation == tick.generation => self.handle(Event::Tick).await,
            _ => {
                trace!("Ignoring stale tick {tick:?}");
                Ok(vec![])
            }
        }
    }

    /// Counterpart of closing the tracker: stops ticking and writes everything down.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.cancel_ticker();
        self.store.checkpoint().await?;
        save_session(&self.storage, &self.state).await
    }

    fn start_ticker(&mut self) {
        // Never two tickers at once, each one would count the same second.
        self.cancel_ticker();
        self.generation += 1;
        self.ticker = Some(Ticker::spawn(
            self.generation,
            self.config.tick_interval,
            self.clock.clone(),
            self.ticks.clone(),
        ));
    }

    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            debug!("Stopping ticker {}", ticker.generation());
            ticker.cancel();
        }
    }
}
