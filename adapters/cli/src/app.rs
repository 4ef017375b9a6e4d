//! Scheduling adapter that wires the world, the systems and the record store.

use std::{thread, time::Duration};

use anyhow::{bail, Context, Result as AnyResult};
use aura_core::{Command, Event, Screen, StatsReport, TestMode, TestResult};
use aura_rendering::{Frame, Presenter};
use aura_storage::{Order, RecordStore, Slot};
use aura_system_analytics::Analytics;
use aura_system_battery::{self as battery, Battery};
use aura_system_grading::Grading;
use aura_system_scanning::{self as scanning, Scanning};
use aura_world::{self as world, query, World};
use time::OffsetDateTime;
use tracing::{debug, warn};

/// Upper bound on command rounds triggered by a single submission.
const MAX_PUMP_ROUNDS: usize = 64;
/// Upper bound on ticks a single scan may consume before giving up.
const MAX_SCAN_TICKS: u32 = 1_000;

const GRADING_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;
const BATTERY_SEED_SALT: u64 = 0xD1B5_4A32_D192_ED03;

/// Per-system seeds derived from one master seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Seeds {
    /// Seed of the progress simulator.
    pub scanning: u64,
    /// Seed of the result generator.
    pub grading: u64,
    /// Seed of the battery drain.
    pub battery: u64,
}

impl Seeds {
    /// Derives distinct seeds for every system from `master`.
    #[must_use]
    pub const fn from_master(master: u64) -> Self {
        Self {
            scanning: master,
            grading: master ^ GRADING_SEED_SALT,
            battery: master ^ BATTERY_SEED_SALT,
        }
    }
}

/// Owns the analyzer state and routes commands until the simulation is quiescent.
pub struct App<S, P> {
    world: World,
    scanning: Scanning,
    grading: Grading,
    battery: Battery,
    analytics: Analytics,
    store: RecordStore<S>,
    presenter: P,
    clock: Box<dyn FnMut() -> OffsetDateTime>,
    tick: Duration,
}

impl<S: Slot, P: Presenter> App<S, P> {
    /// Creates an application over a loaded store using the wall clock.
    pub fn new(store: RecordStore<S>, presenter: P, seed: u64) -> Self {
        let seeds = Seeds::from_master(seed);
        let scanning_config = scanning::Config::new(seeds.scanning);
        Self {
            world: World::new(),
            tick: scanning_config.tick_interval(),
            scanning: Scanning::new(scanning_config),
            grading: Grading::new(seeds.grading),
            battery: Battery::new(battery::Config::new(seeds.battery)),
            analytics: Analytics::new(),
            store,
            presenter,
            clock: Box::new(OffsetDateTime::now_utc),
        }
    }

    /// Replaces the clock used to timestamp results.
    #[must_use]
    pub fn with_clock(mut self, clock: impl FnMut() -> OffsetDateTime + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Read-only access to the world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the record store.
    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    /// Mutable access to the presenter.
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Consumes the application and returns its presenter.
    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Applies a command and every command the systems emit in response.
    pub fn submit(&mut self, command: Command) -> AnyResult<()> {
        let mut pending = vec![command];
        let mut events = Vec::new();
        let mut rounds = 0;

        while !pending.is_empty() {
            rounds += 1;
            if rounds > MAX_PUMP_ROUNDS {
                bail!("command cascade did not settle after {MAX_PUMP_ROUNDS} rounds");
            }

            events.clear();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.dispatch(&mut events)?;

            let scan = query::scan(&self.world);
            self.scanning.handle(&events, scan.as_ref(), &mut pending);
            if events
                .iter()
                .any(|event| matches!(event, Event::ScanSettled { .. }))
            {
                let now = (self.clock)();
                self.grading.handle(&events, now, &mut pending);
            }
            self.battery.handle(&events, &mut pending);
        }

        Ok(())
    }

    fn dispatch(&mut self, events: &mut Vec<Event>) -> AnyResult<()> {
        for event in events.iter() {
            match event {
                Event::ResultRecorded { result } => self
                    .store
                    .append(result.clone())
                    .context("failed to store test result")?,
                Event::Notice { notice } => self.presenter.notify(notice)?,
                Event::StartRejected { reason } => warn!(?reason, "test start refused"),
                Event::ShareRequested { test_id } => {
                    debug!(?test_id, "native share is not available in the terminal");
                }
                _ => {}
            }
        }

        let mut published = Vec::new();
        self.analytics
            .handle(events, self.store.records(), &mut published);
        for event in &published {
            if let Event::StatsUpdated { report } = event {
                debug!(
                    total = report.total_tests,
                    average = report.average_purity,
                    "statistics refreshed"
                );
            }
        }
        events.extend(published);
        Ok(())
    }

    /// Runs one complete test in `mode` and returns the recorded result.
    ///
    /// Returns `None` when the world refuses to start the test. With
    /// `realtime` set the loop sleeps for every simulated tick.
    pub fn run_scan(&mut self, mode: TestMode, realtime: bool) -> AnyResult<Option<TestResult>> {
        self.submit(Command::SetTestMode { mode })?;
        self.submit(Command::StartTest)?;

        let Some(scan) = query::scan(&self.world) else {
            return Ok(None);
        };
        self.present()?;

        let mut shown_phase = scan.progress.phase();
        let mut ticks = 0;
        while query::scan(&self.world).is_some() || query::presentation_pending(&self.world) {
            if ticks >= MAX_SCAN_TICKS {
                bail!("scan did not complete after {ticks} ticks");
            }
            ticks += 1;

            if realtime {
                thread::sleep(self.tick);
            }
            self.submit(Command::Tick { dt: self.tick })?;

            if let Some(scan) = query::scan(&self.world) {
                if scan.progress.phase() != shown_phase {
                    shown_phase = scan.progress.phase();
                    self.present()?;
                }
            }
        }

        if query::screen(&self.world) != Screen::Results {
            return Ok(None);
        }
        self.present()?;
        Ok(query::last_result(&self.world).cloned())
    }

    /// Recomputes the statistics over the stored records.
    pub fn refresh_stats(&mut self) -> StatsReport {
        self.analytics.request_refresh();
        let mut published = Vec::new();
        self.analytics
            .handle(&[], self.store.records(), &mut published);
        self.analytics.last_report().cloned().unwrap_or_default()
    }

    /// Builds the frame describing the current state.
    ///
    /// Without a result from this session, the newest stored record stands in
    /// for the results and certificate screens.
    pub fn frame(&self) -> Frame {
        let records = self.store.list(Order::NewestFirst);
        let last_result = query::last_result(&self.world)
            .cloned()
            .or_else(|| records.first().cloned());

        Frame {
            banner: query::welcome_banner(&self.world),
            screen: query::screen(&self.world),
            menu_open: query::menu_open(&self.world),
            test_mode: query::test_mode(&self.world),
            battery_level: query::battery_level(&self.world),
            scan: query::scan(&self.world),
            last_result,
            stats: self.store.stats(),
            records,
        }
    }

    /// Presents the current frame.
    pub fn present(&mut self) -> AnyResult<()> {
        let frame = self.frame();
        self.presenter.present(&frame)
    }
}
