#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative application state for the AURA analyzer.
//!
//! The world owns the screen router, the side menu, the selected test mode,
//! the simulated battery, and the single active scan session. Every mutation
//! enters through [`apply`]; timers are expressed as durations consumed from
//! [`Command::Tick`] so the whole state machine advances deterministically.

use std::time::Duration;

use aura_core::{
    Command, Event, Notice, NoticeLevel, Phase, Readings, ScanProgress, ScanStage, Screen,
    StartRejection, TestMode, TestResult, WELCOME_BANNER,
};
use tracing::{debug, info, warn};

/// Delay between progress reaching 100 and the scan being handed to grading.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);
/// Delay between a result being recorded and the results screen appearing.
pub const RESULT_PRESENT_DELAY: Duration = Duration::from_millis(500);

/// Battery level the simulated device boots with.
pub const INITIAL_BATTERY_LEVEL: f32 = 87.0;
/// Battery level the drain never goes below.
pub const BATTERY_FLOOR: f32 = 10.0;
/// Battery level under which every drain raises a warning.
pub const LOW_BATTERY_WARNING: f32 = 20.0;
/// Battery level under which new tests are refused.
pub const MIN_BATTERY_FOR_TEST: f32 = 15.0;

/// Minimum swipe distance recognised as a back gesture.
const SWIPE_THRESHOLD: f32 = 50.0;

/// Represents the authoritative analyzer state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    screen: Screen,
    menu_open: bool,
    test_mode: TestMode,
    battery_level: f32,
    session: Option<ScanSession>,
    pending_presentation: Option<Duration>,
    last_result: Option<TestResult>,
}

impl World {
    /// Creates a new world showing the dashboard.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            screen: Screen::Dashboard,
            menu_open: false,
            test_mode: TestMode::default(),
            battery_level: INITIAL_BATTERY_LEVEL,
            session: None,
            pending_presentation: None,
            last_result: None,
        }
    }

    fn show(&mut self, screen: Screen, out_events: &mut Vec<Event>) {
        if screen != Screen::Scanning {
            self.cancel_scan(out_events);
        }
        self.close_menu(out_events);

        if self.screen == screen {
            return;
        }

        let from = self.screen;
        self.screen = screen;
        debug!(%from, to = %screen, "screen changed");
        out_events.push(Event::ScreenChanged { from, to: screen });
    }

    fn go_back(&mut self, out_events: &mut Vec<Event>) {
        if self.screen != Screen::Dashboard {
            self.show(Screen::Dashboard, out_events);
        }
    }

    fn open_menu(&mut self, out_events: &mut Vec<Event>) {
        if !self.menu_open {
            self.menu_open = true;
            out_events.push(Event::MenuToggled { open: true });
        }
    }

    fn close_menu(&mut self, out_events: &mut Vec<Event>) {
        if self.menu_open {
            self.menu_open = false;
            out_events.push(Event::MenuToggled { open: false });
        }
    }

    fn cancel_scan(&mut self, out_events: &mut Vec<Event>) {
        if self.pending_presentation.take().is_some() {
            debug!("pending results presentation dropped");
        }
        if let Some(session) = self.session.take() {
            info!(
                mode = %session.mode,
                progress = session.progress.value(),
                "scan cancelled"
            );
            out_events.push(Event::ScanCancelled);
        }
    }

    fn start_test(&mut self, out_events: &mut Vec<Event>) {
        if self.session.is_some() {
            warn!("start requested while a scan is running");
            out_events.push(Event::StartRejected {
                reason: StartRejection::AlreadyRunning,
            });
            return;
        }

        if self.battery_level < MIN_BATTERY_FOR_TEST {
            warn!(level = self.battery_level, "battery too low to start test");
            out_events.push(Event::StartRejected {
                reason: StartRejection::LowBattery,
            });
            notify(
                out_events,
                NoticeLevel::Error,
                "Battery too low to start test. Please charge your device.",
            );
            return;
        }

        self.pending_presentation = None;
        self.show(Screen::Scanning, out_events);

        let session = ScanSession::new(self.test_mode);
        info!(mode = %session.mode, "scan started");
        out_events.push(Event::ScanStarted { mode: session.mode });
        out_events.push(Event::PhaseChanged {
            phase: session.progress.phase(),
        });
        self.session = Some(session);
    }

    fn advance_scan(
        &mut self,
        increment: f32,
        readings: Option<Readings>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(session) = self.session.as_mut() else {
            debug!("progress step without an active scan ignored");
            return;
        };

        if session.stage != ScanStage::Sampling {
            debug!("progress step after sampling finished ignored");
            return;
        }

        if session.progress.phase() == Phase::Analyzing {
            if let Some(readings) = readings {
                session.readings = Some(readings);
            }
        }

        let (progress, entered) = session.progress.advance(increment);
        session.progress = progress;
        out_events.push(Event::ScanProgressed {
            progress: progress.value(),
            readings: session.readings,
        });

        if let Some(phase) = entered {
            debug!(phase = phase.title(), "scan phase entered");
            out_events.push(Event::PhaseChanged { phase });
        }

        if progress.is_complete() {
            session.stage = ScanStage::Settling {
                remaining: SETTLE_DELAY,
            };
            info!("scan sampling finished");
            out_events.push(Event::SamplingFinished);
        }
    }

    fn advance_timers(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if let Some(session) = self.session.as_mut() {
            if let ScanStage::Settling { remaining } = session.stage {
                let remaining = remaining.saturating_sub(dt);
                if remaining.is_zero() {
                    session.stage = ScanStage::AwaitingResult;
                    out_events.push(Event::ScanSettled {
                        mode: session.mode,
                        readings: session.readings,
                    });
                } else {
                    session.stage = ScanStage::Settling { remaining };
                }
            }
        }

        if let Some(remaining) = self.pending_presentation {
            let remaining = remaining.saturating_sub(dt);
            if remaining.is_zero() {
                self.pending_presentation = None;
                self.show(Screen::Results, out_events);
                notify(out_events, NoticeLevel::Success, "Test completed successfully!");
            } else {
                self.pending_presentation = Some(remaining);
            }
        }
    }

    fn record_result(&mut self, result: TestResult, out_events: &mut Vec<Event>) {
        let awaiting = self
            .session
            .as_ref()
            .is_some_and(|session| session.stage == ScanStage::AwaitingResult);
        if !awaiting {
            warn!(id = %result.id(), "result delivered without a settled scan");
            return;
        }

        self.session = None;
        self.pending_presentation = Some(RESULT_PRESENT_DELAY);
        self.last_result = Some(result.clone());
        info!(id = %result.id(), grade = %result.grade(), "test result recorded");
        out_events.push(Event::ResultRecorded { result });
    }

    fn drain_battery(&mut self, amount: f32, out_events: &mut Vec<Event>) {
        if !amount.is_finite() || amount < 0.0 {
            return;
        }

        self.battery_level = (self.battery_level - amount).max(BATTERY_FLOOR);
        out_events.push(Event::BatteryChanged {
            level: self.battery_level,
        });

        if self.battery_level < LOW_BATTERY_WARNING {
            notify(
                out_events,
                NoticeLevel::Warning,
                "Low battery! Please charge your device.",
            );
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ShowScreen { screen } => world.show(screen, out_events),
        Command::GoBack => world.go_back(out_events),
        Command::ToggleMenu => {
            if world.menu_open {
                world.close_menu(out_events);
            } else {
                world.open_menu(out_events);
            }
        }
        Command::OpenMenu => world.open_menu(out_events),
        Command::CloseMenu => world.close_menu(out_events),
        Command::Escape => {
            if world.screen != Screen::Dashboard {
                world.go_back(out_events);
            } else {
                world.close_menu(out_events);
            }
        }
        Command::Swipe { distance } => {
            if distance > SWIPE_THRESHOLD && world.screen != Screen::Dashboard {
                world.go_back(out_events);
            }
        }
        Command::SetTestMode { mode } => {
            world.test_mode = mode;
            out_events.push(Event::TestModeChanged { mode });
            notify(
                out_events,
                NoticeLevel::Info,
                format!("Test mode set to {mode}"),
            );
        }
        Command::StartTest => world.start_test(out_events),
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_timers(dt, out_events);
        }
        Command::AdvanceScan {
            increment,
            readings,
        } => world.advance_scan(increment, readings, out_events),
        Command::RecordResult { result } => world.record_result(result, out_events),
        Command::DrainBattery { amount } => world.drain_battery(amount, out_events),
        Command::GenerateCertificate => world.show(Screen::Certificate, out_events),
        Command::SaveResult => {
            notify(out_events, NoticeLevel::Success, "Result saved successfully!");
        }
        Command::DownloadCertificate => notify(
            out_events,
            NoticeLevel::Success,
            "Certificate downloaded successfully!",
        ),
        Command::ShareCertificate { share_supported } => {
            if share_supported {
                out_events.push(Event::ShareRequested {
                    test_id: world.last_result.as_ref().map(|result| result.id().clone()),
                });
            } else {
                notify(
                    out_events,
                    NoticeLevel::Success,
                    "Certificate link copied to clipboard!",
                );
            }
        }
        Command::VerifyBlockchain => notify(
            out_events,
            NoticeLevel::Info,
            "Opening blockchain verification...",
        ),
    }
}

fn notify(out_events: &mut Vec<Event>, level: NoticeLevel, message: impl Into<String>) {
    out_events.push(Event::Notice {
        notice: Notice::new(level, message),
    });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use aura_core::{ScanSnapshot, Screen, TestMode, TestResult};

    /// Retrieves the welcome banner that adapters may display.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Screen currently visible.
    #[must_use]
    pub fn screen(world: &World) -> Screen {
        world.screen
    }

    /// Reports whether the side menu is open.
    #[must_use]
    pub fn menu_open(world: &World) -> bool {
        world.menu_open
    }

    /// Mode that the next test will run in.
    #[must_use]
    pub fn test_mode(world: &World) -> TestMode {
        world.test_mode
    }

    /// Simulated battery level in percent.
    #[must_use]
    pub fn battery_level(world: &World) -> f32 {
        world.battery_level
    }

    /// Captures a snapshot of the active scan session, if any.
    #[must_use]
    pub fn scan(world: &World) -> Option<ScanSnapshot> {
        world.session.as_ref().map(|session| ScanSnapshot {
            mode: session.mode,
            progress: session.progress,
            readings: session.readings,
            stage: session.stage,
        })
    }

    /// Result produced by the most recent completed test.
    #[must_use]
    pub fn last_result(world: &World) -> Option<&TestResult> {
        world.last_result.as_ref()
    }

    /// Reports whether the results screen is scheduled to appear.
    #[must_use]
    pub fn presentation_pending(world: &World) -> bool {
        world.pending_presentation.is_some()
    }
}

#[derive(Clone, Debug)]
struct ScanSession {
    mode: TestMode,
    progress: ScanProgress,
    readings: Option<Readings>,
    stage: ScanStage,
}

impl ScanSession {
    fn new(mode: TestMode) -> Self {
        Self {
            mode,
            progress: ScanProgress::start(),
            readings: None,
            stage: ScanStage::Sampling,
        }
    }
}
