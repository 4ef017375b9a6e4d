#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the AURA analyzer.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{collections::BTreeMap, fmt, ops::Range, time::Duration};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Canonical banner emitted when the analyzer boots.
pub const WELCOME_BANNER: &str = "AURA Gold Purity Analyzer";

/// Upper bound of the scan progress scale.
pub const PROGRESS_COMPLETE: f32 = 100.0;

/// Named screens the analyzer can display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    /// Landing screen with stats, mode selection and the start button.
    Dashboard,
    /// Live scan progress and instrument readings.
    Scanning,
    /// Outcome of the most recent test.
    Results,
    /// Printable certificate for the most recent test.
    Certificate,
    /// History of stored test results.
    Records,
    /// Static product information.
    About,
}

impl Screen {
    /// Every screen in navigation order.
    pub const ALL: [Screen; 6] = [
        Screen::Dashboard,
        Screen::Scanning,
        Screen::Results,
        Screen::Certificate,
        Screen::Records,
        Screen::About,
    ];

    /// Identifier used when addressing the screen by name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Scanning => "scanning",
            Self::Results => "results",
            Self::Certificate => "certificate",
            Self::Records => "records",
            Self::About => "about",
        }
    }

    /// Resolves a screen identifier, returning `None` for unknown names.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|screen| screen.as_str() == value.trim())
    }

    /// Heading shown at the top of the screen.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "AURA Analyzer",
            Self::Scanning => "Analyzing Sample",
            Self::Results => "Test Results",
            Self::Certificate => "Purity Certificate",
            Self::Records => "Test Records",
            Self::About => "About AURA",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of sample the operator intends to test.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TestMode {
    /// Rings, chains and other worn pieces.
    #[default]
    Jewelry,
    /// Minted coins.
    Coin,
    /// Cast or minted bullion bars.
    Bar,
    /// Historical or decorative objects.
    Artefact,
}

impl TestMode {
    /// Every supported test mode.
    pub const ALL: [TestMode; 4] = [
        TestMode::Jewelry,
        TestMode::Coin,
        TestMode::Bar,
        TestMode::Artefact,
    ];

    /// Lowercase identifier of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jewelry => "jewelry",
            Self::Coin => "coin",
            Self::Bar => "bar",
            Self::Artefact => "artefact",
        }
    }

    /// Resolves a mode identifier, ignoring ASCII case.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value))
    }

    /// Sample type recorded for results produced in this mode.
    #[must_use]
    pub const fn sample_type(self) -> SampleType {
        match self {
            Self::Jewelry => SampleType::Jewelry,
            Self::Coin => SampleType::Coin,
            Self::Bar => SampleType::Bar,
            Self::Artefact => SampleType::Artefact,
        }
    }

    /// Uniform ranges the simulated instrument draws readings from.
    #[must_use]
    pub fn reading_ranges(self) -> ReadingRanges {
        match self {
            Self::Jewelry => ReadingRanges {
                frequency_hz: 650_000..850_000,
                amplitude_volts: 0.30..0.80,
                q_factor: 75..92,
            },
            Self::Coin => ReadingRanges {
                frequency_hz: 550_000..750_000,
                amplitude_volts: 0.40..0.90,
                q_factor: 70..88,
            },
            Self::Bar => ReadingRanges {
                frequency_hz: 450_000..650_000,
                amplitude_volts: 0.50..1.00,
                q_factor: 80..95,
            },
            Self::Artefact => ReadingRanges {
                frequency_hz: 500_000..700_000,
                amplitude_volts: 0.35..0.85,
                q_factor: 60..75,
            },
        }
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical category of the tested sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SampleType {
    /// Worn jewelry.
    Jewelry,
    /// Coin.
    Coin,
    /// Bullion bar.
    Bar,
    /// Historical or decorative object.
    Artefact,
}

impl SampleType {
    /// Display label of the sample type.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Jewelry => "Jewelry",
            Self::Coin => "Coin",
            Self::Bar => "Bar",
            Self::Artefact => "Artefact",
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Gold fineness grades the analyzer can report.
///
/// Each grade carries a fixed purity percentage and confidence score; the
/// three values always travel together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PurityGrade {
    /// 24 karat, 99.9% gold.
    #[serde(rename = "24K")]
    Karat24,
    /// 22 karat, 91.7% gold.
    #[serde(rename = "22K")]
    Karat22,
    /// 18 karat, 75.0% gold.
    #[serde(rename = "18K")]
    Karat18,
    /// 14 karat, 58.3% gold.
    #[serde(rename = "14K")]
    Karat14,
}

impl PurityGrade {
    /// Every grade in descending fineness.
    pub const ALL: [PurityGrade; 4] = [
        PurityGrade::Karat24,
        PurityGrade::Karat22,
        PurityGrade::Karat18,
        PurityGrade::Karat14,
    ];

    /// Short karat code, e.g. `24K`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Karat24 => "24K",
            Self::Karat22 => "22K",
            Self::Karat18 => "18K",
            Self::Karat14 => "14K",
        }
    }

    /// Human readable grade label, e.g. `24K Gold`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Karat24 => "24K Gold",
            Self::Karat22 => "22K Gold",
            Self::Karat18 => "18K Gold",
            Self::Karat14 => "14K Gold",
        }
    }

    /// Gold content in percent associated with the grade.
    #[must_use]
    pub const fn percentage(self) -> f64 {
        match self {
            Self::Karat24 => 99.9,
            Self::Karat22 => 91.7,
            Self::Karat18 => 75.0,
            Self::Karat14 => 58.3,
        }
    }

    /// Confidence score in percent associated with the grade.
    #[must_use]
    pub const fn confidence(self) -> u8 {
        match self {
            Self::Karat24 => 98,
            Self::Karat22 => 95,
            Self::Karat18 => 92,
            Self::Karat14 => 89,
        }
    }

    /// Resolves the grade whose fixed tuple matches the provided values.
    #[must_use]
    pub fn from_tuple(percentage: f64, confidence: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|grade| {
            (grade.percentage() - percentage).abs() < 1e-9 && grade.confidence() == confidence
        })
    }
}

impl fmt::Display for PurityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Ordered phases a scan passes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Scanner warm-up.
    Initializing,
    /// Sensor calibration.
    Calibrating,
    /// Resonance measurement; readings change only in this phase.
    Analyzing,
    /// Result computation.
    Finalizing,
}

impl Phase {
    /// Every phase in execution order.
    pub const ALL: [Phase; 4] = [
        Phase::Initializing,
        Phase::Calibrating,
        Phase::Analyzing,
        Phase::Finalizing,
    ];

    /// One-based position of the phase in the step indicator.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Initializing => 1,
            Self::Calibrating => 2,
            Self::Analyzing => 3,
            Self::Finalizing => 4,
        }
    }

    /// Step title shown while the phase is active.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Initializing => "Initializing Device",
            Self::Calibrating => "Calibrating Sensors",
            Self::Analyzing => "Analyzing Sample",
            Self::Finalizing => "Finalizing Results",
        }
    }

    /// Longer description shown under the step title.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Initializing => "Preparing electromagnetic resonance scanner...",
            Self::Calibrating => "Calibrating frequency and amplitude sensors...",
            Self::Analyzing => "Processing resonance data and calculating purity...",
            Self::Finalizing => "Completing analysis and generating certificate...",
        }
    }

    /// Phase owning the provided progress value.
    ///
    /// Boundaries sit at 25, 50 and 75; the boundary value belongs to the
    /// later phase.
    #[must_use]
    pub fn for_progress(progress: f32) -> Self {
        if progress >= 75.0 {
            Self::Finalizing
        } else if progress >= 50.0 {
            Self::Analyzing
        } else if progress >= 25.0 {
            Self::Calibrating
        } else {
            Self::Initializing
        }
    }
}

/// Continuous progress of a scan together with its active phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanProgress {
    value: f32,
    phase: Phase,
}

impl ScanProgress {
    /// Progress at the start of a scan.
    #[must_use]
    pub const fn start() -> Self {
        Self {
            value: 0.0,
            phase: Phase::Initializing,
        }
    }

    /// Current progress in the range `0.0..=100.0`.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Phase active at the current progress.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Reports whether progress reached the end of the scale.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.value >= PROGRESS_COMPLETE
    }

    /// Advances progress by `increment`, returning the new state and the
    /// phase entered by this step, if any.
    ///
    /// Negative or non-finite increments leave progress unchanged. Progress
    /// saturates at 100 and the phase never moves backwards.
    #[must_use]
    pub fn advance(self, increment: f32) -> (Self, Option<Phase>) {
        let increment = if increment.is_finite() {
            increment.max(0.0)
        } else {
            0.0
        };
        let value = (self.value + increment).min(PROGRESS_COMPLETE);
        let phase = Phase::for_progress(value).max(self.phase);
        let entered = (phase != self.phase).then_some(phase);
        (Self { value, phase }, entered)
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::start()
    }
}

/// Instrument readings captured by the simulated resonance sensor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    /// Resonance frequency in hertz.
    pub frequency_hz: u32,
    /// Signal amplitude in volts, rounded to two decimals.
    pub amplitude_volts: f64,
    /// Resonator quality factor.
    pub q_factor: u32,
}

impl Readings {
    /// Signal quality in percent, derived from the Q-factor.
    ///
    /// A Q-factor of 50 or below maps to 0 and 100 or above maps to 100.
    #[must_use]
    pub const fn signal_quality(&self) -> u8 {
        let quality = self.q_factor.saturating_sub(50).saturating_mul(2);
        if quality > 100 {
            100
        } else {
            quality as u8
        }
    }
}

/// Uniform ranges that readings are drawn from for a given mode.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingRanges {
    /// Frequency range in hertz.
    pub frequency_hz: Range<u32>,
    /// Amplitude range in volts.
    pub amplitude_volts: Range<f64>,
    /// Q-factor range.
    pub q_factor: Range<u32>,
}

/// Lifecycle stage of an active scan session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanStage {
    /// Progress is still advancing.
    Sampling,
    /// Progress reached 100 and the settle delay is counting down.
    Settling {
        /// Time left before the scan is handed to the result generator.
        remaining: Duration,
    },
    /// Waiting for the result generator to deliver a record.
    AwaitingResult,
}

/// Immutable view of the active scan session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanSnapshot {
    /// Mode the scan was started in.
    pub mode: TestMode,
    /// Current progress and phase.
    pub progress: ScanProgress,
    /// Most recent readings, if any were drawn yet.
    pub readings: Option<Readings>,
    /// Lifecycle stage of the session.
    pub stage: ScanStage,
}

/// Opaque identifier of a stored test result.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(String);

impl TestId {
    /// Wraps an identifier string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrowed string form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Completed test result, the only entity that is persisted.
///
/// Percentage and confidence are derived from the grade, so a result can never
/// carry a mixed tuple. Deserialisation rejects records whose stored tuple does
/// not match their grade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredResult", into = "StoredResult")]
pub struct TestResult {
    id: TestId,
    grade: PurityGrade,
    sample_type: SampleType,
    mode: TestMode,
    timestamp: OffsetDateTime,
    readings: Readings,
}

impl TestResult {
    /// Builds a result from the grade and the captured scan context.
    #[must_use]
    pub fn new(
        id: TestId,
        grade: PurityGrade,
        mode: TestMode,
        timestamp: OffsetDateTime,
        readings: Readings,
    ) -> Self {
        Self {
            id,
            grade,
            sample_type: mode.sample_type(),
            mode,
            timestamp,
            readings,
        }
    }

    /// Unique identifier of the result.
    #[must_use]
    pub fn id(&self) -> &TestId {
        &self.id
    }

    /// Reported purity grade.
    #[must_use]
    pub const fn grade(&self) -> PurityGrade {
        self.grade
    }

    /// Purity percentage belonging to the grade.
    #[must_use]
    pub const fn percentage(&self) -> f64 {
        self.grade.percentage()
    }

    /// Confidence score belonging to the grade.
    #[must_use]
    pub const fn confidence(&self) -> u8 {
        self.grade.confidence()
    }

    /// Category of the tested sample.
    #[must_use]
    pub const fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    /// Mode the test ran in.
    #[must_use]
    pub const fn mode(&self) -> TestMode {
        self.mode
    }

    /// Instant the test completed.
    #[must_use]
    pub const fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    /// Readings captured when progress reached 100%.
    #[must_use]
    pub const fn readings(&self) -> Readings {
        self.readings
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredResult {
    id: TestId,
    purity_grade: PurityGrade,
    percentage: f64,
    confidence: u8,
    sample_type: SampleType,
    mode: TestMode,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    frequency: u32,
    amplitude: f64,
    q_factor: u32,
}

impl From<TestResult> for StoredResult {
    fn from(result: TestResult) -> Self {
        Self {
            purity_grade: result.grade,
            percentage: result.percentage(),
            confidence: result.confidence(),
            sample_type: result.sample_type,
            mode: result.mode,
            timestamp: result.timestamp,
            frequency: result.readings.frequency_hz,
            amplitude: result.readings.amplitude_volts,
            q_factor: result.readings.q_factor,
            id: result.id,
        }
    }
}

impl TryFrom<StoredResult> for TestResult {
    type Error = String;

    fn try_from(stored: StoredResult) -> Result<Self, Self::Error> {
        if PurityGrade::from_tuple(stored.percentage, stored.confidence) != Some(stored.purity_grade)
        {
            return Err(format!(
                "result {} pairs grade {} with {}%/{}",
                stored.id, stored.purity_grade, stored.percentage, stored.confidence
            ));
        }

        Ok(Self {
            id: stored.id,
            grade: stored.purity_grade,
            sample_type: stored.sample_type,
            mode: stored.mode,
            timestamp: stored.timestamp,
            readings: Readings {
                frequency_hz: stored.frequency,
                amplitude_volts: stored.amplitude,
                q_factor: stored.q_factor,
            },
        })
    }
}

/// Severity of a transient user-facing notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    /// Neutral information.
    Info,
    /// Confirmation of a completed action.
    Success,
    /// Condition the operator should act on.
    Warning,
    /// Refused action.
    Error,
}

/// Transient toast-style message surfaced to the operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity of the message.
    pub level: NoticeLevel,
    /// Text shown to the operator.
    pub message: String,
}

impl Notice {
    /// Creates a notice with the provided level and message.
    #[must_use]
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Reasons a start-test request may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StartRejection {
    /// A scan session is already active.
    AlreadyRunning,
    /// The battery level is below the minimum required to scan.
    LowBattery,
}

/// Aggregate statistics over the stored results.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatsReport {
    /// Number of stored results.
    pub total_tests: usize,
    /// Mean purity percentage rounded to one decimal, zero when empty.
    pub average_purity: f64,
    /// Number of results per grade.
    pub per_grade: BTreeMap<PurityGrade, usize>,
    /// Number of results per test mode.
    pub per_mode: BTreeMap<TestMode, usize>,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Makes the provided screen visible and closes the side menu.
    ShowScreen {
        /// Screen to display.
        screen: Screen,
    },
    /// Returns to the dashboard unless it is already visible.
    GoBack,
    /// Opens the side menu when closed and closes it when open.
    ToggleMenu,
    /// Opens the side menu.
    OpenMenu,
    /// Closes the side menu.
    CloseMenu,
    /// Escape key: go back, or close the menu on the dashboard.
    Escape,
    /// Horizontal swipe gesture measured in screen units.
    Swipe {
        /// Signed distance, positive to the right.
        distance: f32,
    },
    /// Selects the mode used by subsequent tests.
    SetTestMode {
        /// Mode to activate.
        mode: TestMode,
    },
    /// Requests that a new scan begin.
    StartTest,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Applies one progress step to the active scan.
    AdvanceScan {
        /// Progress increment in percentage points.
        increment: f32,
        /// Freshly drawn readings, present only while analyzing.
        readings: Option<Readings>,
    },
    /// Delivers the generated result for the settled scan.
    RecordResult {
        /// Result produced by the result generator.
        result: TestResult,
    },
    /// Lowers the simulated battery level.
    DrainBattery {
        /// Percentage points to remove.
        amount: f32,
    },
    /// Opens the certificate screen for the latest result.
    GenerateCertificate,
    /// Acknowledges a save request for the latest result.
    SaveResult,
    /// Requests a certificate download.
    DownloadCertificate,
    /// Requests sharing the certificate.
    ShareCertificate {
        /// Whether the host offers a native share facility.
        share_supported: bool,
    },
    /// Requests the external verification page.
    VerifyBlockchain,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a different screen became visible.
    ScreenChanged {
        /// Screen that was visible before.
        from: Screen,
        /// Screen that is visible now.
        to: Screen,
    },
    /// Announces that the side menu opened or closed.
    MenuToggled {
        /// Whether the menu is open after the change.
        open: bool,
    },
    /// Confirms that a new test mode is active.
    TestModeChanged {
        /// Mode that became active.
        mode: TestMode,
    },
    /// Confirms that a scan session started.
    ScanStarted {
        /// Mode the scan runs in.
        mode: TestMode,
    },
    /// Reports that a start-test request was refused.
    StartRejected {
        /// Specific reason the request failed.
        reason: StartRejection,
    },
    /// Reports the progress reached after a step.
    ScanProgressed {
        /// Progress after the step.
        progress: f32,
        /// Latest readings of the session.
        readings: Option<Readings>,
    },
    /// Announces that the scan entered a phase.
    PhaseChanged {
        /// Phase that became active.
        phase: Phase,
    },
    /// Announces that progress reached 100 and sampling stopped.
    SamplingFinished,
    /// Announces that the settle delay elapsed and a result is needed.
    ScanSettled {
        /// Mode the scan ran in.
        mode: TestMode,
        /// Readings captured during the scan.
        readings: Option<Readings>,
    },
    /// Announces that the active scan was abandoned.
    ScanCancelled,
    /// Confirms that a result was accepted for the settled scan.
    ResultRecorded {
        /// Accepted result.
        result: TestResult,
    },
    /// Reports the battery level after a change.
    BatteryChanged {
        /// Level in percent.
        level: f32,
    },
    /// Publishes refreshed statistics over the stored results.
    StatsUpdated {
        /// Freshly computed report.
        report: StatsReport,
    },
    /// Asks the host to open its native share facility.
    ShareRequested {
        /// Identifier of the shared result, when one exists.
        test_id: Option<TestId>,
    },
    /// Transient notice for the operator.
    Notice {
        /// Notice to display.
        notice: Notice,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample_result(grade: PurityGrade) -> TestResult {
        TestResult::new(
            TestId::new("AURA-TEST-00001"),
            grade,
            TestMode::Coin,
            datetime!(2024-03-01 10:15:00 UTC),
            Readings {
                frequency_hz: 612_000,
                amplitude_volts: 0.52,
                q_factor: 81,
            },
        )
    }

    #[test]
    fn screen_parse_rejects_unknown_identifiers() {
        assert_eq!(Screen::parse("records"), Some(Screen::Records));
        assert_eq!(Screen::parse("not-a-real-screen"), None);
    }

    #[test]
    fn phase_boundaries_belong_to_the_later_phase() {
        assert_eq!(Phase::for_progress(0.0), Phase::Initializing);
        assert_eq!(Phase::for_progress(24.9), Phase::Initializing);
        assert_eq!(Phase::for_progress(25.0), Phase::Calibrating);
        assert_eq!(Phase::for_progress(50.0), Phase::Analyzing);
        assert_eq!(Phase::for_progress(75.0), Phase::Finalizing);
        assert_eq!(Phase::for_progress(100.0), Phase::Finalizing);
    }

    #[test]
    fn advance_saturates_and_reports_entered_phase() {
        let (progress, entered) = ScanProgress::start().advance(30.0);
        assert_eq!(entered, Some(Phase::Calibrating));

        let (progress, entered) = progress.advance(5.0);
        assert_eq!(entered, None);

        let (progress, entered) = progress.advance(500.0);
        assert_eq!(entered, Some(Phase::Finalizing));
        assert!(progress.is_complete());
        assert!((progress.value() - PROGRESS_COMPLETE).abs() < f32::EPSILON);
    }

    #[test]
    fn advance_ignores_negative_and_nan_increments() {
        let (progress, _) = ScanProgress::start().advance(10.0);
        assert_eq!(progress.advance(-4.0).0, progress);
        assert_eq!(progress.advance(f32::NAN).0, progress);
    }

    #[test]
    fn sample_type_follows_mode() {
        for mode in TestMode::ALL {
            let result = TestResult::new(
                TestId::new("id"),
                PurityGrade::Karat18,
                mode,
                datetime!(2024-03-01 10:15:00 UTC),
                Readings::default(),
            );
            assert_eq!(result.sample_type().label().to_lowercase(), mode.as_str());
        }
    }

    #[test]
    fn stored_form_uses_camel_case_fields() {
        let json = serde_json::to_value(sample_result(PurityGrade::Karat22)).expect("serialize");
        assert_eq!(json["purityGrade"], "22K");
        assert_eq!(json["percentage"], 91.7);
        assert_eq!(json["confidence"], 95);
        assert_eq!(json["sampleType"], "Coin");
        assert_eq!(json["mode"], "coin");
        assert_eq!(json["qFactor"], 81);
        assert_eq!(json["timestamp"], "2024-03-01T10:15:00Z");
    }

    #[test]
    fn deserialisation_rejects_hybrid_grade_tuples() {
        let mut json = serde_json::to_value(sample_result(PurityGrade::Karat24)).expect("serialize");
        json["confidence"] = serde_json::json!(89);

        let error = serde_json::from_value::<TestResult>(json).expect_err("hybrid tuple");
        assert!(error.to_string().contains("pairs grade 24K"));
    }

    #[test]
    fn signal_quality_is_clamped_to_percent_range() {
        let quality = |q_factor| {
            Readings {
                q_factor,
                ..Readings::default()
            }
            .signal_quality()
        };

        assert_eq!(quality(0), 0);
        assert_eq!(quality(50), 0);
        assert_eq!(quality(51), 2);
        assert_eq!(quality(82), 64);
        assert_eq!(quality(100), 100);
        assert_eq!(quality(140), 100);
    }

    #[test]
    fn grade_tuples_are_distinct() {
        for grade in PurityGrade::ALL {
            assert_eq!(
                PurityGrade::from_tuple(grade.percentage(), grade.confidence()),
                Some(grade)
            );
        }
    }
}
