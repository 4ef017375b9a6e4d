#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Plain-text presentation of the analyzer screens.
//!
//! Adapters gather a [`Frame`] from world queries and the record store, then
//! hand it to a [`Presenter`]. Rendering itself is pure so screens can be
//! asserted on in tests.

use std::{fmt::Write as _, io::Write};

use anyhow::{Context, Result as AnyResult};
use aura_core::{
    Notice, NoticeLevel, Phase, Readings, ScanSnapshot, ScanStage, Screen, StatsReport, TestMode,
    TestResult, PROGRESS_COMPLETE, WELCOME_BANNER,
};
use aura_system_export::format_date;

/// Number of cells in the textual progress bar.
pub const PROGRESS_BAR_WIDTH: usize = 20;

const RULE: &str = "----------------------------------------";

/// Immutable snapshot of everything a screen may display.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Banner shown on the dashboard and about screens.
    pub banner: &'static str,
    /// Screen currently visible.
    pub screen: Screen,
    /// Whether the side menu is open.
    pub menu_open: bool,
    /// Mode selected for the next test.
    pub test_mode: TestMode,
    /// Simulated battery level in percent.
    pub battery_level: f32,
    /// Active scan session, if any.
    pub scan: Option<ScanSnapshot>,
    /// Latest completed result of this session.
    pub last_result: Option<TestResult>,
    /// Statistics over the stored records.
    pub stats: StatsReport,
    /// Stored records in display order.
    pub records: Vec<TestResult>,
}

impl Frame {
    /// Creates a frame for the provided screen with no session data.
    #[must_use]
    pub fn new(screen: Screen) -> Self {
        Self {
            banner: WELCOME_BANNER,
            screen,
            menu_open: false,
            test_mode: TestMode::default(),
            battery_level: 0.0,
            scan: None,
            last_result: None,
            stats: StatsReport::default(),
            records: Vec::new(),
        }
    }
}

/// Sink that displays rendered frames and notices.
pub trait Presenter {
    /// Displays the provided frame.
    fn present(&mut self, frame: &Frame) -> AnyResult<()>;

    /// Displays a transient notice.
    fn notify(&mut self, notice: &Notice) -> AnyResult<()>;

    /// Displays preformatted text such as a report.
    fn print(&mut self, text: &str) -> AnyResult<()>;
}

/// Presenter that writes rendered text into any [`Write`] sink.
#[derive(Debug)]
pub struct WriterPresenter<W> {
    writer: W,
}

impl<W: Write> WriterPresenter<W> {
    /// Wraps the provided writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Presenter for WriterPresenter<W> {
    fn present(&mut self, frame: &Frame) -> AnyResult<()> {
        self.writer
            .write_all(render(frame).as_bytes())
            .context("failed to write frame")?;
        self.writer.flush().context("failed to flush frame")
    }

    fn notify(&mut self, notice: &Notice) -> AnyResult<()> {
        writeln!(self.writer, "{}", render_notice(notice)).context("failed to write notice")
    }

    fn print(&mut self, text: &str) -> AnyResult<()> {
        self.writer
            .write_all(text.as_bytes())
            .context("failed to write text")
    }
}

/// Renders a notice as a single line tagged with its level.
#[must_use]
pub fn render_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warn",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.message)
}

/// Renders the visible screen of the frame.
#[must_use]
pub fn render(frame: &Frame) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "== {} ==  battery {:.0}%",
        frame.screen.title(),
        frame.battery_level
    );
    if frame.menu_open {
        text.push_str(&render_menu(frame.screen));
    }

    let body = match frame.screen {
        Screen::Dashboard => render_dashboard(frame),
        Screen::Scanning => render_scanning(frame.scan.as_ref()),
        Screen::Results => render_results(frame.last_result.as_ref()),
        Screen::Certificate => render_certificate(frame.last_result.as_ref()),
        Screen::Records => render_records(&frame.records),
        Screen::About => render_about(frame.banner),
    };
    text.push_str(&body);
    text
}

/// Renders the aggregate statistics with per-grade and per-mode breakdowns.
#[must_use]
pub fn render_stats(report: &StatsReport) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Total tests: {}", report.total_tests);
    let _ = writeln!(text, "Average purity: {:.1}%", report.average_purity);
    for (grade, count) in &report.per_grade {
        let _ = writeln!(text, "  {:<8} {count}", grade.label());
    }
    for (mode, count) in &report.per_mode {
        let _ = writeln!(text, "  {:<8} {count}", mode.as_str());
    }
    text
}

fn render_menu(current: Screen) -> String {
    let mut text = String::from("Menu:\n");
    for screen in [Screen::Dashboard, Screen::Records, Screen::About] {
        let marker = if screen == current { '>' } else { ' ' };
        let _ = writeln!(text, " {marker} {}", screen.title());
    }
    text.push_str(RULE);
    text.push('\n');
    text
}

fn render_dashboard(frame: &Frame) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{}", frame.banner);
    let _ = writeln!(text, "Total tests: {}", frame.stats.total_tests);
    let _ = writeln!(text, "Average purity: {:.1}%", frame.stats.average_purity);

    text.push_str("Test mode:");
    for mode in TestMode::ALL {
        if mode == frame.test_mode {
            let _ = write!(text, " [{mode}]");
        } else {
            let _ = write!(text, " {mode}");
        }
    }
    text.push('\n');
    text
}

fn render_scanning(scan: Option<&ScanSnapshot>) -> String {
    let Some(scan) = scan else {
        return String::from("No scan in progress.\n");
    };

    let mut text = String::new();
    let value = scan.progress.value();
    let _ = writeln!(text, "{} {value:.0}%", progress_bar(value));

    let current = scan.progress.phase();
    for phase in Phase::ALL {
        let marker = if phase < current || scan.progress.is_complete() {
            'x'
        } else if phase == current {
            '>'
        } else {
            ' '
        };
        let _ = writeln!(text, "[{marker}] {}. {}", phase.index(), phase.title());
    }
    let _ = writeln!(text, "{}", current.description());
    text.push_str(&render_readings(scan.readings));

    match scan.stage {
        ScanStage::Sampling => {}
        ScanStage::Settling { .. } => text.push_str("Scan complete, settling...\n"),
        ScanStage::AwaitingResult => text.push_str("Computing purity grade...\n"),
    }
    text
}

fn progress_bar(value: f32) -> String {
    let ratio = (value / PROGRESS_COMPLETE).clamp(0.0, 1.0);
    let filled = ((ratio * PROGRESS_BAR_WIDTH as f32).round() as usize).min(PROGRESS_BAR_WIDTH);
    format!(
        "[{}{}]",
        "#".repeat(filled),
        ".".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

fn render_readings(readings: Option<Readings>) -> String {
    match readings {
        Some(readings) => format!(
            "Frequency: {} Hz\nAmplitude: {:.2} V\nQ-Factor: {}  (signal quality {}%)\n",
            readings.frequency_hz,
            readings.amplitude_volts,
            readings.q_factor,
            readings.signal_quality()
        ),
        None => String::from(
            "Frequency: -- Hz\nAmplitude: -- V\nQ-Factor: --  (signal quality --%)\n",
        ),
    }
}

fn render_results(result: Option<&TestResult>) -> String {
    let Some(result) = result else {
        return String::from("No test has been completed yet.\n");
    };

    let mut text = String::new();
    let _ = writeln!(text, "Purity: {}", result.grade().label());
    let _ = writeln!(text, "Gold content: {}%", result.percentage());
    let _ = writeln!(text, "Confidence: {}", result.confidence());
    let _ = writeln!(text, "Sample type: {}", result.sample_type());
    let _ = writeln!(text, "Test ID: {}", result.id());
    let _ = writeln!(text, "Date: {}", format_date(result.timestamp()));
    text.push_str(&render_readings(Some(result.readings())));
    text
}

fn render_certificate(result: Option<&TestResult>) -> String {
    let Some(result) = result else {
        return String::from("No certificate available.\n");
    };

    let mut text = String::new();
    let _ = writeln!(text, "{RULE}");
    let _ = writeln!(text, "AURA Gold Purity Certificate");
    let _ = writeln!(text, "{RULE}");
    let _ = writeln!(text, "Certificate ID: {}", result.id());
    let _ = writeln!(text, "Issued: {} UTC", format_date(result.timestamp()));
    let _ = writeln!(text, "Purity grade: {}", result.grade().label());
    let _ = writeln!(text, "Gold content: {}%", result.percentage());
    let _ = writeln!(text, "Confidence: {}%", result.confidence());
    let _ = writeln!(text, "Sample type: {}", result.sample_type());
    let _ = writeln!(text, "Test mode: {}", result.mode());
    text.push_str(&render_readings(Some(result.readings())));
    let _ = writeln!(text, "{RULE}");
    text
}

fn render_records(records: &[TestResult]) -> String {
    if records.is_empty() {
        return String::from("No test records yet.\n");
    }

    let mut text = String::new();
    for record in records {
        let _ = writeln!(
            text,
            "{}  {}  {:<8}  {:>5}%  {:<8}  {}",
            format_date(record.timestamp()),
            record.id(),
            record.grade().label(),
            record.percentage(),
            record.sample_type().label(),
            record.mode().as_str()
        );
    }
    text
}

fn render_about(banner: &str) -> String {
    format!(
        "{banner}\n\
         Non-destructive gold purity testing by electromagnetic resonance.\n\
         Version {}\n",
        env!("CARGO_PKG_VERSION")
    )
}
