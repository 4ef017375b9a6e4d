use aura_core::{
    Notice, NoticeLevel, Phase, PurityGrade, Readings, ScanProgress, ScanSnapshot, ScanStage,
    Screen, StatsReport, TestId, TestMode, TestResult,
};
use aura_rendering::{render, Frame, Presenter, WriterPresenter};
use time::macros::datetime;

fn sample_result() -> TestResult {
    TestResult::new(
        TestId::new("AURA-LOYW3V28-7Q2XK"),
        PurityGrade::Karat18,
        TestMode::Coin,
        datetime!(2023-11-14 22:13:20 UTC),
        Readings {
            frequency_hz: 651_234,
            amplitude_volts: 0.48,
            q_factor: 77,
        },
    )
}

#[test]
fn dashboard_shows_stats_and_selected_mode() {
    let mut frame = Frame::new(Screen::Dashboard);
    frame.test_mode = TestMode::Bar;
    frame.battery_level = 87.0;
    frame.stats = StatsReport {
        total_tests: 3,
        average_purity: 83.3,
        ..StatsReport::default()
    };

    let text = render(&frame);
    assert!(text.contains("battery 87%"));
    assert!(text.contains("Total tests: 3"));
    assert!(text.contains("Average purity: 83.3%"));
    assert!(text.contains("jewelry coin [bar] artefact"));
}

#[test]
fn scanning_screen_shows_phase_steps_and_readings() {
    let (progress, _) = ScanProgress::start().advance(60.0);
    let mut frame = Frame::new(Screen::Scanning);
    frame.scan = Some(ScanSnapshot {
        mode: TestMode::Jewelry,
        progress,
        readings: Some(Readings {
            frequency_hz: 700_001,
            amplitude_volts: 0.5,
            q_factor: 80,
        }),
        stage: ScanStage::Sampling,
    });

    let text = render(&frame);
    assert!(text.contains("60%"));
    assert!(text.contains("[x] 2. Calibrating Sensors"));
    assert!(text.contains("[>] 3. Analyzing Sample"));
    assert!(text.contains(Phase::Analyzing.description()));
    assert!(text.contains("Frequency: 700001 Hz"));
    assert!(text.contains("Amplitude: 0.50 V"));
    assert!(text.contains("Q-Factor: 80  (signal quality 60%)"));
}

#[test]
fn certificate_lists_the_latest_result() {
    let mut frame = Frame::new(Screen::Certificate);
    frame.last_result = Some(sample_result());

    let text = render(&frame);
    assert!(text.contains("Certificate ID: AURA-LOYW3V28-7Q2XK"));
    assert!(text.contains("Issued: 2023-11-14 22:13:20 UTC"));
    assert!(text.contains("Purity grade: 18K Gold"));
    assert!(text.contains("Confidence: 92%"));
    assert!(text.contains("Sample type: Coin"));
}

#[test]
fn records_screen_handles_empty_history() {
    assert!(render(&Frame::new(Screen::Records)).contains("No test records yet."));

    let mut frame = Frame::new(Screen::Records);
    frame.records = vec![sample_result()];
    let text = render(&frame);
    let row = text
        .lines()
        .find(|line| line.contains("AURA-LOYW3V28-7Q2XK"))
        .expect("record row");
    assert!(row.starts_with("2023-11-14 22:13:20"));
    assert!(row.contains("18K Gold"));
    assert!(row.contains("Coin"));
    assert!(row.trim_end().ends_with("coin"), "row ends with the mode: {row}");
}

#[test]
fn banner_comes_from_the_frame() {
    let mut frame = Frame::new(Screen::About);
    frame.banner = "AURA Field Unit";
    let text = render(&frame);
    assert!(text.contains("AURA Field Unit\n"));

    frame.screen = Screen::Dashboard;
    assert!(render(&frame).contains("AURA Field Unit\n"));
}

#[test]
fn scanning_without_readings_shows_placeholders() {
    let mut frame = Frame::new(Screen::Scanning);
    frame.scan = Some(ScanSnapshot {
        mode: TestMode::Coin,
        progress: ScanProgress::start(),
        readings: None,
        stage: ScanStage::Sampling,
    });
    assert!(render(&frame).contains("Q-Factor: --  (signal quality --%)"));
}

#[test]
fn writer_presenter_emits_frames_and_notices() {
    let mut presenter = WriterPresenter::new(Vec::new());
    presenter.present(&Frame::new(Screen::About)).unwrap();
    presenter
        .notify(&Notice::new(NoticeLevel::Success, "Test completed successfully!"))
        .unwrap();

    let output = String::from_utf8(presenter.into_inner()).unwrap();
    assert!(output.starts_with("== About AURA =="));
    assert!(output.ends_with("[ok] Test completed successfully!\n"));
}

#[test]
fn stats_breakdown_lists_grades_and_modes() {
    let mut report = StatsReport {
        total_tests: 2,
        average_purity: 95.8,
        ..StatsReport::default()
    };
    let _ = report.per_grade.insert(PurityGrade::Karat24, 1);
    let _ = report.per_grade.insert(PurityGrade::Karat22, 1);
    let _ = report.per_mode.insert(TestMode::Coin, 2);

    let text = aura_rendering::render_stats(&report);
    assert!(text.contains("Average purity: 95.8%"));
    assert!(text.contains("24K Gold"));
    assert!(text.contains("coin"));
}
