use std::collections::HashSet;

use aura_core::{Command, Event, PurityGrade, Readings, SampleType, TestMode, TestResult};
use aura_system_grading::Grading;
use time::macros::datetime;

fn settle(grading: &mut Grading, mode: TestMode, readings: Option<Readings>) -> Vec<TestResult> {
    let mut commands = Vec::new();
    grading.handle(
        &[Event::ScanSettled { mode, readings }],
        datetime!(2024-02-29 12:00:00 UTC),
        &mut commands,
    );
    commands
        .into_iter()
        .map(|command| match command {
            Command::RecordResult { result } => result,
            other => panic!("unexpected command emitted: {other:?}"),
        })
        .collect()
}

#[test]
fn emits_one_result_per_settled_scan() {
    let mut grading = Grading::new(11);
    let mut commands = Vec::new();
    grading.handle(
        &[
            Event::SamplingFinished,
            Event::ScanSettled {
                mode: TestMode::Coin,
                readings: None,
            },
        ],
        datetime!(2024-02-29 12:00:00 UTC),
        &mut commands,
    );
    assert_eq!(commands.len(), 1);

    grading.handle(&[Event::ScanCancelled], datetime!(2024-02-29 12:00:00 UTC), &mut commands);
    assert_eq!(commands.len(), 1, "only settled scans are graded");
}

#[test]
fn grade_tuples_are_never_mixed() {
    let mut grading = Grading::new(0xfeed);
    let mut seen = HashSet::new();

    for _ in 0..400 {
        for result in settle(&mut grading, TestMode::Bar, None) {
            let grade = result.grade();
            assert_eq!(result.percentage(), grade.percentage());
            assert_eq!(result.confidence(), grade.confidence());
            assert_eq!(
                PurityGrade::from_tuple(result.percentage(), result.confidence()),
                Some(grade)
            );
            let _ = seen.insert(grade);
        }
    }

    assert_eq!(seen.len(), PurityGrade::ALL.len(), "every grade is reachable");
}

#[test]
fn jewelry_mode_records_jewelry_samples() {
    let mut grading = Grading::new(21);
    let results = settle(&mut grading, TestMode::Jewelry, None);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].sample_type(), SampleType::Jewelry);
    assert_eq!(results[0].mode(), TestMode::Jewelry);
}

#[test]
fn captured_readings_are_carried_unchanged() {
    let readings = Readings {
        frequency_hz: 731_204,
        amplitude_volts: 0.66,
        q_factor: 83,
    };
    let mut grading = Grading::new(8);
    let results = settle(&mut grading, TestMode::Jewelry, Some(readings));
    assert_eq!(results[0].readings(), readings);
}

#[test]
fn missing_readings_are_drawn_from_mode_ranges() {
    let mut grading = Grading::new(8);
    let ranges = TestMode::Artefact.reading_ranges();
    let results = settle(&mut grading, TestMode::Artefact, None);
    let readings = results[0].readings();

    assert!(ranges.frequency_hz.contains(&readings.frequency_hz));
    assert!(ranges.q_factor.contains(&readings.q_factor));
}

#[test]
fn identifiers_do_not_repeat_within_a_session() {
    let mut grading = Grading::new(99);
    let mut ids = HashSet::new();
    for _ in 0..200 {
        for result in settle(&mut grading, TestMode::Coin, None) {
            assert!(ids.insert(result.id().clone()), "duplicate id generated");
        }
    }
}
