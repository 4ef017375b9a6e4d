use std::time::Duration;

use aura_core::{
    Command, Event, PurityGrade, Readings, ScanStage, Screen, StartRejection, TestId, TestMode,
    TestResult,
};
use aura_world::{self as world, query, World, RESULT_PRESENT_DELAY, SETTLE_DELAY};
use time::macros::datetime;

fn apply_all(world: &mut World, commands: impl IntoIterator<Item = Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn show(name: &str) -> Option<Command> {
    Screen::parse(name).map(|screen| Command::ShowScreen { screen })
}

fn settle(world: &mut World) {
    let _ = apply_all(
        world,
        [
            Command::AdvanceScan {
                increment: 100.0,
                readings: None,
            },
            Command::Tick { dt: SETTLE_DELAY },
        ],
    );
}

fn result(mode: TestMode) -> TestResult {
    TestResult::new(
        TestId::new("AURA-LX0Q1Z2-ABCDE"),
        PurityGrade::Karat18,
        mode,
        datetime!(2024-05-06 07:08:09 UTC),
        Readings::default(),
    )
}

#[test]
fn go_back_from_records_returns_to_dashboard() {
    let mut world = World::new();
    let commands: Vec<Command> = show("records").into_iter().collect();
    let _ = apply_all(&mut world, commands);
    assert_eq!(query::screen(&world), Screen::Records);

    let events = apply_all(&mut world, [Command::GoBack]);
    assert_eq!(query::screen(&world), Screen::Dashboard);
    assert_eq!(
        events,
        vec![Event::ScreenChanged {
            from: Screen::Records,
            to: Screen::Dashboard,
        }]
    );
}

#[test]
fn unknown_screen_leaves_current_screen_unchanged() {
    let mut world = World::new();
    let commands: Vec<Command> = show("about").into_iter().collect();
    let _ = apply_all(&mut world, commands);

    let commands: Vec<Command> = show("not-a-real-screen").into_iter().collect();
    assert!(commands.is_empty(), "unknown identifiers produce no command");
    let events = apply_all(&mut world, commands);

    assert!(events.is_empty());
    assert_eq!(query::screen(&world), Screen::About);
}

#[test]
fn back_never_returns_to_a_previous_non_dashboard_screen() {
    let mut world = World::new();
    let _ = apply_all(
        &mut world,
        [
            Command::ShowScreen {
                screen: Screen::Records,
            },
            Command::ShowScreen {
                screen: Screen::About,
            },
            Command::GoBack,
        ],
    );
    assert_eq!(query::screen(&world), Screen::Dashboard);
}

#[test]
fn second_start_is_refused_while_scanning() {
    let mut world = World::new();
    let _ = apply_all(
        &mut world,
        [
            Command::StartTest,
            Command::AdvanceScan {
                increment: 12.0,
                readings: None,
            },
        ],
    );
    let before = query::scan(&world).expect("session");

    let events = apply_all(&mut world, [Command::StartTest]);
    assert_eq!(
        events,
        vec![Event::StartRejected {
            reason: StartRejection::AlreadyRunning,
        }]
    );
    assert_eq!(query::scan(&world), Some(before), "session left untouched");
}

#[test]
fn navigating_away_cancels_scan_and_stops_progress() {
    let mut world = World::new();
    let _ = apply_all(
        &mut world,
        [
            Command::StartTest,
            Command::AdvanceScan {
                increment: 40.0,
                readings: None,
            },
        ],
    );

    let events = apply_all(&mut world, [Command::GoBack]);
    assert!(events.contains(&Event::ScanCancelled));
    assert!(query::scan(&world).is_none());

    let events = apply_all(
        &mut world,
        [
            Command::AdvanceScan {
                increment: 60.0,
                readings: None,
            },
            Command::Tick { dt: SETTLE_DELAY },
        ],
    );
    assert_eq!(
        events,
        vec![Event::TimeAdvanced { dt: SETTLE_DELAY }],
        "stale progress and timers must not fire"
    );
}

#[test]
fn cancelling_during_settle_drops_the_queued_completion() {
    let mut world = World::new();
    let _ = apply_all(
        &mut world,
        [
            Command::StartTest,
            Command::AdvanceScan {
                increment: 100.0,
                readings: None,
            },
            Command::ShowScreen {
                screen: Screen::Records,
            },
        ],
    );

    let events = apply_all(&mut world, [Command::Tick { dt: SETTLE_DELAY }]);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ScanSettled { .. })));
}

#[test]
fn completion_is_reported_exactly_once() {
    let mut world = World::new();
    let events = apply_all(
        &mut world,
        [
            Command::StartTest,
            Command::AdvanceScan {
                increment: 100.0,
                readings: None,
            },
            Command::AdvanceScan {
                increment: 100.0,
                readings: None,
            },
        ],
    );

    let finished = events
        .iter()
        .filter(|event| matches!(event, Event::SamplingFinished))
        .count();
    assert_eq!(finished, 1);
}

#[test]
fn recorded_result_presents_results_screen_after_delay() {
    let mut world = World::new();
    let _ = apply_all(&mut world, [Command::StartTest]);
    settle(&mut world);
    assert_eq!(
        query::scan(&world).expect("session").stage,
        ScanStage::AwaitingResult
    );

    let recorded = result(TestMode::Jewelry);
    let events = apply_all(
        &mut world,
        [Command::RecordResult {
            result: recorded.clone(),
        }],
    );
    assert_eq!(
        events,
        vec![Event::ResultRecorded {
            result: recorded.clone()
        }]
    );
    assert!(query::scan(&world).is_none());
    assert_eq!(query::screen(&world), Screen::Scanning);
    assert!(query::presentation_pending(&world));

    let _ = apply_all(
        &mut world,
        [Command::Tick {
            dt: RESULT_PRESENT_DELAY - Duration::from_millis(1),
        }],
    );
    assert_eq!(query::screen(&world), Screen::Scanning);

    let events = apply_all(
        &mut world,
        [Command::Tick {
            dt: Duration::from_millis(1),
        }],
    );
    assert_eq!(query::screen(&world), Screen::Results);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::Notice { notice } if notice.message == "Test completed successfully!"
    )));
    assert_eq!(query::last_result(&world), Some(&recorded));
}

#[test]
fn results_are_ignored_without_a_settled_scan() {
    let mut world = World::new();
    let events = apply_all(
        &mut world,
        [Command::RecordResult {
            result: result(TestMode::Coin),
        }],
    );
    assert!(events.is_empty());
    assert!(query::last_result(&world).is_none());
}

#[test]
fn generate_certificate_shows_certificate_screen() {
    let mut world = World::new();
    let _ = apply_all(&mut world, [Command::GenerateCertificate]);
    assert_eq!(query::screen(&world), Screen::Certificate);
}
