#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Result generator that grades settled scans.
//!
//! When the world announces [`Event::ScanSettled`] the system draws one grade
//! uniformly from the fixed table, stamps an identifier and completion time,
//! and replies with [`Command::RecordResult`]. The sample type follows the
//! scan's test mode.

use aura_core::{Command, Event, PurityGrade, TestId, TestMode, TestResult};
use aura_system_scanning::sample_readings;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use time::OffsetDateTime;

/// Prefix carried by every generated test identifier.
pub const TEST_ID_PREFIX: &str = "AURA";

const BASE36_DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LENGTH: usize = 5;

/// Pure system that turns settled scans into test results.
#[derive(Debug)]
pub struct Grading {
    rng: ChaCha8Rng,
}

impl Grading {
    /// Creates a grading system seeded for deterministic replay.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
        }
    }

    /// Consumes events and emits one result command per settled scan.
    ///
    /// `now` is used as the completion timestamp of every result produced in
    /// this batch.
    pub fn handle(&mut self, events: &[Event], now: OffsetDateTime, out: &mut Vec<Command>) {
        for event in events {
            if let Event::ScanSettled { mode, readings } = event {
                let readings = readings
                    .unwrap_or_else(|| sample_readings(&mode.reading_ranges(), &mut self.rng));
                let result = self.grade(*mode, now, readings);
                out.push(Command::RecordResult { result });
            }
        }
    }

    fn grade(
        &mut self,
        mode: TestMode,
        now: OffsetDateTime,
        readings: aura_core::Readings,
    ) -> TestResult {
        let grade = PurityGrade::ALL[self.rng.gen_range(0..PurityGrade::ALL.len())];
        let id = generate_test_id(now, &mut self.rng);
        TestResult::new(id, grade, mode, now, readings)
    }
}

/// Generates an identifier of the form `AURA-<millis base36>-<5 random chars>`.
pub fn generate_test_id<R: Rng + ?Sized>(now: OffsetDateTime, rng: &mut R) -> TestId {
    let millis = u128::try_from(now.unix_timestamp_nanos() / 1_000_000).unwrap_or(0);
    let suffix: String = (0..SUFFIX_LENGTH)
        .map(|_| char::from(BASE36_DIGITS[rng.gen_range(0..BASE36_DIGITS.len())]))
        .collect();
    TestId::new(format!("{TEST_ID_PREFIX}-{}-{suffix}", to_base36(millis)))
}

fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_owned();
    }

    let mut digits = Vec::new();
    while value > 0 {
        let digit = usize::try_from(value % 36).unwrap_or(0);
        digits.push(BASE36_DIGITS[digit]);
        value /= 36;
    }
    digits.iter().rev().map(|digit| char::from(*digit)).collect()
}
