#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic progress simulator that drives an active scan.
//!
//! The system accumulates simulated time from [`Event::TimeAdvanced`] and, for
//! every elapsed tick period, emits one [`Command::AdvanceScan`] carrying a
//! random progress increment. While the scan sits in [`Phase::Analyzing`] each
//! step also carries freshly drawn instrument readings. The world owns the
//! authoritative progress; the system mirrors it locally so a burst of ticks
//! delivered in one batch stops exactly at completion.

use std::time::Duration;

use aura_core::{Command, Event, Phase, ReadingRanges, Readings, ScanSnapshot, ScanStage};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Period between two progress steps.
pub const SCAN_TICK_INTERVAL: Duration = Duration::from_millis(300);
/// Largest progress increment drawn for a single step.
pub const MAX_PROGRESS_INCREMENT: f32 = 8.0;

/// Configuration parameters required to construct the scanning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    tick_interval: Duration,
    max_increment: f32,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration using the standard cadence and the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            tick_interval: SCAN_TICK_INTERVAL,
            max_increment: MAX_PROGRESS_INCREMENT,
            rng_seed,
        }
    }

    /// Period between two progress steps.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

/// Pure system that emits progress steps for the active scan.
#[derive(Debug)]
pub struct Scanning {
    tick_interval: Duration,
    max_increment: f32,
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl Scanning {
    /// Creates a new scanning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tick_interval: config.tick_interval,
            max_increment: config.max_increment,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and the current scan snapshot to emit progress commands.
    pub fn handle(&mut self, events: &[Event], scan: Option<&ScanSnapshot>, out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::ScanStarted { .. } | Event::ScanCancelled => {
                    self.accumulator = Duration::ZERO;
                    accumulated = Duration::ZERO;
                }
                Event::TimeAdvanced { dt } => {
                    accumulated = accumulated.saturating_add(*dt);
                }
                _ => {}
            }
        }

        let Some(scan) = scan.filter(|scan| scan.stage == ScanStage::Sampling) else {
            self.accumulator = Duration::ZERO;
            return;
        };

        if self.tick_interval.is_zero() || accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let ranges = scan.mode.reading_ranges();
        let mut progress = scan.progress;

        while self.accumulator >= self.tick_interval {
            self.accumulator -= self.tick_interval;

            let readings =
                (progress.phase() == Phase::Analyzing).then(|| sample_readings(&ranges, &mut self.rng));
            let increment = self.next_increment();
            progress = progress.advance(increment).0;
            out.push(Command::AdvanceScan {
                increment,
                readings,
            });

            if progress.is_complete() {
                self.accumulator = Duration::ZERO;
                break;
            }
        }
    }

    fn next_increment(&mut self) -> f32 {
        if self.max_increment <= 0.0 {
            return 0.0;
        }
        // Draw from (0, max] so every step makes progress.
        self.max_increment - self.rng.gen_range(0.0..self.max_increment)
    }
}

/// Draws one set of readings uniformly from the provided ranges.
///
/// Amplitude is rounded to two decimals, the precision the instrument shows.
pub fn sample_readings<R: Rng + ?Sized>(ranges: &ReadingRanges, rng: &mut R) -> Readings {
    let amplitude = rng.gen_range(ranges.amplitude_volts.clone());
    Readings {
        frequency_hz: rng.gen_range(ranges.frequency_hz.clone()),
        amplitude_volts: (amplitude * 100.0).round() / 100.0,
        q_factor: rng.gen_range(ranges.q_factor.clone()),
    }
}
