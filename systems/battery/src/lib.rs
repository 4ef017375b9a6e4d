#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulated battery drain for the handheld analyzer.

use std::time::Duration;

use aura_core::{Command, Event};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Simulated time between two battery drains.
pub const DRAIN_INTERVAL: Duration = Duration::from_secs(30);
/// Upper bound (exclusive) of a single drain in percentage points.
pub const MAX_DRAIN: f32 = 0.5;

/// Configuration parameters required to construct the battery system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    drain_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration using the standard drain cadence.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            drain_interval: DRAIN_INTERVAL,
            rng_seed,
        }
    }
}

/// Pure system that emits periodic drain commands as time advances.
#[derive(Debug)]
pub struct Battery {
    drain_interval: Duration,
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl Battery {
    /// Creates a new battery system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            drain_interval: config.drain_interval,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and emits one drain command per elapsed interval.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        if self.drain_interval.is_zero() {
            return;
        }

        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.accumulator = self.accumulator.saturating_add(*dt);
            }
        }

        while self.accumulator >= self.drain_interval {
            self.accumulator -= self.drain_interval;
            let amount = self.rng.gen_range(0.0..MAX_DRAIN);
            out.push(Command::DrainBattery { amount });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elapsed(dt: Duration) -> [Event; 1] {
        [Event::TimeAdvanced { dt }]
    }

    #[test]
    fn drains_once_per_interval() {
        let mut battery = Battery::new(Config::new(4));
        let mut commands = Vec::new();

        battery.handle(&elapsed(Duration::from_secs(29)), &mut commands);
        assert!(commands.is_empty());

        battery.handle(&elapsed(Duration::from_secs(62)), &mut commands);
        assert_eq!(commands.len(), 3);
    }

    #[test]
    fn drain_amounts_stay_below_limit() {
        let mut battery = Battery::new(Config::new(17));
        let mut commands = Vec::new();
        battery.handle(&elapsed(DRAIN_INTERVAL * 300), &mut commands);

        assert_eq!(commands.len(), 300);
        for command in commands {
            let Command::DrainBattery { amount } = command else {
                panic!("unexpected command emitted: {command:?}");
            };
            assert!((0.0..MAX_DRAIN).contains(&amount));
        }
    }
}
