#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Aggregate statistics over the stored test results.

use aura_core::{Event, StatsReport, TestResult};

/// Computes the statistics report for the provided records.
///
/// The average purity is rounded to one decimal and is zero when no records
/// exist.
#[must_use]
pub fn summarize(records: &[TestResult]) -> StatsReport {
    let mut report = StatsReport {
        total_tests: records.len(),
        ..StatsReport::default()
    };

    if records.is_empty() {
        return report;
    }

    let mut total_purity = 0.0;
    for record in records {
        total_purity += record.percentage();
        *report.per_grade.entry(record.grade()).or_insert(0) += 1;
        *report.per_mode.entry(record.mode()).or_insert(0) += 1;
    }

    let mean = total_purity / records.len() as f64;
    report.average_purity = (mean * 10.0).round() / 10.0;
    report
}

/// Pure analytics system that republishes statistics when the record set changes.
#[derive(Debug, Default)]
pub struct Analytics {
    last_report: Option<StatsReport>,
    refresh_pending: bool,
}

impl Analytics {
    /// Creates a new analytics system with no cached report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last report published by the system, if any.
    #[must_use]
    pub fn last_report(&self) -> Option<&StatsReport> {
        self.last_report.as_ref()
    }

    /// Queues a recompute for the next call to [`Analytics::handle`].
    pub fn request_refresh(&mut self) {
        self.refresh_pending = true;
    }

    /// Consumes world events and republishes statistics at most once per call.
    ///
    /// `records` must already include every result announced by the provided
    /// events.
    pub fn handle(&mut self, events: &[Event], records: &[TestResult], out: &mut Vec<Event>) {
        let recorded = events
            .iter()
            .any(|event| matches!(event, Event::ResultRecorded { .. }));

        if !recorded && !self.refresh_pending {
            return;
        }
        self.refresh_pending = false;

        let report = summarize(records);
        if self.last_report.as_ref() == Some(&report) {
            return;
        }

        self.last_report = Some(report.clone());
        out.push(Event::StatsUpdated { report });
    }
}
