use std::collections::BTreeMap;
use std::io;

use chrono::Datelike;
use serde::Serialize;

use super::repository::EvaluationRecord;
use super::scoring::round_to_tenth;

/// Roll-up of submitted evaluations for one calendar quarter of the coverage end date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterSummary {
    pub period: String,
    pub year: i32,
    pub quarter: u8,
    pub evaluations: usize,
    pub average_overall: f64,
    pub passed: usize,
    pub failed: usize,
    pub approved: usize,
    pub pending_approval: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuarterlyReport {
    pub quarters: Vec<QuarterSummary>,
}

#[derive(Default)]
struct QuarterTally {
    evaluations: usize,
    overall_total: f64,
    passed: usize,
    approved: usize,
}

impl QuarterlyReport {
    /// Build from `(record, approved)` pairs; quarters come out in chronological order.
    pub fn build<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a EvaluationRecord, bool)>,
    {
        let mut tallies: BTreeMap<(i32, u8), QuarterTally> = BTreeMap::new();

        for (record, approved) in entries {
            let key = (record.coverage_to.year(), quarter_of(record.coverage_to.month()));
            let tally = tallies.entry(key).or_default();
            tally.evaluations += 1;
            tally.overall_total += record.scorecard.overall;
            if record.scorecard.passed() {
                tally.passed += 1;
            }
            if approved {
                tally.approved += 1;
            }
        }

        let quarters = tallies
            .into_iter()
            .map(|((year, quarter), tally)| QuarterSummary {
                period: format!("{year}-Q{quarter}"),
                year,
                quarter,
                evaluations: tally.evaluations,
                average_overall: round_to_tenth(tally.overall_total / tally.evaluations as f64),
                passed: tally.passed,
                failed: tally.evaluations - tally.passed,
                approved: tally.approved,
                pending_approval: tally.evaluations - tally.approved,
            })
            .collect();

        Self { quarters }
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), ReportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for summary in &self.quarters {
            csv_writer.serialize(summary)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

fn quarter_of(month: u32) -> u8 {
    ((month - 1) / 3 + 1) as u8
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to encode report csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}
