mod aggregate;
mod labels;
mod weights;

pub use aggregate::{category_average, CategoryAverages};
pub use labels::{PerformanceLabel, ScoreGate, PASS_THRESHOLD};
pub use weights::{category_weight, overall_score, round_to_tenth};

use super::domain::{Category, RatingSheet, ReviewContext};
use serde::{Deserialize, Serialize};

/// One category's contribution, kept on the scorecard for transparent review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLine {
    pub category: Category,
    pub average: f64,
    /// Renormalized weight; `None` for display-only categories.
    pub weight: Option<f64>,
    pub label: PerformanceLabel,
}

/// Derived scoring output for a rating sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub lines: Vec<CategoryLine>,
    pub overall: f64,
    pub label: PerformanceLabel,
    pub gate: ScoreGate,
}

impl Scorecard {
    pub fn from_sheet(sheet: &RatingSheet, context: ReviewContext) -> Self {
        let averages = CategoryAverages::from_sheet(sheet, context);
        Self::from_averages(&averages)
    }

    pub fn from_averages(averages: &CategoryAverages) -> Self {
        let lines = averages
            .iter()
            .map(|(category, average)| CategoryLine {
                category,
                average,
                weight: weights::effective_weight(category, averages),
                label: PerformanceLabel::for_score(average),
            })
            .collect();

        let overall = overall_score(averages);

        Self {
            lines,
            overall,
            label: PerformanceLabel::for_score(overall),
            gate: ScoreGate::for_overall(overall),
        }
    }

    pub fn line(&self, category: Category) -> Option<&CategoryLine> {
        self.lines.iter().find(|line| line.category == category)
    }

    pub fn passed(&self) -> bool {
        self.gate.passed()
    }
}
