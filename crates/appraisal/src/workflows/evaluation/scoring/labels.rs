use serde::{Deserialize, Serialize};

/// Overall scores at or above this value pass.
pub const PASS_THRESHOLD: f64 = 3.0;

/// Qualitative band for a category average or overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLabel {
    Unsatisfactory,
    NeedsImprovement,
    MeetsExpectations,
    ExceedsExpectations,
    Outstanding,
}

impl PerformanceLabel {
    pub fn for_score(score: f64) -> Self {
        if score >= 4.5 {
            Self::Outstanding
        } else if score >= 4.0 {
            Self::ExceedsExpectations
        } else if score >= 3.5 {
            Self::MeetsExpectations
        } else if score >= 2.5 {
            Self::NeedsImprovement
        } else {
            Self::Unsatisfactory
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Outstanding => "Outstanding",
            Self::ExceedsExpectations => "Exceeds Expectations",
            Self::MeetsExpectations => "Meets Expectations",
            Self::NeedsImprovement => "Needs Improvement",
            Self::Unsatisfactory => "Unsatisfactory",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreGate {
    Pass,
    Fail,
}

impl ScoreGate {
    pub fn for_overall(overall: f64) -> Self {
        if overall >= PASS_THRESHOLD {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }

    pub const fn passed(self) -> bool {
        matches!(self, Self::Pass)
    }
}
