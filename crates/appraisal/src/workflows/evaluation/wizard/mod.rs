//! Evaluation wizard: step layout, per-step completeness rules and navigation.
//!
//! Everything here is a pure function of an [`EvaluationDraft`](super::domain::EvaluationDraft)
//! and a [`ReviewContext`](super::domain::ReviewContext), so callers re-run it on every edit.

mod navigation;
mod validator;

pub use navigation::{advance, route, visible_steps, Direction};
pub use validator::{
    check_step, coverage_period, first_incomplete_step, is_step_complete, required_criteria,
    validation_message, IncompleteStep, StepField,
};

use super::domain::Category;
use serde::{Deserialize, Serialize};

/// Wizard pages in display order. Step 1 also carries the administrative fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WizardStep {
    JobKnowledge,
    QualityOfWork,
    Adaptability,
    Teamwork,
    Reliability,
    EthicalBehavior,
    CustomerService,
    ManagerialSkills,
    OverallAssessment,
}

impl WizardStep {
    pub const FIRST: Self = Self::JobKnowledge;
    pub const LAST: Self = Self::OverallAssessment;

    pub const fn ordered() -> [Self; 9] {
        [
            Self::JobKnowledge,
            Self::QualityOfWork,
            Self::Adaptability,
            Self::Teamwork,
            Self::Reliability,
            Self::EthicalBehavior,
            Self::CustomerService,
            Self::ManagerialSkills,
            Self::OverallAssessment,
        ]
    }

    pub const fn number(self) -> u8 {
        match self {
            Self::JobKnowledge => 1,
            Self::QualityOfWork => 2,
            Self::Adaptability => 3,
            Self::Teamwork => 4,
            Self::Reliability => 5,
            Self::EthicalBehavior => 6,
            Self::CustomerService => 7,
            Self::ManagerialSkills => 8,
            Self::OverallAssessment => 9,
        }
    }

    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::JobKnowledge),
            2 => Some(Self::QualityOfWork),
            3 => Some(Self::Adaptability),
            4 => Some(Self::Teamwork),
            5 => Some(Self::Reliability),
            6 => Some(Self::EthicalBehavior),
            7 => Some(Self::CustomerService),
            8 => Some(Self::ManagerialSkills),
            9 => Some(Self::OverallAssessment),
            _ => None,
        }
    }

    /// Rated category shown on this step, if any.
    pub const fn category(self) -> Option<Category> {
        match self {
            Self::JobKnowledge => Some(Category::JobKnowledge),
            Self::QualityOfWork => Some(Category::QualityOfWork),
            Self::Adaptability => Some(Category::Adaptability),
            Self::Teamwork => Some(Category::Teamwork),
            Self::Reliability => Some(Category::Reliability),
            Self::EthicalBehavior => Some(Category::EthicalBehavior),
            Self::CustomerService => Some(Category::CustomerService),
            Self::ManagerialSkills => Some(Category::ManagerialSkills),
            Self::OverallAssessment => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self.category() {
            Some(category) => category.label(),
            None => "Overall Assessment",
        }
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = UnknownStep;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::from_number(number).ok_or(UnknownStep(number))
    }
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> Self {
        step.number()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown wizard step {0} (expected 1..=9)")]
pub struct UnknownStep(pub u8);
