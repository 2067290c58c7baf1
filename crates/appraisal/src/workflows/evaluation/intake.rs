//! Boundary normalization of raw form payloads.
//!
//! Browsers send criterion scores as numbers, numeric strings, empty strings, `0` or
//! `null` depending on the widget. Everything is funneled into `Option<Rating>` here so the
//! scoring and wizard code never sees untyped input.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    Category, EmployeeDetails, EvaluationDraft, EvaluatorDetails, OverallAssessment, Rating,
    RatingError, RatingSheet, ReviewType,
};

/// Loosely typed criterion score as received from a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScore {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl RawScore {
    pub fn normalize(&self) -> Result<Option<Rating>, RatingError> {
        match self {
            RawScore::Integer(value) => Rating::from_raw(*value),
            RawScore::Decimal(value) => {
                if value.fract() != 0.0 || !value.is_finite() {
                    return Err(RatingError::InvalidScoreValue {
                        value: value.to_string(),
                    });
                }
                Rating::from_raw(*value as i64)
            }
            RawScore::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                let value = trimmed
                    .parse::<i64>()
                    .map_err(|_| RatingError::InvalidScoreValue {
                        value: text.clone(),
                    })?;
                Rating::from_raw(value)
            }
        }
    }
}

/// Wire shape of an evaluation draft before score normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftPayload {
    pub employee: EmployeeDetails,
    pub evaluator: EvaluatorDetails,
    pub supervisor: String,
    pub review_types: BTreeSet<ReviewType>,
    pub other_review_type: Option<String>,
    pub coverage_from: Option<NaiveDate>,
    pub coverage_to: Option<NaiveDate>,
    pub ratings: BTreeMap<Category, Vec<Option<RawScore>>>,
    pub assessment: OverallAssessment,
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("{category} criterion {criterion}: {source}")]
    InvalidScore {
        category: Category,
        criterion: usize,
        source: RatingError,
    },
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error("an employee id is required to store an evaluation draft")]
    MissingEmployeeId,
}

impl DraftPayload {
    /// Fail fast on the first malformed score; never clamps.
    pub fn normalize(self) -> Result<EvaluationDraft, IntakeError> {
        let mut ratings = RatingSheet::new();
        for (category, slots) in &self.ratings {
            if slots.len() > category.slot_count() {
                return Err(RatingError::UnknownCriterion {
                    category: *category,
                    criterion: slots.len(),
                    slots: category.slot_count(),
                }
                .into());
            }

            for (index, raw) in slots.iter().enumerate() {
                let criterion = index + 1;
                let Some(raw) = raw else { continue };
                let score = raw
                    .normalize()
                    .map_err(|source| IntakeError::InvalidScore {
                        category: *category,
                        criterion,
                        source,
                    })?;
                if score.is_some() {
                    ratings.set(*category, criterion, score)?;
                }
            }
        }

        Ok(EvaluationDraft {
            employee: self.employee,
            evaluator: self.evaluator,
            supervisor: self.supervisor,
            review_types: self.review_types,
            other_review_type: self.other_review_type,
            coverage_from: self.coverage_from,
            coverage_to: self.coverage_to,
            ratings,
            assessment: self.assessment,
        })
    }
}

impl From<EvaluationDraft> for DraftPayload {
    fn from(draft: EvaluationDraft) -> Self {
        let ratings = Category::ordered()
            .into_iter()
            .map(|category| {
                let slots = draft
                    .ratings
                    .scores(category)
                    .into_iter()
                    .map(|score| score.map(|rating| RawScore::Integer(i64::from(rating.value()))))
                    .collect();
                (category, slots)
            })
            .collect();

        Self {
            employee: draft.employee,
            evaluator: draft.evaluator,
            supervisor: draft.supervisor,
            review_types: draft.review_types,
            other_review_type: draft.other_review_type,
            coverage_from: draft.coverage_from,
            coverage_to: draft.coverage_to,
            ratings,
            assessment: draft.assessment,
        }
    }
}
