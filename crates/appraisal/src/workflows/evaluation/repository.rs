use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::approval::{ApprovalRecord, ApprovalState, ReapprovalPolicy};
use super::domain::{
    EmployeeDetails, EmployeeId, EvaluationDraft, EvaluationId, EvaluatorDetails,
    OverallAssessment, RatingSheet, ReviewType,
};
use super::scoring::Scorecard;

/// Submitted evaluation. Frozen once stored; approvals are kept alongside, not inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: EvaluationId,
    pub employee: EmployeeDetails,
    pub evaluator: EvaluatorDetails,
    pub supervisor: String,
    pub review_types: BTreeSet<ReviewType>,
    pub other_review_type: Option<String>,
    pub coverage_from: NaiveDate,
    pub coverage_to: NaiveDate,
    pub head_office: bool,
    pub ratings: RatingSheet,
    pub scorecard: Scorecard,
    pub assessment: OverallAssessment,
    pub submitted_at: DateTime<Utc>,
}

impl EvaluationRecord {
    pub fn employee_id(&self) -> EmployeeId {
        EmployeeId(self.employee.id.trim().to_string())
    }

    pub fn belongs_to(&self, employee_id: &EmployeeId) -> bool {
        self.employee_id() == *employee_id
    }

    /// Rebuild the draft the record was submitted from, e.g. for re-scoring.
    pub fn to_draft(&self) -> EvaluationDraft {
        EvaluationDraft {
            employee: self.employee.clone(),
            evaluator: self.evaluator.clone(),
            supervisor: self.supervisor.clone(),
            review_types: self.review_types.clone(),
            other_review_type: self.other_review_type.clone(),
            coverage_from: Some(self.coverage_from),
            coverage_to: Some(self.coverage_to),
            ratings: self.ratings.clone(),
            assessment: self.assessment.clone(),
        }
    }

    pub fn view(&self, approval: Option<ApprovalRecord>) -> EvaluationView {
        let categories = self
            .scorecard
            .lines
            .iter()
            .map(|line| CategoryScoreView {
                category: line.category.label(),
                average: line.average,
                weight: line.weight,
                rating: line.label.label(),
            })
            .collect();

        EvaluationView {
            evaluation_id: self.id.clone(),
            employee_id: self.employee_id(),
            employee_name: self.employee.name.clone(),
            evaluator_name: self.evaluator.name.clone(),
            coverage_from: self.coverage_from,
            coverage_to: self.coverage_to,
            submitted_at: self.submitted_at,
            overall_score: self.scorecard.overall,
            rating: self.scorecard.label.label(),
            result: self.scorecard.gate.label(),
            categories,
            approval_status: ApprovalState::of(approval.as_ref()).label(),
            approval,
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait EvaluationRepository: Send + Sync {
    fn load_draft(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<EvaluationDraft>, RepositoryError>;
    fn save_draft(&self, draft: EvaluationDraft) -> Result<(), RepositoryError>;
    fn discard_draft(&self, employee_id: &EmployeeId) -> Result<(), RepositoryError>;

    fn insert_evaluation(
        &self,
        record: EvaluationRecord,
    ) -> Result<EvaluationRecord, RepositoryError>;
    fn fetch_evaluation(
        &self,
        id: &EvaluationId,
    ) -> Result<Option<EvaluationRecord>, RepositoryError>;
    fn evaluations_for(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError>;
    fn all_evaluations(&self) -> Result<Vec<EvaluationRecord>, RepositoryError>;

    /// Approvals are only ever read within the owning employee's namespace.
    fn get_approval(
        &self,
        evaluation_id: &EvaluationId,
        employee_id: &EmployeeId,
    ) -> Result<Option<ApprovalRecord>, RepositoryError>;
    /// Store an approval. Checking for an existing record and writing must be one step:
    /// under [`ReapprovalPolicy::Reject`] an existing record fails with `Conflict`.
    fn put_approval(
        &self,
        record: ApprovalRecord,
        policy: ReapprovalPolicy,
    ) -> Result<(), RepositoryError>;
}

/// Resolves whether an organizational unit is Head Office. Naming heuristics live in the
/// implementation; the scoring core only ever sees the resulting boolean.
pub trait OrgUnitDirectory: Send + Sync {
    fn is_head_office_unit(&self, unit: &str) -> bool;
}

impl<F> OrgUnitDirectory for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_head_office_unit(&self, unit: &str) -> bool {
        self(unit)
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Employee-facing projection of an evaluation and its acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationView {
    pub evaluation_id: EvaluationId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub evaluator_name: String,
    pub coverage_from: NaiveDate,
    pub coverage_to: NaiveDate,
    pub submitted_at: DateTime<Utc>,
    pub overall_score: f64,
    pub rating: &'static str,
    pub result: &'static str,
    pub categories: Vec<CategoryScoreView>,
    pub approval_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryScoreView {
    pub category: &'static str,
    pub average: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub rating: &'static str,
}
