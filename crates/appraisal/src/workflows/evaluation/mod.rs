//! Employee performance evaluation: rating sheets, weighted scoring, the step-by-step
//! evaluation wizard and the employee's signed approval of a submitted evaluation.
//!
//! Scoring, wizard and approval logic are pure functions over explicit values. Storage and
//! head office detection are injected through the traits in [`repository`].

pub mod approval;
pub mod domain;
pub mod intake;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use approval::{
    approve, ApprovalError, ApprovalRecord, ApprovalRequest, ApprovalState, ReapprovalPolicy,
};
pub use domain::{
    Category, EmployeeDetails, EmployeeId, EvaluationDraft, EvaluationId, EvaluatorDetails,
    OverallAssessment, Rating, RatingError, RatingSheet, ReviewContext, ReviewType,
};
pub use intake::{DraftPayload, IntakeError, RawScore};
pub use report::{QuarterSummary, QuarterlyReport, ReportError};
pub use repository::{
    CategoryScoreView, EvaluationRecord, EvaluationRepository, EvaluationView, OrgUnitDirectory,
    RepositoryError,
};
pub use router::evaluation_router;
pub use scoring::{
    category_average, category_weight, overall_score, CategoryAverages, CategoryLine,
    PerformanceLabel, ScoreGate, Scorecard, PASS_THRESHOLD,
};
pub use service::{DraftStatus, PerformanceReviewService, ReviewServiceError, StepStatus};
pub use wizard::{Direction, IncompleteStep, StepField, WizardStep};
