use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::approval::{self, ApprovalError, ApprovalRecord, ApprovalRequest, ReapprovalPolicy};
use super::domain::{EmployeeId, EvaluationDraft, EvaluationId, ReviewContext};
use super::intake::IntakeError;
use super::report::QuarterlyReport;
use super::repository::{
    EvaluationRecord, EvaluationRepository, EvaluationView, OrgUnitDirectory, RepositoryError,
};
use super::scoring::Scorecard;
use super::wizard::{
    self, coverage_period, first_incomplete_step, Direction, IncompleteStep, WizardStep,
};

/// Service composing storage, the head office directory and the scoring engine.
pub struct PerformanceReviewService<R, D> {
    repository: Arc<R>,
    directory: Arc<D>,
    reapproval: ReapprovalPolicy,
}

static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_evaluation_id() -> EvaluationId {
    let id = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvaluationId(format!("eval-{id:06}"))
}

/// Completeness of one wizard step as shown in the step indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepStatus {
    pub step: WizardStep,
    pub label: &'static str,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Snapshot returned after every draft edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftStatus {
    pub employee_id: EmployeeId,
    pub head_office: bool,
    pub steps: Vec<StepStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_incomplete: Option<IncompleteStep>,
    pub ready_to_submit: bool,
    /// Live score over whatever has been rated so far.
    pub preview: Scorecard,
}

impl<R, D> PerformanceReviewService<R, D>
where
    R: EvaluationRepository + 'static,
    D: OrgUnitDirectory + 'static,
{
    pub fn new(repository: Arc<R>, directory: Arc<D>, reapproval: ReapprovalPolicy) -> Self {
        Self {
            repository,
            directory,
            reapproval,
        }
    }

    pub fn reapproval_policy(&self) -> ReapprovalPolicy {
        self.reapproval
    }

    /// Head office is decided by the evaluator's branch, once per request.
    pub fn context_for(&self, draft: &EvaluationDraft) -> ReviewContext {
        ReviewContext {
            is_head_office: self
                .directory
                .is_head_office_unit(draft.evaluator.branch.trim()),
        }
    }

    pub fn draft_status(&self, draft: &EvaluationDraft) -> DraftStatus {
        let context = self.context_for(draft);
        let steps = wizard::visible_steps(context)
            .into_iter()
            .map(|step| {
                let message = wizard::validation_message(step, draft, context);
                StepStatus {
                    step,
                    label: step.label(),
                    complete: message.is_none(),
                    message,
                }
            })
            .collect();
        let next_incomplete = first_incomplete_step(draft, context);

        DraftStatus {
            employee_id: draft.employee_id(),
            head_office: context.is_head_office,
            steps,
            ready_to_submit: next_incomplete.is_none(),
            next_incomplete,
            preview: Scorecard::from_sheet(&draft.ratings, context),
        }
    }

    /// Persist the in-progress wizard state for its employee.
    pub fn save_draft(
        &self,
        draft: EvaluationDraft,
    ) -> Result<DraftStatus, ReviewServiceError> {
        if draft.employee_id().0.is_empty() {
            return Err(IntakeError::MissingEmployeeId.into());
        }

        let status = self.draft_status(&draft);
        debug!(
            employee_id = %status.employee_id,
            ready = status.ready_to_submit,
            "saving evaluation draft"
        );
        self.repository.save_draft(draft)?;
        Ok(status)
    }

    pub fn load_draft(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<EvaluationDraft, ReviewServiceError> {
        let draft = self
            .repository
            .load_draft(employee_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(draft)
    }

    /// Move through the wizard; forward moves are refused while the current step is incomplete.
    pub fn navigate(
        &self,
        draft: &EvaluationDraft,
        current: WizardStep,
        direction: Direction,
    ) -> Result<WizardStep, ReviewServiceError> {
        let context = self.context_for(draft);
        let target = wizard::advance(current, direction, draft, context)?;
        Ok(target)
    }

    /// Score and store a completed draft, then discard the draft.
    pub fn submit(
        &self,
        draft: EvaluationDraft,
    ) -> Result<EvaluationRecord, ReviewServiceError> {
        let context = self.context_for(&draft);
        if let Some(incomplete) = first_incomplete_step(&draft, context) {
            warn!(
                employee_id = %draft.employee_id(),
                step = incomplete.step.number(),
                "evaluation submit blocked by incomplete step"
            );
            return Err(incomplete.into());
        }
        let (coverage_from, coverage_to) = coverage_period(&draft)?;

        let scorecard = Scorecard::from_sheet(&draft.ratings, context);
        let employee_id = draft.employee_id();
        let record = EvaluationRecord {
            id: next_evaluation_id(),
            employee: draft.employee,
            evaluator: draft.evaluator,
            supervisor: draft.supervisor,
            review_types: draft.review_types,
            other_review_type: draft.other_review_type,
            coverage_from,
            coverage_to,
            head_office: context.is_head_office,
            ratings: draft.ratings,
            scorecard,
            assessment: draft.assessment,
            submitted_at: Utc::now(),
        };

        let stored = self.repository.insert_evaluation(record)?;
        // The record is stored; a leftover draft must not turn this into a failed submit.
        if let Err(err) = self.repository.discard_draft(&employee_id) {
            warn!(
                evaluation_id = %stored.id,
                employee_id = %employee_id,
                error = %err,
                "submitted evaluation but could not discard its draft"
            );
        }

        info!(
            evaluation_id = %stored.id,
            employee_id = %employee_id,
            overall = stored.scorecard.overall,
            result = stored.scorecard.gate.label(),
            "evaluation submitted"
        );
        Ok(stored)
    }

    pub fn evaluation(
        &self,
        employee_id: &EmployeeId,
        evaluation_id: &EvaluationId,
    ) -> Result<EvaluationView, ReviewServiceError> {
        let record = self.owned_evaluation(employee_id, evaluation_id)?;
        let approval = self.repository.get_approval(evaluation_id, employee_id)?;
        Ok(record.view(approval))
    }

    /// Every evaluation of the employee, oldest first.
    pub fn evaluations_for(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<EvaluationView>, ReviewServiceError> {
        let mut records = self.repository.evaluations_for(employee_id)?;
        records.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then(a.id.0.cmp(&b.id.0)));

        records
            .into_iter()
            .map(|record| {
                let approval = self.repository.get_approval(&record.id, employee_id)?;
                Ok(record.view(approval))
            })
            .collect()
    }

    /// Acknowledge an evaluation on behalf of the employee it belongs to.
    pub fn approve(
        &self,
        employee_id: &EmployeeId,
        evaluation_id: &EvaluationId,
        request: &ApprovalRequest,
    ) -> Result<ApprovalRecord, ReviewServiceError> {
        request.validate()?;
        self.owned_evaluation(employee_id, evaluation_id)?;

        let existing = self.repository.get_approval(evaluation_id, employee_id)?;
        let record = approval::approve(
            existing.as_ref(),
            evaluation_id,
            employee_id,
            request,
            self.reapproval,
            Utc::now(),
        )?;
        match self.repository.put_approval(record.clone(), self.reapproval) {
            Ok(()) => {}
            Err(RepositoryError::Conflict) => {
                warn!(
                    evaluation_id = %evaluation_id,
                    employee_id = %employee_id,
                    "approval lost a race with an earlier sign-off"
                );
                return Err(ApprovalError::AlreadyApproved(evaluation_id.clone()).into());
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            evaluation_id = %evaluation_id,
            employee_id = %employee_id,
            replaced = existing.is_some(),
            "evaluation approved"
        );
        Ok(record)
    }

    pub fn is_approved(
        &self,
        employee_id: &EmployeeId,
        evaluation_id: &EvaluationId,
    ) -> Result<bool, ReviewServiceError> {
        Ok(self.approval_data(employee_id, evaluation_id)?.is_some())
    }

    pub fn approval_data(
        &self,
        employee_id: &EmployeeId,
        evaluation_id: &EvaluationId,
    ) -> Result<Option<ApprovalRecord>, ReviewServiceError> {
        let record = self.repository.get_approval(evaluation_id, employee_id)?;
        Ok(record)
    }

    pub fn quarterly_report(&self) -> Result<QuarterlyReport, ReviewServiceError> {
        let records = self.repository.all_evaluations()?;
        let mut entries = Vec::with_capacity(records.len());
        for record in &records {
            let approved = self
                .repository
                .get_approval(&record.id, &record.employee_id())?
                .is_some();
            entries.push((record, approved));
        }
        Ok(QuarterlyReport::build(entries))
    }

    /// Foreign evaluations are reported as missing rather than forbidden.
    fn owned_evaluation(
        &self,
        employee_id: &EmployeeId,
        evaluation_id: &EvaluationId,
    ) -> Result<EvaluationRecord, ReviewServiceError> {
        match self.repository.fetch_evaluation(evaluation_id)? {
            Some(record) if record.belongs_to(employee_id) => Ok(record),
            _ => Err(RepositoryError::NotFound.into()),
        }
    }
}

/// Error raised by the review service.
#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Incomplete(#[from] IncompleteStep),
    #[error(transparent)]
    Approval(#[from] ApprovalError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
