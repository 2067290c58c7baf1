use std::sync::Arc;

use super::common::*;
use crate::workflows::evaluation::approval::{ApprovalRequest, ReapprovalPolicy};
use crate::workflows::evaluation::domain::{Category, EmployeeId, EvaluationDraft, EvaluationId};
use crate::workflows::evaluation::intake::IntakeError;
use crate::workflows::evaluation::repository::{EvaluationRepository, RepositoryError};
use crate::workflows::evaluation::service::{PerformanceReviewService, ReviewServiceError};
use crate::workflows::evaluation::wizard::{Direction, StepField, WizardStep};

fn employee() -> EmployeeId {
    EmployeeId(EMPLOYEE_ID.to_string())
}

#[test]
fn drafts_require_an_employee_id() {
    let (service, _) = build_service();

    match service.save_draft(EvaluationDraft::default()) {
        Err(ReviewServiceError::Intake(IntakeError::MissingEmployeeId)) => {}
        other => panic!("expected missing employee id, got {other:?}"),
    }
}

#[test]
fn saved_drafts_reload_with_their_status() {
    let (service, _) = build_service();
    let mut draft = complete_draft();
    draft
        .ratings
        .set(Category::CustomerService, 2, None)
        .expect("valid criterion");

    let status = service.save_draft(draft.clone()).expect("draft saved");
    assert!(!status.head_office);
    assert!(!status.ready_to_submit);
    let blocking = status.next_incomplete.expect("customer service gap");
    assert_eq!(blocking.step, WizardStep::CustomerService);
    let incomplete: Vec<WizardStep> = status
        .steps
        .iter()
        .filter(|step| !step.complete)
        .map(|step| step.step)
        .collect();
    assert_eq!(incomplete, vec![WizardStep::CustomerService]);

    let reloaded = service.load_draft(&employee()).expect("draft stored");
    assert_eq!(reloaded, draft);
}

#[test]
fn loading_a_missing_draft_is_not_found() {
    let (service, _) = build_service();
    assert!(matches!(
        service.load_draft(&employee()),
        Err(ReviewServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn draft_preview_tracks_partial_ratings() {
    let (service, _) = build_service();
    let status = service.draft_status(&complete_draft());
    assert!(status.ready_to_submit);
    assert_eq!(status.preview.overall, 4.0);
    assert_eq!(status.steps.len(), 9);
}

#[test]
fn head_office_is_resolved_from_the_evaluator_branch() {
    let (service, _) = build_service();
    let draft = head_office_draft();

    assert!(service.context_for(&draft).is_head_office);
    let status = service.draft_status(&draft);
    assert!(status.head_office);
    assert!(status.ready_to_submit);
    assert!(status
        .steps
        .iter()
        .all(|step| step.step != WizardStep::CustomerService));

    assert_eq!(
        service
            .navigate(&draft, WizardStep::EthicalBehavior, Direction::Forward)
            .expect("step complete"),
        WizardStep::ManagerialSkills
    );
}

#[test]
fn closures_can_stand_in_for_the_directory() {
    let repository = Arc::new(MemoryRepository::default());
    let directory = Arc::new(|unit: &str| unit.starts_with("HO-"));
    let service = PerformanceReviewService::new(repository, directory, ReapprovalPolicy::Reject);

    let mut draft = complete_draft();
    draft.evaluator.branch = "HO-Treasury".to_string();
    assert!(service.context_for(&draft).is_head_office);
}

#[test]
fn navigation_is_refused_while_the_step_is_incomplete() {
    let (service, _) = build_service();
    let mut draft = complete_draft();
    draft.coverage_from = None;

    match service.navigate(&draft, WizardStep::JobKnowledge, Direction::Forward) {
        Err(ReviewServiceError::Incomplete(incomplete)) => {
            assert_eq!(incomplete.field, StepField::CoverageFrom);
        }
        other => panic!("expected incomplete step, got {other:?}"),
    }
}

#[test]
fn incomplete_drafts_are_not_submitted() {
    let (service, repository) = build_service();
    let mut draft = complete_draft();
    draft
        .ratings
        .set(Category::EthicalBehavior, 3, None)
        .expect("valid criterion");
    service.save_draft(draft.clone()).expect("draft saved");

    match service.submit(draft) {
        Err(ReviewServiceError::Incomplete(incomplete)) => {
            assert_eq!(incomplete.step, WizardStep::EthicalBehavior);
        }
        other => panic!("expected incomplete step, got {other:?}"),
    }
    assert!(repository.all_evaluations().expect("list").is_empty());
    assert!(service.load_draft(&employee()).is_ok(), "draft is kept");
}

#[test]
fn submitting_scores_stores_and_clears_the_draft() {
    let (service, repository) = build_service();
    service.save_draft(complete_draft()).expect("draft saved");

    let record = service.submit(complete_draft()).expect("submits");

    assert!(record.id.0.starts_with("eval-"));
    assert!(!record.head_office);
    assert_eq!(record.scorecard.overall, 4.0);
    assert!(record.scorecard.passed());
    assert_eq!(record.coverage_to, date(2025, 9, 30));
    assert!(repository
        .fetch_evaluation(&record.id)
        .expect("fetch")
        .is_some());
    assert!(matches!(
        service.load_draft(&employee()),
        Err(ReviewServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn submit_returns_the_stored_record_when_the_draft_lingers() {
    let repository = Arc::new(HookedRepository::failing_discard());
    let service = PerformanceReviewService::new(
        repository.clone(),
        Arc::new(HeadOfficeUnits),
        ReapprovalPolicy::Reject,
    );
    let draft = complete_draft();
    service.save_draft(draft.clone()).expect("draft saves");

    let record = service.submit(draft).expect("stored record is returned");

    let stored = repository.all_evaluations().expect("listed");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, record.id);
    assert!(repository
        .load_draft(&employee())
        .expect("draft lookup")
        .is_some());
}

#[test]
fn head_office_submissions_have_no_customer_service_line() {
    let (service, _) = build_service();
    let record = service.submit(head_office_draft()).expect("submits");

    assert!(record.head_office);
    assert!(record.scorecard.line(Category::CustomerService).is_none());
    assert_eq!(record.scorecard.overall, 4.0);
}

#[test]
fn evaluations_are_listed_per_employee() {
    let (service, _) = build_service();
    let first = service.submit(complete_draft()).expect("submits");
    let second = service.submit(complete_draft()).expect("submits");

    let mut other = complete_draft();
    other.employee.id = "EMP-2002".to_string();
    other.employee.name = "John Roe".to_string();
    service.submit(other).expect("submits");

    let views = service.evaluations_for(&employee()).expect("list");
    let ids: Vec<EvaluationId> = views.into_iter().map(|view| view.evaluation_id).collect();
    assert_eq!(ids, vec![first.id.clone(), second.id]);

    let foreign = EmployeeId("EMP-2002".to_string());
    assert!(matches!(
        service.evaluation(&foreign, &first.id),
        Err(ReviewServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn quarterly_report_counts_results_and_approvals() {
    let (service, _) = build_service();
    let approved = service.submit(complete_draft()).expect("submits");
    service
        .approve(
            &employee(),
            &approved.id,
            &ApprovalRequest::new(SIGNATURE, "Jane Doe"),
        )
        .expect("approved");

    let mut failing = complete_draft();
    failing.ratings = uniform_sheet(2);
    service.submit(failing).expect("submits");

    let mut next_quarter = complete_draft();
    next_quarter.coverage_from = Some(date(2025, 10, 1));
    next_quarter.coverage_to = Some(date(2025, 12, 31));
    service.submit(next_quarter).expect("submits");

    let report = service.quarterly_report().expect("report");
    assert_eq!(report.quarters.len(), 2);

    let q3 = &report.quarters[0];
    assert_eq!(q3.period, "2025-Q3");
    assert_eq!(q3.evaluations, 2);
    assert_eq!(q3.passed, 1);
    assert_eq!(q3.failed, 1);
    assert_eq!(q3.approved, 1);
    assert_eq!(q3.pending_approval, 1);
    assert_eq!(q3.average_overall, 3.0);

    assert_eq!(report.quarters[1].period, "2025-Q4");

    let mut csv = Vec::new();
    report.write_csv(&mut csv).expect("csv");
    let csv = String::from_utf8(csv).expect("utf8");
    assert!(csv.starts_with("period,year,quarter,evaluations"));
    assert!(csv.contains("2025-Q3,2025,3,2,3.0,1,1,1,1"), "{csv}");
}

#[test]
fn repository_outages_surface_as_repository_errors() {
    let service = PerformanceReviewService::new(
        Arc::new(UnavailableRepository),
        Arc::new(HeadOfficeUnits),
        ReapprovalPolicy::Reject,
    );

    assert!(matches!(
        service.submit(complete_draft()),
        Err(ReviewServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
    assert!(matches!(
        service.quarterly_report(),
        Err(ReviewServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
}
