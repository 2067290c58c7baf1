use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::approval::{ApprovalError, ApprovalRequest};
use super::domain::{EmployeeId, EvaluationId};
use super::intake::DraftPayload;
use super::repository::{EvaluationRepository, OrgUnitDirectory, RepositoryError};
use super::service::{PerformanceReviewService, ReviewServiceError};
use super::wizard::{Direction, WizardStep};

type SharedService<R, D> = Arc<PerformanceReviewService<R, D>>;

/// Router builder exposing drafts, submission, approval and reporting endpoints.
pub fn evaluation_router<R, D>(service: SharedService<R, D>) -> Router
where
    R: EvaluationRepository + 'static,
    D: OrgUnitDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/drafts/:employee_id",
            put(save_draft_handler::<R, D>).get(load_draft_handler::<R, D>),
        )
        .route(
            "/api/v1/drafts/:employee_id/navigate",
            post(navigate_handler::<R, D>),
        )
        .route("/api/v1/evaluations", post(submit_handler::<R, D>))
        .route(
            "/api/v1/employees/:employee_id/evaluations",
            get(list_handler::<R, D>),
        )
        .route(
            "/api/v1/employees/:employee_id/evaluations/:evaluation_id",
            get(evaluation_handler::<R, D>),
        )
        .route(
            "/api/v1/employees/:employee_id/evaluations/:evaluation_id/approval",
            post(approve_handler::<R, D>).get(approval_handler::<R, D>),
        )
        .route("/api/v1/reports/quarterly", get(report_handler::<R, D>))
        .with_state(service)
}

/// HTTP status for a review service failure.
pub fn status_for(error: &ReviewServiceError) -> StatusCode {
    match error {
        ReviewServiceError::Intake(_) | ReviewServiceError::Incomplete(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ReviewServiceError::Approval(ApprovalError::AlreadyApproved(_)) => StatusCode::CONFLICT,
        ReviewServiceError::Approval(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ReviewServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ReviewServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ReviewServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn error_response(error: &ReviewServiceError) -> Response {
    let payload = match error {
        ReviewServiceError::Incomplete(incomplete) => json!({
            "error": incomplete.message,
            "step": incomplete.step,
            "field": incomplete.field,
        }),
        other => json!({
            "error": other.to_string(),
        }),
    };
    (status_for(error), axum::Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct NavigateRequest {
    current_step: WizardStep,
    direction: Direction,
}

pub(crate) async fn save_draft_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    Path(employee_id): Path<String>,
    axum::Json(payload): axum::Json<DraftPayload>,
) -> Response
where
    R: EvaluationRepository + 'static,
    D: OrgUnitDirectory + 'static,
{
    let mut draft = match payload.normalize() {
        Ok(draft) => draft,
        Err(error) => return error_response(&error.into()),
    };

    if draft.employee.id.trim().is_empty() {
        draft.employee.id = employee_id.clone();
    } else if draft.employee.id.trim() != employee_id {
        let payload = json!({
            "error": "draft employee id does not match the request path",
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    }

    match service.save_draft(draft) {
        Ok(status) => (StatusCode::OK, axum::Json(status)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn load_draft_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    Path(employee_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
    D: OrgUnitDirectory + 'static,
{
    match service.load_draft(&EmployeeId(employee_id)) {
        Ok(draft) => {
            let status = service.draft_status(&draft);
            let payload = json!({
                "draft": DraftPayload::from(draft),
                "status": status,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn navigate_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    Path(employee_id): Path<String>,
    axum::Json(request): axum::Json<NavigateRequest>,
) -> Response
where
    R: EvaluationRepository + 'static,
    D: OrgUnitDirectory + 'static,
{
    let result = service
        .load_draft(&EmployeeId(employee_id))
        .and_then(|draft| service.navigate(&draft, request.current_step, request.direction));

    match result {
        Ok(step) => {
            let payload = json!({
                "step": step,
                "label": step.label(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn submit_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    axum::Json(payload): axum::Json<DraftPayload>,
) -> Response
where
    R: EvaluationRepository + 'static,
    D: OrgUnitDirectory + 'static,
{
    let result = payload
        .normalize()
        .map_err(ReviewServiceError::from)
        .and_then(|draft| service.submit(draft));

    match result {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.view(None))).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn list_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    Path(employee_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
    D: OrgUnitDirectory + 'static,
{
    match service.evaluations_for(&EmployeeId(employee_id)) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn evaluation_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    Path((employee_id, evaluation_id)): Path<(String, String)>,
) -> Response
where
    R: EvaluationRepository + 'static,
    D: OrgUnitDirectory + 'static,
{
    match service.evaluation(&EmployeeId(employee_id), &EvaluationId(evaluation_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn approve_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    Path((employee_id, evaluation_id)): Path<(String, String)>,
    axum::Json(request): axum::Json<ApprovalRequest>,
) -> Response
where
    R: EvaluationRepository + 'static,
    D: OrgUnitDirectory + 'static,
{
    match service.approve(
        &EmployeeId(employee_id),
        &EvaluationId(evaluation_id),
        &request,
    ) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn approval_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    Path((employee_id, evaluation_id)): Path<(String, String)>,
) -> Response
where
    R: EvaluationRepository + 'static,
    D: OrgUnitDirectory + 'static,
{
    let evaluation_id = EvaluationId(evaluation_id);
    match service.approval_data(&EmployeeId(employee_id), &evaluation_id) {
        Ok(approval) => {
            let payload = json!({
                "evaluation_id": evaluation_id,
                "approved": approval.is_some(),
                "approval": approval,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn report_handler<R, D>(State(service): State<SharedService<R, D>>) -> Response
where
    R: EvaluationRepository + 'static,
    D: OrgUnitDirectory + 'static,
{
    match service.quarterly_report() {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(&error),
    }
}
