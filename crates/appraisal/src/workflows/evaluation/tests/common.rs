use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Barrier, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::evaluation::approval::{ApprovalRecord, ReapprovalPolicy};
use crate::workflows::evaluation::domain::{
    Category, EmployeeDetails, EmployeeId, EvaluationDraft, EvaluationId, EvaluatorDetails,
    OverallAssessment, Rating, RatingSheet, ReviewType,
};
use crate::workflows::evaluation::repository::{
    EvaluationRecord, EvaluationRepository, OrgUnitDirectory, RepositoryError,
};
use crate::workflows::evaluation::{evaluation_router, PerformanceReviewService};

pub(super) const EMPLOYEE_ID: &str = "EMP-1001";
pub(super) const SIGNATURE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAAB";

pub(super) type TestService = PerformanceReviewService<MemoryRepository, HeadOfficeUnits>;

pub(super) fn rating(value: u8) -> Rating {
    Rating::new(value).expect("valid rating")
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn uniform_sheet(value: u8) -> RatingSheet {
    let mut sheet = RatingSheet::new();
    for category in Category::ordered() {
        sheet.fill(category, rating(value));
    }
    sheet
}

/// Fully completed branch evaluation for [`EMPLOYEE_ID`], every criterion rated 4.
pub(super) fn complete_draft() -> EvaluationDraft {
    EvaluationDraft {
        employee: EmployeeDetails {
            name: "Jane Doe".to_string(),
            id: EMPLOYEE_ID.to_string(),
            position: "Senior Teller".to_string(),
            department: "Branch Operations".to_string(),
            branch: "Makati Branch".to_string(),
        },
        evaluator: EvaluatorDetails {
            id: "MGR-2001".to_string(),
            name: "Carlos Reyes".to_string(),
            branch: "Makati Branch".to_string(),
        },
        supervisor: "Carlos Reyes".to_string(),
        review_types: BTreeSet::from([ReviewType::RegularQ3]),
        other_review_type: None,
        coverage_from: Some(date(2025, 7, 1)),
        coverage_to: Some(date(2025, 9, 30)),
        ratings: uniform_sheet(4),
        assessment: OverallAssessment {
            strengths: "Consistent cash handling".to_string(),
            improvement_areas: "Cross-selling".to_string(),
            remarks: String::new(),
        },
    }
}

/// Same evaluation filed by a head office evaluator, without customer service ratings.
pub(super) fn head_office_draft() -> EvaluationDraft {
    let mut draft = complete_draft();
    draft.evaluator.branch = "Head Office".to_string();
    draft.employee.department = "Finance".to_string();
    let mut ratings = RatingSheet::new();
    for category in Category::ordered() {
        if category != Category::CustomerService {
            ratings.fill(category, rating(4));
        }
    }
    draft.ratings = ratings;
    draft
}

pub(super) fn build_service() -> (TestService, Arc<MemoryRepository>) {
    build_service_with(ReapprovalPolicy::Reject)
}

pub(super) fn build_service_with(policy: ReapprovalPolicy) -> (TestService, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service =
        PerformanceReviewService::new(repository.clone(), Arc::new(HeadOfficeUnits), policy);
    (service, repository)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    evaluation_router(Arc::new(service))
}

/// Treats any unit named "Head Office" as head office.
pub(super) struct HeadOfficeUnits;

impl OrgUnitDirectory for HeadOfficeUnits {
    fn is_head_office_unit(&self, unit: &str) -> bool {
        unit.eq_ignore_ascii_case("head office")
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) drafts: Arc<Mutex<HashMap<EmployeeId, EvaluationDraft>>>,
    pub(super) evaluations: Arc<Mutex<HashMap<EvaluationId, EvaluationRecord>>>,
    pub(super) approvals: Arc<Mutex<HashMap<(EmployeeId, EvaluationId), ApprovalRecord>>>,
}

impl MemoryRepository {
    pub(super) fn approval_count(&self) -> usize {
        self.approvals.lock().expect("approval mutex poisoned").len()
    }
}

impl EvaluationRepository for MemoryRepository {
    fn load_draft(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<EvaluationDraft>, RepositoryError> {
        let guard = self.drafts.lock().expect("draft mutex poisoned");
        Ok(guard.get(employee_id).cloned())
    }

    fn save_draft(&self, draft: EvaluationDraft) -> Result<(), RepositoryError> {
        let mut guard = self.drafts.lock().expect("draft mutex poisoned");
        guard.insert(draft.employee_id(), draft);
        Ok(())
    }

    fn discard_draft(&self, employee_id: &EmployeeId) -> Result<(), RepositoryError> {
        self.drafts
            .lock()
            .expect("draft mutex poisoned")
            .remove(employee_id);
        Ok(())
    }

    fn insert_evaluation(
        &self,
        record: EvaluationRecord,
    ) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.evaluations.lock().expect("evaluation mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_evaluation(
        &self,
        id: &EvaluationId,
    ) -> Result<Option<EvaluationRecord>, RepositoryError> {
        let guard = self.evaluations.lock().expect("evaluation mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn evaluations_for(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = self.evaluations.lock().expect("evaluation mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.belongs_to(employee_id))
            .cloned()
            .collect())
    }

    fn all_evaluations(&self) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = self.evaluations.lock().expect("evaluation mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn get_approval(
        &self,
        evaluation_id: &EvaluationId,
        employee_id: &EmployeeId,
    ) -> Result<Option<ApprovalRecord>, RepositoryError> {
        let guard = self.approvals.lock().expect("approval mutex poisoned");
        Ok(guard
            .get(&(employee_id.clone(), evaluation_id.clone()))
            .cloned())
    }

    fn put_approval(
        &self,
        record: ApprovalRecord,
        policy: ReapprovalPolicy,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.approvals.lock().expect("approval mutex poisoned");
        let key = (record.employee_id.clone(), record.evaluation_id.clone());
        if policy == ReapprovalPolicy::Reject && guard.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(key, record);
        Ok(())
    }
}

/// Delegates to a [`MemoryRepository`] with switches for interleaving and partial failures.
pub(super) struct HookedRepository {
    pub(super) inner: MemoryRepository,
    approval_gate: Option<Barrier>,
    fail_discard: bool,
}

impl HookedRepository {
    /// Every approval read waits until `approvers` readers have seen the same state.
    pub(super) fn racing_approvals(approvers: usize) -> Self {
        Self {
            inner: MemoryRepository::default(),
            approval_gate: Some(Barrier::new(approvers)),
            fail_discard: false,
        }
    }

    pub(super) fn failing_discard() -> Self {
        Self {
            inner: MemoryRepository::default(),
            approval_gate: None,
            fail_discard: true,
        }
    }
}

impl EvaluationRepository for HookedRepository {
    fn load_draft(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<EvaluationDraft>, RepositoryError> {
        self.inner.load_draft(employee_id)
    }

    fn save_draft(&self, draft: EvaluationDraft) -> Result<(), RepositoryError> {
        self.inner.save_draft(draft)
    }

    fn discard_draft(&self, employee_id: &EmployeeId) -> Result<(), RepositoryError> {
        if self.fail_discard {
            return Err(RepositoryError::Unavailable("draft store offline".to_string()));
        }
        self.inner.discard_draft(employee_id)
    }

    fn insert_evaluation(
        &self,
        record: EvaluationRecord,
    ) -> Result<EvaluationRecord, RepositoryError> {
        self.inner.insert_evaluation(record)
    }

    fn fetch_evaluation(
        &self,
        id: &EvaluationId,
    ) -> Result<Option<EvaluationRecord>, RepositoryError> {
        self.inner.fetch_evaluation(id)
    }

    fn evaluations_for(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        self.inner.evaluations_for(employee_id)
    }

    fn all_evaluations(&self) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        self.inner.all_evaluations()
    }

    fn get_approval(
        &self,
        evaluation_id: &EvaluationId,
        employee_id: &EmployeeId,
    ) -> Result<Option<ApprovalRecord>, RepositoryError> {
        let existing = self.inner.get_approval(evaluation_id, employee_id)?;
        if let Some(gate) = &self.approval_gate {
            gate.wait();
        }
        Ok(existing)
    }

    fn put_approval(
        &self,
        record: ApprovalRecord,
        policy: ReapprovalPolicy,
    ) -> Result<(), RepositoryError> {
        self.inner.put_approval(record, policy)
    }
}

pub(super) struct UnavailableRepository;

impl EvaluationRepository for UnavailableRepository {
    fn load_draft(&self, _: &EmployeeId) -> Result<Option<EvaluationDraft>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save_draft(&self, _: EvaluationDraft) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn discard_draft(&self, _: &EmployeeId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_evaluation(
        &self,
        _: EvaluationRecord,
    ) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_evaluation(
        &self,
        _: &EvaluationId,
    ) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn evaluations_for(&self, _: &EmployeeId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all_evaluations(&self) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn get_approval(
        &self,
        _: &EvaluationId,
        _: &EmployeeId,
    ) -> Result<Option<ApprovalRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn put_approval(&self, _: ApprovalRecord, _: ReapprovalPolicy) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
