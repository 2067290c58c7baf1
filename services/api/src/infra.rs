use appraisal::workflows::evaluation::{
    ApprovalRecord, EmployeeId, EvaluationDraft, EvaluationId, EvaluationRecord,
    EvaluationRepository, OrgUnitDirectory, ReapprovalPolicy, RepositoryError,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

type ApprovalKey = (EmployeeId, EvaluationId);

#[derive(Default, Clone)]
pub(crate) struct InMemoryEvaluationRepository {
    drafts: Arc<Mutex<HashMap<EmployeeId, EvaluationDraft>>>,
    evaluations: Arc<Mutex<HashMap<EvaluationId, EvaluationRecord>>>,
    approvals: Arc<Mutex<HashMap<ApprovalKey, ApprovalRecord>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
}

impl EvaluationRepository for InMemoryEvaluationRepository {
    fn load_draft(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<EvaluationDraft>, RepositoryError> {
        Ok(lock(&self.drafts)?.get(employee_id).cloned())
    }

    fn save_draft(&self, draft: EvaluationDraft) -> Result<(), RepositoryError> {
        lock(&self.drafts)?.insert(draft.employee_id(), draft);
        Ok(())
    }

    fn discard_draft(&self, employee_id: &EmployeeId) -> Result<(), RepositoryError> {
        lock(&self.drafts)?.remove(employee_id);
        Ok(())
    }

    fn insert_evaluation(
        &self,
        record: EvaluationRecord,
    ) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = lock(&self.evaluations)?;
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
        Ok(lock(&self.evaluations)?.get(id).cloned())
    }

    fn evaluations_for(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = lock(&self.evaluations)?;
        Ok(guard
            .values()
            .filter(|record| record.belongs_to(employee_id))
            .cloned()
            .collect())
    }

    fn all_evaluations(&self) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Ok(lock(&self.evaluations)?.values().cloned().collect())
    }

    fn get_approval(
        &self,
        evaluation_id: &EvaluationId,
        employee_id: &EmployeeId,
    ) -> Result<Option<ApprovalRecord>, RepositoryError> {
        let key = (employee_id.clone(), evaluation_id.clone());
        Ok(lock(&self.approvals)?.get(&key).cloned())
    }

    fn put_approval(
        &self,
        record: ApprovalRecord,
        policy: ReapprovalPolicy,
    ) -> Result<(), RepositoryError> {
        let key = (record.employee_id.clone(), record.evaluation_id.clone());
        let mut guard = lock(&self.approvals)?;
        if policy == ReapprovalPolicy::Reject && guard.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(key, record);
        Ok(())
    }
}

/// Head office detection from branch naming: "HEAD OFFICE" anywhere, or a standalone "HO".
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct BranchNameDirectory;

impl OrgUnitDirectory for BranchNameDirectory {
    fn is_head_office_unit(&self, unit: &str) -> bool {
        let unit = unit.trim().to_ascii_uppercase();
        unit.contains("HEAD OFFICE")
            || unit
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|token| token == "HO")
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
