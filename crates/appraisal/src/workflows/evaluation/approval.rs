use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{EmployeeId, EvaluationId};

/// Employee acknowledgement state of a submitted evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    Pending,
    Approved,
}

impl ApprovalState {
    pub fn of(record: Option<&ApprovalRecord>) -> Self {
        match record {
            Some(_) => Self::Approved,
            None => Self::Pending,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
        }
    }
}

/// Signed acknowledgement, created once per evaluation by the evaluated employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub evaluation_id: EvaluationId,
    pub employee_id: EmployeeId,
    pub approved_at: DateTime<Utc>,
    /// Opaque signature image, typically a base64 data URL.
    pub employee_signature: String,
    pub employee_name: String,
}

/// What the employee supplies when acknowledging an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub employee_name: String,
}

impl ApprovalRequest {
    pub fn new(signature: impl Into<String>, employee_name: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            employee_name: employee_name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ApprovalError> {
        if self.signature.trim().is_empty() {
            return Err(ApprovalError::MissingSignature);
        }
        if self.employee_name.trim().is_empty() {
            return Err(ApprovalError::MissingEmployeeName);
        }
        Ok(())
    }
}

/// How a second approval of the same evaluation is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReapprovalPolicy {
    #[default]
    Reject,
    /// Last writer wins; the previous record is replaced.
    Overwrite,
}

impl ReapprovalPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" | "strict" => Some(Self::Reject),
            "overwrite" | "replace" => Some(Self::Overwrite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApprovalError {
    #[error("a signature is required to approve this evaluation")]
    MissingSignature,
    #[error("the employee name is required to approve this evaluation")]
    MissingEmployeeName,
    #[error("evaluation {0} has already been approved")]
    AlreadyApproved(EvaluationId),
}

/// Pending -> Approved transition. Pure; the caller persists the returned record.
pub fn approve(
    existing: Option<&ApprovalRecord>,
    evaluation_id: &EvaluationId,
    employee_id: &EmployeeId,
    request: &ApprovalRequest,
    policy: ReapprovalPolicy,
    now: DateTime<Utc>,
) -> Result<ApprovalRecord, ApprovalError> {
    request.validate()?;

    if existing.is_some() && policy == ReapprovalPolicy::Reject {
        return Err(ApprovalError::AlreadyApproved(evaluation_id.clone()));
    }

    Ok(ApprovalRecord {
        evaluation_id: evaluation_id.clone(),
        employee_id: employee_id.clone(),
        approved_at: now,
        employee_signature: request.signature.clone(),
        employee_name: request.employee_name.trim().to_string(),
    })
}
