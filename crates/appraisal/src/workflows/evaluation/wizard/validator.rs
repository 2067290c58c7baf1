use chrono::NaiveDate;
use serde::Serialize;

use super::super::domain::{Category, EvaluationDraft, ReviewContext};
use super::WizardStep;

/// Form field that blocked a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StepField {
    ReviewType,
    EmployeeName,
    EmployeeId,
    Position,
    Department,
    Branch,
    Supervisor,
    CoverageFrom,
    CoverageTo,
    CoverageRange,
    Criterion { category: Category, criterion: usize },
}

/// Expected, user-facing validation outcome. Returned, never raised as a fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct IncompleteStep {
    pub step: WizardStep,
    pub field: StepField,
    pub message: String,
}

impl IncompleteStep {
    fn new(step: WizardStep, field: StepField, message: impl Into<String>) -> Self {
        Self {
            step,
            field,
            message: message.into(),
        }
    }
}

/// 1-based criterion numbers that must be rated for `category` in this context.
pub fn required_criteria(
    category: Category,
    context: ReviewContext,
) -> std::ops::RangeInclusive<usize> {
    let required = match category {
        _ if !category.applies_to(context) => 0,
        // Branch job targets do not apply to head office staff.
        Category::QualityOfWork if context.is_head_office => category.slot_count() - 1,
        _ => category.slot_count(),
    };
    1..=required
}

/// Check one step; the first unmet condition in form order wins.
pub fn check_step(
    step: WizardStep,
    draft: &EvaluationDraft,
    context: ReviewContext,
) -> Result<(), IncompleteStep> {
    if step == WizardStep::JobKnowledge {
        check_administrative_fields(draft)?;
    }

    match step.category() {
        Some(category) => check_criteria(step, category, draft, context),
        None => Ok(()),
    }
}

pub fn is_step_complete(step: WizardStep, draft: &EvaluationDraft, context: ReviewContext) -> bool {
    check_step(step, draft, context).is_ok()
}

/// Field-level guidance for an incomplete step, `None` once it is complete.
pub fn validation_message(
    step: WizardStep,
    draft: &EvaluationDraft,
    context: ReviewContext,
) -> Option<String> {
    check_step(step, draft, context)
        .err()
        .map(|incomplete| incomplete.message)
}

/// First blocking step across the whole wizard, skipping steps routed around.
pub fn first_incomplete_step(
    draft: &EvaluationDraft,
    context: ReviewContext,
) -> Option<IncompleteStep> {
    super::visible_steps(context)
        .into_iter()
        .find_map(|step| check_step(step, draft, context).err())
}

fn check_administrative_fields(draft: &EvaluationDraft) -> Result<(), IncompleteStep> {
    let step = WizardStep::JobKnowledge;

    if !draft.has_review_type() {
        return Err(IncompleteStep::new(
            step,
            StepField::ReviewType,
            "Select at least one review type, or describe the review under \"Others\".",
        ));
    }

    let employee = &draft.employee;
    let required_text = [
        (&employee.name, StepField::EmployeeName, "Enter the employee's name."),
        (&employee.id, StepField::EmployeeId, "Enter the employee's ID number."),
        (&employee.position, StepField::Position, "Enter the employee's position."),
        (&employee.department, StepField::Department, "Enter the employee's department."),
        (&employee.branch, StepField::Branch, "Enter the employee's branch."),
        (&draft.supervisor, StepField::Supervisor, "Enter the immediate supervisor's name."),
    ];
    if let Some((_, field, message)) = required_text
        .into_iter()
        .find(|(value, _, _)| value.trim().is_empty())
    {
        return Err(IncompleteStep::new(step, field, message));
    }

    coverage_period(draft).map(|_| ())
}

/// Coverage start and end dates, once both are entered and ordered.
pub fn coverage_period(draft: &EvaluationDraft) -> Result<(NaiveDate, NaiveDate), IncompleteStep> {
    let step = WizardStep::JobKnowledge;

    let Some(from) = draft.coverage_from else {
        return Err(IncompleteStep::new(
            step,
            StepField::CoverageFrom,
            "Enter the start date of the performance coverage period.",
        ));
    };
    let Some(to) = draft.coverage_to else {
        return Err(IncompleteStep::new(
            step,
            StepField::CoverageTo,
            "Enter the end date of the performance coverage period.",
        ));
    };
    if to < from {
        return Err(IncompleteStep::new(
            step,
            StepField::CoverageRange,
            format!("The coverage period ends ({to}) before it starts ({from})."),
        ));
    }

    Ok((from, to))
}

fn check_criteria(
    step: WizardStep,
    category: Category,
    draft: &EvaluationDraft,
    context: ReviewContext,
) -> Result<(), IncompleteStep> {
    let titles = category.criteria();
    for criterion in required_criteria(category, context) {
        if draft.ratings.get(category, criterion).is_none() {
            let title = titles[criterion - 1];
            return Err(IncompleteStep::new(
                step,
                StepField::Criterion {
                    category,
                    criterion,
                },
                format!(
                    "Rate \"{title}\" under {category} (criterion {criterion} of {}).",
                    titles.len()
                ),
            ));
        }
    }
    Ok(())
}
