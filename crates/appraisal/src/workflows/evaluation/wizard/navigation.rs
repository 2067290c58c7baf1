use serde::{Deserialize, Serialize};

use super::super::domain::{EvaluationDraft, ReviewContext};
use super::validator::{check_step, IncompleteStep};
use super::WizardStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

/// Target step for a navigation request, clamped to the wizard bounds.
///
/// Head office reviews never visit the customer service step: forward from 6 lands on 8
/// and backward from 8 lands on 6.
pub fn route(current: WizardStep, direction: Direction, is_head_office: bool) -> WizardStep {
    let number = current.number();
    let target = match direction {
        Direction::Forward => number.saturating_add(1),
        Direction::Backward => number.saturating_sub(1),
    };

    let target = match WizardStep::from_number(target) {
        Some(step) => step,
        None => return current,
    };

    if is_head_office && target == WizardStep::CustomerService {
        return match direction {
            Direction::Forward => WizardStep::ManagerialSkills,
            Direction::Backward => WizardStep::EthicalBehavior,
        };
    }

    target
}

/// Gated navigation: moving forward requires the current step to be complete.
pub fn advance(
    current: WizardStep,
    direction: Direction,
    draft: &EvaluationDraft,
    context: ReviewContext,
) -> Result<WizardStep, IncompleteStep> {
    if direction == Direction::Forward {
        check_step(current, draft, context)?;
    }
    Ok(route(current, direction, context.is_head_office))
}

/// Steps the wizard actually shows for this context.
pub fn visible_steps(context: ReviewContext) -> Vec<WizardStep> {
    WizardStep::ordered()
        .into_iter()
        .filter(|step| {
            step.category()
                .map_or(true, |category| category.applies_to(context))
        })
        .collect()
}
