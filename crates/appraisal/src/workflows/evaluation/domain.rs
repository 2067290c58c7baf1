use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for the evaluated employee; also the namespace approvals live under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rated competency groups on the evaluation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    JobKnowledge,
    QualityOfWork,
    Adaptability,
    Teamwork,
    Reliability,
    EthicalBehavior,
    CustomerService,
    ManagerialSkills,
}

impl Category {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::JobKnowledge,
            Self::QualityOfWork,
            Self::Adaptability,
            Self::Teamwork,
            Self::Reliability,
            Self::EthicalBehavior,
            Self::CustomerService,
            Self::ManagerialSkills,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::JobKnowledge => "Job Knowledge",
            Self::QualityOfWork => "Quality of Work",
            Self::Adaptability => "Adaptability",
            Self::Teamwork => "Teamwork",
            Self::Reliability => "Reliability",
            Self::EthicalBehavior => "Ethical & Professional Behavior",
            Self::CustomerService => "Customer Service",
            Self::ManagerialSkills => "Managerial Skills",
        }
    }

    /// Display titles of the criterion slots, in form order.
    pub const fn criteria(self) -> &'static [&'static str] {
        match self {
            Self::JobKnowledge => &[
                "Mastery in Core Competencies",
                "Keeps Job Knowledge Updated",
                "Problem Solving",
            ],
            Self::QualityOfWork => &[
                "Meets Standards and Requirements",
                "Timeliness",
                "Work Output Volume",
                "Consistency in Performance",
                "Branch Job Targets",
            ],
            Self::Adaptability => &[
                "Openness to Change",
                "Flexibility in Job Role",
                "Resilience in the Face of Challenges",
            ],
            Self::Teamwork => &[
                "Active Participation in Team Activities",
                "Promotes a Positive Team Culture",
                "Effective Communication",
            ],
            Self::Reliability => &[
                "Consistent Attendance",
                "Punctuality",
                "Follows Through on Commitments",
                "Reliable Handling of Routine Tasks",
            ],
            Self::EthicalBehavior => &[
                "Follows Company Policies",
                "Professionalism",
                "Fair Treatment of Co-Workers",
                "Accountability for Own Actions",
            ],
            Self::CustomerService => &[
                "Listening and Understanding",
                "Problem Solving for Customers",
                "Product Knowledge for Customer Support",
                "Positive and Professional Attitude",
                "Timely Resolution of Customer Issues",
            ],
            Self::ManagerialSkills => &[
                "Leadership and Direction",
                "Delegation",
                "Decision Making",
                "Coaching and Development",
                "Performance Management",
                "Planning and Organization",
            ],
        }
    }

    pub const fn slot_count(self) -> usize {
        self.criteria().len()
    }

    /// Whether the category is scored at all for the given review context.
    pub const fn applies_to(self, context: ReviewContext) -> bool {
        !matches!(self, Self::CustomerService) || !context.is_head_office
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single criterion score, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, RatingError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError::InvalidScoreValue {
                value: value.to_string(),
            })
        }
    }

    /// Boundary conversion where `0` is the "not yet rated" sentinel.
    pub fn from_raw(value: i64) -> Result<Option<Self>, RatingError> {
        match value {
            0 => Ok(None),
            1..=5 => Ok(Some(Self(value as u8))),
            _ => Err(RatingError::InvalidScoreValue {
                value: value.to_string(),
            }),
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Malformed rating input. These are caller faults, never user-facing validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
    #[error("invalid score value '{value}': expected a whole number between 0 and 5")]
    InvalidScoreValue { value: String },
    #[error("{category} has no criterion {criterion} (valid: 1..={slots})")]
    UnknownCriterion {
        category: Category,
        criterion: usize,
        slots: usize,
    },
}

/// Criterion scores for every category, addressed by 1-based criterion number.
///
/// Stored categories are always padded to their slot count and never entirely unrated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Category, Vec<Option<Rating>>>",
    into = "BTreeMap<Category, Vec<Option<Rating>>>"
)]
pub struct RatingSheet {
    scores: BTreeMap<Category, Vec<Option<Rating>>>,
}

impl RatingSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        category: Category,
        criterion: usize,
        score: Option<Rating>,
    ) -> Result<(), RatingError> {
        let slots = category.slot_count();
        if criterion == 0 || criterion > slots {
            return Err(RatingError::UnknownCriterion {
                category,
                criterion,
                slots,
            });
        }

        let entry = self.scores.entry(category).or_default();
        entry.resize(slots, None);
        entry[criterion - 1] = score;
        if entry.iter().all(Option::is_none) {
            self.scores.remove(&category);
        }
        Ok(())
    }

    pub fn get(&self, category: Category, criterion: usize) -> Option<Rating> {
        criterion
            .checked_sub(1)
            .and_then(|index| self.scores.get(&category)?.get(index).copied().flatten())
    }

    /// Slot values for a category, padded to the category's slot count.
    pub fn scores(&self, category: Category) -> Vec<Option<Rating>> {
        let mut slots = self.scores.get(&category).cloned().unwrap_or_default();
        slots.resize(category.slot_count(), None);
        slots
    }

    /// Set every slot of a category to the same rating.
    pub fn fill(&mut self, category: Category, rating: Rating) {
        self.scores
            .insert(category, vec![Some(rating); category.slot_count()]);
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl TryFrom<BTreeMap<Category, Vec<Option<Rating>>>> for RatingSheet {
    type Error = RatingError;

    fn try_from(scores: BTreeMap<Category, Vec<Option<Rating>>>) -> Result<Self, Self::Error> {
        let mut sheet = Self::new();
        for (category, mut slots) in scores {
            if slots.len() > category.slot_count() {
                return Err(RatingError::UnknownCriterion {
                    category,
                    criterion: slots.len(),
                    slots: category.slot_count(),
                });
            }
            if slots.iter().any(Option::is_some) {
                slots.resize(category.slot_count(), None);
                sheet.scores.insert(category, slots);
            }
        }
        Ok(sheet)
    }
}

impl From<RatingSheet> for BTreeMap<Category, Vec<Option<Rating>>> {
    fn from(sheet: RatingSheet) -> Self {
        sheet.scores
    }
}

/// Caller-resolved facts about who is evaluating; the core never derives these itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewContext {
    pub is_head_office: bool,
}

impl ReviewContext {
    pub const fn head_office() -> Self {
        Self {
            is_head_office: true,
        }
    }

    pub const fn branch() -> Self {
        Self {
            is_head_office: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewType {
    ProbationaryThreeMonths,
    ProbationaryFiveMonths,
    RegularQ1,
    RegularQ2,
    RegularQ3,
    RegularQ4,
    Others,
}

impl ReviewType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ProbationaryThreeMonths => "Probationary (3 months)",
            Self::ProbationaryFiveMonths => "Probationary (5 months)",
            Self::RegularQ1 => "Regular Q1",
            Self::RegularQ2 => "Regular Q2",
            Self::RegularQ3 => "Regular Q3",
            Self::RegularQ4 => "Regular Q4",
            Self::Others => "Others",
        }
    }
}

/// Identity fields of the employee under review, as typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDetails {
    pub name: String,
    pub id: String,
    pub position: String,
    pub department: String,
    pub branch: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorDetails {
    pub id: String,
    pub name: String,
    /// Organizational unit used to resolve the Head Office exception.
    pub branch: String,
}

/// Free-text closing section of the form. Never required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallAssessment {
    pub strengths: String,
    pub improvement_areas: String,
    pub remarks: String,
}

/// In-progress wizard state. Passed into and returned from the pure wizard functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationDraft {
    pub employee: EmployeeDetails,
    pub evaluator: EvaluatorDetails,
    pub supervisor: String,
    pub review_types: BTreeSet<ReviewType>,
    pub other_review_type: Option<String>,
    pub coverage_from: Option<NaiveDate>,
    pub coverage_to: Option<NaiveDate>,
    pub ratings: RatingSheet,
    pub assessment: OverallAssessment,
}

impl EvaluationDraft {
    pub fn employee_id(&self) -> EmployeeId {
        EmployeeId(self.employee.id.trim().to_string())
    }

    pub fn has_review_type(&self) -> bool {
        !self.review_types.is_empty()
            || self
                .other_review_type
                .as_deref()
                .is_some_and(|text| !text.trim().is_empty())
    }
}
