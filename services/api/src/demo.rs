use crate::infra::{BranchNameDirectory, InMemoryEvaluationRepository};
use appraisal::error::AppError;
use appraisal::workflows::evaluation::wizard::first_incomplete_step;
use appraisal::workflows::evaluation::{
    ApprovalRecord, ApprovalRequest, Category, Direction, DraftPayload, EmployeeDetails,
    EvaluationDraft, EvaluationRecord, EvaluationRepository, EvaluatorDetails, IntakeError,
    OrgUnitDirectory, OverallAssessment, PerformanceReviewService, QuarterlyReport, Rating,
    RatingSheet, ReapprovalPolicy, ReviewContext, ReviewServiceError, ReviewType, Scorecard,
    WizardStep,
};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Coverage end date for the sample evaluations (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) coverage_to: Option<NaiveDate>,
    /// Write the submitted evaluations and approvals as JSON, ready for `report`.
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
    /// Print the quarterly summary as CSV instead of a table.
    #[arg(long)]
    pub(crate) csv: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Draft evaluation JSON, in the same shape the drafts API accepts
    pub(crate) draft: PathBuf,
    /// Treat the evaluator as head office regardless of the branch name
    #[arg(long)]
    pub(crate) head_office: bool,
    /// Emit the scorecard as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Export file with `evaluations` and optional `approvals` arrays
    pub(crate) input: PathBuf,
    #[arg(long, value_enum, default_value_t = ReportFormat::Csv)]
    pub(crate) format: ReportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReportFormat {
    Csv,
    Json,
}

/// File format shared by `demo --export` and `report`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct EvaluationExport {
    pub(crate) evaluations: Vec<EvaluationRecord>,
    #[serde(default)]
    pub(crate) approvals: Vec<ApprovalRecord>,
}

impl EvaluationExport {
    pub(crate) fn report(&self) -> QuarterlyReport {
        let approved: HashSet<_> = self
            .approvals
            .iter()
            .map(|approval| (approval.employee_id.clone(), approval.evaluation_id.clone()))
            .collect();

        QuarterlyReport::build(self.evaluations.iter().map(|record| {
            let key = (record.employee_id(), record.id.clone());
            (record, approved.contains(&key))
        }))
    }
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.draft)?;
    let payload: DraftPayload = serde_json::from_str(&raw)?;
    let draft = payload.normalize().map_err(ReviewServiceError::from)?;

    let context = ReviewContext {
        is_head_office: args.head_office
            || BranchNameDirectory.is_head_office_unit(&draft.evaluator.branch),
    };
    let scorecard = Scorecard::from_sheet(&draft.ratings, context);
    let incomplete = first_incomplete_step(&draft, context);

    if args.json {
        let payload = json!({
            "employee_id": draft.employee_id(),
            "head_office": context.is_head_office,
            "scorecard": scorecard,
            "next_incomplete": incomplete,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!(
        "Evaluation draft for {} ({}) | head office: {}",
        display_or_dash(&draft.employee.name),
        display_or_dash(&draft.employee.id),
        if context.is_head_office { "yes" } else { "no" }
    );
    render_scorecard(&scorecard);
    match incomplete {
        Some(step) => println!(
            "Next incomplete step: {} {} | {}",
            step.step.number(),
            step.step.label(),
            step.message
        ),
        None => println!("All wizard steps complete; ready to submit."),
    }

    Ok(())
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.input)?;
    let export: EvaluationExport = serde_json::from_str(&raw)?;
    let report = export.report();

    match args.format {
        ReportFormat::Csv => report.write_csv(std::io::stdout().lock())?,
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        coverage_to,
        export,
        csv,
    } = args;

    let coverage_to = coverage_to.unwrap_or_else(|| Local::now().date_naive());
    let coverage_from = coverage_to - chrono::Duration::days(90);

    let repository = Arc::new(InMemoryEvaluationRepository::default());
    let service = PerformanceReviewService::new(
        repository,
        Arc::new(BranchNameDirectory),
        ReapprovalPolicy::Reject,
    );

    println!("Performance evaluation demo");
    println!("Coverage period: {coverage_from} -> {coverage_to}");

    let mut bundle = EvaluationExport::default();
    for draft in [
        branch_teller_draft(coverage_from, coverage_to)?,
        head_office_analyst_draft(coverage_from, coverage_to)?,
    ] {
        let name = draft.employee.name.clone();
        let employee_id = draft.employee_id();
        println!("\n{name} ({employee_id}), evaluated by {}", draft.evaluator.name);

        let path = walk_wizard(&service, &draft)?;
        let steps: Vec<String> = path.iter().map(|step| step.number().to_string()).collect();
        println!("- Wizard path: {}", steps.join(" -> "));

        let record = service.submit(draft)?;
        println!(
            "- Submitted {} | head office: {}",
            record.id,
            if record.head_office { "yes" } else { "no" }
        );
        render_scorecard(&record.scorecard);
        bundle.evaluations.push(record);
    }

    println!("\nEmployee sign-off");
    if let Some(record) = bundle.evaluations.first() {
        let employee_id = record.employee_id();
        match service.approve(&employee_id, &record.id, &ApprovalRequest::new("", "")) {
            Err(err) => println!("- Blank signature refused: {err}"),
            Ok(_) => println!("- Blank signature unexpectedly accepted"),
        }

        let approval = service.approve(
            &employee_id,
            &record.id,
            &ApprovalRequest::new(DEMO_SIGNATURE, record.employee.name.clone()),
        )?;
        println!(
            "- {} approved {} at {}",
            approval.employee_name,
            approval.evaluation_id,
            approval.approved_at.to_rfc3339()
        );

        if let Err(err) = service.approve(
            &employee_id,
            &record.id,
            &ApprovalRequest::new(DEMO_SIGNATURE, record.employee.name.clone()),
        ) {
            println!("- Second approval refused: {err}");
        }
        bundle.approvals.push(approval);
    }
    for record in bundle.evaluations.iter().skip(1) {
        let approved = service.is_approved(&record.employee_id(), &record.id)?;
        println!(
            "- {} is {}",
            record.id,
            if approved { "approved" } else { "awaiting approval" }
        );
    }

    let report = service.quarterly_report()?;
    println!("\nQuarterly summary");
    if csv {
        report.write_csv(std::io::stdout().lock())?;
    } else {
        for quarter in &report.quarters {
            println!(
                "- {}: {} evaluations | avg {:.1} | {} pass / {} fail | {} approved / {} pending",
                quarter.period,
                quarter.evaluations,
                quarter.average_overall,
                quarter.passed,
                quarter.failed,
                quarter.approved,
                quarter.pending_approval
            );
        }
    }

    if let Some(path) = export {
        fs::write(&path, serde_json::to_string_pretty(&bundle)?)?;
        println!("\nExported {} evaluations to {}", bundle.evaluations.len(), path.display());
    }

    Ok(())
}

const DEMO_SIGNATURE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn walk_wizard<R, D>(
    service: &PerformanceReviewService<R, D>,
    draft: &EvaluationDraft,
) -> Result<Vec<WizardStep>, ReviewServiceError>
where
    R: EvaluationRepository + 'static,
    D: OrgUnitDirectory + 'static,
{
    service.save_draft(draft.clone())?;

    let mut step = WizardStep::FIRST;
    let mut path = vec![step];
    while step != WizardStep::LAST {
        step = service.navigate(draft, step, Direction::Forward)?;
        path.push(step);
    }
    Ok(path)
}

fn render_scorecard(scorecard: &Scorecard) {
    for line in &scorecard.lines {
        let weight = line
            .weight
            .map(|weight| format!("{:>4.1}%", weight * 100.0))
            .unwrap_or_else(|| "  n/a".to_string());
        println!(
            "  {:<20} {:.2}  weight {}  {}",
            line.category.label(),
            line.average,
            weight,
            line.label.label()
        );
    }
    println!(
        "  Overall {:.1}: {} ({})",
        scorecard.overall,
        scorecard.label.label(),
        scorecard.gate.label()
    );
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn sheet(rows: &[(Category, &[u8])]) -> Result<RatingSheet, ReviewServiceError> {
    let mut sheet = RatingSheet::new();
    for (category, values) in rows {
        for (index, value) in values.iter().enumerate() {
            let rating = Rating::from_raw(i64::from(*value)).map_err(IntakeError::from)?;
            sheet
                .set(*category, index + 1, rating)
                .map_err(IntakeError::from)?;
        }
    }
    Ok(sheet)
}

fn branch_teller_draft(
    coverage_from: NaiveDate,
    coverage_to: NaiveDate,
) -> Result<EvaluationDraft, ReviewServiceError> {
    let ratings = sheet(&[
        (Category::JobKnowledge, &[4, 5, 4]),
        (Category::QualityOfWork, &[4, 4, 3, 4, 5]),
        (Category::Adaptability, &[3, 4, 4]),
        (Category::Teamwork, &[5, 5, 4]),
        (Category::Reliability, &[4, 4, 5, 4]),
        (Category::EthicalBehavior, &[5, 5, 5, 5]),
        (Category::CustomerService, &[4, 5, 4, 4, 5]),
    ])?;

    Ok(EvaluationDraft {
        employee: EmployeeDetails {
            name: "Jane Doe".to_string(),
            id: "EMP-1001".to_string(),
            position: "Senior Teller".to_string(),
            department: "Branch Operations".to_string(),
            branch: "Cebu Branch".to_string(),
        },
        evaluator: EvaluatorDetails {
            id: "MGR-2001".to_string(),
            name: "Carlos Reyes".to_string(),
            branch: "Cebu Branch".to_string(),
        },
        supervisor: "Carlos Reyes".to_string(),
        review_types: BTreeSet::from([ReviewType::RegularQ3]),
        other_review_type: None,
        coverage_from: Some(coverage_from),
        coverage_to: Some(coverage_to),
        ratings,
        assessment: OverallAssessment {
            strengths: "Accurate cash handling and calm with walk-in clients".to_string(),
            improvement_areas: "Product cross-selling".to_string(),
            remarks: String::new(),
        },
    })
}

fn head_office_analyst_draft(
    coverage_from: NaiveDate,
    coverage_to: NaiveDate,
) -> Result<EvaluationDraft, ReviewServiceError> {
    // No customer service ratings and no branch job targets at head office.
    let ratings = sheet(&[
        (Category::JobKnowledge, &[5, 4, 5]),
        (Category::QualityOfWork, &[4, 4, 4, 5]),
        (Category::Adaptability, &[4, 4, 3]),
        (Category::Teamwork, &[4, 4, 4]),
        (Category::Reliability, &[5, 5, 4, 5]),
        (Category::EthicalBehavior, &[5, 5, 5, 5]),
        (Category::ManagerialSkills, &[3, 4, 3, 4, 3, 4]),
    ])?;

    Ok(EvaluationDraft {
        employee: EmployeeDetails {
            name: "Miguel Tan".to_string(),
            id: "EMP-1042".to_string(),
            position: "Financial Analyst".to_string(),
            department: "Finance".to_string(),
            branch: "Head Office".to_string(),
        },
        evaluator: EvaluatorDetails {
            id: "MGR-0007".to_string(),
            name: "Ana Lim".to_string(),
            branch: "Head Office".to_string(),
        },
        supervisor: "Ana Lim".to_string(),
        review_types: BTreeSet::from([ReviewType::RegularQ3]),
        other_review_type: None,
        coverage_from: Some(coverage_from),
        coverage_to: Some(coverage_to),
        ratings,
        assessment: OverallAssessment::default(),
    })
}
