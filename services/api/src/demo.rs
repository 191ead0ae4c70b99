use crate::infra::{parse_date, InMemoryHouseholdRepository};
use benefit_screener::config::AppConfig;
use benefit_screener::error::AppError;
use benefit_screener::workflows::screening::{
    Answer, Asset, ClientId, ClientProfile, ConstantSet, EnrollmentStatus, Expense, ExpenseType,
    Frequency, HeatingCost, Household, HouseholdMember, Income, IncomeType, MaritalStatus,
    Relationship, ResidenceStatus, ScreeningConfig, ScreeningReport, ScreeningService,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScreenArgs {
    /// Household document (JSON) to screen
    #[arg(long)]
    pub(crate) household: PathBuf,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Constant set to screen with; overrides SCREENING_CONSTANTS
    #[arg(long, value_parser = parse_constant_set)]
    pub(crate) constants: Option<ConstantSet>,
    /// Print the full report as JSON instead of a verdict table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Constant set to screen with; overrides SCREENING_CONSTANTS
    #[arg(long, value_parser = parse_constant_set)]
    pub(crate) constants: Option<ConstantSet>,
}

fn parse_constant_set(raw: &str) -> Result<ConstantSet, String> {
    ConstantSet::parse(raw).ok_or_else(|| format!("unknown constant set '{raw}'"))
}

fn resolve_tables(constants: Option<ConstantSet>) -> Result<ScreeningConfig, AppError> {
    match constants {
        Some(set) => Ok(ScreeningConfig::for_set(set)),
        None => Ok(AppConfig::load()?.screening.tables()?),
    }
}

fn stateless_service(tables: ScreeningConfig) -> ScreeningService<InMemoryHouseholdRepository> {
    ScreeningService::new(Arc::new(InMemoryHouseholdRepository::default()), tables)
}

pub(crate) fn run_screen(args: ScreenArgs) -> Result<(), AppError> {
    let ScreenArgs {
        household,
        as_of,
        constants,
        json,
    } = args;

    let raw = fs::read_to_string(&household)?;
    let household: Household = serde_json::from_str(&raw)?;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());

    let report = stateless_service(resolve_tables(constants)?).screen(household, as_of);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_report(&report);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let report = stateless_service(resolve_tables(args.constants)?).screen(sample_household(), as_of);

    println!("Benefit screening demo");
    render_report(&report);

    if let Some(snap) = report.members.iter().find_map(|member| member.snap.as_ref()) {
        println!("\nSNAP budget for the meal-sharing unit");
        println!(
            "- {} people | gross ${:.2}/mo | net ${:.2}/mo | final ${:.2}/mo",
            snap.household_size, snap.gross_monthly_income, snap.net_income, snap.final_net_income
        );
        println!(
            "- utility allowance ${:.2} | excess shelter ${:.2} | estimated benefit ${:.2}{}",
            snap.utility_allowance,
            snap.excess_shelter_cost,
            snap.benefit,
            if snap.expedited { " (expedited)" } else { "" }
        );
    }
    Ok(())
}

pub(crate) fn render_report(report: &ScreeningReport) {
    println!("\nHousehold {} screened as of {}", report.client_id, report.as_of);

    let rows = report.rows();
    let name_width = rows
        .iter()
        .map(|row| row.member_name.len())
        .max()
        .unwrap_or(0)
        .max("Member".len());
    println!("{:<name_width$}  {:<12}  Verdicts", "Member", "Program");
    for row in rows {
        println!(
            "{:<name_width$}  {:<12}  {}",
            row.member_name,
            row.program.label(),
            row.eligibility.join("; ")
        );
    }

    if !report.failures.is_empty() {
        println!("\nSkipped evaluations (previous results kept)");
        for failure in &report.failures {
            println!(
                "- {} {}: {}",
                failure.member_id,
                failure.program.label(),
                failure.reason
            );
        }
    }
}

fn monthly_income(id: &str, income_type: IncomeType, kind: &str, amount: f64) -> Income {
    Income {
        id: id.to_string(),
        income_type,
        kind: kind.to_string(),
        amount: Some(amount),
        frequency: Frequency::Monthly,
        start_date: "2018-01-01".to_string(),
        end_date: None,
    }
}

fn monthly_expense(id: &str, expense_type: ExpenseType, kind: &str, amount: f64) -> Expense {
    Expense {
        id: id.to_string(),
        expense_type,
        kind: kind.to_string(),
        amount: Some(amount),
        frequency: Frequency::Monthly,
        start_date: "2018-01-01".to_string(),
        end_date: None,
    }
}

/// A retired couple who own their home and share meals, with a grandson who buys food separately.
pub(crate) fn sample_household() -> Household {
    let mut head = HouseholdMember::new("demo-1", "Margaret");
    head.last_name = "Alvarez".to_string();
    head.dob = Some("1949-03-14".to_string());
    head.marital_status = MaritalStatus::Married;
    head.medicare = Answer::Yes;
    head.medicaid = Answer::No;
    head.disability = Answer::No;
    head.meals = Answer::Yes;
    head.head_of_household = true;
    head.selections.pace = EnrollmentStatus::NotEnrolled;
    head.selections.lis = EnrollmentStatus::NotEnrolled;
    head.selections.msp = EnrollmentStatus::NotEnrolled;
    head.selections.ptrr = EnrollmentStatus::NotEnrolled;
    head.income.push(monthly_income(
        "demo-i-1",
        IncomeType::Previous,
        "Social Security",
        1_050.0,
    ));
    head.income.push(monthly_income(
        "demo-i-2",
        IncomeType::Current,
        "Social Security",
        1_090.0,
    ));
    head.expenses.push(Expense {
        frequency: Frequency::Annually,
        ..monthly_expense("demo-e-1", ExpenseType::PreviousYear, "Property Tax", 1_450.0)
    });
    head.expenses.push(monthly_expense(
        "demo-e-2",
        ExpenseType::Shelter,
        "Mortgage",
        540.0,
    ));
    head.expenses.push(monthly_expense(
        "demo-e-3",
        ExpenseType::Utility,
        "Heating and/or Cooling",
        160.0,
    ));
    head.expenses.push(monthly_expense(
        "demo-e-4",
        ExpenseType::Medical,
        "Prescriptions",
        85.0,
    ));
    head.assets.push(Asset {
        id: "demo-a-1".to_string(),
        asset_type: "Savings".to_string(),
        description: "Credit union savings".to_string(),
        value: 2_400.0,
    });

    let mut spouse = HouseholdMember::new("demo-2", "Luis");
    spouse.last_name = "Alvarez".to_string();
    spouse.dob = Some("1947-09-02".to_string());
    spouse.marital_status = MaritalStatus::Married;
    spouse.medicare = Answer::Yes;
    spouse.medicaid = Answer::No;
    spouse.disability = Answer::Yes;
    spouse.meals = Answer::Yes;
    spouse.selections.pace = EnrollmentStatus::NotEnrolled;
    spouse.selections.lis = EnrollmentStatus::Enrolled;
    spouse.selections.msp = EnrollmentStatus::NotEnrolled;
    spouse.selections.ptrr = EnrollmentStatus::NotInterested;
    spouse.income.push(monthly_income(
        "demo-i-3",
        IncomeType::Previous,
        "Pension",
        380.0,
    ));
    spouse.income.push(monthly_income(
        "demo-i-4",
        IncomeType::Current,
        "Pension",
        380.0,
    ));

    head.relationships
        .push(Relationship::spouse(&spouse.household_member_id));
    spouse
        .relationships
        .push(Relationship::spouse(&head.household_member_id));

    let mut grandson = HouseholdMember::new("demo-3", "Mateo");
    grandson.last_name = "Alvarez".to_string();
    grandson.dob = Some("2003-05-21".to_string());
    grandson.medicare = Answer::No;
    grandson.medicaid = Answer::No;
    grandson.disability = Answer::No;
    grandson.meals = Answer::No;
    grandson.income.push(Income {
        frequency: Frequency::BiWeekly,
        ..monthly_income("demo-i-5", IncomeType::Current, "Wages", 640.0)
    });

    Household {
        client_id: ClientId("demo-household".to_string()),
        client: ClientProfile {
            liheap_enrollment: EnrollmentStatus::NotEnrolled,
            heating_crisis: Answer::No,
            residence_status_current: ResidenceStatus::Owner,
            residence_status_previous: ResidenceStatus::Owner,
            subsidized_housing: Answer::No,
            heating_cost: HeatingCost::PaidSeparately,
            homeless: false,
            farmworker: false,
        },
        members: vec![head, spouse, grandson],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use benefit_screener::workflows::screening::{MemberId, Program};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date")
    }

    #[test]
    fn sample_household_screens_without_failures() {
        let report = stateless_service(ScreeningConfig::current()).screen(sample_household(), as_of());

        assert!(report.failures.is_empty());
        assert_eq!(report.rows().len(), Program::ALL.len() * 3);
        let spouse = report
            .members
            .iter()
            .find(|member| member.household_member_id == MemberId("demo-2".to_string()))
            .expect("spouse present");
        assert_eq!(
            spouse.lis.as_ref().map(|result| result.eligibility.clone()),
            Some(vec!["Already Enrolled".to_string()])
        );
        assert_eq!(
            spouse.ptrr.as_ref().map(|result| result.eligibility.clone()),
            Some(vec!["Not Interested".to_string()])
        );
    }

    #[test]
    fn sample_household_meal_unit_excludes_the_grandson() {
        let report = stateless_service(ScreeningConfig::current()).screen(sample_household(), as_of());

        let sizes: Vec<_> = report
            .members
            .iter()
            .map(|member| member.snap.as_ref().map(|snap| snap.household_size))
            .collect();
        assert_eq!(sizes, vec![Some(2), Some(2), Some(0)]);
    }

    #[test]
    fn constant_set_flag_accepts_known_names_only() {
        assert_eq!(parse_constant_set("legacy"), Ok(ConstantSet::Legacy));
        assert!(parse_constant_set("2019").is_err());
    }

    #[test]
    fn screen_command_reads_household_documents() {
        let path = std::env::temp_dir().join("benefit-screener-demo-household.json");
        let document = serde_json::to_string(&sample_household()).expect("serializes");
        fs::write(&path, document).expect("temp file writes");

        let result = run_screen(ScreenArgs {
            household: path.clone(),
            as_of: Some(as_of()),
            constants: Some(ConstantSet::Current),
            json: true,
        });

        fs::remove_file(&path).ok();
        assert!(result.is_ok());
    }
}
