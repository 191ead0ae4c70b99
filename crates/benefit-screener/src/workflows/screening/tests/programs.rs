use super::common::*;

use crate::workflows::screening::domain::{
    Answer, ClientProfile, EnrollmentStatus, ExpenseType, HouseholdMember, IncomeType,
    MaritalStatus, ResidenceStatus, SelectionProgram,
};
use crate::workflows::screening::evaluation::{
    EvaluationEngine, EvaluationOutcome, Program, ProgramResult, ScreeningConfig, SelectionUpdate,
};
use crate::workflows::screening::writer::apply_patches;

fn only_result(outcome: &EvaluationOutcome, id: &str) -> ProgramResult {
    let member_id = member_id(id);
    let mut patches = outcome.for_member(&member_id);
    let patch = patches.next().expect("member has a patch");
    assert!(patches.next().is_none(), "one patch per member per program");
    patch.result.clone()
}

fn eligibility(outcome: &EvaluationOutcome, id: &str) -> Vec<String> {
    only_result(outcome, id).eligibility().to_vec()
}

#[test]
fn pace_single_member_with_twelve_thousand_prior_income_is_likely_eligible() {
    let mut ada = senior("m-1");
    ada.income
        .push(income("i-1", IncomeType::Previous, "Social Security", 1_000.0));

    let outcome = engine().evaluate_pace(&[ada], as_of());

    match only_result(&outcome, "m-1") {
        ProgramResult::Pace(result) => {
            approx(result.combined_income, 12_000.0);
            assert_eq!(result.eligibility, vec!["Likely Eligible for PACE"]);
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn pace_age_gate_opens_at_sixty_four_years_eleven_months() {
    let evaluation_date = date(2025, 6, 15);
    let mut on_boundary = senior("m-1");
    on_boundary.dob = Some("1960-07-15".to_string());
    let mut one_day_short = senior("m-2");
    one_day_short.dob = Some("1960-07-16".to_string());

    let outcome = engine().evaluate_pace(&[on_boundary, one_day_short], evaluation_date);

    assert_eq!(eligibility(&outcome, "m-1"), vec!["Likely Eligible for PACE"]);
    assert_eq!(eligibility(&outcome, "m-2"), vec!["Ineligible (Age)"]);
}

#[test]
fn pace_subtracts_prior_year_part_b_premiums_and_uses_buffer_band() {
    let mut ada = senior("m-1");
    ada.income
        .push(income("i-1", IncomeType::Previous, "Pension", 3_700.0));
    ada.expenses.push(expense(
        "e-1",
        ExpenseType::PreviousYear,
        "Medicare Part B Premium",
        200.0,
    ));

    let outcome = engine().evaluate_pace(&[ada], as_of());

    match only_result(&outcome, "m-1") {
        ProgramResult::Pace(result) => {
            approx(result.combined_income, 42_000.0);
            assert_eq!(
                result.eligibility,
                vec!["Likely Ineligible for PACE/PACENET (Income Within Buffer)"]
            );
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn pace_married_couple_uses_combined_income_and_married_table() {
    let mut ada = senior("m-1");
    let mut ben = senior("m-2");
    marry(&mut ada, &mut ben);
    ada.income
        .push(income("i-1", IncomeType::Previous, "Social Security", 1_000.0));
    ben.income
        .push(income("i-2", IncomeType::Previous, "Social Security", 1_500.0));

    let outcome = engine().evaluate_pace(&[ada, ben], as_of());

    for id in ["m-1", "m-2"] {
        match only_result(&outcome, id) {
            ProgramResult::Pace(result) => {
                approx(result.combined_income, 30_000.0);
                assert_eq!(result.eligibility, vec!["Likely Eligible for PACENET"]);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}

#[test]
fn pace_medicaid_enrollment_writes_sentinel_selection() {
    let mut ada = senior("m-1");
    ada.medicaid = Answer::Yes;

    let outcome = engine().evaluate_pace(std::slice::from_ref(&ada), as_of());
    let patch = outcome.patches.first().expect("patch");
    assert_eq!(
        patch.selection,
        Some(SelectionUpdate {
            program: SelectionProgram::Pace,
            status: EnrollmentStatus::OnMedicaid,
        })
    );
    assert_eq!(
        patch.result.eligibility(),
        ["Ineligible (Enrolled in Medicaid)".to_string()]
    );

    let mut members = vec![ada];
    apply_patches(&mut members, &outcome.patches);
    members[0].medicaid = Answer::No;
    let rerun = engine().evaluate_pace(&members, as_of());
    assert_eq!(
        eligibility(&rerun, "m-1"),
        vec!["Needs Current Enrollment Status"]
    );
}

#[test]
fn pace_missing_birth_date_is_a_member_failure_not_a_pass_failure() {
    let mut ada = senior("m-1");
    ada.dob = None;
    let ben = senior("m-2");

    let outcome = engine().evaluate_pace(&[ada, ben], as_of());

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].member_id, member_id("m-1"));
    assert_eq!(outcome.failures[0].program, Program::Pace);
    assert_eq!(outcome.for_member(&member_id("m-1")).count(), 0);
    assert_eq!(outcome.for_member(&member_id("m-2")).count(), 1);
}

#[test]
fn enrollment_answers_short_circuit_member_programs() {
    let mut ada = senior("m-1");
    ada.selections.lis = EnrollmentStatus::Enrolled;
    ada.selections.msp = EnrollmentStatus::NotInterested;
    ada.selections.pace = EnrollmentStatus::Unknown;

    let engine = engine();
    let members = [ada];
    assert_eq!(
        eligibility(&engine.evaluate_lis(&members, as_of()), "m-1"),
        vec!["Already Enrolled"]
    );
    assert_eq!(
        eligibility(&engine.evaluate_msp(&members, as_of()), "m-1"),
        vec!["Not Interested"]
    );
    assert_eq!(
        eligibility(&engine.evaluate_pace(&members, as_of()), "m-1"),
        vec!["Needs Current Enrollment Status"]
    );
}

#[test]
fn lis_records_both_shortfalls_when_income_and_assets_fail() {
    let mut ada = senior("m-1");
    ada.income
        .push(income("i-1", IncomeType::Current, "Pension", 2_500.0));
    ada.assets.push(asset("a-1", 20_000.0));

    let outcome = engine().evaluate_lis(&[ada], as_of());

    assert_eq!(
        eligibility(&outcome, "m-1"),
        vec![
            "Likely Ineligible for LIS (Income)",
            "Likely Ineligible for LIS (Assets)"
        ]
    );
}

#[test]
fn lis_ignores_income_recorded_without_a_frequency() {
    let mut ada = senior("m-1");
    ada.income.push(
        serde_json::from_value(serde_json::json!({
            "id": "i-1",
            "type": "Current",
            "amount": 3_000.0,
            "startDate": "2020-01-01"
        }))
        .expect("income parses"),
    );

    let outcome = engine().evaluate_lis(&[ada], as_of());

    match only_result(&outcome, "m-1") {
        ProgramResult::Lis(result) => {
            approx(result.combined_income, 0.0);
            assert_eq!(result.eligibility, vec!["Likely Eligible for LIS"]);
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn lis_asset_ceiling_follows_the_configured_constant_set() {
    let mut ada = senior("m-1");
    ada.income
        .push(income("i-1", IncomeType::Current, "Pension", 1_000.0));
    ada.assets.push(asset("a-1", 17_800.0));
    let members = [ada];

    let current = engine().evaluate_lis(&members, as_of());
    let legacy = EvaluationEngine::new(ScreeningConfig::legacy()).evaluate_lis(&members, as_of());

    assert_eq!(eligibility(&current, "m-1"), vec!["Likely Eligible for LIS"]);
    assert_eq!(
        eligibility(&legacy, "m-1"),
        vec!["Likely Ineligible for LIS (Assets)"]
    );
}

#[test]
fn lis_without_medicare_is_ineligible_and_flags_selection() {
    let mut ada = senior("m-1");
    ada.medicare = Answer::No;

    let outcome = engine().evaluate_lis(&[ada], as_of());
    let patch = outcome.patches.first().expect("patch");

    assert_eq!(
        patch.result.eligibility(),
        ["Ineligible (Not Enrolled in Medicare)".to_string()]
    );
    assert_eq!(
        patch.selection.map(|update| update.status),
        Some(EnrollmentStatus::NoMedicare)
    );
}

#[test]
fn msp_tiers_use_countable_monthly_income() {
    let mut qmb = senior("m-1");
    qmb.income
        .push(income("i-1", IncomeType::Current, "Wages", 2_000.0));
    let mut slmb = senior("m-2");
    slmb.income
        .push(income("i-2", IncomeType::Current, "Social Security", 1_400.0));
    let mut over = senior("m-3");
    over.income
        .push(income("i-3", IncomeType::Current, "Social Security", 1_800.0));

    let outcome = engine().evaluate_msp(&[qmb, slmb, over], as_of());

    match only_result(&outcome, "m-1") {
        ProgramResult::Msp(result) => {
            approx(result.countable_monthly_income, (2_000.0 - 65.0) / 2.0);
            assert_eq!(result.eligibility, vec!["Likely Eligible for QMB"]);
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(eligibility(&outcome, "m-2"), vec!["Likely Eligible for SLMB"]);
    assert_eq!(
        eligibility(&outcome, "m-3"),
        vec!["Likely Ineligible for MSP (Income)"]
    );
}

#[test]
fn msp_asset_ceiling_blocks_an_income_eligible_member() {
    let mut ada = senior("m-1");
    ada.income
        .push(income("i-1", IncomeType::Current, "Social Security", 900.0));
    ada.assets.push(asset("a-1", 9_500.0));

    let outcome = engine().evaluate_msp(&[ada], as_of());

    assert_eq!(
        eligibility(&outcome, "m-1"),
        vec!["Likely Ineligible for MSP (Assets)"]
    );
}

fn ptrr_client(residence: ResidenceStatus) -> ClientProfile {
    ClientProfile {
        residence_status_previous: residence,
        ..answered_client()
    }
}

fn ptrr_head() -> HouseholdMember {
    let mut head = senior("m-1");
    head.head_of_household = true;
    head.income
        .push(income("i-1", IncomeType::Previous, "Social Security", 1_000.0));
    head
}

#[test]
fn ptrr_halves_social_security_and_estimates_rebate() {
    let mut head = ptrr_head();
    head.expenses.push(expense(
        "e-1",
        ExpenseType::PreviousYear,
        "Property Tax",
        150.0,
    ));
    let other = senior("m-2");

    let outcome =
        engine().evaluate_ptrr(&[head, other], &ptrr_client(ResidenceStatus::Owner), as_of());

    match only_result(&outcome, "m-1") {
        ProgramResult::Ptrr(result) => {
            approx(result.combined_income, 6_000.0);
            approx(result.estimated_rebate, 1_000.0);
            assert_eq!(result.eligibility, vec!["Likely Eligible for PTRR"]);
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(eligibility(&outcome, "m-2"), vec!["Not Checked"]);
}

#[test]
fn ptrr_requires_a_matching_prior_year_expense() {
    let mut head = ptrr_head();
    head.expenses.push(expense(
        "e-1",
        ExpenseType::PreviousYear,
        "Property Tax",
        150.0,
    ));

    let outcome = engine().evaluate_ptrr(
        std::slice::from_ref(&head),
        &ptrr_client(ResidenceStatus::Renter),
        as_of(),
    );

    assert_eq!(
        eligibility(&outcome, "m-1"),
        vec!["Likely Ineligible for PTRR (No Relevant Expense)"]
    );
}

#[test]
fn ptrr_asks_for_residence_and_rejects_other_housing() {
    let head = ptrr_head();
    let members = [head];
    let engine = engine();

    assert_eq!(
        eligibility(
            &engine.evaluate_ptrr(&members, &ptrr_client(ResidenceStatus::Unknown), as_of()),
            "m-1"
        ),
        vec!["Needs Residence Status"]
    );
    assert_eq!(
        eligibility(
            &engine.evaluate_ptrr(&members, &ptrr_client(ResidenceStatus::Other), as_of()),
            "m-1"
        ),
        vec!["Ineligible (Residence Status)"]
    );
}

#[test]
fn ptrr_widowed_members_qualify_from_fifty() {
    let mut head = ptrr_head();
    head.dob = Some("1970-01-01".to_string());
    head.expenses
        .push(expense("e-1", ExpenseType::PreviousYear, "Rent", 600.0));
    let mut widowed = head.clone();
    widowed.previous_marital_status = MaritalStatus::Widowed;

    let engine = engine();
    let client = ptrr_client(ResidenceStatus::Renter);

    assert_eq!(
        eligibility(&engine.evaluate_ptrr(&[head], &client, as_of()), "m-1"),
        vec!["Ineligible (Age/Disability)"]
    );
    assert_eq!(
        eligibility(&engine.evaluate_ptrr(&[widowed], &client, as_of()), "m-1"),
        vec!["Likely Eligible for PTRR"]
    );
}

#[test]
fn rerunning_a_pass_yields_identical_patches() {
    let household = seeded_household("client-1");
    let engine = engine();

    let first = engine.evaluate(&household, as_of());
    let second = engine.evaluate(&household, as_of());

    assert_eq!(first, second);
    assert_eq!(first.patches.len(), Program::ALL.len() * household.members.len());
}
