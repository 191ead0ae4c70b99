use super::super::domain::{ExpenseType, HouseholdMember, PaceResult, SelectionProgram};
use super::super::income::{self, ActiveWindow};
use super::super::relationships::SpousePair;
use super::config::first_bracket;
use super::policy::{labels, Disqualifier, Program, ShortfallReason, Verdict};
use super::status::{coverage_disqualifier, enrollment_gate, CoverageRule};
use super::{EligibilityPatch, EvaluationContext, EvaluationError, ProgramResult, SelectionUpdate};

pub(super) fn evaluate(
    ctx: &EvaluationContext<'_>,
    member: &HouseholdMember,
) -> Result<EligibilityPatch, EvaluationError> {
    let tables = &ctx.config.pace;

    if let Some((disqualifier, sentinel)) =
        coverage_disqualifier(member, CoverageRule::MedicaidExcluded)
    {
        return Ok(patch(
            member,
            0.0,
            &[Verdict::Ineligible(disqualifier)],
            Some(SelectionUpdate {
                program: SelectionProgram::Pace,
                status: sentinel,
            }),
        ));
    }

    if !member.has_reached_months(tables.minimum_age_months, ctx.as_of)? {
        return Ok(patch(member, 0.0, &[Verdict::Ineligible(Disqualifier::Age)], None));
    }

    if let Some(verdict) = enrollment_gate(member.selections.pace) {
        return Ok(patch(member, 0.0, &[verdict], None));
    }

    let window = ActiveWindow::previous_year(ctx.as_of)
        .ok_or(EvaluationError::InvalidEvaluationDate(ctx.as_of))?;
    let pair = SpousePair::resolve(ctx.members, member, ctx.config.spouse_resolution);
    let combined_income =
        pair.combined(|person| prior_year_income(person, ctx, window, &tables.part_b_premium_kind));

    let brackets = if pair.has_spouse() || member.is_married() {
        &tables.married
    } else {
        &tables.single
    };
    let verdict = first_bracket(brackets, combined_income)
        .map(|tier| Verdict::from(*tier))
        .unwrap_or(Verdict::LikelyIneligible(
            Program::Pace,
            ShortfallReason::Income,
        ));

    Ok(patch(member, combined_income, &[verdict], None))
}

/// Prior-year income net of prior-year Medicare Part B premiums, never below zero.
fn prior_year_income(
    person: &HouseholdMember,
    ctx: &EvaluationContext<'_>,
    window: ActiveWindow,
    part_b_premium_kind: &str,
) -> f64 {
    let gross: f64 = person
        .income
        .iter()
        .filter(|record| record.is_previous())
        .map(|record| income::yearly_in(record, ctx.as_of, window))
        .sum();
    let premiums: f64 = person
        .expenses
        .iter()
        .filter(|expense| {
            expense.expense_type == ExpenseType::PreviousYear
                && expense.kind_is(part_b_premium_kind)
        })
        .map(|expense| income::yearly_in(expense, ctx.as_of, window))
        .sum();

    (gross - premiums).max(0.0)
}

fn patch(
    member: &HouseholdMember,
    combined_income: f64,
    verdicts: &[Verdict],
    selection: Option<SelectionUpdate>,
) -> EligibilityPatch {
    EligibilityPatch {
        member_id: member.household_member_id.clone(),
        result: ProgramResult::Pace(PaceResult {
            combined_income,
            eligibility: labels(verdicts),
        }),
        selection,
    }
}
