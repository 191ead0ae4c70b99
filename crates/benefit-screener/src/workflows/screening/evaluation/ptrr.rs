use super::super::domain::{ExpenseType, HouseholdMember, PtrrResult, ResidenceStatus};
use super::super::income::{self, ActiveWindow};
use super::super::relationships::SpousePair;
use super::config::{first_bracket, PtrrTables};
use super::policy::{
    labels, Benefit, Disqualifier, Program, ShortfallReason, StatusQuestion, Verdict,
};
use super::status::enrollment_gate;
use super::{EligibilityPatch, EvaluationContext, EvaluationError, ProgramResult};

/// Property-tax/rent rebate, screened for the head of household only.
pub(super) fn evaluate(
    ctx: &EvaluationContext<'_>,
    member: &HouseholdMember,
) -> Result<EligibilityPatch, EvaluationError> {
    let tables = &ctx.config.ptrr;

    if !member.head_of_household {
        return Ok(patch(member, 0.0, 0.0, &[Verdict::NotChecked]));
    }

    if let Some(verdict) = enrollment_gate(member.selections.ptrr) {
        return Ok(patch(member, 0.0, 0.0, &[verdict]));
    }

    let age = member.age_on(ctx.as_of)?;
    let qualifies = age >= tables.minimum_age
        || (age >= tables.widowed_minimum_age && member.is_widowed())
        || (age >= tables.disabled_minimum_age && member.disability.is_yes());
    if !qualifies {
        return Ok(patch(
            member,
            0.0,
            0.0,
            &[Verdict::Ineligible(Disqualifier::AgeOrDisability)],
        ));
    }

    let residence = ctx.client.residence_status_previous;
    let expense_kind = match residence {
        ResidenceStatus::Owner => &tables.property_tax_kind,
        ResidenceStatus::Renter => &tables.rent_kind,
        ResidenceStatus::Other => {
            return Ok(patch(
                member,
                0.0,
                0.0,
                &[Verdict::Ineligible(Disqualifier::ResidenceStatus)],
            ));
        }
        ResidenceStatus::Unknown => {
            return Ok(patch(
                member,
                0.0,
                0.0,
                &[Verdict::NeedsStatus(StatusQuestion::Residence)],
            ));
        }
    };

    let window = ActiveWindow::previous_year(ctx.as_of)
        .ok_or(EvaluationError::InvalidEvaluationDate(ctx.as_of))?;
    let pair = SpousePair::resolve(ctx.members, member, ctx.config.spouse_resolution);
    let combined_income = own_prior_year_income(member, ctx, window, tables)
        + pair
            .spouse
            .map(|spouse| spouse_prior_year_income(spouse, ctx, window))
            .unwrap_or(0.0);

    let Some(rebate) = first_bracket(&tables.rebates, combined_income).copied() else {
        return Ok(patch(
            member,
            combined_income,
            0.0,
            &[Verdict::LikelyIneligible(
                Program::Ptrr,
                ShortfallReason::Income,
            )],
        ));
    };

    let has_expense = ctx.members.iter().any(|person| {
        person.expenses.iter().any(|expense| {
            expense.expense_type == ExpenseType::PreviousYear && expense.kind_is(expense_kind)
        })
    });
    if !has_expense {
        return Ok(patch(
            member,
            combined_income,
            0.0,
            &[Verdict::LikelyIneligible(
                Program::Ptrr,
                ShortfallReason::NoRelevantExpense,
            )],
        ));
    }

    Ok(patch(
        member,
        combined_income,
        rebate,
        &[Verdict::LikelyEligible(Benefit::Ptrr)],
    ))
}

/// The head's prior-year income, with Social Security type benefits counted at half.
fn own_prior_year_income(
    member: &HouseholdMember,
    ctx: &EvaluationContext<'_>,
    window: ActiveWindow,
    tables: &PtrrTables,
) -> f64 {
    member
        .income
        .iter()
        .filter(|record| record.is_previous())
        .map(|record| {
            let yearly = income::yearly_in(record, ctx.as_of, window);
            if tables
                .halved_income_kinds
                .iter()
                .any(|kind| record.kind_is(kind))
            {
                yearly / 2.0
            } else {
                yearly
            }
        })
        .sum()
}

fn spouse_prior_year_income(
    spouse: &HouseholdMember,
    ctx: &EvaluationContext<'_>,
    window: ActiveWindow,
) -> f64 {
    spouse
        .income
        .iter()
        .filter(|record| record.is_previous())
        .map(|record| income::yearly_in(record, ctx.as_of, window))
        .sum()
}

fn patch(
    member: &HouseholdMember,
    combined_income: f64,
    estimated_rebate: f64,
    verdicts: &[Verdict],
) -> EligibilityPatch {
    EligibilityPatch {
        member_id: member.household_member_id.clone(),
        result: ProgramResult::Ptrr(PtrrResult {
            combined_income,
            estimated_rebate,
            eligibility: labels(verdicts),
        }),
        selection: None,
    }
}
