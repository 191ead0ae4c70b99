use super::super::domain::{HouseholdMember, LisResult, SelectionProgram};
use super::super::income;
use super::super::relationships::SpousePair;
use super::policy::{labels, Benefit, Program, ShortfallReason, Verdict};
use super::status::{coverage_disqualifier, enrollment_gate, CoverageRule};
use super::{EligibilityPatch, EvaluationContext, EvaluationError, ProgramResult, SelectionUpdate};

/// Medicare Extra Help: a combined income test and a combined asset test.
pub(super) fn evaluate(
    ctx: &EvaluationContext<'_>,
    member: &HouseholdMember,
) -> Result<EligibilityPatch, EvaluationError> {
    if let Some((disqualifier, sentinel)) =
        coverage_disqualifier(member, CoverageRule::MedicareRequired)
    {
        return Ok(patch(
            member,
            (0.0, 0.0),
            &[Verdict::Ineligible(disqualifier)],
            Some(SelectionUpdate {
                program: SelectionProgram::Lis,
                status: sentinel,
            }),
        ));
    }

    if let Some(verdict) = enrollment_gate(member.selections.lis) {
        return Ok(patch(member, (0.0, 0.0), &[verdict], None));
    }

    let pair = SpousePair::resolve(ctx.members, member, ctx.config.spouse_resolution);
    let combined_income = pair.combined(|person| current_yearly_income(person, ctx));
    let combined_assets = pair.combined_assets();

    let limits = if pair.has_spouse() || member.is_married() {
        ctx.config.lis.married
    } else {
        ctx.config.lis.single
    };

    let mut verdicts = Vec::new();
    if combined_income > limits.income {
        verdicts.push(Verdict::LikelyIneligible(
            Program::Lis,
            ShortfallReason::Income,
        ));
    }
    if combined_assets > limits.assets {
        verdicts.push(Verdict::LikelyIneligible(
            Program::Lis,
            ShortfallReason::Assets,
        ));
    }
    if verdicts.is_empty() {
        verdicts.push(Verdict::LikelyEligible(Benefit::Lis));
    }

    Ok(patch(
        member,
        (combined_income, combined_assets),
        &verdicts,
        None,
    ))
}

pub(super) fn current_yearly_income(person: &HouseholdMember, ctx: &EvaluationContext<'_>) -> f64 {
    person
        .income
        .iter()
        .filter(|record| record.is_current())
        .map(|record| income::yearly(record, ctx.as_of))
        .sum()
}

fn patch(
    member: &HouseholdMember,
    (combined_income, combined_assets): (f64, f64),
    verdicts: &[Verdict],
    selection: Option<SelectionUpdate>,
) -> EligibilityPatch {
    EligibilityPatch {
        member_id: member.household_member_id.clone(),
        result: ProgramResult::Lis(LisResult {
            combined_income,
            combined_assets,
            eligibility: labels(verdicts),
        }),
        selection,
    }
}
