use super::super::domain::{HouseholdMember, MspResult, SelectionProgram};
use super::super::income;
use super::super::relationships::SpousePair;
use super::config::{first_bracket, MspTables};
use super::lis::current_yearly_income;
use super::policy::{labels, Benefit, Program, ShortfallReason, Verdict};
use super::status::{coverage_disqualifier, enrollment_gate, CoverageRule};
use super::{EligibilityPatch, EvaluationContext, EvaluationError, ProgramResult, SelectionUpdate};

#[derive(Debug, Clone, Copy, Default)]
struct MspFigures {
    combined_income: f64,
    countable_monthly_income: f64,
    combined_assets: f64,
}

/// Medicare Savings Program: asset ceiling, then QMB/SLMB/QI by countable monthly income.
pub(super) fn evaluate(
    ctx: &EvaluationContext<'_>,
    member: &HouseholdMember,
) -> Result<EligibilityPatch, EvaluationError> {
    let tables = &ctx.config.msp;

    if let Some((disqualifier, sentinel)) =
        coverage_disqualifier(member, CoverageRule::MedicareRequired)
    {
        return Ok(patch(
            member,
            MspFigures::default(),
            &[Verdict::Ineligible(disqualifier)],
            Some(SelectionUpdate {
                program: SelectionProgram::Msp,
                status: sentinel,
            }),
        ));
    }

    if let Some(verdict) = enrollment_gate(member.selections.msp) {
        return Ok(patch(member, MspFigures::default(), &[verdict], None));
    }

    let pair = SpousePair::resolve(ctx.members, member, ctx.config.spouse_resolution);
    let figures = MspFigures {
        combined_income: pair.combined(|person| current_yearly_income(person, ctx)),
        countable_monthly_income: pair.combined(|person| countable_monthly_income(person, ctx, tables)),
        combined_assets: pair.combined_assets(),
    };

    let limits = if pair.has_spouse() || member.is_married() {
        &tables.married
    } else {
        &tables.single
    };

    let tier = first_bracket(&limits.tiers, figures.countable_monthly_income).copied();
    let mut verdicts = Vec::new();
    if figures.combined_assets > limits.assets {
        verdicts.push(Verdict::LikelyIneligible(Program::Msp, ShortfallReason::Assets));
    }
    if tier.is_none() {
        verdicts.push(Verdict::LikelyIneligible(Program::Msp, ShortfallReason::Income));
    }
    match tier {
        Some(tier) if verdicts.is_empty() => {
            verdicts.push(Verdict::LikelyEligible(Benefit::from(tier)));
        }
        _ => {}
    }

    Ok(patch(member, figures, &verdicts, None))
}

/// Monthly current income after the earned-income and general disregards.
fn countable_monthly_income(
    person: &HouseholdMember,
    ctx: &EvaluationContext<'_>,
    tables: &MspTables,
) -> f64 {
    person
        .income
        .iter()
        .filter(|record| record.is_current())
        .map(|record| {
            let monthly = income::monthly(record, ctx.as_of);
            if record.is_earned() {
                ((monthly - tables.earned_income_disregard) / 2.0).max(0.0)
            } else {
                (monthly - tables.general_income_disregard).max(0.0)
            }
        })
        .sum()
}

fn patch(
    member: &HouseholdMember,
    figures: MspFigures,
    verdicts: &[Verdict],
    selection: Option<SelectionUpdate>,
) -> EligibilityPatch {
    EligibilityPatch {
        member_id: member.household_member_id.clone(),
        result: ProgramResult::Msp(MspResult {
            combined_income: figures.combined_income,
            countable_monthly_income: figures.countable_monthly_income,
            combined_assets: figures.combined_assets,
            eligibility: labels(verdicts),
        }),
        selection,
    }
}
