use super::super::domain::{
    Answer, ClientProfile, EnrollmentStatus, HeatingCost, LiheapResult, ResidenceStatus,
};
use super::lis::current_yearly_income;
use super::policy::{labels, Benefit, Program, ShortfallReason, StatusQuestion, Verdict};
use super::{EligibilityPatch, EvaluationContext, ProgramResult};

/// Household-level heating assistance. Every member receives the same result.
pub(super) fn evaluate(ctx: &EvaluationContext<'_>) -> Vec<EligibilityPatch> {
    let household_size = ctx.members.len();
    let income_limit = ctx.config.liheap.income_limits.lookup(household_size);

    let (verdict, combined_income) = match status_verdict(ctx.client) {
        Some(verdict) => (verdict, 0.0),
        None => {
            let combined_income: f64 = ctx
                .members
                .iter()
                .map(|member| current_yearly_income(member, ctx))
                .sum();
            let verdict = if combined_income <= income_limit {
                Verdict::LikelyEligible(Benefit::Liheap)
            } else {
                Verdict::LikelyIneligible(Program::Liheap, ShortfallReason::Income)
            };
            (verdict, combined_income)
        }
    };

    let result = LiheapResult {
        combined_income,
        household_size,
        income_limit,
        eligibility: labels(&[verdict]),
    };

    ctx.members
        .iter()
        .map(|member| EligibilityPatch {
            member_id: member.household_member_id.clone(),
            result: ProgramResult::Liheap(result.clone()),
            selection: None,
        })
        .collect()
}

/// Walk the client answers in priority order; `None` means the income table decides.
fn status_verdict(client: &ClientProfile) -> Option<Verdict> {
    match client.liheap_enrollment {
        EnrollmentStatus::NotInterested => return Some(Verdict::NotInterested),
        EnrollmentStatus::Unknown | EnrollmentStatus::OnMedicaid | EnrollmentStatus::NoMedicare => {
            return Some(Verdict::NeedsStatus(StatusQuestion::CurrentEnrollment));
        }
        EnrollmentStatus::Enrolled | EnrollmentStatus::NotEnrolled => {}
    }

    if client.heating_crisis == Answer::Unknown {
        return Some(Verdict::NeedsStatus(StatusQuestion::HeatingCrisis));
    }
    if client.liheap_enrollment == EnrollmentStatus::Enrolled && client.heating_crisis == Answer::No {
        return Some(Verdict::AlreadyEnrolled);
    }
    if client.residence_status_current == ResidenceStatus::Unknown {
        return Some(Verdict::NeedsStatus(StatusQuestion::Residence));
    }
    if client.subsidized_housing == Answer::Unknown {
        return Some(Verdict::NeedsStatus(StatusQuestion::SubsidizedHousing));
    }
    if client.heating_cost == HeatingCost::Unknown {
        return Some(Verdict::NeedsStatus(StatusQuestion::HeatingCost));
    }
    if client.subsidized_housing.is_yes() && client.heating_cost == HeatingCost::IncludedInRent {
        return Some(Verdict::LikelyIneligible(
            Program::Liheap,
            ShortfallReason::HeatIncludedInRent,
        ));
    }
    if client.heating_crisis.is_yes() {
        return Some(Verdict::LikelyEligible(Benefit::LiheapCrisis));
    }
    None
}
