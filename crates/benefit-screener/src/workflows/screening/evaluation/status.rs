//! Enrollment-status gates shared by the member-level evaluators.

use super::super::domain::{EnrollmentStatus, HouseholdMember};
use super::policy::{Disqualifier, StatusQuestion, Verdict};

/// Which coverage facts disqualify a member before any income math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CoverageRule {
    /// Medicaid enrollment disqualifies.
    MedicaidExcluded,
    /// Medicare is required and Medicaid enrollment disqualifies.
    MedicareRequired,
}

/// The disqualifier that applies, with the sentinel written back to the selection.
pub(super) fn coverage_disqualifier(
    member: &HouseholdMember,
    rule: CoverageRule,
) -> Option<(Disqualifier, EnrollmentStatus)> {
    if rule == CoverageRule::MedicareRequired && !member.medicare.is_yes() {
        return Some((Disqualifier::NoMedicare, EnrollmentStatus::NoMedicare));
    }
    if member.medicaid.is_yes() {
        return Some((Disqualifier::OnMedicaid, EnrollmentStatus::OnMedicaid));
    }
    None
}

/// Fixed verdict for every enrollment answer except "not enrolled".
///
/// Sentinels left behind by an earlier disqualification count as unanswered.
pub(super) fn enrollment_gate(status: EnrollmentStatus) -> Option<Verdict> {
    match status {
        EnrollmentStatus::NotEnrolled => None,
        EnrollmentStatus::Enrolled => Some(Verdict::AlreadyEnrolled),
        EnrollmentStatus::NotInterested => Some(Verdict::NotInterested),
        EnrollmentStatus::Unknown | EnrollmentStatus::OnMedicaid | EnrollmentStatus::NoMedicare => {
            Some(Verdict::NeedsStatus(StatusQuestion::CurrentEnrollment))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::screening::domain::Answer;

    #[test]
    fn medicare_is_checked_before_medicaid() {
        let mut member = HouseholdMember::new("m-1", "Ada");
        member.medicare = Answer::No;
        member.medicaid = Answer::Yes;
        assert_eq!(
            coverage_disqualifier(&member, CoverageRule::MedicareRequired),
            Some((Disqualifier::NoMedicare, EnrollmentStatus::NoMedicare))
        );
        assert_eq!(
            coverage_disqualifier(&member, CoverageRule::MedicaidExcluded),
            Some((Disqualifier::OnMedicaid, EnrollmentStatus::OnMedicaid))
        );
    }

    #[test]
    fn stale_sentinel_asks_again() {
        assert_eq!(
            enrollment_gate(EnrollmentStatus::OnMedicaid),
            Some(Verdict::NeedsStatus(StatusQuestion::CurrentEnrollment))
        );
        assert_eq!(enrollment_gate(EnrollmentStatus::NotEnrolled), None);
    }
}
