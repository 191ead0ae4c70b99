//! Merges evaluator patches onto member records.

use std::collections::HashMap;

use tracing::warn;

use super::domain::{HouseholdMember, MemberId};
use super::evaluation::{EligibilityPatch, ProgramResult};

/// Apply every patch to the matching member, returning how many were applied.
///
/// Patches naming a member that is not in `members` are skipped. Members without a
/// patch for a program keep whatever result they already carried.
pub fn apply_patches(members: &mut [HouseholdMember], patches: &[EligibilityPatch]) -> usize {
    let index: HashMap<MemberId, usize> = members
        .iter()
        .enumerate()
        .map(|(position, member)| (member.household_member_id.clone(), position))
        .collect();

    let mut applied = 0;
    for patch in patches {
        let Some(&position) = index.get(&patch.member_id) else {
            warn!(member = %patch.member_id, program = patch.result.program().label(), "patch for unknown member dropped");
            continue;
        };
        apply_patch(&mut members[position], patch);
        applied += 1;
    }
    applied
}

fn apply_patch(member: &mut HouseholdMember, patch: &EligibilityPatch) {
    match &patch.result {
        ProgramResult::Pace(result) => member.pace = Some(result.clone()),
        ProgramResult::Lis(result) => member.lis = Some(result.clone()),
        ProgramResult::Msp(result) => member.msp = Some(result.clone()),
        ProgramResult::Ptrr(result) => member.ptrr = Some(result.clone()),
        ProgramResult::Snap(result) => member.snap = Some(result.clone()),
        ProgramResult::Liheap(result) => member.liheap = Some(result.clone()),
    }
    if let Some(update) = patch.selection {
        member.selections.set(update.program, update.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::screening::domain::{EnrollmentStatus, PaceResult, SelectionProgram};
    use crate::workflows::screening::evaluation::SelectionUpdate;

    fn pace_patch(member: &str, label: &str, selection: Option<SelectionUpdate>) -> EligibilityPatch {
        EligibilityPatch {
            member_id: MemberId(member.to_string()),
            result: ProgramResult::Pace(PaceResult {
                combined_income: 0.0,
                eligibility: vec![label.to_string()],
            }),
            selection,
        }
    }

    #[test]
    fn patches_land_on_matching_members_only() {
        let mut members = vec![
            HouseholdMember::new("m-1", "Ada"),
            HouseholdMember::new("m-2", "Ben"),
        ];
        let patches = vec![
            pace_patch("m-2", "Ineligible (Age)", None),
            pace_patch("ghost", "Ineligible (Age)", None),
        ];

        assert_eq!(apply_patches(&mut members, &patches), 1);
        assert!(members[0].pace.is_none());
        assert_eq!(
            members[1].pace.as_ref().map(|result| result.eligibility.clone()),
            Some(vec!["Ineligible (Age)".to_string()])
        );
    }

    #[test]
    fn selection_sentinel_is_written_back() {
        let mut members = vec![HouseholdMember::new("m-1", "Ada")];
        let patch = pace_patch(
            "m-1",
            "Ineligible (Enrolled in Medicaid)",
            Some(SelectionUpdate {
                program: SelectionProgram::Pace,
                status: EnrollmentStatus::OnMedicaid,
            }),
        );

        apply_patches(&mut members, &[patch]);
        assert_eq!(members[0].selections.pace, EnrollmentStatus::OnMedicaid);
    }
}
