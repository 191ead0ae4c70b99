use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::HouseholdMember;

/// How a member's spouse is located inside the household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpouseResolution {
    /// Both members carry a `spouse` relationship naming each other.
    Relationships,
    /// The member's `previousSpouseId` names the spouse; no reciprocity is required.
    LegacySpouseId,
}

/// Locate `member`'s spouse among `members`. A missing or one-sided link means no spouse.
pub fn find_spouse<'a>(
    members: &'a [HouseholdMember],
    member: &HouseholdMember,
    strategy: SpouseResolution,
) -> Option<&'a HouseholdMember> {
    match strategy {
        SpouseResolution::Relationships => mutual_spouse(members, member),
        SpouseResolution::LegacySpouseId => legacy_spouse(members, member),
    }
}

fn mutual_spouse<'a>(
    members: &'a [HouseholdMember],
    member: &HouseholdMember,
) -> Option<&'a HouseholdMember> {
    let own_id = &member.household_member_id;
    let mut candidates = member
        .relationships
        .iter()
        .filter(|link| link.is_spouse() && &link.related_member_id != own_id)
        .filter_map(|link| {
            members
                .iter()
                .find(|peer| peer.household_member_id == link.related_member_id)
        })
        .filter(|peer| {
            peer.relationships
                .iter()
                .any(|back| back.is_spouse() && &back.related_member_id == own_id)
        });

    let spouse = candidates.next();
    if spouse.is_some() && candidates.next().is_some() {
        debug!(member = %own_id, "multiple reciprocal spouse links; using the first");
    }
    spouse
}

fn legacy_spouse<'a>(
    members: &'a [HouseholdMember],
    member: &HouseholdMember,
) -> Option<&'a HouseholdMember> {
    let spouse_id = member.previous_spouse_id.as_ref()?;
    if spouse_id == &member.household_member_id {
        return None;
    }
    let spouse = members
        .iter()
        .find(|peer| &peer.household_member_id == spouse_id);
    if spouse.is_none() {
        debug!(member = %member.household_member_id, spouse = %spouse_id, "spouse id not in household");
    }
    spouse
}

/// A member together with the spouse resolved for them, if any.
#[derive(Debug, Clone, Copy)]
pub struct SpousePair<'a> {
    pub member: &'a HouseholdMember,
    pub spouse: Option<&'a HouseholdMember>,
}

impl<'a> SpousePair<'a> {
    pub fn resolve(
        members: &'a [HouseholdMember],
        member: &'a HouseholdMember,
        strategy: SpouseResolution,
    ) -> Self {
        Self {
            member,
            spouse: find_spouse(members, member, strategy),
        }
    }

    pub fn has_spouse(&self) -> bool {
        self.spouse.is_some()
    }

    /// `figure` for the member plus the same figure for the spouse.
    pub fn combined<F>(&self, figure: F) -> f64
    where
        F: Fn(&HouseholdMember) -> f64,
    {
        figure(self.member) + self.spouse.map(&figure).unwrap_or(0.0)
    }

    pub fn combined_assets(&self) -> f64 {
        self.combined(HouseholdMember::total_assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::screening::domain::{MemberId, Relationship};

    fn member(id: &str) -> HouseholdMember {
        HouseholdMember::new(id, id)
    }

    fn link(from: &mut HouseholdMember, to: &str, relationship: &str) {
        from.relationships.push(Relationship {
            related_member_id: MemberId(to.to_string()),
            relationship: relationship.to_string(),
        });
    }

    #[test]
    fn reciprocal_spouse_links_pair_members() {
        let mut a = member("a");
        let mut b = member("b");
        link(&mut a, "b", "spouse");
        link(&mut b, "a", "Spouse");
        let members = vec![a, b, member("c")];

        let spouse = find_spouse(&members, &members[0], SpouseResolution::Relationships)
            .expect("spouse found");
        assert_eq!(spouse.household_member_id.0, "b");
    }

    #[test]
    fn one_sided_link_is_not_honoured() {
        let mut a = member("a");
        let mut b = member("b");
        link(&mut a, "b", "spouse");
        link(&mut b, "a", "sibling");
        let members = vec![a, b];

        assert!(find_spouse(&members, &members[0], SpouseResolution::Relationships).is_none());
        assert!(find_spouse(&members, &members[1], SpouseResolution::Relationships).is_none());
    }

    #[test]
    fn legacy_id_skips_reciprocity_and_tolerates_missing_members() {
        let mut a = member("a");
        a.previous_spouse_id = Some(MemberId("b".to_string()));
        let mut orphan = member("c");
        orphan.previous_spouse_id = Some(MemberId("gone".to_string()));
        let members = vec![a, member("b"), orphan];

        let spouse = find_spouse(&members, &members[0], SpouseResolution::LegacySpouseId)
            .expect("legacy spouse found");
        assert_eq!(spouse.household_member_id.0, "b");
        assert!(find_spouse(&members, &members[2], SpouseResolution::LegacySpouseId).is_none());
        assert!(find_spouse(&members, &members[0], SpouseResolution::Relationships).is_none());
    }

    #[test]
    fn pair_combines_figures() {
        let mut a = member("a");
        let mut b = member("b");
        link(&mut a, "b", "spouse");
        link(&mut b, "a", "spouse");
        a.assets.push(crate::workflows::screening::domain::Asset {
            id: "a-1".to_string(),
            asset_type: "Checking".to_string(),
            description: String::new(),
            value: 1500.0,
        });
        b.assets.push(crate::workflows::screening::domain::Asset {
            id: "b-1".to_string(),
            asset_type: "Savings".to_string(),
            description: String::new(),
            value: 2500.0,
        });
        let members = vec![a, b];

        let pair = SpousePair::resolve(&members, &members[0], SpouseResolution::Relationships);
        assert!(pair.has_spouse());
        assert_eq!(pair.combined_assets(), 4000.0);
    }
}
