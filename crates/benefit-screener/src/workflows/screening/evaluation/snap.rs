//! SNAP meal-unit grouping and the net-income/benefit formula.
//!
//! The unit is the unit of computation: one result is computed per meal unit and
//! copied onto every member of it.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::super::domain::{normalize_label, ExpenseType, HouseholdMember, SnapResult};
use super::super::income;
use super::config::{SnapTables, UtilityAllowances};
use super::policy::{labels, Benefit, Program, ShortfallReason, Verdict};
use super::{EligibilityPatch, EvaluationContext, ProgramResult};

/// Members who purchase and prepare food together.
#[derive(Debug, Clone)]
pub struct MealUnit<'a> {
    members: Vec<&'a HouseholdMember>,
}

impl<'a> MealUnit<'a> {
    /// Every member answering `meals = yes` forms a single unit; there is no sub-grouping.
    pub fn from_members(members: &'a [HouseholdMember]) -> Option<Self> {
        let members: Vec<_> = members
            .iter()
            .filter(|member| member.shares_meals())
            .collect();
        if members.is_empty() {
            None
        } else {
            Some(Self { members })
        }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[&'a HouseholdMember] {
        &self.members
    }

    pub fn contains(&self, member: &HouseholdMember) -> bool {
        self.members
            .iter()
            .any(|peer| peer.household_member_id == member.household_member_id)
    }

    /// True when any member is at least `elderly_age` or reports a disability.
    /// Members whose age cannot be determined count as neither.
    pub fn has_elderly_or_disabled(&self, as_of: NaiveDate, elderly_age: u32) -> bool {
        self.members.iter().any(|member| {
            if member.disability.is_yes() {
                return true;
            }
            match member.age_on(as_of) {
                Ok(age) => age >= elderly_age,
                Err(err) => {
                    warn!(member = %member.household_member_id, error = %err, "age unknown for SNAP elderly check");
                    false
                }
            }
        })
    }
}

/// Sums gathered across the unit before the formula runs. Expenses are monthly.
#[derive(Debug, Clone, Default, PartialEq)]
struct UnitTotals {
    earned_yearly: f64,
    other_yearly: f64,
    assets: f64,
    shelter: f64,
    utility: f64,
    medical: f64,
    other_expenses: f64,
    utility_kinds: BTreeSet<String>,
}

impl UnitTotals {
    fn gather(unit: &MealUnit<'_>, as_of: NaiveDate) -> Self {
        let mut totals = UnitTotals::default();

        for member in unit.members() {
            for record in member.income.iter().filter(|record| record.is_current()) {
                let yearly = income::yearly(record, as_of);
                if record.is_earned() {
                    totals.earned_yearly += yearly;
                } else {
                    totals.other_yearly += yearly;
                }
            }
            totals.assets += member.total_assets();
        }

        // Household expenses are recorded once, on whichever member entered them first.
        totals.shelter = first_contributor_total(unit, &ExpenseType::Shelter, as_of);
        totals.medical = first_contributor_total(unit, &ExpenseType::Medical, as_of);
        totals.other_expenses = first_contributor_total(unit, &ExpenseType::Other, as_of);
        totals.utility = first_contributor_total(unit, &ExpenseType::Utility, as_of);
        if let Some(contributor) = first_contributor(unit, &ExpenseType::Utility) {
            totals.utility_kinds = contributor
                .expenses
                .iter()
                .filter(|expense| expense.expense_type == ExpenseType::Utility)
                .map(|expense| normalize_label(&expense.kind))
                .collect();
        }

        totals
    }

    fn earned_monthly(&self) -> f64 {
        self.earned_yearly / 12.0
    }

    fn other_monthly(&self) -> f64 {
        self.other_yearly / 12.0
    }

    fn gross_monthly(&self) -> f64 {
        (self.earned_yearly + self.other_yearly) / 12.0
    }
}

fn first_contributor<'a>(unit: &MealUnit<'a>, category: &ExpenseType) -> Option<&'a HouseholdMember> {
    unit.members()
        .iter()
        .copied()
        .find(|member| member.expenses.iter().any(|expense| &expense.expense_type == category))
}

fn first_contributor_total(unit: &MealUnit<'_>, category: &ExpenseType, as_of: NaiveDate) -> f64 {
    let Some(member) = first_contributor(unit, category) else {
        return 0.0;
    };
    let skipped = unit
        .members()
        .iter()
        .filter(|peer| peer.household_member_id != member.household_member_id)
        .filter(|peer| peer.expenses.iter().any(|expense| &expense.expense_type == category))
        .count();
    if skipped > 0 {
        debug!(?category, skipped, "later members' expenses not re-added");
    }
    member
        .expenses
        .iter()
        .filter(|expense| &expense.expense_type == category)
        .map(|expense| income::monthly(expense, as_of))
        .sum()
}

/// Flat heating allowance, then the limited basic allowance, then per-kind allowances.
/// Homeless households always receive the homeless allowance.
pub(super) fn utility_allowance(
    kinds: &BTreeSet<String>,
    homeless: bool,
    utilities: &UtilityAllowances,
) -> f64 {
    if homeless {
        return utilities.homeless;
    }
    if kinds.contains(&normalize_label(&utilities.heating_cooling_kind)) {
        return utilities.heating_cooling;
    }
    let basic_count = utilities
        .basic_kinds
        .iter()
        .filter(|kind| kinds.contains(&normalize_label(kind)))
        .count();
    if basic_count >= 2 {
        return utilities.basic_limited;
    }
    utilities
        .per_kind
        .iter()
        .filter(|(kind, _)| kinds.contains(&normalize_label(kind)))
        .map(|(_, allowance)| allowance)
        .sum()
}

pub(super) fn evaluate(ctx: &EvaluationContext<'_>) -> Vec<EligibilityPatch> {
    let unit_result = MealUnit::from_members(ctx.members).map(|unit| {
        let result = compute(&unit, ctx);
        (unit, result)
    });

    ctx.members
        .iter()
        .map(|member| {
            let result = match &unit_result {
                Some((unit, result)) if unit.contains(member) => result.clone(),
                _ => not_checked(),
            };
            EligibilityPatch {
                member_id: member.household_member_id.clone(),
                result: ProgramResult::Snap(result),
                selection: None,
            }
        })
        .collect()
}

fn compute(unit: &MealUnit<'_>, ctx: &EvaluationContext<'_>) -> SnapResult {
    let tables: &SnapTables = &ctx.config.snap;
    let size = unit.size();
    let totals = UnitTotals::gather(unit, ctx.as_of);
    let elderly_or_disabled = unit.has_elderly_or_disabled(ctx.as_of, tables.elderly_age);

    let utility_allowance =
        utility_allowance(&totals.utility_kinds, ctx.client.homeless, &tables.utilities);
    let standard_deduction = tables.standard_deductions.lookup(size);
    let medical_expenses = if totals.medical < tables.medical_expense_minimum {
        0.0
    } else {
        totals.medical
    };

    let net_income = (tables.earned_income_share * totals.earned_monthly() + totals.other_monthly()
        - standard_deduction
        - medical_expenses
        - totals.other_expenses)
        .max(0.0);

    let uncapped_shelter = (totals.shelter + utility_allowance - net_income / 2.0).max(0.0);
    let excess_shelter_cost = if elderly_or_disabled {
        uncapped_shelter
    } else {
        uncapped_shelter.min(tables.shelter_cap)
    };
    let final_net_income = (net_income - excess_shelter_cost).max(0.0);

    let gross_monthly_income = totals.gross_monthly();
    let mut verdicts = Vec::new();
    if gross_monthly_income <= tables.gross_income_limits.lookup(size) {
        verdicts.push(Verdict::LikelyEligible(Benefit::Snap));
    } else if elderly_or_disabled {
        if final_net_income > tables.net_income_limits.lookup(size) {
            verdicts.push(Verdict::LikelyIneligible(Program::Snap, ShortfallReason::Income));
        }
        if totals.assets > tables.elderly_disabled_asset_ceiling {
            verdicts.push(Verdict::LikelyIneligible(Program::Snap, ShortfallReason::Assets));
        }
        if verdicts.is_empty() {
            verdicts.push(Verdict::LikelyEligible(Benefit::Snap));
        }
    } else {
        verdicts.push(Verdict::LikelyIneligible(Program::Snap, ShortfallReason::Income));
    }

    let eligible = verdicts.iter().any(Verdict::is_eligible);
    let benefit = if eligible {
        let computed = (tables.max_allotments.lookup(size)
            - tables.benefit_reduction_rate * final_net_income)
            .max(0.0);
        computed.max(tables.minimum_benefit)
    } else {
        0.0
    };

    let expedited = is_expedited(
        ctx.client.farmworker,
        gross_monthly_income,
        totals.assets,
        utility_allowance + totals.shelter,
        tables,
    );

    SnapResult {
        combined_income: totals.earned_yearly + totals.other_yearly,
        combined_assets: totals.assets,
        household_size: size,
        gross_monthly_income,
        shelter_expenses: totals.shelter,
        utility_expenses: totals.utility,
        medical_expenses,
        other_expenses: totals.other_expenses,
        utility_allowance,
        standard_deduction,
        net_income,
        excess_shelter_cost,
        final_net_income,
        benefit,
        expedited,
        eligibility: labels(&verdicts),
    }
}

fn is_expedited(
    farmworker: bool,
    monthly_income: f64,
    assets: f64,
    housing_costs: f64,
    tables: &SnapTables,
) -> bool {
    let limits = &tables.expedited;
    let destitute_farmworker = farmworker && assets <= limits.assets && monthly_income <= 0.0;
    let very_low_resources = monthly_income <= limits.monthly_income && assets <= limits.assets;
    let housing_exceeds_resources = monthly_income + assets <= housing_costs;
    destitute_farmworker || very_low_resources || housing_exceeds_resources
}

fn not_checked() -> SnapResult {
    SnapResult {
        combined_income: 0.0,
        combined_assets: 0.0,
        household_size: 0,
        gross_monthly_income: 0.0,
        shelter_expenses: 0.0,
        utility_expenses: 0.0,
        medical_expenses: 0.0,
        other_expenses: 0.0,
        utility_allowance: 0.0,
        standard_deduction: 0.0,
        net_income: 0.0,
        excess_shelter_cost: 0.0,
        final_net_income: 0.0,
        benefit: 0.0,
        expedited: false,
        eligibility: labels(&[Verdict::NotChecked]),
    }
}
