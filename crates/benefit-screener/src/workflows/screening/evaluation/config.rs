use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::relationships::SpouseResolution;

/// Named, versioned policy constant sets shipped with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantSet {
    Current,
    Legacy,
}

impl ConstantSet {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "current" | "default" => Some(Self::Current),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }
}

/// Every threshold table the evaluators consult.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningConfig {
    pub spouse_resolution: SpouseResolution,
    pub pace: PaceTables,
    pub lis: LisTables,
    pub msp: MspTables,
    pub ptrr: PtrrTables,
    pub snap: SnapTables,
    pub liheap: LiheapTables,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self::current()
    }
}

impl ScreeningConfig {
    pub fn for_set(set: ConstantSet) -> Self {
        match set {
            ConstantSet::Current => Self::current(),
            ConstantSet::Legacy => Self::legacy(),
        }
    }

    pub fn current() -> Self {
        Self {
            spouse_resolution: SpouseResolution::Relationships,
            pace: PaceTables::standard(),
            lis: LisTables {
                single: IncomeAssetLimits {
                    income: 23_475.0,
                    assets: 18_090.0,
                },
                married: IncomeAssetLimits {
                    income: 31_725.0,
                    assets: 36_100.0,
                },
            },
            msp: MspTables::with_asset_ceilings(9_430.0, 14_130.0),
            ptrr: PtrrTables::standard(),
            snap: SnapTables::with_benefit_floor(24.0, 712.0),
            liheap: LiheapTables::standard(),
        }
    }

    /// Constants carried by the older evaluator lineage, which also resolves spouses
    /// through the direct `previousSpouseId` field.
    pub fn legacy() -> Self {
        Self {
            spouse_resolution: SpouseResolution::LegacySpouseId,
            pace: PaceTables::standard(),
            lis: LisTables {
                single: IncomeAssetLimits {
                    income: 23_475.0,
                    assets: 17_600.0,
                },
                married: IncomeAssetLimits {
                    income: 31_725.0,
                    assets: 35_130.0,
                },
            },
            msp: MspTables::with_asset_ceilings(9_090.0, 13_630.0),
            ptrr: PtrrTables::standard(),
            snap: SnapTables::with_benefit_floor(23.0, 672.0),
            liheap: LiheapTables::standard(),
        }
    }
}

/// Yearly figure looked up by household size, extending linearly past the last entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeTable {
    pub by_size: Vec<f64>,
    pub each_additional: f64,
}

impl SizeTable {
    pub fn new(by_size: &[f64], each_additional: f64) -> Self {
        Self {
            by_size: by_size.to_vec(),
            each_additional,
        }
    }

    /// Sizes below one are treated as one.
    pub fn lookup(&self, size: usize) -> f64 {
        let size = size.max(1);
        match self.by_size.get(size - 1) {
            Some(value) => *value,
            None => {
                let last = self.by_size.last().copied().unwrap_or(0.0);
                let extra = size.saturating_sub(self.by_size.len()) as f64;
                last + extra * self.each_additional
            }
        }
    }
}

/// Inclusive upper bound paired with the outcome for incomes at or below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket<T> {
    pub up_to: f64,
    pub outcome: T,
}

/// First bracket whose bound covers `value`, scanning in ascending order.
pub fn first_bracket<T>(brackets: &[Bracket<T>], value: f64) -> Option<&T> {
    brackets
        .iter()
        .find(|bracket| value <= bracket.up_to)
        .map(|bracket| &bracket.outcome)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceTier {
    Pace,
    Pacenet,
    Buffer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaceTables {
    /// Minimum age in whole months (64 years 11 months).
    pub minimum_age_months: u32,
    pub part_b_premium_kind: String,
    pub single: Vec<Bracket<PaceTier>>,
    pub married: Vec<Bracket<PaceTier>>,
}

impl PaceTables {
    fn standard() -> Self {
        Self {
            minimum_age_months: 64 * 12 + 11,
            part_b_premium_kind: "Medicare Part B Premium".to_string(),
            single: vec![
                Bracket {
                    up_to: 14_500.0,
                    outcome: PaceTier::Pace,
                },
                Bracket {
                    up_to: 33_500.0,
                    outcome: PaceTier::Pacenet,
                },
                Bracket {
                    up_to: 43_500.0,
                    outcome: PaceTier::Buffer,
                },
            ],
            married: vec![
                Bracket {
                    up_to: 17_700.0,
                    outcome: PaceTier::Pace,
                },
                Bracket {
                    up_to: 41_500.0,
                    outcome: PaceTier::Pacenet,
                },
                Bracket {
                    up_to: 51_500.0,
                    outcome: PaceTier::Buffer,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeAssetLimits {
    pub income: f64,
    pub assets: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LisTables {
    pub single: IncomeAssetLimits,
    pub married: IncomeAssetLimits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MspTier {
    Qmb,
    Slmb,
    Qi,
}

/// Monthly countable-income tiers plus the asset ceiling for one filing status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MspLimits {
    pub assets: f64,
    pub tiers: Vec<Bracket<MspTier>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MspTables {
    pub earned_income_disregard: f64,
    pub general_income_disregard: f64,
    pub single: MspLimits,
    pub married: MspLimits,
}

impl MspTables {
    fn with_asset_ceilings(single_assets: f64, married_assets: f64) -> Self {
        Self {
            earned_income_disregard: 65.0,
            general_income_disregard: 20.0,
            single: MspLimits {
                assets: single_assets,
                tiers: vec![
                    Bracket {
                        up_to: 1_275.0,
                        outcome: MspTier::Qmb,
                    },
                    Bracket {
                        up_to: 1_526.0,
                        outcome: MspTier::Slmb,
                    },
                    Bracket {
                        up_to: 1_715.0,
                        outcome: MspTier::Qi,
                    },
                ],
            },
            married: MspLimits {
                assets: married_assets,
                tiers: vec![
                    Bracket {
                        up_to: 1_724.0,
                        outcome: MspTier::Qmb,
                    },
                    Bracket {
                        up_to: 2_064.0,
                        outcome: MspTier::Slmb,
                    },
                    Bracket {
                        up_to: 2_320.0,
                        outcome: MspTier::Qi,
                    },
                ],
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtrrTables {
    pub minimum_age: u32,
    pub widowed_minimum_age: u32,
    pub disabled_minimum_age: u32,
    /// Income kinds counted at half their value.
    pub halved_income_kinds: Vec<String>,
    pub property_tax_kind: String,
    pub rent_kind: String,
    /// Rebate by prior-year income; incomes above the last bracket are ineligible.
    pub rebates: Vec<Bracket<f64>>,
}

impl PtrrTables {
    fn standard() -> Self {
        Self {
            minimum_age: 65,
            widowed_minimum_age: 50,
            disabled_minimum_age: 18,
            halved_income_kinds: vec![
                "Social Security".to_string(),
                "SSDI".to_string(),
                "Railroad Retirement".to_string(),
            ],
            property_tax_kind: "Property Tax".to_string(),
            rent_kind: "Rent".to_string(),
            rebates: vec![
                Bracket {
                    up_to: 8_270.0,
                    outcome: 1_000.0,
                },
                Bracket {
                    up_to: 15_510.0,
                    outcome: 770.0,
                },
                Bracket {
                    up_to: 18_610.0,
                    outcome: 460.0,
                },
                Bracket {
                    up_to: 46_520.0,
                    outcome: 380.0,
                },
            ],
        }
    }

    pub fn income_ceiling(&self) -> f64 {
        self.rebates
            .last()
            .map(|bracket| bracket.up_to)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityAllowances {
    pub heating_cooling_kind: String,
    pub heating_cooling: f64,
    /// Applied when at least two basic utility kinds are present.
    pub basic_limited: f64,
    pub basic_kinds: Vec<String>,
    /// Allowance per utility kind when neither flat allowance applies.
    pub per_kind: BTreeMap<String, f64>,
    pub homeless: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpeditedLimits {
    pub monthly_income: f64,
    pub assets: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapTables {
    pub gross_income_limits: SizeTable,
    pub net_income_limits: SizeTable,
    pub max_allotments: SizeTable,
    pub standard_deductions: SizeTable,
    pub earned_income_share: f64,
    pub benefit_reduction_rate: f64,
    pub minimum_benefit: f64,
    pub medical_expense_minimum: f64,
    pub shelter_cap: f64,
    pub elderly_age: u32,
    pub elderly_disabled_asset_ceiling: f64,
    pub utilities: UtilityAllowances,
    pub expedited: ExpeditedLimits,
}

impl SnapTables {
    fn with_benefit_floor(minimum_benefit: f64, shelter_cap: f64) -> Self {
        let per_kind = [
            ("Electricity", 362.0),
            ("Cooking Fuel", 74.0),
            ("Water", 84.0),
            ("Sewer", 84.0),
            ("Trash", 36.0),
            ("Telephone", 33.0),
        ]
        .into_iter()
        .map(|(kind, value)| (kind.to_string(), value))
        .collect();

        Self {
            gross_income_limits: SizeTable::new(
                &[
                    2_510.0, 3_408.0, 4_304.0, 5_200.0, 6_098.0, 6_994.0, 7_890.0, 8_788.0,
                ],
                898.0,
            ),
            net_income_limits: SizeTable::new(
                &[
                    1_255.0, 1_704.0, 2_152.0, 2_600.0, 3_049.0, 3_497.0, 3_945.0, 4_394.0,
                ],
                449.0,
            ),
            max_allotments: SizeTable::new(
                &[
                    292.0, 536.0, 768.0, 975.0, 1_158.0, 1_390.0, 1_536.0, 1_756.0,
                ],
                220.0,
            ),
            standard_deductions: SizeTable::new(&[204.0, 204.0, 204.0, 217.0, 254.0, 291.0], 0.0),
            earned_income_share: 0.8,
            benefit_reduction_rate: 0.3,
            minimum_benefit,
            medical_expense_minimum: 35.0,
            shelter_cap,
            elderly_age: 60,
            elderly_disabled_asset_ceiling: 4_500.0,
            utilities: UtilityAllowances {
                heating_cooling_kind: "Heating and/or Cooling".to_string(),
                heating_cooling: 775.0,
                basic_limited: 448.0,
                basic_kinds: vec![
                    "Electricity".to_string(),
                    "Cooking Fuel".to_string(),
                    "Water".to_string(),
                    "Sewer".to_string(),
                    "Trash".to_string(),
                ],
                per_kind,
                homeless: 179.66,
            },
            expedited: ExpeditedLimits {
                monthly_income: 150.0,
                assets: 100.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiheapTables {
    /// Yearly household income limit by household size.
    pub income_limits: SizeTable,
}

impl LiheapTables {
    fn standard() -> Self {
        Self {
            income_limits: SizeTable::new(
                &[
                    22_590.0, 30_660.0, 38_730.0, 46_800.0, 54_870.0, 62_940.0, 71_010.0,
                    79_080.0,
                ],
                8_070.0,
            ),
        }
    }
}
