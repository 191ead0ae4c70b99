use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::{MspTier, PaceTier};

/// The six screened programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Program {
    Pace,
    Lis,
    Msp,
    Ptrr,
    Snap,
    Liheap,
}

impl Program {
    pub const ALL: [Program; 6] = [
        Program::Pace,
        Program::Lis,
        Program::Msp,
        Program::Ptrr,
        Program::Snap,
        Program::Liheap,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Program::Pace => "PACE/PACENET",
            Program::Lis => "LIS",
            Program::Msp => "MSP",
            Program::Ptrr => "PTRR",
            Program::Snap => "SNAP",
            Program::Liheap => "LIHEAP",
        }
    }
}

/// A benefit a household can be found likely eligible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Benefit {
    Pace,
    Pacenet,
    Lis,
    Qmb,
    Slmb,
    Qi,
    Ptrr,
    Snap,
    Liheap,
    LiheapCrisis,
}

impl Benefit {
    pub const fn label(self) -> &'static str {
        match self {
            Benefit::Pace => "PACE",
            Benefit::Pacenet => "PACENET",
            Benefit::Lis => "LIS",
            Benefit::Qmb => "QMB",
            Benefit::Slmb => "SLMB",
            Benefit::Qi => "QI",
            Benefit::Ptrr => "PTRR",
            Benefit::Snap => "SNAP",
            Benefit::Liheap => "LIHEAP",
            Benefit::LiheapCrisis => "LIHEAP Crisis",
        }
    }
}

impl From<MspTier> for Benefit {
    fn from(tier: MspTier) -> Self {
        match tier {
            MspTier::Qmb => Benefit::Qmb,
            MspTier::Slmb => Benefit::Slmb,
            MspTier::Qi => Benefit::Qi,
        }
    }
}

/// Why a threshold comparison failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortfallReason {
    Income,
    Assets,
    IncomeWithinBuffer,
    NoRelevantExpense,
    HeatIncludedInRent,
}

impl ShortfallReason {
    pub const fn label(self) -> &'static str {
        match self {
            ShortfallReason::Income => "Income",
            ShortfallReason::Assets => "Assets",
            ShortfallReason::IncomeWithinBuffer => "Income Within Buffer",
            ShortfallReason::NoRelevantExpense => "No Relevant Expense",
            ShortfallReason::HeatIncludedInRent => "Heat Included in Subsidized Rent",
        }
    }
}

/// Facts that end an evaluation before any income math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disqualifier {
    Age,
    AgeOrDisability,
    OnMedicaid,
    NoMedicare,
    ResidenceStatus,
}

impl Disqualifier {
    pub const fn label(self) -> &'static str {
        match self {
            Disqualifier::Age => "Age",
            Disqualifier::AgeOrDisability => "Age/Disability",
            Disqualifier::OnMedicaid => "Enrolled in Medicaid",
            Disqualifier::NoMedicare => "Not Enrolled in Medicare",
            Disqualifier::ResidenceStatus => "Residence Status",
        }
    }
}

/// Unanswered questions that block an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusQuestion {
    CurrentEnrollment,
    HeatingCrisis,
    Residence,
    SubsidizedHousing,
    HeatingCost,
}

impl StatusQuestion {
    pub const fn label(self) -> &'static str {
        match self {
            StatusQuestion::CurrentEnrollment => "Current Enrollment Status",
            StatusQuestion::HeatingCrisis => "Heating Crisis Status",
            StatusQuestion::Residence => "Residence Status",
            StatusQuestion::SubsidizedHousing => "Subsidized Housing Status",
            StatusQuestion::HeatingCost => "Heating Cost Status",
        }
    }
}

/// One entry in a program's eligibility list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    LikelyEligible(Benefit),
    LikelyIneligible(Program, ShortfallReason),
    Ineligible(Disqualifier),
    NeedsStatus(StatusQuestion),
    AlreadyEnrolled,
    NotInterested,
    NotChecked,
}

impl Verdict {
    pub fn label(&self) -> String {
        self.to_string()
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::LikelyEligible(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::LikelyEligible(benefit) => write!(f, "Likely Eligible for {}", benefit.label()),
            Verdict::LikelyIneligible(program, reason) => write!(
                f,
                "Likely Ineligible for {} ({})",
                program.label(),
                reason.label()
            ),
            Verdict::Ineligible(disqualifier) => write!(f, "Ineligible ({})", disqualifier.label()),
            Verdict::NeedsStatus(question) => write!(f, "Needs {}", question.label()),
            Verdict::AlreadyEnrolled => f.write_str("Already Enrolled"),
            Verdict::NotInterested => f.write_str("Not Interested"),
            Verdict::NotChecked => f.write_str("Not Checked"),
        }
    }
}

impl From<PaceTier> for Verdict {
    fn from(tier: PaceTier) -> Self {
        match tier {
            PaceTier::Pace => Verdict::LikelyEligible(Benefit::Pace),
            PaceTier::Pacenet => Verdict::LikelyEligible(Benefit::Pacenet),
            PaceTier::Buffer => {
                Verdict::LikelyIneligible(Program::Pace, ShortfallReason::IncomeWithinBuffer)
            }
        }
    }
}

/// Render verdicts the way they are stored on member records.
pub(crate) fn labels(verdicts: &[Verdict]) -> Vec<String> {
    verdicts.iter().map(Verdict::label).collect()
}
