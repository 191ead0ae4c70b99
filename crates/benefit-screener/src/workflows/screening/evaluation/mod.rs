//! Program evaluators and the engine that runs them over a household.
//!
//! Evaluators never touch storage. Each returns [`EligibilityPatch`] values that the
//! caller merges onto member records once the whole pass has finished.

mod config;
mod liheap;
mod lis;
mod msp;
mod pace;
mod policy;
mod ptrr;
mod snap;
mod status;

pub use config::{
    first_bracket, Bracket, ConstantSet, ExpeditedLimits, IncomeAssetLimits, LiheapTables,
    LisTables, MspLimits, MspTables, MspTier, PaceTables, PaceTier, PtrrTables, ScreeningConfig,
    SizeTable, SnapTables, UtilityAllowances,
};
pub use policy::{Benefit, Disqualifier, Program, ShortfallReason, StatusQuestion, Verdict};
pub use snap::MealUnit;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::domain::{
    ClientProfile, EnrollmentStatus, Household, HouseholdMember, LiheapResult, LisResult,
    MemberId, MspResult, PaceResult, PtrrResult, SelectionProgram, SnapResult,
};

/// Per-member failure that leaves the member's previous result in place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("member {0} has no date of birth")]
    MissingDateOfBirth(MemberId),
    #[error("member {member_id} has an unreadable date of birth '{value}'")]
    InvalidDateOfBirth { member_id: MemberId, value: String },
    #[error("no prior calendar year exists for {0}")]
    InvalidEvaluationDate(NaiveDate),
}

/// Computed result for one program, in the shape stored on the member record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "program", content = "result")]
pub enum ProgramResult {
    #[serde(rename = "PACE")]
    Pace(PaceResult),
    #[serde(rename = "LIS")]
    Lis(LisResult),
    #[serde(rename = "MSP")]
    Msp(MspResult),
    #[serde(rename = "PTRR")]
    Ptrr(PtrrResult),
    #[serde(rename = "SNAP")]
    Snap(SnapResult),
    #[serde(rename = "LIHEAP")]
    Liheap(LiheapResult),
}

impl ProgramResult {
    pub fn program(&self) -> Program {
        match self {
            ProgramResult::Pace(_) => Program::Pace,
            ProgramResult::Lis(_) => Program::Lis,
            ProgramResult::Msp(_) => Program::Msp,
            ProgramResult::Ptrr(_) => Program::Ptrr,
            ProgramResult::Snap(_) => Program::Snap,
            ProgramResult::Liheap(_) => Program::Liheap,
        }
    }

    pub fn eligibility(&self) -> &[String] {
        match self {
            ProgramResult::Pace(result) => &result.eligibility,
            ProgramResult::Lis(result) => &result.eligibility,
            ProgramResult::Msp(result) => &result.eligibility,
            ProgramResult::Ptrr(result) => &result.eligibility,
            ProgramResult::Snap(result) => &result.eligibility,
            ProgramResult::Liheap(result) => &result.eligibility,
        }
    }
}

/// Enrollment answer rewritten by an evaluator, e.g. to a coverage sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionUpdate {
    pub program: SelectionProgram,
    pub status: EnrollmentStatus,
}

/// Everything one evaluator decided about one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityPatch {
    pub member_id: MemberId,
    pub result: ProgramResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionUpdate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationFailure {
    pub member_id: MemberId,
    pub program: Program,
    pub reason: String,
}

/// Patches and failures collected over one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub patches: Vec<EligibilityPatch>,
    pub failures: Vec<EvaluationFailure>,
}

impl EvaluationOutcome {
    fn merge(&mut self, other: EvaluationOutcome) {
        self.patches.extend(other.patches);
        self.failures.extend(other.failures);
    }

    pub fn for_member<'a>(
        &'a self,
        member_id: &'a MemberId,
    ) -> impl Iterator<Item = &'a EligibilityPatch> + 'a {
        self.patches
            .iter()
            .filter(move |patch| &patch.member_id == member_id)
    }
}

/// Read-only inputs shared by every evaluator in a pass.
pub(crate) struct EvaluationContext<'a> {
    pub members: &'a [HouseholdMember],
    pub client: &'a ClientProfile,
    pub as_of: NaiveDate,
    pub config: &'a ScreeningConfig,
}

/// Stateless evaluator that applies the threshold tables to a household.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    config: ScreeningConfig,
}

impl Default for EvaluationEngine {
    fn default() -> Self {
        Self::new(ScreeningConfig::current())
    }
}

impl EvaluationEngine {
    pub fn new(config: ScreeningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    /// Run all six programs over the household.
    pub fn evaluate(&self, household: &Household, as_of: NaiveDate) -> EvaluationOutcome {
        let mut outcome = EvaluationOutcome::default();
        for program in Program::ALL {
            outcome.merge(self.evaluate_program(
                program,
                &household.members,
                &household.client,
                as_of,
            ));
        }

        info!(
            client = %household.client_id,
            members = household.members.len(),
            patches = outcome.patches.len(),
            failures = outcome.failures.len(),
            "household evaluation pass complete"
        );
        outcome
    }

    pub fn evaluate_program(
        &self,
        program: Program,
        members: &[HouseholdMember],
        client: &ClientProfile,
        as_of: NaiveDate,
    ) -> EvaluationOutcome {
        let ctx = EvaluationContext {
            members,
            client,
            as_of,
            config: &self.config,
        };

        match program {
            Program::Pace => per_member(&ctx, Program::Pace, pace::evaluate),
            Program::Lis => per_member(&ctx, Program::Lis, lis::evaluate),
            Program::Msp => per_member(&ctx, Program::Msp, msp::evaluate),
            Program::Ptrr => per_member(&ctx, Program::Ptrr, ptrr::evaluate),
            Program::Snap => EvaluationOutcome {
                patches: snap::evaluate(&ctx),
                failures: Vec::new(),
            },
            Program::Liheap => EvaluationOutcome {
                patches: liheap::evaluate(&ctx),
                failures: Vec::new(),
            },
        }
    }

    pub fn evaluate_pace(&self, members: &[HouseholdMember], as_of: NaiveDate) -> EvaluationOutcome {
        self.evaluate_program(Program::Pace, members, &ClientProfile::default(), as_of)
    }

    pub fn evaluate_lis(&self, members: &[HouseholdMember], as_of: NaiveDate) -> EvaluationOutcome {
        self.evaluate_program(Program::Lis, members, &ClientProfile::default(), as_of)
    }

    pub fn evaluate_msp(&self, members: &[HouseholdMember], as_of: NaiveDate) -> EvaluationOutcome {
        self.evaluate_program(Program::Msp, members, &ClientProfile::default(), as_of)
    }

    /// PTRR reads the prior-year residence status from the client record.
    pub fn evaluate_ptrr(
        &self,
        members: &[HouseholdMember],
        client: &ClientProfile,
        as_of: NaiveDate,
    ) -> EvaluationOutcome {
        self.evaluate_program(Program::Ptrr, members, client, as_of)
    }

    pub fn evaluate_snap(
        &self,
        members: &[HouseholdMember],
        is_farmworker: bool,
        as_of: NaiveDate,
    ) -> EvaluationOutcome {
        let client = ClientProfile {
            farmworker: is_farmworker,
            ..ClientProfile::default()
        };
        self.evaluate_program(Program::Snap, members, &client, as_of)
    }

    pub fn evaluate_liheap(
        &self,
        members: &[HouseholdMember],
        client: &ClientProfile,
        as_of: NaiveDate,
    ) -> EvaluationOutcome {
        self.evaluate_program(Program::Liheap, members, client, as_of)
    }
}

fn per_member<F>(ctx: &EvaluationContext<'_>, program: Program, evaluate: F) -> EvaluationOutcome
where
    F: Fn(&EvaluationContext<'_>, &HouseholdMember) -> Result<EligibilityPatch, EvaluationError>,
{
    let mut outcome = EvaluationOutcome::default();
    for member in ctx.members {
        match evaluate(ctx, member) {
            Ok(patch) => outcome.patches.push(patch),
            Err(err) => {
                error!(
                    member = %member.household_member_id,
                    program = program.label(),
                    error = %err,
                    "member skipped; previous result retained"
                );
                outcome.failures.push(EvaluationFailure {
                    member_id: member.household_member_id.clone(),
                    program,
                    reason: err.to_string(),
                });
            }
        }
    }
    outcome
}
