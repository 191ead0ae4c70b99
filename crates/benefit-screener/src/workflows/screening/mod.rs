//! Household eligibility screening for PACE/PACENET, LIS, MSP, PTRR, SNAP, and LIHEAP.
//!
//! A pass loads one household, runs every program evaluator over an immutable view of
//! it, merges the resulting patches onto the member records, and saves once.

pub mod domain;
pub mod evaluation;
pub mod income;
pub mod relationships;
pub mod repository;
pub mod router;
pub mod service;
pub mod writer;

#[cfg(test)]
mod tests;

pub use domain::{
    Answer, Asset, ClientId, ClientProfile, EnrollmentStatus, Expense, ExpenseType, Frequency,
    HeatingCost, Household, HouseholdMember, Income, IncomeType, LiheapResult, LisResult,
    MaritalStatus, MemberId, MspResult, PaceResult, ProgramSelections, PtrrResult, Relationship,
    ResidenceStatus, SelectionProgram, SnapResult,
};
pub use evaluation::{
    ConstantSet, EligibilityPatch, EvaluationEngine, EvaluationError, EvaluationFailure,
    EvaluationOutcome, MealUnit, Program, ProgramResult, ScreeningConfig, SelectionUpdate, Verdict,
};
pub use relationships::{find_spouse, SpousePair, SpouseResolution};
pub use repository::{HouseholdRepository, RepositoryError};
pub use router::screening_router;
pub use service::{HouseholdMutation, ScreeningReport, ScreeningService, ScreeningServiceError, VerdictRow};
pub use writer::apply_patches;
