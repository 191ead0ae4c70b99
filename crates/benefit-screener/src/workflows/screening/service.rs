use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{
    Asset, ClientId, EnrollmentStatus, Expense, Household, HouseholdMember, Income, MemberId,
    SelectionProgram,
};
use super::evaluation::{EvaluationEngine, EvaluationFailure, Program, ScreeningConfig};
use super::repository::{HouseholdRepository, RepositoryError};
use super::writer::apply_patches;

/// Orchestrates evaluation passes: one fetch, one pass over all six programs, one save.
///
/// Passes against the same household are serialized so a concurrent trigger can never
/// overwrite results computed from newer data.
pub struct ScreeningService<R> {
    repository: Arc<R>,
    engine: Arc<EvaluationEngine>,
    locks: Mutex<HashMap<ClientId, Arc<Mutex<()>>>>,
}

impl<R> ScreeningService<R>
where
    R: HouseholdRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: ScreeningConfig) -> Self {
        Self {
            repository,
            engine: Arc::new(EvaluationEngine::new(config)),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &EvaluationEngine {
        &self.engine
    }

    /// Fetch the stored household without evaluating it.
    pub fn get(&self, client_id: &ClientId) -> Result<Household, ScreeningServiceError> {
        Ok(self.repository.get_household(client_id)?)
    }

    /// Re-run every program for the household and persist the merged results.
    pub fn recompute(
        &self,
        client_id: &ClientId,
        as_of: NaiveDate,
    ) -> Result<ScreeningReport, ScreeningServiceError> {
        self.serialized(client_id, || {
            let mut household = self.repository.get_household(client_id)?;
            let failures = self.run_pass(&mut household, as_of);
            self.repository
                .save_household_members(client_id, &household.members)?;

            Ok(ScreeningReport::new(household, as_of, failures))
        })
    }

    /// Apply one household edit, then recompute all six programs and save once.
    pub fn apply_mutation(
        &self,
        client_id: &ClientId,
        mutation: HouseholdMutation,
        as_of: NaiveDate,
    ) -> Result<ScreeningReport, ScreeningServiceError> {
        self.serialized(client_id, || {
            let mut household = self.repository.get_household(client_id)?;
            let kind = mutation.kind();
            mutation.apply(&mut household.members)?;
            let failures = self.run_pass(&mut household, as_of);
            self.repository
                .save_household_members(client_id, &household.members)?;

            info!(client = %client_id, mutation = kind, "household mutation saved");
            Ok(ScreeningReport::new(household, as_of, failures))
        })
    }

    /// Evaluate a household supplied by the caller without touching storage.
    pub fn screen(&self, mut household: Household, as_of: NaiveDate) -> ScreeningReport {
        let failures = self.run_pass(&mut household, as_of);
        ScreeningReport::new(household, as_of, failures)
    }

    fn run_pass(&self, household: &mut Household, as_of: NaiveDate) -> Vec<EvaluationFailure> {
        let outcome = self.engine.evaluate(household, as_of);
        apply_patches(&mut household.members, &outcome.patches);
        outcome.failures
    }

    /// Run `work` while holding the household's lock. The lock entry is dropped once
    /// no other caller holds or waits on it.
    fn serialized<T>(
        &self,
        client_id: &ClientId,
        work: impl FnOnce() -> Result<T, ScreeningServiceError>,
    ) -> Result<T, ScreeningServiceError> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(client_id.clone()).or_default())
        };

        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            work()
        };

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one here.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(client_id);
        }
        result
    }

    #[cfg(test)]
    pub(super) fn tracked_households(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Members as saved after a pass, plus any members a program had to skip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningReport {
    pub client_id: ClientId,
    pub as_of: NaiveDate,
    pub members: Vec<HouseholdMember>,
    pub failures: Vec<EvaluationFailure>,
}

/// One member's verdicts for one program, flattened for tables and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerdictRow {
    pub member_id: MemberId,
    pub member_name: String,
    pub program: Program,
    pub eligibility: Vec<String>,
}

impl ScreeningReport {
    fn new(household: Household, as_of: NaiveDate, failures: Vec<EvaluationFailure>) -> Self {
        Self {
            client_id: household.client_id,
            as_of,
            members: household.members,
            failures,
        }
    }

    pub fn rows(&self) -> Vec<VerdictRow> {
        let mut rows = Vec::new();
        for member in &self.members {
            let results = [
                (Program::Pace, member.pace.as_ref().map(|r| &r.eligibility)),
                (Program::Lis, member.lis.as_ref().map(|r| &r.eligibility)),
                (Program::Msp, member.msp.as_ref().map(|r| &r.eligibility)),
                (Program::Ptrr, member.ptrr.as_ref().map(|r| &r.eligibility)),
                (Program::Snap, member.snap.as_ref().map(|r| &r.eligibility)),
                (Program::Liheap, member.liheap.as_ref().map(|r| &r.eligibility)),
            ];
            for (program, eligibility) in results {
                if let Some(eligibility) = eligibility {
                    rows.push(VerdictRow {
                        member_id: member.household_member_id.clone(),
                        member_name: member.display_name(),
                        program,
                        eligibility: eligibility.clone(),
                    });
                }
            }
        }
        rows
    }
}

/// Edits that trigger a full recomputation of the household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HouseholdMutation {
    AddIncome { member_id: MemberId, income: Income },
    UpdateIncome { member_id: MemberId, income: Income },
    DeleteIncome { member_id: MemberId, record_id: String },
    AddExpense { member_id: MemberId, expense: Expense },
    UpdateExpense { member_id: MemberId, expense: Expense },
    DeleteExpense { member_id: MemberId, record_id: String },
    AddAsset { member_id: MemberId, asset: Asset },
    UpdateAsset { member_id: MemberId, asset: Asset },
    DeleteAsset { member_id: MemberId, record_id: String },
    SetSelection {
        member_id: MemberId,
        program: SelectionProgram,
        status: EnrollmentStatus,
    },
    AddMember { member: HouseholdMember },
    RemoveMember { member_id: MemberId },
}

impl HouseholdMutation {
    pub fn kind(&self) -> &'static str {
        match self {
            HouseholdMutation::AddIncome { .. } => "add_income",
            HouseholdMutation::UpdateIncome { .. } => "update_income",
            HouseholdMutation::DeleteIncome { .. } => "delete_income",
            HouseholdMutation::AddExpense { .. } => "add_expense",
            HouseholdMutation::UpdateExpense { .. } => "update_expense",
            HouseholdMutation::DeleteExpense { .. } => "delete_expense",
            HouseholdMutation::AddAsset { .. } => "add_asset",
            HouseholdMutation::UpdateAsset { .. } => "update_asset",
            HouseholdMutation::DeleteAsset { .. } => "delete_asset",
            HouseholdMutation::SetSelection { .. } => "set_selection",
            HouseholdMutation::AddMember { .. } => "add_member",
            HouseholdMutation::RemoveMember { .. } => "remove_member",
        }
    }

    fn apply(self, members: &mut Vec<HouseholdMember>) -> Result<(), ScreeningServiceError> {
        match self {
            HouseholdMutation::AddIncome { member_id, income } => {
                let member = member_mut(members, &member_id)?;
                insert_record(&mut member.income, income, |record| &record.id)
            }
            HouseholdMutation::UpdateIncome { member_id, income } => {
                let member = member_mut(members, &member_id)?;
                replace_record(&mut member.income, income, |record| &record.id)
            }
            HouseholdMutation::DeleteIncome {
                member_id,
                record_id,
            } => {
                let member = member_mut(members, &member_id)?;
                remove_record(&mut member.income, &record_id, |record| &record.id)
            }
            HouseholdMutation::AddExpense { member_id, expense } => {
                let member = member_mut(members, &member_id)?;
                insert_record(&mut member.expenses, expense, |record| &record.id)
            }
            HouseholdMutation::UpdateExpense { member_id, expense } => {
                let member = member_mut(members, &member_id)?;
                replace_record(&mut member.expenses, expense, |record| &record.id)
            }
            HouseholdMutation::DeleteExpense {
                member_id,
                record_id,
            } => {
                let member = member_mut(members, &member_id)?;
                remove_record(&mut member.expenses, &record_id, |record| &record.id)
            }
            HouseholdMutation::AddAsset { member_id, asset } => {
                let member = member_mut(members, &member_id)?;
                insert_record(&mut member.assets, asset, |record| &record.id)
            }
            HouseholdMutation::UpdateAsset { member_id, asset } => {
                let member = member_mut(members, &member_id)?;
                replace_record(&mut member.assets, asset, |record| &record.id)
            }
            HouseholdMutation::DeleteAsset {
                member_id,
                record_id,
            } => {
                let member = member_mut(members, &member_id)?;
                remove_record(&mut member.assets, &record_id, |record| &record.id)
            }
            HouseholdMutation::SetSelection {
                member_id,
                program,
                status,
            } => {
                member_mut(members, &member_id)?
                    .selections
                    .set(program, status);
                Ok(())
            }
            HouseholdMutation::AddMember { member } => {
                if members
                    .iter()
                    .any(|existing| existing.household_member_id == member.household_member_id)
                {
                    return Err(RepositoryError::Conflict.into());
                }
                members.push(member);
                Ok(())
            }
            HouseholdMutation::RemoveMember { member_id } => {
                let before = members.len();
                members.retain(|member| member.household_member_id != member_id);
                if members.len() == before {
                    return Err(ScreeningServiceError::UnknownMember(member_id.0));
                }
                for member in members.iter_mut() {
                    member
                        .relationships
                        .retain(|link| link.related_member_id != member_id);
                    if member.previous_spouse_id.as_ref() == Some(&member_id) {
                        member.previous_spouse_id = None;
                    }
                }
                Ok(())
            }
        }
    }
}

fn member_mut<'a>(
    members: &'a mut [HouseholdMember],
    member_id: &MemberId,
) -> Result<&'a mut HouseholdMember, ScreeningServiceError> {
    members
        .iter_mut()
        .find(|member| &member.household_member_id == member_id)
        .ok_or_else(|| ScreeningServiceError::UnknownMember(member_id.0.clone()))
}

fn insert_record<T>(
    records: &mut Vec<T>,
    record: T,
    id: impl Fn(&T) -> &String,
) -> Result<(), ScreeningServiceError> {
    if records.iter().any(|existing| id(existing) == id(&record)) {
        return Err(RepositoryError::Conflict.into());
    }
    records.push(record);
    Ok(())
}

fn replace_record<T>(
    records: &mut [T],
    record: T,
    id: impl Fn(&T) -> &String,
) -> Result<(), ScreeningServiceError> {
    let position = records
        .iter()
        .position(|existing| id(existing) == id(&record))
        .ok_or_else(|| ScreeningServiceError::UnknownRecord(id(&record).clone()))?;
    records[position] = record;
    Ok(())
}

fn remove_record<T>(
    records: &mut Vec<T>,
    record_id: &str,
    id: impl Fn(&T) -> &String,
) -> Result<(), ScreeningServiceError> {
    let before = records.len();
    records.retain(|existing| id(existing) != record_id);
    if records.len() == before {
        return Err(ScreeningServiceError::UnknownRecord(record_id.to_string()));
    }
    Ok(())
}

/// Error raised by the screening service.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("household member {0} not found")]
    UnknownMember(String),
    #[error("record {0} not found")]
    UnknownRecord(String),
}
