use benefit_screener::workflows::screening::{
    ClientId, Household, HouseholdMember, HouseholdRepository, RepositoryError,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local household store used by the HTTP service and the CLI.
#[derive(Default, Clone)]
pub(crate) struct InMemoryHouseholdRepository {
    households: Arc<Mutex<HashMap<ClientId, Household>>>,
}

impl InMemoryHouseholdRepository {
    fn guard(&self) -> MutexGuard<'_, HashMap<ClientId, Household>> {
        self.households
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert(&self, household: Household) -> Result<(), RepositoryError> {
        let mut guard = self.guard();
        if guard.contains_key(&household.client_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(household.client_id.clone(), household);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.guard().len()
    }
}

impl HouseholdRepository for InMemoryHouseholdRepository {
    fn get_household(&self, client_id: &ClientId) -> Result<Household, RepositoryError> {
        self.guard()
            .get(client_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    fn save_household_members(
        &self,
        client_id: &ClientId,
        members: &[HouseholdMember],
    ) -> Result<(), RepositoryError> {
        let mut guard = self.guard();
        let household = guard.get_mut(client_id).ok_or(RepositoryError::NotFound)?;
        household.members = members.to_vec();
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
