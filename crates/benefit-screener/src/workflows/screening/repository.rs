use super::domain::{ClientId, Household, HouseholdMember};

/// Storage collaborator bookending each evaluation pass.
pub trait HouseholdRepository: Send + Sync {
    fn get_household(&self, client_id: &ClientId) -> Result<Household, RepositoryError>;
    fn save_household_members(
        &self,
        client_id: &ClientId,
        members: &[HouseholdMember],
    ) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("household not found")]
    NotFound,
    #[error("household was modified concurrently")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
