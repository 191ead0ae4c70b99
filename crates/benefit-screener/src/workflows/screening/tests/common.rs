use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::screening::domain::{
    Answer, Asset, ClientId, ClientProfile, EnrollmentStatus, Expense, ExpenseType, Frequency,
    HeatingCost, Household, HouseholdMember, Income, IncomeType, MaritalStatus, MemberId,
    Relationship, ResidenceStatus,
};
use crate::workflows::screening::evaluation::{EvaluationEngine, ScreeningConfig};
use crate::workflows::screening::repository::{HouseholdRepository, RepositoryError};
use crate::workflows::screening::{screening_router, ScreeningService};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn as_of() -> NaiveDate {
    date(2025, 6, 30)
}

pub(super) fn engine() -> EvaluationEngine {
    EvaluationEngine::new(ScreeningConfig::current())
}

pub(super) fn member(id: &str, dob: &str) -> HouseholdMember {
    let mut member = HouseholdMember::new(id, format!("Member {id}"));
    member.dob = Some(dob.to_string());
    member.medicaid = Answer::No;
    member.disability = Answer::No;
    member
}

/// A 75 year old on Medicare who answered "not enrolled" for every member-level program.
pub(super) fn senior(id: &str) -> HouseholdMember {
    let mut member = member(id, "1950-01-01");
    member.medicare = Answer::Yes;
    member.marital_status = MaritalStatus::Single;
    member.selections.pace = EnrollmentStatus::NotEnrolled;
    member.selections.lis = EnrollmentStatus::NotEnrolled;
    member.selections.msp = EnrollmentStatus::NotEnrolled;
    member.selections.ptrr = EnrollmentStatus::NotEnrolled;
    member
}

pub(super) fn income(id: &str, income_type: IncomeType, kind: &str, monthly: f64) -> Income {
    Income {
        id: id.to_string(),
        income_type,
        kind: kind.to_string(),
        amount: Some(monthly),
        frequency: Frequency::Monthly,
        start_date: "2020-01-01".to_string(),
        end_date: None,
    }
}

pub(super) fn expense(id: &str, expense_type: ExpenseType, kind: &str, monthly: f64) -> Expense {
    Expense {
        id: id.to_string(),
        expense_type,
        kind: kind.to_string(),
        amount: Some(monthly),
        frequency: Frequency::Monthly,
        start_date: "2020-01-01".to_string(),
        end_date: None,
    }
}

pub(super) fn asset(id: &str, value: f64) -> Asset {
    Asset {
        id: id.to_string(),
        asset_type: "Savings".to_string(),
        description: "Savings account".to_string(),
        value,
    }
}

pub(super) fn marry(a: &mut HouseholdMember, b: &mut HouseholdMember) {
    a.relationships.push(Relationship::spouse(&b.household_member_id));
    b.relationships.push(Relationship::spouse(&a.household_member_id));
    a.marital_status = MaritalStatus::Married;
    b.marital_status = MaritalStatus::Married;
}

/// Client answers that let LIHEAP reach its income test.
pub(super) fn answered_client() -> ClientProfile {
    ClientProfile {
        liheap_enrollment: EnrollmentStatus::NotEnrolled,
        heating_crisis: Answer::No,
        residence_status_current: ResidenceStatus::Renter,
        residence_status_previous: ResidenceStatus::Owner,
        subsidized_housing: Answer::No,
        heating_cost: HeatingCost::PaidSeparately,
        homeless: false,
        farmworker: false,
    }
}

pub(super) fn household(client_id: &str, members: Vec<HouseholdMember>) -> Household {
    Household {
        client_id: ClientId(client_id.to_string()),
        client: answered_client(),
        members,
    }
}

/// Two seniors, one of them head of household with prior-year Social Security.
pub(super) fn seeded_household(client_id: &str) -> Household {
    let mut head = senior("m-1");
    head.head_of_household = true;
    head.income
        .push(income("i-1", IncomeType::Previous, "Social Security", 1_000.0));
    head.income
        .push(income("i-2", IncomeType::Current, "Social Security", 1_000.0));
    head.expenses.push(expense(
        "e-1",
        ExpenseType::PreviousYear,
        "Property Tax",
        100.0,
    ));
    head.meals = Answer::Yes;

    let mut other = senior("m-2");
    other.meals = Answer::Yes;
    other
        .income
        .push(income("i-3", IncomeType::Current, "Pension", 400.0));

    household(client_id, vec![head, other])
}

pub(super) fn eligibility_of(member: &HouseholdMember) -> Vec<Vec<String>> {
    vec![
        member.pace.as_ref().map(|r| r.eligibility.clone()).unwrap_or_default(),
        member.lis.as_ref().map(|r| r.eligibility.clone()).unwrap_or_default(),
        member.msp.as_ref().map(|r| r.eligibility.clone()).unwrap_or_default(),
        member.ptrr.as_ref().map(|r| r.eligibility.clone()).unwrap_or_default(),
        member.snap.as_ref().map(|r| r.eligibility.clone()).unwrap_or_default(),
        member.liheap.as_ref().map(|r| r.eligibility.clone()).unwrap_or_default(),
    ]
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    pub(super) households: Mutex<HashMap<ClientId, Household>>,
    pub(super) saves: AtomicUsize,
}

impl MemoryRepository {
    pub(super) fn with(household: Household) -> Self {
        let repository = Self::default();
        repository
            .households
            .lock()
            .expect("repository mutex poisoned")
            .insert(household.client_id.clone(), household);
        repository
    }

    pub(super) fn stored(&self, client_id: &str) -> Household {
        self.households
            .lock()
            .expect("repository mutex poisoned")
            .get(&ClientId(client_id.to_string()))
            .cloned()
            .expect("household stored")
    }

    pub(super) fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl HouseholdRepository for MemoryRepository {
    fn get_household(&self, client_id: &ClientId) -> Result<Household, RepositoryError> {
        self.households
            .lock()
            .expect("repository mutex poisoned")
            .get(client_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    fn save_household_members(
        &self,
        client_id: &ClientId,
        members: &[HouseholdMember],
    ) -> Result<(), RepositoryError> {
        let mut guard = self.households.lock().expect("repository mutex poisoned");
        let household = guard.get_mut(client_id).ok_or(RepositoryError::NotFound)?;
        household.members = members.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Reads succeed but every save fails.
pub(super) struct ReadOnlyRepository {
    pub(super) household: Household,
}

impl HouseholdRepository for ReadOnlyRepository {
    fn get_household(&self, client_id: &ClientId) -> Result<Household, RepositoryError> {
        if client_id == &self.household.client_id {
            Ok(self.household.clone())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn save_household_members(
        &self,
        _client_id: &ClientId,
        _members: &[HouseholdMember],
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service(
    household: Household,
) -> (ScreeningService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::with(household));
    let service = ScreeningService::new(repository.clone(), ScreeningConfig::current());
    (service, repository)
}

pub(super) fn router_with_service(service: ScreeningService<MemoryRepository>) -> axum::Router {
    screening_router(Arc::new(service))
}

pub(super) fn member_id(id: &str) -> MemberId {
    MemberId(id.to_string())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
