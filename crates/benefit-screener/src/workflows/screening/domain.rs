use std::fmt;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::evaluation::EvaluationError;
use super::income::parse_record_date;

/// Identifier wrapper for a client household record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub String);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for one person inside a household.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub String);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A household as loaded from the record store: client-level answers plus its members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    pub client_id: ClientId,
    #[serde(default)]
    pub client: ClientProfile,
    #[serde(default)]
    pub members: Vec<HouseholdMember>,
}

impl Household {
    pub fn member(&self, id: &MemberId) -> Option<&HouseholdMember> {
        self.members
            .iter()
            .find(|member| &member.household_member_id == id)
    }
}

/// Answers captured on the client record rather than on individual members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientProfile {
    pub liheap_enrollment: EnrollmentStatus,
    pub heating_crisis: Answer,
    pub residence_status_current: ResidenceStatus,
    pub residence_status_previous: ResidenceStatus,
    pub subsidized_housing: Answer,
    pub heating_cost: HeatingCost,
    pub homeless: bool,
    pub farmworker: bool,
}

/// One person in a household, including the computed program results of the last pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdMember {
    pub household_member_id: MemberId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_initial: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub marital_status: MaritalStatus,
    #[serde(default)]
    pub previous_marital_status: MaritalStatus,
    #[serde(default)]
    pub disability: Answer,
    #[serde(default)]
    pub medicare: Answer,
    #[serde(default)]
    pub medicaid: Answer,
    #[serde(default)]
    pub citizen: Answer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_citizen_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_status: Option<String>,
    #[serde(default)]
    pub meals: Answer,
    #[serde(default)]
    pub head_of_household: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_spouse_id: Option<MemberId>,
    #[serde(default)]
    pub income: Vec<Income>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub selections: ProgramSelections,
    #[serde(rename = "PACE", default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<PaceResult>,
    #[serde(rename = "LIS", default, skip_serializing_if = "Option::is_none")]
    pub lis: Option<LisResult>,
    #[serde(rename = "MSP", default, skip_serializing_if = "Option::is_none")]
    pub msp: Option<MspResult>,
    #[serde(rename = "PTRR", default, skip_serializing_if = "Option::is_none")]
    pub ptrr: Option<PtrrResult>,
    #[serde(rename = "SNAP", default, skip_serializing_if = "Option::is_none")]
    pub snap: Option<SnapResult>,
    #[serde(rename = "LIHEAP", default, skip_serializing_if = "Option::is_none")]
    pub liheap: Option<LiheapResult>,
}

impl HouseholdMember {
    /// A bare member with no answers, collections, or results.
    pub fn new(id: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            household_member_id: MemberId(id.into()),
            first_name: first_name.into(),
            last_name: String::new(),
            middle_initial: None,
            dob: None,
            marital_status: MaritalStatus::Unknown,
            previous_marital_status: MaritalStatus::Unknown,
            disability: Answer::Unknown,
            medicare: Answer::Unknown,
            medicaid: Answer::Unknown,
            citizen: Answer::Unknown,
            non_citizen_status: None,
            student_status: None,
            meals: Answer::Unknown,
            head_of_household: false,
            previous_spouse_id: None,
            income: Vec::new(),
            assets: Vec::new(),
            expenses: Vec::new(),
            relationships: Vec::new(),
            selections: ProgramSelections::default(),
            pace: None,
            lis: None,
            msp: None,
            ptrr: None,
            snap: None,
            liheap: None,
        }
    }

    pub fn display_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => self.household_member_id.0.clone(),
        }
    }

    pub fn date_of_birth(&self) -> Result<NaiveDate, EvaluationError> {
        let raw = self
            .dob
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| EvaluationError::MissingDateOfBirth(self.household_member_id.clone()))?;

        parse_record_date(raw).ok_or_else(|| EvaluationError::InvalidDateOfBirth {
            member_id: self.household_member_id.clone(),
            value: raw.to_string(),
        })
    }

    /// Whole years of age on `as_of`.
    pub fn age_on(&self, as_of: NaiveDate) -> Result<u32, EvaluationError> {
        let dob = self.date_of_birth()?;
        Ok(as_of.years_since(dob).unwrap_or(0))
    }

    /// True once the member has lived at least `months` whole months on `as_of`.
    pub fn has_reached_months(&self, months: u32, as_of: NaiveDate) -> Result<bool, EvaluationError> {
        let dob = self.date_of_birth()?;
        Ok(dob
            .checked_add_months(Months::new(months))
            .map(|threshold| threshold <= as_of)
            .unwrap_or(false))
    }

    pub fn is_widowed(&self) -> bool {
        self.marital_status == MaritalStatus::Widowed
            || self.previous_marital_status == MaritalStatus::Widowed
    }

    pub fn is_married(&self) -> bool {
        self.marital_status == MaritalStatus::Married
    }

    pub fn shares_meals(&self) -> bool {
        self.meals.is_yes()
    }

    pub fn total_assets(&self) -> f64 {
        self.assets.iter().map(|asset| asset.value.max(0.0)).sum()
    }

    pub fn is_related_to(&self, other: &MemberId) -> bool {
        self.relationships
            .iter()
            .any(|link| &link.related_member_id == other)
    }
}

/// Which evaluation window an income feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IncomeType {
    Current,
    Previous,
    /// Kept for round-tripping; no evaluator counts it.
    Unrecognized(String),
}

impl IncomeType {
    pub fn label(&self) -> &str {
        match self {
            IncomeType::Current => "Current",
            IncomeType::Previous => "Previous",
            IncomeType::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for IncomeType {
    fn from(value: String) -> Self {
        match normalize_label(&value).as_str() {
            "current" => IncomeType::Current,
            "previous" | "previousyear" => IncomeType::Previous,
            _ => {
                warn!(income_type = %value, "unrecognized income type; record is not counted");
                IncomeType::Unrecognized(value)
            }
        }
    }
}

impl From<IncomeType> for String {
    fn from(value: IncomeType) -> Self {
        value.label().to_string()
    }
}

/// A single income record with its recurrence and active date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: String,
    #[serde(rename = "type")]
    pub income_type: IncomeType,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl Income {
    pub fn is_current(&self) -> bool {
        self.income_type == IncomeType::Current
    }

    pub fn is_previous(&self) -> bool {
        self.income_type == IncomeType::Previous
    }

    /// Wages and self-employment receive the earned-income treatment.
    pub fn is_earned(&self) -> bool {
        matches!(
            normalize_label(&self.kind).as_str(),
            "employment" | "selfemployment" | "wages"
        )
    }

    pub fn kind_is(&self, kind: &str) -> bool {
        normalize_label(&self.kind) == normalize_label(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExpenseType {
    Shelter,
    Utility,
    Medical,
    Other,
    PreviousYear,
    Unrecognized(String),
}

impl ExpenseType {
    pub fn label(&self) -> &str {
        match self {
            ExpenseType::Shelter => "Shelter",
            ExpenseType::Utility => "Utility",
            ExpenseType::Medical => "Medical",
            ExpenseType::Other => "Other",
            ExpenseType::PreviousYear => "Previous Year",
            ExpenseType::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for ExpenseType {
    fn from(value: String) -> Self {
        match normalize_label(&value).as_str() {
            "shelter" | "housing" => ExpenseType::Shelter,
            "utility" | "utilities" => ExpenseType::Utility,
            "medical" => ExpenseType::Medical,
            "other" => ExpenseType::Other,
            "previousyear" => ExpenseType::PreviousYear,
            _ => {
                warn!(expense_type = %value, "unrecognized expense type; record is not counted");
                ExpenseType::Unrecognized(value)
            }
        }
    }
}

impl From<ExpenseType> for String {
    fn from(value: ExpenseType) -> Self {
        value.label().to_string()
    }
}

/// A recurring cost carried by a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl Expense {
    pub fn kind_is(&self, kind: &str) -> bool {
        normalize_label(&self.kind) == normalize_label(kind)
    }
}

/// A countable resource. Assets have no time dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    #[serde(rename = "type", default)]
    pub asset_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub value: f64,
}

/// Directed link from one member to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub related_member_id: MemberId,
    pub relationship: String,
}

impl Relationship {
    pub fn spouse(related: &MemberId) -> Self {
        Self {
            related_member_id: related.clone(),
            relationship: "spouse".to_string(),
        }
    }

    pub fn is_spouse(&self) -> bool {
        self.relationship.trim().eq_ignore_ascii_case("spouse")
    }
}

/// How often an income or expense recurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    OneTime,
    Weekly,
    BiWeekly,
    SemiMonthly,
    Monthly,
    Quarterly,
    Annually,
    Unrecognized(String),
}

impl Frequency {
    pub fn parse(value: &str) -> Self {
        match normalize_label(value).as_str() {
            "onetime" | "once" => Self::OneTime,
            "weekly" => Self::Weekly,
            "biweekly" => Self::BiWeekly,
            "semimonthly" | "twicemonthly" => Self::SemiMonthly,
            "monthly" => Self::Monthly,
            "quarterly" => Self::Quarterly,
            "annually" | "annual" | "yearly" => Self::Annually,
            _ => Self::Unrecognized(value.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::OneTime => "one-time",
            Self::Weekly => "weekly",
            Self::BiWeekly => "bi-weekly",
            Self::SemiMonthly => "semi-monthly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annually => "annually",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Occurrences per year, or `None` when the frequency is not recognised.
    pub fn yearly_multiplier(&self) -> Option<f64> {
        match self {
            Self::OneTime => Some(1.0),
            Self::Weekly => Some(52.0),
            Self::BiWeekly => Some(26.0),
            Self::SemiMonthly => Some(24.0),
            Self::Monthly => Some(12.0),
            Self::Quarterly => Some(4.0),
            Self::Annually => Some(1.0),
            Self::Unrecognized(_) => None,
        }
    }
}

/// A record without a frequency is malformed and counts as zero.
impl Default for Frequency {
    fn default() -> Self {
        Self::Unrecognized(String::new())
    }
}

impl From<String> for Frequency {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.label().to_string()
    }
}

/// Yes/no questionnaire answer that may not have been asked yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Answer {
    Yes,
    No,
    #[default]
    Unknown,
}

impl Answer {
    pub fn is_yes(self) -> bool {
        self == Answer::Yes
    }

    pub const fn label(self) -> &'static str {
        match self {
            Answer::Yes => "yes",
            Answer::No => "no",
            Answer::Unknown => "n/a",
        }
    }
}

impl From<String> for Answer {
    fn from(value: String) -> Self {
        match normalize_label(&value).as_str() {
            "yes" | "y" | "true" => Answer::Yes,
            "no" | "n" | "false" => Answer::No,
            _ => Answer::Unknown,
        }
    }
}

impl From<Answer> for String {
    fn from(value: Answer) -> Self {
        value.label().to_string()
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        if value {
            Answer::Yes
        } else {
            Answer::No
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MaritalStatus {
    Single,
    Married,
    Widowed,
    Divorced,
    Separated,
    #[default]
    Unknown,
}

impl MaritalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            MaritalStatus::Single => "Single",
            MaritalStatus::Married => "Married",
            MaritalStatus::Widowed => "Widowed",
            MaritalStatus::Divorced => "Divorced",
            MaritalStatus::Separated => "Separated",
            MaritalStatus::Unknown => "",
        }
    }
}

impl From<String> for MaritalStatus {
    fn from(value: String) -> Self {
        match normalize_label(&value).as_str() {
            "single" | "nevermarried" => MaritalStatus::Single,
            "married" => MaritalStatus::Married,
            "widowed" | "widow" | "widower" => MaritalStatus::Widowed,
            "divorced" => MaritalStatus::Divorced,
            "separated" => MaritalStatus::Separated,
            _ => MaritalStatus::Unknown,
        }
    }
}

impl From<MaritalStatus> for String {
    fn from(value: MaritalStatus) -> Self {
        value.label().to_string()
    }
}

/// Current-enrollment answer for one program.
///
/// Legacy records stored these as free-text answers keyed by the question sentence;
/// parsing is lenient so those answers still land on the right variant.
/// `OnMedicaid` and `NoMedicare` are sentinels written by the evaluators when a hard
/// disqualifier applied, so a later change in coverage forces the question to be asked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EnrollmentStatus {
    Enrolled,
    NotEnrolled,
    NotInterested,
    #[default]
    Unknown,
    OnMedicaid,
    NoMedicare,
}

impl EnrollmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EnrollmentStatus::Enrolled => "enrolled",
            EnrollmentStatus::NotEnrolled => "notenrolled",
            EnrollmentStatus::NotInterested => "notinterested",
            EnrollmentStatus::Unknown => "n/a",
            EnrollmentStatus::OnMedicaid => "onmedicaid",
            EnrollmentStatus::NoMedicare => "nomedicare",
        }
    }
}

impl From<String> for EnrollmentStatus {
    fn from(value: String) -> Self {
        match normalize_label(&value).as_str() {
            "enrolled" | "yes" | "alreadyenrolled" | "applied" => EnrollmentStatus::Enrolled,
            "notenrolled" | "no" | "interested" => EnrollmentStatus::NotEnrolled,
            "notinterested" => EnrollmentStatus::NotInterested,
            "onmedicaid" => EnrollmentStatus::OnMedicaid,
            "nomedicare" | "notonmedicare" => EnrollmentStatus::NoMedicare,
            _ => EnrollmentStatus::Unknown,
        }
    }
}

impl From<EnrollmentStatus> for String {
    fn from(value: EnrollmentStatus) -> Self {
        value.label().to_string()
    }
}

/// Per-member enrollment answers for the member-level programs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramSelections {
    pub pace: EnrollmentStatus,
    pub lis: EnrollmentStatus,
    pub msp: EnrollmentStatus,
    pub ptrr: EnrollmentStatus,
}

/// Programs whose enrollment answer lives on the member record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SelectionProgram {
    Pace,
    Lis,
    Msp,
    Ptrr,
}

impl ProgramSelections {
    pub fn get(&self, program: SelectionProgram) -> EnrollmentStatus {
        match program {
            SelectionProgram::Pace => self.pace,
            SelectionProgram::Lis => self.lis,
            SelectionProgram::Msp => self.msp,
            SelectionProgram::Ptrr => self.ptrr,
        }
    }

    pub fn set(&mut self, program: SelectionProgram, status: EnrollmentStatus) {
        match program {
            SelectionProgram::Pace => self.pace = status,
            SelectionProgram::Lis => self.lis = status,
            SelectionProgram::Msp => self.msp = status,
            SelectionProgram::Ptrr => self.ptrr = status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResidenceStatus {
    Owner,
    Renter,
    Other,
    #[default]
    Unknown,
}

impl ResidenceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ResidenceStatus::Owner => "own",
            ResidenceStatus::Renter => "rent",
            ResidenceStatus::Other => "other",
            ResidenceStatus::Unknown => "n/a",
        }
    }
}

impl From<String> for ResidenceStatus {
    fn from(value: String) -> Self {
        match normalize_label(&value).as_str() {
            "own" | "owner" | "homeowner" => ResidenceStatus::Owner,
            "rent" | "renter" | "tenant" => ResidenceStatus::Renter,
            "other" => ResidenceStatus::Other,
            _ => ResidenceStatus::Unknown,
        }
    }
}

impl From<ResidenceStatus> for String {
    fn from(value: ResidenceStatus) -> Self {
        value.label().to_string()
    }
}

/// Whether the household pays for heat directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HeatingCost {
    IncludedInRent,
    PaidSeparately,
    #[default]
    Unknown,
}

impl HeatingCost {
    pub const fn label(self) -> &'static str {
        match self {
            HeatingCost::IncludedInRent => "included",
            HeatingCost::PaidSeparately => "separate",
            HeatingCost::Unknown => "n/a",
        }
    }
}

impl From<String> for HeatingCost {
    fn from(value: String) -> Self {
        match normalize_label(&value).as_str() {
            "included" | "includedinrent" | "heatincluded" => HeatingCost::IncludedInRent,
            "separate" | "paidseparately" | "notincluded" => HeatingCost::PaidSeparately,
            _ => HeatingCost::Unknown,
        }
    }
}

impl From<HeatingCost> for String {
    fn from(value: HeatingCost) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceResult {
    pub combined_income: f64,
    pub eligibility: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LisResult {
    pub combined_income: f64,
    pub combined_assets: f64,
    pub eligibility: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MspResult {
    pub combined_income: f64,
    pub countable_monthly_income: f64,
    pub combined_assets: f64,
    pub eligibility: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtrrResult {
    pub combined_income: f64,
    pub estimated_rebate: f64,
    pub eligibility: Vec<String>,
}

/// SNAP figures for a meal-sharing unit. Monthly unless named otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapResult {
    pub combined_income: f64,
    pub combined_assets: f64,
    pub household_size: usize,
    pub gross_monthly_income: f64,
    pub shelter_expenses: f64,
    pub utility_expenses: f64,
    pub medical_expenses: f64,
    pub other_expenses: f64,
    pub utility_allowance: f64,
    pub standard_deduction: f64,
    pub net_income: f64,
    pub excess_shelter_cost: f64,
    pub final_net_income: f64,
    pub benefit: f64,
    pub expedited: bool,
    pub eligibility: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiheapResult {
    pub combined_income: f64,
    pub household_size: usize,
    pub income_limit: f64,
    pub eligibility: Vec<String>,
}

/// Lowercase with spaces, dashes, underscores, and slashes removed.
pub(crate) fn normalize_label(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_' | '/'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// The calendar year before `as_of`.
pub(crate) fn previous_year(as_of: NaiveDate) -> i32 {
    as_of.year() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_selection_answers_map_onto_enrollment_status() {
        assert_eq!(
            EnrollmentStatus::from("notinterested".to_string()),
            EnrollmentStatus::NotInterested
        );
        assert_eq!(
            EnrollmentStatus::from("Not Interested".to_string()),
            EnrollmentStatus::NotInterested
        );
        assert_eq!(
            EnrollmentStatus::from("n/a".to_string()),
            EnrollmentStatus::Unknown
        );
        assert_eq!(
            EnrollmentStatus::from(String::new()),
            EnrollmentStatus::Unknown
        );
        assert_eq!(
            EnrollmentStatus::from("onmedicaid".to_string()),
            EnrollmentStatus::OnMedicaid
        );
    }

    #[test]
    fn frequency_keeps_unrecognised_labels() {
        let frequency = Frequency::parse("fortnightly-ish");
        assert_eq!(frequency.yearly_multiplier(), None);
        assert_eq!(String::from(frequency), "fortnightly-ish");
        assert_eq!(Frequency::parse("Bi-Weekly"), Frequency::BiWeekly);
    }

    #[test]
    fn member_documents_use_record_field_names() {
        let raw = serde_json::json!({
            "householdMemberId": "m-1",
            "firstName": "Ada",
            "dob": "1950-02-01",
            "meals": "yes",
            "headOfHousehold": true,
            "income": [{
                "id": "i-1",
                "type": "Previous",
                "kind": "Social Security",
                "amount": 1000.0,
                "frequency": "monthly",
                "startDate": "2020-01-01"
            }],
            "expenses": [{
                "id": "e-1",
                "type": "Previous Year",
                "kind": "Property Tax",
                "amount": 1200.0,
                "frequency": "annually",
                "startDate": "2020-01-01"
            }],
            "selections": { "pace": "notinterested" }
        });

        let member: HouseholdMember = serde_json::from_value(raw).expect("member parses");
        assert!(member.shares_meals());
        assert!(member.head_of_household);
        assert_eq!(member.income[0].income_type, IncomeType::Previous);
        assert_eq!(member.expenses[0].expense_type, ExpenseType::PreviousYear);
        assert_eq!(member.selections.pace, EnrollmentStatus::NotInterested);
        assert!(member.pace.is_none());
    }

    #[test]
    fn record_types_parse_leniently_and_keep_unknown_labels() {
        let raw = serde_json::json!({
            "householdMemberId": "m-1",
            "firstName": "Ada",
            "income": [
                { "id": "i-1", "type": "current", "amount": 100.0, "frequency": "monthly" },
                { "id": "i-2", "type": "Lottery", "amount": 100.0, "frequency": "monthly" }
            ],
            "expenses": [
                { "id": "e-1", "type": "previous year", "kind": "Property Tax", "amount": 10.0 },
                { "id": "e-2", "type": "Childcare", "amount": 250.0, "frequency": "monthly" }
            ]
        });

        let member: HouseholdMember = serde_json::from_value(raw).expect("member parses");

        assert!(member.income[0].is_current());
        assert!(!member.income[1].is_current());
        assert!(!member.income[1].is_previous());
        assert_eq!(member.expenses[0].expense_type, ExpenseType::PreviousYear);
        assert_eq!(
            member.expenses[1].expense_type,
            ExpenseType::Unrecognized("Childcare".to_string())
        );

        let saved = serde_json::to_value(&member).expect("member serializes");
        assert_eq!(saved["income"][1]["type"], serde_json::json!("Lottery"));
        assert_eq!(saved["expenses"][0]["type"], serde_json::json!("Previous Year"));
        assert_eq!(saved["expenses"][1]["type"], serde_json::json!("Childcare"));
    }

    #[test]
    fn age_boundary_counts_whole_months() {
        let mut member = HouseholdMember::new("m-1", "Ada");
        member.dob = Some("1960-03-15".to_string());
        let threshold = NaiveDate::from_ymd_opt(2025, 2, 15).expect("valid");
        assert!(member
            .has_reached_months(64 * 12 + 11, threshold)
            .expect("dob parses"));
        let day_before = NaiveDate::from_ymd_opt(2025, 2, 14).expect("valid");
        assert!(!member
            .has_reached_months(64 * 12 + 11, day_before)
            .expect("dob parses"));
    }

    #[test]
    fn missing_dob_is_reported() {
        let member = HouseholdMember::new("m-2", "Bo");
        assert!(matches!(
            member.age_on(NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid")),
            Err(EvaluationError::MissingDateOfBirth(_))
        ));
    }
}
