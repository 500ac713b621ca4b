//! Write validators.
//!
//! Each entity has one validator, split into ordered steps: presence and format first, then the
//! referential checks (which need store lookups, so the caller performs the lookup and hands the
//! outcome in), then business rules. The first failing step wins.

use std::fmt;

use regex::Regex;
use time::Date;

use crate::{
	dates,
	state::{ClaimState, PolicyState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
	MissingField,
	MalformedField,
	UnknownClient,
	InactiveClient,
	UnknownAgent,
	InactiveAgent,
	InvalidDateRange,
	NonPositiveAmount,
	InvalidState,
	UnknownPolicy,
	PolicyNotActive,
	FutureDate,
	EmptyUpdate,
}
impl RejectCode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::MissingField => "REJECT_MISSING_FIELD",
			Self::MalformedField => "REJECT_MALFORMED_FIELD",
			Self::UnknownClient => "REJECT_UNKNOWN_CLIENT",
			Self::InactiveClient => "REJECT_INACTIVE_CLIENT",
			Self::UnknownAgent => "REJECT_UNKNOWN_AGENT",
			Self::InactiveAgent => "REJECT_INACTIVE_AGENT",
			Self::InvalidDateRange => "REJECT_INVALID_DATE_RANGE",
			Self::NonPositiveAmount => "REJECT_NON_POSITIVE_AMOUNT",
			Self::InvalidState => "REJECT_INVALID_STATE",
			Self::UnknownPolicy => "REJECT_UNKNOWN_POLICY",
			Self::PolicyNotActive => "REJECT_POLICY_NOT_ACTIVE",
			Self::FutureDate => "REJECT_FUTURE_DATE",
			Self::EmptyUpdate => "REJECT_EMPTY_UPDATE",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
	pub code: RejectCode,
	pub field: &'static str,
}
impl Rejection {
	fn new(code: RejectCode, field: &'static str) -> Self {
		Self { code, field }
	}
}
impl fmt::Display for Rejection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let field = self.field;

		match self.code {
			RejectCode::MissingField => write!(f, "{field} is required."),
			RejectCode::MalformedField => write!(f, "{field} is malformed."),
			RejectCode::UnknownClient => write!(f, "{field} does not reference a known client."),
			RejectCode::InactiveClient => write!(f, "{field} references an inactive client."),
			RejectCode::UnknownAgent => write!(f, "{field} does not reference a known agent."),
			RejectCode::InactiveAgent => write!(f, "{field} references an inactive agent."),
			RejectCode::InvalidDateRange => write!(f, "{field} must be after start_date."),
			RejectCode::NonPositiveAmount => write!(f, "{field} must be a positive amount."),
			RejectCode::InvalidState => write!(f, "{field} is not a recognized state."),
			RejectCode::UnknownPolicy => write!(f, "{field} does not reference a known policy."),
			RejectCode::PolicyNotActive => {
				write!(f, "{field} references a policy that is not active.")
			},
			RejectCode::FutureDate => write!(f, "{field} must not be in the future."),
			RejectCode::EmptyUpdate => write!(f, "No updatable fields provided."),
		}
	}
}
impl std::error::Error for Rejection {}

pub type Checked<T> = Result<T, Rejection>;

/// Outcome of looking up a referenced party: `None` when it does not exist, otherwise its active
/// flag.
pub type PartyLookup = Option<bool>;

pub struct PolicyFields<'a> {
	pub client_id: Option<&'a str>,
	pub agent_id: Option<&'a str>,
	pub policy_type: Option<&'a str>,
	pub start_date: Option<&'a str>,
	pub end_date: Option<&'a str>,
	pub monthly_premium: Option<f64>,
	pub total_coverage: Option<f64>,
	pub state: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDraft {
	pub client_id: String,
	pub agent_id: String,
	pub policy_type: String,
	pub start_date: Date,
	pub end_date: Date,
	pub monthly_premium: f64,
	pub total_coverage: f64,
	pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidPolicy {
	pub client_id: String,
	pub agent_id: String,
	pub policy_type: String,
	pub start_date: Date,
	pub end_date: Date,
	pub monthly_premium: f64,
	pub total_coverage: f64,
	pub state: PolicyState,
}

pub struct ClientFields<'a> {
	pub name: Option<&'a str>,
	pub surname: Option<&'a str>,
	pub national_id: Option<&'a str>,
	pub email: Option<&'a str>,
	pub phone: Option<&'a str>,
	pub address: Option<&'a str>,
	pub city: Option<&'a str>,
	pub province: Option<&'a str>,
	pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidClient {
	pub name: String,
	pub surname: String,
	pub national_id: String,
	pub email: String,
	pub phone: String,
	pub address: String,
	pub city: String,
	pub province: Option<String>,
	pub active: bool,
}

/// The whitelisted, independently updatable client fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientPatch {
	pub email: Option<String>,
	pub phone: Option<String>,
	pub address: Option<String>,
	pub city: Option<String>,
	pub province: Option<String>,
	pub active: Option<bool>,
}

pub struct ClaimFields<'a> {
	pub policy_number: Option<&'a str>,
	pub date: Option<&'a str>,
	pub claim_type: Option<&'a str>,
	pub estimated_amount: Option<f64>,
	pub description: Option<&'a str>,
	pub state: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClaimDraft {
	pub policy_number: String,
	pub date: Date,
	pub claim_type: String,
	pub estimated_amount: f64,
	pub description: String,
	pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidClaim {
	pub policy_number: String,
	pub date: Date,
	pub claim_type: String,
	pub estimated_amount: f64,
	pub description: String,
	pub state: ClaimState,
}

/// Step 1 of policy validation: presence and format.
pub fn policy_fields(fields: &PolicyFields<'_>) -> Checked<PolicyDraft> {
	let client_id = required(fields.client_id, "client_id")?;
	let agent_id = required(fields.agent_id, "agent_id")?;
	let policy_type = required(fields.policy_type, "type")?;
	let start_date = required_date(fields.start_date, "start_date")?;
	let end_date = required_date(fields.end_date, "end_date")?;
	let monthly_premium = required_amount(fields.monthly_premium, "monthly_premium")?;
	let total_coverage = required_amount(fields.total_coverage, "total_coverage")?;

	Ok(PolicyDraft {
		client_id,
		agent_id,
		policy_type,
		start_date,
		end_date,
		monthly_premium,
		total_coverage,
		state: optional(fields.state),
	})
}

/// Step 2: the referenced client exists and is active.
pub fn policy_client(client: PartyLookup) -> Checked<()> {
	match client {
		None => Err(Rejection::new(RejectCode::UnknownClient, "client_id")),
		Some(false) => Err(Rejection::new(RejectCode::InactiveClient, "client_id")),
		Some(true) => Ok(()),
	}
}

/// Step 3: the referenced agent exists and is active.
pub fn policy_agent(agent: PartyLookup) -> Checked<()> {
	match agent {
		None => Err(Rejection::new(RejectCode::UnknownAgent, "agent_id")),
		Some(false) => Err(Rejection::new(RejectCode::InactiveAgent, "agent_id")),
		Some(true) => Ok(()),
	}
}

/// Steps 4-6: date range, amounts, state.
pub fn policy_terms(draft: PolicyDraft) -> Checked<ValidPolicy> {
	if draft.end_date <= draft.start_date {
		return Err(Rejection::new(RejectCode::InvalidDateRange, "end_date"));
	}

	positive(draft.monthly_premium, "monthly_premium")?;
	positive(draft.total_coverage, "total_coverage")?;

	let state = match draft.state.as_deref() {
		None => PolicyState::Active,
		Some(raw) => PolicyState::parse_loose(raw)
			.ok_or_else(|| Rejection::new(RejectCode::InvalidState, "state"))?,
	};

	Ok(ValidPolicy {
		client_id: draft.client_id,
		agent_id: draft.agent_id,
		policy_type: draft.policy_type,
		start_date: draft.start_date,
		end_date: draft.end_date,
		monthly_premium: draft.monthly_premium,
		total_coverage: draft.total_coverage,
		state,
	})
}

/// Presence then format. Uniqueness of the national id is a store concern and is checked by the
/// caller afterwards.
pub fn client_fields(fields: &ClientFields<'_>) -> Checked<ValidClient> {
	let name = required(fields.name, "name")?;
	let surname = required(fields.surname, "surname")?;
	let national_id = required(fields.national_id, "national_id")?;
	let email = required(fields.email, "email")?;
	let phone = required(fields.phone, "phone")?;
	let address = required(fields.address, "address")?;
	let city = required(fields.city, "city")?;

	check_national_id(&national_id)?;
	check_email(&email)?;
	check_phone(&phone)?;

	Ok(ValidClient {
		name,
		surname,
		national_id,
		email,
		phone,
		address,
		city,
		province: optional(fields.province),
		active: fields.active.unwrap_or(true),
	})
}

/// Validates a whitelisted update with the same per-field rules as creation.
pub fn client_patch(fields: &ClientFields<'_>) -> Checked<ClientPatch> {
	let mut patch = ClientPatch::default();

	if let Some(email) = fields.email {
		let email = non_blank(email, "email")?;

		check_email(&email)?;

		patch.email = Some(email);
	}
	if let Some(phone) = fields.phone {
		let phone = non_blank(phone, "phone")?;

		check_phone(&phone)?;

		patch.phone = Some(phone);
	}
	if let Some(address) = fields.address {
		patch.address = Some(non_blank(address, "address")?);
	}
	if let Some(city) = fields.city {
		patch.city = Some(non_blank(city, "city")?);
	}
	if let Some(province) = fields.province {
		patch.province = Some(province.trim().to_string());
	}

	patch.active = fields.active;

	if patch == ClientPatch::default() {
		return Err(Rejection::new(RejectCode::EmptyUpdate, "body"));
	}

	Ok(patch)
}

/// Step 1 of claim validation: presence and format.
pub fn claim_fields(fields: &ClaimFields<'_>) -> Checked<ClaimDraft> {
	let policy_number = required(fields.policy_number, "policy_number")?;
	let date = required_date(fields.date, "date")?;
	let claim_type = required(fields.claim_type, "type")?;
	let estimated_amount = required_amount(fields.estimated_amount, "estimated_amount")?;
	let description = required(fields.description, "description")?;

	Ok(ClaimDraft {
		policy_number,
		date,
		claim_type,
		estimated_amount,
		description,
		state: optional(fields.state),
	})
}

/// Step 2: the referenced policy exists and is in an active-like state.
pub fn claim_policy(policy: Option<PolicyState>) -> Checked<()> {
	match policy {
		None => Err(Rejection::new(RejectCode::UnknownPolicy, "policy_number")),
		Some(state) if !state.is_active_like() => {
			Err(Rejection::new(RejectCode::PolicyNotActive, "policy_number"))
		},
		Some(_) => Ok(()),
	}
}

/// Steps 3-4: amount, date, state.
pub fn claim_terms(draft: ClaimDraft, today: Date) -> Checked<ValidClaim> {
	positive(draft.estimated_amount, "estimated_amount")?;

	if draft.date > today {
		return Err(Rejection::new(RejectCode::FutureDate, "date"));
	}

	let state = match draft.state.as_deref() {
		None => ClaimState::Open,
		Some(raw) => ClaimState::parse_loose(raw)
			.ok_or_else(|| Rejection::new(RejectCode::InvalidState, "state"))?,
	};

	Ok(ValidClaim {
		policy_number: draft.policy_number,
		date: draft.date,
		claim_type: draft.claim_type,
		estimated_amount: draft.estimated_amount,
		description: draft.description,
		state,
	})
}

pub fn check_email(email: &str) -> Checked<()> {
	matches_pattern(email, r"^[^@\s]+@[^@\s]+\.[A-Za-z]{2,}$", "email")
}

pub fn check_phone(phone: &str) -> Checked<()> {
	matches_pattern(phone, r"^\+?[0-9][0-9 \-]{4,}[0-9]$", "phone")?;

	let digits = phone.chars().filter(char::is_ascii_digit).count();

	if !(6..=20).contains(&digits) {
		return Err(Rejection::new(RejectCode::MalformedField, "phone"));
	}

	Ok(())
}

pub fn check_national_id(national_id: &str) -> Checked<()> {
	matches_pattern(national_id, r"^[0-9]{7,8}$", "national_id")
}

fn matches_pattern(value: &str, pattern: &str, field: &'static str) -> Checked<()> {
	if Regex::new(pattern).map(|re| re.is_match(value)).unwrap_or(false) {
		Ok(())
	} else {
		Err(Rejection::new(RejectCode::MalformedField, field))
	}
}

fn required(value: Option<&str>, field: &'static str) -> Checked<String> {
	match value {
		Some(value) => non_blank(value, field),
		None => Err(Rejection::new(RejectCode::MissingField, field)),
	}
}

fn non_blank(value: &str, field: &'static str) -> Checked<String> {
	let trimmed = value.trim();

	if trimmed.is_empty() {
		return Err(Rejection::new(RejectCode::MissingField, field));
	}

	Ok(trimmed.to_string())
}

fn optional(value: Option<&str>) -> Option<String> {
	value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}

fn required_date(value: Option<&str>, field: &'static str) -> Checked<Date> {
	let raw = required(value, field)?;

	dates::parse_iso_date(&raw).ok_or_else(|| Rejection::new(RejectCode::MalformedField, field))
}

fn required_amount(value: Option<f64>, field: &'static str) -> Checked<f64> {
	match value {
		Some(amount) if amount.is_finite() => Ok(amount),
		Some(_) => Err(Rejection::new(RejectCode::MalformedField, field)),
		None => Err(Rejection::new(RejectCode::MissingField, field)),
	}
}

fn positive(amount: f64, field: &'static str) -> Checked<()> {
	if amount > 0.0 { Ok(()) } else { Err(Rejection::new(RejectCode::NonPositiveAmount, field)) }
}
