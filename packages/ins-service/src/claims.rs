use serde::{Deserialize, Serialize};
use time::Date;

use ins_domain::{
	ClaimState, dates,
	validate::{self, ClaimFields},
};
use ins_storage::models::{Claim, Client, Policy, Record, RecordId};

use crate::{Error, InsuranceService, PersonName, Result, pipeline};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenClaim {
	#[serde(with = "crate::time_serde")]
	pub date: Date,
	#[serde(rename = "type")]
	pub claim_type: String,
	pub amount: f64,
	pub client: PersonName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentClaim {
	pub id: RecordId,
	pub policy_number: String,
	#[serde(with = "crate::time_serde")]
	pub date: Date,
	#[serde(rename = "type")]
	pub claim_type: String,
	pub estimated_amount: f64,
	pub description: String,
	pub state: ClaimState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentClaimsRequest {
	#[serde(rename = "type", default)]
	pub claim_type: String,
	/// Window end; defaults to today (UTC).
	#[serde(default, with = "crate::time_serde::option")]
	pub as_of: Option<Date>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateClaimRequest {
	pub policy_number: Option<String>,
	pub date: Option<String>,
	#[serde(rename = "type")]
	pub claim_type: Option<String>,
	pub estimated_amount: Option<f64>,
	pub description: Option<String>,
	pub state: Option<String>,
}

impl InsuranceService {
	/// Open claims with the name of the client holding the claimed policy.
	pub async fn open_claims_with_client(&self) -> Result<Vec<OpenClaim>> {
		let claims = self.records.find::<Claim, _>(|claim| claim.state == ClaimState::Open).await?;
		let policies = self.records.all::<Policy>().await?;
		let clients = self.records.all::<Client>().await?;
		let claim_policies = pipeline::inner_join(
			&claims,
			&policies,
			|claim| claim.policy_number.trim().to_string(),
			|policy| policy.key(),
		);

		Ok(pipeline::inner_join(
			&claim_policies,
			&clients,
			|(_, policy)| policy.client_id.clone(),
			|client| client.id.clone(),
		)
		.into_iter()
		.map(|((claim, _), client)| OpenClaim {
			date: claim.date,
			claim_type: claim.claim_type.clone(),
			amount: claim.estimated_amount,
			client: PersonName { name: client.name.clone(), surname: client.surname.clone() },
		})
		.collect())
	}

	/// Claims of one type dated within the year before `as_of`.
	pub async fn recent_claims_of_type(
		&self,
		req: RecentClaimsRequest,
	) -> Result<Vec<RecentClaim>> {
		let claim_type = req.claim_type.trim();

		if claim_type.is_empty() {
			return Err(Error::invalid("type", "type is required."));
		}

		let since = dates::one_year_before(req.as_of.unwrap_or_else(Self::today));
		let claims = self
			.records
			.find::<Claim, _>(|claim| claim.claim_type.trim() == claim_type && claim.date >= since)
			.await?;

		Ok(claims
			.into_iter()
			.map(|claim| RecentClaim {
				id: claim.id,
				policy_number: claim.policy_number,
				date: claim.date,
				claim_type: claim.claim_type,
				estimated_amount: claim.estimated_amount,
				description: claim.description,
				state: claim.state,
			})
			.collect())
	}

	pub async fn create_claim(&self, req: CreateClaimRequest) -> Result<Claim> {
		let fields = ClaimFields {
			policy_number: req.policy_number.as_deref(),
			date: req.date.as_deref(),
			claim_type: req.claim_type.as_deref(),
			estimated_amount: req.estimated_amount,
			description: req.description.as_deref(),
			state: req.state.as_deref(),
		};
		let draft = validate::claim_fields(&fields)?;
		let policy = self.records.get::<Policy>(&draft.policy_number).await?;

		validate::claim_policy(policy.as_ref().map(|policy| policy.state))?;

		let valid = validate::claim_terms(draft, Self::today())?;
		let id = self.next_record_id::<Claim, _>(|claim| claim.id.as_number()).await?;
		let claim = Claim {
			id: RecordId::from(id),
			policy_number: valid.policy_number,
			date: valid.date,
			claim_type: valid.claim_type,
			estimated_amount: valid.estimated_amount,
			description: valid.description,
			state: valid.state,
		};

		self.records.insert(&claim).await?;

		tracing::info!(
			claim_id = %claim.id,
			policy_number = %claim.policy_number,
			"Claim created."
		);

		Ok(claim)
	}
}
