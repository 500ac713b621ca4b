use serde::{Deserialize, Serialize};
use time::Date;

use ins_domain::{
	PolicyState,
	validate::{self, PolicyFields},
};
use ins_storage::models::{Agent, Client, Policy, RecordId};

use crate::{Error, InsuranceService, PersonName, Result, pipeline};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiredPolicy {
	pub policy_number: String,
	#[serde(with = "crate::time_serde")]
	pub end_date: Date,
	pub client: PersonName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePolicy {
	pub policy_number: String,
	pub client_id: RecordId,
	pub agent_id: RecordId,
	#[serde(rename = "type")]
	pub policy_type: String,
	#[serde(with = "crate::time_serde")]
	pub start_date: Date,
	#[serde(with = "crate::time_serde")]
	pub end_date: Date,
	pub monthly_premium: f64,
	pub total_coverage: f64,
	pub state: PolicyState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspendedPolicy {
	pub policy_number: String,
	pub client_id: RecordId,
	#[serde(with = "crate::time_serde")]
	pub start_date: Date,
	#[serde(with = "crate::time_serde")]
	pub end_date: Date,
	pub monthly_premium: f64,
	pub total_coverage: f64,
	pub state: PolicyState,
	pub client: ClientStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStatus {
	pub name: String,
	pub surname: String,
	pub active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuePolicyRequest {
	pub client_id: Option<RecordId>,
	pub agent_id: Option<RecordId>,
	#[serde(rename = "type")]
	pub policy_type: Option<String>,
	pub start_date: Option<String>,
	pub end_date: Option<String>,
	pub monthly_premium: Option<f64>,
	pub total_coverage: Option<f64>,
	pub state: Option<String>,
}

impl InsuranceService {
	pub async fn expired_policies_with_client(&self) -> Result<Vec<ExpiredPolicy>> {
		let policies =
			self.records.find::<Policy, _>(|policy| policy.state == PolicyState::Expired).await?;
		let clients = self.records.all::<Client>().await?;

		Ok(pipeline::inner_join(
			&policies,
			&clients,
			|policy| policy.client_id.clone(),
			|client| client.id.clone(),
		)
		.into_iter()
		.map(|(policy, client)| ExpiredPolicy {
			policy_number: policy.policy_number.clone(),
			end_date: policy.end_date,
			client: PersonName { name: client.name.clone(), surname: client.surname.clone() },
		})
		.collect())
	}

	/// Active policies, earliest start first. Policies starting on the same day keep store order.
	pub async fn active_policies_by_start_date(&self) -> Result<Vec<ActivePolicy>> {
		let mut policies =
			self.records.find::<Policy, _>(|policy| policy.state == PolicyState::Active).await?;

		policies.sort_by_key(|policy| policy.start_date);

		Ok(policies
			.into_iter()
			.map(|policy| ActivePolicy {
				policy_number: policy.policy_number,
				client_id: policy.client_id,
				agent_id: policy.agent_id,
				policy_type: policy.policy_type,
				start_date: policy.start_date,
				end_date: policy.end_date,
				monthly_premium: policy.monthly_premium,
				total_coverage: policy.total_coverage,
				state: policy.state,
			})
			.collect())
	}

	pub async fn suspended_policies_with_client(&self) -> Result<Vec<SuspendedPolicy>> {
		let policies =
			self.records.find::<Policy, _>(|policy| policy.state == PolicyState::Suspended).await?;
		let clients = self.records.all::<Client>().await?;

		Ok(pipeline::inner_join(
			&policies,
			&clients,
			|policy| policy.client_id.clone(),
			|client| client.id.clone(),
		)
		.into_iter()
		.map(|(policy, client)| SuspendedPolicy {
			policy_number: policy.policy_number.clone(),
			client_id: policy.client_id.clone(),
			start_date: policy.start_date,
			end_date: policy.end_date,
			monthly_premium: policy.monthly_premium,
			total_coverage: policy.total_coverage,
			state: policy.state,
			client: ClientStatus {
				name: client.name.clone(),
				surname: client.surname.clone(),
				active: client.active,
			},
		})
		.collect())
	}

	pub async fn get_policy(&self, policy_number: &str) -> Result<Policy> {
		self.records.get::<Policy>(policy_number).await?.ok_or_else(|| Error::NotFound {
			message: format!("Policy {:?} does not exist.", policy_number.trim()),
		})
	}

	/// Validates and stores a new policy, then adds its coverage to the client's ranking score.
	///
	/// The policy stays stored when the ranking increment fails; the ranking snapshot is dropped
	/// instead so the next read recomputes it.
	pub async fn issue_policy(&self, req: IssuePolicyRequest) -> Result<Policy> {
		let fields = PolicyFields {
			client_id: req.client_id.as_ref().map(RecordId::as_str),
			agent_id: req.agent_id.as_ref().map(RecordId::as_str),
			policy_type: req.policy_type.as_deref(),
			start_date: req.start_date.as_deref(),
			end_date: req.end_date.as_deref(),
			monthly_premium: req.monthly_premium,
			total_coverage: req.total_coverage,
			state: req.state.as_deref(),
		};
		let draft = validate::policy_fields(&fields)?;
		let client = self.records.get::<Client>(&draft.client_id).await?;

		validate::policy_client(client.as_ref().map(|client| client.active))?;

		let agent = self.records.get::<Agent>(&draft.agent_id).await?;

		validate::policy_agent(agent.as_ref().map(|agent| agent.active))?;

		let valid = validate::policy_terms(draft)?;
		let sequence = self.next_policy_sequence().await?;
		let policy = Policy {
			policy_number: self.policy_number(sequence),
			client_id: RecordId::new(&valid.client_id),
			agent_id: RecordId::new(&valid.agent_id),
			policy_type: valid.policy_type,
			start_date: valid.start_date,
			end_date: valid.end_date,
			monthly_premium: valid.monthly_premium,
			total_coverage: valid.total_coverage,
			state: valid.state,
		};

		self.records.insert(&policy).await?;

		tracing::info!(
			policy_number = %policy.policy_number,
			client_id = %policy.client_id,
			total_coverage = policy.total_coverage,
			"Policy issued."
		);

		if let Err(err) = self.record_issuance(&policy.client_id, policy.total_coverage).await {
			tracing::warn!(
				error = %err,
				policy_number = %policy.policy_number,
				"Ranking increment failed. Dropping the ranking snapshot."
			);

			if let Err(err) = self.invalidate_ranking().await {
				tracing::warn!(error = %err, "Ranking snapshot drop failed.");
			}
		}

		Ok(policy)
	}

	/// Seeded numbers that carry the configured prefix push the sequence past them, so issuance
	/// never lands on a stored policy.
	async fn next_policy_sequence(&self) -> Result<i64> {
		let cfg = &self.cfg.policies;
		let highest = self
			.records
			.all::<Policy>()
			.await?
			.iter()
			.filter_map(|policy| {
				let suffix = policy.policy_number.trim().strip_prefix(cfg.number_prefix.as_str())?;

				suffix.parse::<i64>().ok()
			})
			.max()
			.unwrap_or(0);
		let start = cfg.first_sequence.max(highest.saturating_add(1));

		Ok(self.records.next_sequence("policies", start).await?)
	}

	fn policy_number(&self, sequence: i64) -> String {
		let cfg = &self.cfg.policies;

		format!("{}{:0width$}", cfg.number_prefix, sequence, width = cfg.number_width as usize)
	}
}
