use serde::{Deserialize, Serialize};

use ins_storage::models::{Agent, Claim, Policy, Record, RecordId};

use crate::{InsuranceService, Result, pipeline};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPolicyCount {
	pub id: RecordId,
	pub name: String,
	pub surname: String,
	pub license: String,
	pub policy_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentClaimCount {
	pub id: RecordId,
	pub name: String,
	pub surname: String,
	pub license: String,
	pub claim_count: usize,
}

impl InsuranceService {
	/// Active agents with the number of policies they sold, zero included.
	pub async fn active_agents_with_policy_counts(&self) -> Result<Vec<AgentPolicyCount>> {
		let agents = self.records.find::<Agent, _>(|agent| agent.active).await?;
		let policies = self.records.all::<Policy>().await?;
		let counts = pipeline::count_by(&policies, |policy| policy.agent_id.clone());

		Ok(agents
			.into_iter()
			.map(|agent| AgentPolicyCount {
				policy_count: counts.get(&agent.id).copied().unwrap_or(0),
				id: agent.id,
				name: agent.name,
				surname: agent.surname,
				license: agent.license,
			})
			.collect())
	}

	/// Active agents with the total number of claims filed against their policies. Agents without
	/// claims are left out.
	pub async fn agents_with_claim_counts(&self) -> Result<Vec<AgentClaimCount>> {
		let agents = self.records.find::<Agent, _>(|agent| agent.active).await?;
		let policies = self.records.all::<Policy>().await?;
		let claims = self.records.all::<Claim>().await?;
		let policy_claims = pipeline::inner_join(
			&policies,
			&claims,
			|policy| policy.key(),
			|claim| claim.policy_number.trim().to_string(),
		);
		let counts = pipeline::count_by(&policy_claims, |(policy, _)| policy.agent_id.clone());

		Ok(agents
			.into_iter()
			.filter_map(|agent| {
				let claim_count = counts.get(&agent.id).copied()?;

				Some(AgentClaimCount {
					id: agent.id,
					name: agent.name,
					surname: agent.surname,
					license: agent.license,
					claim_count,
				})
			})
			.collect())
	}
}
