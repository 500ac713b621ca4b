//! Cache-aside ranking of clients by total coverage.
//!
//! A snapshot is only served while it is live: written by a full recompute and not yet expired.
//! Issuances increment the stored score in place. An increment that lands on a missing or expired
//! key creates a key without expiry, which reads treat as a miss, so the next read replaces it with
//! a fresh aggregate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::Duration;

use ins_storage::{
	models::{Client, Policy, RecordId},
	ranking::{KeyTtl, ScoredMember},
};

use crate::{Error, InsuranceService, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedClient {
	pub client_id: RecordId,
	/// Empty when the client record no longer resolves.
	pub name: String,
	pub surname: String,
	pub total_coverage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopClients {
	pub from_cache: bool,
	pub clients: Vec<RankedClient>,
}

impl InsuranceService {
	/// The `n` clients with the highest total coverage.
	pub async fn get_top(&self, n: u32) -> Result<TopClients> {
		let max = self.cfg.ranking.max_top_n;

		if n == 0 || n > max {
			return Err(Error::invalid("n", format!("n must be between 1 and {max}.")));
		}

		let key = self.cfg.ranking.cache_key.as_str();
		let cached = match self.ranking.ttl(key).await? {
			KeyTtl::ExpiresIn(_) => self.ranking.range_with_scores(key).await?,
			KeyTtl::Missing | KeyTtl::Persistent => Vec::new(),
		};
		let (from_cache, scores) = if cached.is_empty() {
			tracing::info!(cache_key = key, hit = false, "Ranking cache miss.");

			(false, self.recompute_ranking(key).await?)
		} else {
			tracing::info!(
				cache_key = key,
				hit = true,
				members = cached.len(),
				"Ranking cache hit."
			);

			(true, cached)
		};
		let mut ranked = scores
			.into_iter()
			.map(|entry| (RecordId::new(&entry.member), entry.score))
			.collect::<Vec<_>>();

		ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
		ranked.truncate(n as usize);

		let clients = self.records.all::<Client>().await?;
		let mut names: HashMap<&RecordId, &Client> = HashMap::new();

		for client in &clients {
			names.entry(&client.id).or_insert(client);
		}

		let clients = ranked
			.into_iter()
			.map(|(client_id, total_coverage)| {
				let (name, surname) = names
					.get(&client_id)
					.map(|client| (client.name.clone(), client.surname.clone()))
					.unwrap_or_default();

				RankedClient { client_id, name, surname, total_coverage }
			})
			.collect();

		Ok(TopClients { from_cache, clients })
	}

	/// Adds an issued policy's coverage to the client's score and returns the new score.
	pub async fn record_issuance(&self, client_id: &RecordId, amount: f64) -> Result<f64> {
		let key = self.cfg.ranking.cache_key.as_str();
		let score = self.ranking.increment(key, client_id.as_str(), amount).await?;

		tracing::debug!(
			cache_key = key,
			client_id = %client_id,
			score,
			"Ranking score incremented."
		);

		Ok(score)
	}

	/// Drops the ranking snapshot so the next read recomputes it. Returns whether one existed.
	pub async fn invalidate_ranking(&self) -> Result<bool> {
		let key = self.cfg.ranking.cache_key.as_str();
		let removed = self.ranking.delete(key).await?;

		tracing::info!(cache_key = key, removed, "Ranking snapshot invalidated.");

		Ok(removed)
	}

	async fn recompute_ranking(&self, key: &str) -> Result<Vec<ScoredMember>> {
		let policies = self.records.all::<Policy>().await?;

		if policies.is_empty() {
			return Err(Error::EmptyResult { message: "No policies to rank.".to_string() });
		}

		let mut totals: Vec<(RecordId, f64)> = Vec::new();
		let mut slots: HashMap<RecordId, usize> = HashMap::new();

		for policy in &policies {
			match slots.get(&policy.client_id) {
				Some(slot) => totals[*slot].1 += policy.total_coverage,
				None => {
					slots.insert(policy.client_id.clone(), totals.len());
					totals.push((policy.client_id.clone(), policy.total_coverage));
				},
			}
		}

		let members = totals
			.into_iter()
			.map(|(client_id, score)| ScoredMember { member: client_id.to_string(), score })
			.collect::<Vec<_>>();
		let ttl = Duration::seconds(self.cfg.ranking.ttl_seconds);

		self.ranking.replace_with_expiry(key, &members, ttl).await?;

		tracing::info!(
			cache_key = key,
			members = members.len(),
			policies = policies.len(),
			ttl_seconds = self.cfg.ranking.ttl_seconds,
			"Ranking snapshot recomputed."
		);

		Ok(members)
	}
}
