//! Process-local stores for tests and embedded use.
//!
//! Each operation takes one lock for its whole duration, so every call is atomic on its own.

use std::{
	collections::HashMap,
	sync::{Mutex, MutexGuard},
};

use time::{Duration, OffsetDateTime};

use crate::{
	Error, Result,
	ranking::{KeyTtl, RankingStore, ScoredMember},
	store::{BoxFuture, Collection, Document, DocumentStore},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}

#[derive(Default)]
struct DocumentState {
	collections: HashMap<Collection, Vec<Document>>,
	sequences: HashMap<String, i64>,
}

#[derive(Default)]
pub struct MemoryDocumentStore {
	state: Mutex<DocumentState>,
}
impl MemoryDocumentStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a document without checking for duplicate keys, the way an external seeder would.
	pub fn seed(&self, collection: Collection, document: Document) {
		lock(&self.state).collections.entry(collection).or_default().push(document);
	}

	fn insert_now(&self, collection: Collection, document: Document) -> Result<()> {
		let mut state = lock(&self.state);
		let documents = state.collections.entry(collection).or_default();

		if documents.iter().any(|existing| existing.key == document.key) {
			return Err(Error::Conflict(format!(
				"{} record {:?} already exists.",
				collection.as_str(),
				document.key
			)));
		}

		documents.push(document);

		Ok(())
	}

	fn replace_now(&self, collection: Collection, document: Document) -> Result<()> {
		let mut state = lock(&self.state);
		let slot = state
			.collections
			.get_mut(&collection)
			.and_then(|documents| documents.iter_mut().find(|existing| existing.key == document.key));

		match slot {
			Some(slot) => {
				*slot = document;

				Ok(())
			},
			None => Err(Error::NotFound(format!(
				"{} record {:?} does not exist.",
				collection.as_str(),
				document.key
			))),
		}
	}

	fn next_sequence_now(&self, name: &str, start: i64) -> i64 {
		let mut state = lock(&self.state);
		let value = match state.sequences.get(name) {
			Some(last) => (last + 1).max(start),
			None => start,
		};

		state.sequences.insert(name.to_string(), value);

		value
	}
}
impl DocumentStore for MemoryDocumentStore {
	fn find_all<'a>(&'a self, collection: Collection) -> BoxFuture<'a, Result<Vec<Document>>> {
		let documents = lock(&self.state).collections.get(&collection).cloned().unwrap_or_default();

		Box::pin(async move { Ok(documents) })
	}

	fn get<'a>(
		&'a self,
		collection: Collection,
		key: &'a str,
	) -> BoxFuture<'a, Result<Option<Document>>> {
		let document = lock(&self.state)
			.collections
			.get(&collection)
			.and_then(|documents| documents.iter().find(|document| document.key == key).cloned());

		Box::pin(async move { Ok(document) })
	}

	fn insert<'a>(
		&'a self,
		collection: Collection,
		document: Document,
	) -> BoxFuture<'a, Result<()>> {
		let result = self.insert_now(collection, document);

		Box::pin(async move { result })
	}

	fn replace<'a>(
		&'a self,
		collection: Collection,
		document: Document,
	) -> BoxFuture<'a, Result<()>> {
		let result = self.replace_now(collection, document);

		Box::pin(async move { result })
	}

	fn count<'a>(&'a self, collection: Collection) -> BoxFuture<'a, Result<u64>> {
		let count = lock(&self.state).collections.get(&collection).map_or(0, Vec::len) as u64;

		Box::pin(async move { Ok(count) })
	}

	fn next_sequence<'a>(&'a self, name: &'a str, start: i64) -> BoxFuture<'a, Result<i64>> {
		let value = self.next_sequence_now(name, start);

		Box::pin(async move { Ok(value) })
	}
}

struct RankingKey {
	scores: HashMap<String, f64>,
	expires_at: Option<OffsetDateTime>,
}
impl RankingKey {
	fn is_expired(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| expires_at <= now)
	}
}

#[derive(Default)]
pub struct MemoryRankingStore {
	keys: Mutex<HashMap<String, RankingKey>>,
	fail_increments: Mutex<bool>,
}
impl MemoryRankingStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Moves a key's expiry into the past, as if its time to live had elapsed.
	pub fn expire_now(&self, key: &str) {
		if let Some(entry) = lock(&self.keys).get_mut(key) {
			entry.expires_at = Some(OffsetDateTime::now_utc() - Duration::seconds(1));
		}
	}

	/// Makes every following `increment` fail until reset.
	pub fn fail_increments(&self, fail: bool) {
		*lock(&self.fail_increments) = fail;
	}

	fn live_keys(&self) -> MutexGuard<'_, HashMap<String, RankingKey>> {
		let now = OffsetDateTime::now_utc();
		let mut keys = lock(&self.keys);

		keys.retain(|_, entry| !entry.is_expired(now));

		keys
	}

	fn range_now(&self, key: &str) -> Vec<ScoredMember> {
		let keys = self.live_keys();
		let mut members = keys
			.get(key)
			.map(|entry| {
				entry
					.scores
					.iter()
					.map(|(member, score)| ScoredMember { member: member.clone(), score: *score })
					.collect::<Vec<_>>()
			})
			.unwrap_or_default();

		members.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.member.cmp(&b.member)));

		members
	}

	fn increment_now(&self, key: &str, member: &str, delta: f64) -> Result<f64> {
		if *lock(&self.fail_increments) {
			return Err(Error::Unavailable("Ranking increments are disabled.".to_string()));
		}

		let mut keys = self.live_keys();
		let entry = keys
			.entry(key.to_string())
			.or_insert_with(|| RankingKey { scores: HashMap::new(), expires_at: None });
		let score = entry.scores.entry(member.to_string()).or_insert(0.0);

		*score += delta;

		Ok(*score)
	}

	fn replace_now(&self, key: &str, members: &[ScoredMember], ttl: Duration) {
		let scores =
			members.iter().map(|entry| (entry.member.clone(), entry.score)).collect::<HashMap<_, _>>();

		lock(&self.keys).insert(
			key.to_string(),
			RankingKey { scores, expires_at: Some(OffsetDateTime::now_utc() + ttl) },
		);
	}

	fn ttl_now(&self, key: &str) -> KeyTtl {
		let now = OffsetDateTime::now_utc();

		match self.live_keys().get(key) {
			None => KeyTtl::Missing,
			Some(RankingKey { expires_at: None, .. }) => KeyTtl::Persistent,
			Some(RankingKey { expires_at: Some(expires_at), .. }) =>
				KeyTtl::ExpiresIn(*expires_at - now),
		}
	}
}
impl RankingStore for MemoryRankingStore {
	fn range_with_scores<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<ScoredMember>>> {
		let members = self.range_now(key);

		Box::pin(async move { Ok(members) })
	}

	fn increment<'a>(
		&'a self,
		key: &'a str,
		member: &'a str,
		delta: f64,
	) -> BoxFuture<'a, Result<f64>> {
		let result = self.increment_now(key, member, delta);

		Box::pin(async move { result })
	}

	fn replace_with_expiry<'a>(
		&'a self,
		key: &'a str,
		members: &'a [ScoredMember],
		ttl: Duration,
	) -> BoxFuture<'a, Result<()>> {
		self.replace_now(key, members, ttl);

		Box::pin(async move { Ok(()) })
	}

	fn ttl<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<KeyTtl>> {
		let ttl = self.ttl_now(key);

		Box::pin(async move { Ok(ttl) })
	}

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool>> {
		let removed = lock(&self.keys).remove(key).is_some();

		Box::pin(async move { Ok(removed) })
	}
}
