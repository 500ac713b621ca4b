//! Sorted score sets with an optional expiry, one per cache key.
//!
//! A key written by `replace_with_expiry` carries an expiry; a key created by `increment` on a
//! missing or expired key carries none. Expired keys read as missing and are removed lazily.

use sqlx::{PgExecutor, PgPool};
use time::{Duration, OffsetDateTime};

use crate::{Result, db::Db, store::BoxFuture};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
	pub member: String,
	pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
	Missing,
	/// The key exists and never expires.
	Persistent,
	ExpiresIn(Duration),
}

pub trait RankingStore
where
	Self: Send + Sync,
{
	/// Members of a live key, highest score first.
	fn range_with_scores<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<ScoredMember>>>;

	/// Adds `delta` to a member's score, creating the key and member when absent. Returns the new
	/// score.
	fn increment<'a>(
		&'a self,
		key: &'a str,
		member: &'a str,
		delta: f64,
	) -> BoxFuture<'a, Result<f64>>;

	/// Atomically swaps the whole key for `members` with the given time to live.
	fn replace_with_expiry<'a>(
		&'a self,
		key: &'a str,
		members: &'a [ScoredMember],
		ttl: Duration,
	) -> BoxFuture<'a, Result<()>>;

	fn ttl<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<KeyTtl>>;

	/// Returns whether a key was removed.
	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool>>;
}

pub async fn purge_expired<'e, E>(executor: E, key: &str) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
DELETE FROM ranking_cache_keys
WHERE cache_key = $1 AND expires_at IS NOT NULL AND expires_at <= now()",
	)
	.bind(key)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn list_scores<'e, E>(executor: E, key: &str) -> Result<Vec<ScoredMember>>
where
	E: PgExecutor<'e>,
{
	let rows: Vec<(String, f64)> = sqlx::query_as(
		"\
SELECT s.member, s.score
FROM ranking_cache_scores s
JOIN ranking_cache_keys k ON k.cache_key = s.cache_key
WHERE s.cache_key = $1 AND (k.expires_at IS NULL OR k.expires_at > now())
ORDER BY s.score DESC, s.member ASC",
	)
	.bind(key)
	.fetch_all(executor)
	.await?;

	Ok(rows.into_iter().map(|(member, score)| ScoredMember { member, score }).collect())
}

pub async fn key_ttl<'e, E>(executor: E, key: &str) -> Result<KeyTtl>
where
	E: PgExecutor<'e>,
{
	let row: Option<(Option<OffsetDateTime>, OffsetDateTime)> = sqlx::query_as(
		"\
SELECT expires_at, now()
FROM ranking_cache_keys
WHERE cache_key = $1",
	)
	.bind(key)
	.fetch_optional(executor)
	.await?;

	Ok(match row {
		None => KeyTtl::Missing,
		Some((None, _)) => KeyTtl::Persistent,
		Some((Some(expires_at), now)) if expires_at > now => KeyTtl::ExpiresIn(expires_at - now),
		Some(_) => KeyTtl::Missing,
	})
}

pub async fn delete_key<'e, E>(executor: E, key: &str) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM ranking_cache_keys WHERE cache_key = $1")
		.bind(key)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}

pub struct PgRankingStore {
	pool: PgPool,
}
impl PgRankingStore {
	pub fn new(db: &Db) -> Self {
		Self { pool: db.pool.clone() }
	}

	async fn increment_inner(&self, key: &str, member: &str, delta: f64) -> Result<f64> {
		let mut tx = self.pool.begin().await?;

		purge_expired(&mut *tx, key).await?;

		sqlx::query(
			"\
INSERT INTO ranking_cache_keys (cache_key, expires_at)
VALUES ($1, NULL)
ON CONFLICT (cache_key) DO UPDATE SET updated_at = now()",
		)
		.bind(key)
		.execute(&mut *tx)
		.await?;

		let score: f64 = sqlx::query_scalar(
			"\
INSERT INTO ranking_cache_scores (cache_key, member, score)
VALUES ($1, $2, $3)
ON CONFLICT (cache_key, member) DO UPDATE SET score = ranking_cache_scores.score + EXCLUDED.score
RETURNING score",
		)
		.bind(key)
		.bind(member)
		.bind(delta)
		.fetch_one(&mut *tx)
		.await?;

		tx.commit().await?;

		Ok(score)
	}

	async fn replace_inner(&self, key: &str, members: &[ScoredMember], ttl: Duration) -> Result<()> {
		let names = members.iter().map(|entry| entry.member.clone()).collect::<Vec<_>>();
		let scores = members.iter().map(|entry| entry.score).collect::<Vec<_>>();
		let mut tx = self.pool.begin().await?;

		delete_key(&mut *tx, key).await?;

		sqlx::query(
			"\
INSERT INTO ranking_cache_keys (cache_key, expires_at)
VALUES ($1, now() + make_interval(secs => $2))",
		)
		.bind(key)
		.bind(ttl.as_seconds_f64())
		.execute(&mut *tx)
		.await?;
		sqlx::query(
			"\
INSERT INTO ranking_cache_scores (cache_key, member, score)
SELECT $1, member, score
FROM UNNEST($2::text[], $3::double precision[]) AS t(member, score)",
		)
		.bind(key)
		.bind(&names)
		.bind(&scores)
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;

		Ok(())
	}
}
impl RankingStore for PgRankingStore {
	fn range_with_scores<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<ScoredMember>>> {
		Box::pin(list_scores(&self.pool, key))
	}

	fn increment<'a>(
		&'a self,
		key: &'a str,
		member: &'a str,
		delta: f64,
	) -> BoxFuture<'a, Result<f64>> {
		Box::pin(self.increment_inner(key, member, delta))
	}

	fn replace_with_expiry<'a>(
		&'a self,
		key: &'a str,
		members: &'a [ScoredMember],
		ttl: Duration,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.replace_inner(key, members, ttl))
	}

	fn ttl<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<KeyTtl>> {
		Box::pin(key_ttl(&self.pool, key))
	}

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool>> {
		Box::pin(delete_key(&self.pool, key))
	}
}
