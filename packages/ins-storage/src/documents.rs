use serde_json::Value;
use sqlx::{PgExecutor, PgPool};

use crate::{
	Error, Result,
	db::Db,
	store::{BoxFuture, Collection, Document, DocumentStore},
};

pub async fn list_documents<'e, E>(executor: E, collection: Collection) -> Result<Vec<Document>>
where
	E: PgExecutor<'e>,
{
	let rows: Vec<(String, Value)> = sqlx::query_as(
		"\
SELECT record_key, body
FROM records
WHERE collection = $1
ORDER BY seq ASC",
	)
	.bind(collection.as_str())
	.fetch_all(executor)
	.await?;

	Ok(rows.into_iter().map(|(key, body)| Document { key, body }).collect())
}

pub async fn get_document<'e, E>(
	executor: E,
	collection: Collection,
	key: &str,
) -> Result<Option<Document>>
where
	E: PgExecutor<'e>,
{
	let row: Option<(String, Value)> = sqlx::query_as(
		"\
SELECT record_key, body
FROM records
WHERE collection = $1 AND record_key = $2
LIMIT 1",
	)
	.bind(collection.as_str())
	.bind(key)
	.fetch_optional(executor)
	.await?;

	Ok(row.map(|(key, body)| Document { key, body }))
}

pub async fn insert_document<'e, E>(
	executor: E,
	collection: Collection,
	document: &Document,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
INSERT INTO records (collection, record_key, body)
VALUES ($1, $2, $3)
ON CONFLICT (collection, record_key) DO NOTHING",
	)
	.bind(collection.as_str())
	.bind(document.key.as_str())
	.bind(&document.body)
	.execute(executor)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::Conflict(format!(
			"{} record {:?} already exists.",
			collection.as_str(),
			document.key
		)));
	}

	Ok(())
}

pub async fn replace_document<'e, E>(
	executor: E,
	collection: Collection,
	document: &Document,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
UPDATE records
SET body = $3, updated_at = now()
WHERE collection = $1 AND record_key = $2",
	)
	.bind(collection.as_str())
	.bind(document.key.as_str())
	.bind(&document.body)
	.execute(executor)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!(
			"{} record {:?} does not exist.",
			collection.as_str(),
			document.key
		)));
	}

	Ok(())
}

pub async fn count_documents<'e, E>(executor: E, collection: Collection) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let count: i64 = sqlx::query_scalar("SELECT count(*) FROM records WHERE collection = $1")
		.bind(collection.as_str())
		.fetch_one(executor)
		.await?;

	Ok(count.max(0) as u64)
}

pub async fn next_sequence_value<'e, E>(executor: E, name: &str, start: i64) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	let value: i64 = sqlx::query_scalar(
		"\
INSERT INTO record_sequences (name, last_value)
VALUES ($1, $2)
ON CONFLICT (name) DO UPDATE
SET last_value = GREATEST(record_sequences.last_value + 1, EXCLUDED.last_value)
RETURNING last_value",
	)
	.bind(name)
	.bind(start)
	.fetch_one(executor)
	.await?;

	Ok(value)
}

/// Document collections kept as JSONB rows in one `records` table.
pub struct PgDocumentStore {
	pool: PgPool,
}
impl PgDocumentStore {
	pub fn new(db: &Db) -> Self {
		Self { pool: db.pool.clone() }
	}
}
impl DocumentStore for PgDocumentStore {
	fn find_all<'a>(&'a self, collection: Collection) -> BoxFuture<'a, Result<Vec<Document>>> {
		Box::pin(list_documents(&self.pool, collection))
	}

	fn get<'a>(
		&'a self,
		collection: Collection,
		key: &'a str,
	) -> BoxFuture<'a, Result<Option<Document>>> {
		Box::pin(get_document(&self.pool, collection, key))
	}

	fn insert<'a>(
		&'a self,
		collection: Collection,
		document: Document,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { insert_document(&self.pool, collection, &document).await })
	}

	fn replace<'a>(
		&'a self,
		collection: Collection,
		document: Document,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { replace_document(&self.pool, collection, &document).await })
	}

	fn count<'a>(&'a self, collection: Collection) -> BoxFuture<'a, Result<u64>> {
		Box::pin(count_documents(&self.pool, collection))
	}

	fn next_sequence<'a>(&'a self, name: &'a str, start: i64) -> BoxFuture<'a, Result<i64>> {
		Box::pin(next_sequence_value(&self.pool, name, start))
	}
}
