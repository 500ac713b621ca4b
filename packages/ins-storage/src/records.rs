use std::sync::Arc;

use crate::{
	Error, Result,
	models::Record,
	store::{Document, DocumentStore},
};

/// Typed access to a `DocumentStore`: documents are decoded into records on the way out and
/// encoded canonically on the way in.
#[derive(Clone)]
pub struct Records {
	store: Arc<dyn DocumentStore>,
}
impl Records {
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self { store }
	}

	pub fn store(&self) -> &Arc<dyn DocumentStore> {
		&self.store
	}

	/// Every record of a collection, in insertion order.
	pub async fn all<R>(&self) -> Result<Vec<R>>
	where
		R: Record,
	{
		let documents = self.store.find_all(R::COLLECTION).await?;

		documents.into_iter().map(decode::<R>).collect()
	}

	pub async fn find<R, F>(&self, predicate: F) -> Result<Vec<R>>
	where
		R: Record,
		F: Fn(&R) -> bool,
	{
		let mut records = self.all::<R>().await?;

		records.retain(|record| predicate(record));

		Ok(records)
	}

	pub async fn get<R>(&self, key: &str) -> Result<Option<R>>
	where
		R: Record,
	{
		match self.store.get(R::COLLECTION, key.trim()).await? {
			Some(document) => decode::<R>(document).map(Some),
			None => Ok(None),
		}
	}

	pub async fn insert<R>(&self, record: &R) -> Result<()>
	where
		R: Record,
	{
		self.store.insert(R::COLLECTION, encode(record)?).await
	}

	pub async fn replace<R>(&self, record: &R) -> Result<()>
	where
		R: Record,
	{
		self.store.replace(R::COLLECTION, encode(record)?).await
	}

	pub async fn count<R>(&self) -> Result<u64>
	where
		R: Record,
	{
		self.store.count(R::COLLECTION).await
	}

	pub async fn next_sequence(&self, name: &str, start: i64) -> Result<i64> {
		if start <= 0 {
			return Err(Error::InvalidArgument(format!(
				"Sequence {name:?} must start above zero."
			)));
		}

		self.store.next_sequence(name, start).await
	}
}

fn decode<R>(document: Document) -> Result<R>
where
	R: Record,
{
	serde_json::from_value(document.body).map_err(|err| Error::Decode {
		collection: R::COLLECTION.as_str(),
		key: document.key,
		message: err.to_string(),
	})
}

fn encode<R>(record: &R) -> Result<Document>
where
	R: Record,
{
	let body = serde_json::to_value(record).map_err(|err| Error::Encode {
		collection: R::COLLECTION.as_str(),
		message: err.to_string(),
	})?;

	Ok(Document { key: record.key(), body })
}
