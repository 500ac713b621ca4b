use std::{future::Future, pin::Pin};

use serde_json::Value;

use crate::Result;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
	Agents,
	Clients,
	Vehicles,
	Policies,
	Claims,
}
impl Collection {
	pub const ALL: [Self; 5] =
		[Self::Agents, Self::Clients, Self::Vehicles, Self::Policies, Self::Claims];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Agents => "agents",
			Self::Clients => "clients",
			Self::Vehicles => "vehicles",
			Self::Policies => "policies",
			Self::Claims => "claims",
		}
	}
}

/// A raw, schema-less document and the key it is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
	pub key: String,
	pub body: Value,
}

/// A set of keyed document collections.
///
/// Every method is a single atomic operation. `find_all` returns documents in insertion order.
pub trait DocumentStore
where
	Self: Send + Sync,
{
	fn find_all<'a>(&'a self, collection: Collection) -> BoxFuture<'a, Result<Vec<Document>>>;

	fn get<'a>(
		&'a self,
		collection: Collection,
		key: &'a str,
	) -> BoxFuture<'a, Result<Option<Document>>>;

	/// Fails with `Error::Conflict` when the key is taken.
	fn insert<'a>(
		&'a self,
		collection: Collection,
		document: Document,
	) -> BoxFuture<'a, Result<()>>;

	/// Fails with `Error::NotFound` when the key is absent.
	fn replace<'a>(
		&'a self,
		collection: Collection,
		document: Document,
	) -> BoxFuture<'a, Result<()>>;

	fn count<'a>(&'a self, collection: Collection) -> BoxFuture<'a, Result<u64>>;

	/// Returns `start` on first use of `name`, then increments by one per call. A later `start`
	/// above the next value moves the sequence up to it.
	fn next_sequence<'a>(&'a self, name: &'a str, start: i64) -> BoxFuture<'a, Result<i64>>;
}
