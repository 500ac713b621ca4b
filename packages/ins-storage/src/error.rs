#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Not found: {0}")]
	NotFound(String),
	#[error("Conflict: {0}")]
	Conflict(String),
	#[error("Unavailable: {0}")]
	Unavailable(String),
	#[error("Failed to decode {collection} record {key:?}: {message}")]
	Decode { collection: &'static str, key: String, message: String },
	#[error("Failed to encode {collection} record: {message}")]
	Encode { collection: &'static str, message: String },
}
