use ins_domain::validate::Rejection;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	Validation { code: &'static str, field: &'static str, message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("No data: {message}")]
	EmptyResult { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
		Self::Validation { code: INVALID_REQUEST, field, message: message.into() }
	}
}
impl From<Rejection> for Error {
	fn from(rejection: Rejection) -> Self {
		Self::Validation {
			code: rejection.code.as_str(),
			field: rejection.field,
			message: rejection.to_string(),
		}
	}
}
impl From<ins_storage::Error> for Error {
	fn from(err: ins_storage::Error) -> Self {
		match err {
			ins_storage::Error::NotFound(message) => Self::NotFound { message },
			ins_storage::Error::Conflict(message) => Self::Conflict { message },
			ins_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			other => Self::Storage { message: other.to_string() },
		}
	}
}
