pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("INS_PG_DSN is not a valid Postgres DSN: {0}.")]
	InvalidDsn(String),

	#[error("Test database runtime failed: {0}.")]
	Runtime(#[from] std::io::Error),

	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),

	#[error(transparent)]
	Storage(#[from] ins_storage::Error),
}
