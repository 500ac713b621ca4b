use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot open insurance config {path:?}: {source}.")]
	Unreadable { path: PathBuf, source: std::io::Error },
	#[error("Insurance config {path:?} is not valid TOML: {source}")]
	Malformed { path: PathBuf, source: toml::de::Error },
	/// A setting that parsed but is out of range; `field` is the dotted TOML path.
	#[error("{field} {reason}")]
	Invalid { field: &'static str, reason: String },
}

impl Error {
	pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
		Self::Invalid { field, reason: reason.into() }
	}
}
