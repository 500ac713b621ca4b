mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Policies, Postgres, Ranking, Service, Storage};

use std::{fs, path::Path};

/// Upper bound for `ranking.ttl_seconds`, thirty days.
pub const MAX_RANKING_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Unreadable { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::Malformed { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::invalid("service.http_bind", "must be non-empty."));
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::invalid("storage.postgres.dsn", "must be non-empty."));
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::invalid("storage.postgres.pool_max_conns", "must be greater than zero."));
	}
	if cfg.ranking.cache_key.is_empty() {
		return Err(Error::invalid("ranking.cache_key", "must be non-empty."));
	}
	if !(1..=MAX_RANKING_TTL_SECONDS).contains(&cfg.ranking.ttl_seconds) {
		return Err(Error::invalid(
			"ranking.ttl_seconds",
			format!("must be in the range 1-{MAX_RANKING_TTL_SECONDS}."),
		));
	}
	if cfg.ranking.max_top_n == 0 {
		return Err(Error::invalid("ranking.max_top_n", "must be greater than zero."));
	}
	if cfg.ranking.default_top_n == 0 || cfg.ranking.default_top_n > cfg.ranking.max_top_n {
		return Err(Error::invalid(
			"ranking.default_top_n",
			"must be in the range 1-ranking.max_top_n.",
		));
	}
	if cfg.policies.number_prefix.is_empty() {
		return Err(Error::invalid("policies.number_prefix", "must be non-empty."));
	}
	if !(1..=18).contains(&cfg.policies.number_width) {
		return Err(Error::invalid("policies.number_width", "must be in the range 1-18."));
	}
	if cfg.policies.first_sequence <= 0 {
		return Err(Error::invalid("policies.first_sequence", "must be greater than zero."));
	}

	let max_sequence = 10_i64.pow(cfg.policies.number_width) - 1;

	if cfg.policies.first_sequence > max_sequence {
		return Err(Error::invalid(
			"policies.first_sequence",
			"must fit in policies.number_width digits.",
		));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.http_bind = cfg.service.http_bind.trim().to_string();
	cfg.ranking.cache_key = cfg.ranking.cache_key.trim().to_string();
	cfg.policies.number_prefix = cfg.policies.number_prefix.trim().to_string();

	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
