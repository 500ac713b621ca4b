use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub policies: Policies,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Coverage ranking cache.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Ranking {
	/// Key of the sorted score set in the ranking store.
	pub cache_key: String,
	/// Lifetime of a recomputed snapshot.
	pub ttl_seconds: i64,
	pub default_top_n: u32,
	pub max_top_n: u32,
}
impl Default for Ranking {
	fn default() -> Self {
		Self {
			cache_key: "ranking:clients:coverage".to_string(),
			ttl_seconds: 60,
			default_top_n: 10,
			max_top_n: 100,
		}
	}
}

/// Policy number allocation. Numbers render as `<prefix><zero-padded sequence>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Policies {
	pub number_prefix: String,
	pub number_width: u32,
	pub first_sequence: i64,
}
impl Default for Policies {
	fn default() -> Self {
		Self { number_prefix: "POL-".to_string(), number_width: 6, first_sequence: 1_001 }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}
