//! Throwaway Postgres databases carrying the insurance schema.
//!
//! Each database is named `ins_test_<uuid>` and is dropped `WITH (FORCE)` by `cleanup`, or from a
//! helper thread when the handle goes out of scope first.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

use ins_config::{Config, Policies, Postgres, Ranking, Service, Storage};
use ins_storage::db::Db;

pub const DSN_VAR: &str = "INS_PG_DSN";

pub fn env_dsn() -> Option<String> {
	env::var(DSN_VAR).ok().filter(|dsn| !dsn.trim().is_empty())
}

/// Default ranking and numbering settings against `dsn`.
pub fn test_config(dsn: impl Into<String>) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage { postgres: Postgres { dsn: dsn.into(), pool_max_conns: 2 } },
		ranking: Ranking::default(),
		policies: Policies::default(),
	}
}

/// Creates a database for `test` when `INS_PG_DSN` is set. Otherwise logs the skip and returns
/// `None`.
pub async fn from_env(test: &str) -> Result<Option<TestDatabase>> {
	let Some(base_dsn) = env_dsn() else {
		eprintln!("Skipping {test}; set {DSN_VAR} to run this test.");

		return Ok(None);
	};

	TestDatabase::create(&base_dsn).await.map(Some)
}

pub struct TestDatabase {
	name: String,
	dsn: String,
	admin: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn create(base_dsn: &str) -> Result<Self> {
		let base =
			PgConnectOptions::from_str(base_dsn).map_err(|err| Error::InvalidDsn(err.to_string()))?;
		let admin = base.clone().database("postgres");
		let name = format!("ins_test_{}", Uuid::new_v4().simple());
		let mut conn = PgConnection::connect_with(&admin).await?;

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await?;
		conn.close().await?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, admin, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub fn config(&self) -> Config {
		test_config(self.dsn.clone())
	}

	/// A pool on this database with the schema applied.
	pub async fn connect(&self) -> Result<Db> {
		let db = Db::connect(&self.config().storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(db)
	}

	pub async fn cleanup(mut self) -> Result<()> {
		self.dropped = true;

		drop_database(&self.admin, &self.name).await
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let admin = self.admin.clone();
		let name = self.name.clone();
		// A runtime cannot block on a future from inside itself.
		let dropper = thread::spawn(move || {
			let result = Builder::new_current_thread()
				.enable_all()
				.build()
				.map_err(Error::from)
				.and_then(|runtime| runtime.block_on(drop_database(&admin, &name)));

			if let Err(err) = result {
				eprintln!("Failed to drop test database {name}: {err}");
			}
		});
		let _ = dropper.join();
	}
}

async fn drop_database(admin: &PgConnectOptions, name: &str) -> Result<()> {
	let mut conn = PgConnection::connect_with(admin).await?;

	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#).as_str()).await?;
	conn.close().await?;

	Ok(())
}
