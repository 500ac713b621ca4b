use std::sync::Arc;

use ins_service::InsuranceService;
use ins_storage::{db::Db, documents::PgDocumentStore, ranking::PgRankingStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<InsuranceService>,
}
impl AppState {
	/// Connects to Postgres, applies the schema and wires both stores into the service.
	pub async fn new(config: ins_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let documents = Arc::new(PgDocumentStore::new(&db));
		let ranking = Arc::new(PgRankingStore::new(&db));

		Ok(Self::from_service(InsuranceService::new(config, documents, ranking)))
	}

	pub fn from_service(service: InsuranceService) -> Self {
		Self { service: Arc::new(service) }
	}
}
