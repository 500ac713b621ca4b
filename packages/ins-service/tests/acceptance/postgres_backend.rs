use std::sync::Arc;

use serde_json::{Value, json};

use ins_service::InsuranceService;
use ins_storage::{
	documents::PgDocumentStore,
	models::RecordId,
	ranking::PgRankingStore,
	store::{Collection, Document, DocumentStore},
};

use super::{policy_request, score_of};

async fn insert(documents: &PgDocumentStore, collection: Collection, key: &str, body: Value) {
	documents
		.insert(collection, Document { key: key.to_string(), body })
		.await
		.expect("Failed to insert seed document.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set INS_PG_DSN to run."]
async fn issuance_and_ranking_run_against_postgres() {
	let Some(test_db) = ins_testkit::from_env("issuance_and_ranking_run_against_postgres")
		.await
		.expect("Failed to create test database.")
	else {
		return;
	};
	let db = test_db.connect().await.expect("Failed to bootstrap database.");
	let documents = Arc::new(PgDocumentStore::new(&db));

	insert(
		&documents,
		Collection::Agents,
		"1",
		json!({
			"id_agente": "1",
			"nombre": "Laura",
			"apellido": "Paz",
			"matricula": "MAT-001",
			"activo": "True"
		}),
	)
	.await;
	insert(
		&documents,
		Collection::Clients,
		"1",
		json!({
			"id_cliente": 1,
			"nombre": "Ana",
			"apellido": "Gomez",
			"dni": "30000001",
			"email": "ana@example.com",
			"telefono": "341-555-0101",
			"direccion": "San Martin 100",
			"ciudad": "Rosario",
			"activo": true
		}),
	)
	.await;
	insert(
		&documents,
		Collection::Policies,
		"POL-001001",
		json!({
			"nro_poliza": "POL-001001",
			"id_cliente": 1,
			"id_agente": 1,
			"tipo": "Auto",
			"fecha_inicio": "2024-03-01",
			"fecha_fin": "2026-12-31",
			"prima_mensual": "120.50",
			"cobertura_total": 250.0,
			"estado": "Vigente"
		}),
	)
	.await;

	let service =
		InsuranceService::new(test_db.config(), documents, Arc::new(PgRankingStore::new(&db)));
	let first =
		service.issue_policy(policy_request(1, 1, 1_500.0)).await.expect("Failed to issue policy.");
	let second =
		service.issue_policy(policy_request(1, 1, 500.0)).await.expect("Failed to issue policy.");

	assert_eq!(first.policy_number, "POL-001002");
	assert_eq!(second.policy_number, "POL-001003");

	let top = service.get_top(5).await.expect("Failed to rank.");

	assert!(!top.from_cache);
	assert_eq!(score_of(&top, 1), Some(2_250.0));

	let cached = service.get_top(5).await.expect("Failed to rank.");

	assert!(cached.from_cache);
	assert_eq!(cached.clients, top.clients);

	let active = service.active_policies_by_start_date().await.expect("View failed.");

	assert_eq!(active.len(), 3);
	assert!(active.iter().all(|row| row.client_id == RecordId::from(1)));

	db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
