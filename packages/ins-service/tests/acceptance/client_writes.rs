use serde_json::json;

use ins_service::{CreateClientRequest, Error, INVALID_REQUEST, UpdateClientRequest};
use ins_storage::{
	models::RecordId,
	store::{Collection, DocumentStore},
};

use super::{Fixture, policy_request, reject_code};

fn new_client(national_id: &str) -> CreateClientRequest {
	CreateClientRequest {
		name: Some(" Julia ".to_string()),
		surname: Some("Campos".to_string()),
		national_id: Some(national_id.to_string()),
		email: Some("julia@example.com".to_string()),
		phone: Some("+54 341 555-0199".to_string()),
		address: Some("Cordoba 1200".to_string()),
		city: Some("Rosario".to_string()),
		province: None,
		active: None,
	}
}

#[tokio::test]
async fn created_clients_get_ids_after_the_seeded_ones() {
	let fixture = Fixture::with_portfolio();
	let first = fixture.service.create_client(new_client("28111222")).await.expect("Create failed.");
	let second =
		fixture.service.create_client(new_client("28111223")).await.expect("Create failed.");

	assert_eq!(first.id, RecordId::from(5));
	assert_eq!(second.id, RecordId::from(6));
	assert_eq!(first.name, "Julia");
	assert!(first.active);
	assert_eq!(fixture.service.get_client("5").await.expect("Lookup failed."), first);
}

#[tokio::test]
async fn duplicate_national_id_conflicts() {
	let fixture = Fixture::with_portfolio();
	let result = fixture.service.create_client(new_client("30000002")).await;

	assert!(matches!(result, Err(Error::Conflict { .. })));
}

#[tokio::test]
async fn client_formats_are_checked() {
	let fixture = Fixture::new();
	let bad_email = CreateClientRequest {
		email: Some("julia.example.com".to_string()),
		..new_client("28111222")
	};
	let bad_id = CreateClientRequest { national_id: Some("28-111".to_string()), ..new_client("") };
	let missing = CreateClientRequest { city: None, ..new_client("28111222") };

	assert_eq!(
		reject_code(fixture.service.create_client(bad_email).await),
		"REJECT_MALFORMED_FIELD"
	);
	assert_eq!(reject_code(fixture.service.create_client(bad_id).await), "REJECT_MALFORMED_FIELD");
	assert_eq!(reject_code(fixture.service.create_client(missing).await), "REJECT_MISSING_FIELD");
}

#[tokio::test]
async fn update_rejects_fields_outside_the_whitelist() {
	let err = UpdateClientRequest::from_value(json!({ "name": "Renamed" }))
		.expect_err("Expected rejection.");

	assert!(matches!(err, Error::Validation { code: INVALID_REQUEST, field: "body", .. }));
}

#[tokio::test]
async fn update_requires_at_least_one_field() {
	let fixture = Fixture::with_portfolio();
	let req = UpdateClientRequest::from_value(json!({})).expect("Empty body must parse.");

	assert_eq!(reject_code(fixture.service.update_client("2", req).await), "REJECT_EMPTY_UPDATE");
}

#[tokio::test]
async fn update_applies_validated_fields_and_rewrites_the_document() {
	let fixture = Fixture::with_portfolio();
	let req = UpdateClientRequest::from_value(json!({
		"email": "bruno@new.example.org",
		"city": "Funes"
	}))
	.expect("Update must parse.");
	let updated = fixture.service.update_client("2", req).await.expect("Update failed.");

	assert_eq!(updated.email, "bruno@new.example.org");
	assert_eq!(updated.city, "Funes");
	assert!(updated.active);

	let stored = fixture
		.documents
		.get(Collection::Clients, "2")
		.await
		.expect("Failed to read document.")
		.expect("Document must exist.");

	assert_eq!(stored.body["email"], "bruno@new.example.org");
	assert_eq!(stored.body["active"], true);

	let bad_phone = UpdateClientRequest { phone: Some("12".to_string()), ..Default::default() };

	assert_eq!(
		reject_code(fixture.service.update_client("2", bad_phone).await),
		"REJECT_MALFORMED_FIELD"
	);
}

#[tokio::test]
async fn update_of_unknown_client_is_not_found() {
	let fixture = Fixture::with_portfolio();
	let req = UpdateClientRequest { city: Some("Funes".to_string()), ..Default::default() };

	assert!(matches!(
		fixture.service.update_client("404", req).await,
		Err(Error::NotFound { .. })
	));
}

#[tokio::test]
async fn deactivation_is_soft_and_idempotent() {
	let fixture = Fixture::with_portfolio();
	let client = fixture.service.deactivate_client("2").await.expect("Deactivate failed.");

	assert!(!client.active);
	assert!(!fixture.service.deactivate_client("2").await.expect("Deactivate failed.").active);
	assert_eq!(
		reject_code(fixture.service.issue_policy(policy_request(2, 1, 100.0)).await),
		"REJECT_INACTIVE_CLIENT"
	);

	let still_active = fixture
		.service
		.active_policies_by_start_date()
		.await
		.expect("View failed.")
		.into_iter()
		.filter(|row| row.client_id == RecordId::from(2))
		.count();

	assert_eq!(still_active, 2);
	assert!(
		fixture
			.service
			.active_clients_with_current_policies()
			.await
			.expect("View failed.")
			.is_empty()
	);
}
