use serde_json::json;

use ins_service::{CreateClaimRequest, IssuePolicyRequest};
use ins_storage::{
	models::{Claim, RecordId},
	ranking::{RankingStore, ScoredMember},
};

use super::{Fixture, RANKING_KEY, policy_request, reject_code};

#[tokio::test]
async fn client_moves_between_views_after_first_active_policy() {
	let fixture = Fixture::with_portfolio();
	let without = fixture.service.clients_without_active_policies().await.expect("View failed.");

	assert!(without.iter().any(|row| row.id == RecordId::from(1)));

	let policy = fixture
		.service
		.issue_policy(policy_request(1, 1, 2_000.0))
		.await
		.expect("Failed to issue policy.");

	assert_eq!(policy.policy_number, "POL-001001");

	let without = fixture.service.clients_without_active_policies().await.expect("View failed.");

	assert!(!without.iter().any(|row| row.id == RecordId::from(1)));

	let current =
		fixture.service.active_clients_with_current_policies().await.expect("View failed.");
	let ana = current
		.iter()
		.find(|row| row.id == RecordId::from(1))
		.expect("Client 1 must hold a current policy.");

	assert_eq!(ana.policy_numbers, vec!["POL-001001"]);
}

#[tokio::test]
async fn issuance_skips_seeded_policy_numbers() {
	let fixture = Fixture::new();

	fixture.seed_agent(1, "Laura", "Paz", json!(true));
	fixture.seed_client(5, "Eva", "Mora", json!(true));
	fixture.seed_policy("POL-001001", json!(5), json!(1), "Activa", "2024-03-01", 700.0);
	fixture.seed_policy("OLD-009999", json!(5), json!(1), "Vencida", "2020-03-01", 100.0);

	let issued = fixture
		.service
		.issue_policy(policy_request(5, 1, 1_000.0))
		.await
		.expect("Failed to issue policy.");
	let next = fixture
		.service
		.issue_policy(policy_request(5, 1, 500.0))
		.await
		.expect("Failed to issue policy.");

	assert_eq!(issued.policy_number, "POL-001002");
	assert_eq!(next.policy_number, "POL-001003");
}

#[tokio::test]
async fn two_issuances_accumulate_in_the_ranking() {
	let fixture = Fixture::new();

	fixture.seed_agent(1, "Laura", "Paz", json!(true));
	fixture.seed_client(5, "Eva", "Mora", json!(true));

	let first = fixture
		.service
		.issue_policy(policy_request(5, 1, 1_000.0))
		.await
		.expect("Failed to issue policy.");
	let second = fixture
		.service
		.issue_policy(policy_request(5, 1, 500.0))
		.await
		.expect("Failed to issue policy.");

	assert_eq!(first.policy_number, "POL-001001");
	assert_eq!(second.policy_number, "POL-001002");
	assert_eq!(
		fixture.ranking.range_with_scores(RANKING_KEY).await.expect("Failed to range."),
		vec![ScoredMember { member: "5".to_string(), score: 1_500.0 }]
	);

	let top = fixture.service.get_top(1).await.expect("Failed to rank.");

	assert_eq!(top.clients.len(), 1);
	assert_eq!(top.clients[0].client_id, RecordId::from(5));
	assert_eq!(top.clients[0].total_coverage, 1_500.0);
	assert_eq!(top.clients[0].name, "Eva");
}

#[tokio::test]
async fn claim_against_expired_policy_is_rejected() {
	let fixture = Fixture::with_portfolio();
	let before = fixture.service.records.count::<Claim>().await.expect("Failed to count.");
	let result = fixture
		.service
		.create_claim(CreateClaimRequest {
			policy_number: Some("POL-000003".to_string()),
			date: Some("2025-04-01".to_string()),
			claim_type: Some("Choque".to_string()),
			estimated_amount: Some(1_000.0),
			description: Some("Side impact.".to_string()),
			state: None,
		})
		.await;

	assert_eq!(reject_code(result), "REJECT_POLICY_NOT_ACTIVE");
	assert_eq!(fixture.service.records.count::<Claim>().await.expect("Failed to count."), before);
}

#[tokio::test]
async fn inverted_dates_fail_after_referential_checks() {
	let fixture = Fixture::with_portfolio();
	let inverted = |client_id| IssuePolicyRequest {
		start_date: Some("2026-01-01".to_string()),
		end_date: Some("2025-01-01".to_string()),
		..policy_request(client_id, 1, 100.0)
	};

	assert_eq!(
		reject_code(fixture.service.issue_policy(inverted(2)).await),
		"REJECT_INVALID_DATE_RANGE"
	);
	assert_eq!(
		reject_code(fixture.service.issue_policy(inverted(404)).await),
		"REJECT_UNKNOWN_CLIENT"
	);
}
