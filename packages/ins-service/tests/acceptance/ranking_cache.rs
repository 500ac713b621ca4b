use serde_json::json;

use ins_service::{Error, INVALID_REQUEST};
use ins_storage::{
	models::RecordId,
	ranking::{KeyTtl, RankingStore},
};

use super::{Fixture, RANKING_KEY, policy_request, reject_code, score_of};

#[tokio::test]
async fn miss_recomputes_then_hit_serves_the_snapshot() {
	let fixture = Fixture::with_portfolio();
	let first = fixture.service.get_top(10).await.expect("Failed to rank.");

	assert!(!first.from_cache);

	let ids = first.clients.iter().map(|entry| entry.client_id.to_string()).collect::<Vec<_>>();

	assert_eq!(ids, vec!["2", "4", "3", "99"]);
	assert_eq!(score_of(&first, 2), Some(1_500.0));
	assert_eq!(first.clients[0].name, "Bruno");
	assert_eq!(first.clients[3].name, "");
	assert!(matches!(
		fixture.ranking.ttl(RANKING_KEY).await.expect("Failed to read ttl."),
		KeyTtl::ExpiresIn(_)
	));

	let second = fixture.service.get_top(2).await.expect("Failed to rank.");

	assert!(second.from_cache);
	assert_eq!(second.clients.len(), 2);
	assert_eq!(second.clients, first.clients[..2].to_vec());
}

#[tokio::test]
async fn ranking_follows_increments_and_agrees_with_recompute() {
	let fixture = Fixture::with_portfolio();

	fixture.service.get_top(10).await.expect("Failed to rank.");

	for coverage in [100.0, 250.5, 1_000.25] {
		fixture
			.service
			.issue_policy(policy_request(2, 1, coverage))
			.await
			.expect("Failed to issue policy.");
	}

	let cached = fixture.service.get_top(10).await.expect("Failed to rank.");

	assert!(cached.from_cache);
	assert!((score_of(&cached, 2).expect("Client 2 must rank.") - 2_850.75).abs() < 1e-6);
	assert!(fixture.service.invalidate_ranking().await.expect("Failed to invalidate."));

	let fresh = fixture.service.get_top(10).await.expect("Failed to rank.");

	assert!(!fresh.from_cache);
	assert_eq!(fresh.clients.len(), cached.clients.len());

	for (cached, fresh) in cached.clients.iter().zip(&fresh.clients) {
		assert_eq!(cached.client_id, fresh.client_id);
		assert!((cached.total_coverage - fresh.total_coverage).abs() < 1e-6);
	}
}

#[tokio::test]
async fn increments_without_a_snapshot_are_not_served() {
	let fixture = Fixture::with_portfolio();

	fixture.service.issue_policy(policy_request(4, 2, 10_000.0)).await.expect("Failed to issue.");

	assert_eq!(
		fixture.ranking.ttl(RANKING_KEY).await.expect("Failed to read ttl."),
		KeyTtl::Persistent
	);

	let top = fixture.service.get_top(10).await.expect("Failed to rank.");

	assert!(!top.from_cache);
	assert_eq!(top.clients.len(), 4);
	assert_eq!(score_of(&top, 4), Some(10_800.0));
	assert!(fixture.service.get_top(10).await.expect("Failed to rank.").from_cache);
}

#[tokio::test]
async fn expired_snapshot_is_recomputed() {
	let fixture = Fixture::with_portfolio();

	fixture.service.get_top(5).await.expect("Failed to rank.");
	fixture.ranking.expire_now(RANKING_KEY);

	let top = fixture.service.get_top(5).await.expect("Failed to rank.");

	assert!(!top.from_cache);
	assert_eq!(score_of(&top, 2), Some(1_500.0));
}

#[tokio::test]
async fn failed_increment_keeps_the_policy_and_drops_the_snapshot() {
	let fixture = Fixture::with_portfolio();

	fixture.service.get_top(10).await.expect("Failed to rank.");
	fixture.ranking.fail_increments(true);

	let policy = fixture
		.service
		.issue_policy(policy_request(1, 1, 4_000.0))
		.await
		.expect("Issuance must survive a ranking failure.");

	assert_eq!(
		fixture.ranking.ttl(RANKING_KEY).await.expect("Failed to read ttl."),
		KeyTtl::Missing
	);

	fixture.ranking.fail_increments(false);

	let top = fixture.service.get_top(1).await.expect("Failed to rank.");

	assert!(!top.from_cache);
	assert_eq!(top.clients[0].client_id, policy.client_id);
	assert_eq!(top.clients[0].total_coverage, 4_000.0);
}

#[tokio::test]
async fn ties_break_on_ascending_client_id() {
	let fixture = Fixture::new();

	fixture.seed_policy("POL-000001", json!(10), json!(1), "Activa", "2024-01-01", 100.0);
	fixture.seed_policy("POL-000002", json!("b"), json!(1), "Activa", "2024-01-01", 100.0);
	fixture.seed_policy("POL-000003", json!(9), json!(1), "Activa", "2024-01-01", 100.0);
	fixture.seed_policy("POL-000004", json!("a"), json!(1), "Activa", "2024-01-01", 100.0);

	let top = fixture.service.get_top(4).await.expect("Failed to rank.");
	let ids = top.clients.iter().map(|entry| entry.client_id.clone()).collect::<Vec<_>>();

	assert_eq!(
		ids,
		vec![RecordId::from(9), RecordId::from(10), RecordId::from("a"), RecordId::from("b")]
	);

	let cached = fixture.service.get_top(4).await.expect("Failed to rank.");

	assert!(cached.from_cache);
	assert_eq!(cached.clients, top.clients);
}

#[tokio::test]
async fn empty_store_is_distinct_from_an_empty_list() {
	let fixture = Fixture::new();

	assert!(matches!(fixture.service.get_top(1).await, Err(Error::EmptyResult { .. })));
}

#[tokio::test]
async fn n_must_be_within_bounds() {
	let fixture = Fixture::with_portfolio();

	assert_eq!(reject_code(fixture.service.get_top(0).await), INVALID_REQUEST);
	assert_eq!(reject_code(fixture.service.get_top(101).await), INVALID_REQUEST);
	assert!(fixture.service.get_top(100).await.is_ok());
}
