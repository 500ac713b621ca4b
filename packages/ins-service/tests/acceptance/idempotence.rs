use serde_json::Value;

use ins_service::{InsuranceService, RecentClaimsRequest};

use super::Fixture;

async fn run_every_view(service: &InsuranceService) -> Vec<Value> {
	fn encode<T>(rows: T) -> Value
	where
		T: serde::Serialize,
	{
		serde_json::to_value(rows).expect("Failed to encode view.")
	}

	let recent = RecentClaimsRequest {
		claim_type: "Choque".to_string(),
		as_of: Some(time::macros::date!(2025 - 06 - 01)),
	};

	vec![
		encode(service.active_agents_with_policy_counts().await.expect("View failed.")),
		encode(service.agents_with_claim_counts().await.expect("View failed.")),
		encode(service.active_clients_with_current_policies().await.expect("View failed.")),
		encode(service.clients_without_active_policies().await.expect("View failed.")),
		encode(service.clients_with_multiple_insured_vehicles().await.expect("View failed.")),
		encode(service.expired_policies_with_client().await.expect("View failed.")),
		encode(service.active_policies_by_start_date().await.expect("View failed.")),
		encode(service.suspended_policies_with_client().await.expect("View failed.")),
		encode(service.open_claims_with_client().await.expect("View failed.")),
		encode(service.recent_claims_of_type(recent).await.expect("View failed.")),
		encode(service.insured_vehicles_with_owner_and_policy().await.expect("View failed.")),
		encode(service.get_top(10).await.expect("Ranking failed.").clients),
	]
}

#[tokio::test]
async fn views_are_stable_on_an_unchanged_store() {
	let fixture = Fixture::with_portfolio();
	let first = run_every_view(&fixture.service).await;
	let second = run_every_view(&fixture.service).await;

	assert_eq!(first, second);
	assert!(first.iter().all(|view| view.as_array().is_some_and(|rows| !rows.is_empty())));
}
