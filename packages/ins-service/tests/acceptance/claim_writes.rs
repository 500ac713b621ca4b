use time::{Duration, OffsetDateTime, macros::format_description};

use ins_domain::ClaimState;
use ins_service::CreateClaimRequest;
use ins_storage::models::RecordId;

use super::{Fixture, reject_code};

fn claim_on(policy_number: &str, date: &str) -> CreateClaimRequest {
	CreateClaimRequest {
		policy_number: Some(policy_number.to_string()),
		date: Some(date.to_string()),
		claim_type: Some("Granizo".to_string()),
		estimated_amount: Some(3_400.0),
		description: Some("Hail damage on the roof.".to_string()),
		state: None,
	}
}

#[tokio::test]
async fn claim_on_active_policy_is_stored_open() {
	let fixture = Fixture::with_portfolio();
	let claim = fixture
		.service
		.create_claim(claim_on("POL-000002", "2025-04-02"))
		.await
		.expect("Failed to create claim.");

	assert_eq!(claim.id, RecordId::from(5));
	assert_eq!(claim.state, ClaimState::Open);

	let open = fixture.service.open_claims_with_client().await.expect("View failed.");

	assert_eq!(open.len(), 2);
	assert_eq!(open[1].claim_type, "Granizo");
	assert_eq!(open[1].client.name, "Bruno");
}

#[tokio::test]
async fn claim_state_accepts_synonyms_and_rejects_unknown_values() {
	let fixture = Fixture::with_portfolio();
	let review = CreateClaimRequest {
		state: Some("en revision".to_string()),
		..claim_on("POL-000001", "2025-04-02")
	};
	let unknown =
		CreateClaimRequest { state: Some("lost".to_string()), ..claim_on("POL-000001", "2025-04-02") };

	assert_eq!(
		fixture.service.create_claim(review).await.expect("Failed to create claim.").state,
		ClaimState::UnderReview
	);
	assert_eq!(reject_code(fixture.service.create_claim(unknown).await), "REJECT_INVALID_STATE");
}

#[tokio::test]
async fn claim_checks_policy_then_amount_then_date() {
	let fixture = Fixture::with_portfolio();
	let next_month = (OffsetDateTime::now_utc().date() + Duration::days(30))
		.format(format_description!("[year]-[month]-[day]"))
		.expect("Failed to format date.");
	let future = claim_on("POL-000001", &next_month);
	let unknown = claim_on("POL-404404", "2025-04-02");
	let free =
		CreateClaimRequest { estimated_amount: Some(0.0), ..claim_on("POL-000001", "2025-04-02") };
	let suspended = claim_on("POL-000004", "2025-04-02");

	assert_eq!(reject_code(fixture.service.create_claim(future).await), "REJECT_FUTURE_DATE");
	assert_eq!(reject_code(fixture.service.create_claim(unknown).await), "REJECT_UNKNOWN_POLICY");
	assert_eq!(
		reject_code(fixture.service.create_claim(free).await),
		"REJECT_NON_POSITIVE_AMOUNT"
	);
	assert_eq!(
		reject_code(fixture.service.create_claim(suspended).await),
		"REJECT_POLICY_NOT_ACTIVE"
	);
}
