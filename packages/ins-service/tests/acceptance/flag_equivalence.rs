use serde_json::json;

use super::Fixture;

#[tokio::test]
async fn every_true_spelling_counts_as_active_or_insured() {
	let fixture = Fixture::new();

	fixture.seed_agent(1, "A", "One", json!(true));
	fixture.seed_agent(2, "B", "Two", json!("True"));
	fixture.seed_agent(3, "C", "Three", json!("true"));
	fixture.seed_agent(4, "D", "Four", json!(false));
	fixture.seed_agent(5, "E", "Five", json!("False"));
	fixture.seed_client(1, "Ana", "Gomez", json!("true"));
	fixture.seed_vehicle(1, "AA111AA", json!(1), json!(true));
	fixture.seed_vehicle(2, "BB222BB", json!("1"), json!("True"));
	fixture.seed_vehicle(3, "CC333CC", json!(1), json!("true"));
	fixture.seed_vehicle(4, "DD444DD", json!(1), json!("false"));

	let agents = fixture
		.service
		.active_agents_with_policy_counts()
		.await
		.expect("Failed to run view.")
		.into_iter()
		.map(|row| row.id.to_string())
		.collect::<Vec<_>>();

	assert_eq!(agents, vec!["1", "2", "3"]);

	let owners = fixture
		.service
		.clients_with_multiple_insured_vehicles()
		.await
		.expect("Failed to run view.");

	assert_eq!(owners.len(), 1);
	assert_eq!(owners[0].insured_vehicles, 3);
}

#[tokio::test]
async fn numeric_and_string_ids_join() {
	let fixture = Fixture::new();

	fixture.seed_agent(1, "A", "One", json!(true));
	fixture.seed_client(7, "Ana", "Gomez", json!(true));
	fixture.seed_policy("POL-000001", json!("7"), json!(1), "Vigente", "2024-01-01", 100.0);
	fixture.seed_policy("POL-000002", json!(7.0), json!("1"), "Activa", "2024-02-01", 100.0);

	let rows = fixture
		.service
		.active_clients_with_current_policies()
		.await
		.expect("Failed to run view.");

	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].policy_numbers, vec!["POL-000001", "POL-000002"]);
}
