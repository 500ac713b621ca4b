use serde::{Deserialize, Serialize};

use ins_storage::models::{Client, Policy, Vehicle};

use crate::{InsuranceService, PersonName, Result, pipeline};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuredVehicle {
	pub plate: String,
	pub client: PersonName,
	pub policy_number: String,
}

impl InsuranceService {
	/// One row per insured vehicle and policy held by the vehicle's owner. Vehicles whose owner is
	/// unknown or holds no policy produce no rows.
	pub async fn insured_vehicles_with_owner_and_policy(&self) -> Result<Vec<InsuredVehicle>> {
		let vehicles = self.records.find::<Vehicle, _>(|vehicle| vehicle.insured).await?;
		let clients = self.records.all::<Client>().await?;
		let policies = self.records.all::<Policy>().await?;
		let owned = pipeline::inner_join(
			&vehicles,
			&clients,
			|vehicle| vehicle.client_id.clone(),
			|client| client.id.clone(),
		);

		Ok(pipeline::inner_join(
			&owned,
			&policies,
			|(vehicle, _)| vehicle.client_id.clone(),
			|policy| policy.client_id.clone(),
		)
		.into_iter()
		.map(|((vehicle, client), policy)| InsuredVehicle {
			plate: vehicle.plate.clone(),
			client: PersonName { name: client.name.clone(), surname: client.surname.clone() },
			policy_number: policy.policy_number.clone(),
		})
		.collect())
	}
}
