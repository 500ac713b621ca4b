use serde::{Deserialize, Serialize};
use serde_json::Value;

use ins_domain::validate::{self, ClientFields};
use ins_storage::models::{Client, Policy, RecordId, Vehicle};

use crate::{Error, InsuranceService, Result, pipeline};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientCurrentPolicies {
	pub id: RecordId,
	pub name: String,
	pub surname: String,
	pub policy_numbers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
	pub id: RecordId,
	pub name: String,
	pub surname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientVehicleCount {
	pub id: RecordId,
	pub name: String,
	pub surname: String,
	pub insured_vehicles: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateClientRequest {
	pub name: Option<String>,
	pub surname: Option<String>,
	pub national_id: Option<String>,
	pub email: Option<String>,
	pub phone: Option<String>,
	pub address: Option<String>,
	pub city: Option<String>,
	pub province: Option<String>,
	pub active: Option<bool>,
}

/// The fields a client update may touch. Anything else in the body is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateClientRequest {
	pub email: Option<String>,
	pub phone: Option<String>,
	pub address: Option<String>,
	pub city: Option<String>,
	pub province: Option<String>,
	pub active: Option<bool>,
}
impl UpdateClientRequest {
	pub fn from_value(body: Value) -> Result<Self> {
		serde_json::from_value(body)
			.map_err(|err| Error::invalid("body", format!("Invalid client update: {err}.")))
	}
}

impl InsuranceService {
	/// Active clients holding at least one active policy, with those policy numbers.
	pub async fn active_clients_with_current_policies(&self) -> Result<Vec<ClientCurrentPolicies>> {
		let clients = self.records.find::<Client, _>(|client| client.active).await?;
		let policies =
			self.records.find::<Policy, _>(|policy| policy.state.is_active_like()).await?;
		let by_client = pipeline::group_by(&policies, |policy| policy.client_id.clone());

		Ok(clients
			.into_iter()
			.filter_map(|client| {
				let held = by_client.get(&client.id)?;

				Some(ClientCurrentPolicies {
					policy_numbers: held.iter().map(|policy| policy.policy_number.clone()).collect(),
					id: client.id,
					name: client.name,
					surname: client.surname,
				})
			})
			.collect())
	}

	/// Clients, active or not, that hold no active policy.
	pub async fn clients_without_active_policies(&self) -> Result<Vec<ClientSummary>> {
		let clients = self.records.all::<Client>().await?;
		let policies =
			self.records.find::<Policy, _>(|policy| policy.state.is_active_like()).await?;
		let by_client = pipeline::count_by(&policies, |policy| policy.client_id.clone());

		Ok(clients
			.into_iter()
			.filter(|client| !by_client.contains_key(&client.id))
			.map(|client| ClientSummary { id: client.id, name: client.name, surname: client.surname })
			.collect())
	}

	/// Clients owning more than one insured vehicle.
	pub async fn clients_with_multiple_insured_vehicles(&self) -> Result<Vec<ClientVehicleCount>> {
		let vehicles = self.records.find::<Vehicle, _>(|vehicle| vehicle.insured).await?;
		let clients = self.records.all::<Client>().await?;
		let counts = pipeline::count_by(&vehicles, |vehicle| vehicle.client_id.clone());

		Ok(clients
			.into_iter()
			.filter_map(|client| {
				let insured_vehicles = counts.get(&client.id).copied().filter(|count| *count > 1)?;

				Some(ClientVehicleCount {
					id: client.id,
					name: client.name,
					surname: client.surname,
					insured_vehicles,
				})
			})
			.collect())
	}

	pub async fn get_client(&self, id: &str) -> Result<Client> {
		self.records.get::<Client>(id).await?.ok_or_else(|| Error::NotFound {
			message: format!("Client {:?} does not exist.", id.trim()),
		})
	}

	pub async fn create_client(&self, req: CreateClientRequest) -> Result<Client> {
		let fields = ClientFields {
			name: req.name.as_deref(),
			surname: req.surname.as_deref(),
			national_id: req.national_id.as_deref(),
			email: req.email.as_deref(),
			phone: req.phone.as_deref(),
			address: req.address.as_deref(),
			city: req.city.as_deref(),
			province: req.province.as_deref(),
			active: req.active,
		};
		let valid = validate::client_fields(&fields)?;
		let clients = self.records.all::<Client>().await?;

		if clients.iter().any(|client| client.national_id.trim() == valid.national_id) {
			return Err(Error::Conflict {
				message: format!("A client with national_id {:?} already exists.", valid.national_id),
			});
		}

		let id = self.next_record_id::<Client, _>(|client| client.id.as_number()).await?;
		let client = Client {
			id: RecordId::from(id),
			name: valid.name,
			surname: valid.surname,
			national_id: valid.national_id,
			email: valid.email,
			phone: valid.phone,
			address: valid.address,
			city: valid.city,
			province: valid.province,
			active: valid.active,
		};

		self.records.insert(&client).await?;

		tracing::info!(client_id = %client.id, "Client created.");

		Ok(client)
	}

	pub async fn update_client(&self, id: &str, req: UpdateClientRequest) -> Result<Client> {
		let mut client = self.get_client(id).await?;
		let fields = ClientFields {
			name: None,
			surname: None,
			national_id: None,
			email: req.email.as_deref(),
			phone: req.phone.as_deref(),
			address: req.address.as_deref(),
			city: req.city.as_deref(),
			province: req.province.as_deref(),
			active: req.active,
		};
		let patch = validate::client_patch(&fields)?;

		if let Some(email) = patch.email {
			client.email = email;
		}
		if let Some(phone) = patch.phone {
			client.phone = phone;
		}
		if let Some(address) = patch.address {
			client.address = address;
		}
		if let Some(city) = patch.city {
			client.city = city;
		}
		if let Some(province) = patch.province {
			client.province = Some(province).filter(|value| !value.is_empty());
		}
		if let Some(active) = patch.active {
			client.active = active;
		}

		self.records.replace(&client).await?;

		tracing::info!(client_id = %client.id, "Client updated.");

		Ok(client)
	}

	/// Soft deactivation. Deactivating an inactive client is a no-op.
	pub async fn deactivate_client(&self, id: &str) -> Result<Client> {
		let mut client = self.get_client(id).await?;

		if !client.active {
			return Ok(client);
		}

		client.active = false;

		self.records.replace(&client).await?;

		tracing::info!(client_id = %client.id, "Client deactivated.");

		Ok(client)
	}
}
