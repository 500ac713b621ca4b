use std::{cmp::Ordering, fmt};

use serde::{
	Deserialize, Deserializer, Serialize, Serializer,
	de::{self, DeserializeOwned, Visitor},
};
use time::Date;

use crate::{decode, store::Collection};
use ins_domain::{ClaimState, PolicyState};

/// A record identifier normalized from either a JSON number or a JSON string.
///
/// Equality is the coerced comparison used by every cross-collection join: `5`, `5.0`, `"5"` and
/// `" 5 "` are the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);
impl RecordId {
	pub fn new(raw: impl AsRef<str>) -> Self {
		Self(raw.as_ref().trim().to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn as_number(&self) -> Option<i64> {
		self.0.parse().ok()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl From<i64> for RecordId {
	fn from(value: i64) -> Self {
		Self(value.to_string())
	}
}
impl From<&str> for RecordId {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl fmt::Display for RecordId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
// Numeric ids order numerically and sort ahead of non-numeric ids.
impl Ord for RecordId {
	fn cmp(&self, other: &Self) -> Ordering {
		match (self.as_number(), other.as_number()) {
			(Some(left), Some(right)) => left.cmp(&right),
			(Some(_), None) => Ordering::Less,
			(None, Some(_)) => Ordering::Greater,
			(None, None) => self.0.cmp(&other.0),
		}
	}
}
impl PartialOrd for RecordId {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
impl Serialize for RecordId {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.0)
	}
}
impl<'de> Deserialize<'de> for RecordId {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_any(RecordIdVisitor)
	}
}

struct RecordIdVisitor;
impl Visitor<'_> for RecordIdVisitor {
	type Value = RecordId;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("an id as a number or a string")
	}

	fn visit_u64<E>(self, value: u64) -> Result<RecordId, E> {
		Ok(RecordId(value.to_string()))
	}

	fn visit_i64<E>(self, value: i64) -> Result<RecordId, E> {
		Ok(RecordId(value.to_string()))
	}

	fn visit_f64<E>(self, value: f64) -> Result<RecordId, E>
	where
		E: de::Error,
	{
		if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
			Ok(RecordId((value as i64).to_string()))
		} else {
			Err(E::invalid_value(de::Unexpected::Float(value), &self))
		}
	}

	fn visit_str<E>(self, value: &str) -> Result<RecordId, E>
	where
		E: de::Error,
	{
		let id = RecordId::new(value);

		if id.is_empty() {
			return Err(E::invalid_value(de::Unexpected::Str(value), &self));
		}

		Ok(id)
	}
}

/// A typed document in one collection.
pub trait Record
where
	Self: Serialize + DeserializeOwned + Send + Sync,
{
	const COLLECTION: Collection;

	/// The unique key the document is stored under.
	fn key(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
	#[serde(alias = "id_agente")]
	pub id: RecordId,
	#[serde(alias = "nombre")]
	pub name: String,
	#[serde(alias = "apellido")]
	pub surname: String,
	#[serde(alias = "matricula", default)]
	pub license: String,
	#[serde(alias = "activo", default, with = "decode::flag")]
	pub active: bool,
}
impl Record for Agent {
	const COLLECTION: Collection = Collection::Agents;

	fn key(&self) -> String {
		self.id.to_string()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
	#[serde(alias = "id_cliente")]
	pub id: RecordId,
	#[serde(alias = "nombre")]
	pub name: String,
	#[serde(alias = "apellido")]
	pub surname: String,
	#[serde(alias = "dni", default)]
	pub national_id: String,
	#[serde(default)]
	pub email: String,
	#[serde(alias = "telefono", default)]
	pub phone: String,
	#[serde(alias = "direccion", default)]
	pub address: String,
	#[serde(alias = "ciudad", default)]
	pub city: String,
	#[serde(alias = "provincia", default)]
	pub province: Option<String>,
	#[serde(alias = "activo", default, with = "decode::flag")]
	pub active: bool,
}
impl Record for Client {
	const COLLECTION: Collection = Collection::Clients;

	fn key(&self) -> String {
		self.id.to_string()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
	#[serde(alias = "id_vehiculo")]
	pub id: RecordId,
	#[serde(alias = "patente")]
	pub plate: String,
	#[serde(alias = "id_cliente")]
	pub client_id: RecordId,
	#[serde(alias = "marca", default)]
	pub brand: Option<String>,
	#[serde(alias = "modelo", default)]
	pub model: Option<String>,
	#[serde(alias = "anio", default, with = "decode::year")]
	pub year: Option<i32>,
	#[serde(alias = "asegurado", default, with = "decode::flag")]
	pub insured: bool,
}
impl Record for Vehicle {
	const COLLECTION: Collection = Collection::Vehicles;

	fn key(&self) -> String {
		self.id.to_string()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
	#[serde(alias = "nro_poliza")]
	pub policy_number: String,
	#[serde(alias = "id_cliente")]
	pub client_id: RecordId,
	#[serde(alias = "id_agente")]
	pub agent_id: RecordId,
	#[serde(rename = "type", alias = "tipo", default)]
	pub policy_type: String,
	#[serde(alias = "fecha_inicio", with = "decode::date")]
	pub start_date: Date,
	#[serde(alias = "fecha_fin", with = "decode::date")]
	pub end_date: Date,
	#[serde(alias = "prima_mensual", with = "decode::amount")]
	pub monthly_premium: f64,
	#[serde(alias = "cobertura_total", with = "decode::amount")]
	pub total_coverage: f64,
	#[serde(alias = "estado")]
	pub state: PolicyState,
}
impl Record for Policy {
	const COLLECTION: Collection = Collection::Policies;

	fn key(&self) -> String {
		self.policy_number.trim().to_string()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
	#[serde(alias = "id_siniestro")]
	pub id: RecordId,
	#[serde(alias = "nro_poliza")]
	pub policy_number: String,
	#[serde(alias = "fecha", with = "decode::date")]
	pub date: Date,
	#[serde(rename = "type", alias = "tipo", default)]
	pub claim_type: String,
	#[serde(alias = "monto_estimado", with = "decode::amount")]
	pub estimated_amount: f64,
	#[serde(alias = "descripcion", default)]
	pub description: String,
	#[serde(alias = "estado")]
	pub state: ClaimState,
}
impl Record for Claim {
	const COLLECTION: Collection = Collection::Claims;

	fn key(&self) -> String {
		self.id.to_string()
	}
}
