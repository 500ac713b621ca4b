//! `YYYY-MM-DD` dates on the wire.

pub mod option;

use serde::{Deserialize, Deserializer, Serializer};
use time::{Date, macros::format_description};

pub fn serialize<S>(value: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let formatted = value
		.format(format_description!("[year]-[month]-[day]"))
		.map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;

	ins_domain::dates::parse_iso_date(&raw)
		.ok_or_else(|| serde::de::Error::custom(format!("expected a YYYY-MM-DD date, got {raw:?}")))
}
