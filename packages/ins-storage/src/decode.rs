//! Lenient field decoders for documents written by the CSV seeder.
//!
//! Seeded documents carry flags as `true` or `"True"`, ids as numbers or strings and amounts as
//! numeric strings. These helpers accept every representation and yield one declared type, so
//! nothing above the store ever sees the raw shapes.

use std::fmt;

use serde::{
	Deserializer, Serializer,
	de::{self, Visitor},
};

pub mod flag {
	use super::*;

	pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_bool(*value)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_any(FlagVisitor)
	}

	pub fn parse(raw: &str) -> Option<bool> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"true" | "1" => Some(true),
			"false" | "0" => Some(false),
			_ => None,
		}
	}

	struct FlagVisitor;
	impl Visitor<'_> for FlagVisitor {
		type Value = bool;

		fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			f.write_str("a boolean, \"true\"/\"false\" or 1/0")
		}

		fn visit_bool<E>(self, value: bool) -> Result<bool, E> {
			Ok(value)
		}

		fn visit_u64<E>(self, value: u64) -> Result<bool, E>
		where
			E: de::Error,
		{
			match value {
				0 => Ok(false),
				1 => Ok(true),
				_ => Err(E::invalid_value(de::Unexpected::Unsigned(value), &self)),
			}
		}

		fn visit_i64<E>(self, value: i64) -> Result<bool, E>
		where
			E: de::Error,
		{
			match value {
				0 => Ok(false),
				1 => Ok(true),
				_ => Err(E::invalid_value(de::Unexpected::Signed(value), &self)),
			}
		}

		fn visit_str<E>(self, value: &str) -> Result<bool, E>
		where
			E: de::Error,
		{
			parse(value).ok_or_else(|| E::invalid_value(de::Unexpected::Str(value), &self))
		}
	}
}

pub mod amount {
	use super::*;

	pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_f64(*value)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_any(AmountVisitor)
	}

	struct AmountVisitor;
	impl Visitor<'_> for AmountVisitor {
		type Value = f64;

		fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			f.write_str("a number or a numeric string")
		}

		fn visit_f64<E>(self, value: f64) -> Result<f64, E> {
			Ok(value)
		}

		fn visit_u64<E>(self, value: u64) -> Result<f64, E> {
			Ok(value as f64)
		}

		fn visit_i64<E>(self, value: i64) -> Result<f64, E> {
			Ok(value as f64)
		}

		fn visit_str<E>(self, value: &str) -> Result<f64, E>
		where
			E: de::Error,
		{
			value
				.trim()
				.parse::<f64>()
				.ok()
				.filter(|amount| amount.is_finite())
				.ok_or_else(|| E::invalid_value(de::Unexpected::Str(value), &self))
		}
	}
}

pub mod year {
	use super::*;

	pub fn serialize<S>(value: &Option<i32>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match value {
			Some(year) => serializer.serialize_i32(*year),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_any(YearVisitor)
	}

	struct YearVisitor;
	impl Visitor<'_> for YearVisitor {
		type Value = Option<i32>;

		fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			f.write_str("a year as a number or string")
		}

		fn visit_unit<E>(self) -> Result<Option<i32>, E> {
			Ok(None)
		}

		fn visit_none<E>(self) -> Result<Option<i32>, E> {
			Ok(None)
		}

		fn visit_u64<E>(self, value: u64) -> Result<Option<i32>, E>
		where
			E: de::Error,
		{
			i32::try_from(value)
				.map(Some)
				.map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
		}

		fn visit_i64<E>(self, value: i64) -> Result<Option<i32>, E>
		where
			E: de::Error,
		{
			i32::try_from(value)
				.map(Some)
				.map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
		}

		fn visit_str<E>(self, value: &str) -> Result<Option<i32>, E>
		where
			E: de::Error,
		{
			let trimmed = value.trim();

			if trimmed.is_empty() {
				return Ok(None);
			}

			trimmed
				.parse::<i32>()
				.map(Some)
				.map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
		}
	}
}

pub mod date {
	use time::{Date, macros::format_description};

	use super::*;

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
		let raw = <String as serde::Deserialize>::deserialize(deserializer)?;

		ins_domain::dates::parse_loose_date(&raw)
			.ok_or_else(|| de::Error::custom(format!("unrecognized date {raw:?}")))
	}
}
