use serde::{Deserialize, Deserializer, Serialize, de};

/// Lifecycle state of a policy.
///
/// The seeded data spells states in more than one vocabulary ("Activa", "Vigente", "Current").
/// Every spelling is folded into one of three canonical states here, so no caller ever compares
/// raw state strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PolicyState {
	Active,
	Expired,
	Suspended,
}
impl PolicyState {
	pub const ALL: [Self; 3] = [Self::Active, Self::Expired, Self::Suspended];

	pub fn parse_loose(raw: &str) -> Option<Self> {
		match fold(raw).as_str() {
			"active" | "activa" | "activo" | "vigente" | "current" => Some(Self::Active),
			"expired" | "vencida" | "vencido" => Some(Self::Expired),
			"suspended" | "suspendida" | "suspendido" => Some(Self::Suspended),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Active => "Active",
			Self::Expired => "Expired",
			Self::Suspended => "Suspended",
		}
	}

	/// Whether claims may be filed against a policy in this state.
	pub fn is_active_like(self) -> bool {
		matches!(self, Self::Active)
	}
}
impl<'de> Deserialize<'de> for PolicyState {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		Self::parse_loose(&raw)
			.ok_or_else(|| de::Error::custom(format!("unknown policy state {raw:?}")))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClaimState {
	Open,
	UnderReview,
	Closed,
}
impl ClaimState {
	pub const ALL: [Self; 3] = [Self::Open, Self::UnderReview, Self::Closed];

	pub fn parse_loose(raw: &str) -> Option<Self> {
		match fold(raw).as_str() {
			"open" | "abierto" | "abierta" => Some(Self::Open),
			"underreview" | "enrevision" | "enrevisión" | "reviewing" => Some(Self::UnderReview),
			"closed" | "cerrado" | "cerrada" => Some(Self::Closed),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Open => "Open",
			Self::UnderReview => "UnderReview",
			Self::Closed => "Closed",
		}
	}
}
impl<'de> Deserialize<'de> for ClaimState {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		Self::parse_loose(&raw)
			.ok_or_else(|| de::Error::custom(format!("unknown claim state {raw:?}")))
	}
}

// Lowercase and drop separators so "Under Review", "under_review" and "UnderReview" agree.
fn fold(raw: &str) -> String {
	raw.trim()
		.chars()
		.filter(|ch| !matches!(ch, ' ' | '_' | '-'))
		.flat_map(char::to_lowercase)
		.collect()
}
