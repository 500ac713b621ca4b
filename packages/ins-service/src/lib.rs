pub mod agents;
pub mod claims;
pub mod clients;
pub mod policies;
pub mod ranking;
pub mod time_serde;
pub mod vehicles;

mod error;
mod pipeline;

pub use agents::{AgentClaimCount, AgentPolicyCount};
pub use claims::{CreateClaimRequest, OpenClaim, RecentClaim, RecentClaimsRequest};
pub use clients::{
	ClientCurrentPolicies, ClientSummary, ClientVehicleCount, CreateClientRequest,
	UpdateClientRequest,
};
pub use error::{Error, INVALID_REQUEST, Result};
pub use policies::{ActivePolicy, ClientStatus, ExpiredPolicy, IssuePolicyRequest, SuspendedPolicy};
pub use ranking::{RankedClient, TopClients};
pub use vehicles::InsuredVehicle;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use ins_config::Config;
use ins_storage::{models::Record, ranking::RankingStore, records::Records, store::DocumentStore};

/// A person's display name as joined into report rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
	pub name: String,
	pub surname: String,
}

/// Reporting views, the coverage ranking and validated writes over one record store.
pub struct InsuranceService {
	pub cfg: Config,
	pub records: Records,
	pub ranking: Arc<dyn RankingStore>,
}
impl InsuranceService {
	pub fn new(
		cfg: Config,
		documents: Arc<dyn DocumentStore>,
		ranking: Arc<dyn RankingStore>,
	) -> Self {
		Self { cfg, records: Records::new(documents), ranking }
	}

	pub(crate) fn today() -> Date {
		OffsetDateTime::now_utc().date()
	}

	/// Allocates the next numeric id of a collection, starting above the highest numeric id
	/// already stored.
	pub(crate) async fn next_record_id<R, F>(&self, id_of: F) -> Result<i64>
	where
		R: Record,
		F: Fn(&R) -> Option<i64>,
	{
		let highest = self.records.all::<R>().await?.iter().filter_map(id_of).max().unwrap_or(0);
		let id = self.records.next_sequence(R::COLLECTION.as_str(), highest.max(0) + 1).await?;

		Ok(id)
	}
}
