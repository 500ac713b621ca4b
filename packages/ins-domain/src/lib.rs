pub mod dates;
pub mod state;
pub mod validate;

pub use state::{ClaimState, PolicyState};
