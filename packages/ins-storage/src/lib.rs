pub mod db;
pub mod decode;
pub mod documents;
pub mod memory;
pub mod models;
pub mod ranking;
pub mod records;
pub mod schema;
pub mod store;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
