pub mod cache;
pub mod client;
pub mod error;

pub use cache::Cache;
pub use client::RegistryClient;
pub use error::{RegistryError, RegistryResult};
