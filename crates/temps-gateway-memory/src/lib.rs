//! In-memory adapter for temps-gateway
//!
//! Keeps named datasets of JSON tuples in process memory. Useful for tests and
//! for running applications without a database.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use std::sync::Arc;
//! use temps_gateway::{AdapterId, AdapterRegistry, Dataset, StaticLoader};
//!
//! # async fn example() -> temps_gateway::Result<()> {
//! let loader = StaticLoader::new()
//!     .with_unit(temps_gateway_memory::LOAD_PATH, temps_gateway_memory::adapter);
//! let registry = AdapterRegistry::with_loader(Arc::new(loader));
//!
//! let gateway = registry
//!     .setup(
//!         AdapterId::new("memory"),
//!         vec![json!({"users": [{"name": "Jane"}, {"name": "Joe"}]})],
//!     )
//!     .await?;
//!
//! let users = gateway.dataset("users")?;
//! assert_eq!(users.count(), 2);
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod dataset;
pub mod gateway;
pub mod migrator;

pub use commands::{Create, Delete, Update};
pub use dataset::MemoryDataset;
pub use gateway::{AppliedMigration, MemoryGateway, MemoryGatewayFactory};
pub use migrator::{MemoryMigrator, MemoryMigratorFactory, Migration};

use temps_gateway::{AdapterNamespace, AdapterRegistry, LoadedAdapter, Result};

/// Adapter identifier the memory gateway declares
pub const ADAPTER: &str = "memory";

/// Load path a loader resolves the memory adapter under
pub const LOAD_PATH: &str = "temps-gateway-memory";

/// Types exposed by the memory adapter
pub fn namespace() -> AdapterNamespace {
    AdapterNamespace::new()
        .with_gateway(MemoryGatewayFactory)
        .with_migrator(MemoryMigratorFactory)
}

/// Loader unit registering the memory adapter
pub fn adapter() -> LoadedAdapter {
    LoadedAdapter::new(ADAPTER, namespace())
}

/// Register the memory adapter with `registry`
pub async fn register(registry: &AdapterRegistry) -> Result<()> {
    registry.register(ADAPTER, namespace()).await
}
