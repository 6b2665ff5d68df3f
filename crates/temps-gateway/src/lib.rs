//! # temps-gateway
//!
//! Adapter resolution and gateway lifecycle for Temps data backends.
//!
//! An application asks for a backend by adapter identifier and gets back a
//! gateway exposing the same capability surface whatever the backend:
//!
//! - **AdapterRegistry**: maps adapter identifiers to the types they expose,
//!   loading unregistered adapters on demand through an `AdapterLoader`
//! - **Gateway**: connection ownership, schema introspection, command
//!   extension, logger hooks and disconnect
//! - **Migrator**: adapter-specific migration engine bound to a gateway
//! - **Dataset**: enumerable, restartable collection of tuples
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use temps_gateway::{
//!     AdapterId, AdapterNamespace, AdapterRegistry, Arity, Gateway, GatewayError, GatewayFn,
//! };
//!
//! struct FakeGateway;
//!
//! impl Gateway for FakeGateway {
//!     fn declared_adapter(&self) -> Option<&'static str> {
//!         Some("fake")
//!     }
//! }
//!
//! # async fn example() -> temps_gateway::Result<()> {
//! let registry = AdapterRegistry::new();
//! registry
//!     .register(
//!         "fake",
//!         AdapterNamespace::new().with_gateway(GatewayFn::new("FakeGateway", Arity::Zero, |_| {
//!             Ok(Arc::new(FakeGateway) as Arc<dyn Gateway>)
//!         })),
//!     )
//!     .await?;
//!
//! let gateway = registry.setup(AdapterId::new("fake"), Vec::new()).await?;
//! assert_eq!(gateway.adapter()?, "fake");
//!
//! // no migrator registered for this adapter
//! assert!(matches!(
//!     registry.migrator(&gateway, Vec::new()).await,
//!     Err(GatewayError::MigratorNotPresent(_))
//! ));
//! # Ok(())
//! # }
//! ```
//!
//! ## Backend Implementation
//!
//! 1. Create a struct that implements `Gateway` and declares its adapter
//! 2. Create a `GatewayFactory` (and optionally a `MigratorFactory`)
//! 3. Register an `AdapterNamespace` with the registry, or expose it through a
//!    loader unit named `temps-gateway-<adapter>`
//!
//! Example backend crates:
//! - `temps-gateway-memory` - in-memory datasets

pub mod adapter;
pub mod command;
pub mod config;
pub mod conformance;
pub mod dataset;
pub mod error;
pub mod gateway;
pub mod loader;
pub mod migrator;
pub mod registry;
pub mod selector;

// Re-export commonly used items
pub use adapter::{
    AdapterId, AdapterNamespace, Args, Arity, GatewayFactory, GatewayFn, LoadedAdapter,
};
pub use command::{Command, CommandKind};
pub use config::{GatewayConfig, GatewaySet, GatewaysConfig, DEFAULT_GATEWAY};
pub use dataset::{tuple_from_value, ArrayDataset, Dataset, Tuple, TupleIter};
pub use error::{GatewayError, Result};
pub use gateway::{same_gateway, Gateway, GatewayExt};
pub use loader::{default_load_path, AdapterLoader, LoadError, NoLoader, StaticLoader};
pub use migrator::{GatewayRef, Migrator, MigratorFactory};
pub use registry::AdapterRegistry;
pub use selector::Selector;

use std::sync::Arc;

/// Resolve a selector through the process-wide registry
pub async fn setup(selector: impl Into<Selector>, args: Args) -> Result<Arc<dyn Gateway>> {
    AdapterRegistry::global().setup(selector, args).await
}

/// Register an adapter in the process-wide registry
pub async fn register(adapter: impl Into<AdapterId>, namespace: AdapterNamespace) -> Result<()> {
    AdapterRegistry::global().register(adapter, namespace).await
}
