use crate::adapter::Args;
use crate::error::{GatewayError, Result};
use crate::gateway::{same_gateway, Gateway};
use async_trait::async_trait;
use downcast_rs::{impl_downcast, DowncastSync};
use std::sync::{Arc, Weak};

/// Adapter-specific engine for evolving a backend's schema or state
///
/// A migrator refers back to the gateway that built it without owning it.
#[async_trait]
pub trait Migrator: DowncastSync {
    /// Gateway this migrator is bound to, if it is still alive
    fn gateway(&self) -> Option<Arc<dyn Gateway>>;

    /// Versions not applied yet, in application order
    async fn pending(&self) -> Result<Vec<String>>;

    /// Apply pending migrations and return the versions applied
    async fn run(&self) -> Result<Vec<String>>;
}

impl_downcast!(sync Migrator);

/// Factory trait for constructing an adapter's migrator
pub trait MigratorFactory: Send + Sync {
    fn type_name(&self) -> &'static str;

    /// Construct a migrator bound to `gateway`
    fn build(&self, gateway: &Arc<dyn Gateway>, args: Args) -> Result<Box<dyn Migrator>>;
}

/// Non-owning back-reference from a migrator to its gateway
#[derive(Clone)]
pub struct GatewayRef(Weak<dyn Gateway>);

impl GatewayRef {
    pub fn new(gateway: &Arc<dyn Gateway>) -> Self {
        Self(Arc::downgrade(gateway))
    }

    pub fn get(&self) -> Option<Arc<dyn Gateway>> {
        self.0.upgrade()
    }

    /// Upgrade, failing once the gateway has been dropped
    pub fn require(&self) -> Result<Arc<dyn Gateway>> {
        self.get()
            .ok_or_else(|| GatewayError::Disconnected("gateway was dropped".to_string()))
    }

    pub fn points_to(&self, gateway: &Arc<dyn Gateway>) -> bool {
        self.get()
            .map(|own| same_gateway(&own, gateway))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for GatewayRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayRef")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}
