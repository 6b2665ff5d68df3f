use crate::adapter::{AdapterId, Args};
use crate::command::Command;
use crate::dataset::Dataset;
use crate::error::{GatewayError, Result};
use crate::migrator::Migrator;
use crate::registry::AdapterRegistry;
use async_trait::async_trait;
use downcast_rs::{impl_downcast, DowncastSync};
use std::sync::Arc;
use tracing::Dispatch;

/// Capability surface every backend gateway exposes
///
/// A gateway owns its backend connection exclusively. Its lifecycle is
/// `Constructed -> Connected -> Disconnected`; backends that connect eagerly
/// are connected as soon as their factory returns, and `Disconnected` is
/// terminal.
#[async_trait]
pub trait Gateway: DowncastSync {
    /// Adapter identifier declared by the concrete type
    ///
    /// Every concrete gateway is expected to override this. Types that do not
    /// fail on [`Gateway::adapter`] and are rejected by `setup`.
    fn declared_adapter(&self) -> Option<&'static str> {
        None
    }

    /// Name of the concrete gateway type
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Adapter identifier this gateway belongs to
    fn adapter(&self) -> Result<AdapterId> {
        match self.declared_adapter() {
            Some(name) if !name.is_empty() => Ok(AdapterId::new(name)),
            _ => Err(GatewayError::missing_adapter_identifier(self.type_name())),
        }
    }

    /// Hand the gateway a logger; ignored unless the backend logs
    fn use_logger(&self, _logger: Dispatch) {}

    /// Logger previously passed to [`Gateway::use_logger`]
    fn logger(&self) -> Option<Dispatch> {
        None
    }

    /// Decorate a generic command before it runs against `dataset`
    ///
    /// The returned command must be usable wherever the original was.
    fn extend_command(
        &self,
        command: Arc<dyn Command>,
        _dataset: &Arc<dyn Dataset>,
    ) -> Arc<dyn Command> {
        command
    }

    /// Enumerate the datasets known to the backend as `(name, dataset)` pairs
    async fn schema(&self) -> Result<Vec<(String, Arc<dyn Dataset>)>> {
        Ok(Vec::new())
    }

    /// Get a dataset by name
    fn dataset(&self, name: &str) -> Result<Arc<dyn Dataset>> {
        Err(GatewayError::operation_not_supported(format!(
            "{} does not expose dataset '{}'",
            self.type_name(),
            name
        )))
    }

    /// Release the backend connection; must be safe to call more than once
    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }
}

impl_downcast!(sync Gateway);

/// Check whether two handles point at the same gateway instance
pub fn same_gateway(a: &Arc<dyn Gateway>, b: &Arc<dyn Gateway>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Convenience methods on shared gateway handles backed by the process-wide registry
#[async_trait]
pub trait GatewayExt {
    /// Build the adapter's migrator bound to this gateway
    async fn migrator(&self, args: Args) -> Result<Box<dyn Migrator>>;
}

#[async_trait]
impl GatewayExt for Arc<dyn Gateway> {
    async fn migrator(&self, args: Args) -> Result<Box<dyn Migrator>> {
        AdapterRegistry::global().migrator(self, args).await
    }
}
