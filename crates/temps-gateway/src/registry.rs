use crate::adapter::{AdapterId, AdapterNamespace, Args, Arity, GatewayFactory};
use crate::error::{GatewayError, Result};
use crate::gateway::Gateway;
use crate::loader::{AdapterLoader, LoadError, NoLoader};
use crate::migrator::{Migrator, MigratorFactory};
use crate::selector::Selector;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

static GLOBAL: Lazy<AdapterRegistry> = Lazy::new(AdapterRegistry::new);

/// Registry mapping adapter identifiers to the types they expose
///
/// Adapters are registered at startup or loaded on demand through the
/// installed [`AdapterLoader`]. Entries are only ever added or overwritten.
/// Registration is expected to finish before `setup` references an adapter;
/// the registry does not order concurrent writers.
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: Arc<RwLock<HashMap<AdapterId, AdapterNamespace>>>,
    loader: Arc<RwLock<Arc<dyn AdapterLoader>>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::with_loader(Arc::new(NoLoader))
    }

    pub fn with_loader(loader: Arc<dyn AdapterLoader>) -> Self {
        Self {
            adapters: Arc::new(RwLock::new(HashMap::new())),
            loader: Arc::new(RwLock::new(loader)),
        }
    }

    /// Process-wide registry
    pub fn global() -> &'static AdapterRegistry {
        &GLOBAL
    }

    /// Replace the loader used for adapters that are not registered
    pub async fn set_loader(&self, loader: Arc<dyn AdapterLoader>) {
        *self.loader.write().await = loader;
    }

    /// Register an adapter; registering the same identifier again replaces it
    pub async fn register(
        &self,
        adapter: impl Into<AdapterId>,
        namespace: AdapterNamespace,
    ) -> Result<()> {
        let adapter = adapter.into();
        let mut adapters = self.adapters.write().await;

        if adapters.contains_key(&adapter) {
            warn!("Overwriting existing registration for adapter: {}", adapter);
        }

        debug!("Registered adapter {}: {:?}", adapter, namespace);
        adapters.insert(adapter, namespace);
        Ok(())
    }

    /// Look up a registered adapter without loading
    pub async fn lookup(&self, adapter: &AdapterId) -> Option<AdapterNamespace> {
        let adapters = self.adapters.read().await;
        adapters.get(adapter).cloned()
    }

    /// Check if an adapter is registered
    pub async fn has_adapter(&self, adapter: &AdapterId) -> bool {
        let adapters = self.adapters.read().await;
        adapters.contains_key(adapter)
    }

    /// List registered adapters, sorted
    pub async fn list_adapters(&self) -> Vec<AdapterId> {
        let adapters = self.adapters.read().await;
        let mut ids: Vec<AdapterId> = adapters.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Resolve a selector into a gateway
    ///
    /// - a bare string is a retired connection-string form and is rejected
    /// - an adapter identifier is looked up (loading it if needed) and its
    ///   gateway type is constructed with `args`
    /// - a gateway instance is returned unchanged; passing `args` with it is an
    ///   error
    ///
    /// Gateway types whose arity is [`Arity::Zero`] are constructed without
    /// arguments, and any `args` given are dropped.
    pub async fn setup(
        &self,
        selector: impl Into<Selector>,
        args: Args,
    ) -> Result<Arc<dyn Gateway>> {
        match selector.into() {
            Selector::Uri(uri) => Err(GatewayError::configuration(unscoped_uri_message(&uri))),
            Selector::Instance(gateway) => {
                if !args.is_empty() {
                    return Err(GatewayError::argument(format!(
                        "{} cannot accept arguments when passing an instance",
                        gateway.type_name()
                    )));
                }
                Ok(gateway)
            }
            Selector::Adapter(adapter) => {
                let factory = self.gateway_type(&adapter).await?;

                let args = match factory.arity() {
                    Arity::Zero if !args.is_empty() => {
                        debug!(
                            "{} takes no arguments, dropping {} passed for adapter {}",
                            factory.type_name(),
                            args.len(),
                            adapter
                        );
                        Vec::new()
                    }
                    _ => args,
                };

                let gateway = factory.build(args)?;
                let declared = match gateway.adapter() {
                    Ok(declared) => declared,
                    Err(e) => {
                        warn!("Rejecting gateway for adapter {}: {}", adapter, e);
                        if let Err(cleanup) = gateway.disconnect().await {
                            warn!(
                                "Failed to disconnect rejected gateway {}: {}",
                                gateway.type_name(),
                                cleanup
                            );
                        }
                        return Err(e);
                    }
                };
                if declared != adapter {
                    warn!(
                        "Gateway {} registered as {} declares adapter {}",
                        gateway.type_name(),
                        adapter,
                        declared
                    );
                }

                info!("Set up {} gateway ({})", adapter, gateway.type_name());
                Ok(gateway)
            }
        }
    }

    /// Resolve the gateway type registered for an adapter, loading it if needed
    ///
    /// Prefers the namespace's `Gateway` type and falls back to its legacy
    /// `Repository` type.
    pub async fn gateway_type(&self, adapter: &AdapterId) -> Result<Arc<dyn GatewayFactory>> {
        let namespace = self.namespace(adapter).await?;
        namespace
            .gateway_factory()
            .ok_or_else(|| GatewayError::MissingGatewayType(adapter.clone()))
    }

    /// Registered namespace for an adapter, invoking the loader once if absent
    pub async fn namespace(&self, adapter: &AdapterId) -> Result<AdapterNamespace> {
        if let Some(namespace) = self.lookup(adapter).await {
            return Ok(namespace);
        }

        let loader = self.loader.read().await.clone();
        let path = loader.load_path(adapter);
        debug!("Adapter {} not registered, loading {}", adapter, path);

        let loaded = loader.load(adapter).map_err(|e| {
            warn!("Failed to load adapter {} from {}: {}", adapter, path, e);
            GatewayError::AdapterLoad {
                adapter: adapter.clone(),
                path: match &e {
                    LoadError::NotFound(attempted) => attempted.clone(),
                    LoadError::Failed(_) => path.clone(),
                },
                reason: e.to_string(),
            }
        })?;

        self.register(loaded.adapter, loaded.namespace).await?;

        self.lookup(adapter)
            .await
            .ok_or_else(|| GatewayError::AdapterDefect {
                adapter: adapter.clone(),
                path,
            })
    }

    /// Migrator type registered for an adapter, `None` when the adapter has none
    pub async fn migrator_type(
        &self,
        adapter: &AdapterId,
    ) -> Result<Option<Arc<dyn MigratorFactory>>> {
        let namespace = self
            .lookup(adapter)
            .await
            .ok_or_else(|| GatewayError::AdapterNotRegistered(adapter.clone()))?;
        Ok(namespace.migrator_factory())
    }

    /// Build the migrator of `gateway`'s adapter, bound to `gateway`
    pub async fn migrator(
        &self,
        gateway: &Arc<dyn Gateway>,
        args: Args,
    ) -> Result<Box<dyn Migrator>> {
        let adapter = gateway.adapter()?;
        let factory = self
            .migrator_type(&adapter)
            .await?
            .ok_or_else(|| GatewayError::MigratorNotPresent(adapter.clone()))?;

        debug!(
            "Building migrator {} for adapter {}",
            factory.type_name(),
            adapter
        );
        factory.build(gateway, args)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn unscoped_uri_message(uri: &str) -> String {
    let hint = match uri.split_once("://") {
        Some((scheme, _)) if !scheme.is_empty() => format!(
            "; use the '{}' adapter identifier and pass connection options as arguments",
            scheme
        ),
        _ => String::new(),
    };
    format!(
        "unscoped connection strings are not supported, a gateway must be set up from an adapter identifier{}",
        hint
    )
}
