use crate::error::Result;
use crate::gateway::Gateway;
use crate::migrator::MigratorFactory;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Positional constructor arguments handed to gateway and migrator factories
pub type Args = Vec<serde_json::Value>;

/// Symbolic adapter name used as the registry key (e.g. `memory`, `sql`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdapterId(Arc<str>);

impl AdapterId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AdapterId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for AdapterId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for AdapterId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// How many positional arguments a gateway constructor accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Constructor takes nothing; extra arguments passed to `setup` are dropped
    Zero,
    /// Constructor receives every argument passed to `setup`
    Variadic,
}

/// Factory trait for constructing gateways of one concrete type
pub trait GatewayFactory: Send + Sync {
    /// Name of the concrete gateway type this factory builds
    fn type_name(&self) -> &'static str;

    /// Constructor arity, `Variadic` unless the type takes no arguments
    fn arity(&self) -> Arity {
        Arity::Variadic
    }

    /// Construct a gateway from positional arguments
    fn build(&self, args: Args) -> Result<Arc<dyn Gateway>>;
}

/// Closure-backed [`GatewayFactory`]
pub struct GatewayFn<F> {
    type_name: &'static str,
    arity: Arity,
    build: F,
}

impl<F> GatewayFn<F>
where
    F: Fn(Args) -> Result<Arc<dyn Gateway>> + Send + Sync,
{
    pub fn new(type_name: &'static str, arity: Arity, build: F) -> Self {
        Self {
            type_name,
            arity,
            build,
        }
    }
}

impl<F> GatewayFactory for GatewayFn<F>
where
    F: Fn(Args) -> Result<Arc<dyn Gateway>> + Send + Sync,
{
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn arity(&self) -> Arity {
        self.arity
    }

    fn build(&self, args: Args) -> Result<Arc<dyn Gateway>> {
        (self.build)(args)
    }
}

/// Types exposed by one adapter
///
/// `repository` is the legacy name for the gateway type and is only consulted
/// when `gateway` is absent.
#[derive(Clone, Default)]
pub struct AdapterNamespace {
    gateway: Option<Arc<dyn GatewayFactory>>,
    repository: Option<Arc<dyn GatewayFactory>>,
    migrator: Option<Arc<dyn MigratorFactory>>,
}

impl AdapterNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gateway(mut self, factory: impl GatewayFactory + 'static) -> Self {
        self.gateway = Some(Arc::new(factory));
        self
    }

    pub fn with_repository(mut self, factory: impl GatewayFactory + 'static) -> Self {
        self.repository = Some(Arc::new(factory));
        self
    }

    pub fn with_migrator(mut self, factory: impl MigratorFactory + 'static) -> Self {
        self.migrator = Some(Arc::new(factory));
        self
    }

    /// Gateway factory, falling back to the legacy repository factory
    pub fn gateway_factory(&self) -> Option<Arc<dyn GatewayFactory>> {
        self.gateway.clone().or_else(|| self.repository.clone())
    }

    pub fn migrator_factory(&self) -> Option<Arc<dyn MigratorFactory>> {
        self.migrator.clone()
    }
}

impl fmt::Debug for AdapterNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterNamespace")
            .field("gateway", &self.gateway.as_ref().map(|g| g.type_name()))
            .field("repository", &self.repository.as_ref().map(|r| r.type_name()))
            .field("migrator", &self.migrator.as_ref().map(|m| m.type_name()))
            .finish()
    }
}

/// An adapter produced by an [`AdapterLoader`](crate::loader::AdapterLoader)
#[derive(Debug, Clone)]
pub struct LoadedAdapter {
    pub adapter: AdapterId,
    pub namespace: AdapterNamespace,
}

impl LoadedAdapter {
    pub fn new(adapter: impl Into<AdapterId>, namespace: AdapterNamespace) -> Self {
        Self {
            adapter: adapter.into(),
            namespace,
        }
    }
}

impl From<&str> for AdapterId {
    fn from(name: &str) -> Self {
        AdapterId::new(name)
    }
}

impl From<String> for AdapterId {
    fn from(name: String) -> Self {
        AdapterId::new(name)
    }
}
