use crate::adapter::{AdapterId, LoadedAdapter};
use std::collections::HashMap;
use thiserror::Error;

/// Prefix of the conventional unit name an adapter is loaded from
pub const LOAD_PATH_PREFIX: &str = "temps-gateway-";

/// Conventional load path for an adapter, e.g. `temps-gateway-memory`
pub fn default_load_path(adapter: &AdapterId) -> String {
    format!("{}{}", LOAD_PATH_PREFIX, adapter)
}

/// Why an adapter unit could not be loaded
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no adapter unit at '{0}'")]
    NotFound(String),

    #[error("{0}")]
    Failed(String),
}

/// On-demand source of adapters that were not registered up front
///
/// The registry calls [`AdapterLoader::load`] at most once per unresolved
/// identifier per `setup` call and registers whatever it returns.
pub trait AdapterLoader: Send + Sync {
    /// Unit name the adapter would be loaded from
    fn load_path(&self, adapter: &AdapterId) -> String {
        default_load_path(adapter)
    }

    fn load(&self, adapter: &AdapterId) -> Result<LoadedAdapter, LoadError>;
}

/// Loader that never finds anything; the registry default
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLoader;

impl AdapterLoader for NoLoader {
    fn load(&self, adapter: &AdapterId) -> Result<LoadedAdapter, LoadError> {
        Err(LoadError::NotFound(self.load_path(adapter)))
    }
}

/// Loader over a table of adapter units compiled into the binary
///
/// ```rust
/// use temps_gateway::{AdapterNamespace, LoadedAdapter, StaticLoader};
///
/// fn fake() -> LoadedAdapter {
///     LoadedAdapter::new("fake", AdapterNamespace::new())
/// }
///
/// let loader = StaticLoader::new().with_unit("temps-gateway-fake", fake);
/// assert_eq!(loader.units(), vec!["temps-gateway-fake".to_string()]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct StaticLoader {
    units: HashMap<String, fn() -> LoadedAdapter>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the unit at `path` available for loading
    pub fn with_unit(mut self, path: impl Into<String>, unit: fn() -> LoadedAdapter) -> Self {
        self.units.insert(path.into(), unit);
        self
    }

    /// Known unit paths, sorted
    pub fn units(&self) -> Vec<String> {
        let mut units: Vec<String> = self.units.keys().cloned().collect();
        units.sort();
        units
    }
}

impl AdapterLoader for StaticLoader {
    fn load(&self, adapter: &AdapterId) -> Result<LoadedAdapter, LoadError> {
        let path = self.load_path(adapter);
        match self.units.get(&path) {
            Some(unit) => Ok(unit()),
            None => Err(LoadError::NotFound(path)),
        }
    }
}
