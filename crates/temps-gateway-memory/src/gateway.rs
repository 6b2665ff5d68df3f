use crate::commands::{Create, Delete, Update};
use crate::dataset::MemoryDataset;
use crate::ADAPTER;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use temps_gateway::{
    tuple_from_value, Args, Arity, Command, CommandKind, Dataset, Gateway, GatewayError,
    GatewayFactory, Result, Tuple,
};
use tracing::{debug, Dispatch};

/// Migration version recorded on the gateway once applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: String,
    pub applied_at: DateTime<Utc>,
}

/// Gateway keeping named datasets in process memory
///
/// Constructed with an optional seed argument mapping dataset names to rows:
/// `{"users": [{"name": "Jane"}]}`.
pub struct MemoryGateway {
    datasets: RwLock<BTreeMap<String, Arc<MemoryDataset>>>,
    migrations: Mutex<Vec<AppliedMigration>>,
    logger: Mutex<Option<Dispatch>>,
    connected: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            datasets: RwLock::new(BTreeMap::new()),
            migrations: Mutex::new(Vec::new()),
            logger: Mutex::new(None),
            connected: AtomicBool::new(true),
        }
    }

    /// Build from `setup` arguments: nothing, or one seed object
    pub fn from_args(args: Args) -> Result<Self> {
        let gateway = Self::new();
        let mut args = args.into_iter();

        if let Some(seed) = args.next() {
            gateway.seed(seed)?;
        }
        if args.next().is_some() {
            return Err(GatewayError::argument(
                "MemoryGateway accepts at most one seed argument",
            ));
        }

        Ok(gateway)
    }

    fn seed(&self, seed: Value) -> Result<()> {
        let Value::Object(datasets) = seed else {
            return Err(GatewayError::argument(
                "MemoryGateway seed must map dataset names to rows",
            ));
        };

        for (name, rows) in datasets {
            let Value::Array(rows) = rows else {
                return Err(GatewayError::argument(format!(
                    "seed rows for dataset '{}' must be an array",
                    name
                )));
            };
            let rows = rows
                .into_iter()
                .map(tuple_from_value)
                .collect::<Result<Vec<Tuple>>>()?;
            self.memory_dataset(&name)?.insert_many(rows)?;
        }

        Ok(())
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GatewayError::Disconnected(
                "memory gateway has been disconnected".to_string(),
            ))
        }
    }

    fn log(&self, message: &str) {
        let logger = match self.logger.lock() {
            Ok(logger) => logger.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        match logger {
            Some(dispatch) => tracing::dispatcher::with_default(&dispatch, || {
                debug!(adapter = ADAPTER, "{}", message)
            }),
            None => debug!(adapter = ADAPTER, "{}", message),
        }
    }

    /// Dataset `name`, created empty on first access
    pub fn memory_dataset(&self, name: &str) -> Result<Arc<MemoryDataset>> {
        self.ensure_connected()?;

        if let Some(dataset) = self
            .datasets
            .read()
            .map_err(|_| GatewayError::backend("dataset map lock poisoned"))?
            .get(name)
        {
            return Ok(dataset.clone());
        }

        let mut datasets = self
            .datasets
            .write()
            .map_err(|_| GatewayError::backend("dataset map lock poisoned"))?;
        let dataset = datasets
            .entry(name.to_string())
            .or_insert_with(|| {
                self.log(&format!("Creating dataset {}", name));
                Arc::new(MemoryDataset::new(name))
            })
            .clone();
        Ok(dataset)
    }

    pub fn has_dataset(&self, name: &str) -> bool {
        self.datasets
            .read()
            .map(|datasets| datasets.contains_key(name))
            .unwrap_or(false)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Build a command against dataset `name`, passed through [`Gateway::extend_command`]
    ///
    /// `criteria` selects the tuples `Update` and `Delete` act on; `Create`
    /// ignores it.
    pub fn command(
        &self,
        kind: CommandKind,
        name: &str,
        criteria: Tuple,
    ) -> Result<Arc<dyn Command>> {
        let dataset = self.memory_dataset(name)?;
        let command: Arc<dyn Command> = match kind {
            CommandKind::Create => Arc::new(Create::new(dataset.clone())),
            CommandKind::Update => Arc::new(Update::new(dataset.clone(), criteria)),
            CommandKind::Delete => Arc::new(Delete::new(dataset.clone(), criteria)),
        };

        let dataset: Arc<dyn Dataset> = dataset;
        Ok(self.extend_command(command, &dataset))
    }

    /// Migrations applied so far, oldest first
    pub fn applied_migrations(&self) -> Vec<AppliedMigration> {
        match self.migrations.lock() {
            Ok(applied) => applied.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub(crate) fn record_migration(&self, version: &str) -> Result<()> {
        self.ensure_connected()?;
        let mut applied = self
            .migrations
            .lock()
            .map_err(|_| GatewayError::backend("migration log lock poisoned"))?;
        applied.push(AppliedMigration {
            version: version.to_string(),
            applied_at: Utc::now(),
        });
        self.log(&format!("Applied migration {}", version));
        Ok(())
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    fn declared_adapter(&self) -> Option<&'static str> {
        Some(ADAPTER)
    }

    fn type_name(&self) -> &'static str {
        "MemoryGateway"
    }

    fn use_logger(&self, logger: Dispatch) {
        match self.logger.lock() {
            Ok(mut current) => *current = Some(logger),
            Err(poisoned) => *poisoned.into_inner() = Some(logger),
        }
    }

    fn logger(&self) -> Option<Dispatch> {
        match self.logger.lock() {
            Ok(logger) => logger.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn schema(&self) -> Result<Vec<(String, Arc<dyn Dataset>)>> {
        self.ensure_connected()?;
        let datasets = self
            .datasets
            .read()
            .map_err(|_| GatewayError::backend("dataset map lock poisoned"))?;

        Ok(datasets
            .iter()
            .map(|(name, dataset)| (name.clone(), dataset.clone() as Arc<dyn Dataset>))
            .collect())
    }

    fn dataset(&self, name: &str) -> Result<Arc<dyn Dataset>> {
        let dataset: Arc<dyn Dataset> = self.memory_dataset(name)?;
        Ok(dataset)
    }

    async fn disconnect(&self) -> Result<()> {
        if !self.connected.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let datasets = match self.datasets.write() {
            Ok(mut datasets) => std::mem::take(&mut *datasets),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        for dataset in datasets.values() {
            dataset.close();
        }

        self.log("Disconnected");
        Ok(())
    }
}

/// Factory registered as the `memory` adapter's gateway type
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryGatewayFactory;

impl GatewayFactory for MemoryGatewayFactory {
    fn type_name(&self) -> &'static str {
        "MemoryGateway"
    }

    fn arity(&self) -> Arity {
        Arity::Variadic
    }

    fn build(&self, args: Args) -> Result<Arc<dyn Gateway>> {
        Ok(Arc::new(MemoryGateway::from_args(args)?))
    }
}
