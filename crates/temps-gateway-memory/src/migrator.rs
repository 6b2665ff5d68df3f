use crate::gateway::MemoryGateway;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use temps_gateway::{Args, Gateway, GatewayError, GatewayRef, Migrator, MigratorFactory, Result};
use tracing::info;

/// A versioned step creating datasets on a memory gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    pub version: String,
    #[serde(default)]
    pub create: Vec<String>,
}

impl Migration {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            create: Vec::new(),
        }
    }

    pub fn creating(mut self, dataset: impl Into<String>) -> Self {
        self.create.push(dataset.into());
        self
    }
}

/// Applies [`Migration`]s to the memory gateway it was built for
pub struct MemoryMigrator {
    gateway: GatewayRef,
    migrations: Vec<Migration>,
}

impl MemoryMigrator {
    pub fn new(gateway: &Arc<dyn Gateway>, migrations: Vec<Migration>) -> Result<Self> {
        if gateway.downcast_ref::<MemoryGateway>().is_none() {
            return Err(GatewayError::argument(format!(
                "MemoryMigrator cannot be bound to {}",
                gateway.type_name()
            )));
        }

        Ok(Self {
            gateway: GatewayRef::new(gateway),
            migrations,
        })
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    fn memory_gateway(&self) -> Result<Arc<MemoryGateway>> {
        self.gateway
            .require()?
            .downcast_arc::<MemoryGateway>()
            .map_err(|other| {
                GatewayError::backend(format!(
                    "MemoryMigrator is bound to {}",
                    other.type_name()
                ))
            })
    }

    fn pending_in(&self, gateway: &MemoryGateway) -> Vec<&Migration> {
        let applied: HashSet<String> = gateway
            .applied_migrations()
            .into_iter()
            .map(|m| m.version)
            .collect();

        self.migrations
            .iter()
            .filter(|m| !applied.contains(&m.version))
            .collect()
    }
}

#[async_trait]
impl Migrator for MemoryMigrator {
    fn gateway(&self) -> Option<Arc<dyn Gateway>> {
        self.gateway.get()
    }

    async fn pending(&self) -> Result<Vec<String>> {
        let gateway = self.memory_gateway()?;
        Ok(self
            .pending_in(&gateway)
            .into_iter()
            .map(|m| m.version.clone())
            .collect())
    }

    async fn run(&self) -> Result<Vec<String>> {
        let gateway = self.memory_gateway()?;
        let mut applied = Vec::new();

        for migration in self.pending_in(&gateway) {
            for dataset in &migration.create {
                gateway.memory_dataset(dataset)?;
            }
            gateway.record_migration(&migration.version)?;
            applied.push(migration.version.clone());
        }

        info!("Applied {} memory migrations", applied.len());
        Ok(applied)
    }
}

/// Factory registered as the `memory` adapter's migrator type
///
/// Each argument is one migration: `{"version": "001", "create": ["users"]}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryMigratorFactory;

impl MigratorFactory for MemoryMigratorFactory {
    fn type_name(&self) -> &'static str {
        "MemoryMigrator"
    }

    fn build(&self, gateway: &Arc<dyn Gateway>, args: Args) -> Result<Box<dyn Migrator>> {
        let migrations = args
            .into_iter()
            .map(|arg| {
                serde_json::from_value::<Migration>(arg)
                    .map_err(|e| GatewayError::argument(format!("invalid migration: {}", e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Box::new(MemoryMigrator::new(gateway, migrations)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Other;

    impl Gateway for Other {
        fn declared_adapter(&self) -> Option<&'static str> {
            Some("other")
        }
    }

    #[tokio::test]
    async fn test_run_applies_pending_once() {
        let memory = Arc::new(MemoryGateway::new());
        let gateway: Arc<dyn Gateway> = memory.clone();

        let migrator = MemoryMigrator::new(
            &gateway,
            vec![
                Migration::new("001").creating("users"),
                Migration::new("002").creating("tasks").creating("tags"),
            ],
        )
        .unwrap();

        assert_eq!(migrator.pending().await.unwrap(), vec!["001", "002"]);
        assert_eq!(migrator.run().await.unwrap(), vec!["001", "002"]);
        assert!(migrator.pending().await.unwrap().is_empty());
        assert!(migrator.run().await.unwrap().is_empty());

        assert!(memory.has_dataset("users"));
        assert!(memory.has_dataset("tags"));
        let versions: Vec<_> = memory
            .applied_migrations()
            .into_iter()
            .map(|m| m.version)
            .collect();
        assert_eq!(versions, vec!["001", "002"]);
    }

    #[test]
    fn test_factory_parses_migrations() {
        let gateway: Arc<dyn Gateway> = Arc::new(MemoryGateway::new());
        let migrator = MemoryMigratorFactory
            .build(&gateway, vec![json!({"version": "001", "create": ["users"]})])
            .unwrap();

        let memory = migrator.downcast_ref::<MemoryMigrator>().unwrap();
        assert_eq!(
            memory.migrations(),
            &[Migration::new("001").creating("users")]
        );

        assert!(matches!(
            MemoryMigratorFactory.build(&gateway, vec![json!({"create": []})]),
            Err(GatewayError::Argument(_))
        ));
    }

    #[test]
    fn test_refuses_foreign_gateway() {
        let gateway: Arc<dyn Gateway> = Arc::new(Other);
        assert!(matches!(
            MemoryMigrator::new(&gateway, Vec::new()),
            Err(GatewayError::Argument(_))
        ));
    }

    #[tokio::test]
    async fn test_dropped_gateway() {
        let gateway: Arc<dyn Gateway> = Arc::new(MemoryGateway::new());
        let migrator = MemoryMigrator::new(&gateway, vec![Migration::new("001")]).unwrap();
        drop(gateway);

        assert!(migrator.gateway().is_none());
        assert!(matches!(
            migrator.pending().await,
            Err(GatewayError::Disconnected(_))
        ));
    }
}
