use crate::dataset::MemoryDataset;
use std::sync::Arc;
use temps_gateway::{Command, CommandKind, Dataset, Result, Tuple};

/// Insert the input tuples
pub struct Create {
    dataset: Arc<MemoryDataset>,
}

impl Create {
    pub fn new(dataset: Arc<MemoryDataset>) -> Self {
        Self { dataset }
    }
}

impl Command for Create {
    fn kind(&self) -> CommandKind {
        CommandKind::Create
    }

    fn dataset_name(&self) -> &str {
        self.dataset.name()
    }

    fn call(&self, input: Vec<Tuple>) -> Result<Vec<Tuple>> {
        self.dataset.insert_many(input.iter().cloned())?;
        Ok(input)
    }
}

/// Merge the input tuples into every tuple matching `criteria`
pub struct Update {
    dataset: Arc<MemoryDataset>,
    criteria: Tuple,
}

impl Update {
    pub fn new(dataset: Arc<MemoryDataset>, criteria: Tuple) -> Self {
        Self { dataset, criteria }
    }
}

impl Command for Update {
    fn kind(&self) -> CommandKind {
        CommandKind::Update
    }

    fn dataset_name(&self) -> &str {
        self.dataset.name()
    }

    fn call(&self, input: Vec<Tuple>) -> Result<Vec<Tuple>> {
        let changes: Tuple = input.into_iter().flatten().collect();
        self.dataset.update_where(&self.criteria, &changes)
    }
}

/// Remove every tuple matching `criteria`; the input is not used
pub struct Delete {
    dataset: Arc<MemoryDataset>,
    criteria: Tuple,
}

impl Delete {
    pub fn new(dataset: Arc<MemoryDataset>, criteria: Tuple) -> Self {
        Self { dataset, criteria }
    }
}

impl Command for Delete {
    fn kind(&self) -> CommandKind {
        CommandKind::Delete
    }

    fn dataset_name(&self) -> &str {
        self.dataset.name()
    }

    fn call(&self, _input: Vec<Tuple>) -> Result<Vec<Tuple>> {
        self.dataset.delete_where(&self.criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tuple(value: serde_json::Value) -> Tuple {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_create_update_delete() {
        let dataset = Arc::new(MemoryDataset::new("users"));

        let created = Create::new(dataset.clone())
            .call(vec![
                tuple(json!({"id": 1, "name": "Jane"})),
                tuple(json!({"id": 2, "name": "Joe"})),
            ])
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(dataset.count(), 2);

        let updated = Update::new(dataset.clone(), tuple(json!({"id": 2})))
            .call(vec![tuple(json!({"name": "Joseph"}))])
            .unwrap();
        assert_eq!(updated, vec![tuple(json!({"id": 2, "name": "Joseph"}))]);

        let deleted = Delete::new(dataset.clone(), tuple(json!({"id": 1})))
            .call(Vec::new())
            .unwrap();
        assert_eq!(deleted, vec![tuple(json!({"id": 1, "name": "Jane"}))]);
        assert_eq!(dataset.to_vec(), vec![tuple(json!({"id": 2, "name": "Joseph"}))]);
    }
}
