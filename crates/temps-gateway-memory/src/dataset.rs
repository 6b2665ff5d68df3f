use serde_json::Value;
use std::cmp::Ordering;
use std::sync::atomic::{self, AtomicBool};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use temps_gateway::{Dataset, GatewayError, Result, Tuple, TupleIter};

/// Named, mutable collection of tuples kept in insertion order
///
/// Once its gateway disconnects the dataset is closed: reads and writes fail
/// with `Disconnected` and enumeration yields nothing.
#[derive(Debug)]
pub struct MemoryDataset {
    name: String,
    rows: RwLock<Vec<Tuple>>,
    closed: AtomicBool,
}

impl MemoryDataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_rows(name, Vec::new())
    }

    pub fn with_rows(name: impl Into<String>, rows: Vec<Tuple>) -> Self {
        Self {
            name: name.into(),
            rows: RwLock::new(rows),
            closed: AtomicBool::new(false),
        }
    }

    /// Drop every tuple and refuse further access
    pub(crate) fn close(&self) {
        self.closed.store(true, atomic::Ordering::SeqCst);
        match self.rows.write() {
            Ok(mut rows) => rows.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(atomic::Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(GatewayError::Disconnected(format!(
                "dataset '{}' belongs to a disconnected gateway",
                self.name
            )));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Tuple>>> {
        self.ensure_open()?;
        self.rows
            .read()
            .map_err(|_| GatewayError::backend(format!("dataset '{}' lock poisoned", self.name)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Tuple>>> {
        self.ensure_open()?;
        self.rows
            .write()
            .map_err(|_| GatewayError::backend(format!("dataset '{}' lock poisoned", self.name)))
    }

    pub fn insert(&self, tuple: Tuple) -> Result<()> {
        self.write()?.push(tuple);
        Ok(())
    }

    pub fn insert_many(&self, tuples: impl IntoIterator<Item = Tuple>) -> Result<usize> {
        let mut rows = self.write()?;
        let before = rows.len();
        rows.extend(tuples);
        Ok(rows.len() - before)
    }

    /// Tuples whose fields equal every field in `criteria`
    pub fn restrict(&self, criteria: &Tuple) -> Result<Vec<Tuple>> {
        Ok(self
            .read()?
            .iter()
            .filter(|row| matches(row, criteria))
            .cloned()
            .collect())
    }

    /// Tuples reduced to `fields`; missing fields are left out
    pub fn project(&self, fields: &[&str]) -> Result<Vec<Tuple>> {
        Ok(self
            .read()?
            .iter()
            .map(|row| {
                fields
                    .iter()
                    .filter_map(|f| row.get(*f).map(|v| (f.to_string(), v.clone())))
                    .collect()
            })
            .collect())
    }

    /// Tuples sorted by `fields`, first field most significant
    pub fn order_by(&self, fields: &[&str]) -> Result<Vec<Tuple>> {
        let mut rows = self.read()?.clone();
        rows.sort_by(|a, b| {
            fields
                .iter()
                .map(|f| compare_values(a.get(*f), b.get(*f)))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        Ok(rows)
    }

    /// Merge `changes` into matching tuples and return them as updated
    pub fn update_where(&self, criteria: &Tuple, changes: &Tuple) -> Result<Vec<Tuple>> {
        let mut rows = self.write()?;
        let mut updated = Vec::new();

        for row in rows.iter_mut().filter(|row| matches(row, criteria)) {
            for (key, value) in changes {
                row.insert(key.clone(), value.clone());
            }
            updated.push(row.clone());
        }

        Ok(updated)
    }

    /// Remove matching tuples and return them
    pub fn delete_where(&self, criteria: &Tuple) -> Result<Vec<Tuple>> {
        let mut rows = self.write()?;
        let (removed, kept): (Vec<Tuple>, Vec<Tuple>) =
            rows.drain(..).partition(|row| matches(row, criteria));
        *rows = kept;
        Ok(removed)
    }

    pub fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }
}

impl Dataset for MemoryDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn tuples(&self) -> TupleIter<'_> {
        // enumerate a snapshot so writers are not blocked by slow readers
        let rows = match self.rows.read() {
            Ok(rows) => rows.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        Box::new(rows.into_iter())
    }

    fn count(&self) -> usize {
        match self.rows.read() {
            Ok(rows) => rows.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

fn matches(row: &Tuple, criteria: &Tuple) -> bool {
    criteria
        .iter()
        .all(|(key, expected)| row.get(key) == Some(expected))
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (x, y) => x.to_string().cmp(&y.to_string()),
        },
    }
}
