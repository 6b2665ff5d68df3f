use crate::error::{GatewayError, Result};
use downcast_rs::{impl_downcast, DowncastSync};
use serde_json::Value;

/// A single record as field name to value pairs
pub type Tuple = serde_json::Map<String, Value>;

/// Iterator over the tuples of a dataset
pub type TupleIter<'a> = Box<dyn Iterator<Item = Tuple> + Send + 'a>;

/// Enumerable collection of records belonging to a gateway
///
/// Each call to [`Dataset::tuples`] starts a fresh enumeration, so a dataset
/// can be walked any number of times.
pub trait Dataset: DowncastSync {
    fn name(&self) -> &str;

    /// Lazily enumerate the records in dataset order
    fn tuples(&self) -> TupleIter<'_>;

    fn to_vec(&self) -> Vec<Tuple> {
        self.tuples().collect()
    }

    fn count(&self) -> usize {
        self.tuples().count()
    }
}

impl_downcast!(sync Dataset);

/// Convert a JSON value into a tuple, rejecting anything but objects
pub fn tuple_from_value(value: Value) -> Result<Tuple> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(GatewayError::InvalidTuple(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// Read-only dataset over a literal sequence of records
#[derive(Debug, Clone)]
pub struct ArrayDataset {
    name: String,
    rows: Vec<Tuple>,
}

impl ArrayDataset {
    pub fn new(name: impl Into<String>, rows: Vec<Tuple>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Build from JSON objects, e.g. `[{"name": "Jane", "age": 24}]`
    pub fn from_values(name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        let rows = values
            .into_iter()
            .map(tuple_from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(name, rows))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tuple> {
        self.rows.iter()
    }
}

impl Dataset for ArrayDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn tuples(&self) -> TupleIter<'_> {
        Box::new(self.rows.iter().cloned())
    }

    fn count(&self) -> usize {
        self.rows.len()
    }
}

impl<'a> IntoIterator for &'a ArrayDataset {
    type Item = &'a Tuple;
    type IntoIter = std::slice::Iter<'a, Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
