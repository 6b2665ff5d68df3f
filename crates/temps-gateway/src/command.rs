use crate::dataset::Tuple;
use crate::error::Result;
use downcast_rs::{impl_downcast, DowncastSync};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of write a command performs
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Create => write!(f, "create"),
            CommandKind::Update => write!(f, "update"),
            CommandKind::Delete => write!(f, "delete"),
        }
    }
}

/// A write operation bound to one dataset
///
/// Gateways may wrap commands through
/// [`Gateway::extend_command`](crate::gateway::Gateway::extend_command).
pub trait Command: DowncastSync {
    fn kind(&self) -> CommandKind;

    /// Name of the dataset the command writes to
    fn dataset_name(&self) -> &str;

    /// Run the command and return the affected tuples
    fn call(&self, input: Vec<Tuple>) -> Result<Vec<Tuple>>;
}

impl_downcast!(sync Command);
