//! Behavioural checks any gateway or dataset implementation should pass
//!
//! Adapter crates call these from their own test suites.

use crate::adapter::{AdapterId, Args};
use crate::dataset::{Dataset, Tuple};
use crate::error::GatewayError;
use crate::gateway::same_gateway;
use crate::registry::AdapterRegistry;
use crate::selector::Selector;
use std::fmt;

/// A single failed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFailure {
    pub lint: &'static str,
    pub message: String,
}

impl LintFailure {
    fn new(lint: &'static str, message: impl Into<String>) -> Self {
        Self {
            lint,
            message: message.into(),
        }
    }
}

impl fmt::Display for LintFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.lint, self.message)
    }
}

/// Check the gateway contract of `adapter` as registered in `registry`
///
/// Returns every failed check; an empty list means the gateway conforms.
pub async fn lint_gateway(
    registry: &AdapterRegistry,
    adapter: &AdapterId,
    args: Args,
) -> Vec<LintFailure> {
    let mut failures = Vec::new();

    let gateway = match registry.setup(adapter, args).await {
        Ok(gateway) => gateway,
        Err(e) => {
            failures.push(LintFailure::new(
                "setup_from_adapter",
                format!("cannot set up '{}': {}", adapter, e),
            ));
            return failures;
        }
    };

    match gateway.adapter() {
        Ok(declared) if &declared == adapter => {}
        Ok(declared) => failures.push(LintFailure::new(
            "adapter",
            format!("expected '{}', gateway declares '{}'", adapter, declared),
        )),
        Err(e) => failures.push(LintFailure::new("adapter", e.to_string())),
    }

    match registry
        .setup(Selector::Instance(gateway.clone()), Vec::new())
        .await
    {
        Ok(same) if same_gateway(&same, &gateway) => {}
        Ok(_) => failures.push(LintFailure::new(
            "setup_from_instance",
            "setup with an instance returned a different gateway",
        )),
        Err(e) => failures.push(LintFailure::new("setup_from_instance", e.to_string())),
    }

    match registry
        .setup(
            Selector::Instance(gateway.clone()),
            vec![serde_json::Value::Null],
        )
        .await
    {
        Err(GatewayError::Argument(_)) => {}
        Err(e) => failures.push(LintFailure::new(
            "instance_with_args",
            format!("expected an argument error, got: {}", e),
        )),
        Ok(_) => failures.push(LintFailure::new(
            "instance_with_args",
            "setup accepted arguments alongside an instance",
        )),
    }

    if let Err(e) = gateway.disconnect().await {
        failures.push(LintFailure::new("disconnect", e.to_string()));
    }

    failures
}

/// Check that `dataset` enumerates exactly `expected`, in order, more than once
pub fn lint_dataset(dataset: &dyn Dataset, expected: &[Tuple]) -> Vec<LintFailure> {
    let mut failures = Vec::new();

    let first: Vec<Tuple> = dataset.tuples().collect();
    if first != expected {
        failures.push(LintFailure::new(
            "each",
            format!(
                "dataset '{}' yielded {} tuples, expected {}",
                dataset.name(),
                first.len(),
                expected.len()
            ),
        ));
    }

    let second: Vec<Tuple> = dataset.tuples().collect();
    if second != first {
        failures.push(LintFailure::new(
            "restartable",
            format!(
                "dataset '{}' yielded different tuples on a second enumeration",
                dataset.name()
            ),
        ));
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ArrayDataset;
    use serde_json::json;

    #[test]
    fn test_lint_dataset_passes_for_array_dataset() {
        let dataset = ArrayDataset::from_values(
            "people",
            vec![
                json!({"name": "Jane", "age": 24}),
                json!({"name": "Joe", "age": 25}),
            ],
        )
        .unwrap();

        let expected = dataset.to_vec();
        assert!(lint_dataset(&dataset, &expected).is_empty());
    }

    #[test]
    fn test_lint_dataset_reports_mismatch() {
        let dataset = ArrayDataset::new("empty", Vec::new());
        let expected = vec![json!({"name": "Jane"}).as_object().cloned().unwrap()];

        let failures = lint_dataset(&dataset, &expected);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].lint, "each");
    }

    #[tokio::test]
    async fn test_lint_gateway_reports_unknown_adapter() {
        let registry = AdapterRegistry::new();
        let failures = lint_gateway(&registry, &AdapterId::new("missing"), Vec::new()).await;

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].lint, "setup_from_adapter");
        assert!(failures[0].to_string().contains("missing"));
    }
}
