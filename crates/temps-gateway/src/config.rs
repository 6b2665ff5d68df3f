//! Declarative gateway setup
//!
//! ```yaml
//! gateways:
//!   default:
//!     adapter: memory
//!     args:
//!       - users:
//!           - { name: Jane, age: 24 }
//!   archive:
//!     adapter: memory
//! ```

use crate::adapter::{AdapterId, Args};
use crate::error::{GatewayError, Result};
use crate::gateway::Gateway;
use crate::registry::AdapterRegistry;
use crate::selector::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name of the gateway used when none is specified
pub const DEFAULT_GATEWAY: &str = "default";

/// One named gateway
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Adapter identifier to resolve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<AdapterId>,
    /// Retired connection-string form; rejected when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Positional constructor arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Args,
}

impl GatewayConfig {
    pub fn new(adapter: impl Into<AdapterId>) -> Self {
        Self {
            adapter: Some(adapter.into()),
            ..Default::default()
        }
    }

    pub fn with_arg(mut self, arg: serde_json::Value) -> Self {
        self.args.push(arg);
        self
    }

    /// Selector this entry resolves through
    pub fn selector(&self) -> Result<Selector> {
        match (&self.uri, &self.adapter) {
            (Some(uri), _) => Ok(Selector::Uri(uri.clone())),
            (None, Some(adapter)) => Ok(Selector::Adapter(adapter.clone())),
            (None, None) => Err(GatewayError::configuration(
                "gateway entry must name an adapter",
            )),
        }
    }
}

/// Named gateways to set up together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewaysConfig {
    #[serde(default)]
    pub gateways: BTreeMap<String, GatewayConfig>,
}

impl GatewaysConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gateway(mut self, name: impl Into<String>, config: GatewayConfig) -> Self {
        self.gateways.insert(name.into(), config);
        self
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        serde_yaml::from_str(input)
            .map_err(|e| GatewayError::configuration(format!("invalid gateway YAML: {}", e)))
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| GatewayError::configuration(format!("invalid gateway JSON: {}", e)))
    }
}

/// Gateways built from a [`GatewaysConfig`]
#[derive(Clone, Default)]
pub struct GatewaySet {
    gateways: BTreeMap<String, Arc<dyn Gateway>>,
}

impl GatewaySet {
    /// Set up every configured gateway
    ///
    /// If any entry fails, the gateways already built are disconnected before
    /// the error is returned.
    pub async fn setup(registry: &AdapterRegistry, config: &GatewaysConfig) -> Result<Self> {
        let mut set = GatewaySet::default();

        for (name, entry) in &config.gateways {
            let built = match entry.selector() {
                Ok(selector) => registry.setup(selector, entry.args.clone()).await,
                Err(e) => Err(e),
            };

            match built {
                Ok(gateway) => {
                    debug!("Gateway {} ready ({})", name, gateway.type_name());
                    set.gateways.insert(name.clone(), gateway);
                }
                Err(e) => {
                    warn!("Failed to set up gateway {}: {}", name, e);
                    if let Err(cleanup) = set.disconnect_all().await {
                        warn!("Failed to disconnect gateways after setup error: {}", cleanup);
                    }
                    return Err(e);
                }
            }
        }

        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Gateway>> {
        self.gateways.get(name).cloned()
    }

    /// Gateway named [`DEFAULT_GATEWAY`]
    pub fn default_gateway(&self) -> Option<Arc<dyn Gateway>> {
        self.get(DEFAULT_GATEWAY)
    }

    pub fn names(&self) -> Vec<String> {
        self.gateways.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.gateways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gateways.is_empty()
    }

    /// Disconnect every gateway, returning the first error after trying all
    pub async fn disconnect_all(&self) -> Result<()> {
        let mut first_error = None;

        for (name, gateway) in &self.gateways {
            debug!("Disconnecting gateway {}", name);
            if let Err(e) = gateway.disconnect().await {
                warn!("Failed to disconnect gateway {}: {}", name, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gateways_config_from_yaml() {
        let config = GatewaysConfig::from_yaml_str(
            r#"
gateways:
  default:
    adapter: memory
    args:
      - users:
          - { name: Jane, age: 24 }
  archive:
    adapter: memory
"#,
        )
        .unwrap();

        assert_eq!(config.gateways.len(), 2);
        let default = &config.gateways["default"];
        assert_eq!(default.adapter, Some(AdapterId::new("memory")));
        assert_eq!(
            default.args,
            vec![json!({"users": [{"name": "Jane", "age": 24}]})]
        );
        assert!(config.gateways["archive"].args.is_empty());
    }

    #[test]
    fn test_gateways_config_from_json() {
        let config = GatewaysConfig::from_json_value(json!({
            "gateways": {"default": {"adapter": "memory"}}
        }))
        .unwrap();
        assert_eq!(
            config,
            GatewaysConfig::new().with_gateway("default", GatewayConfig::new("memory"))
        );
    }

    #[test]
    fn test_invalid_yaml_is_configuration_error() {
        let err = GatewaysConfig::from_yaml_str("gateways: [1, 2").unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[test]
    fn test_selector_from_entry() {
        assert!(matches!(
            GatewayConfig::new("memory").selector(),
            Ok(Selector::Adapter(_))
        ));

        let legacy = GatewayConfig {
            uri: Some("memory://localhost/test".to_string()),
            ..Default::default()
        };
        assert!(matches!(legacy.selector(), Ok(Selector::Uri(_))));

        assert!(matches!(
            GatewayConfig::default().selector(),
            Err(GatewayError::Configuration(_))
        ));
    }
}
