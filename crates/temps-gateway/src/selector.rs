use crate::adapter::AdapterId;
use crate::gateway::Gateway;
use std::fmt;
use std::sync::Arc;

/// What `setup` is asked to resolve
#[derive(Clone)]
pub enum Selector {
    /// Bare connection string such as `memory://localhost/test`; always rejected
    Uri(String),
    /// Registered (or loadable) adapter identifier
    Adapter(AdapterId),
    /// Already constructed gateway, returned as is
    Instance(Arc<dyn Gateway>),
}

impl Selector {
    pub fn adapter(adapter: impl Into<AdapterId>) -> Self {
        Selector::Adapter(adapter.into())
    }

    pub fn instance<G: Gateway>(gateway: Arc<G>) -> Self {
        Selector::Instance(gateway)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Uri(_) => write!(f, "Uri(<redacted>)"),
            Selector::Adapter(id) => f.debug_tuple("Adapter").field(id).finish(),
            Selector::Instance(gateway) => f
                .debug_tuple("Instance")
                .field(&gateway.type_name())
                .finish(),
        }
    }
}

impl From<&str> for Selector {
    fn from(uri: &str) -> Self {
        Selector::Uri(uri.to_string())
    }
}

impl From<String> for Selector {
    fn from(uri: String) -> Self {
        Selector::Uri(uri)
    }
}

impl From<AdapterId> for Selector {
    fn from(adapter: AdapterId) -> Self {
        Selector::Adapter(adapter)
    }
}

impl From<&AdapterId> for Selector {
    fn from(adapter: &AdapterId) -> Self {
        Selector::Adapter(adapter.clone())
    }
}

impl From<Arc<dyn Gateway>> for Selector {
    fn from(gateway: Arc<dyn Gateway>) -> Self {
        Selector::Instance(gateway)
    }
}

impl From<&Arc<dyn Gateway>> for Selector {
    fn from(gateway: &Arc<dyn Gateway>) -> Self {
        Selector::Instance(gateway.clone())
    }
}
