use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountsConfig {
    /// Hold a per-account lock while refreshing so two rows never exchange the same token twice.
    #[serde(default = "crate::default_true", skip_serializing_if = "crate::skip_if_true")]
    pub serialize_refresh: bool,
    #[serde(
        default,
        deserialize_with = "crate::try_deserialize",
        skip_serializing_if = "crate::skip_if_none"
    )]
    pub locale: Option<Arc<str>>,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            serialize_refresh: true,
            locale: None,
        }
    }
}
