use serde::{Deserialize, Serialize};

/// Persisted user preferences. Unknown or missing fields fall back to `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}
