//! Request manager configuration.

/// Configuration for the request manager.
#[derive(Debug, Clone)]
pub struct RequestManagerConfig {
    /// Length of the random suffix appended to new request names
    /// (default: 5).
    pub name_suffix_length: usize,
    /// Longest Certificate name kept as the request name base before
    /// shortening (default: 52).
    pub max_base_name_length: usize,
    /// Namespace used for keys that carry only a name.
    pub default_namespace: String,
}

impl Default for RequestManagerConfig {
    fn default() -> Self {
        Self {
            name_suffix_length: 5,
            max_base_name_length: 52,
            default_namespace: "default".into(),
        }
    }
}
