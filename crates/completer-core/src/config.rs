//! Construction-time configuration for a completer.

#[derive(Clone, Debug)]
pub struct CompleterConfig {
    pub bind_host: String,
    pub bind_port: u16,
    /// Path segment the external receiver listens under, e.g.
    /// `/completions/`. Always rendered with a leading and trailing slash.
    pub completion_path_prefix: String,
}

impl Default for CompleterConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 11979,
            completion_path_prefix: "/completions/".to_string(),
        }
    }
}

impl CompleterConfig {
    pub(crate) fn normalized_prefix(&self) -> String {
        let trimmed = self.completion_path_prefix.trim_matches('/');
        format!("/{trimmed}")
    }
}
