use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Rexster server root, e.g. http://localhost:8182
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Graph name bound into every `/graphs/{graph}` URL
    #[serde(default = "default_graph")]
    pub graph: String,

    /// Extra directory of `*.groovy` scripts registered at startup
    #[serde(default)]
    pub scripts_dir: Option<String>,

    #[serde(default)]
    pub insecure_skip_verify: bool,

    /// tracing EnvFilter directives used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_base_url() -> String {
    "http://localhost:8182".to_string()
}

fn default_graph() -> String {
    "graph".to_string()
}

fn default_log_filter() -> String {
    "rexster_cli=info,rexster_rs=debug,rexster_core=info".to_string()
}

impl ClientConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        tracing::debug!(path, graph = %config.graph, "Loaded client config");
        Ok(config)
    }

    /// Like [`ClientConfig::load`], but `Ok(None)` when the file does not exist.
    ///
    /// Unreadable or malformed files are still errors.
    pub fn load_if_present(path: &str) -> anyhow::Result<Option<Self>> {
        match std::fs::metadata(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            _ => Self::load(path)
                .with_context(|| format!("Failed to load config from {}", path))
                .map(Some),
        }
    }

    pub fn new(base_url: impl Into<String>, graph: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            graph: graph.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            graph: default_graph(),
            scripts_dir: None,
            insecure_skip_verify: false,
            log_filter: default_log_filter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_applies_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"graph": "tinkergraph"}}"#).unwrap();

        let config = ClientConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.graph, "tinkergraph");
        assert_eq!(config.base_url, "http://localhost:8182");
        assert!(config.scripts_dir.is_none());
        assert!(!config.insecure_skip_verify);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(ClientConfig::load("/nonexistent/rexster.json").is_err());
    }

    #[test]
    fn test_load_if_present() {
        assert!(ClientConfig::load_if_present("/nonexistent/rexster.json").unwrap().is_none());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"graph": "titan"}}"#).unwrap();
        let config = ClientConfig::load_if_present(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.map(|c| c.graph), Some("titan".to_string()));
    }

    #[test]
    fn test_load_if_present_rejects_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"graph": "titan",}}"#).unwrap();
        let err = ClientConfig::load_if_present(file.path().to_str().unwrap()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load config"));
    }

    #[test]
    fn test_new_overrides_endpoint() {
        let config = ClientConfig::new("http://rexster:8182", "titan");
        assert_eq!(config.base_url, "http://rexster:8182");
        assert_eq!(config.graph, "titan");
        assert_eq!(config.log_filter, default_log_filter());
    }
}
