//! Named Gremlin scripts sent to the `tp/gremlin` extension.

use std::collections::HashMap;
use std::path::Path;

use crate::Result;

/// Name of the bundled script behind `Client::upsert_vertex_custom_id`
pub const UPSERT_VERTEX: &str = "upsert_vertex";

const UPSERT_VERTEX_SOURCE: &str = include_str!("../scripts/upsert_vertex.groovy");

/// Script sources keyed by name (file stem)
#[derive(Debug, Clone, Default)]
pub struct ScriptRegistry {
    scripts: HashMap<String, String>,
}

impl ScriptRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the scripts shipped with the crate
    pub fn with_bundled() -> Self {
        let mut registry = Self::new();
        registry.register(UPSERT_VERTEX, UPSERT_VERTEX_SOURCE);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.scripts.insert(name.into(), source.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).map(String::as_str)
    }

    /// Registered source for `name_or_code`, or the input itself as code
    pub fn resolve<'a>(&'a self, name_or_code: &'a str) -> &'a str {
        self.get(name_or_code).unwrap_or(name_or_code)
    }

    /// Register the file under its stem. Paths that are not files are
    /// skipped and yield `None`.
    pub fn load_script(&mut self, path: &Path) -> Result<Option<String>> {
        if !path.is_file() {
            return Ok(None);
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            return Ok(None);
        };
        let source = std::fs::read_to_string(path)?;
        tracing::debug!(script = name, path = %path.display(), "Loaded Gremlin script");
        self.register(name, source);
        Ok(Some(name.to_string()))
    }

    /// Load every `*.groovy` file in `dir`, returning how many were loaded
    pub fn refresh_scripts(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Ok(0);
        }
        let mut loaded = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("groovy") {
                continue;
            }
            if self.load_script(&path)?.is_some() {
                loaded += 1;
            }
        }
        tracing::info!(dir = %dir.display(), loaded, "Refreshed Gremlin scripts");
        Ok(loaded)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_upsert_script() {
        let registry = ScriptRegistry::with_bundled();
        let source = registry.get(UPSERT_VERTEX).unwrap();
        assert!(source.contains("id_prop"));
        assert!(source.contains("properties"));
    }

    #[test]
    fn test_resolve_falls_back_to_code() {
        let mut registry = ScriptRegistry::new();
        registry.register("count", "g.V.count()");
        assert_eq!(registry.resolve("count"), "g.V.count()");
        assert_eq!(registry.resolve("g.E.count()"), "g.E.count()");
    }

    #[test]
    fn test_refresh_scripts_loads_groovy_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("friends.groovy"), "g.v(id).out('knows')").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("nested.groovy")).unwrap();

        let mut registry = ScriptRegistry::new();
        let loaded = registry.refresh_scripts(dir.path()).unwrap();

        assert_eq!(loaded, 1);
        assert_eq!(registry.get("friends"), Some("g.v(id).out('knows')"));
        assert!(registry.get("notes").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_paths_are_skipped() {
        let mut registry = ScriptRegistry::new();
        assert_eq!(registry.refresh_scripts(Path::new("/nonexistent/scripts")).unwrap(), 0);
        assert_eq!(registry.load_script(Path::new("/nonexistent/a.groovy")).unwrap(), None);
        assert!(registry.is_empty());
    }
}
