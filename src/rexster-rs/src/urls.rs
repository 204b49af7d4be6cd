//! REST URL templates for the Rexster API.
//!
//! Placeholders are written `{name}` and may share a path segment with
//! literal text (`{direction}Count`).

use indexmap::IndexMap;
use reqwest::Url;

use crate::{ClientError, Result};

pub const GRAPHS: &str = "/graphs";
pub const GRAPH: &str = "/graphs/{graph}";
pub const VERTICES: &str = "/graphs/{graph}/vertices";
pub const VERTEX: &str = "/graphs/{graph}/vertices/{vertex_id}";
pub const INCIDENT: &str = "/graphs/{graph}/vertices/{vertex_id}/{direction}";
pub const INCIDENT_COUNT: &str = "/graphs/{graph}/vertices/{vertex_id}/{direction}Count";
pub const INCIDENT_IDS: &str = "/graphs/{graph}/vertices/{vertex_id}/{direction}Ids";
pub const ADJACENT_EDGES: &str = "/graphs/{graph}/vertices/{vertex_id}/{direction}E";
pub const EDGES: &str = "/graphs/{graph}/edges";
pub const EDGE: &str = "/graphs/{graph}/edges/{edge_id}";
pub const INDICES: &str = "/graphs/{graph}/indices";
pub const INDEX: &str = "/graphs/{graph}/indices/{index_id}";
pub const INDEX_COUNT: &str = "/graphs/{graph}/indices/{index_id}/count";
pub const KEYS: &str = "/graphs/{graph}/keyindices";
pub const KEYS_VERTEX: &str = "/graphs/{graph}/keyindices/vertex";
pub const KEYS_EDGE: &str = "/graphs/{graph}/keyindices/edge";
pub const KEY_VERTEX: &str = "/graphs/{graph}/keyindices/vertex/{key}";
pub const KEY_EDGE: &str = "/graphs/{graph}/keyindices/edge/{key}";
pub const GREMLIN_GRAPH: &str = "/graphs/{graph}/tp/gremlin";
pub const GREMLIN_VERTEX: &str = "/graphs/{graph}/vertices/{vertex_id}/tp/gremlin";
pub const GREMLIN_EDGE: &str = "/graphs/{graph}/edges/{edge_id}/tp/gremlin";

/// Substitute `args` into `template` and append the result to `base`.
///
/// Every substituted segment is percent-encoded, so ids containing `/` or
/// `?` stay inside their segment.
pub fn expand(base: &Url, template: &str, args: &IndexMap<String, String>) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(base.to_string()))?;
        segments.pop_if_empty();
        for raw in template.trim_start_matches('/').split('/') {
            segments.push(&substitute(raw, args)?);
        }
    }
    Ok(url)
}

fn substitute(segment: &str, args: &IndexMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| ClientError::InvalidUrl(format!("unterminated placeholder in {}", segment)))?;
        let name = &after[..close];
        let value = args
            .get(name)
            .ok_or_else(|| ClientError::MissingUrlArgument(name.to_string()))?;
        out.push_str(value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_expand_simple() {
        let base = Url::parse("http://localhost:8182").unwrap();
        let url = expand(&base, VERTEX, &args(&[("graph", "tinkergraph"), ("vertex_id", "1")])).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8182/graphs/tinkergraph/vertices/1");
    }

    #[test]
    fn test_expand_mixed_segment() {
        let base = Url::parse("http://localhost:8182/").unwrap();
        let url = expand(
            &base,
            INCIDENT_COUNT,
            &args(&[("graph", "g"), ("vertex_id", "7"), ("direction", "out")]),
        )
        .unwrap();
        assert_eq!(url.path(), "/graphs/g/vertices/7/outCount");
    }

    #[test]
    fn test_expand_keeps_base_path() {
        let base = Url::parse("http://proxy/rexster/").unwrap();
        let url = expand(&base, GRAPHS, &IndexMap::new()).unwrap();
        assert_eq!(url.as_str(), "http://proxy/rexster/graphs");
    }

    #[test]
    fn test_expand_encodes_values() {
        let base = Url::parse("http://localhost:8182").unwrap();
        let url = expand(&base, EDGE, &args(&[("graph", "g"), ("edge_id", "a/b c")])).unwrap();
        assert_eq!(url.path(), "/graphs/g/edges/a%2Fb%20c");
    }

    #[test]
    fn test_expand_missing_argument() {
        let base = Url::parse("http://localhost:8182").unwrap();
        let err = expand(&base, VERTEX, &args(&[("graph", "g")])).unwrap_err();
        assert!(matches!(err, ClientError::MissingUrlArgument(ref name) if name == "vertex_id"));
    }

    #[test]
    fn test_expand_rejects_non_base_url() {
        let base = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(
            expand(&base, GRAPHS, &IndexMap::new()),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
