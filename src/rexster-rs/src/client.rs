use reqwest::Method;
use rexster_core::{ClientConfig, QueryExpression, TypedValue};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

use crate::scripts::{ScriptRegistry, UPSERT_VERTEX};
use crate::transport::{HttpTransport, RestRequest, Transport};
use crate::{urls, ClientError, Direction, Result};

/// Element properties sent as a JSON object
pub type Properties = serde_json::Map<String, Value>;

/// Rexster REST API Client
///
/// Every call resolves to the `results` member of the Rexster response
/// envelope, or `Value::Null` when the server sent none.
pub struct Client {
    graph: String,
    transport: Arc<dyn Transport>,
    scripts: ScriptRegistry,
}

impl Client {
    /// Create a new client for `graph` on the server at `base_url`
    pub fn new(base_url: impl AsRef<str>, graph: impl Into<String>) -> Result<Self> {
        let transport = HttpTransport::new(base_url.as_ref(), false)?;
        Ok(Self::with_transport(graph, Arc::new(transport)))
    }

    /// Create a client from configuration, registering `scripts_dir` if set
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.base_url, config.insecure_skip_verify)?;
        let mut client = Self::with_transport(config.graph.clone(), Arc::new(transport));
        if let Some(dir) = &config.scripts_dir {
            client.refresh_scripts(Path::new(dir))?;
        }
        Ok(client)
    }

    /// Create a client on top of an arbitrary transport
    pub fn with_transport(graph: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            graph: graph.into(),
            transport,
            scripts: ScriptRegistry::with_bundled(),
        }
    }

    pub fn graph(&self) -> &str {
        &self.graph
    }

    pub fn scripts(&self) -> &ScriptRegistry {
        &self.scripts
    }

    /// Load every `*.groovy` file in `dir` into the script registry
    pub fn refresh_scripts(&mut self, dir: &Path) -> Result<usize> {
        self.scripts.refresh_scripts(dir)
    }

    /// Register a single script file under its file stem
    pub fn load_script(&mut self, path: &Path) -> Result<Option<String>> {
        self.scripts.load_script(path)
    }

    async fn send(&self, request: RestRequest) -> Result<Value> {
        let request = request.url_arg("graph", self.graph.clone());
        tracing::debug!(
            method = %request.method,
            template = request.template,
            query_args = request.query_args.len(),
            "Sending Rexster request"
        );

        let body = self.transport.execute(request).await?;
        Ok(match body {
            Value::Object(mut envelope) => envelope.remove("results").unwrap_or(Value::Null),
            _ => Value::Null,
        })
    }

    // ---------------------------------------------------------------- GET

    /// List graphs served by the server
    pub async fn graphs(&self) -> Result<Value> {
        self.send(RestRequest::new(Method::GET, urls::GRAPHS)).await
    }

    /// All vertices, or those whose `key` property equals `value`
    pub async fn vertices(&self, filter: Option<(&str, TypedValue)>) -> Result<Value> {
        self.send(key_value_filter(RestRequest::new(Method::GET, urls::VERTICES), filter))
            .await
    }

    /// Get a vertex by ID
    pub async fn vertex(&self, id: impl AsRef<str>) -> Result<Value> {
        self.send(RestRequest::new(Method::GET, urls::VERTEX).url_arg("vertex_id", id.as_ref()))
            .await
    }

    /// Vertices adjacent to `id` in `direction`
    pub async fn incident(
        &self,
        id: impl AsRef<str>,
        direction: Direction,
        query: impl Into<QueryExpression>,
    ) -> Result<Value> {
        self.neighbors(urls::INCIDENT, id.as_ref(), direction, query.into())
            .await
    }

    pub async fn count_incident(
        &self,
        id: impl AsRef<str>,
        direction: Direction,
        query: impl Into<QueryExpression>,
    ) -> Result<Value> {
        self.neighbors(urls::INCIDENT_COUNT, id.as_ref(), direction, query.into())
            .await
    }

    pub async fn incident_ids(
        &self,
        id: impl AsRef<str>,
        direction: Direction,
        query: impl Into<QueryExpression>,
    ) -> Result<Value> {
        self.neighbors(urls::INCIDENT_IDS, id.as_ref(), direction, query.into())
            .await
    }

    /// Edges incident to `id` in `direction`
    pub async fn adjacent_edges(
        &self,
        id: impl AsRef<str>,
        direction: Direction,
        query: impl Into<QueryExpression>,
    ) -> Result<Value> {
        self.neighbors(urls::ADJACENT_EDGES, id.as_ref(), direction, query.into())
            .await
    }

    /// All edges, or those whose `key` property equals `value`
    pub async fn edges(&self, filter: Option<(&str, TypedValue)>) -> Result<Value> {
        self.send(key_value_filter(RestRequest::new(Method::GET, urls::EDGES), filter))
            .await
    }

    /// Get an edge by ID
    pub async fn edge(&self, id: impl AsRef<str>) -> Result<Value> {
        self.send(RestRequest::new(Method::GET, urls::EDGE).url_arg("edge_id", id.as_ref()))
            .await
    }

    pub async fn indices(&self) -> Result<Value> {
        self.send(RestRequest::new(Method::GET, urls::INDICES)).await
    }

    /// Elements stored in `index` under `key`/`value`
    pub async fn query_index(
        &self,
        index: impl AsRef<str>,
        key: impl AsRef<str>,
        value: impl Into<TypedValue>,
    ) -> Result<Value> {
        self.send(index_lookup(urls::INDEX, index.as_ref(), key.as_ref(), &value.into()))
            .await
    }

    pub async fn query_index_count(
        &self,
        index: impl AsRef<str>,
        key: impl AsRef<str>,
        value: impl Into<TypedValue>,
    ) -> Result<Value> {
        self.send(index_lookup(urls::INDEX_COUNT, index.as_ref(), key.as_ref(), &value.into()))
            .await
    }

    pub async fn keys(&self) -> Result<Value> {
        self.send(RestRequest::new(Method::GET, urls::KEYS)).await
    }

    pub async fn keys_vertex(&self) -> Result<Value> {
        self.send(RestRequest::new(Method::GET, urls::KEYS_VERTEX)).await
    }

    pub async fn keys_edge(&self) -> Result<Value> {
        self.send(RestRequest::new(Method::GET, urls::KEYS_EDGE)).await
    }

    async fn neighbors(
        &self,
        template: &'static str,
        id: &str,
        direction: Direction,
        query: QueryExpression,
    ) -> Result<Value> {
        let request = RestRequest::new(Method::GET, template)
            .url_arg("vertex_id", id)
            .url_arg("direction", direction.as_str())
            .query_args(query.to_query_parameters());
        self.send(request).await
    }

    // --------------------------------------------------------------- POST

    /// Create a vertex with a server-assigned ID
    pub async fn create_vertex(&self, properties: Properties) -> Result<Value> {
        self.send(RestRequest::new(Method::POST, urls::VERTICES).body(Value::Object(properties)))
            .await
    }

    pub async fn create_vertex_with_known_id(&self, id: impl AsRef<str>, properties: Properties) -> Result<Value> {
        self.upsert_vertex(id, properties).await
    }

    /// Create the vertex if missing, otherwise merge `properties` into it
    pub async fn upsert_vertex(&self, id: impl AsRef<str>, properties: Properties) -> Result<Value> {
        let request = RestRequest::new(Method::POST, urls::VERTEX)
            .url_arg("vertex_id", id.as_ref())
            .body(Value::Object(properties));
        self.send(request).await
    }

    pub async fn create_edge(
        &self,
        out_v: impl AsRef<str>,
        in_v: impl AsRef<str>,
        label: impl AsRef<str>,
        properties: Properties,
    ) -> Result<Value> {
        let payload = edge_payload(out_v.as_ref(), in_v.as_ref(), label.as_ref(), properties);
        self.send(RestRequest::new(Method::POST, urls::EDGES).body(payload))
            .await
    }

    pub async fn create_edge_with_known_id(
        &self,
        id: impl AsRef<str>,
        out_v: impl AsRef<str>,
        in_v: impl AsRef<str>,
        label: impl AsRef<str>,
        properties: Properties,
    ) -> Result<Value> {
        let payload = edge_payload(out_v.as_ref(), in_v.as_ref(), label.as_ref(), properties);
        let request = RestRequest::new(Method::POST, urls::EDGE)
            .url_arg("edge_id", id.as_ref())
            .body(payload);
        self.send(request).await
    }

    /// Merge `properties` into an existing edge
    pub async fn update_edge(&self, id: impl AsRef<str>, properties: Properties) -> Result<Value> {
        let request = RestRequest::new(Method::POST, urls::EDGE)
            .url_arg("edge_id", id.as_ref())
            .body(Value::Object(properties));
        self.send(request).await
    }

    /// Create a manual vertex index
    pub async fn create_index(&self, index: impl AsRef<str>, mut params: Properties) -> Result<Value> {
        params.insert("class".to_string(), Value::from("vertex"));
        let request = RestRequest::new(Method::POST, urls::INDEX)
            .url_arg("index_id", index.as_ref())
            .body(Value::Object(params));
        self.send(request).await
    }

    pub async fn create_key_index_vertex(&self, key: impl AsRef<str>) -> Result<Value> {
        self.send(RestRequest::new(Method::POST, urls::KEY_VERTEX).url_arg("key", key.as_ref()))
            .await
    }

    pub async fn create_key_index_edge(&self, key: impl AsRef<str>) -> Result<Value> {
        self.send(RestRequest::new(Method::POST, urls::KEY_EDGE).url_arg("key", key.as_ref()))
            .await
    }

    // ---------------------------------------------------------------- PUT

    /// Replace all properties of a vertex
    pub async fn update_vertex_put(&self, id: impl AsRef<str>, properties: Properties) -> Result<Value> {
        let request = RestRequest::new(Method::PUT, urls::VERTEX)
            .url_arg("vertex_id", id.as_ref())
            .body(Value::Object(properties));
        self.send(request).await
    }

    /// Replace all properties of an edge
    pub async fn update_edge_put(&self, id: impl AsRef<str>, properties: Properties) -> Result<Value> {
        let request = RestRequest::new(Method::PUT, urls::EDGE)
            .url_arg("edge_id", id.as_ref())
            .body(Value::Object(properties));
        self.send(request).await
    }

    /// Add a vertex to a manual index under `key`/`value`
    pub async fn index_vertex(
        &self,
        index: impl AsRef<str>,
        vertex_id: impl AsRef<str>,
        key: impl AsRef<str>,
        value: impl Into<TypedValue>,
    ) -> Result<Value> {
        let payload = json!({
            "id": vertex_id.as_ref(),
            "key": key.as_ref(),
            "value": value.into().to_json(),
        });
        let request = RestRequest::new(Method::PUT, urls::INDEX)
            .url_arg("index_id", index.as_ref())
            .body(payload);
        self.send(request).await
    }

    // ------------------------------------------------------------- DELETE

    pub async fn delete_vertex(&self, id: impl AsRef<str>) -> Result<Value> {
        self.send(RestRequest::new(Method::DELETE, urls::VERTEX).url_arg("vertex_id", id.as_ref()))
            .await
    }

    /// Remove the named properties from a vertex
    pub async fn delete_vertex_properties(&self, id: impl AsRef<str>, keys: &[&str]) -> Result<Value> {
        let request = property_removal(
            RestRequest::new(Method::DELETE, urls::VERTEX).url_arg("vertex_id", id.as_ref()),
            keys,
        );
        self.send(request).await
    }

    pub async fn delete_edge(&self, id: impl AsRef<str>) -> Result<Value> {
        self.send(RestRequest::new(Method::DELETE, urls::EDGE).url_arg("edge_id", id.as_ref()))
            .await
    }

    /// Remove the named properties from an edge
    pub async fn delete_edge_properties(&self, id: impl AsRef<str>, keys: &[&str]) -> Result<Value> {
        let request = property_removal(
            RestRequest::new(Method::DELETE, urls::EDGE).url_arg("edge_id", id.as_ref()),
            keys,
        );
        self.send(request).await
    }

    pub async fn drop_index(&self, index: impl AsRef<str>) -> Result<Value> {
        self.send(RestRequest::new(Method::DELETE, urls::INDEX).url_arg("index_id", index.as_ref()))
            .await
    }

    pub async fn remove_vertex_from_index(
        &self,
        index: impl AsRef<str>,
        vertex_id: impl AsRef<str>,
        key: impl AsRef<str>,
        value: impl Into<TypedValue>,
    ) -> Result<Value> {
        let request = RestRequest::new(Method::DELETE, urls::INDEX)
            .url_arg("index_id", index.as_ref())
            .query_arg("id", vertex_id.as_ref())
            .query_arg("key", key.as_ref())
            .query_arg("value", value.into().encode())
            .query_arg("class", "vertex");
        self.send(request).await
    }

    // ------------------------------------------------------------ Scripts

    /// Run a registered script, or `script` itself as Gremlin code, against the graph
    pub async fn run_script_on_graph(&self, script: &str, params: Properties) -> Result<Value> {
        let code = self.scripts.resolve(script).to_string();
        self.run_gremlin(RestRequest::new(Method::POST, urls::GREMLIN_GRAPH), code, params)
            .await
    }

    pub async fn run_script_on_vertex(
        &self,
        script: &str,
        vertex_id: impl AsRef<str>,
        params: Properties,
    ) -> Result<Value> {
        let code = self.scripts.resolve(script).to_string();
        let request = RestRequest::new(Method::POST, urls::GREMLIN_VERTEX).url_arg("vertex_id", vertex_id.as_ref());
        self.run_gremlin(request, code, params).await
    }

    pub async fn run_script_on_edge(&self, script: &str, edge_id: impl AsRef<str>, params: Properties) -> Result<Value> {
        let code = self.scripts.resolve(script).to_string();
        let request = RestRequest::new(Method::POST, urls::GREMLIN_EDGE).url_arg("edge_id", edge_id.as_ref());
        self.run_gremlin(request, code, params).await
    }

    /// Vertices matching `query`, evaluated server-side through Gremlin
    pub async fn lookup_vertex(&self, query: impl Into<QueryExpression>) -> Result<Value> {
        let query = query.into();
        if query.selects_nothing() {
            return Ok(Value::Array(Vec::new()));
        }
        let script = vertex_lookup_script(&query);
        self.run_gremlin(RestRequest::new(Method::POST, urls::GREMLIN_GRAPH), script, Properties::new())
            .await
    }

    /// First vertex matching `query`, or `Value::Null`
    pub async fn get_unique_vertex(&self, query: impl Into<QueryExpression>) -> Result<Value> {
        match self.lookup_vertex(query).await? {
            Value::Array(items) => Ok(items.into_iter().next().unwrap_or(Value::Null)),
            Value::Null => Ok(Value::Null),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    /// Edges matching `query`, evaluated server-side through Gremlin
    pub async fn lookup_edge(&self, query: impl Into<QueryExpression>) -> Result<Value> {
        let query = query.into();
        if query.selects_nothing() {
            return Ok(Value::Array(Vec::new()));
        }
        let script = edge_lookup_script(&query);
        self.run_gremlin(RestRequest::new(Method::POST, urls::GREMLIN_GRAPH), script, Properties::new())
            .await
    }

    /// Create or update the vertex whose `id_prop` property equals `id_value`
    pub async fn upsert_vertex_custom_id(
        &self,
        id_prop: &str,
        id_value: impl Into<TypedValue>,
        label: Option<&str>,
        properties: Properties,
    ) -> Result<Value> {
        let mut params = Properties::new();
        params.insert("id_prop".to_string(), Value::from(id_prop));
        params.insert("id_value".to_string(), id_value.into().to_json());
        params.insert("label".to_string(), label.map(Value::from).unwrap_or(Value::Null));
        params.insert("properties".to_string(), Value::Object(properties));
        self.run_script_on_graph(UPSERT_VERTEX, params).await
    }

    async fn run_gremlin(&self, request: RestRequest, script: String, params: Properties) -> Result<Value> {
        tracing::debug!(%script, "Running Gremlin script");
        let payload = json!({
            "params": Value::Object(params),
            "script": script,
        });
        self.send(request.body(payload)).await
    }
}

fn key_value_filter(request: RestRequest, filter: Option<(&str, TypedValue)>) -> RestRequest {
    match filter {
        Some((key, value)) => request.query_arg("key", key).query_arg("value", value.encode()),
        None => request,
    }
}

fn index_lookup(template: &'static str, index: &str, key: &str, value: &TypedValue) -> RestRequest {
    RestRequest::new(Method::GET, template)
        .url_arg("index_id", index)
        .query_arg("key", key)
        .query_arg("value", value.encode())
}

fn property_removal(request: RestRequest, keys: &[&str]) -> RestRequest {
    keys.iter().fold(request, |req, key| req.query_arg(*key, ""))
}

fn edge_payload(out_v: &str, in_v: &str, label: &str, properties: Properties) -> Value {
    let mut payload = Properties::new();
    payload.insert("_outV".to_string(), Value::from(out_v));
    payload.insert("_inV".to_string(), Value::from(in_v));
    payload.insert("_label".to_string(), Value::from(label));
    payload.extend(properties);
    Value::Object(payload)
}

/// `g.query().<filters>.vertices()`, or a plain `g.V` scan when only paging is set
fn vertex_lookup_script(query: &QueryExpression) -> String {
    let fragment = query.to_traversal_fragment();
    if query.has_filters() {
        format!("g.query().{}.vertices()", fragment)
    } else {
        format!("g.V{}", fragment)
    }
}

fn edge_lookup_script(query: &QueryExpression) -> String {
    let fragment = query.to_traversal_fragment();
    if query.has_filters() {
        format!("g.E.{}.toList()", fragment)
    } else {
        format!("g.E{}.toList()", fragment)
    }
}
