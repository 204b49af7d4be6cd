use indexmap::IndexMap;
use reqwest::{Client as HttpClient, Method, Url};
use rexster_core::QueryParameters;
use serde_json::Value;

use crate::{urls, ClientError, Result};

/// A REST call before URL expansion
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub method: Method,
    pub template: &'static str,
    pub url_args: IndexMap<String, String>,
    pub query_args: QueryParameters,
    pub body: Option<Value>,
}

impl RestRequest {
    pub fn new(method: Method, template: &'static str) -> Self {
        Self {
            method,
            template,
            url_args: IndexMap::new(),
            query_args: QueryParameters::new(),
            body: None,
        }
    }

    pub fn url_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.url_args.insert(name.into(), value.into());
        self
    }

    pub fn query_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_args.insert(name.into(), value.into());
        self
    }

    pub fn query_args(mut self, args: QueryParameters) -> Self {
        self.query_args.extend(args);
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Executes REST calls and returns the decoded response body
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: RestRequest) -> Result<Value>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    base_url: Url,
    client: HttpClient,
}

impl HttpTransport {
    pub fn new(base_url: &str, insecure_skip_verify: bool) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        let client = if insecure_skip_verify {
            HttpClient::builder()
                .danger_accept_invalid_certs(true)
                .build()?
        } else {
            HttpClient::new()
        };

        Ok(Self { base_url, client })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, template = request.template))]
    async fn execute(&self, request: RestRequest) -> Result<Value> {
        let url = urls::expand(&self.base_url, request.template, &request.url_args)?;

        let mut builder = self.client.request(request.method, url);
        if !request.query_args.is_empty() {
            builder = builder.query(&request.query_args);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status, %message, "Rexster returned an error");
            return Err(ClientError::Server { status, message });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = RestRequest::new(Method::DELETE, urls::VERTEX)
            .url_arg("vertex_id", "4")
            .query_arg("name", "")
            .query_arg("age", "");
        assert_eq!(req.url_args.get("vertex_id").map(String::as_str), Some("4"));
        let keys: Vec<&str> = req.query_args.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "age"]);
        assert!(req.body.is_none());
    }

    #[test]
    fn test_http_transport_rejects_bad_base() {
        assert!(matches!(
            HttpTransport::new("not a url", false),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(HttpTransport::new("http://localhost:8182", false).is_ok());
    }
}
