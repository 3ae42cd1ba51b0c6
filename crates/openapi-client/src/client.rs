//! HTTP invocation of OpenAPI operations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument};
use url::Url;

use crate::error::{ApiError, Result};
use crate::spec::{OpenApiSpec, OperationRef, ParameterLocation};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Parameter groups for one call, as chosen by the planner: `{"path": {..}, "query": {..}, "body": ..}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    #[serde(default)]
    pub path: Map<String, Value>,
    #[serde(default)]
    pub query: Map<String, Value>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub headers: Map<String, Value>,
}

/// Status and raw body of a response. Non-2xx statuses are responses, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// Canonical reason phrase for `status` (e.g. "Not Found").
    pub reason: String,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Invokes a named operation. Implemented by [`OpenApiClient`]; tests substitute their own.
#[async_trait]
pub trait OperationInvoker: Send + Sync {
    async fn invoke(&self, operation_id: &str, request: &OperationRequest) -> Result<ApiResponse>;
}

/// Client for the operations of one OpenAPI document.
#[derive(Clone)]
pub struct OpenApiClient {
    http: reqwest::Client,
    base_url: Url,
    spec: Arc<OpenApiSpec>,
}

impl std::fmt::Debug for OpenApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("operations", &self.spec.operation_ids())
            .finish()
    }
}

impl OpenApiClient {
    /// Uses the first server declared in the document as base URL.
    pub fn new(spec: OpenApiSpec) -> Result<Self> {
        let server = spec.servers.first().ok_or(ApiError::NoServer)?;
        let base_url = Url::parse(&server.url)?;
        Self::with_base_url(spec, base_url)
    }

    pub fn with_base_url(spec: OpenApiSpec, base_url: Url) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url,
            spec: Arc::new(spec),
        })
    }

    /// Loads the document from `path` (YAML or JSON) and uses its first server.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::new(OpenApiSpec::from_file(path)?)
    }

    pub fn spec(&self) -> &OpenApiSpec {
        &self.spec
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the request URL: base URL + path template with `{name}` filled from
    /// `request.path` (each segment percent-encoded) + query pairs.
    pub fn build_url(&self, op: &OperationRef<'_>, request: &OperationRequest) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            for raw in op.path.split('/').filter(|s| !s.is_empty()) {
                segments.push(&fill_segment(raw, op.operation_id, &request.path)?);
            }
        }

        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &request.query {
                match value {
                    Value::Array(items) => {
                        for item in items {
                            pairs.append_pair(name, &param_text(item));
                        }
                    }
                    Value::Null => {}
                    other => {
                        pairs.append_pair(name, &param_text(other));
                    }
                }
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl OperationInvoker for OpenApiClient {
    #[instrument(skip(self, request))]
    async fn invoke(&self, operation_id: &str, request: &OperationRequest) -> Result<ApiResponse> {
        let op = self
            .spec
            .operation(operation_id)
            .ok_or_else(|| ApiError::UnknownOperation(operation_id.to_string()))?;
        check_required(&op, request)?;
        let url = self.build_url(&op, request)?;

        info!(
            operation_id = %operation_id,
            method = %op.method,
            url = %url,
            "OpenAPI operation request"
        );

        let mut builder = self.http.request(op.method.into(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), param_text(value));
        }
        if let Some(body) = request.body.as_ref().filter(|b| !is_empty_body(b)) {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        info!(
            operation_id = %operation_id,
            status = status.as_u16(),
            body_len = body.len(),
            "OpenAPI operation response"
        );

        Ok(ApiResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            body,
        })
    }
}

/// Fails when a declared required query or header parameter is absent or null.
/// Path parameters are checked while the URL is built; cookies are not sent.
fn check_required(op: &OperationRef<'_>, request: &OperationRequest) -> Result<()> {
    for parameter in op.parameters.iter().filter(|p| p.required) {
        let group = match parameter.location {
            ParameterLocation::Query => &request.query,
            ParameterLocation::Header => &request.headers,
            ParameterLocation::Path | ParameterLocation::Cookie => continue,
        };
        if group.get(&parameter.name).map_or(true, Value::is_null) {
            return Err(ApiError::MissingRequiredParameter {
                operation: op.operation_id.to_string(),
                name: parameter.name.clone(),
                location: parameter.location,
            });
        }
    }
    Ok(())
}

/// Replaces every `{name}` in one path segment.
fn fill_segment(raw: &str, operation_id: &str, params: &Map<String, Value>) -> Result<String> {
    let mut out = String::new();
    let mut rest = raw;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        let value = params
            .get(name)
            .filter(|v| !v.is_null())
            .ok_or_else(|| ApiError::MissingPathParameter {
                operation: operation_id.to_string(),
                name: name.to_string(),
            })?;
        out.push_str(&rest[..start]);
        out.push_str(&param_text(value));
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The planner sends `"body": {}` for operations without a body.
fn is_empty_body(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
