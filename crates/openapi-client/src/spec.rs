//! Typed subset of an OpenAPI 3 document: servers, paths, operations and their parameters.
//! Unknown fields are ignored; `$ref` parameters are skipped.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct OpenApiSpec {
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    parameters: Vec<ParameterOrRef>,
    get: Option<Operation>,
    put: Option<Operation>,
    post: Option<Operation>,
    delete: Option<Operation>,
    patch: Option<Operation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    parameters: Vec<ParameterOrRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ParameterOrRef {
    Parameter(Parameter),
    #[allow(dead_code)]
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
}

impl ParameterOrRef {
    fn as_parameter(&self) -> Option<&Parameter> {
        match self {
            ParameterOrRef::Parameter(p) => Some(p),
            ParameterOrRef::Ref { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Patch,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        };
        f.write_str(s)
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

/// An operation located in the document, with path-level and operation-level
/// parameters merged (operation wins on name clashes).
#[derive(Debug, Clone)]
pub struct OperationRef<'a> {
    pub operation_id: &'a str,
    pub method: HttpMethod,
    pub path: &'a str,
    pub parameters: Vec<&'a Parameter>,
}

impl PathItem {
    fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        [
            (HttpMethod::Get, &self.get),
            (HttpMethod::Put, &self.put),
            (HttpMethod::Post, &self.post),
            (HttpMethod::Delete, &self.delete),
            (HttpMethod::Patch, &self.patch),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}

impl OpenApiSpec {
    /// Parses a YAML or JSON document.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ApiError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Finds the operation whose `operationId` equals `operation_id`.
    pub fn operation(&self, operation_id: &str) -> Option<OperationRef<'_>> {
        self.paths.iter().find_map(|(path, item)| {
            item.operations()
                .find(|(_, op)| op.operation_id.as_deref() == Some(operation_id))
                .map(|(method, op)| {
                    let mut parameters: Vec<&Parameter> = op
                        .parameters
                        .iter()
                        .filter_map(ParameterOrRef::as_parameter)
                        .collect();
                    for shared in item.parameters.iter().filter_map(ParameterOrRef::as_parameter) {
                        if !parameters.iter().any(|p| p.name == shared.name) {
                            parameters.push(shared);
                        }
                    }
                    OperationRef {
                        operation_id: op.operation_id.as_deref().unwrap_or_default(),
                        method,
                        path: path.as_str(),
                        parameters,
                    }
                })
        })
    }

    /// All operation ids declared in the document, in path order.
    pub fn operation_ids(&self) -> Vec<&str> {
        self.paths
            .values()
            .flat_map(|item| item.operations())
            .filter_map(|(_, op)| op.operation_id.as_deref())
            .collect()
    }
}
