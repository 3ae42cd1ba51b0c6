//! Actions the planner can choose, and the registry that maps action names to them.

mod api_card;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use dbot_core::Message;
use openapi_client::{OpenApiSpec, OperationRequest};
use prompt::ActionDefinition;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::context::AppContext;

pub use api_card::{ApiCardAction, ACTION_SUCCESS};

/// Parameter groups of a planned action: `{"path": {..}, "body": .., "query": {..}}`.
/// Every group is optional; a group of the wrong JSON type is an error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActionParameters {
    #[serde(default)]
    pub path: Map<String, Value>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub query: Map<String, Value>,
}

impl ActionParameters {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).context("Action parameters do not match {path, body, query}")
    }

    pub fn into_request(self) -> OperationRequest {
        OperationRequest {
            path: self.path,
            query: self.query,
            body: self.body,
            headers: Map::new(),
        }
    }
}

/// Something the bot can do on the planner's behalf. Returns a short status for logs.
#[async_trait]
pub trait Action: Send + Sync {
    async fn run(
        &self,
        ctx: &AppContext,
        message: &Message,
        parameters: ActionParameters,
    ) -> Result<String>;
}

/// Actions by name.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `action` under `name`, replacing any earlier one.
    pub fn register(&mut self, name: impl Into<String>, action: Arc<dyn Action>) {
        self.actions.insert(name.into(), action);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// One [`ApiCardAction`] per declared action whose name is an operationId of `spec`,
    /// rendering `<cards_dir>/<name>.json`. Declared actions without an operation are
    /// skipped with a warning.
    pub fn for_operations(
        definitions: &[ActionDefinition],
        spec: &OpenApiSpec,
        cards_dir: &Path,
    ) -> Self {
        let mut registry = Self::new();
        for definition in definitions {
            let name = definition.name.as_str();
            if spec.operation(name).is_none() {
                warn!(action = %name, "Declared action has no matching operationId, skipped");
                continue;
            }
            let card = cards_dir.join(format!("{}.json", name));
            registry.register(name, Arc::new(ApiCardAction::new(name, card)));
        }
        info!(actions = ?registry.names(), "Action registry built");
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameters_groups_default_to_empty() {
        let params = ActionParameters::from_value(json!({"path": {"petId": 1}})).unwrap();
        assert_eq!(params.path["petId"], 1);
        assert!(params.query.is_empty());
        assert_eq!(params.body, None);

        let request = params.into_request();
        assert_eq!(request.path["petId"], 1);
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_parameters_reject_wrong_group_type() {
        assert!(ActionParameters::from_value(json!({"path": "petId=1"})).is_err());
        assert_eq!(
            ActionParameters::from_value(json!({})).unwrap(),
            ActionParameters::default()
        );
    }

    #[test]
    fn test_for_operations_skips_unknown_actions() {
        let spec = OpenApiSpec::parse(
            r#"
servers: [{url: "https://petstore3.swagger.io/api/v3"}]
paths:
  /pet/{petId}:
    get:
      operationId: getPetById
"#,
        )
        .unwrap();
        let definitions: Vec<ActionDefinition> = serde_json::from_value(json!([
            {"name": "getPetById"},
            {"name": "adoptPet"}
        ]))
        .unwrap();

        let registry = ActionRegistry::for_operations(&definitions, &spec, Path::new("cards"));

        assert_eq!(registry.names(), vec!["getPetById"]);
        assert!(registry.get("adoptPet").is_none());
    }
}
