//! Prompt folder loading and `{{variable}}` rendering.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::ChatMessage;

const PROMPT_FILE: &str = "skprompt.txt";
const CONFIG_FILE: &str = "config.json";
const ACTIONS_FILE: &str = "actions.json";

/// Values substituted into `{{name}}` slots.
pub type PromptVariables = HashMap<String, String>;

/// One action (function) the model may choose. `parameters` is a JSON Schema object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_object_schema")]
    pub parameters: Value,
}

fn empty_object_schema() -> Value {
    serde_json::json!({"type": "object", "properties": {}})
}

/// Completion settings from `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompletionConfig {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PromptConfig {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completion: CompletionConfig,
}

/// A loaded prompt folder.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub name: String,
    pub template: String,
    pub config: PromptConfig,
    pub actions: Vec<ActionDefinition>,
}

/// Reads prompt folders below one root directory.
#[derive(Debug, Clone)]
pub struct PromptManager {
    folder: PathBuf,
}

impl PromptManager {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn prompt_dir(&self, name: &str) -> PathBuf {
        self.folder.join(name)
    }

    /// Path of the prompt's `actions.json` (may not exist).
    pub fn actions_path(&self, name: &str) -> PathBuf {
        self.prompt_dir(name).join(ACTIONS_FILE)
    }

    /// Loads `<folder>/<name>/`. `skprompt.txt` is required; `config.json` and
    /// `actions.json` default to empty when absent.
    pub fn load(&self, name: &str) -> Result<Prompt> {
        let dir = self.prompt_dir(name);
        let template_path = dir.join(PROMPT_FILE);
        let template = fs::read_to_string(&template_path)
            .with_context(|| format!("Failed to read prompt {}", template_path.display()))?;

        let config_path = dir.join(CONFIG_FILE);
        let config: PromptConfig = match read_optional(&config_path)? {
            Some(text) => serde_json::from_str(&text)
                .with_context(|| format!("Invalid prompt config {}", config_path.display()))?,
            None => PromptConfig::default(),
        };

        let actions_path = dir.join(ACTIONS_FILE);
        let actions: Vec<ActionDefinition> = match read_optional(&actions_path)? {
            Some(text) => serde_json::from_str(&text)
                .with_context(|| format!("Invalid actions file {}", actions_path.display()))?,
            None => Vec::new(),
        };

        debug!(
            prompt = %name,
            template_len = template.len(),
            actions = actions.len(),
            "Prompt loaded"
        );

        Ok(Prompt {
            name: name.to_string(),
            template,
            config,
            actions,
        })
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

impl Prompt {
    /// Substitutes `{{name}}` and `{{$name}}` slots. Unknown names render empty;
    /// an unclosed `{{` is kept as text.
    pub fn render(&self, variables: &PromptVariables) -> String {
        render_template(&self.template, variables)
    }

    /// System message (rendered prompt) followed by the user's input.
    pub fn messages(&self, variables: &PromptVariables, input: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.render(variables)),
            ChatMessage::user(input),
        ]
    }

    pub fn action(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.iter().find(|a| a.name == name)
    }
}

fn render_template(template: &str, variables: &PromptVariables) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);
        let name = rest[start + 2..start + 2 + len].trim();
        let name = name.strip_prefix('$').unwrap_or(name);
        if let Some(value) = variables.get(name) {
            out.push_str(value);
        }
        rest = &rest[start + 2 + len + 2..];
    }
    out.push_str(rest);
    out
}
