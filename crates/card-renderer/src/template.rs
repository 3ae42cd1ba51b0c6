//! Compiled card templates.
//!
//! A template is compiled once ([`CardTemplate::parse`]) so every placeholder is
//! validated up front; rendering afterwards cannot fail.

use std::borrow::Cow;

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{RenderError, Result};
use crate::path::{Path, Scope};

/// Field that marks an object as a repeat section.
pub const REPEAT_KEY: &str = "$data";

const OPEN: &str = "${";
const CLOSE: char = '}';

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Text(String),
    Placeholder(Path),
}

/// A string from the template, split into literal text and placeholders.
#[derive(Debug, Clone, PartialEq)]
enum TextTemplate {
    Literal(String),
    /// The whole string is one placeholder: the value keeps its JSON type.
    Exact(Path),
    Interpolated(Vec<Part>),
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Value(Value),
    Text(TextTemplate),
    Object(Vec<(TextTemplate, Node)>),
    Array(Vec<Node>),
    Repeat { data: Path, body: Box<Node> },
}

/// A parsed, validated card template. Cheap to share; rendering is pure.
#[derive(Debug, Clone, PartialEq)]
pub struct CardTemplate {
    root: Node,
}

impl CardTemplate {
    /// Parses template text (JSON with `${...}` placeholders inside strings).
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| RenderError::malformed(format!("not valid JSON: {}", e)))?;
        Self::from_value(&value)
    }

    pub fn from_value(template: &Value) -> Result<Self> {
        Ok(Self {
            root: compile(template)?,
        })
    }

    /// Renders against `data`. Misses become empty strings; repeat sections whose
    /// path is not an array expand to nothing.
    pub fn render(&self, data: &Value) -> Value {
        render_node(&self.root, &Scope::root(data))
    }

    /// Parses `data` as JSON, renders, and serializes the result compactly.
    pub fn render_str(&self, data: &str) -> Result<String> {
        let data: Value =
            serde_json::from_str(data).map_err(|e| RenderError::DataMalformed(e.to_string()))?;
        Ok(self.render(&data).to_string())
    }
}

fn compile(value: &Value) -> Result<Node> {
    match value {
        Value::String(s) => Ok(match compile_text(s)? {
            TextTemplate::Literal(s) => Node::Value(Value::String(s)),
            text => Node::Text(text),
        }),
        Value::Array(items) => Ok(Node::Array(
            items.iter().map(compile).collect::<Result<_>>()?,
        )),
        Value::Object(map) => compile_object(map),
        scalar => Ok(Node::Value(scalar.clone())),
    }
}

fn compile_object(map: &Map<String, Value>) -> Result<Node> {
    let mut fields = Vec::with_capacity(map.len());
    let mut repeat = None;
    for (key, value) in map {
        if key == REPEAT_KEY {
            if let Some(path) = repeat_path(value)? {
                repeat = Some(path);
                continue;
            }
        }
        fields.push((compile_text(key)?, compile(value)?));
    }
    let body = Node::Object(fields);
    Ok(match repeat {
        Some(data) => Node::Repeat {
            data,
            body: Box::new(body),
        },
        None => body,
    })
}

/// The repeat path of a `$data` value that is exactly one placeholder. Any other
/// value is an ordinary field.
fn repeat_path(value: &Value) -> Result<Option<Path>> {
    match value {
        Value::String(text) => match compile_text(text)? {
            TextTemplate::Exact(path) => Ok(Some(path)),
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

fn compile_text(s: &str) -> Result<TextTemplate> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(start) = rest.find(OPEN) {
        if start > 0 {
            parts.push(Part::Text(rest[..start].to_string()));
        }
        let after = &rest[start + OPEN.len()..];
        let end = placeholder_end(after).ok_or_else(|| {
            RenderError::malformed(format!("unterminated placeholder in '{}'", s))
        })?;
        parts.push(Part::Placeholder(Path::parse(&after[..end])?));
        rest = &after[end + 1..];
    }
    if !rest.is_empty() {
        parts.push(Part::Text(rest.to_string()));
    }

    Ok(match parts.as_slice() {
        [] => TextTemplate::Literal(String::new()),
        [Part::Text(_)] => TextTemplate::Literal(s.to_string()),
        [Part::Placeholder(path)] => TextTemplate::Exact(path.clone()),
        _ => TextTemplate::Interpolated(parts),
    })
}

/// Byte offset of the `}` closing a placeholder body. Braces inside a quoted
/// bracket key (`['a}b']`) do not count.
fn placeholder_end(body: &str) -> Option<usize> {
    let mut quote = None;
    let mut prev = None;
    for (i, c) in body.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if (c == '\'' || c == '"') && prev == Some('[') => quote = Some(c),
            None if c == CLOSE => return Some(i),
            None => {}
        }
        prev = Some(c);
    }
    None
}

fn render_node(node: &Node, scope: &Scope<'_>) -> Value {
    match node {
        Node::Value(v) => v.clone(),
        Node::Text(text) => render_text_value(text, scope),
        Node::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (key, value) in fields {
                out.insert(render_text(key, scope), render_node(value, scope));
            }
            Value::Object(out)
        }
        Node::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Node::Repeat { data, body } => out.extend(expand(data, body, scope)),
                    other => out.push(render_node(other, scope)),
                }
            }
            Value::Array(out)
        }
        Node::Repeat { data, body } => Value::Array(expand(data, body, scope)),
    }
}

fn expand(data: &Path, body: &Node, scope: &Scope<'_>) -> Vec<Value> {
    let resolved = data.resolve(scope);
    match resolved.as_deref() {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| render_node(body, &scope.enter(item, i)))
            .collect(),
        other => {
            trace!(path = ?data, found = ?other, "repeat path is not an array; section omitted");
            Vec::new()
        }
    }
}

fn render_text_value(text: &TextTemplate, scope: &Scope<'_>) -> Value {
    match text {
        TextTemplate::Exact(path) => match path.resolve(scope) {
            Some(v) => v.into_owned(),
            None => {
                trace!(path = ?path, "placeholder unresolved");
                Value::String(String::new())
            }
        },
        other => Value::String(render_text(other, scope)),
    }
}

fn render_text(text: &TextTemplate, scope: &Scope<'_>) -> String {
    match text {
        TextTemplate::Literal(s) => s.clone(),
        TextTemplate::Exact(path) => path
            .resolve(scope)
            .map(|v| stringify(&v).into_owned())
            .unwrap_or_default(),
        TextTemplate::Interpolated(parts) => {
            let mut out = String::new();
            for part in parts {
                match part {
                    Part::Text(s) => out.push_str(s),
                    Part::Placeholder(path) => {
                        if let Some(v) = path.resolve(scope) {
                            out.push_str(&stringify(&v));
                        }
                    }
                }
            }
            out
        }
    }
}

/// Text form of a value inside surrounding text: strings raw, `null` empty,
/// everything else as compact JSON.
fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_text_classifies_strings() {
        assert_eq!(
            compile_text("plain").unwrap(),
            TextTemplate::Literal("plain".into())
        );
        assert!(matches!(compile_text("${a}").unwrap(), TextTemplate::Exact(_)));
        assert!(matches!(
            compile_text("x ${a} y").unwrap(),
            TextTemplate::Interpolated(ref parts) if parts.len() == 3
        ));
        assert!(matches!(
            compile_text("${a}${b}").unwrap(),
            TextTemplate::Interpolated(ref parts) if parts.len() == 2
        ));
        assert_eq!(compile_text("").unwrap(), TextTemplate::Literal(String::new()));
    }

    #[test]
    fn test_compile_text_rejects_unterminated() {
        assert!(compile_text("Name: ${name").is_err());
        assert!(compile_text("${}").is_err());
        // a lone closing brace is just text
        assert!(compile_text("a } b").is_ok());
        assert!(compile_text("${a${b}}").is_err());
        assert!(compile_text("${a['x}'}").is_err());
    }

    #[test]
    fn test_placeholder_end_skips_quoted_keys() {
        assert_eq!(placeholder_end("a} tail"), Some(1));
        assert_eq!(placeholder_end("a['x}y']} tail"), Some(8));
        assert_eq!(placeholder_end("it's}"), Some(4));
        assert_eq!(placeholder_end("a['x}"), None);
        assert!(matches!(
            compile_text("${a['x}y']}").unwrap(),
            TextTemplate::Exact(ref path) if path.steps().len() == 2
        ));
    }

    #[test]
    fn test_repeat_marker_only_for_exact_placeholder() {
        let repeat = CardTemplate::from_value(&json!([{"$data": "${items}"}])).unwrap();
        assert!(matches!(
            repeat.root,
            Node::Array(ref items) if matches!(items[0], Node::Repeat { .. })
        ));
        for literal in [json!("items"), json!("x ${items}"), json!(3), json!([1, 2])] {
            let template = CardTemplate::from_value(&json!([{ "$data": literal }])).unwrap();
            assert!(matches!(
                template.root,
                Node::Array(ref items) if matches!(items[0], Node::Object(_))
            ));
        }
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!("s")), "s");
        assert_eq!(stringify(&json!(null)), "");
        assert_eq!(stringify(&json!(1.5)), "1.5");
        assert_eq!(stringify(&json!(false)), "false");
        assert_eq!(stringify(&json!({"a": [1]})), r#"{"a":[1]}"#);
    }
}
