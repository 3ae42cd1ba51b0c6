//! Property paths used inside `${...}` placeholders.
//!
//! Grammar: dot-separated segments, each a field name, a non-negative index, or `*`.
//! Bracket forms `[0]`, `[*]` and `['key']` may follow any segment without a dot.
//! A leading `$root`, `$data` or `$index` selects the starting point; anything else
//! starts at the current scope. Bare segments may not contain `$`, `{` or `}`; keys
//! holding them are written in the quoted bracket form (`['$schema']`).

use std::borrow::Cow;

use serde_json::Value;

use crate::error::{RenderError, Result};

/// Where path resolution starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathHead {
    /// Current scope: the repeat element inside a `$data` section, otherwise the document.
    Scope,
    /// `$root`: the whole data document.
    Root,
    /// `$index`: zero-based index of the current repeat instantiation.
    Index,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    Index(usize),
    Wildcard,
}

/// A parsed placeholder path such as `tags[0].name` or `$root.owner.id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    head: PathHead,
    steps: Vec<PathStep>,
}

/// Values a path is resolved against.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    root: &'a Value,
    current: &'a Value,
    index: Option<usize>,
}

impl<'a> Scope<'a> {
    /// Top-level scope: the current value is the document itself.
    pub fn root(data: &'a Value) -> Self {
        Self {
            root: data,
            current: data,
            index: None,
        }
    }

    /// Scope for one instantiation of a repeat section.
    pub fn enter<'b>(&self, current: &'b Value, index: usize) -> Scope<'b>
    where
        'a: 'b,
    {
        Scope {
            root: self.root,
            current,
            index: Some(index),
        }
    }
}

impl Path {
    pub fn parse(expr: &str) -> Result<Self> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(RenderError::malformed("empty placeholder"));
        }
        let mut steps = parse_steps(expr)?;
        let reserved = match steps.first() {
            Some(PathStep::Key(k)) => match k.as_str() {
                "$root" => Some(PathHead::Root),
                "$index" => Some(PathHead::Index),
                "$data" => Some(PathHead::Scope),
                _ => None,
            },
            _ => None,
        };
        let head = match reserved {
            Some(head) => {
                steps.remove(0);
                head
            }
            None => PathHead::Scope,
        };
        Ok(Self { head, steps })
    }

    pub fn head(&self) -> PathHead {
        self.head
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Looks the path up in `scope`. `None` is a miss: missing key, index out of
    /// range, indexing into a scalar, or `$index` outside a repeat section.
    pub fn resolve<'a>(&self, scope: &Scope<'a>) -> Option<Cow<'a, Value>> {
        match self.head {
            PathHead::Scope => walk(scope.current, &self.steps),
            PathHead::Root => walk(scope.root, &self.steps),
            PathHead::Index => {
                if !self.steps.is_empty() {
                    return None;
                }
                scope.index.map(|i| Cow::Owned(Value::from(i)))
            }
        }
    }
}

fn walk<'a>(mut value: &'a Value, steps: &[PathStep]) -> Option<Cow<'a, Value>> {
    for (i, step) in steps.iter().enumerate() {
        value = match step {
            PathStep::Key(key) => value.as_object()?.get(key)?,
            PathStep::Index(n) => match value {
                Value::Array(items) => items.get(*n)?,
                Value::Object(map) => map.get(&n.to_string())?,
                _ => return None,
            },
            PathStep::Wildcard => return project(value, &steps[i + 1..]).map(Cow::Owned),
        };
    }
    Some(Cow::Borrowed(value))
}

/// Applies the remaining steps to every child and collects the hits.
fn project(value: &Value, rest: &[PathStep]) -> Option<Value> {
    let hits: Vec<Value> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| walk(v, rest))
            .map(Cow::into_owned)
            .collect(),
        Value::Object(map) => map
            .values()
            .filter_map(|v| walk(v, rest))
            .map(Cow::into_owned)
            .collect(),
        _ => return None,
    };
    Some(Value::Array(hits))
}

fn parse_steps(expr: &str) -> Result<Vec<PathStep>> {
    let mut steps = Vec::new();
    let mut pos = 0;
    // true at the start and right after a '.'
    let mut expect_segment = true;

    while pos < expr.len() {
        let rest = &expr[pos..];
        if let Some(inner) = rest.strip_prefix('[') {
            let close = inner.find(']').ok_or_else(|| {
                RenderError::malformed(format!("unclosed '[' in path '{}'", expr))
            })?;
            steps.push(bracket_step(inner[..close].trim(), expr)?);
            pos += close + 2;
            expect_segment = false;
        } else if rest.starts_with('.') {
            if expect_segment {
                return Err(RenderError::malformed(format!(
                    "empty segment in path '{}'",
                    expr
                )));
            }
            pos += 1;
            expect_segment = true;
        } else {
            if !expect_segment {
                return Err(RenderError::malformed(format!(
                    "missing '.' before '{}' in path '{}'",
                    rest, expr
                )));
            }
            let end = rest.find(|c| c == '.' || c == '[').unwrap_or(rest.len());
            steps.push(name_step(&rest[..end], expr)?);
            pos += end;
            expect_segment = false;
        }
    }

    if expect_segment {
        return Err(RenderError::malformed(format!(
            "path '{}' ends with '.'",
            expr
        )));
    }
    Ok(steps)
}

const RESERVED_HEADS: [&str; 3] = ["$root", "$data", "$index"];

fn name_step(name: &str, expr: &str) -> Result<PathStep> {
    let bad_char = |c: char| matches!(c, ']' | '$' | '{' | '}') || c.is_whitespace();
    if name.contains(bad_char) && !RESERVED_HEADS.contains(&name) {
        return Err(RenderError::malformed(format!(
            "invalid segment '{}' in path '{}'",
            name, expr
        )));
    }
    if name == "*" {
        return Ok(PathStep::Wildcard);
    }
    if name.bytes().all(|b| b.is_ascii_digit()) {
        return parse_index(name, expr);
    }
    Ok(PathStep::Key(name.to_string()))
}

fn bracket_step(inner: &str, expr: &str) -> Result<PathStep> {
    if inner == "*" {
        return Ok(PathStep::Wildcard);
    }
    for quote in ['\'', '"'] {
        if inner.len() >= 2 && inner.starts_with(quote) && inner.ends_with(quote) {
            return Ok(PathStep::Key(inner[1..inner.len() - 1].to_string()));
        }
    }
    if !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()) {
        return parse_index(inner, expr);
    }
    Err(RenderError::malformed(format!(
        "invalid index '[{}]' in path '{}'",
        inner, expr
    )))
}

fn parse_index(digits: &str, expr: &str) -> Result<PathStep> {
    digits.parse().map(PathStep::Index).map_err(|_| {
        RenderError::malformed(format!("index '{}' out of range in path '{}'", digits, expr))
    })
}
