//! Plain-text rendition of an Adaptive Card for transports without card support.

use serde_json::Value;

/// Flattens a rendered card into lines of text, in document order.
///
/// - `TextBlock`: its `text`
/// - `FactSet`: one `title: value` line per fact
/// - `Image`: its `url`
/// - `Container` / `Column`: their `items`; `ColumnSet`: its `columns`
/// - card `actions` of type `Action.OpenUrl`: `title: url`
///
/// Unknown element types and empty strings are skipped.
pub fn card_to_text(card: &Value) -> String {
    let mut lines = Vec::new();
    if let Some(body) = card.get("body").and_then(Value::as_array) {
        for element in body {
            element_lines(element, &mut lines);
        }
    }
    if let Some(actions) = card.get("actions").and_then(Value::as_array) {
        for action in actions {
            action_line(action, &mut lines);
        }
    }
    lines.join("\n")
}

fn element_lines(element: &Value, lines: &mut Vec<String>) {
    match element.get("type").and_then(Value::as_str) {
        Some("TextBlock") => push_non_empty(lines, text_of(element, "text")),
        Some("Image") => push_non_empty(lines, text_of(element, "url")),
        Some("FactSet") => {
            for fact in element.get("facts").and_then(Value::as_array).into_iter().flatten() {
                let title = text_of(fact, "title");
                let value = text_of(fact, "value");
                match (title.is_empty(), value.is_empty()) {
                    (true, true) => {}
                    (true, false) => lines.push(value),
                    (false, true) => lines.push(title),
                    (false, false) => lines.push(format!("{}: {}", title, value)),
                }
            }
        }
        Some("Container") | Some("Column") => children(element, "items", lines),
        Some("ColumnSet") => children(element, "columns", lines),
        _ => {}
    }
}

fn children(element: &Value, key: &str, lines: &mut Vec<String>) {
    for child in element.get(key).and_then(Value::as_array).into_iter().flatten() {
        element_lines(child, lines);
    }
}

fn action_line(action: &Value, lines: &mut Vec<String>) {
    if action.get("type").and_then(Value::as_str) != Some("Action.OpenUrl") {
        return;
    }
    let title = text_of(action, "title");
    let url = text_of(action, "url");
    if url.is_empty() {
        return;
    }
    if title.is_empty() {
        lines.push(url);
    } else {
        lines.push(format!("{}: {}", title, url));
    }
}

/// String value of `key`; numbers and booleans are shown as JSON text.
fn text_of(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn push_non_empty(lines: &mut Vec<String>, text: String) {
    if !text.is_empty() {
        lines.push(text);
    }
}
