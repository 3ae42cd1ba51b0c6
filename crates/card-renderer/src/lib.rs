//! # Card renderer
//!
//! Renders a JSON card template against a JSON data document (typically the body
//! of a REST response). Strings in the template may contain `${path}` placeholders.
//!
//! ## Rules
//!
//! - A string that is exactly one placeholder becomes the resolved value with its
//!   JSON type kept (`"${age}"` with `age: 3` renders `3`, not `"3"`).
//! - Placeholders embedded in text are interpolated; objects and arrays are written
//!   as compact JSON, `null` as nothing.
//! - Anything that does not resolve renders as the empty string. Data shape never
//!   fails a render; only a malformed template does.
//! - An object with a `"$data": "${items}"` field is a repeat section: inside an
//!   array it is instantiated once per element of `items` and spliced in place;
//!   elsewhere it renders to an array of instantiations. Inside a section, plain
//!   paths are relative to the element, `$root.x` reaches the whole document and
//!   `$index` is the element index. A `$data` value that is not exactly one
//!   placeholder is an ordinary field.
//!
//! ## Usage
//!
//! Bot actions load the card file as text and call [`render_str`] with the HTTP
//! response body; the result is sent as a card attachment.

mod error;
mod path;
mod template;

pub use error::{RenderError, Result};
pub use path::{Path, PathHead, PathStep, Scope};
pub use template::{CardTemplate, REPEAT_KEY};

use serde_json::Value;

/// Renders `template` against `data`. Fails only when the template is malformed.
pub fn render(template: &Value, data: &Value) -> Result<Value> {
    Ok(CardTemplate::from_value(template)?.render(data))
}

/// Text-in, text-out rendering: both inputs are JSON text, the output is compact JSON.
/// Nothing is returned unless the whole render succeeds.
pub fn render_str(template: &str, data: &str) -> Result<String> {
    CardTemplate::parse(template)?.render_str(data)
}
