use thiserror::Error;

/// Errors surfaced by rendering. Data that does not match the template never
/// produces one of these; only a broken template (or unparsable data text) does.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Template malformed: {reason}")]
    TemplateMalformed { reason: String },

    #[error("Data is not valid JSON: {0}")]
    DataMalformed(String),
}

impl RenderError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        RenderError::TemplateMalformed {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
