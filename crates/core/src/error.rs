use crate::template::TemplateError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown content type: {0}")]
    UnknownContentType(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Internal error: {0}")]
    Internal(String),
}
