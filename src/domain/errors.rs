use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// The retrieval index failed to build or load. Recovered locally by
    /// returning an empty grounding context, never shown to the end user.
    #[error("Knowledge base unavailable: {0}")]
    KnowledgeBaseUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// The language-model call failed (network, auth, rate limit).
    /// Surfaced verbatim to the caller.
    #[error("External service error: {0}")]
    ExternalService(String),
}

impl DomainError {
    pub fn kb_unavailable(msg: impl Into<String>) -> Self {
        Self::KnowledgeBaseUnavailable(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
