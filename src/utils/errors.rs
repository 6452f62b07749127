use std::fmt;
use thiserror::Error;

/// Which collaborator a retrieval failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Tickets,
    Backlog,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Tickets => write!(f, "ticket provider"),
            ProviderKind::Backlog => write!(f, "backlog provider"),
        }
    }
}

/// Main error type for pyeol
#[derive(Error, Debug)]
pub enum EolError {
    #[error("Catalog error: {cause:#}")]
    CatalogError { cause: anyhow::Error },

    #[error("Classification error: {cause:#}")]
    ClassificationError { cause: anyhow::Error },

    #[error("Retrieval error ({provider}): {cause:#}")]
    RetrievalError {
        provider: ProviderKind,
        cause: anyhow::Error,
    },

    #[error("Generation error: {cause:#}")]
    GenerationError { cause: anyhow::Error },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl EolError {
    pub fn retrieval(provider: ProviderKind, cause: anyhow::Error) -> Self {
        EolError::RetrievalError { provider, cause }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_error_names_provider() {
        let err = EolError::retrieval(ProviderKind::Backlog, anyhow::anyhow!("403 Forbidden"));
        let message = err.to_string();
        assert!(message.contains("backlog provider"));
        assert!(message.contains("403 Forbidden"));
    }

    #[test]
    fn test_cause_chain_is_rendered() {
        let cause = anyhow::anyhow!("connection refused").context("Failed to reach Ollama");
        let err = EolError::GenerationError { cause };
        assert_eq!(
            err.to_string(),
            "Generation error: Failed to reach Ollama: connection refused"
        );
    }
}
