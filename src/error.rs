use thiserror::Error;

/// Boxed error used at the provider and catalog seams
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while producing recommendations
#[derive(Error, Debug)]
pub enum RecommendError {
    /// Network or HTTP failure talking to an upstream service
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Every completion candidate failed; carries the last candidate's error text
    #[error("{0}")]
    ExhaustedCandidates(String),

    /// None of the extraction tiers recovered a recommendation
    #[error("The model did not produce usable suggestions")]
    UnrecoverableParse,

    /// Catalog lookup failed
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Caller supplied unusable input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// History store read/write failure
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl RecommendError {
    /// Message suitable for showing directly to the end user.
    pub fn user_message(&self) -> String {
        match self {
            RecommendError::UnrecoverableParse => {
                "AI uygun öneri üretemedi. Lütfen farklı seçimlerle tekrar deneyin.".to_string()
            }
            RecommendError::ExhaustedCandidates(last) if last.is_empty() => {
                "Tüm modeller başarısız oldu".to_string()
            }
            other => other.to_string(),
        }
    }
}
