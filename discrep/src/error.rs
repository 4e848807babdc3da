use thiserror::Error;

/// Errors surfaced by the inspection engine.
///
/// Rule bodies themselves return [`anyhow::Result`]; a failure there is
/// wrapped into [`DiscrepError::RuleExecution`] at the walker boundary.
#[derive(Debug, Error)]
pub enum DiscrepError {
    #[error("rule {rule} failed: {message}")]
    RuleExecution { rule: String, message: String },

    #[error("rule {rule} emitted malformed finding {raw:?}: {reason}")]
    EncodingViolation {
        rule:   String,
        raw:    String,
        reason: String,
    },

    #[error("lookup unavailable for {query:?}: {reason}")]
    LookupUnavailable { query: String, reason: String },

    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("invalid record tree: {0}")]
    InvalidTree(String),

    #[error("unknown rule {0:?}")]
    UnknownRule(String),

    #[error("scan cancelled after {0} records")]
    Cancelled(usize),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DiscrepError {
    pub fn rule_execution<R: ToString, M: ToString>(
        rule: R,
        message: M,
    ) -> Self {
        Self::RuleExecution {
            rule:    rule.to_string(),
            message: message.to_string(),
        }
    }

    pub fn encoding<R: ToString, S: ToString, M: ToString>(
        rule: R,
        raw: S,
        reason: M,
    ) -> Self {
        Self::EncodingViolation {
            rule:   rule.to_string(),
            raw:    raw.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type DiscrepResult<T> = Result<T, DiscrepError>;
