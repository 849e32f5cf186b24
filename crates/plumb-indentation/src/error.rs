use plumb_decree_abi::TokenKind;

/// Wiring errors: the engine was asked to do something it cannot classify.
///
/// Indentation mismatches are never errors; they are reported as violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndentationError {
    #[error("{0}")]
    InvalidArgument(String),
}

impl IndentationError {
    pub(crate) fn unhandled(kind: TokenKind) -> Self {
        Self::InvalidArgument(format!("unhandled node kind: {kind}"))
    }

    pub(crate) fn unexpected_token(text: &str) -> Self {
        Self::InvalidArgument(format!("Unexpected token type: {text}"))
    }
}
