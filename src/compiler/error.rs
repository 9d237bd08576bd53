use thiserror::Error;

/// The ways a parse can fail.
///
/// Alternatives inside the grammar fail silently (the cursor is restored and
/// the next alternative is tried); only the conditions below escalate into an
/// error returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No statement matched the input, or the input was not fully consumed.
    #[error("expression could not be parsed as a statement")]
    ParsingFailed,
    /// An opening brace was consumed but the enclosed statement failed to parse.
    #[error("opening brace is not followed by a valid statement")]
    InvalidStatement,
    /// A statement inside braces parsed but its closing brace is missing.
    #[error("statement inside braces is missing its closing brace")]
    UnmatchedBraces,
    /// Input to the variable entry point was not exactly one identifier, or
    /// the identifier collides with a known operator name.
    #[error("`{name}` is not a valid variable name")]
    InvalidVariableName { name: String },
}
