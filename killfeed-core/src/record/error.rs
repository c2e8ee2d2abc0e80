use thiserror::Error;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ParseError {
    #[error("record has {found} fields, expected at least {expected}")]
    ShortRecord { found: usize, expected: usize },

    #[error("record does not start with a valid timestamp: {value:?}")]
    BadTimestamp { value: String },

    #[error("record has no {role} identifier")]
    MissingIdentifier { role: &'static str },
}

impl ParseError {
    /// Stable label used when counting failures.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::ShortRecord { .. } => "short-record",
            ParseError::BadTimestamp { .. } => "bad-timestamp",
            ParseError::MissingIdentifier { .. } => "missing-identifier",
        }
    }
}
