use thiserror::Error;

/// Failures which abort an encode or decode run. Anything else (I/O, csv) is carried
/// as plain `anyhow` context and exits with code 1.
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(
        "could not parse {source_name} at line {line}: {reason}
the offending line was:
    `{content}`"
    )]
    Parse {
        source_name: String,
        line: usize,
        content: String,
        reason: String,
    },

    #[error(
        "key `{key}` is not in the map file.
suggestion: have you selected the right column?"
    )]
    KeyNotFound { key: String },

    #[error(
        "could not access column {column} in a row with {width} columns.
the offending row was:
    {row}"
    )]
    ColumnOutOfRange {
        column: usize,
        width: usize,
        row: String,
    },

    #[error(
        "expected one-to-one mapping for `{key}`, found multiple: {candidates}
suggestion: was the map file produced with --deduplicate?"
    )]
    AmbiguousMapping { key: String, candidates: String },
}

impl RenameError {
    /// The process exit code reported for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RenameError::InvalidConfiguration(_) => 1,
            RenameError::Parse { .. } => 2,
            RenameError::KeyNotFound { .. } => 3,
            RenameError::ColumnOutOfRange { .. } => 4,
            RenameError::AmbiguousMapping { .. } => 5,
        }
    }
}

/// Exit code for an arbitrary error chain: the code of the first `RenameError` found,
/// otherwise 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<RenameError>())
        .map_or(1, RenameError::exit_code)
}
