//! Error taxonomy for the whole pipeline.
//!
//! Deep code returns one of these kinds via `?`; the facade (`crate::facade`)
//! is the only place that catches them and turns them into tagged DTOs. See
//! spec section 7 for the full propagation contract.

use std::fmt;

use thiserror::Error;

/// A single line/file location, attached to validation and parse errors so
/// the user can find the offending input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Top-level error kind. Every fallible core operation returns this (or a
/// type that converts into it at the facade boundary).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("logic error: {0}")]
    Logic(String),

    #[error("formatter missing for {kind:?}/{format:?}")]
    FormatterMissing { kind: String, format: String },

    #[error("runtime dependency missing: {0}")]
    RuntimeDependencyMissing(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl CoreError {
    /// Exit code per spec section 6.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::InvalidArguments(_) => 3,
            CoreError::Database(_) => 4,
            CoreError::Io(_) => 5,
            CoreError::Logic(_) => 6,
            CoreError::Config(_) => 7,
            CoreError::RuntimeDependencyMissing(_) => 8,
            CoreError::FormatterMissing { .. } => 7,
            CoreError::Unknown(_) => 1,
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io(err.to_string())
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Io(format!("JSON error: {err}"))
    }
}

/// Errors from calendar arithmetic (C1). Kept distinct from `CoreError`
/// because date math is pure and total over its own input space; callers
/// convert at the boundary with `?` via `From`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidDate {
    #[error("invalid date: '{0}'")]
    Malformed(String),
}

impl From<InvalidDate> for CoreError {
    fn from(err: InvalidDate) -> Self {
        CoreError::InvalidArguments(err.to_string())
    }
}

/// A single issue produced by a validator (source or output). Validators
/// never fail with `Result::Err`; they accumulate these and report
/// `ok = false`, per spec sections 4.3 and 4.5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub line_number: Option<usize>,
    pub message: String,
    pub kind: ValidationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    FileAccess,
    Structural,
    Logical,
    /// Reported but never fails the check: `ValidationReport::ok()` ignores
    /// issues of this kind (spec section 4.5, the 16-hour duration cap).
    Warning,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_number {
            Some(line) => write!(f, "[{:?}] line {}: {}", self.kind, line, self.message),
            None => write!(f, "[{:?}] {}", self.kind, self.message),
        }
    }
}

/// Result of a validation pass: never an `Err`, always a full account of
/// what was found.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        if !self.issues.contains(&issue) {
            self.issues.push(issue);
        }
    }

    pub fn extend(&mut self, other: ValidationReport) {
        for issue in other.issues {
            self.push(issue);
        }
    }

    #[must_use]
    pub fn ok(&self) -> bool {
        !self.issues.iter().any(|issue| issue.kind != ValidationKind::Warning)
    }

    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }
}
