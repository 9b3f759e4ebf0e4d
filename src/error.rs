//! Error types for the command-DSL engine.
//!
//! Every layer reports failures as values; nothing panics and nothing is
//! silently swallowed. Intra-line errors carry a `miette` label pointing at
//! the offending token so a host can render `text ^^^ here` diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// A tokenization failure.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum LexError {
    #[error("malformed numeric literal `{token}`")]
    InvalidNumber {
        token: String,
        #[label("not a number")]
        span: miette::SourceSpan,
    },

    #[error("invalid token `{token}`")]
    InvalidToken {
        token: String,
        #[label("here")]
        span: miette::SourceSpan,
    },
}

/// A grammar violation, reported at the exact token that broke the schema.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error("unknown command `{verb} {noun}`")]
    UnknownCommand {
        verb: String,
        noun: String,
        #[label("no schema for this keyword pair")]
        span: miette::SourceSpan,
    },

    #[error("expected keyword `{expected}`, found `{found}`")]
    MissingKeyword {
        expected: String,
        found: String,
        #[label("expected `{expected}`")]
        span: miette::SourceSpan,
    },

    #[error("field `{field}` takes {expected} number(s), found {found}")]
    ArityMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
        #[label("short of numbers")]
        span: miette::SourceSpan,
    },

    #[error("field `{field}` expects a number, found `{token}`")]
    InvalidNumeric {
        field: &'static str,
        token: String,
        #[label("not a number")]
        span: miette::SourceSpan,
    },

    #[error("sub-command for field `{field}` is incomplete")]
    UnterminatedSubCommand {
        field: &'static str,
        #[label("sub-command starts here")]
        span: miette::SourceSpan,
    },

    #[error("unknown variable `${name}`")]
    UnknownVariable {
        name: String,
        #[label("never assigned")]
        span: miette::SourceSpan,
    },

    #[error("material `{token}` is not of the form CATEGORY.PRESET")]
    InvalidMaterial {
        token: String,
        #[label("expected CATEGORY.PRESET")]
        span: miette::SourceSpan,
    },

    #[error("trailing input after complete command")]
    TrailingTokens {
        #[label("not part of the command")]
        span: miette::SourceSpan,
    },

    #[error("maximum sub-command nesting depth exceeded")]
    TooDeeplyNested {
        #[label("here")]
        span: miette::SourceSpan,
    },

    #[error("unexpected end of line, expected {expected}")]
    UnexpectedEol { expected: String },
}

/// A semantic or backend failure during evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("geometry backend: {0}")]
    Backend(String),

    #[error("{field} of {command} must be a planar wire or face")]
    Not2D {
        command: &'static str,
        field: &'static str,
    },

    #[error("unknown material {category}.{preset}")]
    UnknownMaterial { category: String, preset: String },

    #[error("variable `${0}` was consumed by an earlier operation and cannot be reused")]
    ConsumedVariable(String),

    #[error("{0} produces no shape and cannot be used as a geometric operand")]
    MissingShape(&'static str),
}

/// Reverse-serialization failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializeError {
    #[error("node has no recorded provenance and the backend cannot approximate it: {0}")]
    NoProvenance(String),

    #[error("no such node in the document")]
    UnknownNode,
}

/// A non-fatal condition recorded during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A boolean produced a compound with zero or more than one solid;
    /// the compound was kept as-is.
    AmbiguousBooleanResult { solids: usize },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AmbiguousBooleanResult { solids } => write!(
                f,
                "boolean produced a compound with {solids} solids; kept the compound"
            ),
        }
    }
}

/// A program-level failure: the underlying error plus the 1-based number of
/// the line that failed. Execution stops at the first failing line; nodes
/// committed by earlier lines are not rolled back.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum EngineError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        #[diagnostic_source]
        source: ParseError,
    },

    #[error("line {line}: {source}")]
    Eval {
        line: usize,
        #[source]
        source: EvalError,
    },

    #[error("program is empty")]
    EmptyProgram,
}

impl EngineError {
    /// The 1-based line number the error is attributed to, if any.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::Parse { line, .. } | Self::Eval { line, .. } => Some(*line),
            Self::EmptyProgram => None,
        }
    }
}

/// Result alias for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;
