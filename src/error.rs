//! Error types.
//!
//! Expression text that does not parse yields a [`ParseError`]; everything else
//! the crate can fail with is a variant of [`Error`].
use thiserror::Error;

/// A malformed boolean expression.
///
/// `position` is the character offset at which parsing stopped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse expression at {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// The error type of this crate.
///
/// # Error Categories
///
/// - [`Error::Parse`], [`Error::Rewrite`] - an expression could not be normalized.
///   The model translator skips the offending row and carries on.
/// - [`Error::OptionInvalid`], [`Error::OptionNotTristate`] - misuse of the item
///   model accessors.
/// - [`Error::NoTypeSource`], [`Error::UnknownSymbol`] - type queries on a model.
/// - [`Error::Malformed`], [`Error::Io`], [`Error::Regex`] - reading model files.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A syntactically valid expression that cannot be lowered,
    /// e.g. a comparison between two literals.
    #[error("cannot rewrite expression: {0}")]
    Rewrite(String),

    /// Symbol names must not contain whitespace.
    #[error("invalid option name '{0}'")]
    OptionInvalid(String),

    /// Only tristate items have a module symbol.
    #[error("option '{0}' is not tristate")]
    OptionNotTristate(String),

    /// Type queries need an attached `.rsf` or `.cnf` source.
    #[error("no type information attached to the model")]
    NoTypeSource,

    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),

    #[error("malformed input at line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
