//! Error type shared by the whole frontend.
//!
//! Every fallible operation returns [Result]; nothing unwinds across
//! component boundaries.

use std::fmt::{self, Debug, Display, Formatter};

use serde::Serialize;

use crate::span::Span;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A frontend error. The `kind` drives the public [ErrorCode]; the message
/// prefix for a given kind and input is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub span: Option<Span>,
    pub message: String,
    pub hints: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::AsRefStr)]
pub enum ErrorKind {
    Syntax,
    /// An empty statement list.
    StatementEmpty,
    Semantic,
    Permission,
    /// Transient; the caller may retry.
    LeaderChanged,
    NotFound(NotFoundKind),
    NotSupported,
    BadData,
    OutOfRange,
    /// A bug in the frontend itself.
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotFoundKind {
    Space,
    Tag,
    Edge,
    Index,
    User,
    Session,
    Host,
    Variable,
    Column,
    Function,
}

impl NotFoundKind {
    fn noun(&self) -> &'static str {
        match self {
            NotFoundKind::Space => "space",
            NotFoundKind::Tag => "tag",
            NotFoundKind::Edge => "edge",
            NotFoundKind::Index => "index",
            NotFoundKind::User => "user",
            NotFoundKind::Session => "session",
            NotFoundKind::Host => "host",
            NotFoundKind::Variable => "variable",
            NotFoundKind::Column => "column",
            NotFoundKind::Function => "function",
        }
    }
}

/// The codes a finished query reports to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::AsRefStr)]
#[allow(non_camel_case_types)]
pub enum ErrorCode {
    SUCCEEDED,
    E_SYNTAX_ERROR,
    E_STATEMENT_EMPTY,
    E_SEMANTIC_ERROR,
    E_BAD_PERMISSION,
    E_EXECUTION_ERROR,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            span: None,
            message: message.into(),
            hints: Vec::new(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::Syntax, message)
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::Semantic, message)
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::Permission, message)
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::NotSupported, message)
    }

    pub fn not_found(what: NotFoundKind, name: &str) -> Self {
        Error::new(
            ErrorKind::NotFound(what),
            format!("{} `{name}' not found", what.noun()),
        )
    }

    pub fn leader_changed(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::LeaderChanged, message).push_hint("please retry")
    }

    /// Used for things that should never happen, but are not certain not to.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::Internal, message)
    }

    pub fn code(&self) -> ErrorCode {
        match self.kind {
            ErrorKind::Syntax => ErrorCode::E_SYNTAX_ERROR,
            ErrorKind::StatementEmpty => ErrorCode::E_STATEMENT_EMPTY,
            ErrorKind::Semantic
            | ErrorKind::NotFound(_)
            | ErrorKind::NotSupported
            | ErrorKind::BadData
            | ErrorKind::OutOfRange => ErrorCode::E_SEMANTIC_ERROR,
            ErrorKind::Permission => ErrorCode::E_BAD_PERMISSION,
            ErrorKind::LeaderChanged | ErrorKind::Internal => ErrorCode::E_EXECUTION_ERROR,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for hint in &self.hints {
            write!(f, " ({hint})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// Attaches context to errors without obscuring the call site.
pub trait WithErrorInfo: Sized {
    fn push_hint<S: Into<String>>(self, hint: S) -> Self;
    fn with_span(self, span: Option<Span>) -> Self;
}

impl WithErrorInfo for Error {
    fn push_hint<S: Into<String>>(mut self, hint: S) -> Self {
        self.hints.push(hint.into());
        self
    }

    fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = self.span.or(span);
        self
    }
}

impl<T> WithErrorInfo for Result<T> {
    fn push_hint<S: Into<String>>(self, hint: S) -> Self {
        self.map_err(|e| e.push_hint(hint))
    }

    fn with_span(self, span: Option<Span>) -> Self {
        self.map_err(|e| e.with_span(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_mapping() {
        assert_eq!(Error::syntax("x").code(), ErrorCode::E_SYNTAX_ERROR);
        assert_eq!(Error::semantic("x").code(), ErrorCode::E_SEMANTIC_ERROR);
        assert_eq!(Error::permission("x").code(), ErrorCode::E_BAD_PERMISSION);
        assert_eq!(
            Error::not_found(NotFoundKind::Space, "nba").code(),
            ErrorCode::E_SEMANTIC_ERROR
        );
        assert_eq!(
            Error::leader_changed("leader moved").code(),
            ErrorCode::E_EXECUTION_ERROR
        );
    }

    #[test]
    fn leader_changed_carries_retry_hint() {
        let e = Error::leader_changed("leader of part 7 changed");
        assert_eq!(e.to_string(), "leader of part 7 changed (please retry)");
    }

    #[test]
    fn not_found_message_prefix_is_deterministic() {
        let e = Error::not_found(NotFoundKind::Tag, "person");
        assert_eq!(e.message, "tag `person' not found");
    }
}
