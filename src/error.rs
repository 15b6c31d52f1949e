//! Error values produced by the library itself.
//!
//! Streams are generic over their error type, nothing here is forced on a
//! pipeline. `RxError` is what the library reports when it has to fail on its
//! own (a double assignment, an exhausted sequence) and a convenient default
//! for user pipelines. `ErrorKind` lets `catch_kind` recover only from errors
//! of a given kind.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RxError {
  #[error("invalid operation: {0}")]
  InvalidOperation(String),
  #[error("argument out of range: {0}")]
  ArgumentOutOfRange(String),
  #[error("sequence contains no elements")]
  NoElements,
  #[error("operation timed out")]
  Timeout,
  #[error("operation was canceled")]
  Canceled,
  #[error("{kind}: {message}")]
  Custom { kind: &'static str, message: String },
}

impl RxError {
  pub fn custom(kind: &'static str, message: impl Into<String>) -> Self {
    RxError::Custom { kind, message: message.into() }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      RxError::InvalidOperation(_) => ErrorKind::InvalidOperation,
      RxError::ArgumentOutOfRange(_) => ErrorKind::ArgumentOutOfRange,
      RxError::NoElements => ErrorKind::NoElements,
      RxError::Timeout => ErrorKind::Timeout,
      RxError::Canceled => ErrorKind::Canceled,
      RxError::Custom { kind, .. } => ErrorKind::Custom(kind),
    }
  }
}

/// The declared kind of error a catch handler accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  /// Accepts every error.
  Any,
  InvalidOperation,
  ArgumentOutOfRange,
  NoElements,
  Timeout,
  Canceled,
  Custom(&'static str),
}

impl ErrorKind {
  /// Whether `err` is an instance of this kind.
  pub fn matches(&self, err: &RxError) -> bool {
    match self {
      ErrorKind::Any => true,
      kind => *kind == err.kind(),
    }
  }
}
