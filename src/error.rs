// src/error.rs

use core::fmt;

/// Error returned by `try_send` when the value could not be accepted
/// immediately. The value being sent is handed back in every variant.
#[derive(PartialEq, Eq, Clone)]
pub enum TrySendError<T> {
  /// The buffer is full, or for a rendezvous channel no receiver is ready
  /// to take the value right now.
  Full(T),
  /// The channel has been closed; the value was not delivered.
  Closed(T),
}

impl<T> TrySendError<T> {
  /// Consumes the error, returning the value that failed to send.
  #[inline]
  pub fn into_inner(self) -> T {
    match self {
      TrySendError::Full(v) | TrySendError::Closed(v) => v,
    }
  }
}

impl<T> fmt::Debug for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full(_) => write!(f, "TrySendError::Full(..)"),
      TrySendError::Closed(_) => write!(f, "TrySendError::Closed(..)"),
    }
  }
}

impl<T> fmt::Display for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full(_) => f.write_str("channel full"),
      TrySendError::Closed(_) => f.write_str("channel closed"),
    }
  }
}

impl<T> std::error::Error for TrySendError<T> {}

/// Error returned by a blocking `send`.
///
/// A closed channel is the only way a blocking send fails. Producers
/// routinely race the closer, so this is an expected outcome to match on,
/// not a fault; the value is dropped rather than delivered.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SendError {
  Closed,
}
impl std::error::Error for SendError {}
impl fmt::Display for SendError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SendError::Closed => write!(f, "channel closed"),
    }
  }
}

/// Error returned by `try_recv` when a value could not be taken
/// immediately.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryRecvError {
  /// No value is buffered right now, but the channel is still open.
  Empty,
  /// The channel is closed and every buffered value has been drained.
  Disconnected,
}
impl std::error::Error for TryRecvError {}
impl fmt::Display for TryRecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TryRecvError::Empty => write!(f, "channel empty"),
      TryRecvError::Disconnected => write!(f, "channel closed and drained"),
    }
  }
}

/// Error returned by a blocking `recv` once the channel is closed and
/// fully drained. Like [`SendError`], this is a routine outcome.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RecvError {
  Disconnected,
}
impl std::error::Error for RecvError {}
impl fmt::Display for RecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RecvError::Disconnected => write!(f, "channel closed and drained"),
    }
  }
}

/// Error returned when closing a channel that is already closed.
///
/// Under concurrent closers exactly one call returns `Ok`; every other
/// call, and every later one, observes this error.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CloseError;
impl std::error::Error for CloseError {}
impl fmt::Display for CloseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "channel is already closed")
  }
}
