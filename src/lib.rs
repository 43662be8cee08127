//! A closable, waitable MPMC channel.
//!
//! Strand provides a single channel type with an explicit open → closed
//! lifecycle. Any number of threads may send, receive, race to close, or
//! block until the channel is closed. Sending after close, closing after
//! close, and receiving after the buffer drains are routine outcomes with
//! dedicated result types, never panics.

pub mod error;
pub mod observer;

mod chan;

// Public re-exports for convenience.
pub use chan::{bounded, bounded_with_observer, Channel};
pub use error::{CloseError, RecvError, SendError, TryRecvError, TrySendError};
