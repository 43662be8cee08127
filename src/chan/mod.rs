// src/chan/mod.rs

//! A closable, waitable MPMC channel.
//!
//! Unlike channels whose lifetime is tied to their handles, this channel
//! has an explicit lifecycle: it stays open until some holder calls
//! [`Channel::close`], no matter how many handles exist or drop. Closing is
//! a broadcast: every thread blocked in [`Channel::send`],
//! [`Channel::recv`], or [`Channel::wait`] observes the transition, and
//! exactly one of any number of racing closers wins.
//!
//! Sending into a closed channel and closing an already-closed channel are
//! ordinary outcomes reported through [`SendError`] and [`CloseError`], not
//! faults: producers routinely race the closer, and callers are expected to
//! match on the result.
//!
//! Values accepted before the close still drain through `recv` in FIFO
//! order; only once the buffer is empty does `recv` report
//! [`RecvError::Disconnected`].

mod backoff;
mod core;
mod sync_impl;

use self::core::ChanShared;
use crate::error::{CloseError, RecvError, SendError, TryRecvError, TrySendError};
use crate::observer::{ChanObserver, Op};

use std::sync::Arc;

/// A handle to a closable channel.
///
/// Handles are cheap to clone; all clones refer to the same channel, and
/// any holder may send, receive, close, or wait for closure. Dropping
/// handles never closes the channel.
#[derive(Debug)]
pub struct Channel<T: Send> {
  shared: Arc<ChanShared<T>>,
}

impl<T: Send> Clone for Channel<T> {
  fn clone(&self) -> Self {
    Channel {
      shared: Arc::clone(&self.shared),
    }
  }
}

/// Creates a new open channel with the given buffer capacity.
///
/// A capacity of `0` creates a rendezvous channel: each `send` completes
/// only when a `recv` takes the value directly, or fails once the channel
/// closes.
pub fn bounded<T: Send>(capacity: usize) -> Channel<T> {
  Channel {
    shared: Arc::new(ChanShared::new(capacity, None)),
  }
}

/// Creates a new open channel with a diagnostic observer attached.
///
/// The observer is invoked after every successful send, receive, and close;
/// see [`crate::observer`].
pub fn bounded_with_observer<T: Send>(
  capacity: usize,
  observer: Arc<dyn ChanObserver>,
) -> Channel<T> {
  Channel {
    shared: Arc::new(ChanShared::new(capacity, Some(observer))),
  }
}

impl<T: Send> Channel<T> {
  /// Sends a value, blocking the current thread while the buffer is full
  /// and the channel remains open.
  ///
  /// # Errors
  ///
  /// Returns `Err(SendError::Closed)` if the channel is closed, whether it
  /// already was when the call started, or it closed while the call was
  /// blocked. The value is dropped, not delivered.
  pub fn send(&self, value: T) -> Result<(), SendError> {
    sync_impl::send_sync(&self.shared, value)?;
    self.shared.emit(Op::Send);
    Ok(())
  }

  /// Attempts to send a value without blocking.
  pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
    self.shared.try_send_core(value)?;
    self.shared.emit(Op::Send);
    Ok(())
  }

  /// Receives a value, blocking the current thread until one is available
  /// or the channel is closed and fully drained.
  ///
  /// Values buffered before a close are still delivered, in FIFO order,
  /// before this starts returning `Err(RecvError::Disconnected)`.
  pub fn recv(&self) -> Result<T, RecvError> {
    let item = sync_impl::recv_sync(&self.shared)?;
    self.shared.emit(Op::Recv);
    Ok(item)
  }

  /// Attempts to receive a value without blocking.
  pub fn try_recv(&self) -> Result<T, TryRecvError> {
    let item = self.shared.try_recv_core()?;
    self.shared.emit(Op::Recv);
    Ok(item)
  }

  /// Closes the channel, waking every blocked sender, receiver, and
  /// [`wait`](Channel::wait) caller.
  ///
  /// Exactly one of any number of racing closers gets `Ok(())`; the rest,
  /// and all later calls, get `Err(CloseError)`. Closing never discards
  /// buffered values.
  pub fn close(&self) -> Result<(), CloseError> {
    self.shared.close_core()?;
    self.shared.emit(Op::Close);
    Ok(())
  }

  /// Blocks until the channel has been closed by some handle. Returns
  /// immediately if it already is.
  pub fn wait(&self) {
    sync_impl::wait_sync(&self.shared);
  }

  /// Returns `true` once the channel has been closed.
  pub fn is_closed(&self) -> bool {
    self.shared.internal.lock().closed
  }

  /// Returns the capacity the channel was created with.
  pub fn capacity(&self) -> usize {
    self.shared.capacity
  }

  /// Returns the number of buffered values.
  #[inline]
  pub fn len(&self) -> usize {
    self.shared.internal.lock().queue.len()
  }

  /// Returns `true` if no values are buffered.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns `true` if the buffer is at capacity. Always `true` for
  /// rendezvous channels.
  #[inline]
  pub fn is_full(&self) -> bool {
    self.len() >= self.shared.capacity
  }
}
