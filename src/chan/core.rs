// src/chan/core.rs

//! The mutex-protected core state of the channel.
//!
//! ### Design principles
//!
//! 1. **Single mutex.** One `parking_lot::Mutex` guards the buffer, the
//!    closed flag, and every waiter queue. Enqueue, dequeue, and closing all
//!    linearize on it; no two threads can observe contradictory orderings of
//!    closed-ness.
//! 2. **Closing is a state check, not a caught fault.** `close_core` flips
//!    the flag exactly once and drains all three waiter queues while still
//!    holding the lock. A parked thread is therefore either collected and
//!    woken by the closer, or sees `closed == true` during its own pre-park
//!    re-check under the same lock. Wakeups happen after the lock is
//!    released.
//! 3. **Rendezvous hand-off.** A capacity-0 sender parks with its item in
//!    the waiter slot; a receiver takes the item directly and marks the
//!    hand-off `delivered`. A close wakes the sender without that mark,
//!    which is how a sender blocked at close time learns its value was not
//!    delivered.

use crate::error::{CloseError, TryRecvError, TrySendError};
use crate::observer::{ChanEvent, ChanObserver, Op};

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::Thread;

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(0);

/// A parked thread blocked in `send` or `recv`.
#[derive(Debug)]
pub(crate) struct SyncWaiter<T> {
  /// The handle to the parked thread, used for `unpark()`.
  pub(crate) thread: Thread,
  /// Rendezvous slot: a parked capacity-0 sender keeps its item here so a
  /// receiver can take it directly. `None` for buffered senders and all
  /// receivers.
  pub(crate) slot: Option<T>,
  /// Stop-waiting flag observed by the adaptive backoff.
  pub(crate) done: Arc<AtomicBool>,
  /// Stored (before `done`) only when a receiver took the item out of
  /// `slot`. Lets a woken rendezvous sender tell a hand-off from a close.
  pub(crate) delivered: Arc<AtomicBool>,
}

impl<T> SyncWaiter<T> {
  pub(crate) fn wake(&self) {
    self.done.store(true, Ordering::Release);
    self.thread.unpark();
  }
}

/// A thread parked in `wait()` until the channel closes.
#[derive(Debug)]
pub(crate) struct ClosedWaiter {
  pub(crate) thread: Thread,
  pub(crate) done: Arc<AtomicBool>,
}

impl ClosedWaiter {
  pub(crate) fn wake(&self) {
    self.done.store(true, Ordering::Release);
    self.thread.unpark();
  }
}

/// The channel state behind the mutex.
#[derive(Debug)]
pub(crate) struct ChanState<T> {
  /// FIFO buffer. For buffered channels `len() <= capacity`; a rendezvous
  /// channel uses it only transiently while handing an item to a woken
  /// receiver.
  pub(crate) queue: VecDeque<T>,
  /// One-way flag: set once by the winning closer, never reset.
  pub(crate) closed: bool,
  /// Parked senders, in arrival order.
  pub(crate) waiting_senders: VecDeque<SyncWaiter<T>>,
  /// Parked receivers, in arrival order.
  pub(crate) waiting_receivers: VecDeque<SyncWaiter<T>>,
  /// Threads parked in `wait()`.
  pub(crate) waiting_closed: VecDeque<ClosedWaiter>,
}

/// The shared owner of the channel's state, wrapped in an `Arc` by the
/// public handle.
pub(crate) struct ChanShared<T> {
  pub(crate) internal: Mutex<ChanState<T>>,
  pub(crate) capacity: usize,
  /// Opaque identity, used only by diagnostics.
  pub(crate) id: u64,
  pub(crate) observer: Option<Arc<dyn ChanObserver>>,
}

impl<T> fmt::Debug for ChanShared<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ChanShared")
      .field("id", &self.id)
      .field("capacity", &self.capacity)
      .finish_non_exhaustive()
  }
}

impl<T: Send> ChanShared<T> {
  pub(crate) fn new(capacity: usize, observer: Option<Arc<dyn ChanObserver>>) -> Self {
    ChanShared {
      internal: Mutex::new(ChanState {
        queue: VecDeque::with_capacity(capacity),
        closed: false,
        waiting_senders: VecDeque::new(),
        waiting_receivers: VecDeque::new(),
        waiting_closed: VecDeque::new(),
      }),
      capacity,
      id: NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed),
      observer,
    }
  }

  /// Emits a diagnostic event if an observer is attached. Callers invoke
  /// this after the state lock has been released.
  pub(crate) fn emit(&self, op: Op) {
    if let Some(observer) = &self.observer {
      observer.on_event(&ChanEvent::record(self.id, op));
    }
  }

  /// The non-blocking send attempt. In order:
  /// 1. Refuse if the channel is closed.
  /// 2. Hand the item to the longest-parked receiver (buffered through the
  ///    queue so the receiver pops it on wake).
  /// 3. Push into the buffer if space remains.
  pub(crate) fn try_send_core(&self, item: T) -> Result<(), TrySendError<T>> {
    let receiver;
    {
      let mut guard = self.internal.lock();

      if guard.closed {
        return Err(TrySendError::Closed(item));
      }

      if let Some(waiter) = guard.waiting_receivers.pop_front() {
        guard.queue.push_back(item);
        receiver = waiter;
      } else if self.capacity > 0 && guard.queue.len() < self.capacity {
        guard.queue.push_back(item);
        return Ok(());
      } else {
        // Buffer full, or rendezvous with no receiver parked.
        return Err(TrySendError::Full(item));
      }
    }
    receiver.wake();
    Ok(())
  }

  /// The non-blocking receive attempt. In order:
  /// 1. Take a direct hand-off from the longest-parked rendezvous sender.
  /// 2. Pop the buffer; the freed slot goes to the longest-parked sender.
  /// 3. Report `Disconnected` only once closed AND drained.
  pub(crate) fn try_recv_core(&self) -> Result<T, TryRecvError> {
    let mut guard = self.internal.lock();

    if self.capacity == 0 {
      if let Some(mut waiter) = guard.waiting_senders.pop_front() {
        let item = waiter
          .slot
          .take()
          .expect("rendezvous sender parked without an item");
        waiter.delivered.store(true, Ordering::Release);
        drop(guard);
        waiter.wake();
        return Ok(item);
      }
    }

    if let Some(item) = guard.queue.pop_front() {
      // A buffer slot opened up; wake the longest-parked sender to claim
      // it. (Rendezvous senders never reach this point: the hand-off path
      // above drained them while the lock was held.)
      let freed = guard.waiting_senders.pop_front();
      drop(guard);
      if let Some(waiter) = freed {
        waiter.wake();
      }
      return Ok(item);
    }

    // Empty. Closure is reported only once the buffer is fully drained.
    if guard.closed {
      return Err(TryRecvError::Disconnected);
    }
    Err(TryRecvError::Empty)
  }

  /// Transitions the channel to closed. Exactly one caller ever gets `Ok`;
  /// the mutex linearizes racing closers.
  ///
  /// Buffered values stay put; they drain through `recv`. Parked senders
  /// do not get to deliver: their calls fail once woken, and any rendezvous
  /// item still sitting in a waiter slot is dropped here, undelivered.
  pub(crate) fn close_core(&self) -> Result<(), CloseError> {
    let senders;
    let receivers;
    let closed_waiters;
    {
      let mut guard = self.internal.lock();
      if guard.closed {
        return Err(CloseError);
      }
      guard.closed = true;
      senders = mem::take(&mut guard.waiting_senders);
      receivers = mem::take(&mut guard.waiting_receivers);
      closed_waiters = mem::take(&mut guard.waiting_closed);
    }
    // Broadcast outside the lock: every parked sender, receiver, and
    // wait() caller observes the transition.
    for waiter in senders {
      waiter.wake();
    }
    for waiter in receivers {
      waiter.wake();
    }
    for waiter in closed_waiters {
      waiter.wake();
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn try_send_try_recv_buffered() {
    let shared = ChanShared::<i32>::new(2, None);
    shared.try_send_core(1).unwrap();
    shared.try_send_core(2).unwrap();
    assert_eq!(shared.try_send_core(3), Err(TrySendError::Full(3)));
    assert_eq!(shared.try_recv_core(), Ok(1));
    assert_eq!(shared.try_recv_core(), Ok(2));
    assert_eq!(shared.try_recv_core(), Err(TryRecvError::Empty));
  }

  #[test]
  fn rendezvous_try_send_needs_parked_receiver() {
    let shared = ChanShared::<i32>::new(0, None);
    assert_eq!(shared.try_send_core(1), Err(TrySendError::Full(1)));
  }

  #[test]
  fn close_is_one_shot() {
    let shared = ChanShared::<i32>::new(1, None);
    assert_eq!(shared.close_core(), Ok(()));
    assert_eq!(shared.close_core(), Err(CloseError));
  }

  #[test]
  fn closed_channel_refuses_sends_but_drains() {
    let shared = ChanShared::<i32>::new(4, None);
    shared.try_send_core(7).unwrap();
    shared.close_core().unwrap();
    assert_eq!(shared.try_send_core(8), Err(TrySendError::Closed(8)));
    assert_eq!(shared.try_recv_core(), Ok(7));
    assert_eq!(shared.try_recv_core(), Err(TryRecvError::Disconnected));
  }

  #[test]
  fn channel_ids_are_distinct() {
    let a = ChanShared::<()>::new(1, None);
    let b = ChanShared::<()>::new(1, None);
    assert_ne!(a.id, b.id);
  }
}
