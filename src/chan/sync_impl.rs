// src/chan/sync_impl.rs

//! The blocking send, receive, and wait-for-close operations.
//!
//! Each follows the same park protocol around the non-blocking cores it
//! wraps: attempt, build a waiter, lock and re-check state (so a concurrent
//! close or arrival cannot be missed), commit to parking, then adaptively
//! wait on the waiter's done flag.

use super::backoff;
use super::core::{ChanShared, ClosedWaiter, SyncWaiter};
use crate::error::{RecvError, SendError, TryRecvError, TrySendError};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// The blocking send. Parks while the buffer is full (or, for rendezvous
/// channels, until a receiver takes the item) and the channel stays open.
pub(crate) fn send_sync<T: Send>(shared: &ChanShared<T>, item: T) -> Result<(), SendError> {
  let mut pending = Some(item);

  loop {
    let item_to_send = pending.take().expect("send loop entered without an item");

    // --- Phase 1: non-blocking attempt ---
    match shared.try_send_core(item_to_send) {
      Ok(()) => return Ok(()),
      Err(TrySendError::Closed(_)) => return Err(SendError::Closed),
      Err(TrySendError::Full(returned)) => {
        pending = Some(returned);
      }
    }

    // --- Phase 2: build the waiter ---
    // Rendezvous senders park with the item in the slot so a receiver can
    // take it directly.
    let done = Arc::new(AtomicBool::new(false));
    let delivered = Arc::new(AtomicBool::new(false));
    let is_rendezvous = shared.capacity == 0;
    let mut waiter = SyncWaiter {
      thread: thread::current(),
      slot: if is_rendezvous { pending.take() } else { None },
      done: Arc::clone(&done),
      delivered: Arc::clone(&delivered),
    };

    // --- Phase 3: lock, re-check, commit to parking ---
    {
      let mut guard = shared.internal.lock();

      // Closed wins over everything else: a send must never park once the
      // channel is closed. The undelivered item drops with the waiter.
      if guard.closed {
        return Err(SendError::Closed);
      }

      // Room may have appeared (or a receiver arrived) between phase 1 and
      // taking the lock. Retry instead of parking.
      if !guard.waiting_receivers.is_empty()
        || (shared.capacity > 0 && guard.queue.len() < shared.capacity)
      {
        if is_rendezvous {
          pending = waiter.slot.take();
        }
        continue;
      }

      guard.waiting_senders.push_back(waiter);
    }

    // --- Phase 4: wait ---
    backoff::adaptive_wait(|| done.load(Ordering::Acquire));

    // --- Phase 5: interpret the wake-up ---
    if is_rendezvous {
      // Either a receiver took the item out of the slot, or the channel
      // closed under us and the item was discarded with the waiter.
      return if delivered.load(Ordering::Acquire) {
        Ok(())
      } else {
        Err(SendError::Closed)
      };
    }
    // Buffered: the item is still in `pending`. Loop to retry; a close is
    // surfaced by the retry as `TrySendError::Closed`.
  }
}

/// The blocking receive. Parks while the channel is empty and open; once
/// closed, keeps returning values until the buffer is drained, then reports
/// `Disconnected`.
pub(crate) fn recv_sync<T: Send>(shared: &ChanShared<T>) -> Result<T, RecvError> {
  loop {
    // --- Phase 1: non-blocking attempt ---
    match shared.try_recv_core() {
      Ok(item) => return Ok(item),
      Err(TryRecvError::Disconnected) => return Err(RecvError::Disconnected),
      Err(TryRecvError::Empty) => {}
    }

    // --- Phase 2: build the waiter ---
    // Receivers never hold an item; the delivered flag is unused for them.
    let done = Arc::new(AtomicBool::new(false));
    let waiter = SyncWaiter {
      thread: thread::current(),
      slot: None,
      done: Arc::clone(&done),
      delivered: Arc::new(AtomicBool::new(false)),
    };

    // --- Phase 3: lock, re-check, commit to parking ---
    {
      let mut guard = shared.internal.lock();

      // A value may have arrived between phase 1 and taking the lock:
      // either buffered, or a rendezvous sender parked with one.
      if !guard.queue.is_empty()
        || (shared.capacity == 0 && !guard.waiting_senders.is_empty())
      {
        continue;
      }

      // Empty and closed means fully drained: nothing left to wait for.
      if guard.closed {
        return Err(RecvError::Disconnected);
      }

      guard.waiting_receivers.push_back(waiter);
    }

    // --- Phase 4: wait, then loop back to the non-blocking attempt ---
    backoff::adaptive_wait(|| done.load(Ordering::Acquire));
  }
}

/// Blocks until the channel has been closed. Returns immediately if it
/// already is.
pub(crate) fn wait_sync<T: Send>(shared: &ChanShared<T>) {
  let done = Arc::new(AtomicBool::new(false));
  {
    let mut guard = shared.internal.lock();
    if guard.closed {
      return;
    }
    guard.waiting_closed.push_back(ClosedWaiter {
      thread: thread::current(),
      done: Arc::clone(&done),
    });
  }
  // The done flag is stored only by the winning closer, after `closed` was
  // set under the lock: waking here implies closure has completed.
  backoff::adaptive_wait(|| done.load(Ordering::Acquire));
}
