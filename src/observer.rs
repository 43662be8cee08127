// src/observer.rs

//! Diagnostic instrumentation for channel operations.
//!
//! Observability is an injectable hook, not a hard-wired side effect: a
//! channel built with [`crate::bounded_with_observer`] carries an observer
//! which is invoked after an operation completes, on the calling thread,
//! once the channel's state lock has been released. A channel built without
//! one pays nothing. Observers never influence the outcome of an operation;
//! the synchronization path is identical either way.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

static NEXT_EVENT_SEQ: AtomicUsize = AtomicUsize::new(0);

/// The operation that produced a [`ChanEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
  Send,
  Recv,
  Close,
}

/// A single recorded channel operation.
#[derive(Clone)]
pub struct ChanEvent {
  /// Global sequence number across all channels in the process.
  pub seq: usize,
  /// Identity of the channel the operation ran on.
  pub chan_id: u64,
  /// The OS thread that performed the operation.
  pub thread_id: ThreadId,
  pub op: Op,
}

impl ChanEvent {
  pub(crate) fn record(chan_id: u64, op: Op) -> Self {
    ChanEvent {
      seq: NEXT_EVENT_SEQ.fetch_add(1, Ordering::Relaxed),
      chan_id,
      thread_id: thread::current().id(),
      op,
    }
  }
}

impl fmt::Debug for ChanEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ChanEvent")
      .field("seq", &self.seq)
      .field("chan", &self.chan_id)
      .field("tid", &self.thread_id)
      .field("op", &self.op)
      .finish()
  }
}

/// Hook invoked after a successful send, receive, or close.
///
/// Implementations should not block: the hook runs inline on the thread
/// that performed the operation.
pub trait ChanObserver: Send + Sync {
  fn on_event(&self, event: &ChanEvent);
}

/// An observer that records every event in memory.
#[derive(Default)]
pub struct CollectingObserver {
  events: Mutex<Vec<ChanEvent>>,
}

impl CollectingObserver {
  pub fn new() -> Self {
    CollectingObserver {
      events: Mutex::new(Vec::new()),
    }
  }

  /// Returns a copy of every event recorded so far, in recording order.
  pub fn snapshot(&self) -> Vec<ChanEvent> {
    self.events.lock().clone()
  }

  pub fn len(&self) -> usize {
    self.events.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Discards every recorded event.
  pub fn clear(&self) {
    self.events.lock().clear();
  }

  /// Prints a human-readable dump of every recorded event to stdout.
  pub fn print_report(&self) {
    let events = self.events.lock();
    println!("--- strand observer report ({} events) ---", events.len());
    for event in events.iter() {
      println!(
        "  [seq:{:<6}] chan:{:<4} op:{:<5?} tid:{:?}",
        event.seq, event.chan_id, event.op, event.thread_id
      );
    }
    println!("--- end of report ---");
  }
}

impl ChanObserver for CollectingObserver {
  fn on_event(&self, event: &ChanEvent) {
    self.events.lock().push(event.clone());
  }
}

lazy_static::lazy_static! {
  static ref GLOBAL_COLLECTOR: Arc<CollectingObserver> = Arc::new(CollectingObserver::new());
}

/// A process-wide collector, for ad-hoc debugging across many channels.
///
/// Attach it at construction time:
/// `bounded_with_observer(cap, observer::global_collector())`. Events from
/// every channel sharing it interleave in one sequence.
pub fn global_collector() -> Arc<CollectingObserver> {
  Arc::clone(&GLOBAL_COLLECTOR)
}
