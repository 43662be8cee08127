// Basic send/recv, capacity, and FIFO behavior.

mod common;
use common::*;

use strand::error::{RecvError, TryRecvError, TrySendError};
use strand::bounded;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread;

// --- Helper for multi-producer / multi-consumer tests ---
fn run_sync_test(
  num_producers: usize,
  num_consumers: usize,
  items_per_producer: usize,
  capacity: usize,
) {
  let ch = bounded(capacity);
  let total_items = num_producers * items_per_producer;
  let received_set = Arc::new(std::sync::Mutex::new(HashSet::new()));
  let received_count = Arc::new(AtomicUsize::new(0));

  let mut consumers = Vec::new();
  for _ in 0..num_consumers {
    let ch = ch.clone();
    let set = Arc::clone(&received_set);
    let count = Arc::clone(&received_count);
    consumers.push(thread::spawn(move || {
      while let Ok(item) = ch.recv() {
        assert!(set.lock().unwrap().insert(item), "Duplicate item received!");
        count.fetch_add(1, AtomicOrdering::Relaxed);
      }
    }));
  }

  let mut producers = Vec::new();
  for p_id in 0..num_producers {
    let ch = ch.clone();
    producers.push(thread::spawn(move || {
      for i in 0..items_per_producer {
        ch.send(p_id * items_per_producer + i).unwrap();
      }
    }));
  }

  for handle in producers {
    handle.join().expect("producer thread panicked");
  }
  // Every item is buffered or already consumed; closing releases the
  // consumers once the buffer drains.
  ch.close().unwrap();
  for handle in consumers {
    handle.join().expect("consumer thread panicked");
  }

  assert_eq!(received_count.load(AtomicOrdering::Relaxed), total_items);
  assert_eq!(received_set.lock().unwrap().len(), total_items);
}

// --- Test cases ---

#[test]
fn one_producer_one_consumer() {
  run_sync_test(1, 1, ITEMS_HIGH, 16);
}

#[test]
fn many_producers_one_consumer() {
  run_sync_test(4, 1, ITEMS_MEDIUM, 16);
}

#[test]
fn one_producer_many_consumers() {
  run_sync_test(1, 4, ITEMS_HIGH, 16);
}

#[test]
fn contended_small_buffer() {
  run_sync_test(4, 4, ITEMS_MEDIUM, 4);
}

#[test]
fn rendezvous_channel() {
  run_sync_test(2, 2, ITEMS_MEDIUM, 0);
}

#[test]
fn fifo_order_preserved() {
  let ch = bounded(8);
  let producer = {
    let ch = ch.clone();
    thread::spawn(move || {
      for i in 0..ITEMS_HIGH {
        ch.send(i).unwrap();
      }
    })
  };

  for i in 0..ITEMS_HIGH {
    assert_eq!(ch.recv().unwrap(), i);
  }
  producer.join().unwrap();
}

#[test]
fn sends_up_to_capacity_never_block() {
  let ch = bounded(8);
  for i in 0..8 {
    ch.send(i).unwrap();
  }
  assert_eq!(ch.len(), 8);
  assert!(ch.is_full());
}

#[test]
fn send_blocks_when_full() {
  let ch = bounded(1);
  ch.send(1).unwrap();

  let ch2 = ch.clone();
  let send_handle = thread::spawn(move || {
    ch2.send(2).unwrap(); // This should block.
  });

  thread::sleep(SHORT_TIMEOUT);
  assert!(!send_handle.is_finished(), "Send should have blocked");

  assert_eq!(ch.recv().unwrap(), 1);
  send_handle.join().expect("Send thread panicked");
  assert_eq!(ch.recv().unwrap(), 2);
}

#[test]
fn rendezvous_send_blocks_until_recv() {
  let ch = bounded(0);

  let ch2 = ch.clone();
  let send_handle = thread::spawn(move || {
    ch2.send("hello").unwrap();
  });

  thread::sleep(SHORT_TIMEOUT);
  assert!(!send_handle.is_finished(), "Send should have blocked");

  assert_eq!(ch.recv().unwrap(), "hello");
  send_handle.join().expect("Send thread panicked");
}

#[test]
fn recv_blocks_until_send() {
  let ch = bounded(4);

  let ch2 = ch.clone();
  let recv_handle = thread::spawn(move || ch2.recv().unwrap());

  thread::sleep(SHORT_TIMEOUT);
  assert!(!recv_handle.is_finished(), "Recv should have blocked");

  ch.send(42).unwrap();
  assert_eq!(recv_handle.join().unwrap(), 42);
}

#[test]
fn try_send_full_and_try_recv_empty() {
  let ch = bounded(1);
  ch.try_send(100).unwrap();

  match ch.try_send(200) {
    Err(TrySendError::Full(val)) => assert_eq!(val, 200),
    _ => panic!("Expected channel to be full"),
  }

  assert_eq!(ch.recv().unwrap(), 100);

  match ch.try_recv() {
    Err(TryRecvError::Empty) => {} // Expected
    _ => panic!("Expected channel to be empty"),
  }
}

#[test]
fn accessors_reflect_buffer_state() {
  let ch = bounded::<i32>(2);
  assert_eq!(ch.capacity(), 2);
  assert!(ch.is_empty());
  assert!(!ch.is_full());
  assert!(!ch.is_closed());

  ch.send(1).unwrap();
  assert_eq!(ch.len(), 1);
  ch.send(2).unwrap();
  assert!(ch.is_full());
}

// The full capacity-1 lifecycle: fill, block, drain, close, drain the rest.
#[test]
fn capacity_one_close_drains_in_order() {
  let ch = bounded(1);
  ch.send("a").unwrap();

  let ch2 = ch.clone();
  let blocked = thread::spawn(move || ch2.send("b"));

  thread::sleep(SHORT_TIMEOUT);
  assert!(!blocked.is_finished(), "second send should block on a full buffer");

  assert_eq!(ch.recv().unwrap(), "a");
  blocked.join().unwrap().unwrap();

  ch.close().unwrap();
  assert_eq!(ch.recv().unwrap(), "b");
  assert_eq!(ch.recv(), Err(RecvError::Disconnected));
}
