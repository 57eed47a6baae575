// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Hot, multi-subscriber broadcast of lifecycle events.
//!
//! ## Characteristics
//!
//! - **Hot**: late subscribers only see events sent after they subscribed.
//! - **Unbounded**: sending never blocks the sender.
//! - **Cheap to clone**: all clones share the same subscriber list.
//! - **Close**: closing completes every subscriber stream.
//!
//! ## Example
//!
//! ```
//! use ordered_streams_core::EventSubject;
//! use futures::StreamExt;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let subject = EventSubject::<&str>::new();
//! let mut events = subject.subscribe();
//!
//! subject.send("started");
//! subject.close();
//!
//! assert_eq!(events.next().await, Some("started"));
//! assert_eq!(events.next().await, None);
//! # }
//! ```

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::Stream;
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

struct SubjectState<E> {
    closed: bool,
    senders: Vec<UnboundedSender<E>>,
}

/// A subscription to an [`EventSubject`].
///
/// Completes when the subject is closed.
pub struct EventStream<E> {
    rx: UnboundedReceiver<E>,
}

impl<E> Stream for EventStream<E> {
    type Item = E;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<E>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}

/// A hot, unbounded subject broadcasting events to all current subscribers.
pub struct EventSubject<E> {
    state: Arc<Mutex<SubjectState<E>>>,
}

impl<E: Clone> EventSubject<E> {
    /// Creates a new open subject with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SubjectState {
                closed: false,
                senders: Vec::new(),
            })),
        }
    }

    /// Subscribe to future events.
    ///
    /// Subscribing to a closed subject yields a stream that is already complete.
    pub fn subscribe(&self) -> EventStream<E> {
        let (tx, rx) = mpsc::unbounded();
        let mut state = self.state.lock();
        if !state.closed {
            state.senders.push(tx);
        }
        EventStream { rx }
    }

    /// Send an event to all live subscribers.
    ///
    /// Returns `false` if the subject is closed. Dropped subscribers are pruned.
    pub fn send(&self, event: E) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }

        state
            .senders
            .retain(|tx| tx.unbounded_send(event.clone()).is_ok());
        true
    }

    /// Close the subject, completing all subscriber streams. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.senders.clear();
    }

    /// Returns `true` if the subject has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of subscribers seen alive by the last `send`.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().senders.len()
    }
}

impl<E: Clone> Default for EventSubject<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventSubject<E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_broadcasts_to_every_subscriber() {
        let subject = EventSubject::new();
        let mut first = subject.subscribe();
        let mut second = subject.subscribe();

        assert!(subject.send(1));

        assert_eq!(first.next().await, Some(1));
        assert_eq!(second.next().await, Some(1));
        assert_eq!(subject.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let subject = EventSubject::new();
        subject.send(1);

        let mut late = subject.subscribe();
        subject.send(2);
        subject.close();

        assert_eq!(late.next().await, Some(2));
        assert_eq!(late.next().await, None);
    }

    #[tokio::test]
    async fn test_subscribe_after_close_is_complete() {
        let subject = EventSubject::<u8>::new();
        subject.close();

        assert!(!subject.send(1));
        assert!(subject.is_closed());
        assert_eq!(subject.subscribe().next().await, None);
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let subject = EventSubject::new();
        let dropped = subject.subscribe();
        drop(dropped);

        subject.send(());
        assert_eq!(subject.subscriber_count(), 0);
    }
}
