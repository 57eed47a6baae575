// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::state::{EngineState, OrderedEvent, Termination};
use futures::task::AtomicWaker;
use ordered_streams_core::{
    BoxSource, CloseSignal, Closed, EventStream, EventSubject, OrderedStreamsError, Result, Source,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Requests handed from handles to the multiplexer, picked up on its next poll.
pub(crate) struct Inbox<T> {
    pub(crate) state: EngineState,
    pub(crate) sources: Vec<BoxSource<T>>,
    pub(crate) destroy: Option<Option<OrderedStreamsError>>,
}

pub(crate) struct Shared<T> {
    pub(crate) inbox: Mutex<Inbox<T>>,
    pub(crate) waker: AtomicWaker,
    pub(crate) closed: CloseSignal<Termination>,
    pub(crate) events: EventSubject<OrderedEvent>,
}

impl<T> Shared<T> {
    pub(crate) fn new() -> Self {
        Self {
            inbox: Mutex::new(Inbox {
                state: EngineState::Idle,
                sources: Vec::new(),
                destroy: None,
            }),
            waker: AtomicWaker::new(),
            closed: CloseSignal::new(),
            events: EventSubject::new(),
        }
    }
}

/// Clonable, thread-safe handle to an [`OrderedStreams`](crate::OrderedStreams).
///
/// The handle lets code that does not own the output stream append sources,
/// request destruction, and observe the lifecycle. It is safe to use from inside
/// a source while that source is being polled.
///
/// Requests are applied by the multiplexer itself on its next poll (or when it
/// is dropped), so the source list is never mutated concurrently.
pub struct OrderedStreamsHandle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> OrderedStreamsHandle<T> {
    pub(crate) fn new(shared: Arc<Shared<T>>) -> Self {
        Self { shared }
    }

    /// Append a source after every source registered so far.
    ///
    /// # Errors
    ///
    /// - `OrderedStreamsError::NotReadable` if the source fails its readability check;
    ///   nothing is registered.
    /// - `OrderedStreamsError::Terminated` if the multiplexer already reached a terminal state.
    pub fn add_source<S>(&self, source: S) -> Result<()>
    where
        S: Source<T> + Send + 'static,
    {
        if !source.is_readable() {
            return Err(OrderedStreamsError::not_readable(0));
        }

        {
            let mut inbox = self.shared.inbox.lock();
            if inbox.state.is_terminal() {
                return Err(OrderedStreamsError::Terminated);
            }
            inbox.sources.push(Box::new(source));
        }

        self.shared.waker.wake();
        Ok(())
    }

    /// Request destruction; every still-open source will be cancelled.
    ///
    /// The request is carried out by the multiplexer on its next poll, or when
    /// it is dropped. Until then no source is cancelled, `state()` still
    /// reports the live state and [`closed`](Self::closed) does not resolve.
    ///
    /// A `reason` is yielded to the consumer as the final error item.
    /// Does nothing once the multiplexer is terminal.
    pub fn destroy(&self, reason: Option<OrderedStreamsError>) {
        {
            let mut inbox = self.shared.inbox.lock();
            if inbox.state.is_terminal() || inbox.destroy.is_some() {
                return;
            }
            inbox.destroy = Some(reason);
        }

        self.shared.waker.wake();
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.shared.inbox.lock().state
    }

    /// Why the multiplexer closed, once it has.
    #[must_use]
    pub fn termination(&self) -> Option<Termination> {
        self.shared.closed.reason()
    }

    /// Resolves once the multiplexer reaches a terminal state.
    pub fn closed(&self) -> Closed<'_, Termination> {
        self.shared.closed.closed()
    }

    /// Subscribe to progress notifications sent from now on.
    pub fn subscribe_events(&self) -> EventStream<OrderedEvent> {
        self.shared.events.subscribe()
    }
}

impl<T> Clone for OrderedStreamsHandle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}
