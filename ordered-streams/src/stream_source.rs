// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! [`Source`] adapter over any `futures` stream.

use futures::stream::Map;
use futures::task::AtomicWaker;
use futures::{Stream, StreamExt};
use ordered_streams_core::{
    CloseSignal, Closed, OrderedStreamsError, Source, SourceEvent, StreamItem,
};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Live,
    Closing,
    Closed,
}

struct ControlInner {
    destroyed: CloseSignal<Option<OrderedStreamsError>>,
    cancelled: CloseSignal<Option<OrderedStreamsError>>,
    torn_down: CloseSignal<()>,
    waker: AtomicWaker,
}

/// Out-of-band control over a [`StreamSource`] owned by a multiplexer.
///
/// Lets the producer's owner destroy the source from the outside and observe
/// whether (and why) the multiplexer cancelled it.
#[derive(Clone)]
pub struct SourceControl {
    inner: Arc<ControlInner>,
}

impl SourceControl {
    fn new() -> Self {
        Self {
            inner: Arc::new(ControlInner {
                destroyed: CloseSignal::new(),
                cancelled: CloseSignal::new(),
                torn_down: CloseSignal::new(),
                waker: AtomicWaker::new(),
            }),
        }
    }

    /// Destroy the source from the outside.
    ///
    /// Without a reason the source closes without ending, which tears the
    /// owning multiplexer down. With a reason the source fails with it.
    pub fn destroy(&self, reason: Option<OrderedStreamsError>) {
        if self.inner.destroyed.close(reason) {
            self.inner.waker.wake();
        }
    }

    /// The reason the multiplexer cancelled the source with, if it did.
    ///
    /// `Some(None)` is a clean cancellation.
    pub fn cancellation(&self) -> Option<Option<OrderedStreamsError>> {
        self.inner.cancelled.reason()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.is_closed()
    }

    /// Resolves once the multiplexer cancelled the source.
    pub fn cancelled(&self) -> Closed<'_, Option<OrderedStreamsError>> {
        self.inner.cancelled.closed()
    }

    /// Whether the wrapped stream has been dropped.
    pub fn is_closed(&self) -> bool {
        self.inner.torn_down.is_closed()
    }

    /// Resolves once the wrapped stream has been dropped.
    pub fn closed(&self) -> Closed<'_, ()> {
        self.inner.torn_down.closed()
    }
}

/// Adapts a stream of `StreamItem<T>` to the [`Source`] contract.
///
/// `StreamItem::Error` fails the source, stream exhaustion ends it. Pausing
/// stops polling the wrapped stream; nothing it produced is lost.
pub struct StreamSource<S> {
    stream: Option<Pin<Box<S>>>,
    paused: bool,
    phase: Phase,
    pending_error: Option<OrderedStreamsError>,
    control: SourceControl,
}

impl<S> StreamSource<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(Box::pin(stream)),
            paused: false,
            phase: Phase::Live,
            pending_error: None,
            control: SourceControl::new(),
        }
    }

    /// A control handle sharing this source's state.
    pub fn control(&self) -> SourceControl {
        self.control.clone()
    }

    fn teardown(&mut self) {
        self.stream = None;
        self.control.inner.torn_down.close(());
    }
}

impl<St> StreamSource<Map<St, fn(St::Item) -> StreamItem<St::Item>>>
where
    St: Stream,
{
    /// Wrap an infallible stream of plain values.
    pub fn values(stream: St) -> Self {
        Self::new(stream.map(StreamItem::Value as fn(St::Item) -> StreamItem<St::Item>))
    }
}

impl<T, S> Source<T> for StreamSource<S>
where
    S: Stream<Item = StreamItem<T>>,
{
    fn is_readable(&self) -> bool {
        self.phase == Phase::Live
            && self.stream.is_some()
            && !self.control.inner.destroyed.is_closed()
    }

    fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.control.inner.waker.wake();
        }
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn cancel(&mut self, reason: Option<OrderedStreamsError>) {
        if self.phase != Phase::Live {
            return;
        }

        self.control.inner.cancelled.close(reason.clone());
        self.teardown();
        match reason {
            Some(err) => self.pending_error = Some(err),
            None => self.phase = Phase::Closing,
        }
    }

    fn poll_event(&mut self, cx: &mut Context<'_>) -> Poll<SourceEvent<T>> {
        match self.phase {
            Phase::Closed => return Poll::Pending,
            Phase::Closing => {
                self.phase = Phase::Closed;
                return Poll::Ready(SourceEvent::Closed);
            }
            Phase::Live => {}
        }

        if let Some(err) = self.pending_error.take() {
            self.phase = Phase::Closing;
            return Poll::Ready(SourceEvent::Errored(err));
        }

        if self.control.inner.destroyed.is_closed() {
            self.teardown();
            return match self.control.inner.destroyed.reason().flatten() {
                Some(err) => {
                    self.phase = Phase::Closing;
                    Poll::Ready(SourceEvent::Errored(err))
                }
                None => {
                    self.phase = Phase::Closed;
                    Poll::Ready(SourceEvent::Closed)
                }
            };
        }

        self.control.inner.waker.register(cx.waker());
        if self.paused {
            return Poll::Pending;
        }

        let Some(stream) = self.stream.as_mut() else {
            self.phase = Phase::Closed;
            return Poll::Ready(SourceEvent::Closed);
        };

        match stream.as_mut().poll_next(cx) {
            Poll::Ready(Some(StreamItem::Value(item))) => Poll::Ready(SourceEvent::Data(item)),
            Poll::Ready(Some(StreamItem::Error(err))) => {
                self.teardown();
                self.phase = Phase::Closing;
                Poll::Ready(SourceEvent::Errored(err))
            }
            Poll::Ready(None) => {
                self.teardown();
                self.phase = Phase::Closing;
                Poll::Ready(SourceEvent::Ended)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
