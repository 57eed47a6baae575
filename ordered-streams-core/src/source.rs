// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The producer contract consumed by the multiplexer.
//!
//! A [`Source`] delivers zero or more [`SourceEvent::Data`], then exactly one of
//! [`SourceEvent::Ended`] or [`SourceEvent::Errored`], and finally a single
//! [`SourceEvent::Closed`] once it is torn down. A `Closed` that is not preceded
//! by `Ended` or `Errored` means the source was destroyed from the outside.

use crate::error::OrderedStreamsError;
use std::task::{Context, Poll};

/// One notification produced by a [`Source`].
#[derive(Debug, Clone)]
pub enum SourceEvent<T> {
    /// The next item
    Data(T),
    /// End-of-data; no more items follow
    Ended,
    /// The source failed; no more items follow
    Errored(OrderedStreamsError),
    /// The source is fully torn down
    Closed,
}

impl<T> SourceEvent<T> {
    /// Returns `true` for `Ended` and `Errored`.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, SourceEvent::Ended | SourceEvent::Errored(_))
    }
}

/// Uniform interface over one upstream producer.
///
/// Implementations must tolerate redundant `resume`/`pause` calls and must keep
/// items they already hold when paused. `cancel(None)` is a clean teardown,
/// `cancel(Some(reason))` makes the source report `reason` as its own error.
pub trait Source<T> {
    /// Whether the producer satisfies the contract and is still open for reading.
    ///
    /// Checked once, eagerly, when the source is registered.
    fn is_readable(&self) -> bool;

    /// Start or continue delivering items.
    fn resume(&mut self);

    /// Stop delivering items as soon as convenient.
    fn pause(&mut self);

    /// Forcibly terminate the source.
    fn cancel(&mut self, reason: Option<OrderedStreamsError>);

    /// Poll for the next event.
    ///
    /// Returns `Poll::Pending` while paused or while nothing is available, and
    /// arranges for the task to be woken when that changes.
    fn poll_event(&mut self, cx: &mut Context<'_>) -> Poll<SourceEvent<T>>;
}

/// Type-erased source as stored by the multiplexer.
pub type BoxSource<T> = Box<dyn Source<T> + Send>;

impl<T, S> Source<T> for Box<S>
where
    S: Source<T> + ?Sized,
{
    fn is_readable(&self) -> bool {
        (**self).is_readable()
    }

    fn resume(&mut self) {
        (**self).resume();
    }

    fn pause(&mut self) {
        (**self).pause();
    }

    fn cancel(&mut self, reason: Option<OrderedStreamsError>) {
        (**self).cancel(reason);
    }

    fn poll_event(&mut self, cx: &mut Context<'_>) -> Poll<SourceEvent<T>> {
        (**self).poll_event(cx)
    }
}
