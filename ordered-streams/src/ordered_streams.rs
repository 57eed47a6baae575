// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::handle::{OrderedStreamsHandle, Shared};
use crate::options::OrderedStreamsOptions;
use crate::slot::{SlotState, SourceSlot};
use crate::source_entry::{flatten, SourceEntry};
use crate::state::{EngineState, OrderedEvent, Termination};
use futures::stream::FusedStream;
use futures::Stream;
use ordered_streams_core::{
    BoxSource, OrderedStreamsError, Result, Source, SourceEvent, StreamItem,
};
use std::collections::VecDeque;
use std::mem;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Concatenates many sources into one output, strictly in source order.
///
/// Every registered source is consumed concurrently, but only the *active*
/// source (the first one that has not been drained) forwards its items
/// directly. Items produced by later sources are buffered per source and
/// flushed, in order, once their source becomes active.
///
/// The output yields `StreamItem::Value` for each item. The first source error
/// is yielded as a final `StreamItem::Error` after the items that were already
/// forwarded, and every other source is cancelled.
///
/// # Backpressure
///
/// Forwarded items wait in an output queue until the consumer polls them. Once
/// that queue holds `high_water_mark` items the active source is paused; it is
/// resumed on the next poll.
///
/// # Example
///
/// ```
/// use futures::{stream, StreamExt};
/// use ordered_streams::{OrderedStreams, StreamSource};
///
/// # #[tokio::main]
/// # async fn main() {
/// let output = OrderedStreams::from_sources(vec![
///     StreamSource::values(stream::iter(vec![1, 2])),
///     StreamSource::values(stream::iter(vec![3])),
/// ])
/// .unwrap();
///
/// let values: Vec<i32> = output.map(|item| item.unwrap()).collect().await;
/// assert_eq!(values, vec![1, 2, 3]);
/// # }
/// ```
pub struct OrderedStreams<T> {
    slots: Vec<SourceSlot<T>>,
    active: usize,
    announced: usize,
    output: VecDeque<T>,
    pending_error: Option<OrderedStreamsError>,
    options: OrderedStreamsOptions,
    state: EngineState,
    shared: Arc<Shared<T>>,
    pub(crate) downstream_paused: bool,
    pub(crate) reported: Reported,
}

/// How far the terminal events of a nested multiplexer have been reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reported {
    Live,
    Terminal,
    Closed,
}

// No field is ever pinned structurally
impl<T> Unpin for OrderedStreams<T> {}

impl<T> OrderedStreams<T> {
    /// Create an empty multiplexer with default options.
    ///
    /// It stays open until first polled, so sources can still be added.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(OrderedStreamsOptions::default())
    }

    /// Create an empty multiplexer with the given options.
    #[must_use]
    pub fn with_options(options: OrderedStreamsOptions) -> Self {
        Self {
            slots: Vec::new(),
            active: 0,
            announced: 0,
            output: VecDeque::new(),
            pending_error: None,
            options,
            state: EngineState::Idle,
            shared: Arc::new(Shared::new()),
            downstream_paused: false,
            reported: Reported::Live,
        }
    }

    /// Create a multiplexer over `entries`, flattening groups one level deep.
    ///
    /// Every source is validated before any of them is registered or resumed.
    ///
    /// # Errors
    ///
    /// Returns `OrderedStreamsError::NotReadable` carrying the position (in the
    /// flattened list) of the first source that fails its readability check.
    pub fn try_new<I>(entries: I, options: OrderedStreamsOptions) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<SourceEntry<T>>,
    {
        let sources = flatten(entries);
        if let Some(index) = sources.iter().position(|source| !source.is_readable()) {
            return Err(OrderedStreamsError::not_readable(index));
        }

        let mut streams = Self::with_options(options);
        for source in sources {
            streams.register(source);
        }
        Ok(streams)
    }

    /// Create a multiplexer over a flat list of sources with default options.
    ///
    /// # Errors
    ///
    /// Returns `OrderedStreamsError::NotReadable` if any source fails its readability check.
    pub fn from_sources<I, S>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Source<T> + Send + 'static,
    {
        Self::try_new(
            sources.into_iter().map(SourceEntry::single),
            OrderedStreamsOptions::default(),
        )
    }

    /// Append a source after every source registered so far.
    ///
    /// Sources handed to an [`OrderedStreamsHandle`] before this call keep their
    /// place ahead of it. If every earlier source was already drained, the new
    /// source becomes active and end-of-data is postponed.
    ///
    /// # Errors
    ///
    /// - `OrderedStreamsError::NotReadable` if the source fails its readability check.
    /// - `OrderedStreamsError::Terminated` if the multiplexer already reached a terminal state.
    pub fn add_source<S>(&mut self, source: S) -> Result<()>
    where
        S: Source<T> + Send + 'static,
    {
        if !source.is_readable() {
            return Err(OrderedStreamsError::not_readable(0));
        }

        // Sources queued through handles were appended first
        self.absorb_inbox();
        if self.state.is_terminal() {
            return Err(OrderedStreamsError::Terminated);
        }

        self.register(Box::new(source));
        Ok(())
    }

    /// Tear the multiplexer down, cancelling every source that is still open
    /// with `OrderedStreamsError::WrapperDestroyed`.
    ///
    /// Items not yet consumed are discarded. A `reason` is yielded to the
    /// consumer as the final error item. Does nothing once terminal.
    pub fn destroy(&mut self, reason: Option<OrderedStreamsError>) {
        if self.state.is_terminal() {
            return;
        }

        debug!("ordered streams destroyed (reason: {:?})", reason);
        self.output.clear();
        self.pending_error = reason;
        self.terminate(
            Termination::Destroyed,
            Some(OrderedStreamsError::WrapperDestroyed),
        );
    }

    /// A handle for adding sources, destroying, and observing from elsewhere.
    #[must_use]
    pub fn handle(&self) -> OrderedStreamsHandle<T> {
        OrderedStreamsHandle::new(Arc::clone(&self.shared))
    }

    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub const fn options(&self) -> &OrderedStreamsOptions {
        &self.options
    }

    /// Position of the source currently allowed to forward items.
    ///
    /// Equal to [`len`](Self::len) once every registered source was drained.
    #[must_use]
    pub const fn active_index(&self) -> usize {
        self.active
    }

    /// Number of registered sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Items buffered for the source at `index` while waiting for its turn.
    #[must_use]
    pub fn buffered_len(&self, index: usize) -> Option<usize> {
        self.slots.get(index).map(|slot| slot.buffer.len())
    }

    pub(crate) fn register(&mut self, source: BoxSource<T>) {
        let index = self.slots.len();
        let mut slot = SourceSlot::new(source);
        slot.resume();
        self.slots.push(slot);

        if self.state == EngineState::Idle {
            self.set_state(EngineState::Flowing);
        }

        debug!("registered source {}", index);
        self.shared.events.send(OrderedEvent::SourceAdded { index });
    }

    fn set_state(&mut self, state: EngineState) {
        self.state = state;
        self.shared.inbox.lock().state = state;
    }

    /// Apply requests queued through handles. Returns `true` if anything changed.
    fn absorb_inbox(&mut self) -> bool {
        let (sources, destroy) = {
            let mut inbox = self.shared.inbox.lock();
            (mem::take(&mut inbox.sources), inbox.destroy.take())
        };

        if let Some(reason) = destroy {
            self.destroy(reason);
            cancel_unregistered(sources);
            return true;
        }

        if sources.is_empty() {
            return false;
        }

        for source in sources {
            self.register(source);
        }
        true
    }

    /// Enter a terminal state and cascade `cascade` to every open source.
    fn terminate(&mut self, termination: Termination, cascade: Option<OrderedStreamsError>) {
        let late = {
            let mut inbox = self.shared.inbox.lock();
            inbox.state = termination.state();
            mem::take(&mut inbox.sources)
        };
        self.state = termination.state();

        let cancelled = self
            .slots
            .iter_mut()
            .map(|slot| slot.cancel(cascade.clone()))
            .filter(|delivered| *delivered)
            .count();
        debug!(
            "ordered streams terminated with {:?}, cancelled {} open sources",
            termination, cancelled
        );
        cancel_unregistered(late);

        self.shared.closed.close(termination);
        self.shared.events.send(OrderedEvent::Closed(termination));
        self.shared.events.close();
    }

    /// Signal end-of-data unless a source was appended in the meantime.
    fn finish(&mut self) -> bool {
        {
            let mut inbox = self.shared.inbox.lock();
            if !inbox.sources.is_empty() {
                return false;
            }
            inbox.state = EngineState::Ended;
        }
        self.state = EngineState::Ended;

        debug!("all {} sources drained", self.slots.len());
        self.shared.closed.close(Termination::Ended);
        self.shared
            .events
            .send(OrderedEvent::Closed(Termination::Ended));
        self.shared.events.close();
        true
    }

    fn next_terminal_item(&mut self) -> Option<StreamItem<T>> {
        if let Some(item) = self.output.pop_front() {
            return Some(StreamItem::Value(item));
        }
        self.pending_error.take().map(StreamItem::Error)
    }

    fn high_water_mark(&self) -> usize {
        self.options.high_water_mark()
    }

    /// Flush the active source's buffer and step past drained sources.
    fn settle_active(&mut self) -> bool {
        let high_water_mark = self.high_water_mark();
        let mut progressed = false;

        while self.active < self.slots.len() {
            let index = self.active;
            if index >= self.announced {
                self.announced = index + 1;
                debug!("source {} is now active", index);
                self.shared
                    .events
                    .send(OrderedEvent::SourceStarted { index });
            }

            let slot = &mut self.slots[index];
            while self.output.len() < high_water_mark {
                match slot.buffer.pop_front() {
                    Some(item) => {
                        self.output.push_back(item);
                        progressed = true;
                    }
                    None => break,
                }
            }

            // Backpressured mid-drain, or still producing
            if !slot.buffer.is_empty() || slot.state != SlotState::Ended {
                break;
            }

            debug!("source {} drained", index);
            self.shared.events.send(OrderedEvent::SourceEnded { index });
            self.active += 1;
            progressed = true;
        }

        progressed
    }

    /// Poll sources and route their events until no more progress is possible.
    ///
    /// Returns `true` if a waiting source produced synchronously and may have more.
    fn pump(&mut self, cx: &mut Context<'_>) -> bool {
        let mut rewake = false;

        loop {
            let mut progressed = self.absorb_inbox();
            if self.state.is_terminal() {
                break;
            }

            progressed |= self.settle_active();

            let index = self.active;
            let high_water_mark = self.high_water_mark();
            if let Some(slot) = self.slots.get_mut(index) {
                if slot.is_open() && slot.buffer.is_empty() && self.output.len() < high_water_mark {
                    if slot.is_paused() {
                        debug!("resuming source {}", index);
                    }
                    slot.resume();
                    if let Poll::Ready(event) = slot.poll(cx) {
                        self.dispatch(index, event);
                        progressed = true;
                    }
                }
            }
            if self.state.is_terminal() {
                break;
            }

            for index in self.active + 1..self.slots.len() {
                if !self.slots[index].is_open() {
                    continue;
                }
                if let Poll::Ready(event) = self.slots[index].poll(cx) {
                    self.dispatch(index, event);
                    rewake = true;
                    if self.state.is_terminal() {
                        break;
                    }
                }
            }
            if self.state.is_terminal() || !progressed {
                break;
            }
        }

        rewake
    }

    fn dispatch(&mut self, index: usize, event: SourceEvent<T>) {
        match event {
            SourceEvent::Data(item) => self.on_data(index, item),
            SourceEvent::Ended => self.on_ended(index),
            SourceEvent::Errored(err) => self.on_errored(index, err),
            SourceEvent::Closed => self.on_closed(index),
        }
    }

    fn on_data(&mut self, index: usize, item: T) {
        let high_water_mark = self.high_water_mark();
        let read_ahead = self.options.read_ahead();
        let slot = &mut self.slots[index];

        if index == self.active && slot.buffer.is_empty() {
            self.output.push_back(item);
            if self.output.len() >= high_water_mark {
                debug!("backpressure: pausing source {}", index);
                slot.pause();
            }
            return;
        }

        slot.buffer.push_back(item);
        if index != self.active && read_ahead.is_some_and(|limit| slot.buffer.len() >= limit) {
            debug!("read-ahead limit reached: pausing source {}", index);
            slot.pause();
        }
    }

    fn on_ended(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        if slot.is_open() {
            slot.state = SlotState::Ended;
            debug!(
                "source {} ended with {} buffered items",
                index,
                slot.buffer.len()
            );
        }
    }

    fn on_errored(&mut self, index: usize, err: OrderedStreamsError) {
        let slot = &mut self.slots[index];
        if !slot.is_open() {
            return;
        }
        slot.state = SlotState::Failed;
        if index == self.active {
            self.active += 1;
        }

        warn!("source {} failed: {}", index, err);
        self.pending_error = Some(err);
        // The failing source is the cause, the others are just torn down
        self.terminate(Termination::SourceFailed { index }, None);
    }

    fn on_closed(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        if !slot.is_open() {
            return;
        }
        slot.state = SlotState::Closed;

        warn!("source {} closed before ending", index);
        self.output.clear();
        self.terminate(
            Termination::SourceClosed { index },
            Some(OrderedStreamsError::WrapperDestroyed),
        );
    }
}

fn cancel_unregistered<T>(sources: Vec<BoxSource<T>>) {
    for mut source in sources {
        source.cancel(Some(OrderedStreamsError::WrapperDestroyed));
    }
}

impl<T> Default for OrderedStreams<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Stream for OrderedStreams<T> {
    type Item = StreamItem<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.shared.waker.register(cx.waker());

        loop {
            if this.state.is_terminal() {
                return Poll::Ready(this.next_terminal_item());
            }

            let rewake = this.pump(cx);

            if let Some(item) = this.output.pop_front() {
                return Poll::Ready(Some(StreamItem::Value(item)));
            }
            if this.state.is_terminal() {
                continue;
            }
            if this.active >= this.slots.len() {
                if this.finish() {
                    return Poll::Ready(None);
                }
                // A source arrived while finishing
                continue;
            }

            if rewake {
                cx.waker().wake_by_ref();
            }
            return Poll::Pending;
        }
    }
}

impl<T> FusedStream for OrderedStreams<T> {
    fn is_terminated(&self) -> bool {
        self.state.is_terminal() && self.output.is_empty() && self.pending_error.is_none()
    }
}

impl<T> Drop for OrderedStreams<T> {
    fn drop(&mut self) {
        if !self.state.is_terminal() {
            self.destroy(None);
        }
    }
}
