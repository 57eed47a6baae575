// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ordered_streams_core::{BoxSource, OrderedStreamsError, SourceEvent};
use std::collections::VecDeque;
use std::task::{Context, Poll};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotState {
    Open,
    Ended,
    Failed,
    Closed,
    Cancelled,
}

/// One registered source together with the items it produced ahead of its turn.
pub(crate) struct SourceSlot<T> {
    source: BoxSource<T>,
    pub(crate) buffer: VecDeque<T>,
    pub(crate) state: SlotState,
    paused: bool,
}

impl<T> SourceSlot<T> {
    pub(crate) fn new(source: BoxSource<T>) -> Self {
        Self {
            source,
            buffer: VecDeque::new(),
            state: SlotState::Open,
            // Sources start out waiting for their first resume
            paused: true,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.state == SlotState::Open
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn resume(&mut self) {
        if self.paused && self.is_open() {
            self.paused = false;
            self.source.resume();
        }
    }

    pub(crate) fn pause(&mut self) {
        if !self.paused && self.is_open() {
            self.paused = true;
            self.source.pause();
        }
    }

    pub(crate) fn poll(&mut self, cx: &mut Context<'_>) -> Poll<SourceEvent<T>> {
        self.source.poll_event(cx)
    }

    /// Cancel the source unless it already finished on its own.
    ///
    /// Returns `true` if a cancellation was delivered.
    pub(crate) fn cancel(&mut self, reason: Option<OrderedStreamsError>) -> bool {
        self.buffer.clear();
        if !self.is_open() {
            return false;
        }
        self.state = SlotState::Cancelled;
        self.source.cancel(reason);
        true
    }
}
