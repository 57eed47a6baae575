// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! An [`OrderedStreams`] is itself a [`Source`], so multiplexers nest.

use crate::ordered_streams::{OrderedStreams, Reported};
use crate::state::EngineState;
use futures::StreamExt;
use ordered_streams_core::{OrderedStreamsError, Source, SourceEvent, StreamItem};
use std::task::{Context, Poll};

impl<T> Source<T> for OrderedStreams<T> {
    fn is_readable(&self) -> bool {
        !self.state().is_terminal()
    }

    fn resume(&mut self) {
        self.downstream_paused = false;
    }

    fn pause(&mut self) {
        self.downstream_paused = true;
    }

    fn cancel(&mut self, reason: Option<OrderedStreamsError>) {
        self.destroy(reason);
    }

    fn poll_event(&mut self, cx: &mut Context<'_>) -> Poll<SourceEvent<T>> {
        match self.reported {
            Reported::Closed => return Poll::Pending,
            Reported::Terminal => {
                self.reported = Reported::Closed;
                return Poll::Ready(SourceEvent::Closed);
            }
            Reported::Live => {}
        }

        if self.downstream_paused {
            return Poll::Pending;
        }

        match self.poll_next_unpin(cx) {
            Poll::Ready(Some(StreamItem::Value(item))) => Poll::Ready(SourceEvent::Data(item)),
            Poll::Ready(Some(StreamItem::Error(err))) => {
                self.reported = Reported::Terminal;
                Poll::Ready(SourceEvent::Errored(err))
            }
            Poll::Ready(None) if self.state() == EngineState::Ended => {
                self.reported = Reported::Terminal;
                Poll::Ready(SourceEvent::Ended)
            }
            // Torn down without ending
            Poll::Ready(None) => {
                self.reported = Reported::Closed;
                Poll::Ready(SourceEvent::Closed)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
