// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A scripted [`Source`] whose events are fed and whose control calls are
//! recorded through a [`TestSourceHandle`].

use ordered_streams_core::{OrderedStreamsError, Source, SourceEvent};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

struct Script<T> {
    queue: VecDeque<SourceEvent<T>>,
    readable: bool,
    paused: bool,
    finished: bool,
    resumes: usize,
    pauses: usize,
    cancellations: Vec<Option<OrderedStreamsError>>,
    waker: Option<Waker>,
}

impl<T> Script<T> {
    fn enqueue(&mut self, event: SourceEvent<T>) {
        self.queue.push_back(event);
        if let Some(waker) = self.waker.take() {
            waker.wake();
        }
    }
}

/// Scripted source for exercising the multiplexer deterministically.
///
/// While paused, `Data` and `Ended` are held back; `Errored` and `Closed` are
/// delivered regardless.
pub struct TestSource<T> {
    script: Arc<Mutex<Script<T>>>,
}

/// Feeds a [`TestSource`] and inspects how it was driven.
pub struct TestSourceHandle<T> {
    script: Arc<Mutex<Script<T>>>,
}

impl<T> TestSource<T> {
    /// An open source with nothing queued yet.
    #[must_use]
    pub fn new() -> (Self, TestSourceHandle<T>) {
        Self::with_readable(true)
    }

    /// A source that fails the readability check, like a write-only stream.
    #[must_use]
    pub fn unreadable() -> (Self, TestSourceHandle<T>) {
        Self::with_readable(false)
    }

    /// A source that will produce `items` and then end.
    pub fn from_items<I>(items: I) -> (Self, TestSourceHandle<T>)
    where
        I: IntoIterator<Item = T>,
    {
        let (source, handle) = Self::new();
        for item in items {
            handle.push(item);
        }
        handle.end();
        (source, handle)
    }

    fn with_readable(readable: bool) -> (Self, TestSourceHandle<T>) {
        let script = Arc::new(Mutex::new(Script {
            queue: VecDeque::new(),
            readable,
            paused: false,
            finished: false,
            resumes: 0,
            pauses: 0,
            cancellations: Vec::new(),
            waker: None,
        }));
        (
            Self {
                script: Arc::clone(&script),
            },
            TestSourceHandle { script },
        )
    }
}

impl<T> TestSourceHandle<T> {
    pub fn push(&self, item: T) {
        self.script.lock().enqueue(SourceEvent::Data(item));
    }

    /// Queue end-of-data followed by the close notification.
    pub fn end(&self) {
        let mut script = self.script.lock();
        script.enqueue(SourceEvent::Ended);
        script.enqueue(SourceEvent::Closed);
    }

    /// Queue a failure followed by the close notification.
    pub fn fail(&self, err: OrderedStreamsError) {
        let mut script = self.script.lock();
        script.enqueue(SourceEvent::Errored(err));
        script.enqueue(SourceEvent::Closed);
    }

    /// Close the source from the outside, without ending it.
    pub fn destroy(&self) {
        self.script.lock().enqueue(SourceEvent::Closed);
    }

    #[must_use]
    pub fn resume_count(&self) -> usize {
        self.script.lock().resumes
    }

    #[must_use]
    pub fn pause_count(&self) -> usize {
        self.script.lock().pauses
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.script.lock().paused
    }

    /// Every reason the source was cancelled with, in call order.
    #[must_use]
    pub fn cancellations(&self) -> Vec<Option<OrderedStreamsError>> {
        self.script.lock().cancellations.clone()
    }

    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        !self.script.lock().cancellations.is_empty()
    }

    /// Events queued but not yet polled.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.script.lock().queue.len()
    }
}

impl<T> Clone for TestSourceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
        }
    }
}

impl<T> Source<T> for TestSource<T> {
    fn is_readable(&self) -> bool {
        let script = self.script.lock();
        script.readable && !script.finished
    }

    fn resume(&mut self) {
        let mut script = self.script.lock();
        script.resumes += 1;
        script.paused = false;
        if let Some(waker) = script.waker.take() {
            waker.wake();
        }
    }

    fn pause(&mut self) {
        let mut script = self.script.lock();
        script.pauses += 1;
        script.paused = true;
    }

    fn cancel(&mut self, reason: Option<OrderedStreamsError>) {
        let mut script = self.script.lock();
        script.cancellations.push(reason.clone());
        script.queue.clear();
        if let Some(err) = reason {
            script.enqueue(SourceEvent::Errored(err));
        }
        script.enqueue(SourceEvent::Closed);
    }

    fn poll_event(&mut self, cx: &mut Context<'_>) -> Poll<SourceEvent<T>> {
        let mut script = self.script.lock();
        if script.finished {
            return Poll::Pending;
        }

        let held_back = script.paused
            && matches!(
                script.queue.front(),
                Some(SourceEvent::Data(_) | SourceEvent::Ended)
            );

        match script.queue.pop_front() {
            Some(event) if !held_back => {
                if matches!(event, SourceEvent::Closed) {
                    script.finished = true;
                }
                Poll::Ready(event)
            }
            Some(event) => {
                script.queue.push_front(event);
                script.waker = Some(cx.waker().clone());
                Poll::Pending
            }
            None => {
                script.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::task::noop_waker_ref;

    fn poll(source: &mut TestSource<u8>) -> Poll<SourceEvent<u8>> {
        source.poll_event(&mut Context::from_waker(noop_waker_ref()))
    }

    #[test]
    fn test_from_items_plays_script_in_order() {
        let (mut source, _handle) = TestSource::from_items([1, 2]);

        assert!(matches!(poll(&mut source), Poll::Ready(SourceEvent::Data(1))));
        assert!(matches!(poll(&mut source), Poll::Ready(SourceEvent::Data(2))));
        assert!(matches!(poll(&mut source), Poll::Ready(SourceEvent::Ended)));
        assert!(matches!(poll(&mut source), Poll::Ready(SourceEvent::Closed)));
        assert!(poll(&mut source).is_pending());
    }

    #[test]
    fn test_pause_holds_back_data() {
        let (mut source, handle) = TestSource::from_items([1]);

        source.pause();
        assert!(poll(&mut source).is_pending());
        assert!(handle.is_paused());

        source.resume();
        assert!(matches!(poll(&mut source), Poll::Ready(SourceEvent::Data(1))));
        assert_eq!((handle.pause_count(), handle.resume_count()), (1, 1));
    }

    #[test]
    fn test_cancel_records_reason_and_replaces_script() {
        let (mut source, handle) = TestSource::from_items([1]);

        source.cancel(Some(OrderedStreamsError::WrapperDestroyed));

        assert!(matches!(
            handle.cancellations().as_slice(),
            [Some(OrderedStreamsError::WrapperDestroyed)]
        ));
        assert!(matches!(
            poll(&mut source),
            Poll::Ready(SourceEvent::Errored(OrderedStreamsError::WrapperDestroyed))
        ));
        assert!(matches!(poll(&mut source), Poll::Ready(SourceEvent::Closed)));
    }

    #[test]
    fn test_unreadable_source_fails_check() {
        let (source, _handle) = TestSource::<u8>::unreadable();
        assert!(!source.is_readable());
    }
}
