// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Runtime-agnostic one-shot close latch.
//!
//! A [`CloseSignal`] is closed at most once and remembers why. Clones share the
//! same state, so one side can close it while any number of tasks await
//! [`CloseSignal::closed`].

use event_listener::{Event, EventListener};
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Clonable close latch carrying the reason it was closed with.
///
/// # Example
///
/// ```
/// use ordered_streams_core::CloseSignal;
///
/// # async fn example() {
/// let signal = CloseSignal::new();
/// let waiter = signal.clone();
///
/// assert!(signal.close("done"));
/// assert!(!signal.close("ignored"));
///
/// waiter.closed().await;
/// assert_eq!(waiter.reason(), Some("done"));
/// # }
/// ```
#[derive(Debug)]
pub struct CloseSignal<R> {
    inner: Arc<Inner<R>>,
}

#[derive(Debug)]
struct Inner<R> {
    closed: AtomicBool,
    reason: Mutex<Option<R>>,
    event: Event,
}

impl<R> CloseSignal<R> {
    /// Create an open signal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                closed: AtomicBool::new(false),
                reason: Mutex::new(None),
                event: Event::new(),
            }),
        }
    }

    /// Close the signal with `reason`, waking all waiters.
    ///
    /// Only the first call has an effect; it returns `true`.
    pub fn close(&self, reason: R) -> bool {
        {
            let mut slot = self.inner.reason.lock();
            if slot.is_some() {
                return false;
            }
            *slot = Some(reason);
        }

        // Publish after the reason is stored so waiters always observe it
        self.inner.closed.store(true, Ordering::Release);
        self.inner.event.notify(usize::MAX);
        true
    }

    /// Check whether the signal has been closed (non-blocking).
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Wait until the signal is closed. Resolves immediately if it already is.
    pub fn closed(&self) -> Closed<'_, R> {
        Closed {
            signal: self,
            listener: None,
        }
    }
}

impl<R: Clone> CloseSignal<R> {
    /// The reason the signal was closed with, if any.
    pub fn reason(&self) -> Option<R> {
        self.inner.reason.lock().clone()
    }
}

impl<R> Clone for CloseSignal<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Default for CloseSignal<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Future returned by [`CloseSignal::closed()`].
pub struct Closed<'a, R> {
    signal: &'a CloseSignal<R>,
    listener: Option<EventListener>,
}

impl<R> Future for Closed<'_, R> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();

        loop {
            if this.signal.is_closed() {
                return Poll::Ready(());
            }

            match this.listener.as_mut() {
                // Register, then re-check the flag before sleeping
                None => this.listener = Some(this.signal.inner.event.listen()),
                Some(listener) => match Pin::new(listener).poll(cx) {
                    Poll::Ready(()) => this.listener = None,
                    Poll::Pending => return Poll::Pending,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_signal_is_open() {
        let signal = CloseSignal::<u8>::new();
        assert!(!signal.is_closed());
        assert_eq!(signal.reason(), None);
    }

    #[test]
    fn test_first_close_wins() {
        let signal = CloseSignal::new();
        assert!(signal.close(1));
        assert!(!signal.close(2));
        assert_eq!(signal.reason(), Some(1));
    }

    #[test]
    fn test_clone_shares_state() {
        let signal = CloseSignal::new();
        let other = signal.clone();

        other.close("closed");

        assert!(signal.is_closed());
        assert_eq!(signal.reason(), Some("closed"));
    }

    #[tokio::test]
    async fn test_closed_resolves_immediately_if_already_closed() {
        let signal = CloseSignal::new();
        signal.close(());
        signal.closed().await;
    }

    #[tokio::test]
    async fn test_closed_waits_until_close() {
        let signal = CloseSignal::new();
        let waiter = signal.clone();

        let task = tokio::spawn(async move {
            waiter.closed().await;
            waiter.reason()
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.close(7_u32);

        assert_eq!(task.await.unwrap(), Some(7));
    }
}
