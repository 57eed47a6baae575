// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Timer-driven streams for simulating producers of different speeds.

use futures::stream::{self, Stream};
use ordered_streams_core::{OrderedStreamsError, StreamItem};
use std::time::Duration;
use tokio::time::sleep;

/// Yields each item after waiting `delay` before it.
pub fn delayed<T, I>(items: I, delay: Duration) -> impl Stream<Item = StreamItem<T>> + Send
where
    I: IntoIterator<Item = T>,
    I::IntoIter: Send,
    T: Send,
{
    stream::unfold(items.into_iter(), move |mut items| async move {
        let item = items.next()?;
        sleep(delay).await;
        Some((StreamItem::Value(item), items))
    })
}

/// Waits `delay`, yields `item` once, then ends.
pub fn delayed_once<T: Send>(item: T, delay: Duration) -> impl Stream<Item = StreamItem<T>> + Send {
    delayed(Some(item), delay)
}

/// Waits `delay`, then fails with `err` without yielding anything.
pub fn delayed_error<T: Send>(
    err: OrderedStreamsError,
    delay: Duration,
) -> impl Stream<Item = StreamItem<T>> + Send {
    stream::once(async move {
        sleep(delay).await;
        StreamItem::Error(err)
    })
}
