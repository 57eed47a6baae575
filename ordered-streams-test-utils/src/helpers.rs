// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::stream::{Stream, StreamExt};
use ordered_streams_core::{OrderedStreamsError, StreamItem};
use std::fmt::Debug;
use std::time::Duration;
use tokio::time::sleep;

pub async fn assert_no_element_emitted<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    tokio::select! {
        _item = stream.next() => {
            panic!("Unexpected emission, expected no output.");
        }
        () = sleep(Duration::from_millis(timeout_ms)) => {
        }
    }
}

pub async fn expect_next_value<S, T>(stream: &mut S, expected: T)
where
    S: Stream<Item = StreamItem<T>> + Unpin,
    T: PartialEq + Debug,
{
    match stream.next().await {
        Some(StreamItem::Value(value)) => assert_eq!(value, expected),
        other => panic!("expected value {expected:?}, got {other:?}"),
    }
}

pub async fn expect_end<S, T>(stream: &mut S)
where
    S: Stream<Item = StreamItem<T>> + Unpin,
    T: Debug,
{
    let next = stream.next().await;
    assert!(next.is_none(), "expected end of stream, got {next:?}");
}

/// Drain a multiplexed output into its values and the terminating error, if any.
pub async fn collect_output<S, T>(stream: S) -> (Vec<T>, Option<OrderedStreamsError>)
where
    S: Stream<Item = StreamItem<T>>,
{
    let mut stream = Box::pin(stream);
    let mut values = Vec::new();
    while let Some(item) = stream.next().await {
        match Result::<T, OrderedStreamsError>::from(item) {
            Ok(value) => values.push(value),
            Err(err) => {
                assert!(stream.next().await.is_none(), "error must be the last item");
                return (values, Some(err));
            }
        }
    }
    (values, None)
}

/// Consume `stream`, sleeping `delay` after every item, like a slow writer.
pub async fn collect_slowly<S, T>(
    stream: S,
    delay: Duration,
) -> (Vec<T>, Option<OrderedStreamsError>)
where
    S: Stream<Item = StreamItem<T>>,
{
    let mut stream = Box::pin(stream);
    let mut values = Vec::new();
    while let Some(item) = stream.next().await {
        match Result::<T, OrderedStreamsError>::from(item) {
            Ok(value) => values.push(value),
            Err(err) => return (values, Some(err)),
        }
        sleep(delay).await;
    }
    (values, None)
}
