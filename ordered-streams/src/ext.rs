// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::ordered_streams::OrderedStreams;
use crate::stream_source::StreamSource;
use futures::Stream;
use ordered_streams_core::StreamItem;

/// Extension trait for concatenating a vector of fallible streams in order.
pub trait OrderedStreamsExt<T> {
    /// Emits every item of the first stream, then of the second, and so on,
    /// while polling all of them concurrently.
    fn ordered_streams(self) -> OrderedStreams<T>;
}

impl<T, S> OrderedStreamsExt<T> for Vec<S>
where
    S: Stream<Item = StreamItem<T>> + Send + 'static,
    T: 'static,
{
    fn ordered_streams(self) -> OrderedStreams<T> {
        let mut streams = OrderedStreams::new();
        for stream in self {
            // Freshly wrapped streams are always readable
            streams.register(Box::new(StreamSource::new(stream)));
        }
        streams
    }
}

/// Extension trait for concatenating a vector of infallible streams in order.
pub trait OrderedValuesExt<T> {
    /// Like [`OrderedStreamsExt::ordered_streams`] for streams of plain values.
    fn ordered_values(self) -> OrderedStreams<T>;
}

impl<T, S> OrderedValuesExt<T> for Vec<S>
where
    S: Stream<Item = T> + Send + 'static,
    T: 'static,
{
    fn ordered_values(self) -> OrderedStreams<T> {
        let mut streams = OrderedStreams::new();
        for stream in self {
            streams.register(Box::new(StreamSource::values(stream)));
        }
        streams
    }
}
