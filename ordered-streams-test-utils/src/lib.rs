// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the ordered-streams workspace.
//!
//! Designed for development and testing only.
//!
//! # Key Types
//!
//! - [`TestSource`]: a scripted source. Feed it items, end or fail it, then
//!   inspect the pause/resume/cancel calls it received.
//! - [`Chunk`]: an item that remembers its origin, so order checks stay trivial.
//! - [`test_channel`]: an unbounded channel whose receiving side is a stream of
//!   `StreamItem<T>`, ready to be wrapped in a stream adapter.
//!
//! ```rust
//! use ordered_streams_test_utils::{concatenated, Chunk};
//!
//! assert_eq!(concatenated(&[1, 1]), vec![Chunk::new(0, 0), Chunk::new(1, 0)]);
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod delayed;
pub mod helpers;
pub mod test_data;
pub mod test_source;

use futures::{Stream, StreamExt};
use ordered_streams_core::StreamItem;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

pub use delayed::{delayed, delayed_error, delayed_once};
pub use helpers::{
    assert_no_element_emitted, collect_output, collect_slowly, expect_end, expect_next_value,
};
pub use test_data::{chunks, concatenated, Chunk};
pub use test_source::{TestSource, TestSourceHandle};

/// Creates a test channel that wraps sent values in `StreamItem::Value`.
///
/// # Example
///
/// ```rust
/// use ordered_streams_test_utils::test_channel;
/// use futures::StreamExt;
///
/// # async fn example() {
/// let (tx, mut stream) = test_channel();
/// tx.send(42).unwrap();
/// let item = stream.next().await.unwrap().unwrap();
/// assert_eq!(item, 42);
/// # }
/// ```
pub fn test_channel<T: Send + 'static>() -> (
    mpsc::UnboundedSender<T>,
    impl Stream<Item = StreamItem<T>> + Send,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let stream = UnboundedReceiverStream::new(rx).map(StreamItem::Value);
    (tx, stream)
}

/// Creates a test channel that accepts `StreamItem<T>` for error propagation tests.
pub fn test_channel_with_errors<T: Send + 'static>() -> (
    mpsc::UnboundedSender<StreamItem<T>>,
    impl Stream<Item = StreamItem<T>> + Send,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let stream = UnboundedReceiverStream::new(rx);
    (tx, stream)
}
