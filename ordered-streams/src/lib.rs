// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Ordered stream multiplexing.
//!
//! [`OrderedStreams`] turns an ordered list of sources into a single stream that
//! yields every item of source 0, then every item of source 1, and so on. All
//! sources are consumed concurrently; items that arrive ahead of their turn are
//! buffered per source. Sources can be appended at any time before the output
//! ends, through [`OrderedStreams::add_source`] or a cloned
//! [`OrderedStreamsHandle`].
//!
//! Destruction cascades both ways: destroying the multiplexer cancels every open
//! source, and a source that closes without ending tears the multiplexer down.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
#[macro_use]
mod logging;

pub mod ext;
pub mod handle;
mod nested;
pub mod options;
pub mod ordered_streams;
mod slot;
pub mod source_entry;
pub mod state;
pub mod stream_source;

pub use ext::{OrderedStreamsExt, OrderedValuesExt};
pub use handle::OrderedStreamsHandle;
pub use options::{OrderedStreamsOptions, DEFAULT_HIGH_WATER_MARK};
pub use ordered_streams::OrderedStreams;
pub use source_entry::SourceEntry;
pub use state::{EngineState, OrderedEvent, Termination};
pub use stream_source::{SourceControl, StreamSource};

pub use ordered_streams_core::{
    BoxSource, OrderedStreamsError, Result, Source, SourceEvent, StreamItem,
};
