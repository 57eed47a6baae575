// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core traits and types shared by the ordered-streams crates.
//!
//! - [`Source`] is the contract every upstream producer is normalized to.
//! - [`StreamItem`] is the item type of the multiplexed output.
//! - [`OrderedStreamsError`] is the root error type.
//! - [`CloseSignal`] and [`EventSubject`] carry lifecycle notifications.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod close_signal;
pub mod error;
pub mod event_subject;
pub mod source;
pub mod stream_item;

pub use self::close_signal::{CloseSignal, Closed};
pub use self::error::{OrderedStreamsError, Result};
pub use self::event_subject::{EventStream, EventSubject};
pub use self::source::{BoxSource, Source, SourceEvent};
pub use self::stream_item::StreamItem;
