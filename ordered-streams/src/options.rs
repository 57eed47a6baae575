// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Default number of forwarded-but-unconsumed items before the active source is paused.
pub const DEFAULT_HIGH_WATER_MARK: usize = 16;

/// Buffering configuration for [`OrderedStreams`](crate::OrderedStreams).
///
/// Only thresholds are configurable; how items are read and sequenced is not.
///
/// # Example
///
/// ```
/// use ordered_streams::OrderedStreamsOptions;
///
/// let options = OrderedStreamsOptions::new()
///     .with_high_water_mark(1)
///     .with_read_ahead(64);
///
/// assert_eq!(options.high_water_mark(), 1);
/// assert_eq!(options.read_ahead(), Some(64));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedStreamsOptions {
    high_water_mark: usize,
    read_ahead: Option<usize>,
}

impl OrderedStreamsOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            read_ahead: None,
        }
    }

    /// Output queue length at which the active source is paused. Clamped to at least 1.
    #[must_use]
    pub const fn with_high_water_mark(mut self, high_water_mark: usize) -> Self {
        self.high_water_mark = if high_water_mark == 0 { 1 } else { high_water_mark };
        self
    }

    /// Per-source buffer length at which a waiting source is paused until its turn.
    ///
    /// Without a limit, waiting sources are read to exhaustion. Clamped to at least 1.
    #[must_use]
    pub const fn with_read_ahead(mut self, limit: usize) -> Self {
        self.read_ahead = Some(if limit == 0 { 1 } else { limit });
        self
    }

    #[must_use]
    pub const fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    #[must_use]
    pub const fn read_ahead(&self) -> Option<usize> {
        self.read_ahead
    }
}

impl Default for OrderedStreamsOptions {
    fn default() -> Self {
        Self::new()
    }
}
