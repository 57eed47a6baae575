// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Lifecycle of an [`OrderedStreams`](crate::OrderedStreams).
///
/// `Ended`, `Errored` and `Destroyed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No source registered and nothing pulled yet
    Idle,
    /// At least one source registered
    Flowing,
    /// Every source drained and end-of-data signalled
    Ended,
    /// A source failed
    Errored,
    /// Torn down by a destroy request or by a source closing early
    Destroyed,
}

impl EngineState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Errored | Self::Destroyed)
    }
}

/// Why an [`OrderedStreams`](crate::OrderedStreams) closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// All sources drained
    Ended,
    /// The source at `index` reported an error
    SourceFailed { index: usize },
    /// Destroyed explicitly, through a handle, or by being dropped
    Destroyed,
    /// The source at `index` closed without ending
    SourceClosed { index: usize },
}

impl Termination {
    /// The terminal state this termination leads to.
    #[must_use]
    pub const fn state(self) -> EngineState {
        match self {
            Self::Ended => EngineState::Ended,
            Self::SourceFailed { .. } => EngineState::Errored,
            Self::Destroyed | Self::SourceClosed { .. } => EngineState::Destroyed,
        }
    }
}

/// Progress notifications broadcast to
/// [`subscribe_events`](crate::OrderedStreamsHandle::subscribe_events) subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderedEvent {
    /// A source was registered at `index`
    SourceAdded { index: usize },
    /// The source at `index` became the active one
    SourceStarted { index: usize },
    /// The source at `index` was fully drained
    SourceEnded { index: usize },
    /// The multiplexer reached a terminal state
    Closed(Termination),
}
