// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the ordered stream multiplexer.
//!
//! A single root [`OrderedStreamsError`] covers registration failures,
//! failures reported by sources while producing, and the synthetic reason
//! handed to sources when the multiplexer is torn down underneath them.
//!
//! # Examples
//!
//! ```
//! use ordered_streams_core::{OrderedStreamsError, Result};
//!
//! fn read_config() -> Result<()> {
//!     Err(OrderedStreamsError::source_error("upstream closed the socket"))
//! }
//!
//! assert!(read_config().is_err());
//! ```

/// Root error type for all ordered-streams operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderedStreamsError {
    /// A value handed to the multiplexer does not satisfy the source contract
    ///
    /// `index` is the position of the offending element inside the batch that
    /// was being registered (always `0` for single additions).
    #[error("All input streams must be readable (element {index})")]
    NotReadable {
        /// Position of the rejected element in its batch
        index: usize,
    },

    /// A source failed while producing items
    #[error("Source error: {context}")]
    SourceError {
        /// Description of the failure
        context: String,
    },

    /// Custom error raised by user code feeding a source
    #[error("User error: {0}")]
    UserError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The multiplexer was destroyed while the receiving source was still open
    #[error("Wrapper destroyed")]
    WrapperDestroyed,

    /// The multiplexer already reached a terminal state
    #[error("Ordered streams already terminated")]
    Terminated,
}

impl OrderedStreamsError {
    /// Create a `NotReadable` error for the element at `index`
    #[must_use]
    pub const fn not_readable(index: usize) -> Self {
        Self::NotReadable { index }
    }

    /// Create a source error with the given context
    pub fn source_error(context: impl Into<String>) -> Self {
        Self::SourceError {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Box::new(error))
    }

    /// Returns `true` for the synthetic reason delivered during a destroy cascade.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::WrapperDestroyed)
    }

    /// Returns `true` if the error was raised synchronously while registering sources.
    #[must_use]
    pub const fn is_registration(&self) -> bool {
        matches!(self, Self::NotReadable { .. } | Self::Terminated)
    }
}

/// Specialized Result type for ordered-streams operations
pub type Result<T> = std::result::Result<T, OrderedStreamsError>;

impl Clone for OrderedStreamsError {
    fn clone(&self) -> Self {
        match self {
            Self::NotReadable { index } => Self::NotReadable { index: *index },
            Self::SourceError { context } => Self::SourceError {
                context: context.clone(),
            },
            // The boxed error cannot be cloned, keep its message
            Self::UserError(e) => Self::SourceError {
                context: e.to_string(),
            },
            Self::WrapperDestroyed => Self::WrapperDestroyed,
            Self::Terminated => Self::Terminated,
        }
    }
}
