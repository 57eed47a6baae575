// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::OrderedStreamsError;

/// An item of the multiplexed output: either a value or the terminating error.
///
/// An `Error` is always the last item a multiplexer yields; the stream ends
/// right after it.
#[derive(Debug, Clone)]
pub enum StreamItem<T> {
    /// A value forwarded from one of the sources
    Value(T),
    /// The error that terminated the output
    Error(OrderedStreamsError),
}

impl<T: PartialEq> PartialEq for StreamItem<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StreamItem::Value(a), StreamItem::Value(b)) => a == b,
            _ => false, // Errors are never equal
        }
    }
}

impl<T> StreamItem<T> {
    /// Returns the contained value.
    ///
    /// # Panics
    ///
    /// Panics if the item is an `Error`.
    pub fn unwrap(self) -> T {
        match self {
            StreamItem::Value(v) => v,
            StreamItem::Error(e) => {
                panic!("called `StreamItem::unwrap()` on an `Error` value: {:?}", e)
            }
        }
    }
}

impl<T> From<StreamItem<T>> for Result<T, OrderedStreamsError> {
    fn from(item: StreamItem<T>) -> Self {
        match item {
            StreamItem::Value(v) => Ok(v),
            StreamItem::Error(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_result() {
        let destroyed = StreamItem::Error(OrderedStreamsError::WrapperDestroyed);
        let value: Result<u8, _> = StreamItem::Value(3).into();
        let error: Result<u8, _> = destroyed.into();

        assert!(matches!(value, Ok(3)));
        assert!(matches!(error, Err(OrderedStreamsError::WrapperDestroyed)));
    }

    #[test]
    #[should_panic(expected = "on an `Error` value")]
    fn test_unwrap_panics_on_error() {
        let item: StreamItem<u8> = StreamItem::Error(OrderedStreamsError::Terminated);
        item.unwrap();
    }
}
