// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ordered_streams_core::{BoxSource, Source};

/// One element of the list passed to [`OrderedStreams::try_new`](crate::OrderedStreams::try_new).
///
/// A `Group` is flattened in place, so lists may nest exactly one level deep.
pub enum SourceEntry<T> {
    Single(BoxSource<T>),
    Group(Vec<BoxSource<T>>),
}

impl<T> SourceEntry<T> {
    pub fn single<S>(source: S) -> Self
    where
        S: Source<T> + Send + 'static,
    {
        Self::Single(Box::new(source))
    }

    pub fn group<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Source<T> + Send + 'static,
    {
        Self::Group(
            sources
                .into_iter()
                .map(|source| Box::new(source) as BoxSource<T>)
                .collect(),
        )
    }
}

impl<T> From<BoxSource<T>> for SourceEntry<T> {
    fn from(source: BoxSource<T>) -> Self {
        Self::Single(source)
    }
}

impl<T> From<Vec<BoxSource<T>>> for SourceEntry<T> {
    fn from(sources: Vec<BoxSource<T>>) -> Self {
        Self::Group(sources)
    }
}

pub(crate) fn flatten<T, I>(entries: I) -> Vec<BoxSource<T>>
where
    I: IntoIterator,
    I::Item: Into<SourceEntry<T>>,
{
    let mut flat = Vec::new();
    for entry in entries {
        match entry.into() {
            SourceEntry::Single(source) => flat.push(source),
            SourceEntry::Group(group) => flat.extend(group),
        }
    }
    flat
}
