// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fmt::{self, Display};

/// A test item that remembers which source produced it and at which position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Chunk {
    pub origin: usize,
    pub seq: usize,
}

impl Chunk {
    #[must_use]
    pub const fn new(origin: usize, seq: usize) -> Self {
        Self { origin, seq }
    }
}

impl Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chunk[origin={}, seq={}]", self.origin, self.seq)
    }
}

/// `count` chunks for the source at `origin`, in production order.
#[must_use]
pub fn chunks(origin: usize, count: usize) -> Vec<Chunk> {
    (0..count).map(|seq| Chunk::new(origin, seq)).collect()
}

/// The output expected from sources producing `counts[i]` chunks each.
#[must_use]
pub fn concatenated(counts: &[usize]) -> Vec<Chunk> {
    counts
        .iter()
        .enumerate()
        .flat_map(|(origin, &count)| chunks(origin, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenated_orders_by_origin_then_seq() {
        let expected = concatenated(&[2, 0, 1]);
        assert_eq!(expected, vec![Chunk::new(0, 0), Chunk::new(0, 1), Chunk::new(2, 0)]);
    }
}
