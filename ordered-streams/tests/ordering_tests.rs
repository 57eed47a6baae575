// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::stream;
use ordered_streams::{OrderedStreams, OrderedStreamsOptions, SourceEntry, StreamSource};
use ordered_streams_test_utils::{
    chunks, collect_output, concatenated, delayed, expect_next_value, Chunk, TestSource,
};
use std::time::Duration;

#[tokio::test]
async fn test_sources_with_different_speeds_are_concatenated_in_order() -> anyhow::Result<()> {
    // Arrange
    let slow = StreamSource::new(delayed(chunks(0, 3), Duration::from_millis(15)));
    let instant = StreamSource::values(stream::iter(chunks(1, 4)));
    let medium = StreamSource::new(delayed(chunks(2, 2), Duration::from_millis(5)));

    let output = OrderedStreams::try_new(
        vec![
            SourceEntry::single(slow),
            SourceEntry::single(instant),
            SourceEntry::single(medium),
        ],
        OrderedStreamsOptions::default(),
    )?;

    // Act
    let (values, error) = collect_output(output).await;

    // Assert
    assert!(error.is_none());
    assert_eq!(values, concatenated(&[3, 4, 2]));
    Ok(())
}

#[tokio::test]
async fn test_instant_sources_interleaved_with_slow_ones() -> anyhow::Result<()> {
    // Arrange
    let mut output = OrderedStreams::new();
    for origin in 0..6 {
        let items = chunks(origin, 3);
        if origin % 2 == 0 {
            output.add_source(StreamSource::values(stream::iter(items)))?;
        } else {
            output.add_source(StreamSource::new(delayed(items, Duration::from_millis(3))))?;
        }
    }

    // Act
    let (values, error) = collect_output(output).await;

    // Assert
    assert!(error.is_none());
    assert_eq!(values, concatenated(&[3; 6]));
    Ok(())
}

#[tokio::test]
async fn test_later_source_finishing_first_waits_for_its_turn() -> anyhow::Result<()> {
    // Arrange
    let (first, first_handle) = TestSource::new();
    let (second, _second_handle) = TestSource::from_items(chunks(1, 2));
    let mut output = OrderedStreams::from_sources(vec![first, second])?;

    // Act
    first_handle.push(Chunk::new(0, 0));

    // Assert
    expect_next_value(&mut output, Chunk::new(0, 0)).await;
    assert_eq!(output.buffered_len(1), Some(2));
    assert_eq!(output.active_index(), 0);

    first_handle.push(Chunk::new(0, 1));
    first_handle.end();

    let (values, error) = collect_output(output).await;
    assert!(error.is_none());
    assert_eq!(values, vec![Chunk::new(0, 1), Chunk::new(1, 0), Chunk::new(1, 1)]);
    Ok(())
}

#[tokio::test]
async fn test_single_source_passes_items_through() -> anyhow::Result<()> {
    // Arrange
    let (source, _handle) = TestSource::from_items(chunks(0, 5));
    let output = OrderedStreams::from_sources(vec![source])?;

    // Act
    let (values, error) = collect_output(output).await;

    // Assert
    assert!(error.is_none());
    assert_eq!(values, chunks(0, 5));
    Ok(())
}

#[tokio::test]
async fn test_empty_sources_are_skipped() -> anyhow::Result<()> {
    // Arrange
    let (a, _a) = TestSource::from_items(Vec::new());
    let (b, _b) = TestSource::from_items(chunks(1, 2));
    let (c, _c) = TestSource::from_items(Vec::new());
    let (d, _d) = TestSource::from_items(chunks(3, 1));
    let output = OrderedStreams::from_sources(vec![a, b, c, d])?;

    // Act
    let (values, error) = collect_output(output).await;

    // Assert
    assert!(error.is_none());
    assert_eq!(values, concatenated(&[0, 2, 0, 1]));
    Ok(())
}

#[tokio::test]
async fn test_groups_are_flattened_one_level() -> anyhow::Result<()> {
    // Arrange
    let (a, _a) = TestSource::from_items(chunks(0, 1));
    let (b, _b) = TestSource::from_items(chunks(1, 2));
    let (c, _c) = TestSource::from_items(chunks(2, 1));
    let (d, _d) = TestSource::from_items(chunks(3, 2));

    let output = OrderedStreams::try_new(
        vec![
            SourceEntry::single(a),
            SourceEntry::group(vec![b, c]),
            SourceEntry::single(d),
        ],
        OrderedStreamsOptions::default(),
    )?;

    // Act
    let len = output.len();
    let (values, error) = collect_output(output).await;

    // Assert
    assert_eq!(len, 4);
    assert!(error.is_none());
    assert_eq!(values, concatenated(&[1, 2, 1, 2]));
    Ok(())
}
