// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::stream;
use ordered_streams::{
    EngineState, OrderedStreams, OrderedStreamsError, StreamItem, StreamSource, Termination,
};
use ordered_streams_test_utils::{
    collect_output, expect_end, expect_next_value, Chunk, TestSource, TestSourceHandle,
};
use std::time::Duration;
use tokio::time::timeout;

fn open_sources(count: usize) -> (Vec<TestSource<Chunk>>, Vec<TestSourceHandle<Chunk>>) {
    (0..count).map(|_| TestSource::new()).unzip()
}

fn cancelled_with_wrapper_destroyed(handle: &TestSourceHandle<Chunk>) -> bool {
    matches!(handle.cancellations().as_slice(), [Some(OrderedStreamsError::WrapperDestroyed)])
}

#[tokio::test]
async fn test_destroy_cancels_every_open_source() -> anyhow::Result<()> {
    // Arrange
    let (sources, handles) = open_sources(3);
    let mut output = OrderedStreams::from_sources(sources)?;
    let handle = output.handle();

    // Act
    output.destroy(None);
    output.destroy(None);

    // Assert
    assert!(handles.iter().all(cancelled_with_wrapper_destroyed));
    assert_eq!(output.state(), EngineState::Destroyed);
    assert_eq!(handle.termination(), Some(Termination::Destroyed));
    expect_end(&mut output).await;
    Ok(())
}

#[tokio::test]
async fn test_destroy_with_reason_discards_unconsumed_items() -> anyhow::Result<()> {
    // Arrange
    let (sources, handles) = open_sources(2);
    let mut output = OrderedStreams::from_sources(sources)?;
    handles[0].push(Chunk::new(0, 0));
    handles[0].push(Chunk::new(0, 1));
    expect_next_value(&mut output, Chunk::new(0, 0)).await;

    // Act
    output.destroy(Some(OrderedStreamsError::source_error("shutdown")));

    // Assert
    let (values, error) = collect_output(output).await;
    assert!(values.is_empty());
    assert!(matches!(error, Some(OrderedStreamsError::SourceError { .. })));
    assert!(handles.iter().all(cancelled_with_wrapper_destroyed));
    Ok(())
}

#[tokio::test]
async fn test_handle_destroy_from_another_task() -> anyhow::Result<()> {
    // Arrange
    let (sources, handles) = open_sources(3);
    let output = OrderedStreams::from_sources(sources)?;
    let handle = output.handle();
    handles[0].push(Chunk::new(0, 0));
    let consumer = tokio::spawn(collect_output(output));

    // Act
    tokio::time::sleep(Duration::from_millis(10)).await;
    handle.destroy(None);
    handle.closed().await;

    // Assert
    let (values, error) = consumer.await?;
    assert_eq!(values, vec![Chunk::new(0, 0)]);
    assert!(error.is_none());
    assert!(handles.iter().all(cancelled_with_wrapper_destroyed));
    assert_eq!(handle.termination(), Some(Termination::Destroyed));
    Ok(())
}

#[tokio::test]
async fn test_handle_destroy_waits_for_the_next_poll() -> anyhow::Result<()> {
    // Arrange
    let (sources, handles) = open_sources(2);
    let mut output = OrderedStreams::from_sources(sources)?;
    let handle = output.handle();

    // Act
    handle.destroy(None);

    // Assert
    assert_eq!(handle.state(), EngineState::Flowing);
    assert!(handles.iter().all(|source| !source.was_cancelled()));
    assert!(timeout(Duration::from_millis(20), handle.closed()).await.is_err());

    expect_end(&mut output).await;
    assert!(handles.iter().all(cancelled_with_wrapper_destroyed));
    assert_eq!(handle.termination(), Some(Termination::Destroyed));
    Ok(())
}

#[tokio::test]
async fn test_dropping_the_output_destroys_it() -> anyhow::Result<()> {
    // Arrange
    let (sources, handles) = open_sources(2);
    let output = OrderedStreams::from_sources(sources)?;
    let handle = output.handle();

    // Act
    drop(output);

    // Assert
    assert!(handles.iter().all(cancelled_with_wrapper_destroyed));
    assert_eq!(handle.state(), EngineState::Destroyed);
    Ok(())
}

#[tokio::test]
async fn test_source_destroyed_externally_tears_everything_down() -> anyhow::Result<()> {
    // Arrange
    let (finished, finished_handle) = TestSource::from_items(vec![Chunk::new(0, 0)]);
    let (destroyed, destroyed_handle) = TestSource::new();
    let (waiting, waiting_handle) = TestSource::new();
    let mut output = OrderedStreams::from_sources(vec![finished, destroyed, waiting])?;
    let handle = output.handle();
    expect_next_value(&mut output, Chunk::new(0, 0)).await;

    // Act
    destroyed_handle.destroy();

    // Assert
    expect_end(&mut output).await;
    assert_eq!(handle.termination(), Some(Termination::SourceClosed { index: 1 }));
    assert_eq!(handle.state(), EngineState::Destroyed);
    assert!(!finished_handle.was_cancelled());
    assert!(!destroyed_handle.was_cancelled());
    assert!(cancelled_with_wrapper_destroyed(&waiting_handle));
    Ok(())
}

#[tokio::test]
async fn test_stream_source_destroyed_through_its_control() -> anyhow::Result<()> {
    // Arrange
    let sources: Vec<_> = (0..3)
        .map(|_| StreamSource::new(stream::pending::<StreamItem<Chunk>>()))
        .collect();
    let controls: Vec<_> = sources.iter().map(StreamSource::control).collect();
    let mut output = OrderedStreams::from_sources(sources)?;

    // Act
    controls[1].destroy(None);

    // Assert
    expect_end(&mut output).await;
    for index in [0, 2] {
        assert!(matches!(
            controls[index].cancellation(),
            Some(Some(OrderedStreamsError::WrapperDestroyed))
        ));
        assert!(controls[index].is_closed());
    }
    assert!(controls[1].cancellation().is_none());
    Ok(())
}

#[tokio::test]
async fn test_stream_source_destroyed_with_error_fails_the_output() -> anyhow::Result<()> {
    // Arrange
    let sources: Vec<_> = (0..2)
        .map(|_| StreamSource::new(stream::pending::<StreamItem<Chunk>>()))
        .collect();
    let controls: Vec<_> = sources.iter().map(StreamSource::control).collect();
    let output = OrderedStreams::from_sources(sources)?;
    let handle = output.handle();

    // Act
    controls[1].destroy(Some(OrderedStreamsError::source_error("reset by peer")));
    let (values, error) = collect_output(output).await;

    // Assert
    assert!(values.is_empty());
    assert!(matches!(error, Some(OrderedStreamsError::SourceError { .. })));
    assert!(matches!(controls[0].cancellation(), Some(None)));
    assert_eq!(handle.termination(), Some(Termination::SourceFailed { index: 1 }));
    Ok(())
}

#[tokio::test]
async fn test_cancelled_stream_source_signals_closed() -> anyhow::Result<()> {
    // Arrange
    let source = StreamSource::new(stream::pending::<StreamItem<Chunk>>());
    let control = source.control();
    let output = OrderedStreams::from_sources(vec![source])?;

    // Act
    drop(output);

    // Assert
    control.cancelled().await;
    control.closed().await;
    assert!(control.is_cancelled());
    Ok(())
}
