#![cfg(feature = "async")]
//! Integration tests for the stream variants.
//!
//! Tests cover:
//! - Stream traversal agreeing with the iterator traversal
//! - Set operations over streams fed from other tasks
//! - Error propagation from fallible streams
//! - Validation of stream inputs

use futures::channel::mpsc;
use futures::stream::{self, StreamExt};
use mergejoin::stream::{
    PairwiseStreamExt, checked_pairwise_stream, diff_with, difference, ensure_sorted_stream,
    intersection, pairwise_stream, symmetric_difference, try_pairwise_stream,
};
use mergejoin::{Diff, ExclusiveDiff, OrderingViolation, pairwise_traversal};
use rstest::rstest;

// =============================================================================
// Traversal
// =============================================================================

#[rstest]
#[case(vec![], vec![])]
#[case(vec![], vec![0, 1, 2])]
#[case(vec![0, 1], vec![])]
#[case(vec![5], vec![5])]
#[case(vec![0, 1, 2, 3, 4, 5, 6, 7], vec![0, 2, 4, 6])]
#[case(vec![0, 2, 4], vec![1, 3, 5])]
#[tokio::test]
async fn test_stream_steps_match_iterator_steps(#[case] source: Vec<i32>, #[case] target: Vec<i32>) {
    let expected: Vec<_> = pairwise_traversal(source.clone(), target.clone(), i32::cmp).collect();
    let actual: Vec<_> = pairwise_stream(stream::iter(source), stream::iter(target), i32::cmp)
        .collect()
        .await;
    assert_eq!(actual, expected);
}

#[rstest]
#[tokio::test]
async fn test_traversal_over_channels_fed_by_other_tasks() {
    let (source_sender, source_receiver) = mpsc::unbounded();
    let (target_sender, target_receiver) = mpsc::unbounded();

    let producer = tokio::spawn(async move {
        for number in 0..8 {
            source_sender.unbounded_send(number).unwrap();
            if number % 2 == 0 {
                target_sender.unbounded_send(number).unwrap();
            }
            tokio::task::yield_now().await;
        }
    });

    let odd: Vec<i32> = difference(source_receiver, target_receiver, i32::cmp).collect().await;
    producer.await.unwrap();

    assert_eq!(odd, vec![1, 3, 5, 7]);
}

// =============================================================================
// Set Operations
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_stream_set_operations() {
    let numbers = || stream::iter(0..8);
    let evens = || stream::iter([0, 2, 4, 6]);

    let common: Vec<i32> = intersection(numbers(), evens(), i32::cmp).collect().await;
    let unique: Vec<i32> = symmetric_difference(numbers(), evens(), i32::cmp).collect().await;

    assert_eq!(common, vec![0, 2, 4, 6]);
    assert_eq!(unique, vec![1, 3, 5, 7]);
}

#[rstest]
#[tokio::test]
async fn test_stream_intersection_terminates_on_infinite_source() {
    let common: Vec<u32> = intersection(stream::iter(0_u32..), stream::iter([2, 3, 10]), u32::cmp)
        .collect()
        .await;
    assert_eq!(common, vec![2, 3, 10]);
}

#[rstest]
#[tokio::test]
async fn test_stream_diff_with_reports_changes() {
    let before = stream::iter([(1, 'a'), (2, 'b')]);
    let after = stream::iter([(2, 'c'), (3, 'd')]);

    let changes: Vec<_> = diff_with(before, after, |a, b| a.0.cmp(&b.0), |a, b| a.1 != b.1)
        .collect()
        .await;

    assert_eq!(
        changes,
        vec![
            Diff::Exclusive(ExclusiveDiff::Source((1, 'a'))),
            Diff::Changed((2, 'b'), (2, 'c')),
            Diff::Exclusive(ExclusiveDiff::Target((3, 'd'))),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn test_stream_ext_methods_on_fallible_steps() {
    let source = stream::iter(vec![Ok::<i32, String>(1), Ok(2)]);
    let target = stream::iter(vec![Ok(2), Err("socket closed".to_owned())]);

    let items: Vec<_> = try_pairwise_stream(source, target, i32::cmp)
        .intersection()
        .collect()
        .await;

    assert_eq!(items, vec![Ok(2), Err("socket closed".to_owned())]);
}

// =============================================================================
// Validation
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_ensure_sorted_stream_passes_sorted_input() {
    let checked: Vec<_> = ensure_sorted_stream(stream::iter([1, 2, 3]), i32::cmp).collect().await;
    assert_eq!(checked, vec![Ok(1), Ok(2), Ok(3)]);
}

#[rstest]
#[tokio::test]
async fn test_checked_stream_stops_at_violation() {
    let outcome: Result<Vec<i32>, OrderingViolation> =
        checked_pairwise_stream(stream::iter([1, 3, 2]), stream::iter([5]), i32::cmp)
            .difference()
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect();

    assert_eq!(outcome, Err(OrderingViolation { position: 2 }));
}
