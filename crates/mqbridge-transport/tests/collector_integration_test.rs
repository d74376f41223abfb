// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the background collector against live producers

use mqbridge_transport::prelude::*;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("mqbridge_transport=debug")
        .with_test_writer()
        .try_init();
}

fn producer(ctx: &Context, endpoint: &str) -> Socket {
    let push = ctx.socket(SocketPattern::Push).unwrap();
    push.bind(endpoint).unwrap();
    push
}

fn collector_config() -> CollectorConfig {
    init_tracing();
    CollectorConfig::default().with_poll_interval(Duration::from_millis(20))
}

/// Test that one producer's messages arrive complete and in order
#[test]
fn test_single_producer_fifo() {
    let ctx = Context::new(1).unwrap();
    let push = producer(&ctx, "tcp://127.0.0.1:32200");

    let collector = Collector::start(
        vec!["tcp://127.0.0.1:32200".to_string()],
        20,
        collector_config(),
    )
    .unwrap();

    // PUSH blocks until the collector has connected
    for i in 0..20u32 {
        push.send(format!("msg-{}", i).as_bytes(), false).unwrap();
    }

    let results = collector
        .get_results_timeout(Duration::from_secs(10))
        .unwrap();
    assert!(results.is_complete());

    let expected: Vec<Vec<u8>> = (0..20u32)
        .map(|i| format!("msg-{}", i).into_bytes())
        .collect();
    assert_eq!(results.into_complete().unwrap(), expected);
}

/// Test that two producers interleave while each keeps its own order
#[test]
fn test_two_producers_preserve_per_producer_order() {
    let ctx = Context::new(1).unwrap();
    let left = producer(&ctx, "tcp://127.0.0.1:32201");
    let right = producer(&ctx, "tcp://127.0.0.1:32202");

    let collector = Collector::start(
        vec![
            "tcp://127.0.0.1:32201".to_string(),
            "tcp://127.0.0.1:32202".to_string(),
        ],
        10,
        collector_config(),
    )
    .unwrap();

    for i in 0..5 {
        left.send(format!("L{}", i).as_bytes(), false).unwrap();
        right.send(format!("R{}", i).as_bytes(), false).unwrap();
    }

    let messages = collector
        .get_results_timeout(Duration::from_secs(10))
        .unwrap()
        .into_complete()
        .unwrap();
    assert_eq!(messages.len(), 10);

    for prefix in [b'L', b'R'] {
        let from_one: Vec<&Vec<u8>> = messages.iter().filter(|m| m[0] == prefix).collect();
        let expected: Vec<Vec<u8>> = (0..5)
            .map(|i| {
                let mut m = vec![prefix];
                m.extend(i.to_string().into_bytes());
                m
            })
            .collect();
        assert_eq!(from_one.len(), 5);
        for (got, want) in from_one.iter().zip(&expected) {
            assert_eq!(*got, want);
        }
    }
}

/// Test that the collector stops at the target even if more is sent
#[test]
fn test_stops_at_target_count() {
    let ctx = Context::new(1).unwrap();
    let push = producer(&ctx, "tcp://127.0.0.1:32203");
    push.set_option(SocketOption::Linger, 0).unwrap();

    let collector = Collector::start(
        vec!["tcp://127.0.0.1:32203".to_string()],
        3,
        collector_config(),
    )
    .unwrap();

    for i in 0..6u8 {
        push.send(&[i], false).unwrap();
    }

    let results = collector
        .get_results_timeout(Duration::from_secs(10))
        .unwrap();
    assert!(results.is_complete());
    assert_eq!(results.messages, vec![vec![0u8], vec![1], vec![2]]);
}

/// Test that a deadline cancels the worker and returns a partial buffer
#[test]
fn test_deadline_returns_partial_results() {
    let ctx = Context::new(1).unwrap();
    let push = producer(&ctx, "tcp://127.0.0.1:32204");

    let collector = Collector::start(
        vec!["tcp://127.0.0.1:32204".to_string()],
        5,
        collector_config(),
    )
    .unwrap();

    push.send(b"one", false).unwrap();
    push.send(b"two", false).unwrap();

    // Wait for both to land so the partial buffer is deterministic
    for _ in 0..200 {
        if collector.received_count() == 2 {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(collector.received_count(), 2);
    assert!(!collector.is_finished());

    let results = collector
        .get_results_timeout(Duration::from_millis(200))
        .unwrap();
    assert_eq!(results.state, CollectorState::Cancelled);
    assert_eq!(results.messages, vec![b"one".to_vec(), b"two".to_vec()]);
}

/// Test that a bad address after a good one fails the run
#[test]
fn test_connect_failure_on_second_address() {
    let collector = Collector::start(
        vec![
            "tcp://127.0.0.1:32205".to_string(),
            "not-a-valid-endpoint".to_string(),
        ],
        1,
        collector_config(),
    )
    .unwrap();

    let results = collector
        .get_results_timeout(Duration::from_secs(5))
        .unwrap();
    match results.state {
        CollectorState::Failed { reason } => assert!(reason.contains("not-a-valid-endpoint")),
        other => panic!("expected failure, got {:?}", other),
    }
}

/// Test custom thread name and receive high-water mark are accepted
#[test]
fn test_custom_worker_config() {
    let ctx = Context::new(1).unwrap();
    let push = producer(&ctx, "tcp://127.0.0.1:32206");

    let config = collector_config()
        .with_thread_name("sensor-collector")
        .with_receive_hwm(16)
        .with_linger(Duration::from_millis(0));
    let collector =
        Collector::start(vec!["tcp://127.0.0.1:32206".to_string()], 1, config).unwrap();

    push.send_empty(false).unwrap();

    let results = collector
        .get_results_timeout(Duration::from_secs(10))
        .unwrap();
    assert!(results.is_complete());
    assert_eq!(results.messages, vec![Vec::<u8>::new()]);
}
