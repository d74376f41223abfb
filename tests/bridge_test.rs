// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests through the config-driven facade

use mqbridge::config::load_config;
use mqbridge::prelude::*;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn bridge_from_toml(toml: &str) -> Bridge {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mqbridge.toml");
    std::fs::write(&path, toml).unwrap();
    let config = load_config(Some(&path), None).unwrap();
    Bridge::from_config(&config).unwrap()
}

/// Test that configured values reach the context and poller
#[test]
fn test_bridge_applies_config() {
    let bridge = bridge_from_toml(
        r#"
[context]
io_threads = 2

[poll]
cancel_check_interval_ms = 30

[collector]
thread_name = "bridge-test-collector"
"#,
    );

    assert_eq!(bridge.context().io_threads(), 2);
    assert_eq!(
        bridge.poller().config().cancel_check_interval,
        Duration::from_millis(30)
    );
    assert_eq!(
        bridge.collector_config().thread_name,
        "bridge-test-collector"
    );
}

/// Test request-reply through bridge sockets with a cancellable poll
#[test]
fn test_bridge_request_reply_with_poll() {
    let bridge = Bridge::new().unwrap();
    let server = bridge.socket_by_name("rep").unwrap();
    server.bind("inproc://bridge-rr").unwrap();
    let client = bridge.socket(SocketPattern::Req).unwrap();
    client.connect("inproc://bridge-rr").unwrap();

    client.send_str("status?", false).unwrap();

    let token = CancellationToken::new();
    let result = bridge
        .poll_sockets(&[&server], &[vec!["read"]], 1000, &token)
        .unwrap();
    assert!(result[0].contains(Interest::Read));

    assert_eq!(server.receive_string().unwrap(), "status?");
    server.send_str("ok", false).unwrap();
    assert_eq!(client.receive_string().unwrap(), "ok");
}

/// Test that a poll blocked on a bridge socket can be cancelled
#[test]
fn test_bridge_poll_cancellation() {
    let bridge = bridge_from_toml("[poll]\ncancel_check_interval_ms = 10\n");
    let pull = bridge.socket(SocketPattern::Pull).unwrap();
    pull.bind("inproc://bridge-cancel").unwrap();

    let token = CancellationToken::new();
    let barrier = Arc::new(Barrier::new(2));
    let canceller = {
        let token = token.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            thread::sleep(Duration::from_millis(50));
            token.cancel();
        })
    };

    barrier.wait();
    let start = Instant::now();
    let items = [PollItem::new(&pull, Interest::Read.into())];
    let result = bridge.poll(&items, PollTimeout::Infinite, &token);

    assert!(matches!(result, Err(TransportError::Interrupted)));
    assert!(start.elapsed() < Duration::from_secs(2));
    canceller.join().unwrap();
}

/// Test a collector started from the bridge configuration
#[test]
fn test_bridge_collector() {
    let bridge = bridge_from_toml("[collector]\npoll_interval_ms = 20\nreceive_hwm = 100\n");
    let push = bridge.socket(SocketPattern::Push).unwrap();
    push.bind("tcp://127.0.0.1:32300").unwrap();

    let collector = bridge
        .start_collector(vec!["tcp://127.0.0.1:32300".to_string()], 4)
        .unwrap();
    assert_eq!(collector.target_count(), 4);

    for word in ["alpha", "beta", "gamma", "delta"] {
        push.send_str(word, false).unwrap();
    }

    let messages = collector
        .get_results_timeout(Duration::from_secs(10))
        .unwrap()
        .into_complete()
        .unwrap();
    assert_eq!(
        messages,
        vec![
            b"alpha".to_vec(),
            b"beta".to_vec(),
            b"gamma".to_vec(),
            b"delta".to_vec()
        ]
    );
}

/// Test that closing the bridge invalidates its sockets
#[test]
fn test_bridge_close() {
    let bridge = Bridge::new().unwrap();
    let socket = bridge.socket(SocketPattern::Pair).unwrap();
    bridge.close();

    assert!(bridge.context().is_closed());
    assert!(matches!(
        socket.connect("inproc://anywhere"),
        Err(TransportError::HandleInvalid(_))
    ));
    assert!(matches!(
        bridge.socket(SocketPattern::Pair),
        Err(TransportError::HandleInvalid(_))
    ));
}
