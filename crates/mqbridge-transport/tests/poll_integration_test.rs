// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the poll multiplexer against live sockets

use mqbridge_transport::prelude::*;
use std::thread;
use std::time::{Duration, Instant};

fn pair(ctx: &Context, endpoint: &str) -> (Socket, Socket) {
    let a = ctx.socket(SocketPattern::Pair).unwrap();
    a.bind(endpoint).unwrap();
    let b = ctx.socket(SocketPattern::Pair).unwrap();
    b.connect(endpoint).unwrap();
    (a, b)
}

/// Test that a quiet socket times out close to the requested deadline
#[test]
fn test_timeout_bounds() {
    let ctx = Context::new(1).unwrap();
    let pull = ctx.socket(SocketPattern::Pull).unwrap();
    pull.bind("inproc://poll-idle").unwrap();

    let items = [PollItem::new(&pull, Interest::Read.into())];
    let start = Instant::now();
    let result = poll(&items, PollTimeout::from_millis(200).unwrap(), &NeverCancel).unwrap();

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(200), "returned early after {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(450), "overran: {:?}", elapsed);
    assert!(result.is_timeout());
    assert_eq!(result.len(), 1);
    assert!(result[0].is_empty());
}

/// Test that polling with a zero timeout returns at once
#[test]
fn test_immediate_check() {
    let ctx = Context::new(1).unwrap();
    let pull = ctx.socket(SocketPattern::Pull).unwrap();
    pull.bind("inproc://poll-immediate").unwrap();

    let items = [PollItem::new(&pull, Interest::Read.into())];
    let start = Instant::now();
    let result = poll(&items, PollTimeout::Immediate, &NeverCancel).unwrap();

    assert!(start.elapsed() < Duration::from_millis(100));
    assert!(result.is_timeout());
}

/// Test cancellation of an infinite wait from another thread
#[test]
fn test_cancel_from_another_thread() {
    let ctx = Context::new(1).unwrap();
    let pull = ctx.socket(SocketPattern::Pull).unwrap();
    pull.bind("inproc://poll-cancel").unwrap();

    let token = CancellationToken::new();
    let remote = token.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        remote.cancel();
    });

    let poller = Poller::new(
        PollConfig::default().with_cancel_check_interval(Duration::from_millis(20)),
    )
    .unwrap();
    let items = [PollItem::new(&pull, Interest::Read.into())];
    let start = Instant::now();
    let result = poller.poll(&items, PollTimeout::from_millis(-1).unwrap(), &token);

    assert!(matches!(result, Err(TransportError::Interrupted)));
    assert!(start.elapsed() < Duration::from_secs(2));
    canceller.join().unwrap();
}

/// Test that results line up with the input order and masks
#[test]
fn test_results_match_input_order() {
    let ctx = Context::new(1).unwrap();
    let (a, b) = pair(&ctx, "inproc://poll-order");
    a.send(b"x", false).unwrap();

    let items = [
        PollItem::new(&b, Interest::Read | Interest::Write),
        PollItem::new(&a, Interest::Read.into()),
    ];
    let result = poll(&items, PollTimeout::from_millis(1000).unwrap(), &NeverCancel).unwrap();

    assert_eq!(result.len(), 2);
    assert!(!result.is_timeout());
    assert!(result[0].contains(Interest::Read));
    assert!(result[0].contains(Interest::Write));
    assert!(!result[1].contains(Interest::Read));
    for (observed, item) in result.iter().zip(&items) {
        assert!(observed.is_subset(item.interest));
    }

    assert_eq!(b.receive(true).unwrap(), Some(b"x".to_vec()));
}

/// Test write readiness without read interest
#[test]
fn test_write_only_interest() {
    let ctx = Context::new(1).unwrap();
    let pull = ctx.socket(SocketPattern::Pull).unwrap();
    pull.bind("inproc://poll-write").unwrap();
    let push = ctx.socket(SocketPattern::Push).unwrap();
    push.connect("inproc://poll-write").unwrap();

    let items = [PollItem::new(&push, Interest::Write.into())];
    let result = poll(&items, PollTimeout::from_millis(1000).unwrap(), &NeverCancel).unwrap();

    assert_eq!(result[0], InterestSet::from(Interest::Write));
}

/// Test that a socket from a closed context fails the poll
#[test]
fn test_closed_context_is_handle_invalid() {
    let ctx = Context::new(1).unwrap();
    let live_ctx = Context::new(1).unwrap();
    let dead = ctx.socket(SocketPattern::Pull).unwrap();
    let live = live_ctx.socket(SocketPattern::Pull).unwrap();
    live.bind("inproc://poll-live").unwrap();
    ctx.close();

    let items = [
        PollItem::new(&live, Interest::Read.into()),
        PollItem::new(&dead, Interest::Read.into()),
    ];
    match poll(&items, PollTimeout::Immediate, &NeverCancel) {
        Err(TransportError::HandleInvalid(msg)) => assert!(msg.contains("poll item 1")),
        other => panic!("expected HandleInvalid, got {:?}", other),
    }
}

/// Test that closing the context mid-wait ends the poll
#[test]
fn test_context_closed_during_wait() {
    let ctx = Context::new(1).unwrap();
    let pull = ctx.socket(SocketPattern::Pull).unwrap();
    pull.bind("inproc://poll-close-mid-wait").unwrap();

    let closer = {
        let ctx = ctx.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            ctx.close();
        })
    };

    let poller = Poller::new(
        PollConfig::default().with_cancel_check_interval(Duration::from_millis(20)),
    )
    .unwrap();
    let items = [PollItem::new(&pull, Interest::Read.into())];
    let start = Instant::now();
    let result = poller.poll(&items, PollTimeout::from_millis(1500).unwrap(), &NeverCancel);

    match result {
        Err(TransportError::HandleInvalid(msg)) => assert!(msg.contains("poll item 0")),
        other => panic!("expected HandleInvalid, got {:?}", other),
    }
    assert!(start.elapsed() < Duration::from_millis(1000));
    closer.join().unwrap();
}

/// Test the token-based entry point and its argument checks
#[test]
fn test_poll_sockets_arguments() {
    let ctx = Context::new(1).unwrap();
    let (a, b) = pair(&ctx, "inproc://poll-tokens");
    let poller = Poller::default();

    let empty: &[&Socket] = &[];
    let no_tokens: &[Vec<&str>] = &[];
    assert!(matches!(
        poller.poll_sockets(empty, no_tokens, 0, &NeverCancel),
        Err(TransportError::InvalidArgument(_))
    ));
    assert!(matches!(
        poller.poll_sockets(&[&a, &b], &[vec!["read"]], 0, &NeverCancel),
        Err(TransportError::InvalidArgument(_))
    ));
    assert!(matches!(
        poller.poll_sockets(&[&a], &[vec!["read", "bogus"]], 0, &NeverCancel),
        Err(TransportError::InvalidArgument(_))
    ));
    assert!(matches!(
        poller.poll_sockets(&[&a], &[vec!["read"]], -2, &NeverCancel),
        Err(TransportError::InvalidArgument(_))
    ));

    b.send_str("hello", false).unwrap();
    let requested = [
        InterestSet::parse_tokens(&["read", "error"]).unwrap(),
        InterestSet::parse_tokens(&["write"]).unwrap(),
    ];
    let result = poller
        .poll_sockets(
            &[&a, &b],
            &[vec!["read", "error"], vec!["write"]],
            1000,
            &NeverCancel,
        )
        .unwrap();

    let report = result.report(&requested);
    assert_eq!(
        report[0],
        vec![(Interest::Read, true), (Interest::Error, false)]
    );
    assert_eq!(report[1], vec![(Interest::Write, true)]);
}

/// Test that readiness arriving mid-wait ends the poll early
#[test]
fn test_ready_during_wait() {
    let ctx = Context::new(1).unwrap();
    let pull = ctx.socket(SocketPattern::Pull).unwrap();
    pull.bind("inproc://poll-late").unwrap();
    let push = ctx.socket(SocketPattern::Push).unwrap();
    push.connect("inproc://poll-late").unwrap();

    let sender = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        push.send(b"late", false).unwrap();
        push
    });

    let items = [PollItem::new(&pull, Interest::Read.into())];
    let start = Instant::now();
    let result = poll(&items, PollTimeout::from_millis(5000).unwrap(), &NeverCancel).unwrap();

    assert!(result[0].contains(Interest::Read));
    assert!(start.elapsed() < Duration::from_secs(4));
    assert_eq!(pull.receive(true).unwrap(), Some(b"late".to_vec()));
    drop(sender.join().unwrap());
}
