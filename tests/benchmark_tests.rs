//! Performance benchmarks for critical session systems

use server::config::SessionConfig;
use server::registry::Registry;
use server::session::{PlayerLink, Session};
use shared::{MatchState, ServerMessage, BOARD_HEIGHT, BOARD_WIDTH};
use std::time::Instant;
use tokio::sync::mpsc;

/// Benchmarks the per-tick physics step
#[test]
fn benchmark_physics_step() {
    let mut state = MatchState::new();

    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        state.step();
    }

    let duration = start.elapsed();
    println!(
        "Physics step: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(state.ball.x >= 0 && state.ball.x <= BOARD_WIDTH);
    assert!(state.ball.y >= 0 && state.ball.y <= BOARD_HEIGHT);
    // Should complete in under 100ms for 100k iterations
    assert!(duration.as_millis() < 100);
}

/// Benchmarks a full tick including the broadcast to both players
#[test]
fn benchmark_session_tick() {
    let (left_tx, mut left_rx) = mpsc::channel::<ServerMessage>(16);
    let (right_tx, mut right_rx) = mpsc::channel::<ServerMessage>(16);
    let (_events_tx, events_rx) = mpsc::channel(16);
    let mut session = Session::new(
        "0000".to_string(),
        PlayerLink::new(left_tx),
        PlayerLink::new(right_tx),
        events_rx,
    );

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        session.apply_pending_events();
        session.tick();
        while left_rx.try_recv().is_ok() {}
        while right_rx.try_recv().is_ok() {}
    }

    let duration = start.elapsed();
    println!(
        "Session tick: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(session.is_connected());
    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks session creation under the registry lock
#[tokio::test]
async fn benchmark_registry_create() {
    let registry = Registry::new(SessionConfig::default());
    let mut receivers = Vec::new();

    let iterations = 2_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let (tx, rx) = mpsc::channel(1);
        receivers.push(rx);
        registry.create(PlayerLink::new(tx)).await.unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Registry create: {} sessions in {:?} ({:.2} μs/create)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert_eq!(registry.len().await, iterations);
    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}
