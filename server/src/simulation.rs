//! Fixed-rate simulation loop, one task per started session

use crate::registry::Registry;
use crate::session::Session;
use log::{debug, info};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Starts the loop for a freshly joined session and tracks it in the registry
pub fn spawn(session: Session, registry: Registry) -> JoinHandle<()> {
    registry.loop_started();
    tokio::spawn(async move {
        run(session, registry.clone()).await;
        registry.loop_finished();
    })
}

/// Ticks `session` until either player is gone, then drops it from the registry
///
/// Every tick drains queued paddle/departure events, advances the physics
/// one step and broadcasts the snapshot to both players. Dropping the
/// session on exit closes the surviving player's outbound queue, which in
/// turn closes their socket.
pub async fn run(mut session: Session, registry: Registry) {
    let mut ticker = interval(registry.config().tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut ticks: u64 = 0;

    loop {
        ticker.tick().await;

        session.apply_pending_events();
        if !session.is_connected() {
            break;
        }

        session.tick();
        ticks += 1;

        if ticks % 600 == 0 {
            let ball = session.state().ball;
            debug!(
                "Session {}: tick {}, ball at ({}, {})",
                session.code(),
                ticks,
                ball.x,
                ball.y
            );
        }
    }

    registry.remove(session.code()).await;
    info!("Session {} ended after {} ticks", session.code(), ticks);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::session::{PlayerLink, SessionEvent, Side};
    use shared::{ServerMessage, BOARD_HEIGHT, BOARD_WIDTH};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn link() -> (PlayerLink, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(256);
        (PlayerLink::new(tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_broadcasts_every_tick() {
        let registry = Registry::new(SessionConfig::default());
        let (left, mut left_rx) = link();
        let (right, mut right_rx) = link();
        let (events_tx, events_rx) = mpsc::channel(8);
        let session = Session::new("0001".to_string(), left, right, events_rx);

        let handle = tokio::spawn(run(session, registry.clone()));

        for expected in 1..=5 {
            let left_msg = left_rx.recv().await.unwrap();
            let right_msg = right_rx.recv().await.unwrap();
            assert_eq!(left_msg, right_msg);
            match left_msg {
                ServerMessage::State(update) => {
                    assert_eq!(update.ball_x, BOARD_WIDTH / 2 + 4 * expected);
                    assert_eq!(update.ball_y, BOARD_HEIGHT / 2 + 4 * expected);
                }
                other => panic!("Unexpected message: {:?}", other),
            }
        }

        events_tx
            .send(SessionEvent::Departed { side: Side::Left })
            .await
            .unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_ends_when_player_unreachable() {
        let registry = Registry::new(SessionConfig::default());
        let (left, left_rx) = link();
        let (right, mut right_rx) = link();
        let (_events_tx, events_rx) = mpsc::channel(8);
        let session = Session::new("0002".to_string(), left, right, events_rx);
        drop(left_rx);

        tokio::time::timeout(Duration::from_secs(1), run(session, registry))
            .await
            .expect("loop should stop once a player is gone");

        // Survivor saw at most the first frame, then its queue was closed
        let mut frames = 0;
        while right_rx.recv().await.is_some() {
            frames += 1;
        }
        assert!(frames <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paddle_event_shows_up_in_broadcast() {
        let registry = Registry::new(SessionConfig::default());
        let (left, mut left_rx) = link();
        let (right, _right_rx) = link();
        let (events_tx, events_rx) = mpsc::channel(8);
        let session = Session::new("0003".to_string(), left, right, events_rx);

        events_tx
            .send(SessionEvent::PaddleMoved { side: Side::Right, y: 42 })
            .await
            .unwrap();
        let handle = tokio::spawn(run(session, registry));

        match left_rx.recv().await.unwrap() {
            ServerMessage::State(update) => assert_eq!(update.paddle2_y, 42),
            other => panic!("Unexpected message: {:?}", other),
        }

        events_tx
            .send(SessionEvent::Departed { side: Side::Right })
            .await
            .unwrap();
        handle.await.unwrap();
    }
}
