//! Per-match state and the handles it uses to reach both players
//!
//! A [`Session`] is owned outright by its simulation loop. Connection
//! handlers never touch it directly; they push [`SessionEvent`]s onto a
//! bounded queue which the loop drains at the start of every tick.

use crate::error::DeliveryError;
use log::debug;
use shared::{MatchState, ServerMessage, StateUpdate};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Which paddle a connection controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Player 1, the session's creator
    Left,
    /// Player 2, the player who joined with the code
    Right,
}

impl Side {
    pub fn player_number(self) -> u8 {
        match self {
            Side::Left => 1,
            Side::Right => 2,
        }
    }
}

/// Input delivered from a connection handler to a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    PaddleMoved { side: Side, y: i32 },
    Departed { side: Side },
}

/// Server-side handle to one player's outbound frame queue
#[derive(Debug, Clone)]
pub struct PlayerLink {
    outbound: mpsc::Sender<ServerMessage>,
}

impl PlayerLink {
    pub fn new(outbound: mpsc::Sender<ServerMessage>) -> Self {
        Self { outbound }
    }

    /// Queues a frame without waiting for room in the queue
    pub fn deliver(&self, message: ServerMessage) -> Result<(), DeliveryError> {
        self.outbound.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Backlogged,
            TrySendError::Closed(_) => DeliveryError::Disconnected,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

/// One paired match between two players
pub struct Session {
    code: String,
    left: Option<PlayerLink>,
    right: Option<PlayerLink>,
    state: MatchState,
    events: mpsc::Receiver<SessionEvent>,
}

impl Session {
    pub fn new(
        code: String,
        left: PlayerLink,
        right: PlayerLink,
        events: mpsc::Receiver<SessionEvent>,
    ) -> Self {
        Self {
            code,
            left: Some(left),
            right: Some(right),
            state: MatchState::new(),
            events,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// True while both player slots are occupied
    pub fn is_connected(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// Applies every event queued since the previous tick
    pub fn apply_pending_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event);
        }
    }

    pub fn apply_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::PaddleMoved { side, y } => match side {
                Side::Left => self.state.left.y = y,
                Side::Right => self.state.right.y = y,
            },
            SessionEvent::Departed { side } => {
                debug!("Session {}: player {} departed", self.code, side.player_number());
                self.detach(side);
            }
        }
    }

    pub fn detach(&mut self, side: Side) {
        match side {
            Side::Left => self.left = None,
            Side::Right => self.right = None,
        }
    }

    /// Runs one simulation step and broadcasts the resulting snapshot
    pub fn tick(&mut self) -> StateUpdate {
        self.state.step();
        let update = self.state.snapshot();
        self.broadcast(update);
        update
    }

    /// Sends a snapshot to both players
    ///
    /// A player whose connection is gone has its slot cleared, which ends
    /// the session on the next tick. A backlogged player just misses this
    /// frame.
    pub fn broadcast(&mut self, update: StateUpdate) {
        for side in [Side::Left, Side::Right] {
            let slot = match side {
                Side::Left => &mut self.left,
                Side::Right => &mut self.right,
            };

            let Some(link) = slot.as_ref() else {
                continue;
            };

            match link.deliver(ServerMessage::State(update)) {
                Ok(()) => {}
                Err(DeliveryError::Backlogged) => {
                    debug!(
                        "Session {}: dropped frame for backlogged player {}",
                        self.code,
                        side.player_number()
                    );
                }
                Err(DeliveryError::Disconnected) => {
                    debug!(
                        "Session {}: player {} unreachable",
                        self.code,
                        side.player_number()
                    );
                    *slot = None;
                }
            }
        }
    }
}
