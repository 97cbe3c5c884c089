use serde::{Deserialize, Serialize};

pub const BOARD_WIDTH: i32 = 640;
pub const BOARD_HEIGHT: i32 = 480;
pub const PADDLE_HEIGHT: i32 = 100;
/// Width of the strip along each side edge in which the ball can hit a paddle.
pub const PADDLE_BAND: i32 = 20;
pub const BALL_SPEED: i32 = 4;

pub const TICK_INTERVAL_MS: u64 = 16;
pub const IDLE_TIMEOUT_SECS: u64 = 5 * 60;
pub const SWEEP_INTERVAL_SECS: u64 = 60;

pub const DEFAULT_PORT: u16 = 8080;
pub const ENDPOINT_PATH: &str = "/connect";

pub const WAITING_MESSAGE: &str = "waiting for another player";
pub const JOIN_ERROR_MESSAGE: &str = "Invalid code or game full";

/// First frame a client sends after the WebSocket upgrade.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Handshake {
    Create,
    Join { code: String },
}

/// Paddle position reported by a client once play has begun.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PaddleUpdate {
    pub player: u8,
    pub y: f32,
}

impl PaddleUpdate {
    /// Paddle position on the server's integer grid.
    pub fn grid_y(&self) -> i32 {
        self.y.round() as i32
    }
}

/// Snapshot broadcast to both participants every tick.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct StateUpdate {
    #[serde(rename = "paddle1Y")]
    pub paddle1_y: i32,
    #[serde(rename = "paddle2Y")]
    pub paddle2_y: i32,
    #[serde(rename = "ballX")]
    pub ball_x: i32,
    #[serde(rename = "ballY")]
    pub ball_y: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ServerMessage {
    Created { code: String, message: String },
    Error { error: String },
    State(StateUpdate),
}

impl ServerMessage {
    pub fn created(code: &str) -> Self {
        ServerMessage::Created {
            code: code.to_string(),
            message: WAITING_MESSAGE.to_string(),
        }
    }

    pub fn join_error() -> Self {
        ServerMessage::Error {
            error: JOIN_ERROR_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paddle {
    /// Top edge of the paddle.
    pub y: i32,
}

impl Paddle {
    pub fn centered() -> Self {
        Self {
            y: BOARD_HEIGHT / 2,
        }
    }

    pub fn covers(&self, y: i32) -> bool {
        y >= self.y && y <= self.y + PADDLE_HEIGHT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ball {
    pub x: i32,
    pub y: i32,
    pub vx: i32,
    pub vy: i32,
}

impl Ball {
    pub fn new(x: i32, y: i32, vx: i32, vy: i32) -> Self {
        Self { x, y, vx, vy }
    }

    pub fn serve() -> Self {
        Self::new(BOARD_WIDTH / 2, BOARD_HEIGHT / 2, BALL_SPEED, BALL_SPEED)
    }

    pub fn recenter(&mut self) {
        self.x = BOARD_WIDTH / 2;
        self.y = BOARD_HEIGHT / 2;
    }
}

/// Authoritative state of one match. Both sides of the wire step it identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchState {
    pub left: Paddle,
    pub right: Paddle,
    pub ball: Ball,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchState {
    pub fn new() -> Self {
        Self {
            left: Paddle::centered(),
            right: Paddle::centered(),
            ball: Ball::serve(),
        }
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self) {
        let ball = &mut self.ball;
        ball.x += ball.vx;
        ball.y += ball.vy;

        reflect_off_walls(ball);

        if ball.vx < 0 && ball.x <= PADDLE_BAND && self.left.covers(ball.y) {
            ball.vx = -ball.vx;
        }
        if ball.vx > 0 && ball.x >= BOARD_WIDTH - PADDLE_BAND && self.right.covers(ball.y) {
            ball.vx = -ball.vx;
        }

        if ball.x < 0 || ball.x > BOARD_WIDTH {
            ball.recenter();
        }
    }

    pub fn snapshot(&self) -> StateUpdate {
        StateUpdate {
            paddle1_y: self.left.y,
            paddle2_y: self.right.y,
            ball_x: self.ball.x,
            ball_y: self.ball.y,
        }
    }
}

/// Bounces the ball off the top and bottom edges, folding any overshoot back onto the board.
/// The direction check keeps a ball that is already heading inward from flipping twice.
pub fn reflect_off_walls(ball: &mut Ball) {
    if ball.y <= 0 && ball.vy < 0 {
        ball.vy = -ball.vy;
        ball.y = -ball.y;
    } else if ball.y >= BOARD_HEIGHT && ball.vy > 0 {
        ball.vy = -ball.vy;
        ball.y = 2 * BOARD_HEIGHT - ball.y;
    }
}
