//! # Pong Session Server Library
//!
//! This library provides the authoritative server for two-player networked
//! pong. It pairs players under a short join code, runs the match physics
//! at a fixed tick rate and broadcasts the resulting state to both players.
//!
//! ## Core Responsibilities
//!
//! ### Session Pairing
//! A player asks for a new session and receives a 4-digit code. A second
//! player joins with that code. Codes are unique among live sessions and a
//! session never holds more than two players.
//!
//! ### Authoritative Simulation
//! Every started session runs its own fixed-rate loop that advances the
//! ball, bounces it off the walls and paddles, and re-centres it when it
//! leaves the board. Paddle positions reported by the players are applied
//! at the start of each tick.
//!
//! ### State Broadcasting
//! After each tick the paddle and ball positions are sent to both players.
//! Scoring is left to the clients.
//!
//! ### Idle Cleanup
//! Sessions that never get a second player are evicted after a timeout.
//!
//! ## Architecture Design
//!
//! ### Task Per Session
//! Each started session is owned by a single tokio task. Connection
//! handlers talk to it only through a bounded event queue, so session state
//! needs no lock and sessions never contend with each other.
//!
//! ### Shared Registry
//! The table of live sessions is the only state shared between sessions.
//! It sits behind one lock that is held only for a lookup, insert or delete.
//!
//! ### WebSocket Transport
//! Players connect over WebSocket to a single endpoint path and exchange
//! JSON text frames. Each connection gets a writer task fed by a bounded
//! queue; a player that stops reading misses frames instead of stalling
//! the session.
//!
//! ## Module Organization
//!
//! ### Registry Module (`registry`)
//! Code generation, create/join/remove and the idle sweep.
//!
//! ### Session Module (`session`)
//! Per-match state, player links and the events handlers feed in.
//!
//! ### Simulation Module (`simulation`)
//! The fixed-rate loop that ticks a session until a player is gone.
//!
//! ### Reaper Module (`reaper`)
//! The background task that evicts sessions nobody joined.
//!
//! ### Network Module (`network`)
//! Listener, WebSocket upgrade, handshake routing and the per-connection
//! reader and writer.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Listen on 127.0.0.1:8080/connect with a 16ms tick
//!     let server = Server::bind(ServerConfig::default()).await?;
//!
//!     // Accepts players forever; each started session ticks on its own task
//!     server.run().await;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod network;
pub mod reaper;
pub mod registry;
pub mod session;
pub mod simulation;
