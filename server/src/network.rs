//! Server network layer handling WebSocket connections and session routing

use crate::config::{ServerConfig, OUTBOUND_QUEUE_CAPACITY};
use crate::error::ConnectionError;
use crate::reaper;
use crate::registry::Registry;
use crate::session::{PlayerLink, SessionEvent, Side};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{Handshake, PaddleUpdate, ServerMessage};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_hdr_async, WebSocketStream};

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsStream = SplitStream<WebSocketStream<TcpStream>>;

/// Accepts player connections and routes them into sessions
pub struct Server {
    listener: TcpListener,
    registry: Registry,
    path: String,
}

impl Server {
    /// Binds the listening socket; this is the only failure that stops the server
    pub async fn bind(config: ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(config.address()).await?;
        info!(
            "Server listening on ws://{}{}",
            listener.local_addr()?,
            config.path
        );

        Ok(Server {
            listener,
            registry: Registry::new(config.session),
            path: config.path,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Starts the reaper and accepts connections until the task is dropped
    pub async fn run(self) {
        let _reaper = reaper::spawn(self.registry.clone());

        info!("Server started successfully");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let registry = self.registry.clone();
                    let path = self.path.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, registry, path).await {
                            debug!("Connection from {} dropped: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }
}

/// Upgrades one connection, performs the handshake and then forwards paddle
/// updates until the player goes away
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    registry: Registry,
    path: String,
) -> Result<(), ConnectionError> {
    let socket = accept_hdr_async(stream, |request: &Request, response: Response| {
        if request.uri().path() == path {
            Ok(response)
        } else {
            let mut rejection = ErrorResponse::new(Some("Not found".to_string()));
            *rejection.status_mut() = StatusCode::NOT_FOUND;
            Err(rejection)
        }
    })
    .await?;
    let (sink, mut stream) = socket.split();

    let handshake = read_handshake(&mut stream).await?;

    let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
    tokio::spawn(write_outbound(sink, outbound_rx, addr));
    let link = PlayerLink::new(outbound_tx);

    let (side, events) = match handshake {
        Handshake::Create => match registry.create(link.clone()).await {
            Ok(created) => {
                info!("Player at {} created session {}", addr, created.code);
                (Side::Left, created.events)
            }
            Err(e) => {
                info!("Create from {} refused: {}", addr, e);
                reply_join_error(&link);
                return Ok(());
            }
        },
        Handshake::Join { code } => match registry.join(&code, link.clone()).await {
            Ok(joined) => {
                info!("Player at {} joined session {}", addr, code);
                (Side::Right, joined.events)
            }
            Err(e) => {
                info!("Join of {:?} from {} refused: {}", code, addr, e);
                reply_join_error(&link);
                return Ok(());
            }
        },
    };
    // The session holds its own clone; ours must not keep the writer alive
    drop(link);

    forward_paddle_updates(&mut stream, side, &events).await;

    announce_departure(events, side);
    debug!("Player {} at {} disconnected", side.player_number(), addr);

    Ok(())
}

/// Reads the first text frame and parses it as a handshake
async fn read_handshake(stream: &mut WsStream) -> Result<Handshake, ConnectionError> {
    while let Some(frame) = stream.next().await {
        match frame? {
            Message::Text(text) => {
                return serde_json::from_str(&text)
                    .map_err(|e| ConnectionError::HandshakeMalformed(e.to_string()));
            }
            Message::Binary(_) => {
                return Err(ConnectionError::HandshakeMalformed(
                    "binary frame".to_string(),
                ));
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    Err(ConnectionError::ClosedBeforeHandshake)
}

/// Turns incoming paddle frames into session events for `side`
///
/// The frame's `player` field is informational; a connection only ever
/// moves its own paddle.
async fn forward_paddle_updates(
    stream: &mut WsStream,
    side: Side,
    events: &mpsc::Sender<SessionEvent>,
) {
    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!("Read error from player {}: {}", side.player_number(), e);
                break;
            }
        };

        let update: PaddleUpdate = match serde_json::from_str(&text) {
            Ok(update) => update,
            Err(e) => {
                warn!(
                    "Ignoring frame from player {}: {}",
                    side.player_number(),
                    e
                );
                continue;
            }
        };

        let event = SessionEvent::PaddleMoved {
            side,
            y: update.grid_y(),
        };
        match events.try_send(event) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Closed(_)) => break,
        }
    }
}

/// Tells the session that `side` has gone without holding up the handler
///
/// A waiting session does not drain its queue until someone joins, so a
/// full queue hands the departure to a detached task. That task ends when
/// the session finally reads it or is dropped by the reaper.
fn announce_departure(events: mpsc::Sender<SessionEvent>, side: Side) {
    match events.try_send(SessionEvent::Departed { side }) {
        Ok(()) | Err(TrySendError::Closed(_)) => {}
        Err(TrySendError::Full(event)) => {
            tokio::spawn(async move {
                let _ = events.send(event).await;
            });
        }
    }
}

/// Drains a player's outbound queue onto their socket
///
/// Exits on the first failed write, which closes the queue and lets the
/// session see the player as disconnected. When the queue is closed from
/// the other end the socket is closed gracefully.
async fn write_outbound(
    mut sink: WsSink,
    mut outbound: mpsc::Receiver<ServerMessage>,
    addr: SocketAddr,
) {
    while let Some(message) = outbound.recv().await {
        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to encode message for {}: {}", addr, e);
                continue;
            }
        };

        if let Err(e) = sink.send(Message::Text(text)).await {
            debug!("Write to {} failed: {}", addr, e);
            return;
        }
    }

    if let Err(e) = sink.close().await {
        debug!("Closing socket to {} failed: {}", addr, e);
    }
}

fn reply_join_error(link: &PlayerLink) {
    if let Err(e) = link.deliver(ServerMessage::join_error()) {
        debug!("Error reply not queued: {}", e);
    }
}
