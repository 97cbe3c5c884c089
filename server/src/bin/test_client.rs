use clap::Parser;
use futures::{SinkExt, StreamExt};
use log::{info, warn};
use shared::{Handshake, PaddleUpdate, ServerMessage, BOARD_HEIGHT, PADDLE_HEIGHT};
use std::time::Duration;
use tokio::time::interval;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless player for exercising the session server")]
struct Args {
    /// WebSocket URL of the server endpoint
    #[arg(short, long, default_value = "ws://127.0.0.1:8080/connect")]
    server: String,

    /// Join this session code instead of creating a new session
    #[arg(short, long)]
    code: Option<String>,

    /// Number of state frames to receive before exiting
    #[arg(short, long, default_value = "300")]
    frames: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    let (socket, _) = connect_async(args.server.as_str()).await?;
    info!("Connected to {}", args.server);
    let (mut sink, mut stream) = socket.split();

    let (handshake, player) = match args.code {
        Some(code) => (Handshake::Join { code }, 2),
        None => (Handshake::Create, 1),
    };
    sink.send(Message::Text(serde_json::to_string(&handshake)?))
        .await?;

    // Sweep the paddle up and down while the match runs
    let mut paddle_y = (BOARD_HEIGHT / 2) as f32;
    let mut direction = 3.0;
    let mut send_timer = interval(Duration::from_millis(16));
    let mut frames = 0;

    while frames < args.frames {
        tokio::select! {
            frame = stream.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Server closed the connection");
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                };

                match serde_json::from_str::<ServerMessage>(&text)? {
                    ServerMessage::Created { code, message } => {
                        println!("Session code: {} ({})", code, message);
                    }
                    ServerMessage::Error { error } => {
                        println!("Server refused: {}", error);
                        break;
                    }
                    ServerMessage::State(state) => {
                        frames += 1;
                        if frames % 30 == 0 {
                            println!(
                                "paddles {} / {}, ball ({}, {})",
                                state.paddle1_y, state.paddle2_y, state.ball_x, state.ball_y
                            );
                        }
                    }
                }
            }
            _ = send_timer.tick() => {
                paddle_y += direction;
                if paddle_y <= 0.0 || paddle_y >= (BOARD_HEIGHT - PADDLE_HEIGHT) as f32 {
                    direction = -direction;
                }

                let update = PaddleUpdate { player, y: paddle_y };
                if let Err(e) = sink.send(Message::Text(serde_json::to_string(&update)?)).await {
                    warn!("Failed to send paddle update: {}", e);
                    break;
                }
            }
        }
    }

    if let Err(e) = sink.close().await {
        warn!("Failed to close connection: {}", e);
    }
    println!("Test client finished after {} frames", frames);

    Ok(())
}
