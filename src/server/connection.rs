// Per-connection frame reader

use futures::StreamExt;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;

use crate::config::constants::{MAX_FRAME_LENGTH, QUIT_COMMAND_ID};
use crate::network::CommandFrame;

/// A frame read from one client connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedCommand {
    pub peer: SocketAddr,
    pub frame: CommandFrame,
}

pub(super) async fn handle(
    stream: TcpStream,
    peer: SocketAddr,
    events: Option<mpsc::UnboundedSender<ReceivedCommand>>,
    shutdown: CancellationToken,
) {
    let mut lines = FramedRead::new(stream, LinesCodec::new_with_max_length(MAX_FRAME_LENGTH));

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next() => match line {
                Some(Ok(line)) => handle_line(&line, peer, events.as_ref(), &shutdown),
                None => break,
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    tracing::warn!(peer = %peer, "Line exceeds {} bytes, closing", MAX_FRAME_LENGTH);
                    break;
                }
                Some(Err(e)) => {
                    tracing::warn!(peer = %peer, "Read failed: {}", e);
                    break;
                }
            },
        }
    }

    tracing::debug!(peer = %peer, "Connection closed");
}

fn handle_line(
    line: &str,
    peer: SocketAddr,
    events: Option<&mpsc::UnboundedSender<ReceivedCommand>>,
    shutdown: &CancellationToken,
) {
    if line.trim().is_empty() {
        return;
    }

    let frame = match CommandFrame::decode(line) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(peer = %peer, "Bad frame {:?}: {}", line, e);
            return;
        }
    };

    tracing::info!(peer = %peer, kind = %frame.kind, id = %frame.id, "Message");

    let quit = frame.is_command() && frame.id == QUIT_COMMAND_ID;

    if let Some(events) = events {
        // Receiver gone just means nobody is watching
        let _ = events.send(ReceivedCommand { peer, frame });
    }

    if quit {
        tracing::info!("Quit command received, shutting down server...");
        shutdown.cancel();
    }
}
