//! TCP protocol between a pose-estimation client and the jump server.
//!
//! The client streams ankle frames; the server answers with per-frame
//! heights and, when a jump lands, the jump plus the updated stats.

use bytes::Bytes;
use futures::{Sink, SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::jump::{AirborneState, FinalStats, FootHeightSample, JumpEvent, JumpSink, RunningStats};
use crate::pose::AnkleFrame;

const MAX_FRAME_LENGTH: usize = 1024 * 1024;

// --- Message types ---

/// Pose client → server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ClientMessage {
    StartSession,
    Frame { frame: AnkleFrame },
    StopSession,
}

/// Server → pose client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Ready,
    Heights {
        left_height_px: f32,
        right_height_px: f32,
        timestamp_ms: f64,
        airborne: AirborneState,
        ground_level_px: Option<f32>,
    },
    Jump { event: JumpEvent, stats: RunningStats },
    SessionSummary { summary: FinalStats },
}

/// Collects engine output as server messages until the connection task sends them.
#[derive(Debug, Default)]
pub struct MessageOutbox {
    pending: Vec<ServerMessage>,
}

impl MessageOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, ServerMessage> {
        self.pending.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl JumpSink for MessageOutbox {
    fn on_heights(&mut self, heights: &FootHeightSample, airborne: AirborneState, ground_level_px: Option<f32>) {
        self.pending.push(ServerMessage::Heights {
            left_height_px: heights.left_height_px,
            right_height_px: heights.right_height_px,
            timestamp_ms: heights.timestamp_ms,
            airborne,
            ground_level_px,
        });
    }

    fn on_jump(&mut self, event: &JumpEvent, stats: &RunningStats) {
        self.pending.push(ServerMessage::Jump {
            event: *event,
            stats: *stats,
        });
    }
}

// --- TCP codec helpers ---

pub type MessageStream = Framed<TcpStream, LengthDelimitedCodec>;

/// Create a framed message stream with length-delimited framing.
pub fn message_stream(stream: TcpStream) -> MessageStream {
    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(MAX_FRAME_LENGTH)
        .new_codec();
    Framed::new(stream, codec)
}

pub fn encode<T: Serialize>(msg: &T) -> anyhow::Result<Bytes> {
    Ok(Bytes::from(bincode::serialize(msg)?))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> anyhow::Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

/// Send a serializable message (bincode + length prefix).
pub async fn send_message<T: Serialize>(
    stream: &mut MessageStream,
    msg: &T,
) -> anyhow::Result<()> {
    stream.send(encode(msg)?).await?;
    Ok(())
}

/// Send on the write half of a split stream.
pub async fn send_to_sink<S, T>(sink: &mut S, msg: &T) -> anyhow::Result<()>
where
    S: Sink<Bytes, Error = std::io::Error> + Unpin,
    T: Serialize,
{
    sink.send(encode(msg)?).await?;
    Ok(())
}

/// Receive and deserialize a message. `Ok(None)` when the peer closed cleanly.
pub async fn recv_message<T: DeserializeOwned>(
    stream: &mut MessageStream,
) -> anyhow::Result<Option<T>> {
    match stream.next().await {
        Some(Ok(bytes)) => Ok(Some(decode(&bytes)?)),
        Some(Err(e)) => Err(e.into()),
        None => Ok(None),
    }
}
