use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use uuid::Uuid;

use crate::room::AnswerEntry;
use crate::room_code::RoomCode;

// -- Framing --

pub type Transport = Framed<TcpStream, LengthDelimitedCodec>;

pub fn framed_transport(stream: TcpStream) -> Transport {
    LengthDelimitedCodec::builder()
        .max_frame_length(64 * 1024)
        .new_framed(stream)
}

// -- Client -> Server Messages --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientMessage {
    // Handshake
    Hello {
        version: String,
    },

    // Rooms
    CreateRoom,
    JoinRoom {
        /// Raw code as typed; the server canonicalizes before lookup.
        code: String,
    },

    // Gameplay
    SubmitAnswer {
        code: String,
        answer: String,
    },
    NextQuestion {
        code: String,
    },

    // Connection
    Ping,
    Disconnect,
}

// -- Server -> Client Messages --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerMessage {
    // Handshake
    Welcome {
        connection_id: Uuid,
        server_version: String,
    },
    HandshakeError {
        reason: String,
    },

    // Rooms
    RoomCreated {
        code: RoomCode,
    },
    WaitingForPartner,

    // Gameplay
    GameStarted {
        question: String,
        round: u32,
    },
    PartnerAnswered,
    RoundResults {
        /// Slot (join) order.
        answers: Vec<AnswerEntry>,
        #[serde(rename = "match")]
        matched: bool,
    },
    NextRound {
        question: String,
        round: u32,
    },
    PartnerDisconnected,

    // Errors
    Error {
        code: ErrorCode,
        message: String,
    },

    // Connection
    Pong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    RoomNotFound,
    RoomFull,
}

// -- Serialization helpers --

pub fn serialize_message<T: Serialize>(msg: &T) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_vec(msg)?;
    Ok(Bytes::from(json))
}

pub fn deserialize_message<T: for<'de> Deserialize<'de>>(
    data: &[u8],
) -> Result<T, serde_json::Error> {
    serde_json::from_slice(data)
}

// -- Transport helpers --

pub async fn send_message<T: Serialize>(
    transport: &mut Transport,
    msg: &T,
) -> anyhow::Result<()> {
    let bytes = serialize_message(msg).map_err(|e| anyhow::anyhow!("serialize error: {}", e))?;
    transport
        .send(bytes)
        .await
        .map_err(|e| anyhow::anyhow!("send error: {}", e))
}

pub async fn recv_message<T: for<'de> Deserialize<'de>>(
    transport: &mut Transport,
) -> anyhow::Result<Option<T>> {
    match transport.next().await {
        Some(Ok(frame)) => {
            let msg = deserialize_message(&frame)
                .map_err(|e| anyhow::anyhow!("deserialize error: {}", e))?;
            Ok(Some(msg))
        }
        Some(Err(e)) => Err(anyhow::anyhow!("recv error: {}", e)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_serialization() {
        let msg = ClientMessage::SubmitAnswer {
            code: "AB12".into(),
            answer: "cats".into(),
        };
        let bytes = serialize_message(&msg).unwrap();
        let deserialized: ClientMessage = deserialize_message(&bytes).unwrap();
        match deserialized {
            ClientMessage::SubmitAnswer { code, answer } => {
                assert_eq!(code, "AB12");
                assert_eq!(answer, "cats");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_server_message_serialization() {
        let id = Uuid::new_v4();
        let msg = ServerMessage::Welcome {
            connection_id: id,
            server_version: "0.1.0".into(),
        };
        let bytes = serialize_message(&msg).unwrap();
        let deserialized: ServerMessage = deserialize_message(&bytes).unwrap();
        match deserialized {
            ServerMessage::Welcome {
                connection_id,
                server_version,
            } => {
                assert_eq!(connection_id, id);
                assert_eq!(server_version, "0.1.0");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_round_results_match_key_on_wire() {
        let msg = ServerMessage::RoundResults {
            answers: vec![
                AnswerEntry {
                    id: Uuid::new_v4(),
                    answer: "Paris".into(),
                },
                AnswerEntry {
                    id: Uuid::new_v4(),
                    answer: " paris ".into(),
                },
            ],
            matched: true,
        };
        let bytes = serialize_message(&msg).unwrap();
        let json = std::str::from_utf8(&bytes).unwrap();
        assert!(json.contains("\"match\":true"));

        let deserialized: ServerMessage = deserialize_message(&bytes).unwrap();
        match deserialized {
            ServerMessage::RoundResults { answers, matched } => {
                assert_eq!(answers.len(), 2);
                assert!(matched);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_all_client_messages_serialize() {
        let messages = vec![
            ClientMessage::Hello {
                version: "0.1.0".into(),
            },
            ClientMessage::CreateRoom,
            ClientMessage::JoinRoom {
                code: "ab12".into(),
            },
            ClientMessage::SubmitAnswer {
                code: "AB12".into(),
                answer: "pizza".into(),
            },
            ClientMessage::NextQuestion {
                code: "AB12".into(),
            },
            ClientMessage::Ping,
            ClientMessage::Disconnect,
        ];

        for msg in &messages {
            let bytes = serialize_message(msg).unwrap();
            let _: ClientMessage = deserialize_message(&bytes).unwrap();
        }
    }
}
