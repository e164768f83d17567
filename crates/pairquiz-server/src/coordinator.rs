use rand::SeedableRng;
use uuid::Uuid;

use pairquiz_common::protocol::{ClientMessage, ErrorCode, ServerMessage};
use pairquiz_common::room_code::RoomCode;

use crate::server::SharedState;

pub async fn handle_message(
    conn_id: Uuid,
    msg: ClientMessage,
    state: &SharedState,
) -> anyhow::Result<()> {
    match msg {
        ClientMessage::CreateRoom => {
            let mut rng = rand::rngs::StdRng::from_entropy();
            let code = {
                let mut rooms = state.rooms.write().await;
                rooms.create_room(&mut rng)
            };

            tracing::info!("Room created: {}", code);
            send_to_connection(conn_id, ServerMessage::RoomCreated { code }, state).await;
        }

        ClientMessage::JoinRoom { code } => {
            let code = RoomCode::new(&code);
            let mut rooms = state.rooms.write().await;
            let room = match rooms.get_mut(&code) {
                Some(r) => r,
                None => {
                    drop(rooms);
                    tracing::debug!("Join rejected, no such room: {}", code);
                    send_to_connection(
                        conn_id,
                        ServerMessage::Error {
                            code: ErrorCode::RoomNotFound,
                            message: "Room not found".into(),
                        },
                        state,
                    )
                    .await;
                    return Ok(());
                }
            };

            if room.add_participant(conn_id).is_err() {
                drop(rooms);
                tracing::debug!("Join rejected, room full: {}", code);
                send_to_connection(
                    conn_id,
                    ServerMessage::Error {
                        code: ErrorCode::RoomFull,
                        message: "Room is full".into(),
                    },
                    state,
                )
                .await;
                return Ok(());
            }

            if room.is_full() {
                // Second joiner completes the pair; the round starts now.
                let question = state.questions.question(room.question_index).to_string();
                let round = room.round;
                let members = room.participants.clone();
                drop(rooms);

                tracing::info!("Game starting in room {}", code);
                broadcast_to_list(
                    &members,
                    &ServerMessage::GameStarted { question, round },
                    state,
                    None,
                )
                .await;
            } else {
                drop(rooms);
                send_to_connection(conn_id, ServerMessage::WaitingForPartner, state).await;
            }
        }

        ClientMessage::SubmitAnswer { code, answer } => {
            let code = RoomCode::new(&code);
            let mut rooms = state.rooms.write().await;
            // A missing room here is a race with disconnect teardown, not a
            // user error; the client has no recovery action.
            let room = match rooms.get_mut(&code) {
                Some(r) => r,
                None => return Ok(()),
            };

            if !room.record_answer(conn_id, answer) {
                return Ok(());
            }

            let members = room.participants.clone();
            let results = room.round_results();
            drop(rooms);

            broadcast_to_list(
                &members,
                &ServerMessage::PartnerAnswered,
                state,
                Some(conn_id),
            )
            .await;

            if let Some((answers, matched)) = results {
                tracing::debug!("Both answered in room {}, match: {}", code, matched);
                broadcast_to_list(
                    &members,
                    &ServerMessage::RoundResults { answers, matched },
                    state,
                    None,
                )
                .await;
            }
        }

        ClientMessage::NextQuestion { code } => {
            let code = RoomCode::new(&code);
            let mut rooms = state.rooms.write().await;
            let room = match rooms.get_mut(&code) {
                Some(r) => r,
                None => return Ok(()),
            };

            room.advance(state.questions.len());
            let question = state.questions.question(room.question_index).to_string();
            let round = room.round;
            let members = room.participants.clone();
            drop(rooms);

            broadcast_to_list(
                &members,
                &ServerMessage::NextRound { question, round },
                state,
                None,
            )
            .await;
        }

        ClientMessage::Ping => {
            send_to_connection(conn_id, ServerMessage::Pong, state).await;
        }

        ClientMessage::Disconnect => {
            handle_disconnect(conn_id, state).await;
        }

        // Handshake is handled at connection setup; a stray Hello is noise.
        ClientMessage::Hello { .. } => {}
    }

    Ok(())
}

/// Transport-level disconnect: drop the connection from every room holding
/// it, tell the survivor, and delete rooms that emptied out.
pub async fn handle_disconnect(conn_id: Uuid, state: &SharedState) {
    let mut notify: Vec<(RoomCode, Vec<Uuid>)> = Vec::new();

    {
        let mut rooms = state.rooms.write().await;
        for code in rooms.rooms_containing(conn_id) {
            if let Some(room) = rooms.get_mut(&code) {
                room.remove_participant(&conn_id);
                if room.is_empty() {
                    tracing::info!("Room {} abandoned, removing", code);
                    rooms.remove(&code);
                } else {
                    notify.push((code, room.participants.clone()));
                }
            }
        }
    }

    for (code, remaining) in notify {
        tracing::info!("Participant left room {}, notifying partner", code);
        broadcast_to_list(&remaining, &ServerMessage::PartnerDisconnected, state, None).await;
    }

    state.connections.write().await.remove(&conn_id);
}

async fn send_to_connection(conn_id: Uuid, msg: ServerMessage, state: &SharedState) {
    let conns = state.connections.read().await;
    if let Some(conn) = conns.get(&conn_id) {
        let _ = conn.tx.send(msg).await;
    }
}

/// Broadcast a message to a list of connection IDs. Optionally exclude one.
async fn broadcast_to_list(
    member_ids: &[Uuid],
    msg: &ServerMessage,
    state: &SharedState,
    exclude: Option<Uuid>,
) {
    let conns = state.connections.read().await;
    for &id in member_ids {
        if Some(id) == exclude {
            continue;
        }
        if let Some(conn) = conns.get(&id) {
            let _ = conn.tx.send(msg.clone()).await;
        }
    }
}
