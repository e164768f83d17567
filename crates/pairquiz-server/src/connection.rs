use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use uuid::Uuid;

use pairquiz_common::protocol::{
    self, ClientMessage, ServerMessage, framed_transport, serialize_message,
};

use crate::coordinator;
use crate::server::SharedState;

/// Per-connection handle, keyed by connection id in the shared map: the
/// outbound channel the connection's writer task drains.
pub struct ConnectionHandle {
    pub tx: mpsc::Sender<ServerMessage>,
}

pub async fn handle_connection(stream: TcpStream, state: SharedState) -> anyhow::Result<()> {
    let mut transport = framed_transport(stream);

    // Step 1: Handshake -- expect Hello
    let hello: ClientMessage = match protocol::recv_message(&mut transport).await? {
        Some(msg) => msg,
        None => return Ok(()),
    };

    let connection_id = match hello {
        ClientMessage::Hello { version } => {
            let id = Uuid::new_v4();
            tracing::info!("Client {} connected (client version: {})", id, version);
            protocol::send_message(
                &mut transport,
                &ServerMessage::Welcome {
                    connection_id: id,
                    server_version: env!("CARGO_PKG_VERSION").to_string(),
                },
            )
            .await?;
            id
        }
        _ => {
            protocol::send_message(
                &mut transport,
                &ServerMessage::HandshakeError {
                    reason: "Expected Hello message".into(),
                },
            )
            .await?;
            return Ok(());
        }
    };

    // Step 2: Create mpsc channel for outbound messages
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(64);

    // Register connection
    {
        let handle = ConnectionHandle { tx: tx.clone() };
        state.connections.write().await.insert(connection_id, handle);
    }

    // Step 3: Split transport for independent read/write
    let (mut sink, mut stream) = transport.split();

    // Writer task: drains rx and writes to sink
    let write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serialize_message(&msg) {
                Ok(bytes) => {
                    if sink.send(bytes).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Step 4: Reader loop
    loop {
        match stream.next().await {
            Some(Ok(frame)) => {
                match protocol::deserialize_message::<ClientMessage>(&frame) {
                    Ok(msg) => {
                        if let Err(e) = coordinator::handle_message(connection_id, msg, &state).await
                        {
                            tracing::error!("Handler error for {}: {}", connection_id, e);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse message from {}: {}", connection_id, e);
                    }
                }
            }
            Some(Err(e)) => {
                tracing::warn!("Read error from {}: {}", connection_id, e);
                break;
            }
            None => {
                tracing::info!("Client {} disconnected", connection_id);
                break;
            }
        }
    }

    // Cleanup
    coordinator::handle_disconnect(connection_id, &state).await;
    write_task.abort();
    Ok(())
}
