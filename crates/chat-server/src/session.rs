//! Per-connection session handling.
//!
//! One accepted connection is owned end to end by [`run_session`]:
//! nickname negotiation, command dispatch, chat relay, and cleanup.
//!
//! The connection is split in two:
//! - the reader loop (this task) parses inbound lines and drives the
//!   session state machine;
//! - a writer task owns the write half and drains the session's
//!   outbound channel, which carries both this session's own replies
//!   and broadcasts queued by other sessions.
//!
//! Cleanup runs on every exit path: read error, graceful close, and
//! writer death (fatal send failure). The directory entry is removed
//! first, then the departure notice goes out, then the outbound
//! channel closes so the writer drains and shuts the socket down.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{info, warn};

use chat_core::{
    ClientCommand, Departure, OutboundRx, OutboundTx, RoomDirectory, RoomId, RoomUpdate,
    ServerMessage, SessionId, LOBBY,
};
use chat_protocol::line_codec::{self, ClientLine};

/// Run one session from accept to teardown.
pub async fn run_session(
    id: SessionId,
    stream: TcpStream,
    directory: Arc<RoomDirectory>,
    broadcaster: crate::broadcast::Broadcaster,
) -> io::Result<()> {
    let (read_half, write_half) = stream.into_split();
    let (out_tx, out_rx) = mpsc::unbounded_channel();

    let mut writer = tokio::spawn(write_loop(id, write_half, out_rx));

    let read = read_loop(id, read_half, out_tx.clone(), &directory, &broadcaster);
    tokio::pin!(read);

    let mut writer_done = false;
    let outcome = tokio::select! {
        res = &mut read => res,
        _ = &mut writer => {
            writer_done = true;
            Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "outbound writer stopped",
            ))
        }
    };

    // Remove the entry before telling anyone, so the departed session
    // can no longer appear in any snapshot.
    if let Some(Departure { nickname, room }) = directory.unregister(id).await {
        info!(session = id.0, nickname = %nickname, room, "session unregistered");
        if room != LOBBY {
            broadcaster
                .to_room(room, Some(id), ServerMessage::MemberLeft { nickname, room })
                .await;
        }
    }

    drop(out_tx);
    if !writer_done {
        // All senders are gone now; the writer drains what is queued,
        // shuts down the send direction, and exits.
        let _ = writer.await;
    }

    outcome
}

/// Drain the outbound channel onto the socket, one line per message.
///
/// Exits when the channel closes (normal teardown) or on the first
/// write error (the socket is dead; the session tears down).
async fn write_loop(id: SessionId, mut write_half: OwnedWriteHalf, mut out_rx: OutboundRx) {
    while let Some(msg) = out_rx.recv().await {
        let line = format!("{}\n", line_codec::render_server_line(&msg));
        if let Err(e) = write_half.write_all(line.as_bytes()).await {
            warn!(session = id.0, error = %e, "write failed");
            return;
        }
    }
    let _ = write_half.shutdown().await;
}

/// Queue a message for this session's own writer.
///
/// A send failure means the writer already died; the session is being
/// torn down, so the message is simply dropped.
fn send(out_tx: &OutboundTx, msg: ServerMessage) {
    let _ = out_tx.send(msg);
}

/// The session state machine: nickname negotiation, then the active
/// command/chat loop. Returns `Ok(())` on graceful close.
async fn read_loop(
    id: SessionId,
    read_half: OwnedReadHalf,
    out_tx: OutboundTx,
    directory: &RoomDirectory,
    broadcaster: &crate::broadcast::Broadcaster,
) -> io::Result<()> {
    let mut lines = BufReader::new(read_half).lines();

    send(&out_tx, ServerMessage::NickRequired);

    // --- nickname negotiation ---
    let nickname = loop {
        let Some(line) = lines.next_line().await? else {
            info!(session = id.0, "disconnected during nickname negotiation");
            return Ok(());
        };

        match line_codec::parse_nick_line(&line) {
            Some(proposed) => match directory.register(id, &proposed, out_tx.clone()).await {
                Ok(()) => {
                    info!(session = id.0, nickname = %proposed, "nickname accepted");
                    send(&out_tx, ServerMessage::NickAccepted);
                    let others = directory.snapshot_room(LOBBY, Some(id)).await;
                    send(
                        &out_tx,
                        ServerMessage::UserList {
                            room: LOBBY,
                            nicknames: others,
                        },
                    );
                    break proposed;
                }
                Err(e) => send(
                    &out_tx,
                    ServerMessage::NickRejected {
                        reason: e.to_string(),
                    },
                ),
            },
            None => send(
                &out_tx,
                ServerMessage::Error("Please send your nickname using 'NICK <name>'.".to_string()),
            ),
        }
    };

    // --- active loop ---
    while let Some(line) = lines.next_line().await? {
        match line_codec::parse_active_line(&line) {
            ClientLine::Empty => {}
            ClientLine::Command(ClientCommand::Join(room)) => {
                handle_join(id, &nickname, room, directory, broadcaster, &out_tx).await;
            }
            ClientLine::Command(ClientCommand::Leave) => {
                handle_leave(id, &nickname, directory, broadcaster, &out_tx).await;
            }
            ClientLine::Invalid(e) => send(&out_tx, ServerMessage::Error(e.to_string())),
            ClientLine::Chat(text) => {
                // The room is read fresh: a prior JOIN/LEAVE in this
                // same session must already be reflected here.
                let Some(room) = directory.room_of(id).await else {
                    break;
                };
                broadcaster
                    .to_room(
                        room,
                        Some(id),
                        ServerMessage::Chat {
                            sender: nickname.clone(),
                            text,
                        },
                    )
                    .await;
            }
        }
    }

    info!(session = id.0, nickname = %nickname, "disconnected");
    Ok(())
}

/// `COMMAND:JOIN:<n>`: atomically switch rooms, then notify the old
/// room, the new room, and the sender, in that order, only after the
/// directory update is visible.
async fn handle_join(
    id: SessionId,
    nickname: &str,
    room: RoomId,
    directory: &RoomDirectory,
    broadcaster: &crate::broadcast::Broadcaster,
    out_tx: &OutboundTx,
) {
    match directory.set_room(id, room).await {
        Some(RoomUpdate::Unchanged) => {
            send(out_tx, ServerMessage::Info(format!("already in room '{room}'.")));
        }
        Some(RoomUpdate::Moved { old_room }) => {
            if old_room != LOBBY {
                broadcaster
                    .to_room(
                        old_room,
                        Some(id),
                        ServerMessage::MemberLeft {
                            nickname: nickname.to_string(),
                            room: old_room,
                        },
                    )
                    .await;
            }
            broadcaster
                .to_room(
                    room,
                    Some(id),
                    ServerMessage::MemberJoined {
                        nickname: nickname.to_string(),
                        room,
                    },
                )
                .await;
            send(out_tx, ServerMessage::RoomJoined(room));
            let others = directory.snapshot_room(room, Some(id)).await;
            send(
                out_tx,
                ServerMessage::UserList {
                    room,
                    nicknames: others,
                },
            );
        }
        None => {
            // Only cleanup removes entries, and cleanup runs after this
            // loop; an active session without an entry is a bug.
            warn!(session = id.0, "JOIN from session with no directory entry");
        }
    }
}

/// `COMMAND:LEAVE`: atomically return to the lobby, then notify the
/// old room and the sender.
async fn handle_leave(
    id: SessionId,
    nickname: &str,
    directory: &RoomDirectory,
    broadcaster: &crate::broadcast::Broadcaster,
    out_tx: &OutboundTx,
) {
    match directory.set_room(id, LOBBY).await {
        Some(RoomUpdate::Unchanged) => {
            send(out_tx, ServerMessage::Info("already in lobby.".to_string()));
        }
        Some(RoomUpdate::Moved { old_room }) => {
            broadcaster
                .to_room(
                    old_room,
                    Some(id),
                    ServerMessage::MemberLeft {
                        nickname: nickname.to_string(),
                        room: old_room,
                    },
                )
                .await;
            send(out_tx, ServerMessage::RoomLeft(old_room));
            let others = directory.snapshot_room(LOBBY, Some(id)).await;
            send(
                out_tx,
                ServerMessage::UserList {
                    room: LOBBY,
                    nicknames: others,
                },
            );
        }
        None => {
            warn!(session = id.0, "LEAVE from session with no directory entry");
        }
    }
}
