//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections, retrying on transient failures.
//! - Assigns each connection a `SessionId`.
//! - Spawns a per-session task that handles the connection end to end.
//!
//! The acceptor never touches the room directory itself beyond the
//! capacity check; the per-session logic lives in the `session` module.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{info, warn};

use chat_core::{RoomDirectory, SessionId};

use crate::broadcast::Broadcaster;
use crate::config::Config;
use crate::session;

/// How long to back off after a failed `accept` before retrying.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Global-ish counter for assigning unique `SessionId`s.
///
/// In a more elaborate setup you might encapsulate this in a struct,
/// but this is sufficient and threadsafe for our server.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
    SessionId(id)
}

/// Bind the configured endpoint and run the accept loop forever.
pub async fn run(config: Config) -> Result<()> {
    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, max_clients = config.max_clients, "listening");
    serve(listener, config).await
}

/// Run the accept loop on an already-bound listener.
///
/// Split out from [`run`] so tests can bind an ephemeral port first.
pub async fn serve(listener: TcpListener, config: Config) -> Result<()> {
    let directory = Arc::new(RoomDirectory::new());
    let broadcaster = Broadcaster::new(directory.clone());

    // Session tasks are tracked here rather than detached, so a drain
    // or shutdown path could await them later.
    let mut sessions: JoinSet<()> = JoinSet::new();

    loop {
        // Reap finished session tasks so the set does not grow unbounded.
        while sessions.try_join_next().is_some() {}

        let (stream, peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed, retrying");
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };

        if directory.member_count().await >= config.max_clients {
            warn!(
                peer = %peer_addr,
                max_clients = config.max_clients,
                "rejecting connection: max_clients reached"
            );
            // Just drop the stream; the client sees a closed connection.
            continue;
        }

        let session_id = next_session_id();
        info!(session = session_id.0, peer = %peer_addr, "accepted connection");

        let directory = directory.clone();
        let broadcaster = broadcaster.clone();
        sessions.spawn(async move {
            match session::run_session(session_id, stream, directory, broadcaster).await {
                Ok(()) => info!(session = session_id.0, "session closed"),
                Err(e) => warn!(session = session_id.0, error = %e, "session ended with error"),
            }
        });
    }
}
