//! WebSocket transport: accepts connections, decodes/encodes the JSON
//! message tags, and routes sessions to the right match task. Match and
//! PhysicsWorld state is never touched here directly — only message
//! passing, matching §5's suspension-points-are-I/O-only rule.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use goalkeeper_sim::{ClientMessage, JoinOptions, MatchConfig, config as sim_config};
use log::{debug, info, warn};
use rand::Rng;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::config::ServerConfig;
use crate::events::{DisconnectReason, ServerEvent};
use crate::match_task::{self, Inbound, MatchHandle};

/// Lightweight per-connection bookkeeping so dead WebSocket sessions can
/// be noticed even if the client never sends a clean `disconnect` — the
/// teacher's UDP connection manager tracked this for the same reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnecting,
}

struct MatchEntry {
    handle: MatchHandle,
}

/// Process-wide routing table: join code -> live match task, plus the
/// default public match new sessions land in. Held only for short
/// lookups/inserts, per §5's "short-held lock" requirement.
pub struct MatchDirectory {
    matches: Mutex<HashMap<String, MatchEntry>>,
    codes: Mutex<HashMap<String, String>>,
    public_match_id: Mutex<Option<String>>,
    next_seq: std::sync::atomic::AtomicU64,
    config: MatchConfig,
}

impl MatchDirectory {
    pub fn new(config: MatchConfig) -> Arc<Self> {
        Arc::new(Self {
            matches: Mutex::new(HashMap::new()),
            codes: Mutex::new(HashMap::new()),
            public_match_id: Mutex::new(None),
            next_seq: std::sync::atomic::AtomicU64::new(0),
            config,
        })
    }

    fn next_id(&self) -> String {
        let seq = self
            .next_seq
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("match-{seq}")
    }

    async fn spawn_match(&self, map: &str) -> MatchHandle {
        let id = self.next_id();
        let seed = rand::rng().random();
        let handle = match_task::spawn(id.clone(), self.config, seed, map.to_string());
        self.matches.lock().await.insert(
            id.clone(),
            MatchEntry {
                handle: handle.clone(),
            },
        );
        handle
    }

    /// Resolve (or create) the match a `join` should land in.
    pub async fn resolve(&self, options: &JoinOptions) -> MatchHandle {
        let map = options.map.clone().unwrap_or_else(|| "classic".to_string());

        if let Some(code) = &options.code {
            if let Some(id) = self.codes.lock().await.get(code).cloned() {
                if let Some(entry) = self.matches.lock().await.get(&id) {
                    return entry.handle.clone();
                }
            }
            let handle = self.spawn_match(&map).await;
            self.codes
                .lock()
                .await
                .insert(code.clone(), handle.id.clone());
            return handle;
        }

        if options.is_public.unwrap_or(true) {
            let mut public = self.public_match_id.lock().await;
            if let Some(id) = &*public {
                if let Some(entry) = self.matches.lock().await.get(id) {
                    return entry.handle.clone();
                }
            }
            let handle = self.spawn_match(&map).await;
            *public = Some(handle.id.clone());
            return handle;
        }

        self.spawn_match(&map).await
    }

    /// Generate a unique private join code and create a fresh match for it.
    pub async fn create_private(&self, map: &str) -> (MatchHandle, String) {
        let alphabet: Vec<char> = sim_config::JOIN_CODE_ALPHABET.chars().collect();
        let mut rng = rand::rng();
        let mut code;
        loop {
            code = (0..sim_config::JOIN_CODE_LEN)
                .map(|_| alphabet[rng.random_range(0..alphabet.len())])
                .collect::<String>();
            if !self.codes.lock().await.contains_key(&code) {
                break;
            }
        }
        let handle = self.spawn_match(map).await;
        self.codes.lock().await.insert(code.clone(), handle.id.clone());
        (handle, code)
    }

    /// Periodic housekeeping: matches whose task has exited (channel
    /// closed) are dropped from the directory.
    pub async fn sweep_dead(&self) {
        let mut matches = self.matches.lock().await;
        matches.retain(|_, entry| !entry.handle.inbound.is_closed());
        let mut codes = self.codes.lock().await;
        let live: std::collections::HashSet<String> =
            matches.keys().cloned().collect();
        codes.retain(|_, match_id| live.contains(match_id));
    }
}

pub async fn run(listener: TcpListener, directory: Arc<MatchDirectory>, config: ServerConfig) {
    info!("listening on {}", listener.local_addr().map(|a| a.to_string()).unwrap_or_default());

    {
        let directory = directory.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(5));
            loop {
                ticker.tick().await;
                directory.sweep_dead().await;
            }
        });
    }

    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(err) => {
                warn!("accept failed: {err}");
                continue;
            }
        };
        let directory = directory.clone();
        let max_clients = config.max_clients_per_match;
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, addr, directory, max_clients).await {
                debug!("connection {addr} ended: {err}");
            }
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    directory: Arc<MatchDirectory>,
    _max_clients: usize,
) -> anyhow::Result<()> {
    let event = ServerEvent::ClientConnecting { addr };
    debug!("{event:?}");

    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut write, mut read) = ws.split();

    // First frame must be a `join`.
    let first = read.next().await.ok_or_else(|| anyhow::anyhow!("closed before join"))??;
    let text = match first {
        WsMessage::Text(t) => t,
        _ => return Err(anyhow::anyhow!("expected text frame for join")),
    };
    let join_msg: ClientMessage = serde_json::from_str(&text)?;
    let options = match join_msg {
        ClientMessage::Join(options) => options,
        _ => return Err(anyhow::anyhow!("first message must be `join`")),
    };

    let session_id = format!("session-{}", uuid_like());
    let (match_handle, room_code) = if options.code.is_none() && options.is_public == Some(false) {
        let map = options.map.clone().unwrap_or_else(|| "classic".to_string());
        let (handle, code) = directory.create_private(&map).await;
        (handle, Some(code))
    } else {
        (directory.resolve(&options).await, None)
    };

    let mut outbound_rx = match_handle.outbound.subscribe();
    let _ = match_handle.inbound.send(Inbound::Connect {
        session_id: session_id.clone(),
        options,
    });

    info!(
        "{:?}",
        ServerEvent::ClientConnected {
            session_id: session_id.clone(),
            addr,
            match_id: match_handle.id.clone(),
        }
    );

    if let Some(code) = room_code {
        let msg = goalkeeper_sim::ServerMessage::RoomCode { code };
        let _ = write.send(WsMessage::Text(serde_json::to_string(&msg)?.into())).await;
    }

    let mut last_seen = Instant::now();
    let state = ConnectionState::Connected;
    debug!("session {session_id} entered state {state:?}");

    loop {
        tokio::select! {
            incoming = read.next() => {
                let Some(incoming) = incoming else { break };
                let incoming = incoming?;
                match incoming {
                    WsMessage::Text(text) => {
                        last_seen = Instant::now();
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(message) => {
                                let _ = match_handle.inbound.send(Inbound::FromClient {
                                    session_id: session_id.clone(),
                                    message,
                                });
                            }
                            Err(err) => debug!("session {session_id}: unparsable message dropped: {err}"),
                        }
                    }
                    WsMessage::Close(_) => break,
                    WsMessage::Ping(payload) => {
                        let _ = write.send(WsMessage::Pong(payload)).await;
                    }
                    _ => {}
                }
            }
            outbound = outbound_rx.recv() => {
                match outbound {
                    Ok(message) => {
                        let text = serde_json::to_string(&*message)?;
                        if write.send(WsMessage::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }

        if last_seen.elapsed() > Duration::from_secs(30) {
            break;
        }
    }

    let _ = match_handle.inbound.send(Inbound::Disconnect {
        session_id: session_id.clone(),
    });
    info!(
        "{:?}",
        ServerEvent::ClientDisconnected {
            session_id,
            reason: DisconnectReason::Graceful,
        }
    );
    Ok(())
}

fn uuid_like() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 8] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
