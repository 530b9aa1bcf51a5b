//! Each `Match` is driven by exactly one cooperative task: a single
//! `select!` loop owning the tick clock and the inbound message queue.
//! Nothing else ever touches the `Match` directly once this task starts.

use std::sync::Arc;
use std::time::Duration;

use goalkeeper_sim::{ClientMessage, GamePhase, GameEvent, Match, MatchConfig, ServerMessage};
use log::{error, info, warn};
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;

/// A message routed into a match's executor. `Connect`/`Disconnect`
/// mutate the player table; `FromClient` carries an already-decoded
/// client message; `ResetTimer` is the match delivering a scheduled
/// reset-positions callback to itself (see `schedule_reset`).
pub enum Inbound {
    Connect {
        session_id: String,
        options: goalkeeper_sim::JoinOptions,
    },
    Disconnect {
        session_id: String,
    },
    FromClient {
        session_id: String,
        message: ClientMessage,
    },
    ResetTimer {
        generation: u64,
    },
}

#[derive(Clone)]
pub struct MatchHandle {
    pub id: String,
    pub join_code: Option<String>,
    pub inbound: mpsc::UnboundedSender<Inbound>,
    pub outbound: broadcast::Sender<Arc<ServerMessage>>,
}

pub fn spawn(id: String, config: MatchConfig, seed: u64, selected_map: String) -> MatchHandle {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, _) = broadcast::channel(256);
    let match_ = Match::new(id.clone(), config, seed, selected_map);

    let handle = MatchHandle {
        id: id.clone(),
        join_code: None,
        inbound: inbound_tx.clone(),
        outbound: outbound_tx.clone(),
    };

    tokio::spawn(run(match_, inbound_rx, inbound_tx, outbound_tx));

    handle
}

async fn run(
    mut match_: Match,
    mut inbound_rx: mpsc::UnboundedReceiver<Inbound>,
    self_tx: mpsc::UnboundedSender<Inbound>,
    outbound: broadcast::Sender<Arc<ServerMessage>>,
) {
    let tick_period = Duration::from_secs_f32(1.0 / match_.config.tick_rate as f32);
    let mut ticker = interval(tick_period);
    let mut reset_generation: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let events = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| match_.step()));
                match events {
                    Ok(events) => {
                        for event in events {
                            if let GameEvent::GoalScored { .. } = &event {
                                reset_generation += 1;
                                let generation = reset_generation;
                                let tx = self_tx.clone();
                                let grace = Duration::from_secs_f32(match_.reset_grace_period_secs());
                                tokio::spawn(async move {
                                    tokio::time::sleep(grace).await;
                                    let _ = tx.send(Inbound::ResetTimer { generation });
                                });
                            }
                            broadcast_event(&outbound, event);
                        }
                        if match_.current_tick % (match_.config.tick_rate / match_.config.patch_rate).max(1) as u64 == 0 {
                            let snapshot = match_.snapshot();
                            let _ = outbound.send(Arc::new(ServerMessage::Snapshot(snapshot)));
                        }
                    }
                    Err(_) => {
                        error!("match {}: sim step panicked, disposing match", match_.id);
                        let _ = outbound.send(Arc::new(ServerMessage::GameOver { winner: "draw".to_string() }));
                        return;
                    }
                }
            }
            inbound = inbound_rx.recv() => {
                let Some(inbound) = inbound else { return };
                match inbound {
                    Inbound::Connect { session_id, options } => {
                        match match_.join(session_id.clone(), &options) {
                            Ok(events) => {
                                info!("match {}: {} connected", match_.id, session_id);
                                for event in events {
                                    broadcast_event(&outbound, event);
                                }
                            }
                            Err(err) => warn!("match {}: join rejected for {}: {err}", match_.id, session_id),
                        }
                    }
                    Inbound::Disconnect { session_id } => {
                        if let Some(event) = match_.leave(&session_id) {
                            broadcast_event(&outbound, event);
                        }
                    }
                    Inbound::FromClient { session_id, message } => {
                        match match_.handle_message(&session_id, message) {
                            Ok(events) => {
                                for event in events {
                                    broadcast_event(&outbound, event);
                                }
                            }
                            Err(err) => {
                                warn!("match {}: message from {} dropped: {err}", match_.id, session_id);
                            }
                        }
                    }
                    Inbound::ResetTimer { generation } => {
                        if generation == reset_generation && match_.phase != GamePhase::Ended {
                            let event = match_.reset_positions();
                            broadcast_event(&outbound, event);
                        }
                    }
                }
            }
        }

        if match_.is_empty() {
            // Empty-match disposal is coordinated by the directory's
            // periodic sweep (net::run_housekeeping), not by this task,
            // so a player racing back in during the grace period is
            // handled without this loop needing to know about the timer.
        }
    }
}

fn broadcast_event(outbound: &broadcast::Sender<Arc<ServerMessage>>, event: GameEvent) {
    let _ = outbound.send(Arc::new(ServerMessage::from(event)));
}
