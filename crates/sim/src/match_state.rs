//! The authoritative per-match state machine: world, players, ball,
//! power-ups, scores, and the message handlers that mutate them. Owns
//! everything; nothing here is reachable from another match.

use std::collections::{HashMap, VecDeque};

use glam::Vec3;
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::*;
use crate::entities::{Ball, Player, PowerUp, PowerUpType, SessionId, Team};
use crate::error::MessageError;
use crate::events::GameEvent;
use crate::message::{ClientMessage, InputRecord, JoinOptions};
use crate::physics::PhysicsWorld;
use crate::snapshot::{self, GamePhase, SnapshotPayload};
use crate::{arena, boundary, contact, goal, input, powerup_service};

const PLAYER_HALF_HEIGHT: f32 = 0.9;
const CHAT_WINDOW_SECS: f32 = 1.0;

pub struct Match {
    pub id: String,
    pub config: MatchConfig,
    pub selected_map: String,
    pub join_code: Option<String>,

    physics: PhysicsWorld,
    players: HashMap<SessionId, Player>,
    join_order: Vec<SessionId>,
    ball: Ball,
    power_ups: Vec<PowerUp>,

    pub red_score: u32,
    pub blue_score: u32,
    pub timer_secs: f32,
    pub phase: GamePhase,
    pub current_tick: u64,

    last_goal_time_secs: f32,
    last_touch: Option<SessionId>,
    second_last_touch: Option<SessionId>,

    last_powerup_spawn_secs: f32,
    next_powerup_id: u64,

    chat_timestamps: HashMap<SessionId, VecDeque<f32>>,

    rng: StdRng,
}

impl Match {
    pub fn new(id: String, config: MatchConfig, seed: u64, selected_map: String) -> Self {
        let mut physics = PhysicsWorld::new(-GRAVITY);
        arena::build(&mut physics);
        let mut ball = Ball::at_kickoff();
        ball.body = Some(physics.add_dynamic_ball(
            ball.position(),
            BALL_RADIUS,
            BALL_MASS,
            BALL_RESTITUTION,
            0.05,
            0.3,
        ));

        Self {
            id,
            config,
            selected_map,
            join_code: None,
            physics,
            players: HashMap::new(),
            join_order: Vec::new(),
            ball,
            power_ups: Vec::new(),
            red_score: 0,
            blue_score: 0,
            timer_secs: config.match_timer_start_secs,
            phase: GamePhase::Waiting,
            current_tick: 0,
            last_goal_time_secs: -config.goal_cooldown_secs,
            last_touch: None,
            second_last_touch: None,
            last_powerup_spawn_secs: 0.0,
            next_powerup_id: 0,
            chat_timestamps: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn now_secs(&self) -> f32 {
        self.current_tick as f32 * FIXED_TIMESTEP
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    fn is_host(&self, session_id: &str) -> bool {
        self.join_order.first().map(|s| s.as_str()) == Some(session_id)
    }

    fn team_counts(&self) -> (usize, usize) {
        let red = self.players.values().filter(|p| p.team == Team::Red).count();
        let blue = self.players.values().filter(|p| p.team == Team::Blue).count();
        (red, blue)
    }

    fn auto_balance(&self, requested: Option<Team>) -> Result<Team, MessageError> {
        let (red, blue) = self.team_counts();
        const CAP: usize = 2;
        let requested = requested.unwrap_or(if red <= blue { Team::Red } else { Team::Blue });
        let (requested_count, other, other_count) = match requested {
            Team::Red => (red, Team::Blue, blue),
            Team::Blue => (blue, Team::Red, red),
        };
        if requested_count < CAP {
            Ok(requested)
        } else if other_count < CAP {
            Ok(other)
        } else {
            Err(MessageError::MatchFull)
        }
    }

    /// Handle a `join` message: resolve team, spawn the player, return the
    /// events to broadcast (at minimum `player-joined`).
    pub fn join(
        &mut self,
        session_id: SessionId,
        options: &JoinOptions,
    ) -> Result<Vec<GameEvent>, MessageError> {
        if self.players.len() >= self.config.max_clients {
            return Err(MessageError::MatchFull);
        }
        let team = self.auto_balance(options.team)?;
        let character = options.character.clone().unwrap_or_else(|| "default".into());
        let name = options.name.clone().unwrap_or_else(|| session_id.clone());

        let mut player = Player::new(session_id.clone(), team, character.clone(), name);
        let body = self.physics.add_kinematic_player(
            Vec3::new(player.x, player.y, player.z),
            player.radius(),
            PLAYER_HALF_HEIGHT,
        );
        player.body = Some(body);

        self.players.insert(session_id.clone(), player);
        self.join_order.push(session_id.clone());

        info!("match {}: {} joined as {:?}", self.id, session_id, team);
        Ok(vec![GameEvent::PlayerJoined {
            session_id,
            team,
            character,
        }])
    }

    pub fn leave(&mut self, session_id: &str) -> Option<GameEvent> {
        let player = self.players.remove(session_id)?;
        if let Some(handle) = player.body {
            self.physics.remove_body(handle);
        }
        self.join_order.retain(|s| s != session_id);
        info!("match {}: {} left", self.id, session_id);
        Some(GameEvent::PlayerLeft {
            session_id: session_id.to_string(),
        })
    }

    /// Dispatch one client message. Returns the events it generated, if
    /// any; validation/not-found/protocol failures are communicated only
    /// via the `Err` (callers drop the record and never disconnect).
    pub fn handle_message(
        &mut self,
        session_id: &str,
        message: ClientMessage,
    ) -> Result<Vec<GameEvent>, MessageError> {
        match message {
            ClientMessage::Join(_) => Ok(vec![]),
            ClientMessage::Input(payload) => {
                let player = self
                    .players
                    .get_mut(session_id)
                    .ok_or(MessageError::UnknownSession)?;
                input::accept_batch(player, payload.into_records());
                Ok(vec![])
            }
            ClientMessage::Kick {
                impulse_x,
                impulse_y,
                impulse_z,
            } => {
                let player = self
                    .players
                    .get(session_id)
                    .ok_or(MessageError::UnknownSession)?;
                let applied = contact::kick(
                    &mut self.physics,
                    player,
                    &mut self.ball,
                    Vec3::new(impulse_x, impulse_y, impulse_z),
                );
                if !applied {
                    return Ok(vec![]);
                }
                self.shift_touch_history(session_id.to_string());
                if let Some(p) = self.players.get_mut(session_id) {
                    p.stats.shots += 1;
                }
                Ok(vec![GameEvent::BallKicked {
                    impulse: Vec3::new(impulse_x, impulse_y + KICK_VERTICAL_BOOST, impulse_z),
                }])
            }
            ClientMessage::JoinTeam {
                name,
                team,
                character,
            } => {
                if !self.players.contains_key(session_id) {
                    return Err(MessageError::UnknownSession);
                }
                let resolved = self.auto_balance(Some(team)).unwrap_or(team);
                let player = self.players.get_mut(session_id).unwrap();
                player.team = resolved;
                if let Some(n) = name {
                    player.name = n;
                }
                if let Some(c) = character {
                    player.character = c;
                }
                Ok(vec![])
            }
            ClientMessage::Chat { message } => {
                if message.len() > CHAT_MAX_LEN {
                    return Err(MessageError::Malformed("chat message too long".into()));
                }
                if !self.players.contains_key(session_id) {
                    return Err(MessageError::UnknownSession);
                }
                if self.chat_rate_limited(session_id) {
                    debug!("match {}: chat from {} throttled", self.id, session_id);
                    return Ok(vec![]);
                }
                Ok(vec![GameEvent::ChatMessage {
                    session_id: session_id.to_string(),
                    message,
                }])
            }
            ClientMessage::StartGame => {
                if !self.is_host(session_id) {
                    return Err(MessageError::NotHost);
                }
                self.phase = GamePhase::Playing;
                Ok(vec![GameEvent::GameStarted])
            }
            ClientMessage::EndGame => {
                if !self.is_host(session_id) {
                    return Err(MessageError::NotHost);
                }
                self.phase = GamePhase::Ended;
                Ok(vec![GameEvent::GameOver {
                    winner: self.winner_label(),
                }])
            }
            ClientMessage::UpdateState { key, value } => {
                let player = self
                    .players
                    .get_mut(session_id)
                    .ok_or(MessageError::UnknownSession)?;
                let flag = value.as_bool().unwrap_or(false);
                match key.as_str() {
                    "invisible" => player.flags.invisible = flag,
                    "giant" => player.flags.giant = flag,
                    other => return Err(MessageError::InvalidStateKey(other.to_string())),
                }
                Ok(vec![])
            }
            ClientMessage::Ping => Ok(vec![GameEvent::Pong]),
        }
    }

    fn chat_rate_limited(&mut self, session_id: &str) -> bool {
        let now = self.now_secs();
        let window = self
            .chat_timestamps
            .entry(session_id.to_string())
            .or_default();
        while let Some(front) = window.front() {
            if now - front > CHAT_WINDOW_SECS {
                window.pop_front();
            } else {
                break;
            }
        }
        if window.len() as u32 >= CHAT_RATE_LIMIT_PER_SEC {
            true
        } else {
            window.push_back(now);
            false
        }
    }

    fn winner_label(&self) -> String {
        match self.red_score.cmp(&self.blue_score) {
            std::cmp::Ordering::Greater => "red".to_string(),
            std::cmp::Ordering::Less => "blue".to_string(),
            std::cmp::Ordering::Equal => "draw".to_string(),
        }
    }

    fn shift_touch_history(&mut self, toucher: SessionId) {
        if self.last_touch.as_ref() != Some(&toucher) {
            self.second_last_touch = self.last_touch.take();
            self.last_touch = Some(toucher);
        }
    }

    /// Run exactly one fixed-timestep sim step (§4.1's 8-step order).
    /// Returns any discrete events raised this tick.
    pub fn step(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let dt = FIXED_TIMESTEP;

        // 1. Advance the clock.
        self.current_tick += 1;
        let now = self.now_secs();
        self.timer_secs = (self.config.match_timer_start_secs - now).max(0.0);

        // 2-3. Consume one input per player and integrate movement.
        let session_ids: Vec<SessionId> = self.players.keys().cloned().collect();
        for session_id in &session_ids {
            let player = self.players.get_mut(session_id).unwrap();
            let record = player.consume_input();
            powerup_service::refresh_effects(player, &mut self.physics, now);
            integrate_player(player, &mut self.physics, record, dt);
            if let Some(kind) =
                powerup_service::try_pickup(&mut self.power_ups, player, &mut self.ball, &mut self.physics, now)
            {
                events.push(GameEvent::PowerupCollected {
                    session_id: session_id.clone(),
                    powerup_type: kind,
                });
            }
        }

        // 4. Step the physics world.
        self.physics.step(dt);
        if let Some(handle) = self.ball.body {
            self.ball.set_position(self.physics.translation(handle));
            self.ball.set_velocity(self.physics.linear_velocity(handle));
            self.ball.orientation = self.physics.rotation(handle);
        }

        // 5. Contact resolution, one player at a time.
        for session_id in &session_ids {
            let player = self.players.get_mut(session_id).unwrap();
            if let contact::Contact::Touch { velocity, position } =
                contact::resolve(&mut self.physics, player, &mut self.ball)
            {
                self.shift_touch_history(session_id.clone());
                events.push(GameEvent::BallTouched { velocity, position });
            }
        }

        // 6. Boundary enforcement.
        boundary::enforce(&mut self.physics, &mut self.ball);

        // 7. Goal adjudication.
        if goal::is_goal(&self.ball, now, self.last_goal_time_secs, self.config.goal_cooldown_secs) {
            self.last_goal_time_secs = now;
            let players = &self.players;
            let outcome = goal::adjudicate(
                &self.ball,
                self.last_touch.as_ref(),
                self.second_last_touch.as_ref(),
                |id| players.get(id).map(|p| p.team),
            );
            match outcome.team {
                Team::Red => self.red_score += 1,
                Team::Blue => self.blue_score += 1,
            }
            if let Some(scorer) = &outcome.scorer {
                if let Some(p) = self.players.get_mut(scorer) {
                    p.stats.goals += 1;
                }
            }
            if let Some(assist) = &outcome.assist {
                if let Some(p) = self.players.get_mut(assist) {
                    p.stats.assists += 1;
                }
            }
            events.push(GameEvent::GoalScored {
                team: outcome.team,
                scorer: outcome.scorer,
                assist: outcome.assist,
                red_score: self.red_score,
                blue_score: self.blue_score,
            });
            self.schedule_reset();
        }

        // 8. Clamp angular velocity, mirror tick stamp.
        self.ball.tick = self.current_tick;
        if let Some(handle) = self.ball.body {
            let w = self.physics.angular_velocity(handle);
            if w.length() > MAX_ANG_VEL {
                let clamped = w.normalize() * MAX_ANG_VEL;
                self.physics.set_angular_velocity(handle, clamped);
            }
        }

        powerup_service::tick_spawn(
            &mut self.power_ups,
            now,
            &mut self.last_powerup_spawn_secs,
            &mut self.next_powerup_id,
            &mut self.rng,
        );
        powerup_service::despawn_expired(&mut self.power_ups, now);

        events
    }

    /// Reset positions for all players and the ball to the canonical
    /// kickoff configuration. Caller is responsible for waiting out the
    /// post-goal grace period before invoking this.
    pub fn reset_positions(&mut self) -> GameEvent {
        self.ball.reset_to_kickoff();
        if let Some(handle) = self.ball.body {
            self.physics.set_translation(handle, self.ball.position());
            self.physics.set_linear_velocity(handle, Vec3::ZERO);
        }
        for player in self.players.values_mut() {
            player.reset_to_spawn();
            if let Some(handle) = player.body {
                self.physics
                    .set_kinematic_translation(handle, Vec3::new(player.x, player.y, player.z));
            }
        }
        self.last_touch = None;
        self.second_last_touch = None;
        GameEvent::GameReset
    }

    fn schedule_reset(&mut self) {
        // The actual delayed dispatch of `reset_positions` after the 3 s
        // grace period is owned by the server's per-match task, which can
        // suspend on a timer; sim logic itself must never suspend (§5).
        debug!("match {}: goal scored, reset scheduled", self.id);
    }

    pub fn snapshot(&self) -> SnapshotPayload {
        snapshot::build(
            self.players.values(),
            &self.ball,
            &self.power_ups,
            self.current_tick,
            self.phase,
            self.timer_secs,
            self.red_score,
            self.blue_score,
            &self.selected_map,
        )
    }

    pub fn reset_grace_period_secs(&self) -> f32 {
        GOAL_RESET_GRACE_SECS
    }

    pub fn player(&self, session_id: &str) -> Option<&Player> {
        self.players.get(session_id)
    }

    pub fn active_power_up_types(&self) -> Vec<PowerUpType> {
        self.power_ups.iter().map(|p| p.kind).collect()
    }
}

/// §4.4 player integration: horizontal instant-stop movement, constant
/// gravity, jump edge-trigger, ground clamp, arena clamp.
fn integrate_player(player: &mut Player, physics: &mut PhysicsWorld, input: InputRecord, dt: f32) {
    player.rot_y = input.rot_y;
    let speed = MOVE_SPEED * player.multipliers.speed;

    if input.x == 0.0 && input.z == 0.0 {
        player.vx = 0.0;
        player.vz = 0.0;
    } else {
        player.vx += (input.x * speed - player.vx) * VELOCITY_SMOOTHING;
        player.vz += (input.z * speed - player.vz) * VELOCITY_SMOOTHING;
    }

    player.vy -= GRAVITY * dt;

    if player.y <= GROUND_Y + GROUND_CHECK_EPSILON && player.vy <= 0.0 {
        player.jump_count = 0;
    }

    if input.jump_request_id > player.last_processed_jump_request_id && player.jump_count < MAX_JUMPS {
        player.last_processed_jump_request_id = input.jump_request_id;
        player.jump_count += 1;
        let base = JUMP_FORCE * player.multipliers.jump;
        player.vy = if player.jump_count == 1 {
            base
        } else {
            base * DOUBLE_JUMP_MULTIPLIER
        };
    }

    let mut new_x = player.x + player.vx * dt;
    let mut new_y = player.y + player.vy * dt;
    let mut new_z = player.z + player.vz * dt;

    if new_y < GROUND_Y {
        new_y = GROUND_Y;
        player.vy = 0.0;
        player.jump_count = 0;
    }

    new_x = new_x.clamp(-ARENA_HALF_WIDTH, ARENA_HALF_WIDTH);
    new_z = new_z.clamp(-ARENA_HALF_DEPTH, ARENA_HALF_DEPTH);

    player.x = new_x;
    player.y = new_y;
    player.z = new_z;

    if let Some(handle) = player.body {
        physics.set_kinematic_translation(handle, Vec3::new(new_x, new_y, new_z));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join_options(team: Option<Team>) -> JoinOptions {
        JoinOptions {
            team,
            ..Default::default()
        }
    }

    #[test]
    fn lone_join_spawns_on_requested_team() {
        let mut m = Match::new("m1".into(), MatchConfig::default(), 1, "classic".into());
        m.join("a".into(), &join_options(Some(Team::Red))).unwrap();
        let p = m.player("a").unwrap();
        assert_eq!(p.team, Team::Red);
        assert_eq!(p.x, Team::Red.spawn_x());
    }

    #[test]
    fn auto_balance_redirects_when_requested_team_full() {
        let mut m = Match::new("m1".into(), MatchConfig::default(), 1, "classic".into());
        m.join("a".into(), &join_options(Some(Team::Red))).unwrap();
        m.join("b".into(), &join_options(Some(Team::Red))).unwrap();
        m.join("c".into(), &join_options(Some(Team::Red))).unwrap();
        assert_eq!(m.player("c").unwrap().team, Team::Blue);
    }

    #[test]
    fn jump_edge_trigger_sequence() {
        let mut m = Match::new("m1".into(), MatchConfig::default(), 1, "classic".into());
        m.join("a".into(), &join_options(Some(Team::Red))).unwrap();
        {
            let p = m.players.get_mut("a").unwrap();
            p.y = 0.1;
            p.vy = 0.0;
        }
        m.players.get_mut("a").unwrap().enqueue_input(InputRecord {
            tick: 1,
            x: 0.0,
            z: 0.0,
            rot_y: 0.0,
            jump_request_id: 7,
        });
        m.players.get_mut("a").unwrap().last_received_tick = 1;
        m.step();
        assert_eq!(m.player("a").unwrap().jump_count, 1);

        m.players.get_mut("a").unwrap().enqueue_input(InputRecord {
            tick: 2,
            x: 0.0,
            z: 0.0,
            rot_y: 0.0,
            jump_request_id: 7,
        });
        m.players.get_mut("a").unwrap().last_received_tick = 2;
        let jump_count_before = m.player("a").unwrap().jump_count;
        m.step();
        assert_eq!(m.player("a").unwrap().jump_count, jump_count_before);
    }

    #[test]
    fn chat_over_length_is_rejected() {
        let mut m = Match::new("m1".into(), MatchConfig::default(), 1, "classic".into());
        m.join("a".into(), &join_options(None)).unwrap();
        let long = "x".repeat(CHAT_MAX_LEN + 1);
        let result = m.handle_message("a", ClientMessage::Chat { message: long });
        assert!(result.is_err());
    }

    #[test]
    fn end_game_requires_host() {
        let mut m = Match::new("m1".into(), MatchConfig::default(), 1, "classic".into());
        m.join("a".into(), &join_options(None)).unwrap();
        m.join("b".into(), &join_options(None)).unwrap();
        assert!(m.handle_message("b", ClientMessage::EndGame).is_err());
        assert!(m.handle_message("a", ClientMessage::EndGame).is_ok());
    }
}
