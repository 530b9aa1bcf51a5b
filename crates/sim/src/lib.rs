pub mod arena;
pub mod boundary;
pub mod config;
pub mod contact;
pub mod entities;
pub mod error;
pub mod events;
pub mod goal;
pub mod input;
pub mod match_state;
pub mod message;
pub mod physics;
pub mod powerup_service;
pub mod registry;
pub mod sim_loop;
pub mod snapshot;

pub use config::MatchConfig;
pub use entities::{Ball, Player, PowerUp, PowerUpType, Team};
pub use error::{MatchError, MessageError};
pub use events::{GameEvent, Reliability};
pub use match_state::Match;
pub use message::{ClientMessage, InputRecord, JoinOptions, ServerMessage};
pub use physics::PhysicsWorld;
pub use registry::MatchRegistry;
pub use sim_loop::{FixedTimestep, SimOutcome};
pub use snapshot::{GamePhase, SnapshotPayload};
