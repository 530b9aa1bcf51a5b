use thiserror::Error;

/// Errors from handling a single inbound client message. All are recovered
/// locally by the caller (drop the record); none escalate to match disposal.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("unknown message tag: {0}")]
    UnknownTag(String),
    #[error("malformed message body: {0}")]
    Malformed(String),
    #[error("stale input tick {tick} (player last received {last_received})")]
    StaleTick { tick: u64, last_received: u64 },
    #[error("no session with that id in this match")]
    UnknownSession,
    #[error("action requires host privileges")]
    NotHost,
    #[error("match is full")]
    MatchFull,
    #[error("invalid update-state key: {0}")]
    InvalidStateKey(String),
}

/// Errors from match-level operations (registry, lifecycle).
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("no match with join code {0}")]
    UnknownJoinCode(String),
    #[error("could not allocate a unique join code after {0} attempts")]
    JoinCodeExhausted(usize),
    #[error("match is full")]
    Full,
    #[error("sim step panicked: {0}")]
    SimPanic(String),
}
