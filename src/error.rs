//! Error taxonomy shared across the dataplane.
//!
//! Mirrors the severities from the error handling design: init errors are
//! fatal and surface before the dataplane starts, protocol errors are
//! logged and recovered from locally, resource errors are either normal
//! backpressure or fatal allocation failures, and scheduler invariant
//! violations fail the current tick only.

use thiserror::Error;

/// Fatal configuration / startup failure. Surfaces before any channel thread
/// starts and aborts the whole process.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid MODCOD table: {0}")]
    Modcod(String),

    #[error("ISL required but not enabled on entity {entity_id} for spot {spot_id}")]
    IslRequired { entity_id: u16, spot_id: u16 },

    #[error("no route configured for (spot {spot_id}, role {role:?})")]
    MissingRoute { spot_id: u16, role: crate::relay::DestinationRole },

    #[error("fifo initialization failed: {0}")]
    Fifo(String),
}

/// Recoverable error on the wire or at a block boundary: logged, offending
/// message dropped, processing continues.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unexpected internal message kind: {0:?}")]
    UnexpectedMessageKind(crate::rt::message::InternalMessageType),

    #[error("malformed DvbFrame header: {0}")]
    MalformedHeader(String),

    #[error("unknown terminal id {0}")]
    UnknownTerminal(u16),

    #[error("slot index {index} outside range 0..{total}")]
    SlotOutOfRange { index: u16, total: u16 },

    #[error("no route found for (spot {spot_id}, role {role:?})")]
    NoRoute { spot_id: u16, role: crate::relay::DestinationRole },
}

/// FIFO / allocation level failure.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("fifo {name} is full (capacity {capacity})")]
    FifoFull { name: String, capacity: usize },

    #[error("fifo {name} is closed")]
    FifoClosed { name: String },

    #[error("allocation failure: {0}")]
    Allocation(String),
}

/// Invariant violation inside a scheduler pass. The pass fails for the
/// current tick; the caller decides whether to log and continue.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("finalized frame has no packets")]
    EmptyFrame,

    #[error("packet handler contract violation: get_chunk returned (None, None)")]
    ChunkContractViolation,

    #[error("state machine reached the error state: {0}")]
    StateMachine(String),

    #[error("invalid burst configuration: {0}")]
    InvalidConfiguration(String),
}

/// Top-level runtime error: anything that can stop a channel or the whole
/// runtime.
#[derive(Debug, Error)]
pub enum RtError {
    #[error(transparent)]
    Init(#[from] InitError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("descriptor registration failed: {0}")]
    Descriptor(#[from] std::io::Error),

    #[error("channel '{0}' reported a fatal error")]
    ChannelFailed(String),
}
