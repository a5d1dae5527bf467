//! The envelope carried on every inter-block FIFO.

use crate::packet::{DvbFrame, NetPacket};

/// Message kind on the wire between blocks. A channel must reject kinds it
/// does not expect with a logged error, then keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalMessageType {
    Unknown,
    Sig,
    EncapData,
    DecapData,
    LinkUp,
}

/// Payload carried by an `InternalMessage`; its variant is determined by
/// `kind`, matching the C union-like envelope in the wire spec.
#[derive(Debug, Clone)]
pub enum Payload {
    Frame(DvbFrame),
    Burst(Vec<NetPacket>),
    LinkUp,
    Empty,
}

/// A single message passed on a block-to-block FIFO.
#[derive(Debug, Clone)]
pub struct InternalMessage {
    pub kind: InternalMessageType,
    pub payload: Payload,
}

impl InternalMessage {
    pub fn frame(kind: InternalMessageType, frame: DvbFrame) -> Self {
        InternalMessage {
            kind,
            payload: Payload::Frame(frame),
        }
    }

    pub fn burst(packets: Vec<NetPacket>) -> Self {
        InternalMessage {
            kind: InternalMessageType::DecapData,
            payload: Payload::Burst(packets),
        }
    }

    pub fn link_up() -> Self {
        InternalMessage {
            kind: InternalMessageType::LinkUp,
            payload: Payload::LinkUp,
        }
    }
}
