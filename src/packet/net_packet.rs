//! `NetPacket`: an encapsulated network packet tagged with routing and QoS
//! metadata, as produced by a packet handler (GSE/ROHC/RLE/... — out of
//! scope here, see [`crate::packet::handler`]).

use super::buffer::ByteBuffer;

pub type TalId = u16;
pub type Qos = u8;

/// Broadcast terminal id, used both for "no specific destination yet" and
/// to distinguish simulated Slotted-Aloha traffic from real terminals
/// (synthetic ids are chosen greater than this constant).
pub const BROADCAST_TAL_ID: TalId = 31;

/// A single encapsulated packet ready to be scheduled into a DVB frame.
///
/// Ownership is single: whoever holds a `NetPacket` either forwards it
/// (moves it) or drops it — there is no aliasing, which Rust's move
/// semantics enforce for free where the C++ original required manual
/// `delete` bookkeeping.
#[derive(Clone, Debug)]
pub struct NetPacket {
    data: ByteBuffer,
    src_tal_id: TalId,
    dst_tal_id: TalId,
    qos: Qos,
    encap_protocol: u16,
}

impl NetPacket {
    pub fn new(data: ByteBuffer, src_tal_id: TalId, dst_tal_id: TalId, qos: Qos, encap_protocol: u16) -> Self {
        NetPacket {
            data,
            src_tal_id,
            dst_tal_id,
            qos,
            encap_protocol,
        }
    }

    pub fn data(&self) -> &ByteBuffer {
        &self.data
    }

    pub fn total_length(&self) -> usize {
        self.data.len()
    }

    pub fn src_tal_id(&self) -> TalId {
        self.src_tal_id
    }

    pub fn dst_tal_id(&self) -> TalId {
        self.dst_tal_id
    }

    pub fn qos(&self) -> Qos {
        self.qos
    }

    pub fn encap_protocol(&self) -> u16 {
        self.encap_protocol
    }

    /// Rebuilds a packet over a different byte range (used when a packet
    /// handler hands back a chunk or a fragment tail): metadata is carried
    /// over unchanged, only the payload view changes.
    pub fn with_data(&self, data: ByteBuffer) -> Self {
        NetPacket { data, ..self.clone() }
    }
}
