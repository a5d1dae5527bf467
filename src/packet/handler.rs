//! The packet-handler capability that encapsulation plugins (GSE, ROHC,
//! RLE, ...) expose to the dataplane. The plugins themselves are out of
//! scope; only the capability set they must implement is specified here.

use super::net_packet::{NetPacket, Qos, TalId};
use std::collections::HashMap;

/// Capability set a packet handler must provide. Implementations are
/// expected to be stateless with respect to a single `get_chunk` call;
/// any fragmentation bookkeeping across calls belongs to the caller (see
/// [`EncapContext`] below for the `encapNextPacket`-style convenience).
pub trait PacketHandler: Send + Sync {
    /// Length (bytes) of the packet described by a header found at the
    /// start of `bytes`.
    fn get_length(&self, bytes: &[u8]) -> usize;

    /// Source terminal id carried by the packet's header.
    fn get_src(&self, bytes: &[u8]) -> TalId;

    /// QoS class carried by the packet's header.
    fn get_qos(&self, bytes: &[u8]) -> Qos;

    /// Builds a `NetPacket` from raw bytes and explicit routing metadata.
    fn build(&self, bytes: &[u8], len: usize, qos: Qos, src: TalId, dst: TalId) -> NetPacket;

    /// `Some(n)` for fixed-size encapsulations (e.g. RLE), `None` for
    /// variable ones (e.g. GSE).
    fn fixed_length(&self) -> Option<usize>;

    /// Splits `packet` so that at most `max_len` bytes are returned in the
    /// first element of the tuple.
    ///
    /// Contract:
    /// - fully consumed: `(Some(chunk), None)`
    /// - partially consumed: `(Some(chunk), Some(tail))`
    /// - does not fit and cannot be fragmented: `(None, Some(packet))`
    /// - never `(None, None)`
    fn get_chunk(&self, packet: NetPacket, max_len: usize) -> (Option<NetPacket>, Option<NetPacket>);
}

/// A handler for variable-size, fragmentable encapsulation (modeled after
/// GSE): any packet can be split across calls to `get_chunk`.
pub struct FragmentingHandler;

impl PacketHandler for FragmentingHandler {
    fn get_length(&self, bytes: &[u8]) -> usize {
        bytes.len()
    }

    fn get_src(&self, _bytes: &[u8]) -> TalId {
        0
    }

    fn get_qos(&self, _bytes: &[u8]) -> Qos {
        0
    }

    fn build(&self, bytes: &[u8], len: usize, qos: Qos, src: TalId, dst: TalId) -> NetPacket {
        NetPacket::new(super::buffer::ByteBuffer::from_slice(&bytes[..len]), src, dst, qos, 0)
    }

    fn fixed_length(&self) -> Option<usize> {
        None
    }

    fn get_chunk(&self, packet: NetPacket, max_len: usize) -> (Option<NetPacket>, Option<NetPacket>) {
        let total = packet.total_length();
        if max_len == 0 {
            return (None, Some(packet));
        }
        if total <= max_len {
            (Some(packet), None)
        } else {
            let head = packet.with_data(packet.data().slice(0, max_len));
            let tail = packet.with_data(packet.data().slice(max_len, total - max_len));
            (Some(head), Some(tail))
        }
    }
}

/// A handler for fixed-size, non-fragmentable encapsulation (modeled after
/// RLE): a packet either fits whole or is handed back unchanged.
pub struct FixedLengthHandler {
    pub length: usize,
}

impl PacketHandler for FixedLengthHandler {
    fn get_length(&self, _bytes: &[u8]) -> usize {
        self.length
    }

    fn get_src(&self, _bytes: &[u8]) -> TalId {
        0
    }

    fn get_qos(&self, _bytes: &[u8]) -> Qos {
        0
    }

    fn build(&self, bytes: &[u8], len: usize, qos: Qos, src: TalId, dst: TalId) -> NetPacket {
        NetPacket::new(super::buffer::ByteBuffer::from_slice(&bytes[..len]), src, dst, qos, 0)
    }

    fn fixed_length(&self) -> Option<usize> {
        Some(self.length)
    }

    fn get_chunk(&self, packet: NetPacket, max_len: usize) -> (Option<NetPacket>, Option<NetPacket>) {
        if packet.total_length() <= max_len {
            (Some(packet), None)
        } else {
            (None, Some(packet))
        }
    }
}

/// Identifies the packet a caller is incrementally encapsulating by its
/// address: the caller keeps the original `NetPacket` alive across calls,
/// so its address is a stable identity without needing unsafe pointer
/// storage or dereference (only the integer value is ever compared).
fn fingerprint(packet: &NetPacket) -> usize {
    packet as *const NetPacket as usize
}

/// Per-packet-handler reassembly state for incremental encapsulation,
/// modeled on `EncapPacketHandler::encap_packets`: a packet being
/// encapsulated piecemeal (because each call only emits as much as fits in
/// `remaining_length`) keeps its not-yet-emitted tail here, keyed by a
/// fingerprint of the original packet. Entries are created when a
/// fragment is kept and removed when the last fragment is emitted,
/// avoiding the double-delete hazard of the original pointer-keyed map.
pub struct EncapContext<H: PacketHandler> {
    handler: H,
    pending: HashMap<usize, NetPacket>,
}

impl<H: PacketHandler> EncapContext<H> {
    pub fn new(handler: H) -> Self {
        EncapContext {
            handler,
            pending: HashMap::new(),
        }
    }

    /// Encapsulates the next chunk of `packet`, continuing a previous
    /// partial encapsulation if one is pending for this fingerprint.
    /// Returns `(encapsulated_chunk, partial)` where `partial` is true if
    /// more data remains for a later call.
    pub fn encap_next_packet(&mut self, packet: &NetPacket, remaining_length: usize) -> Option<(NetPacket, bool)> {
        let key = fingerprint(packet);
        let to_encap = self.pending.remove(&key).unwrap_or_else(|| packet.clone());

        let (data, remaining) = self.handler.get_chunk(to_encap, remaining_length);
        let data = data?;

        if let Some(tail) = remaining {
            self.pending.insert(key, tail);
            Some((data, true))
        } else {
            Some((data, false))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::buffer::ByteBuffer;

    #[test]
    fn fragmenting_handler_splits_on_exact_boundary() {
        let h = FragmentingHandler;
        let p = NetPacket::new(ByteBuffer::from_vec(vec![0; 100]), 1, 2, 0, 0);
        let (head, tail) = h.get_chunk(p, 60);
        assert_eq!(head.unwrap().total_length(), 60);
        assert_eq!(tail.unwrap().total_length(), 40);
    }

    #[test]
    fn fragmenting_handler_fully_consumes_when_it_fits() {
        let h = FragmentingHandler;
        let p = NetPacket::new(ByteBuffer::from_vec(vec![0; 30]), 1, 2, 0, 0);
        let (head, tail) = h.get_chunk(p, 60);
        assert_eq!(head.unwrap().total_length(), 30);
        assert!(tail.is_none());
    }

    #[test]
    fn fixed_length_handler_never_fragments() {
        let h = FixedLengthHandler { length: 50 };
        let p = NetPacket::new(ByteBuffer::from_vec(vec![0; 50]), 1, 2, 0, 0);
        let (head, tail) = h.get_chunk(p, 30);
        assert!(head.is_none());
        assert_eq!(tail.unwrap().total_length(), 50);
    }

    #[test]
    fn encap_context_resumes_from_pending_tail() {
        let mut ctx = EncapContext::new(FragmentingHandler);
        let p = NetPacket::new(ByteBuffer::from_vec(vec![7; 100]), 1, 2, 0, 0);
        let (first, partial) = ctx.encap_next_packet(&p, 40).unwrap();
        assert_eq!(first.total_length(), 40);
        assert!(partial);
        let (second, partial) = ctx.encap_next_packet(&p, 100).unwrap();
        assert_eq!(second.total_length(), 60);
        assert!(!partial);
    }
}
