//! Per-terminal PDU reassembly: an Aloha data packet carries
//! `(pdu_id, seq, of)`; once all `of` parts of a `pdu_id` are received the
//! ordered parts are handed back to the caller.

use std::collections::HashMap;

use crate::packet::{ByteBuffer, TalId};
use crate::saloha::slot::SalohaPacket;

struct InProgress {
    of: u16,
    parts: HashMap<u16, ByteBuffer>,
}

/// One terminal's reassembly state, keyed by `pdu_id`. Best-effort: if
/// `pdu_id` wraps around while a PDU is still incomplete, the old PDU is
/// simply dropped rather than retransmitted.
#[derive(Default)]
pub struct TerminalReassembly {
    in_progress: HashMap<u16, InProgress>,
}

impl TerminalReassembly {
    pub fn new() -> Self {
        TerminalReassembly::default()
    }

    /// Folds one received packet into its PDU's reassembly state. Returns
    /// the complete, ordered list of parts once the PDU is whole.
    pub fn accept(&mut self, packet: SalohaPacket) -> Option<Vec<ByteBuffer>> {
        // A reused `pdu_id` whose declared `of` disagrees with the
        // in-progress entry is a wrapped id racing a new PDU: drop the
        // stale, incomplete one rather than mixing its parts in.
        if let Some(existing) = self.in_progress.get(&packet.pdu_id) {
            if existing.of != packet.of {
                self.in_progress.remove(&packet.pdu_id);
            }
        }
        let entry = self.in_progress.entry(packet.pdu_id).or_insert_with(|| InProgress {
            of: packet.of,
            parts: HashMap::new(),
        });
        entry.parts.insert(packet.seq, packet.payload);

        if entry.parts.len() as u16 >= entry.of {
            let entry = self.in_progress.remove(&packet.pdu_id).unwrap();
            let mut ordered: Vec<(u16, ByteBuffer)> = entry.parts.into_iter().collect();
            ordered.sort_by_key(|(seq, _)| *seq);
            Some(ordered.into_iter().map(|(_, buf)| buf).collect())
        } else {
            None
        }
    }
}

/// Per-terminal reassembly contexts for a whole category or NCC instance.
#[derive(Default)]
pub struct ReassemblyTable {
    terminals: HashMap<TalId, TerminalReassembly>,
}

impl ReassemblyTable {
    pub fn new() -> Self {
        ReassemblyTable::default()
    }

    pub fn accept(&mut self, packet: SalohaPacket) -> Option<Vec<ByteBuffer>> {
        let tal_id = packet.tal_id;
        self.terminals.entry(tal_id).or_default().accept(packet)
    }
}
