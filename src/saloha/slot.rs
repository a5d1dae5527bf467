//! Slot table: one terminal category's view of the current Aloha frame,
//! indexed by time-slot.

use std::collections::HashMap;

use crate::packet::TalId;

/// A received Slotted-Aloha data packet, tagged with the PDU-reassembly
/// triple and its owning terminal.
#[derive(Debug, Clone)]
pub struct SalohaPacket {
    pub tal_id: TalId,
    pub pdu_id: u16,
    pub seq: u16,
    pub of: u16,
    pub payload: crate::packet::ByteBuffer,
}

/// One time-slot: zero, one (singleton), or several (collision) replicas
/// landed here this Aloha frame.
#[derive(Debug, Clone, Default)]
pub struct Slot {
    pub packets: Vec<SalohaPacket>,
}

impl Slot {
    pub fn is_collision(&self) -> bool {
        self.packets.len() > 1
    }

    pub fn is_singleton(&self) -> bool {
        self.packets.len() == 1
    }
}

/// A category's slot table for the current Aloha frame: `time-slot-index
/// -> Slot`. Reset each Aloha frame once scheduled.
pub struct SlotTable {
    pub slots_per_carrier: u32,
    pub total_slots: u32,
    slots: HashMap<u32, Slot>,
}

impl SlotTable {
    pub fn new(total_slots: u32, carriers: u32) -> Self {
        SlotTable {
            slots_per_carrier: (total_slots / carriers.max(1)).max(1),
            total_slots,
            slots: HashMap::new(),
        }
    }

    /// Appends a received packet to the slot indexed by its declared
    /// timestamp. Returns an error if the index is out of range.
    pub fn push(&mut self, slot_index: u32, packet: SalohaPacket) -> Result<(), crate::error::ProtocolError> {
        if slot_index >= self.total_slots {
            return Err(crate::error::ProtocolError::SlotOutOfRange {
                index: slot_index as u16,
                total: self.total_slots as u16,
            });
        }
        self.slots.entry(slot_index).or_default().packets.push(packet);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u32, &Slot)> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&u32, &mut Slot)> {
        self.slots.iter_mut()
    }

    pub fn carrier_of(&self, slot_index: u32) -> u32 {
        slot_index / self.slots_per_carrier
    }

    /// Drops every received packet, starting a fresh Aloha frame.
    pub fn reset(&mut self) {
        self.slots.clear();
    }

    pub fn received_count(&self) -> usize {
        self.slots.values().map(|s| s.packets.len()).sum()
    }
}
