//! Collision-resolution algorithms run over one category's `SlotTable`.

use crate::saloha::slot::{SalohaPacket, SlotTable};

/// Which algorithm a category's slot table is resolved with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionAlgorithm {
    Dsa,
    Crdsa,
}

/// Outcome of one collision-resolution pass: the accepted packets plus the
/// per-category metrics the scheduler reports and resets every Aloha
/// frame.
#[derive(Debug, Clone, Default)]
pub struct CollisionOutcome {
    pub accepted: Vec<(u32, SalohaPacket)>,
    pub collisions_before: u32,
    pub collisions_after: u32,
}

impl CollisionOutcome {
    pub fn collision_ratio_pct(&self, total_slots: u32) -> f64 {
        if total_slots == 0 {
            0.0
        } else {
            100.0 * self.collisions_after as f64 / total_slots as f64
        }
    }
}

/// DSA: a slot with exactly one replica accepts that packet; any collision
/// rejects every replica in that slot, with no retry. `collisions_before`/
/// `collisions_after` count the replicas involved in a collided slot, not
/// the slot itself, matching `removeCollisions`' `coll += slot->size()`.
pub fn resolve_dsa(table: &mut SlotTable) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();
    for (&slot_index, slot) in table.iter_mut() {
        if slot.is_collision() {
            let replicas = slot.packets.len() as u32;
            outcome.collisions_before += replicas;
            outcome.collisions_after += replicas;
            slot.packets.clear();
        } else if slot.is_singleton() {
            outcome.accepted.push((slot_index, slot.packets.remove(0)));
        }
    }
    sort_accepted_by_carrier_slot(table, &mut outcome.accepted);
    outcome
}

/// CRDSA: iterative interference cancellation. A slot that becomes (or
/// already is) a singleton accepts its packet and removes that packet's
/// other replicas — identified by `(tal_id, pdu_id, seq)` — from every
/// slot they also landed in. Repeats until a full pass finds no new
/// singleton; whatever remains collided is dropped.
pub fn resolve_crdsa(table: &mut SlotTable) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();
    outcome.collisions_before = collided_replica_count(table);

    loop {
        let singleton_keys: Vec<(u16, u16, u16)> = table
            .iter()
            .filter_map(|(_, s)| if s.is_singleton() { Some(&s.packets[0]) } else { None })
            .map(|p| (p.tal_id, p.pdu_id, p.seq))
            .collect();

        if singleton_keys.is_empty() {
            break;
        }

        for (_, slot) in table.iter_mut() {
            if slot.is_singleton() {
                continue;
            }
            slot.packets.retain(|p| !singleton_keys.contains(&(p.tal_id, p.pdu_id, p.seq)));
        }

        for (&slot_index, slot) in table.iter_mut() {
            if slot.is_singleton() {
                outcome.accepted.push((slot_index, slot.packets.remove(0)));
            }
        }
    }

    outcome.collisions_after = collided_replica_count(table);
    for (_, slot) in table.iter_mut() {
        slot.packets.clear();
    }
    sort_accepted_by_carrier_slot(table, &mut outcome.accepted);
    outcome
}

/// Sum of replica counts across every still-collided slot, matching
/// `removeCollisions`' `if(slot->size() > 1) coll += slot->size();`.
fn collided_replica_count(table: &SlotTable) -> u32 {
    table.iter().filter(|(_, s)| s.is_collision()).map(|(_, s)| s.packets.len() as u32).sum()
}

/// Sorts accepted packets by `(carrier, slot-index)`, per the scheduler's
/// delivery ordering.
pub fn sort_accepted_by_carrier_slot(table: &SlotTable, accepted: &mut [(u32, SalohaPacket)]) {
    accepted.sort_by_key(|(slot_index, _)| (table.carrier_of(*slot_index), *slot_index));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::ByteBuffer;

    fn packet(tal_id: u16, pdu_id: u16, seq: u16) -> SalohaPacket {
        SalohaPacket { tal_id, pdu_id, seq, of: 1, payload: ByteBuffer::from_vec(vec![0]) }
    }

    #[test]
    fn dsa_accepts_only_singletons() {
        let mut table = SlotTable::new(4, 1);
        table.push(0, packet(1, 0, 0)).unwrap();
        table.push(1, packet(2, 0, 0)).unwrap();
        table.push(1, packet(3, 0, 0)).unwrap(); // collision
        let outcome = resolve_dsa(&mut table);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].1.tal_id, 1);
        // slot 1 collided with 2 replicas: collisions count replicas, not slots.
        assert_eq!(outcome.collisions_before, 2);
        assert_eq!(outcome.collisions_after, 2);
    }

    #[test]
    fn crdsa_resolves_chain_via_interference_cancellation() {
        // 3 slots, 2 PDUs, 2 replicas each: slot 0 = only terminal 1's
        // replica (singleton), slot 1 = both terminals' replicas
        // (collision), slot 2 = only terminal 2's replica. Cancelling
        // each singleton's replica out of slot 1 empties the collision.
        let mut table = SlotTable::new(3, 1);
        table.push(0, packet(1, 100, 0)).unwrap();
        table.push(1, packet(1, 100, 0)).unwrap();
        table.push(1, packet(2, 200, 0)).unwrap();
        table.push(2, packet(2, 200, 0)).unwrap();

        let outcome = resolve_crdsa(&mut table);
        assert_eq!(outcome.accepted.len(), 2);
        // slot 1's 2 replicas are the only collision before resolution.
        assert_eq!(outcome.collisions_before, 2);
        assert_eq!(outcome.collisions_after, 0);
        // accepted packets come back ordered by (carrier, slot-index).
        assert_eq!(outcome.accepted[0].0, 0);
        assert_eq!(outcome.accepted[1].0, 2);
    }

    #[test]
    fn crdsa_drops_packets_that_never_resolve() {
        let mut table = SlotTable::new(2, 1);
        table.push(0, packet(1, 100, 0)).unwrap();
        table.push(0, packet(2, 200, 0)).unwrap();
        table.push(1, packet(1, 100, 0)).unwrap();
        table.push(1, packet(2, 200, 0)).unwrap();
        let outcome = resolve_crdsa(&mut table);
        assert!(outcome.accepted.is_empty());
        // both slots stay collided at 2 replicas each: 4, not 2 slots.
        assert_eq!(outcome.collisions_before, 4);
        assert_eq!(outcome.collisions_after, 4);
    }
}
