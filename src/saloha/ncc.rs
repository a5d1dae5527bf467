//! Slotted-Aloha NCC: orchestrates per-category slot tables, collision
//! resolution, ACK control frames and PDU reassembly, once per Aloha
//! frame tick.

use std::collections::HashMap;

use rand::Rng;

use crate::error::ProtocolError;
use crate::packet::{ByteBuffer, TalId, BROADCAST_TAL_ID};
use crate::saloha::algorithm::{resolve_crdsa, resolve_dsa, CollisionAlgorithm, CollisionOutcome};
use crate::saloha::reassembly::ReassemblyTable;
use crate::saloha::slot::{SalohaPacket, SlotTable};

/// A simulated-traffic injection rule: generate up to `nb_max_packets`
/// packets per frame for `category`, each replicated `nb_replicas` times,
/// at the given fraction of eligible slots (`ratio` in `0.0..=1.0`).
#[derive(Debug, Clone)]
pub struct SimuRule {
    pub category: String,
    pub nb_max_packets: u32,
    pub nb_replicas: u32,
    pub ratio: f64,
}

/// One terminal category: its slot table, configured algorithm, and the
/// simulated-traffic rules (if any) that feed it.
pub struct Category {
    pub label: String,
    pub algorithm: CollisionAlgorithm,
    pub table: SlotTable,
}

/// Per-category metrics, reset every Aloha frame.
#[derive(Debug, Clone, Default)]
pub struct CategoryMetrics {
    pub collisions_before: u32,
    pub collisions_after: u32,
    pub collision_ratio_pct: f64,
}

/// Result of one `schedule` call: reassembled PDUs ready for the upward
/// burst, ACK packets to pack into control frames, and refreshed metrics.
pub struct ScheduleResult {
    pub pdus: Vec<(TalId, Vec<ByteBuffer>)>,
    pub acks: Vec<(TalId, u16)>,
    pub metrics: HashMap<String, CategoryMetrics>,
}

pub struct SlottedAlohaNcc {
    categories: Vec<Category>,
    reassembly: ReassemblyTable,
    aloha_period_frames: u64,
    simu_rules: Vec<SimuRule>,
}

impl SlottedAlohaNcc {
    pub fn new(categories: Vec<Category>, aloha_period_frames: u64) -> Self {
        SlottedAlohaNcc {
            categories,
            reassembly: ReassemblyTable::new(),
            aloha_period_frames,
            simu_rules: Vec::new(),
        }
    }

    /// Registers simulated-traffic rules, injected into their target
    /// category's slot table at the start of every `schedule()` pass.
    pub fn with_simu_rules(mut self, simu_rules: Vec<SimuRule>) -> Self {
        self.simu_rules = simu_rules;
        self
    }

    /// Whether `superframe_counter` lands on an Aloha scheduling tick.
    pub fn is_saloha_frame_tick(&self, superframe_counter: u64) -> bool {
        self.aloha_period_frames > 0 && superframe_counter % self.aloha_period_frames == 0
    }

    /// Parses one received frame's worth of Aloha packets, routing each to
    /// its category's slot by declared timestamp. Unknown category or
    /// out-of-range slot logs and drops that packet but does not abort
    /// the rest of the frame.
    pub fn on_frame_received(&mut self, category_label: &str, packets: Vec<(u32, SalohaPacket)>) -> Result<(), ProtocolError> {
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.label == category_label)
            .ok_or(ProtocolError::UnknownTerminal(0))?;
        for (slot_index, packet) in packets {
            category.table.push(slot_index, packet)?;
        }
        Ok(())
    }

    /// Runs one Aloha-frame scheduling pass across every category: resolve
    /// collisions, reassemble accepted packets' PDUs, and produce ACKs.
    /// Simulated-traffic packets (`tal_id > BROADCAST_TAL_ID`) are
    /// resolved like any other but dropped before reassembly, matching
    /// their purpose of exercising the collision algorithm only.
    pub fn schedule(&mut self) -> ScheduleResult {
        let mut pdus = Vec::new();
        let mut acks = Vec::new();
        let mut metrics = HashMap::new();

        let mut next_simu_tal_offset: u16 = 0;
        for rule in &self.simu_rules {
            if let Some(category) = self.categories.iter_mut().find(|c| c.label == rule.category) {
                next_simu_tal_offset += inject_simulated_traffic(&mut category.table, rule, next_simu_tal_offset);
            }
        }

        for category in &mut self.categories {
            let outcome: CollisionOutcome = match category.algorithm {
                CollisionAlgorithm::Dsa => resolve_dsa(&mut category.table),
                CollisionAlgorithm::Crdsa => resolve_crdsa(&mut category.table),
            };

            metrics.insert(
                category.label.clone(),
                CategoryMetrics {
                    collisions_before: outcome.collisions_before,
                    collisions_after: outcome.collisions_after,
                    collision_ratio_pct: outcome.collision_ratio_pct(category.table.total_slots),
                },
            );

            for (_, packet) in outcome.accepted {
                if packet.tal_id > BROADCAST_TAL_ID {
                    continue; // simulated traffic: exercised the algorithm only
                }
                let tal_id = packet.tal_id;
                let pdu_id = packet.pdu_id;
                acks.push((tal_id, pdu_id));
                if let Some(parts) = self.reassembly.accept(packet) {
                    pdus.push((tal_id, parts));
                }
            }

            category.table.reset();
        }

        ScheduleResult { pdus, acks, metrics }
    }
}

/// Injects one Aloha frame's worth of simulated traffic for `rule` into
/// `table`: up to `nb_max_packets` synthetic PDUs, each replicated
/// `nb_replicas` times into randomly chosen slots, tagged with a
/// synthetic `tal_id > BROADCAST_TAL_ID` so `schedule()` resolves but
/// never delivers them (mirrors `SlottedAlohaNcc::simulateTraffic`).
/// Returns the number of synthetic terminal ids consumed, so callers can
/// keep later rules' ids from colliding with this one's.
fn inject_simulated_traffic(table: &mut SlotTable, rule: &SimuRule, tal_offset: u16) -> u16 {
    let num_packets = ((table.total_slots as f64) * rule.ratio).round().min(rule.nb_max_packets as f64).max(0.0) as u32;
    let mut rng = rand::thread_rng();

    for pdu_cpt in 0..num_packets {
        let tal_id = BROADCAST_TAL_ID + 1 + tal_offset + pdu_cpt as u16;
        for _ in 0..rule.nb_replicas {
            let slot_index = rng.gen_range(0..table.total_slots.max(1));
            let packet = SalohaPacket {
                tal_id,
                pdu_id: pdu_cpt as u16,
                seq: 0,
                of: 1,
                payload: ByteBuffer::from_vec(Vec::new()),
            };
            let _ = table.push(slot_index, packet);
        }
    }

    num_packets as u16
}
