//! MODCOD definition table and per-terminal assignment lookup.

use std::collections::HashMap;

use crate::packet::TalId;

/// One row of the MODCOD table: spectral efficiency expressed directly as
/// payload bits carried per symbol, so frame sizing is a single
/// multiplication against the carrier's symbol rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModcodDef {
    pub id: u8,
    pub bits_per_symbol: f64,
}

/// Ordered MODCOD table (lowest id = most robust). Robustness ordering is
/// by `id`, matching the scheduler's "lowest MODCOD among terminals in
/// this frame" rule.
#[derive(Debug, Clone)]
pub struct ModcodTable {
    rows: Vec<ModcodDef>,
}

impl ModcodTable {
    pub fn new(rows: Vec<ModcodDef>) -> Self {
        let mut rows = rows;
        rows.sort_by_key(|r| r.id);
        ModcodTable { rows }
    }

    pub fn get(&self, id: u8) -> Option<ModcodDef> {
        self.rows.iter().copied().find(|r| r.id == id)
    }

    /// The most robust (lowest id) MODCOD among the given ids, or `None`
    /// if the set is empty.
    pub fn lowest(&self, ids: impl IntoIterator<Item = u8>) -> Option<ModcodDef> {
        ids.into_iter().filter_map(|id| self.get(id)).min_by_key(|m| m.id)
    }

    /// Bytes a carrier of `symbol_rate_sym_s` can carry in `duration_s`
    /// at the given MODCOD.
    pub fn carrier_capacity_bytes(&self, modcod: ModcodDef, symbol_rate_sym_s: f64, duration_s: f64) -> usize {
        ((symbol_rate_sym_s * duration_s * modcod.bits_per_symbol) / 8.0).floor().max(0.0) as usize
    }
}

/// Per-terminal MODCOD assignment, updated out-of-band (by an ACM loop not
/// modelled here) and read by the forward scheduler each superframe.
#[derive(Debug, Clone, Default)]
pub struct ModcodAssignment {
    assigned: HashMap<TalId, u8>,
}

impl ModcodAssignment {
    pub fn new() -> Self {
        ModcodAssignment::default()
    }

    pub fn set(&mut self, tal_id: TalId, modcod_id: u8) {
        self.assigned.insert(tal_id, modcod_id);
    }

    pub fn get(&self, tal_id: TalId) -> Option<u8> {
        self.assigned.get(&tal_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ModcodTable {
        ModcodTable::new(vec![
            ModcodDef { id: 1, bits_per_symbol: 0.5 },
            ModcodDef { id: 5, bits_per_symbol: 2.0 },
            ModcodDef { id: 10, bits_per_symbol: 4.0 },
        ])
    }

    #[test]
    fn lowest_picks_most_robust_present_modcod() {
        let t = table();
        let lowest = t.lowest([10, 5]).unwrap();
        assert_eq!(lowest.id, 5);
    }

    #[test]
    fn capacity_scales_with_symbol_rate_and_duration() {
        let t = table();
        let m = t.get(5).unwrap();
        let bytes = t.carrier_capacity_bytes(m, 1_000_000.0, 0.01);
        assert_eq!(bytes, (1_000_000.0 * 0.01 * 2.0 / 8.0) as usize);
    }
}
