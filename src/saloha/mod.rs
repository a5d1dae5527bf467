//! Slotted-Aloha NCC: slot tables, DSA/CRDSA collision resolution, and
//! per-terminal PDU reassembly.

pub mod algorithm;
pub mod ncc;
pub mod reassembly;
pub mod slot;

pub use algorithm::{resolve_crdsa, resolve_dsa, CollisionAlgorithm, CollisionOutcome};
pub use ncc::{Category, CategoryMetrics, ScheduleResult, SimuRule, SlottedAlohaNcc};
pub use reassembly::{ReassemblyTable, TerminalReassembly};
pub use slot::{SalohaPacket, Slot, SlotTable};
