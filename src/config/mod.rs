//! Parses the process's configuration inputs: spot topology, the MODCOD
//! table, and Slotted-Aloha per-category parameters.

pub mod aloha;
pub mod modcod_table;
pub mod topology;

pub use aloha::{AlgorithmConfig, AlohaConfig, CategoryConfig, SimuRuleConfig};
pub use modcod_table::parse_modcod_table;
pub use topology::{SpotTopologyConfig, TopologyConfig};
