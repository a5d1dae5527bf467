//! Core real-time dataplane for a DVB-S2/DVB-RCS2 satellite emulation
//! testbed: packet/frame model, MAC-level fifos, the forward and return
//! schedulers, a Slotted-Aloha NCC, the transparent satellite relay, and
//! the block-and-channel runtime that wires them onto OS threads.

pub mod config;
pub mod error;
pub mod mac;
pub mod packet;
pub mod probes;
pub mod relay;
pub mod rt;
pub mod saloha;
pub mod scheduler;
