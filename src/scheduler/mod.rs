//! Forward (DVB-S2) and return (DVB-RCS2) schedulers: pure, synchronous
//! bin-packing over `DvbFifo`s, decoupled from the thread runtime so they
//! can be exercised directly in tests.

pub mod forward;
pub mod modcod;
pub mod return_rcs2;

pub use forward::{schedule_forward, Carrier};
pub use modcod::{ModcodAssignment, ModcodDef, ModcodTable};
pub use return_rcs2::schedule_return;
