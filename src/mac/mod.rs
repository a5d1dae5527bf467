//! MAC-level queuing: `DvbFifo` and its access-type tagging.

pub mod dvb_fifo;

pub use dvb_fifo::{AccessType, DvbFifo, FifoElement, FifoPayload, FifoStatsContext};
