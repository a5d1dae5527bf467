//! Byte buffer, `NetPacket`, `DvbFrame`/`DvbRcsFrame`/`BBFrame`, and the
//! packet-handler capability set consumed by schedulers and the
//! Slotted-Aloha engine.

pub mod buffer;
pub mod dvb_frame;
pub mod handler;
pub mod net_packet;

pub use buffer::ByteBuffer;
pub use dvb_frame::{BBFrame, DvbFrame, DvbFrameHeader, DvbMessageType, DvbRcsFrame};
pub use handler::{EncapContext, FixedLengthHandler, FragmentingHandler, PacketHandler};
pub use net_packet::{NetPacket, Qos, TalId, BROADCAST_TAL_ID};
