//! Block-and-channel runtime: one OS thread per channel, bounded fifos
//! between them, and a priority-ordered event loop multiplexing fifo,
//! timer and file readiness within each thread.

pub mod block;
pub mod channel;
pub mod event_loop;
pub mod fifo;
pub mod message;

pub use block::{connect, spawn_channel_thread, Block, Link, DEFAULT_LINK_CAPACITY};
pub use channel::{Channel, ChannelHandler, NextRouting};
pub use event_loop::{EventClass, EventLoop, EventSource, FifoSource, TimerSource};
pub use fifo::{fifo, FifoReceiver, FifoSender, DEFAULT_FIFO_CAPACITY};
pub use message::{InternalMessage, InternalMessageType, Payload};
