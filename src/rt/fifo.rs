//! Bounded FIFO carrying `InternalMessage` between two channels, plus the
//! readable-descriptor contract the event loop multiplexes over.
//!
//! Backed by `crossbeam_channel`'s bounded MPSC queue: `push` blocks when
//! full and `pop` blocks when empty, exactly the contract required of the
//! fifo, and a `Receiver` doubles as the "readable descriptor" an event
//! loop can wait on via `crossbeam_channel::Select`.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::time::Duration;

use crate::error::ResourceError;
use crate::rt::message::InternalMessage;

pub const DEFAULT_FIFO_CAPACITY: usize = 3;

/// Producer half of a fifo.
#[derive(Clone)]
pub struct FifoSender {
    name: String,
    tx: Sender<InternalMessage>,
}

impl FifoSender {
    /// Blocks while the fifo is full, matching the spec's `push` contract.
    /// Fails only if the consumer side has been dropped (fifo closed).
    pub fn push(&self, msg: InternalMessage) -> Result<(), ResourceError> {
        self.tx.send(msg).map_err(|_| ResourceError::FifoClosed { name: self.name.clone() })
    }

    /// Non-blocking push used by code that must never suspend (e.g. a
    /// handler running inside the event loop it would otherwise deadlock).
    pub fn try_push(&self, msg: InternalMessage) -> Result<(), ResourceError> {
        match self.tx.try_send(msg) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(ResourceError::FifoFull {
                name: self.name.clone(),
                capacity: self.tx.capacity().unwrap_or(0),
            }),
            Err(TrySendError::Disconnected(_)) => Err(ResourceError::FifoClosed { name: self.name.clone() }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Consumer half of a fifo; also the "readable descriptor" the event loop
/// selects on.
#[derive(Clone)]
pub struct FifoReceiver {
    name: String,
    rx: Receiver<InternalMessage>,
}

impl FifoReceiver {
    /// Blocks while the fifo is empty.
    pub fn pop(&self) -> Result<InternalMessage, ResourceError> {
        self.rx.recv().map_err(|_| ResourceError::FifoClosed { name: self.name.clone() })
    }

    /// Non-blocking pop.
    pub fn try_pop(&self) -> Option<InternalMessage> {
        self.rx.try_recv().ok()
    }

    /// Blocks up to `timeout`; used by the event loop's manual poll/sleep
    /// cycle rather than by application code.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<Option<InternalMessage>, ResourceError> {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => Ok(Some(msg)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(ResourceError::FifoClosed { name: self.name.clone() }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying selectable receiver, for registration with
    /// `crossbeam_channel::Select` in the event loop.
    pub fn selectable(&self) -> &Receiver<InternalMessage> {
        &self.rx
    }
}

/// Creates a bounded fifo with the given capacity (in messages).
pub fn fifo(name: impl Into<String>, capacity: usize) -> (FifoSender, FifoReceiver) {
    let name = name.into();
    let (tx, rx) = bounded(capacity.max(1));
    (FifoSender { name: name.clone(), tx }, FifoReceiver { name, rx })
}
