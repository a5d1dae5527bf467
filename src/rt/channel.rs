//! `Channel`: one direction (upward or downward) of a block.
//!
//! The four wire topologies from the architecture (1:1, Mux N:1, Demux<K>
//! 1:N, MuxDemux<K> N:N) collapse into a single generic type: cardinality
//! of `previous` distinguishes 1:1 from Mux, and whether `next` is
//! `Single` or `Keyed` distinguishes a plain channel from a demux.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::RtError;
use crate::rt::fifo::{FifoReceiver, FifoSender};
use crate::rt::message::InternalMessage;

/// How a channel routes an outgoing message to the next block(s).
pub enum NextRouting<K> {
    /// Exactly one downstream fifo (1:1 and Mux collapse this side).
    Single(FifoSender),
    /// One downstream fifo per key (Demux and MuxDemux).
    Keyed(HashMap<K, FifoSender>),
}

impl<K: Eq + Hash + std::fmt::Debug> NextRouting<K> {
    pub fn send(&self, key: Option<&K>, msg: InternalMessage) -> Result<(), RtError> {
        match self {
            NextRouting::Single(tx) => Ok(tx.push(msg)?),
            NextRouting::Keyed(map) => {
                let key = key.ok_or_else(|| RtError::ChannelFailed("keyed route requires a key".into()))?;
                match map.get(key) {
                    Some(tx) => Ok(tx.push(msg)?),
                    None => Err(RtError::ChannelFailed(format!("no route for key {key:?}"))),
                }
            }
        }
    }
}

/// Application logic plugged into a channel: given an incoming message,
/// produce zero or more outgoing ones. Kept separate from wiring so the
/// pure encapsulation/scheduling logic stays unit-testable without a
/// running channel.
pub trait ChannelHandler<K>: Send {
    fn handle(&mut self, msg: InternalMessage) -> Result<Vec<(Option<K>, InternalMessage)>, RtError>;

    /// Called once per event-loop timer tick (e.g. superframe boundary),
    /// independent of any incoming message.
    fn on_tick(&mut self) -> Result<Vec<(Option<K>, InternalMessage)>, RtError> {
        Ok(Vec::new())
    }
}

/// One direction of a block: zero or more upstream sources, one routing
/// table for the next hop, and the handler that turns the former into the
/// latter.
pub struct Channel<K> {
    pub name: String,
    pub previous: Vec<FifoReceiver>,
    pub next: NextRouting<K>,
}

impl<K: Eq + Hash + std::fmt::Debug> Channel<K> {
    pub fn new(name: impl Into<String>, previous: Vec<FifoReceiver>, next: NextRouting<K>) -> Self {
        Channel { name: name.into(), previous, next }
    }

    /// Runs one handler invocation against `msg` and forwards every
    /// produced message to `next`. A routing failure on one output does
    /// not prevent the others from being sent.
    pub fn dispatch(&self, handler_out: Vec<(Option<K>, InternalMessage)>) -> Result<(), RtError> {
        let mut first_err = None;
        for (key, msg) in handler_out {
            if let Err(e) = self.next.send(key.as_ref(), msg) {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rt::fifo::fifo;

    #[test]
    fn single_routing_delivers_to_sole_downstream() {
        let (tx, rx) = fifo("next", 4);
        let next: NextRouting<u16> = NextRouting::Single(tx);
        next.send(None, InternalMessage::link_up()).unwrap();
        assert!(rx.try_pop().is_some());
    }

    #[test]
    fn keyed_routing_rejects_unknown_key() {
        let (tx, _rx) = fifo("a", 4);
        let mut map = HashMap::new();
        map.insert(1u16, tx);
        let next = NextRouting::Keyed(map);
        let err = next.send(Some(&2u16), InternalMessage::link_up());
        assert!(err.is_err());
    }

    #[test]
    fn keyed_routing_requires_a_key() {
        let (tx, _rx) = fifo("a", 4);
        let mut map = HashMap::new();
        map.insert(1u16, tx);
        let next = NextRouting::Keyed(map);
        assert!(next.send(None, InternalMessage::link_up()).is_err());
    }
}
