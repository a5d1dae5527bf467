//! `DvbFifo`: the MAC-level queue used by schedulers, with priority/PVC/
//! access-type tagging and period statistics.
//!
//! Producer and stats-reader run on different threads (the block's
//! downward channel feeds packets in, the scheduler or a probe task reads
//! statistics), so the whole queue + counters live behind one mutex, per
//! the concurrency model's "DvbFifo statistics ... protected by a
//! per-FIFO mutex".

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::ResourceError;
use crate::packet::{DvbFrame, NetPacket};

/// MAC access discipline for a fifo: DAMA (scheduled, capacity-requested)
/// or Slotted-Aloha (contention-based, handled by the saloha engine
/// instead of the return scheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    Dama,
    Saloha,
}

/// Either payload a queue element can carry.
#[derive(Debug, Clone)]
pub enum FifoPayload {
    Packet(NetPacket),
    Frame(DvbFrame),
}

impl FifoPayload {
    pub fn length(&self) -> usize {
        match self {
            FifoPayload::Packet(p) => p.total_length(),
            FifoPayload::Frame(f) => f.total_length(),
        }
    }

    pub fn into_packet(self) -> Option<NetPacket> {
        match self {
            FifoPayload::Packet(p) => Some(p),
            FifoPayload::Frame(_) => None,
        }
    }
}

/// A queue element tagged with the logical tick (superframe index) at
/// which it was enqueued.
#[derive(Debug, Clone)]
pub struct FifoElement {
    pub payload: FifoPayload,
    pub enqueue_tick: u64,
}

/// Statistics snapshot returned by `get_stats_context`. `current_*` fields
/// reflect live queue content; `in_*`/`out_*` are period counters that are
/// reset by the call that returns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoStatsContext {
    pub current_pkt_nbr: usize,
    pub current_length_bytes: usize,
    pub in_pkt_nbr: i64,
    pub out_pkt_nbr: i64,
    pub in_length_bytes: i64,
    pub out_length_bytes: i64,
}

struct Inner {
    queue: VecDeque<FifoElement>,
    current_length_bytes: usize,
    in_pkt_nbr: i64,
    out_pkt_nbr: i64,
    in_length_bytes: i64,
    out_length_bytes: i64,
}

impl Inner {
    fn new() -> Self {
        Inner {
            queue: VecDeque::new(),
            current_length_bytes: 0,
            in_pkt_nbr: 0,
            out_pkt_nbr: 0,
            in_length_bytes: 0,
            out_length_bytes: 0,
        }
    }
}

pub struct DvbFifo {
    pub name: String,
    pub priority: u32,
    pub pvc: u32,
    pub access_type: AccessType,
    pub carrier_id: u8,
    pub capacity_pkt: usize,
    inner: Mutex<Inner>,
}

impl DvbFifo {
    pub fn new(name: impl Into<String>, priority: u32, pvc: u32, access_type: AccessType, carrier_id: u8, capacity_pkt: usize) -> Self {
        DvbFifo {
            name: name.into(),
            priority,
            pvc,
            access_type,
            carrier_id,
            capacity_pkt,
            inner: Mutex::new(Inner::new()),
        }
    }

    /// Appends an element at the tail. Overflow is reported to the
    /// caller, never silently dropped.
    pub fn push(&self, payload: FifoPayload, enqueue_tick: u64) -> Result<(), ResourceError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.queue.len() >= self.capacity_pkt {
            return Err(ResourceError::FifoFull {
                name: self.name.clone(),
                capacity: self.capacity_pkt,
            });
        }
        let len = payload.length();
        inner.queue.push_back(FifoElement { payload, enqueue_tick });
        inner.current_length_bytes += len;
        inner.in_pkt_nbr += 1;
        inner.in_length_bytes += len as i64;
        Ok(())
    }

    /// Prepends an element at the head — used only to return a fragment
    /// tail left over by a scheduler. Decrements the "new bytes" counter
    /// instead of incrementing it: this data was already accounted for as
    /// input when the original, larger packet was first pushed.
    pub fn push_front(&self, payload: FifoPayload, enqueue_tick: u64) -> Result<(), ResourceError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.queue.len() >= self.capacity_pkt {
            return Err(ResourceError::FifoFull {
                name: self.name.clone(),
                capacity: self.capacity_pkt,
            });
        }
        let len = payload.length();
        inner.queue.push_front(FifoElement { payload, enqueue_tick });
        inner.current_length_bytes += len;
        inner.in_length_bytes -= len as i64;
        Ok(())
    }

    /// Removes and returns the head element, if any.
    pub fn pop(&self) -> Option<FifoElement> {
        let mut inner = self.inner.lock().unwrap();
        let elem = inner.queue.pop_front()?;
        let len = elem.payload.length();
        inner.current_length_bytes -= len;
        inner.out_pkt_nbr += 1;
        inner.out_length_bytes += len as i64;
        Some(elem)
    }

    /// Clones the head element without dequeuing it or touching any
    /// counter. Used by schedulers that must inspect a packet's
    /// destination before deciding which MODCOD class a frame will use.
    pub fn peek_front(&self) -> Option<FifoElement> {
        self.inner.lock().unwrap().queue.front().cloned()
    }

    pub fn current_size(&self) -> usize {
        self.inner.lock().unwrap().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current_size() == 0
    }

    /// Drops all queued elements and resets every counter, including the
    /// current-* ones.
    pub fn flush(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = Inner::new();
    }

    /// Returns a snapshot and atomically resets the period (`in_*`/`out_*`)
    /// counters; `current_*` counters are left untouched since they
    /// reflect the live queue.
    pub fn get_stats_context(&self) -> FifoStatsContext {
        let mut inner = self.inner.lock().unwrap();
        let ctx = FifoStatsContext {
            current_pkt_nbr: inner.queue.len(),
            current_length_bytes: inner.current_length_bytes,
            in_pkt_nbr: inner.in_pkt_nbr,
            out_pkt_nbr: inner.out_pkt_nbr,
            in_length_bytes: inner.in_length_bytes,
            out_length_bytes: inner.out_length_bytes,
        };
        inner.in_pkt_nbr = 0;
        inner.out_pkt_nbr = 0;
        inner.in_length_bytes = 0;
        inner.out_length_bytes = 0;
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::buffer::ByteBuffer;

    fn pkt(len: usize) -> FifoPayload {
        FifoPayload::Packet(NetPacket::new(ByteBuffer::from_vec(vec![0; len]), 1, 2, 0, 0))
    }

    #[test]
    fn fifo_order_is_strict() {
        let fifo = DvbFifo::new("test", 0, 0, AccessType::Dama, 1, 100);
        for i in 0..10u8 {
            fifo.push(FifoPayload::Packet(NetPacket::new(ByteBuffer::from_vec(vec![i]), 0, 0, 0, 0)), 0)
                .unwrap();
        }
        for i in 0..10u8 {
            let elem = fifo.pop().unwrap();
            let p = elem.payload.into_packet().unwrap();
            assert_eq!(p.data().as_slice(), &[i]);
        }
    }

    #[test]
    fn stats_consistency_after_mixed_ops() {
        let fifo = DvbFifo::new("test", 0, 0, AccessType::Dama, 1, 100);
        fifo.push(pkt(10), 0).unwrap();
        fifo.push(pkt(20), 0).unwrap();
        fifo.pop();
        fifo.push(pkt(5), 0).unwrap();
        let ctx = fifo.get_stats_context();
        assert_eq!(ctx.current_pkt_nbr, fifo.current_size());
        assert_eq!(ctx.current_length_bytes, 25);
    }

    #[test]
    fn push_front_decrements_in_bytes_not_in_pkt() {
        let fifo = DvbFifo::new("test", 0, 0, AccessType::Dama, 1, 100);
        fifo.push(pkt(1000), 0).unwrap();
        let elem = fifo.pop().unwrap();
        assert_eq!(elem.payload.length(), 1000);
        // Scheduler consumed 600 bytes, pushes back a 400 byte tail.
        fifo.push_front(pkt(400), 0).unwrap();
        let ctx = fifo.get_stats_context();
        assert_eq!(ctx.current_pkt_nbr, 1);
        assert_eq!(ctx.current_length_bytes, 400);
        assert_eq!(ctx.in_pkt_nbr, 1); // only the original push counted
        assert_eq!(ctx.in_length_bytes, 1000 - 400);
        assert_eq!(ctx.out_pkt_nbr, 1);
        assert_eq!(ctx.out_length_bytes, 1000);
    }

    #[test]
    fn overflow_is_reported_not_dropped() {
        let fifo = DvbFifo::new("test", 0, 0, AccessType::Dama, 1, 1);
        fifo.push(pkt(10), 0).unwrap();
        assert!(fifo.push(pkt(10), 0).is_err());
        assert_eq!(fifo.current_size(), 1);
    }

    #[test]
    fn flush_resets_everything() {
        let fifo = DvbFifo::new("test", 0, 0, AccessType::Dama, 1, 100);
        fifo.push(pkt(10), 0).unwrap();
        fifo.flush();
        assert_eq!(fifo.current_size(), 0);
        let ctx = fifo.get_stats_context();
        assert_eq!(ctx.current_length_bytes, 0);
        assert_eq!(ctx.in_pkt_nbr, 0);
    }
}
