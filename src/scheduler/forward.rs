//! Forward scheduler (DVB-S2, downlink): fills BBFrames from output FIFOs
//! in priority order, one MODCOD class per frame.

use crate::error::SchedulerError;
use crate::mac::{DvbFifo, FifoPayload};
use crate::packet::{BBFrame, DvbFrame, PacketHandler, TalId};
use crate::scheduler::modcod::{ModcodAssignment, ModcodTable};

/// One allocated carrier within a terminal category: its symbol rate and
/// the declared-order list of output FIFOs (by priority) feeding it.
pub struct Carrier<'a> {
    pub carrier_id: u8,
    pub symbol_rate_sym_s: f64,
    pub fifos: Vec<&'a DvbFifo>,
}

fn push_front_packet(fifo: &DvbFifo, packet: crate::packet::NetPacket, tick: u64) -> Result<(), SchedulerError> {
    fifo.push_front(FifoPayload::Packet(packet), tick)
        .map_err(|_| SchedulerError::InvalidConfiguration("fifo closed mid-schedule".into()))
}

/// Runs the forward scheduler over one category's carriers for one
/// superframe. `frame_duration_s` is the superframe length; `remaining_kb`
/// is consumed as frames close and stops the pass at zero.
pub fn schedule_forward<H: PacketHandler>(
    carriers: &[Carrier],
    modcod_table: &ModcodTable,
    assignment: &ModcodAssignment,
    handler: &H,
    spot_id: u16,
    frame_duration_s: f64,
    remaining_kb: &mut i64,
    tick: u64,
) -> Result<Vec<DvbFrame>, SchedulerError> {
    let mut frames = Vec::new();

    'carriers: for carrier in carriers {
        loop {
            if *remaining_kb <= 0 {
                break 'carriers;
            }
            if carrier.fifos.iter().all(|f| f.is_empty()) {
                break;
            }

            // Choose the frame's MODCOD as the most robust one among the
            // destinations currently at each fifo's head.
            let head_modcods: Vec<u8> = carrier
                .fifos
                .iter()
                .filter_map(|f| f.peek_front())
                .filter_map(|elem| match elem.payload {
                    FifoPayload::Packet(p) => dest_modcod(assignment, p.dst_tal_id()),
                    FifoPayload::Frame(_) => None,
                })
                .collect();
            let Some(chosen) = modcod_table.lowest(head_modcods) else {
                break;
            };

            let capacity = modcod_table.carrier_capacity_bytes(chosen, carrier.symbol_rate_sym_s, frame_duration_s);
            let mut frame = BBFrame::new(spot_id, carrier.carrier_id, chosen.id, capacity);
            let initial_free = frame.free_space();

            'fill: loop {
                let mut filled_any = false;
                for fifo in &carrier.fifos {
                    loop {
                        let Some(elem) = fifo.pop() else { break };
                        let packet = match elem.payload {
                            FifoPayload::Packet(p) => p,
                            FifoPayload::Frame(_) => continue,
                        };
                        let Some(dst_modcod) = dest_modcod(assignment, packet.dst_tal_id()) else {
                            continue; // unknown destination: drop rather than stall the frame
                        };
                        if dst_modcod > chosen.id {
                            // destination needs a more robust MODCOD than this frame offers
                            push_front_packet(fifo, packet, tick)?;
                            break;
                        }
                        let free = frame.free_space();
                        match handler.get_chunk(packet, free) {
                            (None, None) => return Err(SchedulerError::ChunkContractViolation),
                            (None, Some(unchanged)) => {
                                push_front_packet(fifo, unchanged, tick)?;
                                break;
                            }
                            (Some(data), tail) => {
                                if data.total_length() > frame.free_space() {
                                    push_front_packet(fifo, data, tick)?;
                                    break;
                                }
                                frame.add_packet(data);
                                filled_any = true;
                                if let Some(tail) = tail {
                                    push_front_packet(fifo, tail, tick)?;
                                }
                                if frame.free_space() == 0 {
                                    break 'fill;
                                }
                            }
                        }
                    }
                }
                if !filled_any {
                    break;
                }
            }

            if frame.num_packets() == 0 {
                break;
            }
            let used_bits = (initial_free - frame.free_space()) * 8;
            *remaining_kb -= ceil_div(used_bits, 1000) as i64;
            frames.push(frame.finalize());
        }
    }

    Ok(frames)
}

fn dest_modcod(assignment: &ModcodAssignment, dst_tal_id: TalId) -> Option<u8> {
    assignment.get(dst_tal_id)
}

fn ceil_div(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}
