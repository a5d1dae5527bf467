//! End-to-end Slotted-Aloha scenarios: DSA rejection-on-any-collision,
//! CRDSA chain resolution, reassembly, and simulated-traffic handling,
//! driven entirely through `SlottedAlohaNcc`'s public frame-by-frame API.

use opensand_dataplane::packet::{ByteBuffer, BROADCAST_TAL_ID};
use opensand_dataplane::saloha::{Category, CollisionAlgorithm, SalohaPacket, SlotTable, SlottedAlohaNcc};

fn packet(tal_id: u16, pdu_id: u16, seq: u16, of: u16, byte: u8) -> SalohaPacket {
    SalohaPacket { tal_id, pdu_id, seq, of, payload: ByteBuffer::from_vec(vec![byte]) }
}

#[test]
fn dsa_rejects_every_packet_in_a_colliding_slot() {
    let mut ncc = SlottedAlohaNcc::new(vec![Category { label: "dsa".into(), algorithm: CollisionAlgorithm::Dsa, table: SlotTable::new(10, 1) }], 1);
    ncc.on_frame_received("dsa", vec![(0, packet(1, 1, 0, 1, 1)), (0, packet(2, 2, 0, 1, 2)), (1, packet(3, 3, 0, 1, 3))])
        .unwrap();

    let result = ncc.schedule();
    assert_eq!(result.pdus.len(), 1, "only the singleton slot's terminal is delivered");
    assert_eq!(result.pdus[0].0, 3);
    let metrics = &result.metrics["dsa"];
    // slot 0 collided with 2 replicas: collisions count replicas, not slots.
    assert_eq!(metrics.collisions_before, 2);
    assert_eq!(metrics.collisions_after, 2, "DSA never resolves a collision, it only rejects it");
}

#[test]
fn crdsa_resolves_a_two_slot_replica_chain_end_to_end() {
    let mut ncc = SlottedAlohaNcc::new(vec![Category { label: "crdsa".into(), algorithm: CollisionAlgorithm::Crdsa, table: SlotTable::new(10, 1) }], 1);
    // Terminal 1's packet replicated into slots 0 and 1; terminal 2's into
    // slots 1 and 2. Slot 2 is a singleton, so terminal 2 resolves first
    // and its replica in slot 1 cancels out, leaving terminal 1 singleton.
    ncc.on_frame_received(
        "crdsa",
        vec![(0, packet(1, 100, 0, 1, 0xAA)), (1, packet(1, 100, 0, 1, 0xAA)), (1, packet(2, 200, 0, 1, 0xBB)), (2, packet(2, 200, 0, 1, 0xBB))],
    )
    .unwrap();

    let result = ncc.schedule();
    let mut delivered: Vec<u16> = result.pdus.iter().map(|(tal_id, _)| *tal_id).collect();
    delivered.sort();
    assert_eq!(delivered, vec![1, 2]);
    let metrics = &result.metrics["crdsa"];
    // slot 1's 2 replicas are the only collision before resolution.
    assert_eq!(metrics.collisions_before, 2);
    assert_eq!(metrics.collisions_after, 0);
}

#[test]
fn reassembles_a_multi_fragment_pdu_once_all_parts_arrive() {
    let mut ncc = SlottedAlohaNcc::new(vec![Category { label: "dsa".into(), algorithm: CollisionAlgorithm::Dsa, table: SlotTable::new(10, 1) }], 1);
    ncc.on_frame_received("dsa", vec![(0, packet(1, 7, 0, 2, 0x11)), (1, packet(1, 7, 1, 2, 0x22))]).unwrap();

    let result = ncc.schedule();
    assert_eq!(result.pdus.len(), 1);
    let (tal_id, parts) = &result.pdus[0];
    assert_eq!(*tal_id, 1);
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].as_slice(), &[0x11]);
    assert_eq!(parts[1].as_slice(), &[0x22]);
}

#[test]
fn simulated_traffic_is_accepted_but_never_reaches_a_pdu() {
    let mut ncc = SlottedAlohaNcc::new(vec![Category { label: "dsa".into(), algorithm: CollisionAlgorithm::Dsa, table: SlotTable::new(10, 1) }], 1);
    let simu_tal = BROADCAST_TAL_ID + 1;
    ncc.on_frame_received("dsa", vec![(0, packet(simu_tal, 1, 0, 1, 0x99))]).unwrap();

    let result = ncc.schedule();
    assert!(result.pdus.is_empty());
    assert!(result.acks.is_empty(), "simulated traffic is not acked either, only real PDUs are");
}

#[test]
fn aloha_frame_tick_gates_when_a_schedule_pass_runs() {
    let ncc = SlottedAlohaNcc::new(vec![], 4);
    let ticks: Vec<u64> = (0..9).filter(|&t| ncc.is_saloha_frame_tick(t)).collect();
    assert_eq!(ticks, vec![0, 4, 8]);
}

#[test]
fn unknown_category_on_a_received_frame_is_reported() {
    let mut ncc = SlottedAlohaNcc::new(vec![Category { label: "dsa".into(), algorithm: CollisionAlgorithm::Dsa, table: SlotTable::new(10, 1) }], 1);
    assert!(ncc.on_frame_received("nonexistent", vec![(0, packet(1, 1, 0, 1, 0))]).is_err());
}
