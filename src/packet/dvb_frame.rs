//! `DvbFrame` and its two link-direction specializations: `DvbRcsFrame`
//! (return burst) and `BBFrame` (forward-link DVB-S2 base-band frame).
//!
//! The on-wire header is kept bit-exact with the existing OpenSAND layout
//! (wire compatibility within a version is required, see §6):
//! `{msg_type: u8, spot_id: u16, carrier_id: u8, length: u16, modcod_id: u8}`.

use super::buffer::ByteBuffer;
use super::net_packet::NetPacket;

pub const DVB_FRAME_HEADER_LEN: usize = 1 + 2 + 1 + 2 + 1;

/// Message kind carried by a `DvbFrame` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DvbMessageType {
    Signaling,
    EncapsulatedData,
    Control,
}

impl DvbMessageType {
    fn to_byte(self) -> u8 {
        match self {
            DvbMessageType::Signaling => 0,
            DvbMessageType::EncapsulatedData => 1,
            DvbMessageType::Control => 2,
        }
    }

    fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(DvbMessageType::Signaling),
            1 => Some(DvbMessageType::EncapsulatedData),
            2 => Some(DvbMessageType::Control),
            _ => None,
        }
    }
}

/// Fixed-layout header shared by every `DvbFrame` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DvbFrameHeader {
    pub msg_type: DvbMessageType,
    pub spot_id: u16,
    pub carrier_id: u8,
    pub modcod_id: u8,
}

/// A frame as it appears on the wire or as handed between blocks: header
/// plus an opaque payload region.
#[derive(Debug, Clone)]
pub struct DvbFrame {
    pub header: DvbFrameHeader,
    payload: ByteBuffer,
}

impl DvbFrame {
    pub fn new(header: DvbFrameHeader, payload: ByteBuffer) -> Self {
        DvbFrame { header, payload }
    }

    pub fn payload(&self) -> &ByteBuffer {
        &self.payload
    }

    pub fn total_length(&self) -> usize {
        DVB_FRAME_HEADER_LEN + self.payload.len()
    }

    /// Serializes header + payload bit-exact with the wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_length());
        out.push(self.header.msg_type.to_byte());
        out.extend_from_slice(&self.header.spot_id.to_be_bytes());
        out.push(self.header.carrier_id);
        out.extend_from_slice(&(self.payload.len() as u16).to_be_bytes());
        out.push(self.header.modcod_id);
        out.extend_from_slice(self.payload.as_slice());
        out
    }

    /// Parses a frame off the wire. Returns `None` on a header that does
    /// not fit or declares a length longer than the data actually present
    /// — callers surface this as a `ProtocolError::MalformedHeader`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < DVB_FRAME_HEADER_LEN {
            return None;
        }
        let msg_type = DvbMessageType::from_byte(bytes[0])?;
        let spot_id = u16::from_be_bytes([bytes[1], bytes[2]]);
        let carrier_id = bytes[3];
        let length = u16::from_be_bytes([bytes[4], bytes[5]]) as usize;
        let modcod_id = bytes[6];
        let payload_bytes = &bytes[DVB_FRAME_HEADER_LEN..];
        if payload_bytes.len() < length {
            return None;
        }
        Some(DvbFrame {
            header: DvbFrameHeader {
                msg_type,
                spot_id,
                carrier_id,
                modcod_id,
            },
            payload: ByteBuffer::from_slice(&payload_bytes[..length]),
        })
    }
}

/// Shared accumulator used by both `DvbRcsFrame` and `BBFrame`: packets are
/// appended until `max_size` bytes of payload are used.
#[derive(Debug, Clone)]
struct FrameBuilder {
    spot_id: u16,
    carrier_id: u8,
    modcod_id: u8,
    max_payload_bytes: usize,
    packets: Vec<NetPacket>,
    used_bytes: usize,
}

impl FrameBuilder {
    fn new(spot_id: u16, carrier_id: u8, modcod_id: u8, max_payload_bytes: usize) -> Self {
        FrameBuilder {
            spot_id,
            carrier_id,
            modcod_id,
            max_payload_bytes,
            packets: Vec::new(),
            used_bytes: 0,
        }
    }

    fn free_space(&self) -> usize {
        self.max_payload_bytes.saturating_sub(self.used_bytes)
    }

    fn num_packets(&self) -> usize {
        self.packets.len()
    }

    /// Appends `packet` if it fits in the remaining free space; returns
    /// `false` (and leaves the builder untouched) otherwise.
    fn add_packet(&mut self, packet: NetPacket) -> bool {
        let len = packet.total_length();
        if len > self.free_space() {
            return false;
        }
        self.used_bytes += len;
        self.packets.push(packet);
        true
    }

    fn into_payload(self) -> ByteBuffer {
        let parts: Vec<ByteBuffer> = self.packets.iter().map(|p| p.data().clone()).collect();
        ByteBuffer::concat(&parts)
    }
}

/// A DVB-RCS2 return-link burst carrying variable-size encapsulated
/// packets, up to a declared maximum size.
#[derive(Debug, Clone)]
pub struct DvbRcsFrame {
    builder: FrameBuilder,
}

impl DvbRcsFrame {
    /// `max_size_bytes` is the whole frame's maximum size including the
    /// header, matching `allocateDvbRcsFrame`'s accounting.
    pub fn new(spot_id: u16, carrier_id: u8, max_size_bytes: usize) -> Self {
        let max_payload = max_size_bytes.saturating_sub(DVB_FRAME_HEADER_LEN);
        DvbRcsFrame {
            builder: FrameBuilder::new(spot_id, carrier_id, 0, max_payload),
        }
    }

    pub fn free_space(&self) -> usize {
        self.builder.free_space()
    }

    pub fn num_packets(&self) -> usize {
        self.builder.num_packets()
    }

    pub fn add_packet(&mut self, packet: NetPacket) -> bool {
        self.builder.add_packet(packet)
    }

    pub fn frame_bits(&self) -> usize {
        self.builder.used_bytes * 8
    }

    pub fn finalize(self) -> DvbFrame {
        let header = DvbFrameHeader {
            msg_type: DvbMessageType::EncapsulatedData,
            spot_id: self.builder.spot_id,
            carrier_id: self.builder.carrier_id,
            modcod_id: self.builder.modcod_id,
        };
        DvbFrame::new(header, self.builder.into_payload())
    }
}

/// A DVB-S2 forward-link base-band frame: one MODCOD per frame.
#[derive(Debug, Clone)]
pub struct BBFrame {
    builder: FrameBuilder,
}

impl BBFrame {
    pub fn new(spot_id: u16, carrier_id: u8, modcod_id: u8, max_size_bytes: usize) -> Self {
        let max_payload = max_size_bytes.saturating_sub(DVB_FRAME_HEADER_LEN);
        BBFrame {
            builder: FrameBuilder::new(spot_id, carrier_id, modcod_id, max_payload),
        }
    }

    pub fn modcod_id(&self) -> u8 {
        self.builder.modcod_id
    }

    pub fn free_space(&self) -> usize {
        self.builder.free_space()
    }

    pub fn num_packets(&self) -> usize {
        self.builder.num_packets()
    }

    pub fn add_packet(&mut self, packet: NetPacket) -> bool {
        self.builder.add_packet(packet)
    }

    pub fn finalize(self) -> DvbFrame {
        let header = DvbFrameHeader {
            msg_type: DvbMessageType::EncapsulatedData,
            spot_id: self.builder.spot_id,
            carrier_id: self.builder.carrier_id,
            modcod_id: self.builder.modcod_id,
        };
        DvbFrame::new(header, self.builder.into_payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::buffer::ByteBuffer;

    fn pkt(len: usize) -> NetPacket {
        NetPacket::new(ByteBuffer::from_vec(vec![0xAB; len]), 1, 2, 0, 0x4242)
    }

    #[test]
    fn header_round_trips_bit_exact() {
        let mut frame = DvbRcsFrame::new(7, 66, 64);
        frame.add_packet(pkt(10));
        let dvb = frame.finalize();
        let bytes = dvb.to_bytes();
        let parsed = DvbFrame::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.header.spot_id, 7);
        assert_eq!(parsed.header.carrier_id, 66);
        assert_eq!(parsed.payload().len(), 10);
    }

    #[test]
    fn bbframe_rejects_packet_over_free_space() {
        let mut frame = BBFrame::new(1, 10, 5, DVB_FRAME_HEADER_LEN + 8);
        assert!(frame.add_packet(pkt(8)));
        assert!(!frame.add_packet(pkt(1)));
    }
}
