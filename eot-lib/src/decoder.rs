use crate::packet::EotPacket;

/// Turns a [Candidate](crate::Candidate) bit sequence into a packet.
///
/// Returning `None` marks the candidate as invalid, e.g., it was a sync pattern match
/// on noise. Implementations decide how many of the supplied bits to use.
pub trait PacketDecoder: Send {
    fn decode(&self, bits: &[bool]) -> Option<EotPacket>;
}

impl<F> PacketDecoder for F
where
    F: Fn(&[bool]) -> Option<EotPacket> + Send,
{
    fn decode(&self, bits: &[bool]) -> Option<EotPacket> {
        self(bits)
    }
}

/// Decodes the standard EOT data block, validating its BCH parity.
#[derive(Debug, Clone, Copy, Default)]
pub struct EotDecoder;

impl PacketDecoder for EotDecoder {
    fn decode(&self, bits: &[bool]) -> Option<EotPacket> {
        EotPacket::decode(bits)
    }
}
