use crate::proto::udp::inbound::UdpResponsePacket;
use crate::proto::udp::outbound::UdpControlPacket;
use bytes::BytesMut;
use std::io;
use tokio_util::codec::{Decoder, Encoder};

pub mod inbound;
pub mod outbound;

/// Codec for the datagrams exchanged with the roboRIO
///
/// Each datagram holds exactly one packet, so decoding consumes the whole buffer.
pub struct DsUdpCodec;

impl Decoder for DsUdpCodec {
    type Item = UdpResponsePacket;
    type Error = failure::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut buf = src.split().freeze();
        match UdpResponsePacket::decode(&mut buf) {
            Ok(packet) => Ok(Some(packet)),
            Err(e) => match e.downcast::<io::Error>() {
                Ok(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    Err(failure::format_err!("Truncated UDP packet."))
                }
                Ok(e) => Err(e.into()),
                Err(e) => Err(e),
            },
        }
    }
}

impl Encoder<UdpControlPacket> for DsUdpCodec {
    type Error = failure::Error;

    fn encode(&mut self, item: UdpControlPacket, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item.encode());

        Ok(())
    }
}
