use crate::ext::BufExt;
use crate::proto::tcp::inbound::{ErrorMessage, IncomingTcpPacket, Stdout, TcpPacket};
use crate::proto::tcp::outbound::TcpTag;
use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

pub mod inbound;
pub mod outbound;

/// Size of the length prefix on every TCP frame
const LEN_PREFIX: usize = 2;

/// The codec for TCP traffic to and from the roboRIO
///
/// Frames are a big endian u16 length followed by a tag id and its payload.
pub struct DsTcpCodec;

impl Encoder<TcpTag> for DsTcpCodec {
    type Error = failure::Error;

    fn encode(&mut self, item: TcpTag, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item.construct());
        Ok(())
    }
}

impl Decoder for DsTcpCodec {
    type Item = TcpPacket;
    type Error = failure::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < LEN_PREFIX {
            return Ok(None);
        }

        let len = (&src[..LEN_PREFIX]).read_u16_be()? as usize;
        if src.len() < LEN_PREFIX + len {
            src.reserve(LEN_PREFIX + len - src.len());
            return Ok(None);
        }

        // The frame is consumed even if the payload fails to decode so the stream stays aligned
        let mut frame = src.split_to(LEN_PREFIX + len).freeze();
        frame.advance(LEN_PREFIX);

        if len == 0 {
            return Err(failure::format_err!("Empty TCP frame"));
        }

        match frame.get_u8() {
            0x0c => Ok(Some(TcpPacket::Stdout(Stdout::decode(&mut frame)?))),
            0x0b => Ok(Some(TcpPacket::ErrorMessage(ErrorMessage::decode(&mut frame)?))),
            id => Ok(Some(TcpPacket::Other(id))),
        }
    }
}
