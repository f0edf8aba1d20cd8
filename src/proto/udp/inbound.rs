pub mod types;

use self::types::*;

use crate::ext::BufExt;
use crate::Result;

use bytes::Buf;

/// Response packet sent by the RIO over UDP every ~20ms.
#[derive(Debug, Clone, PartialEq)]
pub struct UdpResponsePacket {
    pub seqnum: u16,
    pub status: Status,
    pub trace: Trace,
    pub battery: f32,
    pub need_date: bool,
}

impl UdpResponsePacket {
    /// Attempts to decode a valid response packet from the given buffer
    ///
    /// Will return Err() if any of the reads fail. Trailing tags (disk, CPU, CAN metrics...) are
    /// length prefixed and skipped, the driver station doesn't surface them.
    pub fn decode(buf: &mut impl Buf) -> Result<UdpResponsePacket> {
        let seqnum = buf.read_u16_be()?;

        buf.read_u8()?; // comm version

        let status = Status::from_bits_truncate(buf.read_u8()?);
        let trace = Trace::from_bits_truncate(buf.read_u8()?);

        // Integer volts in the high byte, 1/256ths of a volt in the low byte
        let battery = {
            let high = buf.read_u8()?;
            let low = buf.read_u8()?;
            f32::from(high) + f32::from(low) / 256f32
        };

        let need_date = buf.read_u8()? == 1;

        while let Ok(size) = buf.read_u8() {
            buf.skip(size as usize)?;
        }

        Ok(UdpResponsePacket {
            seqnum,
            status,
            trace,
            battery,
            need_date,
        })
    }
}
