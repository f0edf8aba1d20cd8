use crate::ext::BufExt;
use crate::Result;
use bytes::Buf;

/// Enum containing possible incoming TCP packets from the roboRIO
#[derive(Debug, Clone, PartialEq)]
pub enum TcpPacket {
    /// Contains a message from the robot code's standard output
    Stdout(Stdout),
    /// An error or warning reported by robot code
    ErrorMessage(ErrorMessage),
    /// A frame the driver station doesn't decode, identified by its tag id
    Other(u8),
}

pub(crate) trait IncomingTcpPacket: Sized {
    fn decode(buf: &mut impl Buf) -> Result<Self>;
}

/// Contains data outputted to standard output from robot code. Can be consumed by API users to
/// display code logs
#[derive(Debug, Clone, PartialEq)]
pub struct Stdout {
    pub timestamp: f32,
    pub message: String,
    pub seqnum: u16,
}

impl IncomingTcpPacket for Stdout {
    fn decode(buf: &mut impl Buf) -> Result<Self> {
        let timestamp = buf.read_f32_be()?;
        let seqnum = buf.read_u16_be()?;
        let remaining = buf.remaining();
        let rest = buf.copy_to_bytes(remaining);
        Ok(Stdout {
            timestamp,
            message: String::from_utf8_lossy(&rest).into_owned(),
            seqnum,
        })
    }
}

/// An error or warning raised by robot code, with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMessage {
    pub timestamp: f32,
    pub seqnum: u16,
    pub error_code: u16,
    pub is_error: bool,
    pub details: String,
    pub location: String,
    pub call_stack: String,
}

impl IncomingTcpPacket for ErrorMessage {
    fn decode(buf: &mut impl Buf) -> Result<Self> {
        let timestamp = buf.read_f32_be()?;
        let seqnum = buf.read_u16_be()?;
        buf.skip(1)?;
        let error_code = buf.read_u16_be()?;
        let is_error = buf.read_u8()? == 1;
        let details = buf.read_string_u16()?;
        let location = buf.read_string_u16()?;
        let call_stack = buf.read_string_u16()?;

        Ok(ErrorMessage {
            timestamp,
            seqnum,
            error_code,
            is_error,
            details,
            location,
            call_stack,
        })
    }
}
