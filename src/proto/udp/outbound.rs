pub mod types;

use self::types::tags::UdpTag;
use self::types::*;
use bytes::BufMut;

/// Version of the control packet format sent to the roboRIO
const COMM_VERSION: u8 = 0x01;

/// UDP control packet to send to the roboRIO
#[derive(Clone, Debug)]
pub struct UdpControlPacket {
    pub(crate) seqnum: u16,
    pub(crate) control: Control,
    pub(crate) request: Option<Request>,
    pub(crate) alliance: Alliance,
    pub(crate) tags: Vec<UdpTag>,
}

impl UdpControlPacket {
    /// Encodes the current state of the packet into a vec to send to the roboRIO
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        buf.put_u16(self.seqnum);
        buf.put_u8(COMM_VERSION);
        buf.put_u8(self.control.bits());
        buf.put_u8(self.request.map(|req| req.bits()).unwrap_or(0));
        buf.put_u8(self.alliance.bits());

        for tag in &self.tags {
            buf.extend(tag.construct());
        }

        buf
    }
}

#[cfg(test)]
mod tests {
    use super::types::tags::Countdown;
    use super::*;

    #[test]
    fn header_layout() {
        let packet = UdpControlPacket {
            seqnum: 0x0102,
            control: Control::ENABLED | Control::AUTO,
            request: Some(Request::RESTART_CODE),
            alliance: Alliance::new_blue(2),
            tags: vec![],
        };

        assert_eq!(packet.encode(), &[0x01, 0x02, 0x01, 0x06, 0x04, 0x04]);
    }

    #[test]
    fn tags_follow_header() {
        let packet = UdpControlPacket {
            seqnum: 0,
            control: Control::empty(),
            request: None,
            alliance: Alliance::new_red(1),
            tags: vec![UdpTag::Countdown(Countdown::new(2.0))],
        };

        let buf = packet.encode();
        assert_eq!(buf.len(), 6 + 6);
        assert_eq!(&buf[6..8], &[0x05, 0x07]);
    }
}
