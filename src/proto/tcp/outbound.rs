use bytes::BufMut;

/// Enum wrapping possible outgoing TCP tags
#[derive(Debug, Clone, PartialEq)]
pub enum TcpTag {
    GameData(GameData),
}

/// Game specific message relayed to robot code
#[derive(Debug, Clone, PartialEq)]
pub struct GameData {
    pub gsm: String,
}

pub(crate) trait OutgoingTcpTag {
    fn id(&self) -> u8;

    fn data(&self) -> Vec<u8>;

    /// Frames are prefixed with a big endian u16 length, which counts the id byte
    fn construct(&self) -> Vec<u8> {
        let data = self.data();
        let mut buf = Vec::with_capacity(data.len() + 3);
        buf.put_u16((data.len() + 1) as u16);
        buf.put_u8(self.id());
        buf.extend(data);

        buf
    }
}

impl OutgoingTcpTag for GameData {
    fn id(&self) -> u8 {
        0x0e
    }

    fn data(&self) -> Vec<u8> {
        self.gsm.as_bytes().to_vec()
    }
}

impl TcpTag {
    pub(crate) fn construct(&self) -> Vec<u8> {
        match self {
            TcpTag::GameData(gd) => gd.construct(),
        }
    }
}
