//! Packet envelope and type codes.

/// Default TCP port of the analytics server.
pub const SERVER_PORT: u16 = 3500;

/// Packet type codes understood by the analytics server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum PacketType {
    /// Server-side error; payload is a UTF-8 message.
    Error = 0x03,
    /// Response to [`PacketType::SearchQuery`]: an encoded article set.
    ArticleSet = 0x06,
    /// Response to [`PacketType::GetDataChart`]: an encoded chart map.
    DataPayload = 0x07,
    /// Request for the latest news. Not issued by this client.
    GetRecentNews = 0x08,
    /// Chart query; payload is an encoded query string.
    GetDataChart = 0x20,
    /// Client registration. Not issued by this client.
    RegisterRequest = 0x33,
    /// Article search; payload is an encoded query string.
    SearchQuery = 0x40,
}

impl PacketType {
    /// The on-wire type byte.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Maps a type byte back to a known packet type.
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x03 => Self::Error,
            0x06 => Self::ArticleSet,
            0x07 => Self::DataPayload,
            0x08 => Self::GetRecentNews,
            0x20 => Self::GetDataChart,
            0x33 => Self::RegisterRequest,
            0x40 => Self::SearchQuery,
            _ => return None,
        })
    }
}

/// A single protocol envelope: type byte plus opaque payload.
///
/// The type is kept as a raw byte so that packets with codes outside
/// [`PacketType`] can still be received and reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Raw type byte.
    pub code: u8,
    /// Type-specific payload bytes.
    pub payload: Vec<u8>,
}

impl Packet {
    /// Creates a packet of a known type.
    pub fn new(ty: PacketType, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            code: ty.code(),
            payload: payload.into(),
        }
    }

    /// The packet type, if the code is a known one.
    pub const fn packet_type(&self) -> Option<PacketType> {
        PacketType::from_code(self.code)
    }

    /// Returns `true` if this is an [`PacketType::Error`] packet.
    pub const fn is_error(&self) -> bool {
        self.code == PacketType::Error.code()
    }

    /// Interprets the payload of an error packet as a message.
    ///
    /// Invalid UTF-8 is replaced rather than rejected so that a garbled
    /// server message never masks the error itself.
    pub fn error_message(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}
