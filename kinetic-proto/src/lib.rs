//! Wire protocol for the Kinetic analytics server.
//!
//! The protocol runs over a single TCP connection. All integers and floats
//! are big-endian. After an unframed handshake (see [`write_handshake`]),
//! both sides exchange [`Packet`]s framed as
//! `[u8 type][u32 length][payload]`, and the payload of a response is
//! decoded according to its type: [`decode_chart_map`] for
//! [`PacketType::DataPayload`], [`decode_article_set`] for
//! [`PacketType::ArticleSet`].

mod article;
mod chart;
mod codec;
mod error;
mod frame;
mod message;
pub mod wire;

pub use article::{Article, decode_article_set, encode_article_set};
pub use chart::{ChartMap, decode_chart_map, encode_chart_map};
pub use codec::{
    HEADER_LEN, MAX_PAYLOAD, read_handshake, read_packet, read_packet_limited, write_handshake,
    write_packet,
};
pub use error::{Error, Result};
pub use frame::read_exact;
pub use message::{Packet, PacketType, SERVER_PORT};
pub use wire::{decode_string, encode_string};
