//! Chart data: the `DATA_PAYLOAD` string→count mapping.
//!
//! ```text
//! [u32 size] size × ([string key][u32 value])
//! ```

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::wire::{self, ByteReader, len_u32};

/// Bucket key (usually a date) to count.
///
/// Entry order carries no meaning on the wire; a sorted map keeps output
/// deterministic.
pub type ChartMap = BTreeMap<String, u32>;

/// Smallest possible entry: empty key plus value.
const MIN_ENTRY: usize = 8;

/// Decodes a `DATA_PAYLOAD` payload.
///
/// A key repeated within one payload keeps its last value.
pub fn decode_chart_map(payload: &[u8]) -> Result<ChartMap> {
    let mut r = ByteReader::new(payload);
    let size = r
        .u32()
        .map_err(|_| Error::MalformedPayload("chart map: missing size".into()))?;
    if (size as usize).saturating_mul(MIN_ENTRY) > r.remaining() {
        return Err(Error::MalformedPayload(format!(
            "chart map declares {size} entries in {} bytes",
            r.remaining()
        )));
    }

    let mut map = ChartMap::new();
    for index in 0..size {
        let key = r
            .string()
            .map_err(|e| Error::MalformedPayload(format!("chart entry {index} key: {e}")))?;
        let value = r.u32().map_err(|_| {
            Error::MalformedPayload(format!("chart entry {index} ({key}): missing value"))
        })?;
        map.insert(key, value);
    }

    r.finish("chart map")?;
    Ok(map)
}

/// Encodes a mapping as a `DATA_PAYLOAD` payload.
pub fn encode_chart_map(map: &ChartMap) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    wire::put_u32(&mut buf, len_u32(map.len(), "chart map")?);
    for (key, value) in map {
        wire::put_string(&mut buf, key)?;
        wire::put_u32(&mut buf, *value);
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(buf: &mut Vec<u8>, key: &str, value: u32) {
        buf.extend_from_slice(&(key.len() as u32).to_be_bytes());
        buf.extend_from_slice(key.as_bytes());
        buf.extend_from_slice(&value.to_be_bytes());
    }

    #[test]
    fn decodes_two_dates() {
        let mut payload = 2u32.to_be_bytes().to_vec();
        entry(&mut payload, "2024-01-01", 5);
        entry(&mut payload, "2024-01-02", 3);

        let map = decode_chart_map(&payload).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["2024-01-01"], 5);
        assert_eq!(map["2024-01-02"], 3);
    }

    #[test]
    fn empty_map() {
        assert!(decode_chart_map(&[0, 0, 0, 0]).unwrap().is_empty());
    }

    #[test]
    fn duplicate_key_last_write_wins() {
        let mut payload = 2u32.to_be_bytes().to_vec();
        entry(&mut payload, "k", 1);
        entry(&mut payload, "k", 9);
        let map = decode_chart_map(&payload).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["k"], 9);
    }

    #[test]
    fn encoder_matches_hand_layout() {
        let mut expected = 2u32.to_be_bytes().to_vec();
        entry(&mut expected, "a", u32::MAX);
        entry(&mut expected, "b", 0);
        let map = ChartMap::from([("a".to_owned(), u32::MAX), ("b".to_owned(), 0)]);
        assert_eq!(encode_chart_map(&map).unwrap(), expected);
    }

    #[test]
    fn rejects_missing_size() {
        assert!(matches!(
            decode_chart_map(&[0, 1]),
            Err(Error::MalformedPayload(_))
        ));
    }

    #[test]
    fn rejects_size_beyond_entries() {
        let mut payload = 3u32.to_be_bytes().to_vec();
        entry(&mut payload, "a", 1);
        entry(&mut payload, "b", 2);
        assert!(matches!(
            decode_chart_map(&payload),
            Err(Error::MalformedPayload(_))
        ));
    }

    #[test]
    fn rejects_truncated_value() {
        let mut payload = 1u32.to_be_bytes().to_vec();
        entry(&mut payload, "2024-01-01", 7);
        payload.pop();
        assert!(decode_chart_map(&payload).is_err());
    }

    #[test]
    fn rejects_invalid_utf8_key() {
        let mut payload = 1u32.to_be_bytes().to_vec();
        payload.extend_from_slice(&[0, 0, 0, 1, 0xFF, 0, 0, 0, 1]);
        assert!(matches!(
            decode_chart_map(&payload),
            Err(Error::MalformedPayload(_))
        ));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut payload = 1u32.to_be_bytes().to_vec();
        entry(&mut payload, "a", 1);
        payload.push(0);
        assert!(decode_chart_map(&payload).is_err());
    }
}
