//! Article records and the `ARTICLE_SET` payload.
//!
//! ```text
//! [u32 count]
//! count × [u32 record length]
//!         [11 × string: hash, site, tag, title, link, content, date,
//!                       viewsAll, viewsDay, viewsWeek, viewsMonth]
//!         [f64 positive]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::wire::{self, ByteReader, len_u32};

/// Smallest possible encoded record: eleven empty strings and the score.
const MIN_RECORD: usize = 4 + 11 * 4 + 8;

/// Field names in wire order, used in diagnostics.
const FIELDS: [&str; 11] = [
    "hash",
    "site",
    "tag",
    "title",
    "link",
    "content",
    "date",
    "viewsAll",
    "viewsDay",
    "viewsWeek",
    "viewsMonth",
];

/// A news article with its sentiment score.
///
/// View counters are transmitted as strings and kept that way.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Content hash; the semantic key of the article.
    pub hash: String,
    /// Source site.
    pub site: String,
    /// Site-specific category tag.
    pub tag: String,
    /// Headline.
    pub title: String,
    /// Canonical URL.
    pub link: String,
    /// Body text.
    pub content: String,
    /// Publication date as sent by the server.
    pub date: String,
    /// All-time views.
    pub views_all: String,
    /// Views in the last day.
    pub views_day: String,
    /// Views in the last week.
    pub views_week: String,
    /// Views in the last month.
    pub views_month: String,
    /// Sentiment score, conventionally in `[0, 1]`. Not validated.
    pub positive: f64,
}

impl Article {
    /// String fields in wire order.
    fn fields(&self) -> [&str; 11] {
        [
            &self.hash,
            &self.site,
            &self.tag,
            &self.title,
            &self.link,
            &self.content,
            &self.date,
            &self.views_all,
            &self.views_day,
            &self.views_week,
            &self.views_month,
        ]
    }

    /// Decodes one record body (without its length prefix).
    fn decode_record(body: &[u8], index: usize) -> Result<Self> {
        let mut r = ByteReader::new(body);
        let mut next = |field: usize| {
            r.string().map_err(|e| {
                Error::MalformedPayload(format!("article {index} field {}: {e}", FIELDS[field]))
            })
        };
        let hash = next(0)?;
        let site = next(1)?;
        let tag = next(2)?;
        let title = next(3)?;
        let link = next(4)?;
        let content = next(5)?;
        let date = next(6)?;
        let views_all = next(7)?;
        let views_day = next(8)?;
        let views_week = next(9)?;
        let views_month = next(10)?;
        let positive = r
            .f64()
            .map_err(|_| Error::MalformedPayload(format!("article {index}: truncated score")))?;
        r.finish(&format!("article {index}"))?;

        Ok(Self {
            hash,
            site,
            tag,
            title,
            link,
            content,
            date,
            views_all,
            views_day,
            views_week,
            views_month,
            positive,
        })
    }
}

/// Decodes an `ARTICLE_SET` payload, preserving server order.
///
/// Any short read, record boundary mismatch or invalid UTF-8 fails the
/// whole payload.
pub fn decode_article_set(payload: &[u8]) -> Result<Vec<Article>> {
    let mut r = ByteReader::new(payload);
    let count = r
        .u32()
        .map_err(|_| Error::MalformedPayload("article set: missing count".into()))?;
    // The count is untrusted; cap the preallocation by what could fit.
    let mut articles = Vec::with_capacity((count as usize).min(r.remaining() / MIN_RECORD));

    for index in 0..count as usize {
        let len = r.u32().map_err(|_| {
            Error::MalformedPayload(format!("article {index} of {count}: missing record length"))
        })?;
        let body = r.bytes(len as usize).map_err(|_| {
            Error::MalformedPayload(format!(
                "article {index}: record declares {len} bytes, {} left",
                r.remaining()
            ))
        })?;
        articles.push(Article::decode_record(body, index)?);
    }

    r.finish("article set")?;
    Ok(articles)
}

/// Encodes articles as an `ARTICLE_SET` payload.
pub fn encode_article_set(articles: &[Article]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    wire::put_u32(&mut buf, len_u32(articles.len(), "article set")?);
    let mut record = Vec::new();
    for article in articles {
        record.clear();
        for field in article.fields() {
            wire::put_string(&mut record, field)?;
        }
        wire::put_f64(&mut record, article.positive);
        wire::put_u32(&mut buf, len_u32(record.len(), "article record")?);
        buf.extend_from_slice(&record);
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(hash: &str, positive: f64) -> Article {
        Article {
            hash: hash.into(),
            site: "ria.ru".into(),
            tag: "economy".into(),
            title: "Рынок вырос".into(),
            link: format!("https://ria.ru/{hash}"),
            content: "Индекс Мосбиржи прибавил 2%".into(),
            date: "2024-01-01".into(),
            views_all: "1200".into(),
            views_day: "40".into(),
            views_week: "300".into(),
            views_month: "".into(),
            positive,
        }
    }

    /// Builds one record by hand, independent of the encoder.
    fn raw_record(fields: &[&str], positive: f64) -> Vec<u8> {
        let mut body = Vec::new();
        for f in fields {
            body.extend_from_slice(&(f.len() as u32).to_be_bytes());
            body.extend_from_slice(f.as_bytes());
        }
        body.extend_from_slice(&positive.to_be_bytes());
        let mut out = (body.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn empty_set() {
        assert!(decode_article_set(&[0, 0, 0, 0]).unwrap().is_empty());
    }

    #[test]
    fn decodes_hand_built_records_in_order() {
        let first = ["h1", "s", "t", "T", "l", "c", "d", "1", "2", "3", "4"];
        let second = ["h2", "", "", "", "", "", "", "", "", "", ""];
        let mut payload = 2u32.to_be_bytes().to_vec();
        payload.extend(raw_record(&first, 0.6));
        // A score with a payload that would not survive a lossy conversion.
        let odd = f64::from_bits(0x3FE5_5555_5555_5555);
        payload.extend(raw_record(&second, odd));

        let articles = decode_article_set(&payload).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].hash, "h1");
        assert_eq!(articles[0].views_month, "4");
        assert_eq!(articles[0].positive.to_bits(), 0.6f64.to_bits());
        assert_eq!(articles[1].hash, "h2");
        assert_eq!(articles[1].site, "");
        assert_eq!(articles[1].positive.to_bits(), odd.to_bits());
    }

    #[test]
    fn encoder_matches_hand_layout() {
        let a = sample("abc", 0.25);
        let fields = a.fields();
        let mut expected = 1u32.to_be_bytes().to_vec();
        expected.extend(raw_record(&fields, 0.25));
        assert_eq!(encode_article_set(&[a.clone()]).unwrap(), expected);
        assert_eq!(decode_article_set(&expected).unwrap(), vec![a]);
    }

    #[test]
    fn rejects_truncated_record() {
        let mut payload = encode_article_set(&[sample("a", 0.5)]).unwrap();
        payload.truncate(payload.len() - 3);
        assert!(matches!(
            decode_article_set(&payload),
            Err(Error::MalformedPayload(_))
        ));
    }

    #[test]
    fn rejects_count_larger_than_records() {
        let mut payload = encode_article_set(&[sample("a", 0.5)]).unwrap();
        payload[..4].copy_from_slice(&2u32.to_be_bytes());
        assert!(matches!(
            decode_article_set(&payload),
            Err(Error::MalformedPayload(_))
        ));
    }

    #[test]
    fn rejects_record_with_leftover_bytes() {
        let mut body = raw_record(&[""; 11], 0.1);
        body.push(0xFF);
        let len = (body.len() - 4) as u32;
        body[..4].copy_from_slice(&len.to_be_bytes());
        let mut payload = 1u32.to_be_bytes().to_vec();
        payload.extend(body);
        assert!(matches!(
            decode_article_set(&payload),
            Err(Error::MalformedPayload(_))
        ));
    }

    #[test]
    fn rejects_record_with_ten_fields() {
        let mut payload = 1u32.to_be_bytes().to_vec();
        payload.extend(raw_record(&[""; 10], 0.1));
        let err = decode_article_set(&payload).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)), "{err}");
    }

    #[test]
    fn invalid_utf8_is_malformed_payload() {
        let mut payload = encode_article_set(&[sample("abc", 0.5)]).unwrap();
        // First byte of the `hash` string body.
        payload[12] = 0xFF;
        let err = decode_article_set(&payload).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(ref m) if m.contains("hash")));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut payload = encode_article_set(&[]).unwrap();
        payload.push(0);
        assert!(decode_article_set(&payload).is_err());
    }

    #[test]
    fn huge_count_does_not_preallocate() {
        let payload = u32::MAX.to_be_bytes();
        assert!(decode_article_set(&payload).is_err());
    }

    #[test]
    fn json_uses_camel_case() {
        let json = serde_json::to_value(sample("h", 0.5)).unwrap();
        assert_eq!(json["viewsAll"], "1200");
        assert_eq!(json["viewsMonth"], "");
        assert_eq!(json["positive"], 0.5);
    }
}
