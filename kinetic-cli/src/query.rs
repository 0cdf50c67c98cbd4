//! Query commands: fetch, sentiment.

use anyhow::{Context, Result, bail};
use kinetic::{
    Article, ChartMap, Client, QueryKind, QueryResult, SentimentCounts, SentimentStats,
};

use crate::OutputFormat;

/// Arguments for `kinetic fetch`.
///
/// Usage: `kinetic fetch [OPTIONS] <chart|articles>`
#[derive(clap::Args)]
pub struct FetchArgs {
    /// Query kind: `chart` or `articles`.
    pub kind: QueryKind,

    /// Query string (may be empty).
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Output format.
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for `kinetic sentiment`.
#[derive(clap::Args)]
pub struct SentimentArgs {
    /// Article search string (may be empty).
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Output format.
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
}

impl FetchArgs {
    pub fn run(self, client: &Client) -> Result<()> {
        let result = client
            .query(self.kind, &self.query)
            .with_context(|| format!("{} query {:?}", self.kind, self.query))?;

        if matches!(self.format, OutputFormat::Json) {
            println!("{}", serde_json::to_string_pretty(&result)?);
            return Ok(());
        }
        match result {
            QueryResult::Chart(map) => print_chart(&map),
            QueryResult::Articles(articles) => print_articles(&articles),
            _ => bail!("unsupported result type"),
        }
        Ok(())
    }
}

impl SentimentArgs {
    pub fn run(self, client: &Client) -> Result<()> {
        let articles = client
            .articles(&self.query)
            .with_context(|| format!("articles query {:?}", self.query))?;
        let counts = SentimentCounts::tally(&articles);
        let Some(stats) = counts.percentages() else {
            bail!("no articles matched {:?}", self.query);
        };

        if matches!(self.format, OutputFormat::Json) {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print_sentiment(&counts, &stats);
        }
        Ok(())
    }
}

fn print_chart(map: &ChartMap) {
    if map.is_empty() {
        println!("No data.");
        return;
    }
    println!("{:<20} {:>10}", "BUCKET", "COUNT");
    for (key, count) in map {
        println!("{key:<20} {count:>10}");
    }
}

fn print_articles(articles: &[Article]) {
    if articles.is_empty() {
        println!("No articles.");
        return;
    }
    println!(
        "{:<12} {:<20} {:>8} {:>8}  {}",
        "DATE", "SITE", "VIEWS", "SCORE", "TITLE"
    );
    for a in articles {
        println!(
            "{:<12} {:<20} {:>8} {:>8.4}  {}",
            truncate(&a.date, 12),
            truncate(&a.site, 20),
            truncate(&a.views_all, 8),
            a.positive,
            truncate(&a.title, 60)
        );
    }
}

fn print_sentiment(counts: &SentimentCounts, stats: &SentimentStats) {
    println!("{:<10} {:>8} {:>8}", "SENTIMENT", "ARTICLES", "PERCENT");
    for (label, n, pct) in [
        ("positive", counts.positive, stats.positive),
        ("negative", counts.negative, stats.negative),
        ("normal", counts.normal, stats.normal),
    ] {
        println!("{label:<10} {n:>8} {pct:>7.1}%");
    }
    println!("{:<10} {:>8}", "total", counts.total());
}

/// Shortens `s` to at most `max` characters, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_owned();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use kinetic::ClientConfig;
    use kinetic_proto::{Packet, PacketType};

    use super::*;

    /// One-connection server: acks the handshake, checks the query type,
    /// then answers with `response`.
    fn serve(expect: PacketType, response: Packet) -> (Client, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (mut s, _) = listener.accept().unwrap();
            kinetic_proto::read_handshake(&mut s, 256).unwrap();
            let ack = Packet::new(PacketType::RegisterRequest, Vec::new());
            kinetic_proto::write_packet(&mut s, &ack).unwrap();
            let query = kinetic_proto::read_packet(&mut s).unwrap();
            assert_eq!(query.packet_type(), Some(expect));
            kinetic_proto::write_packet(&mut s, &response).unwrap();
        });
        let config = ClientConfig::default().host("127.0.0.1").port(port);
        (Client::new(config).unwrap(), handle)
    }

    #[test]
    fn fetch_chart_as_json() {
        let map = ChartMap::from([("2024-01-01".to_owned(), 4)]);
        let payload = kinetic_proto::encode_chart_map(&map).unwrap();
        let (client, server) = serve(
            PacketType::GetDataChart,
            Packet::new(PacketType::DataPayload, payload),
        );

        let args = FetchArgs {
            kind: QueryKind::Chart,
            query: "нефть".into(),
            format: OutputFormat::Json,
        };
        args.run(&client).unwrap();
        server.join().unwrap();
    }

    #[test]
    fn fetch_articles_as_table() {
        let article = Article {
            hash: "a1".into(),
            title: "Курс рубля".into(),
            positive: 0.7,
            ..Article::default()
        };
        let payload = kinetic_proto::encode_article_set(&[article]).unwrap();
        let (client, server) = serve(
            PacketType::SearchQuery,
            Packet::new(PacketType::ArticleSet, payload),
        );

        let args = FetchArgs {
            kind: QueryKind::Articles,
            query: String::new(),
            format: OutputFormat::Table,
        };
        args.run(&client).unwrap();
        server.join().unwrap();
    }

    #[test]
    fn sentiment_of_empty_result_fails() {
        let payload = kinetic_proto::encode_article_set(&[]).unwrap();
        let (client, server) = serve(
            PacketType::SearchQuery,
            Packet::new(PacketType::ArticleSet, payload),
        );

        let args = SentimentArgs {
            query: "nothing".into(),
            format: OutputFormat::Table,
        };
        let err = args.run(&client).unwrap_err();
        server.join().unwrap();
        assert!(err.to_string().contains("no articles matched"), "{err:#}");
    }

    #[test]
    fn server_error_keeps_its_class() {
        let (client, server) = serve(
            PacketType::GetDataChart,
            Packet::new(PacketType::Error, b"bad query".to_vec()),
        );

        let args = FetchArgs {
            kind: QueryKind::Chart,
            query: "x".into(),
            format: OutputFormat::Table,
        };
        let err = args.run(&client).unwrap_err();
        server.join().unwrap();
        assert_eq!(crate::exit_code(&err), 3);
        assert!(format!("{err:#}").contains("bad query"));
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Экономика России", 5), "Экон…");
        assert_eq!(truncate("abc", 3), "abc");
    }
}
