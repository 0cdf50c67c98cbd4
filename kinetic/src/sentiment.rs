//! Sentiment breakdown over decoded articles.

use kinetic_proto::Article;
use serde::Serialize;

/// Scores strictly above this are positive.
pub const POSITIVE_ABOVE: f64 = 0.6;
/// Scores strictly below this are negative.
pub const NEGATIVE_BELOW: f64 = 0.4;

/// Sentiment class of a single article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Sentiment {
    /// Score above [`POSITIVE_ABOVE`].
    Positive,
    /// Score below [`NEGATIVE_BELOW`].
    Negative,
    /// Everything in between, bounds included.
    Normal,
}

impl Sentiment {
    /// Classifies a `positive` score. NaN counts as normal.
    pub fn classify(score: f64) -> Self {
        if score > POSITIVE_ABOVE {
            Self::Positive
        } else if score < NEGATIVE_BELOW {
            Self::Negative
        } else {
            Self::Normal
        }
    }
}

/// Article counts per sentiment class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    /// Positive articles.
    pub positive: usize,
    /// Negative articles.
    pub negative: usize,
    /// Normal articles.
    pub normal: usize,
}

impl SentimentCounts {
    /// Counts `articles` by class.
    pub fn tally(articles: &[Article]) -> Self {
        articles.iter().fold(Self::default(), |mut acc, a| {
            match Sentiment::classify(a.positive) {
                Sentiment::Positive => acc.positive += 1,
                Sentiment::Negative => acc.negative += 1,
                Sentiment::Normal => acc.normal += 1,
            }
            acc
        })
    }

    /// Total number of articles counted.
    pub const fn total(&self) -> usize {
        self.positive + self.negative + self.normal
    }

    /// Percentages rounded to one decimal, or `None` if nothing was counted.
    #[allow(clippy::cast_precision_loss)]
    pub fn percentages(&self) -> Option<SentimentStats> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        // Tenths of a percent, computed exactly; ties go to the even tenth.
        let pct = |n: usize| {
            let scaled = n * 1000;
            let (mut tenths, rem) = (scaled / total, scaled % total);
            if rem * 2 > total || (rem * 2 == total && tenths % 2 == 1) {
                tenths += 1;
            }
            tenths as f64 / 10.0
        };
        Some(SentimentStats {
            positive: pct(self.positive),
            negative: pct(self.negative),
            normal: pct(self.normal),
        })
    }
}

/// Percentage of articles in each class, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentStats {
    /// Percent positive.
    pub positive: f64,
    /// Percent negative.
    pub negative: f64,
    /// Percent normal.
    pub normal: f64,
}

impl SentimentStats {
    /// Breakdown of `articles`, or `None` for an empty set.
    pub fn from_articles(articles: &[Article]) -> Option<Self> {
        SentimentCounts::tally(articles).percentages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(positive: f64) -> Article {
        Article {
            positive,
            ..Article::default()
        }
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(Sentiment::classify(0.6), Sentiment::Normal);
        assert_eq!(Sentiment::classify(0.4), Sentiment::Normal);
        assert_eq!(Sentiment::classify(0.600_001), Sentiment::Positive);
        assert_eq!(Sentiment::classify(0.399_999), Sentiment::Negative);
        assert_eq!(Sentiment::classify(1.5), Sentiment::Positive);
        assert_eq!(Sentiment::classify(-0.1), Sentiment::Negative);
        assert_eq!(Sentiment::classify(f64::NAN), Sentiment::Normal);
    }

    #[test]
    fn tally_and_round() {
        let articles = [scored(0.9), scored(0.1), scored(0.5)];
        let counts = SentimentCounts::tally(&articles);
        assert_eq!(
            counts,
            SentimentCounts {
                positive: 1,
                negative: 1,
                normal: 1
            }
        );
        let stats = counts.percentages().unwrap();
        assert!((stats.positive - 33.3).abs() < f64::EPSILON);
        assert!((stats.negative - 33.3).abs() < f64::EPSILON);
        assert!((stats.normal - 33.3).abs() < f64::EPSILON);
    }

    #[test]
    fn two_thirds() {
        let stats = SentimentStats::from_articles(&[scored(0.7), scored(0.8), scored(0.2)]).unwrap();
        assert!((stats.positive - 66.7).abs() < f64::EPSILON);
        assert!((stats.negative - 33.3).abs() < f64::EPSILON);
        assert!(stats.normal.abs() < f64::EPSILON);
    }

    #[test]
    fn halves_round_to_even() {
        // 1/16 = 6.25%, 3/16 = 18.75%, 12/16 = 75%
        let mut articles = vec![scored(0.9)];
        articles.extend((0..3).map(|_| scored(0.1)));
        articles.extend((0..12).map(|_| scored(0.5)));
        let stats = SentimentStats::from_articles(&articles).unwrap();
        assert!((stats.positive - 6.2).abs() < 1e-9);
        assert!((stats.negative - 18.8).abs() < 1e-9);
        assert!((stats.normal - 75.0).abs() < 1e-9);
    }

    #[test]
    fn empty_set_has_no_stats() {
        assert!(SentimentStats::from_articles(&[]).is_none());
    }

    #[test]
    fn json_shape() {
        let stats = SentimentStats::from_articles(&[scored(0.61)]).unwrap();
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "positive": 100.0, "negative": 0.0, "normal": 0.0 })
        );
    }
}
