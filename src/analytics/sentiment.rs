//! Headline keyword sentiment
//!
//! Each headline contributes +1 for every positive keyword it contains and
//! -1 for every negative one (case-insensitive substring match). The sum is
//! divided by max(headlines, 10) and clamped to [-1, 1].

pub const POSITIVE_WORDS: [&str; 11] = [
    "surge", "gain", "rise", "growth", "profit", "beat", "strong", "bullish", "upgrade", "record",
    "rally",
];

pub const NEGATIVE_WORDS: [&str; 11] = [
    "fall",
    "drop",
    "decline",
    "loss",
    "miss",
    "weak",
    "bearish",
    "downgrade",
    "cut",
    "crash",
    "plunge",
];

const MIN_NORMALIZER: usize = 10;

/// Net keyword hits for a single headline.
pub fn headline_score(headline: &str) -> i64 {
    let lower = headline.to_lowercase();
    let pos = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as i64;
    let neg = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as i64;
    pos - neg
}

/// Net keyword hits over all headlines, divided by max(`news_count`, 10).
///
/// `news_count` is the number of articles fetched, including any without a
/// headline, so it matches the count reported alongside the prediction.
pub fn score_headlines<'a, I>(headlines: I, news_count: usize) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    let total: i64 = headlines.into_iter().map(headline_score).sum();
    let normalizer = news_count.max(MIN_NORMALIZER) as f64;
    (total as f64 / normalizer).clamp(-1.0, 1.0)
}
