//! 30-day price projection from headline sentiment
//!
//! Expected change (percent) = sentiment × 8 + downside-biased noise
//! + news-volume boost (up to 1). Day `i` gets `i/30` of that plus jitter
//! that widens with `i`. Confidence falls 1.3 points per day from 90,
//! floored at 50.

use crate::models::{round2, Prediction, PredictionPoint, PredictionSummary, Trend};
use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;

pub const HORIZON_DAYS: u32 = 30;

const SENTIMENT_WEIGHT: f64 = 0.08;
const NOISE_BIAS: f64 = 0.7;
const NOISE_WEIGHT: f64 = 0.02;
const NEWS_BOOST_DIVISOR: f64 = 50.0;
const NEWS_BOOST_WEIGHT: f64 = 0.01;
const DAILY_JITTER: f64 = 0.1;

const BASE_CONFIDENCE: f64 = 90.0;
const CONFIDENCE_DECAY: f64 = 1.3;
const MIN_CONFIDENCE: f64 = 50.0;
const SUMMARY_CONFIDENCE: f64 = 75.0;
const TREND_THRESHOLD: f64 = 1.0;

pub fn predict(current_price: f64, sentiment: f64, news_count: usize) -> Prediction {
    predict_with(
        &mut rand::thread_rng(),
        Utc::now().date_naive(),
        current_price,
        sentiment,
        news_count,
    )
}

pub fn predict_with<R: Rng + ?Sized>(
    rng: &mut R,
    start: NaiveDate,
    current_price: f64,
    sentiment: f64,
    news_count: usize,
) -> Prediction {
    let sentiment = sentiment.clamp(-1.0, 1.0);

    let sentiment_impact = sentiment * SENTIMENT_WEIGHT;
    let noise = (rng.gen::<f64>() - NOISE_BIAS) * NOISE_WEIGHT;
    let news_boost = (news_count as f64 / NEWS_BOOST_DIVISOR).min(1.0) * NEWS_BOOST_WEIGHT;
    let total_change = (sentiment_impact + noise + news_boost) * 100.0;

    let predictions: Vec<PredictionPoint> = (1..=HORIZON_DAYS)
        .map(|day| {
            let progress = day as f64 / HORIZON_DAYS as f64;
            let jitter = (rng.gen::<f64>() - 0.5) * DAILY_JITTER * day as f64;
            let change = total_change * progress + jitter;
            let price = round2(current_price * (1.0 + change / 100.0));

            PredictionPoint {
                date: (start + Duration::days(day as i64))
                    .format("%Y-%m-%d")
                    .to_string(),
                day,
                price,
                change: round2(change),
                confidence: confidence_for_day(day),
            }
        })
        .collect();

    let expected_change = round2(total_change);
    let target_price = predictions
        .last()
        .map(|p| p.price)
        .unwrap_or(current_price);

    Prediction {
        current_price,
        sentiment: (sentiment * 1000.0).round() / 1000.0,
        news_count,
        predictions,
        summary: PredictionSummary {
            trend: classify_trend(expected_change),
            expected_change,
            target_price,
            confidence: SUMMARY_CONFIDENCE,
        },
    }
}

pub fn confidence_for_day(day: u32) -> f64 {
    let raw = BASE_CONFIDENCE - CONFIDENCE_DECAY * day as f64;
    ((raw * 10.0).round() / 10.0).max(MIN_CONFIDENCE)
}

pub fn classify_trend(expected_change: f64) -> Trend {
    if expected_change > TREND_THRESHOLD {
        Trend::Bullish
    } else if expected_change < -TREND_THRESHOLD {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}
