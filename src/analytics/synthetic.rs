//! Synthetic daily candles
//!
//! Stands in for historical data the upstream plan will not serve. Each call
//! is an independent random walk: open = previous close, close drifts up to
//! ±3% per day, wicks extend up to 2% beyond the body.

use crate::models::{round2, CandleSeries, CANDLE_STATUS_NO_DATA, CANDLE_STATUS_OK};
use rand::Rng;
use serde_json::{Map, Value};

pub const SECONDS_PER_DAY: i64 = 86_400;
pub const MAX_SYNTHETIC_DAYS: i64 = 30;

const MAX_DAILY_MOVE: f64 = 0.03;
const MAX_WICK: f64 = 0.02;
const MIN_VOLUME: u64 = 1_000_000;
const MAX_VOLUME: u64 = 6_000_000;

pub const SYNTHETIC_MESSAGE: &str =
    "Historical data is not available on the current data plan; showing simulated candles.";

/// Number of daily bars for `[from, to]`, capped at 30.
pub fn day_count(from: i64, to: i64) -> i64 {
    (to.saturating_sub(from).max(0) / SECONDS_PER_DAY).min(MAX_SYNTHETIC_DAYS)
}

pub fn generate(base_price: f64, from: i64, to: i64) -> CandleSeries {
    generate_with_rng(&mut rand::thread_rng(), base_price, from, to)
}

pub fn generate_with_rng<R: Rng + ?Sized>(
    rng: &mut R,
    base_price: f64,
    from: i64,
    to: i64,
) -> CandleSeries {
    let days = day_count(from, to) as usize;

    let mut series = CandleSeries {
        s: CANDLE_STATUS_OK.to_string(),
        t: Vec::with_capacity(days),
        o: Vec::with_capacity(days),
        h: Vec::with_capacity(days),
        l: Vec::with_capacity(days),
        c: Vec::with_capacity(days),
        v: Vec::with_capacity(days),
        mock: true,
        message: Some(SYNTHETIC_MESSAGE.to_string()),
        extra: Map::new(),
    };

    let mut prev_close = base_price;
    for day in 0..days {
        let open = prev_close;
        let daily_change = rng.gen_range(-MAX_DAILY_MOVE..=MAX_DAILY_MOVE);
        let close = open * (1.0 + daily_change);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..MAX_WICK));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..MAX_WICK));
        let volume = rng.gen_range(MIN_VOLUME..MAX_VOLUME);

        series.t.push(from + day as i64 * SECONDS_PER_DAY);
        series.o.push(round2(open));
        series.h.push(round2(high));
        series.l.push(round2(low));
        series.c.push(round2(close));
        series.v.push(Value::from(volume));

        prev_close = close;
    }

    if series.is_empty() {
        series.s = CANDLE_STATUS_NO_DATA.to_string();
    }

    series
}
