//! End-to-end route tests
//!
//! A throwaway axum server on 127.0.0.1:0 plays the upstream market-data API.
//! It counts every hit and rejects calls without the expected token, so tests
//! can assert both on responses and on whether upstream was contacted.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stockpulse_backend::{create_router, AppState, Config};
use tokio::net::TcpListener;
use tower::ServiceExt;

const API_KEY: &str = "test-key";

type Params = Query<HashMap<String, String>>;

#[derive(Clone)]
struct Upstream {
    hits: Arc<AtomicUsize>,
}

fn aapl_quote() -> Value {
    json!({"c":150,"d":2.5,"dp":1.69,"h":152,"l":148,"o":149,"pc":147.5,"t":1700000000})
}

fn aapl_candles() -> Value {
    json!({
        "s": "ok",
        "t": [1700000000, 1700086400],
        "o": [149.0, 150.0],
        "h": [151.0, 152.0],
        "l": [148.0, 149.5],
        "c": [150.0, 151.0],
        "v": [1000, 2000]
    })
}

fn zero_quote() -> Value {
    json!({"c":0,"d":null,"dp":null,"h":0,"l":0,"o":0,"pc":0,"t":0})
}

/// Counts the hit and checks the token; `Err` is the response to send instead.
fn admit(up: &Upstream, params: &HashMap<String, String>) -> Result<(), Response> {
    up.hits.fetch_add(1, Ordering::SeqCst);
    if params.get("token").map(String::as_str) != Some(API_KEY) {
        return Err((StatusCode::UNAUTHORIZED, "bad token").into_response());
    }
    Ok(())
}

fn status(code: u16) -> Response {
    (StatusCode::from_u16(code).unwrap(), Json(json!({"error": "upstream says no"}))).into_response()
}

async fn fake_quote(State(up): State<Upstream>, Query(p): Params) -> Response {
    if let Err(r) = admit(&up, &p) {
        return r;
    }
    match p.get("symbol").map(String::as_str).unwrap_or_default() {
        "AAPL" | "BUSY" => Json(aapl_quote()).into_response(),
        "LOCKED" => status(403),
        "BROKEN" | "BINANCE:ETHUSDT" => status(502),
        "BINANCE:BTCUSDT" => {
            Json(json!({"c":43000.5,"d":100,"dp":0.23,"h":43500,"l":42000,"o":42900,"pc":42900.5,"t":1}))
                .into_response()
        }
        "BINANCE:SOLUSDT" => {
            Json(json!({"c":98.1,"d":-1,"dp":-1.01,"h":101,"l":97,"o":99,"pc":99.1,"t":1})).into_response()
        }
        _ => Json(zero_quote()).into_response(),
    }
}

async fn fake_candles(State(up): State<Upstream>, Query(p): Params) -> Response {
    if let Err(r) = admit(&up, &p) {
        return r;
    }
    match p.get("symbol").map(String::as_str).unwrap_or_default() {
        "AAPL" => Json(aapl_candles()).into_response(),
        "NODATA" | "BINANCE:NODATAUSDT" => Json(json!({"s": "no_data"})).into_response(),
        _ => status(403),
    }
}

async fn fake_search(State(up): State<Upstream>, Query(p): Params) -> Response {
    if let Err(r) = admit(&up, &p) {
        return r;
    }
    let mut result: Vec<Value> = (0..30)
        .map(|i| json!({"symbol": format!("APL{i}"), "description": "APPLE THING", "displaySymbol": format!("APL{i}"), "type": "Common Stock"}))
        .collect();
    result.insert(0, json!({"symbol": "NODESC", "description": ""}));
    result.insert(1, json!({"symbol": "AAPL", "description": "APPLE INC"}));
    Json(json!({"count": result.len(), "result": result})).into_response()
}

async fn fake_profile(State(up): State<Upstream>, Query(p): Params) -> Response {
    if let Err(r) = admit(&up, &p) {
        return r;
    }
    match p.get("symbol").map(String::as_str).unwrap_or_default() {
        "AAPL" => Json(json!({"name": "Apple Inc", "ticker": "AAPL", "finnhubIndustry": "Technology"}))
            .into_response(),
        _ => Json(json!({})).into_response(),
    }
}

async fn fake_news(State(up): State<Upstream>, Query(p): Params) -> Response {
    if let Err(r) = admit(&up, &p) {
        return r;
    }
    match p.get("category").map(String::as_str).unwrap_or_default() {
        "forbidden" => status(403),
        category => Json(json!([{"headline": format!("{category} headline"), "source": "Wire"}])).into_response(),
    }
}

async fn fake_company_news(State(up): State<Upstream>, Query(p): Params) -> Response {
    if let Err(r) = admit(&up, &p) {
        return r;
    }
    if !p.contains_key("from") || !p.contains_key("to") {
        return status(422);
    }
    if p.get("symbol").map(String::as_str) == Some("BUSY") {
        // one headline worth +2, then 19 items with no headline at all
        let mut items = vec![json!({"headline": "Record profit reported", "source": "Wire"})];
        items.extend((0..19).map(|i| json!({"id": i, "source": "Wire"})));
        return Json(Value::Array(items)).into_response();
    }
    Json(json!([
        {"headline": "Apple shares surge on record iPhone sales", "source": "Wire"},
        {"headline": "Analysts upgrade Apple", "source": "Wire"},
        {"headline": "Supplier warns of weak demand", "source": "Wire"}
    ]))
    .into_response()
}

async fn fake_metrics(State(up): State<Upstream>, Query(p): Params) -> Response {
    if let Err(r) = admit(&up, &p) {
        return r;
    }
    if p.get("metric").map(String::as_str) != Some("all") {
        return status(422);
    }
    Json(json!({
        "symbol": "AAPL",
        "metric": {
            "marketCapitalization": 2950000,
            "peTTM": 29.5,
            "52WeekHigh": 200.0,
            "52WeekLow": 100.0,
            "grossMarginTTM": 44.13,
            "beta": null
        }
    }))
    .into_response()
}

async fn spawn_upstream() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/quote", get(fake_quote))
        .route("/stock/candle", get(fake_candles))
        .route("/crypto/candle", get(fake_candles))
        .route("/search", get(fake_search))
        .route("/stock/profile2", get(fake_profile))
        .route("/news", get(fake_news))
        .route("/company-news", get(fake_company_news))
        .route("/stock/metric", get(fake_metrics))
        .with_state(Upstream { hits: hits.clone() });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), hits)
}

async fn proxy() -> (Router, Arc<AtomicUsize>) {
    let (base, hits) = spawn_upstream().await;
    let state = AppState::new(Config::new(API_KEY, base)).unwrap();
    (create_router(state), hits)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// =============================================================================
// QUOTES
// =============================================================================

#[tokio::test]
async fn test_quote_passthrough_is_verbatim() {
    let (app, _) = proxy().await;
    let (status, body) = get_json(&app, "/api/stock/AAPL").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, aapl_quote());
}

#[tokio::test]
async fn test_zero_quote_is_not_found() {
    let (app, _) = proxy().await;
    let (status, body) = get_json(&app, "/api/stock/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["symbol"], "NOPE");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_upstream_forbidden_is_plan_restriction() {
    let (app, _) = proxy().await;
    let (status, body) = get_json(&app, "/api/stock/LOCKED").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["symbol"], "LOCKED");
    assert!(body["error"].as_str().unwrap().contains("LOCKED"));
}

#[tokio::test]
async fn test_other_upstream_failure_is_server_error() {
    let (app, _) = proxy().await;
    let (status, body) = get_json(&app, "/api/stock/BROKEN").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Request failed with status code 502");
    assert_eq!(body["symbol"], "BROKEN");
}

#[tokio::test]
async fn test_unreachable_upstream_is_server_error() {
    let state = AppState::new(Config::new("SECRET_TOKEN_123", "http://127.0.0.1:9")).unwrap();
    let app = create_router(state);
    let (status, body) = get_json(&app, "/api/stock/AAPL").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["symbol"], "AAPL");

    let message = body["error"].as_str().unwrap();
    assert!(!message.is_empty());
    assert!(!message.contains("SECRET_TOKEN_123"), "{message}");
    assert!(!body.to_string().contains("token="));
}

// =============================================================================
// SEARCH / PROFILE / WATCHLIST
// =============================================================================

#[tokio::test]
async fn test_blank_search_never_reaches_upstream() {
    let (app, hits) = proxy().await;
    for uri in ["/api/search", "/api/search?q=", "/api/search?q=%20%20%20"] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string());
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_is_trimmed() {
    let (app, hits) = proxy().await;
    let (status, body) = get_json(&app, "/api/search?q=apple").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let result = body["result"].as_array().unwrap();
    assert_eq!(result.len(), 20);
    assert_eq!(body["count"], 20);
    for r in result {
        assert!(!r["symbol"].as_str().unwrap().is_empty());
        assert!(!r["description"].as_str().unwrap().is_empty());
    }
    assert_eq!(result[0]["symbol"], "AAPL");
    assert_eq!(result[0]["type"], "Unknown");
    assert_eq!(result[0]["displaySymbol"], "AAPL");
}

#[tokio::test]
async fn test_company_profile() {
    let (app, _) = proxy().await;
    let (status, body) = get_json(&app, "/api/company/AAPL").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Apple Inc");

    let (status, body) = get_json(&app, "/api/company/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["symbol"], "NOPE");
}

#[tokio::test]
async fn test_watchlist_is_local() {
    let (app, hits) = proxy().await;
    let (status, body) = get_json(&app, "/api/watchlist").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

// =============================================================================
// CANDLES
// =============================================================================

#[tokio::test]
async fn test_candles_require_all_params() {
    let (app, hits) = proxy().await;
    for uri in [
        "/api/candles/AAPL",
        "/api/candles/AAPL?resolution=D&from=1",
        "/api/candles/AAPL?resolution=D&to=2",
        "/api/candles/AAPL?from=1&to=2",
    ] {
        let (status, _) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_candles_passthrough() {
    let (app, _) = proxy().await;
    let (status, body) =
        get_json(&app, "/api/candles/AAPL?resolution=D&from=1700000000&to=1700100000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, aapl_candles());
    assert_eq!(body["v"][0].as_u64(), Some(1000));
    assert!(body.get("mock").is_none());
}

#[tokio::test]
async fn test_forbidden_candles_fall_back_to_synthetic() {
    let (app, _) = proxy().await;
    let (status, body) = get_json(&app, "/api/candles/XX?resolution=D&from=1&to=86401").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mock"], true);
    assert_eq!(body["t"], json!([1]));
    // XX quotes as all zeros, so the series is seeded at the default price
    assert_eq!(body["o"], json!([100.0]));
    for col in ["o", "h", "l", "c", "v"] {
        assert_eq!(body[col].as_array().unwrap().len(), 1, "{col}");
    }
}

#[tokio::test]
async fn test_extreme_candle_bounds_do_not_panic() {
    let (app, _) = proxy().await;
    let (status, body) = get_json(
        &app,
        "/api/candles/XX?resolution=D&from=-9223372036854775808&to=9223372036854775807",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mock"], true);
    assert_eq!(body["t"].as_array().unwrap().len(), 30);

    let (status, body) = get_json(&app, "/api/crypto-candles/XX?to=-9223372036854775807").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mock"], true);
    assert!(body["t"].as_array().unwrap().is_empty());

    // the server is still answering afterwards
    let (status, _) = get_json(&app, "/api/stock/AAPL").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_no_data_candles_are_not_found() {
    let (app, _) = proxy().await;
    let (status, body) = get_json(&app, "/api/candles/NODATA?resolution=D&from=1&to=86401").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["symbol"], "NODATA");
}

// =============================================================================
// CRYPTO
// =============================================================================

#[tokio::test]
async fn test_crypto_quote_uses_exchange_symbol() {
    let (app, _) = proxy().await;
    let (status, body) = get_json(&app, "/api/crypto/btc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["c"], 43000.5);
}

#[tokio::test]
async fn test_crypto_list_keeps_order_and_drops_failures() {
    let (app, hits) = proxy().await;
    let (status, body) = get_json(&app, "/api/crypto-list").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.load(Ordering::SeqCst), 15);

    let list = body.as_array().unwrap();
    assert!(list.len() <= 15);
    let symbols: Vec<&str> = list.iter().map(|x| x["symbol"].as_str().unwrap()).collect();
    assert_eq!(symbols, vec!["BTC", "SOL"]);
    for item in list {
        assert!(item["price"].as_f64().unwrap() > 0.0);
        assert!(item.get("error").is_none());
    }
    assert_eq!(list[0]["changePercent"], 0.23);
    assert_eq!(list[1]["previousClose"], 99.1);
}

#[tokio::test]
async fn test_crypto_candles_fall_back_on_no_data() {
    let (app, _) = proxy().await;
    let (status, body) = get_json(
        &app,
        "/api/crypto-candles/NODATA?resolution=D&from=1700000000&to=1700259200",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mock"], true);
    assert_eq!(body["t"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_forbidden_crypto_candles_fall_back_to_synthetic() {
    let (app, _) = proxy().await;

    // BINANCE:XXUSDT candles are refused and its quote is all zeros
    let (status, body) = get_json(
        &app,
        "/api/crypto-candles/XX?resolution=D&from=1700000000&to=1700172800",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mock"], true);
    assert_eq!(body["t"], json!([1700000000, 1700086400]));
    assert_eq!(body["o"][0], 100.0);
    for col in ["o", "h", "l", "c", "v"] {
        assert_eq!(body[col].as_array().unwrap().len(), 2, "{col}");
    }

    // SOL candles are refused too, but its live quote seeds the walk
    let (status, body) = get_json(
        &app,
        "/api/crypto-candles/sol?resolution=D&from=1700000000&to=1700086400",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mock"], true);
    assert_eq!(body["o"], json!([98.1]));
}

// =============================================================================
// NEWS
// =============================================================================

#[tokio::test]
async fn test_news_routes() {
    let (app, _) = proxy().await;

    let (status, body) = get_json(&app, "/api/market-news").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["headline"], "general headline");

    let (_, body) = get_json(&app, "/api/crypto-news").await;
    assert_eq!(body[0]["headline"], "crypto headline");

    let (_, body) = get_json(&app, "/api/news/merger").await;
    assert_eq!(body[0]["headline"], "merger headline");

    let (status, body) = get_json(&app, "/api/news/forbidden").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_company_news_aliases_match() {
    let (app, _) = proxy().await;
    let (s1, a) = get_json(&app, "/api/company-news/AAPL").await;
    let (s2, b) = get_json(&app, "/api/stock-news/AAPL").await;
    assert_eq!(s1, StatusCode::OK);
    assert_eq!(s2, StatusCode::OK);
    assert_eq!(a, b);
    assert_eq!(a.as_array().unwrap().len(), 3);
}

// =============================================================================
// INDICATORS / PREDICTION
// =============================================================================

#[tokio::test]
async fn test_indicators_are_formatted() {
    let (app, hits) = proxy().await;
    let (status, body) = get_json(&app, "/api/indicators/AAPL").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    assert_eq!(body["symbol"], "AAPL");
    assert_eq!(body["currentPrice"], 150.0);
    let ind = &body["indicators"];
    assert_eq!(ind["marketCap"], "$2.95T");
    assert_eq!(ind["peRatio"], "29.50");
    assert_eq!(ind["grossMargin"], "44.13%");
    assert_eq!(ind["sma50"], "$150.00");
    assert!(ind.get("beta").is_none());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_prediction_shape() {
    let (app, _) = proxy().await;
    let (status, body) = get_json(&app, "/api/prediction/AAPL").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["symbol"], "AAPL");
    assert_eq!(body["currentPrice"], 150.0);
    assert_eq!(body["newsCount"], 3);
    // surge + record + upgrade - weak = +2 over max(3, 10)
    assert_eq!(body["sentiment"], 0.2);

    let points = body["predictions"].as_array().unwrap();
    assert_eq!(points.len(), 30);
    let conf: Vec<f64> = points.iter().map(|p| p["confidence"].as_f64().unwrap()).collect();
    for w in conf.windows(2) {
        assert!(w[1] <= w[0]);
    }
    assert!(conf.iter().all(|c| *c >= 50.0));

    let summary = &body["summary"];
    assert_eq!(summary["confidence"], 75.0);
    let expected = summary["expectedChange"].as_f64().unwrap();
    let trend = summary["trend"].as_str().unwrap();
    match trend {
        "bullish" => assert!(expected > 1.0),
        "bearish" => assert!(expected < -1.0),
        "neutral" => assert!((-1.0..=1.0).contains(&expected)),
        other => panic!("unexpected trend {other}"),
    }
}

#[tokio::test]
async fn test_prediction_unknown_symbol() {
    let (app, _) = proxy().await;
    let (status, body) = get_json(&app, "/api/prediction/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["symbol"], "NOPE");
}

#[tokio::test]
async fn test_prediction_sentiment_uses_article_count() {
    let (app, _) = proxy().await;
    let (status, body) = get_json(&app, "/api/prediction/BUSY").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newsCount"], 20);
    // +2 over 20 articles, not over the single headline or the floor of 10
    assert_eq!(body["sentiment"], 0.1);
}
