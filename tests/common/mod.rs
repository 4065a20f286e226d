#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};

use wealth_tracker::db::{MemoryStore, PriceRecord, PriceStore, UpsertOutcome};
use wealth_tracker::error::{Error, Result};
use wealth_tracker::notifier::NotificationSink;
use wealth_tracker::providers::{PriceSource, Quote};

pub const API_KEY: &str = "test-anon-key";

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

/// Binds an ephemeral port and serves `router` in the background.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

// ---------------------------------------------------------------------------
// Fake Supabase (PostgREST) table
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct FakeSupabase {
    pub rows: Arc<Mutex<Vec<Value>>>,
    /// Whether the table carries the (date, asset_name) unique constraint.
    pub unique_key: bool,
    /// Server-side `max_rows`: no response carries more rows than this.
    pub max_rows: usize,
}

impl FakeSupabase {
    pub fn new(unique_key: bool) -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            unique_key,
            max_rows: 1000,
        }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/rest/v1/assetprice", get(select_rows).post(upsert_rows))
            .with_state(self.clone())
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let apikey = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers.get("authorization").and_then(|v| v.to_str().ok());
    let expected_bearer = format!("Bearer {}", API_KEY);
    apikey == Some(API_KEY) && bearer == Some(expected_bearer.as_str())
}

fn same_key(a: &Value, b: &Value) -> bool {
    a["date"] == b["date"] && a["asset_name"] == b["asset_name"]
}

async fn select_rows(
    State(table): State<FakeSupabase>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let mut rows: Vec<Value> = table.rows.lock().unwrap().clone();

    for column in ["date", "asset_name"] {
        if let Some(filter) = params.get(column) {
            let wanted = filter.strip_prefix("eq.").unwrap_or(filter);
            rows.retain(|row| row[column].as_str() == Some(wanted));
        }
    }

    if params.get("order").map(String::as_str) == Some("date.desc,asset_name.asc") {
        rows.sort_by(|a, b| {
            let (a_date, b_date) = (a["date"].as_str().unwrap(), b["date"].as_str().unwrap());
            let (a_name, b_name) = (a["asset_name"].as_str().unwrap(), b["asset_name"].as_str().unwrap());
            b_date.cmp(a_date).then_with(|| a_name.cmp(b_name))
        });
    }

    let offset: usize = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit: usize = params
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(table.max_rows)
        .min(table.max_rows);
    let page: Vec<Value> = rows.into_iter().skip(offset).take(limit).collect();

    Json(page).into_response()
}

async fn upsert_rows(
    State(table): State<FakeSupabase>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(incoming): Json<Vec<Value>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let merge = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("resolution=merge-duplicates"))
        .unwrap_or(false);
    let conflict_target = params.get("on_conflict").map(String::as_str) == Some("date,asset_name");

    let mut rows = table.rows.lock().unwrap();
    for row in incoming {
        let existing = rows.iter().position(|existing| same_key(existing, &row));
        match existing {
            Some(idx) if table.unique_key && merge && conflict_target => rows[idx] = row,
            Some(_) if table.unique_key => {
                return (StatusCode::CONFLICT, Json(json!({"code": "23505"}))).into_response();
            }
            _ => rows.push(row),
        }
    }

    StatusCode::CREATED.into_response()
}

// ---------------------------------------------------------------------------
// Fake Telegram bot API
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct FakeTelegram {
    pub messages: Arc<Mutex<Vec<(String, Value)>>>,
}

impl FakeTelegram {
    pub fn router(&self) -> Router {
        Router::new()
            .route("/:bot/sendMessage", post(send_message))
            .with_state(self.clone())
    }
}

async fn send_message(
    State(telegram): State<FakeTelegram>,
    Path(bot): Path<String>,
    Json(payload): Json<Value>,
) -> Response {
    if bot == "botbroken" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    telegram.messages.lock().unwrap().push((bot, payload));
    Json(json!({"ok": true})).into_response()
}

// ---------------------------------------------------------------------------
// Fake Yahoo chart endpoint
// ---------------------------------------------------------------------------

pub fn fake_yahoo() -> Router {
    Router::new().route("/v8/finance/chart/:symbol", get(chart))
}

async fn chart(Path(symbol): Path<String>) -> Response {
    match symbol.as_str() {
        "AAPL" => Json(json!({
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": "AAPL",
                        "longName": "Apple Inc.",
                        "currency": "USD",
                        "regularMarketPrice": 187.5,
                        "regularMarketTime": 1714766400,
                        "exchangeTimezoneName": "America/New_York",
                        "gmtoffset": -14400
                    }
                }],
                "error": null
            }
        }))
        .into_response(),
        "SLOW" => {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            StatusCode::OK.into_response()
        }
        "BUSY" => (StatusCode::TOO_MANY_REQUESTS, "rate limited").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "chart": {
                    "result": null,
                    "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
                }
            })),
        )
            .into_response(),
    }
}

// ---------------------------------------------------------------------------
// In-process fakes for the pipeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Step {
    Fail,
    Quote(f64, NaiveDate),
}

/// Replays a per-asset script; an exhausted script fails.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<HashMap<String, u32>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, asset: &str, steps: Vec<Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(asset.to_string(), steps.into_iter().collect());
        self
    }

    pub fn calls(&self, asset: &str) -> u32 {
        self.calls.lock().unwrap().get(asset).copied().unwrap_or(0)
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    async fn fetch(&self, symbol: &str) -> Result<Quote> {
        *self.calls.lock().unwrap().entry(symbol.to_string()).or_insert(0) += 1;

        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(symbol)
            .and_then(|steps| steps.pop_front());

        match step {
            Some(Step::Quote(price, trading_date)) => Ok(Quote { price, trading_date }),
            Some(Step::Fail) | None => Err(Error::Http(format!("{} timed out", symbol))),
        }
    }
}

/// Memory store that fails the first N upserts per asset.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    failures: Mutex<HashMap<String, u32>>,
    calls: AtomicU32,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(self, asset: &str, times: u32) -> Self {
        self.failures.lock().unwrap().insert(asset.to_string(), times);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceStore for FlakyStore {
    async fn initialize(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn upsert(
        &self,
        date: NaiveDate,
        asset_name: &str,
        price: f64,
        currency: &str,
    ) -> Result<UpsertOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(left) = failures.get_mut(asset_name) {
                if *left > 0 {
                    *left -= 1;
                    return Err(Error::Database("database is locked".into()));
                }
            }
        }

        self.inner.upsert(date, asset_name, price, currency).await
    }

    async fn fetch_all(&self) -> Result<Vec<PriceRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_all().await
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }
}
