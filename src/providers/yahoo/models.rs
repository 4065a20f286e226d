use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub long_name: Option<String>,
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
    /// Unix seconds of the last trade.
    pub regular_market_time: Option<i64>,
    pub exchange_timezone_name: Option<String>,
    /// Exchange UTC offset in seconds.
    pub gmtoffset: Option<i32>,
}
