use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use crate::config::ExchangeConfig;
use crate::error::{Error, Result};
use crate::market_data::connectors::MarketDataSource;
use crate::market_data::{FundingHistoryRequest, KlineRequest, KlineRow, RawFundingRecord};
use crate::types::timestamp::to_millis;

const KLINE_PATH: &str = "/v5/market/kline";
const FUNDING_HISTORY_PATH: &str = "/v5/market/funding/history";

pub struct BybitConnector {
    source_id: String,
    base_url: String,
    category: String,
    http: reqwest::Client,
}

impl BybitConnector {
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(BybitConnector {
            source_id: "bybit".to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            category: config.category.clone(),
            http,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, ?query, "GET");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        parse_envelope(&body)
    }
}

/// Unwraps Bybit's `{retCode, retMsg, result}` envelope.
pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: BybitResponse<T> = serde_json::from_str(body)
        .map_err(|e| Error::DeserializationError(e.to_string()))?;

    if envelope.ret_code != 0 {
        return Err(Error::ApiError {
            code: envelope.ret_code,
            message: envelope.ret_msg,
        });
    }

    envelope.result.ok_or_else(|| {
        Error::DeserializationError("response has no result object".to_string())
    })
}

#[async_trait]
impl MarketDataSource for BybitConnector {
    async fn klines(&self, request: &KlineRequest) -> Result<Vec<KlineRow>> {
        let query = [
            ("category", self.category.clone()),
            ("symbol", request.symbol.clone()),
            ("interval", request.interval.clone()),
            ("start", to_millis(&request.start).to_string()),
            ("end", to_millis(&request.end).to_string()),
            ("limit", request.limit.to_string()),
        ];
        let result: ListResult<KlineRow> = self.get(KLINE_PATH, &query).await?;
        Ok(result.list)
    }

    async fn funding_history(&self, request: &FundingHistoryRequest) -> Result<Vec<RawFundingRecord>> {
        let query = [
            ("category", self.category.clone()),
            ("symbol", request.symbol.clone()),
            ("startTime", to_millis(&request.start).to_string()),
            ("endTime", to_millis(&request.end).to_string()),
            ("limit", request.limit.to_string()),
        ];
        let result: ListResult<RawFundingRecord> = self.get(FUNDING_HISTORY_PATH, &query).await?;
        Ok(result.list)
    }

    fn source_id(&self) -> &str {
        &self.source_id
    }
}

#[derive(Debug, Deserialize)]
struct BybitResponse<T> {
    #[serde(rename = "retCode")]
    ret_code: i32,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ListResult<T> {
    #[serde(default = "Vec::new")]
    list: Vec<T>,
}
