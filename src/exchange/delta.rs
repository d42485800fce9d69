// src/exchange/delta.rs

use super::Exchange;
use crate::error::TradeError;
use crate::exchange::types::{
    ContractType, Expiry, OptionChain, OptionContract, Order, OrderSide, Position,
};
use crate::models::OrderRequest;
use anyhow::{Result, anyhow};
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, Url};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::Sha256;
use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_BASE_URL: &str = "https://api.india.delta.exchange";

const OPTION_CONTRACT_TYPES: &str = "call_options,put_options";

/// Envelope every Delta v2 endpoint answers with.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    context: Option<Value>,
}

/// One row of `/v2/tickers`. Price fields arrive as strings, numbers or
/// empty strings depending on the product, hence the lenient decoding.
#[derive(Deserialize)]
struct TickerEntry {
    symbol: String,
    #[serde(default)]
    contract_type: Option<String>,
    #[serde(default)]
    product_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    strike_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    spot_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    mark_price: Option<Decimal>,
    #[serde(default)]
    quotes: Option<TickerQuotes>,
}

#[derive(Deserialize, Default)]
struct TickerQuotes {
    #[serde(default, deserialize_with = "lenient_decimal")]
    best_bid: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    best_ask: Option<Decimal>,
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Decimal::from_str(s.trim()).ok(),
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    })
}

/// Body of `POST /v2/orders`. Exactly the resolved contract, side and
/// size; order type is always market.
#[derive(Serialize)]
struct OrderPayload {
    product_id: i64,
    size: u32,
    side: OrderSide,
    order_type: &'static str,
    client_order_id: String,
}

impl OrderPayload {
    fn from_request(request: &OrderRequest) -> Self {
        Self {
            product_id: request.contract.product_id,
            size: request.size,
            side: request.side,
            order_type: "market_order",
            client_order_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Delta Exchange India REST v2 client.
#[derive(Debug, Clone)]
pub struct Delta {
    api_key: String,
    api_secret: String,
    client: Client,
    base_url: Url,
}

impl Delta {
    /// `base_url` without a trailing `/`.
    pub fn new(key: &str, secret: &str, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow!("Invalid Delta URL `{}`: {}", base_url, e))?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent(concat!("straddler/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow!("HTTP client build error: {}", e))?;

        Ok(Self {
            api_key: key.to_string(),
            api_secret: secret.to_string(),
            client,
            base_url,
        })
    }

    fn timestamp() -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            .to_string()
    }

    fn sign_payload(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes()).unwrap();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Canonical query string. The same string is signed and sent, so
    /// encoding choices can never desynchronize from the signature.
    fn query_string(query: Option<&[(&str, &str)]>) -> String {
        match query {
            Some(q) if !q.is_empty() => {
                let joined = q
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&");
                format!("?{joined}")
            }
            _ => String::new(),
        }
    }

    async fn call_api<T: for<'de> Deserialize<'de>>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
    ) -> Result<T, TradeError> {
        let query_string = Self::query_string(query);
        let body_string = body.map(Value::to_string).unwrap_or_default();

        // Delta signs: method + timestamp + path + query_string + body
        let timestamp = Self::timestamp();
        let to_sign = format!("{}{}{}{}{}", method.as_str(), timestamp, path, query_string, body_string);
        let signature = self.sign_payload(&to_sign);

        let url = self
            .base_url
            .join(&format!("{path}{query_string}"))
            .map_err(|e| TradeError::Decode(format!("invalid request url {path}: {e}")))?;

        let mut req = self
            .client
            .request(method.clone(), url)
            .header("api-key", &self.api_key)
            .header("timestamp", timestamp)
            .header("signature", signature);
        if body.is_some() {
            req = req
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body_string);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        debug!("{} {} -> {} ({} bytes)", method, path, status, bytes.len());

        decode_envelope(method.as_str(), path, status.as_u16(), &bytes)
    }

    async fn get_ticker(&self, symbol: &str) -> Result<TickerEntry, TradeError> {
        self.call_api(Method::GET, &format!("/v2/tickers/{symbol}"), None, None)
            .await
    }

    async fn get_option_tickers(
        &self,
        underlying: &str,
        expiry: Option<Expiry>,
    ) -> Result<Vec<TickerEntry>, TradeError> {
        let expiry_str = expiry.map(|e| e.to_string());
        let mut query: Vec<(&str, &str)> = vec![
            ("contract_types", OPTION_CONTRACT_TYPES),
            ("underlying_asset_symbols", underlying),
        ];
        if let Some(ref e) = expiry_str {
            query.push(("expiry_date", e.as_str()));
        }
        self.call_api(Method::GET, "/v2/tickers", Some(&query), None)
            .await
    }
}

/// Unpack the `{success, result, error}` envelope or say precisely why
/// it could not be unpacked.
fn decode_envelope<T: for<'de> Deserialize<'de>>(
    method: &str,
    path: &str,
    status: u16,
    bytes: &[u8],
) -> Result<T, TradeError> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let api: ApiResponse<T> = serde_path_to_error::deserialize(&mut de)
        .map_err(|e| TradeError::Decode(format!("{method} {path} (http {status}): {e}")))?;

    if api.success {
        api.result
            .ok_or_else(|| TradeError::Decode(format!("{method} {path}: success without result")))
    } else {
        let (code, context) = match api.error {
            Some(err) => (
                err.code.unwrap_or_else(|| format!("http {status}")),
                err.context.map(|c| c.to_string()),
            ),
            None => (format!("http {status}"), None),
        };
        Err(TradeError::rejected(code, context))
    }
}

fn expiries_from_tickers(tickers: &[TickerEntry]) -> Vec<Expiry> {
    let dates: BTreeSet<Expiry> = tickers
        .iter()
        .filter_map(|t| Expiry::from_option_symbol(&t.symbol))
        .collect();
    dates.into_iter().collect()
}

fn chain_from_tickers(tickers: Vec<TickerEntry>) -> OptionChain {
    let mut chain = OptionChain::default();
    for ticker in tickers {
        let Some(contract_type) = ticker.contract_type.as_deref().and_then(ContractType::from_api)
        else {
            continue;
        };
        let (Some(strike), Some(product_id)) = (ticker.strike_price, ticker.product_id) else {
            continue;
        };
        let quotes = ticker.quotes.unwrap_or_default();
        let contract = OptionContract {
            symbol: ticker.symbol,
            product_id,
            contract_type,
            strike,
            mark_price: ticker.mark_price,
            best_bid: quotes.best_bid,
            best_ask: quotes.best_ask,
        };
        match contract_type {
            ContractType::Call => chain.calls.push(contract),
            ContractType::Put => chain.puts.push(contract),
        }
    }
    chain.calls.sort_by_key(|c| c.strike);
    chain.puts.sort_by_key(|c| c.strike);
    chain
}

#[async_trait::async_trait]
impl Exchange for Delta {
    /// GET /v2/products, the cheapest authenticated round trip.
    async fn check_connection(&mut self) -> Result<(), TradeError> {
        let _: Value = self
            .call_api(Method::GET, "/v2/products", Some(&[("page_size", "1")]), None)
            .await?;
        Ok(())
    }

    /// GET /v2/tickers/{symbol}; `spot_price` with `mark_price` fallback.
    async fn get_spot_price(&self, symbol: &str) -> Result<Decimal, TradeError> {
        let ticker = self.get_ticker(symbol).await.map_err(|e| match e {
            TradeError::ExchangeRejected { .. } => TradeError::NoQuote(symbol.to_string()),
            other => other,
        })?;
        ticker
            .spot_price
            .or(ticker.mark_price)
            .ok_or_else(|| TradeError::NoQuote(symbol.to_string()))
    }

    /// Distinct expiry dates of all listed option series, soonest first.
    async fn list_expiries(&self, underlying: &str) -> Result<Vec<Expiry>, TradeError> {
        let tickers = self.get_option_tickers(underlying, None).await?;
        Ok(expiries_from_tickers(&tickers))
    }

    async fn get_option_chain(
        &self,
        underlying: &str,
        expiry: Expiry,
    ) -> Result<OptionChain, TradeError> {
        let tickers = self.get_option_tickers(underlying, Some(expiry)).await?;
        Ok(chain_from_tickers(tickers))
    }

    /// POST /v2/orders, always `market_order`, single attempt.
    async fn place_market_order(&self, request: &OrderRequest) -> Result<Order, TradeError> {
        let payload = serde_json::to_value(OrderPayload::from_request(request))
            .map_err(|e| TradeError::Decode(format!("order payload: {e}")))?;
        self.call_api(Method::POST, "/v2/orders", None, Some(&payload))
            .await
    }

    /// GET /v2/positions; read-only, display only.
    async fn get_positions(&self) -> Result<Vec<Position>, TradeError> {
        self.call_api(Method::GET, "/v2/positions", None, None).await
    }
}
