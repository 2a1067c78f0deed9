//! Delta Exchange public REST client.
//!
//! Read-only market data:
//! - Perpetual futures tickers (funding rate, mark price, volume)
//! - Per-product specs (funding settlement interval)

use crate::config::ExchangeConfig;
use crate::error::AlertError;
use crate::exchange::types::*;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Delta Exchange API client. One instance is reused for every call in a run.
#[derive(Debug, Clone)]
pub struct DeltaClient {
    http: Client,
    base_url: String,
    contract_types: String,
}

impl DeltaClient {
    /// Create a new client from configuration.
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid User-Agent header")?,
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            contract_types: config.contract_types.clone(),
        })
    }

    /// Create a client pointed at a custom base URL with default settings.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let config = ExchangeConfig {
            base_url: base_url.to_string(),
            ..ExchangeConfig::default()
        };
        Self::new(&config)
    }

    /// Fetch all perpetual futures tickers.
    ///
    /// Malformed entries and entries without a parseable funding rate are
    /// dropped; transport and API failures are returned as `Network` / `Api`
    /// errors.
    #[instrument(skip(self), name = "delta_get_tickers")]
    pub async fn get_perpetual_tickers(&self) -> Result<Vec<ContractSnapshot>, AlertError> {
        let url = format!("{}/v2/tickers", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("contract_types", self.contract_types.as_str())])
            .send()
            .await
            .map_err(|e| AlertError::from_transport("Failed to fetch tickers", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AlertError::Api(format!(
                "Delta tickers returned {}: {}",
                status,
                truncate(&body, 200)
            )));
        }

        // Decoded per entry: a malformed record drops only itself.
        let body: ApiResponse<Vec<Value>> = response
            .json()
            .await
            .map_err(|e| decode_error("Failed to parse tickers response", e))?;

        if !body.success {
            return Err(AlertError::Api(
                "Delta tickers response did not report success".to_string(),
            ));
        }

        let raw = body.result.unwrap_or_default();
        let total = raw.len();

        let contracts: Vec<ContractSnapshot> = raw
            .into_iter()
            .filter_map(|entry| match parse_ticker(entry) {
                Ok(c) => Some(c),
                Err(reason) => {
                    debug!(%reason, "Dropping ticker");
                    None
                }
            })
            .collect();

        info!(
            total,
            parsed = contracts.len(),
            dropped = total - contracts.len(),
            "Fetched perpetual tickers"
        );

        Ok(contracts)
    }

    /// Fetch product details for a symbol.
    #[instrument(skip(self), name = "delta_get_product")]
    pub async fn get_product(&self, symbol: &str) -> Result<Product, AlertError> {
        let url = format!(
            "{}/v2/products/{}",
            self.base_url,
            urlencoding::encode(symbol)
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AlertError::from_transport("Failed to fetch product", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AlertError::Api(format!(
                "Delta product {} returned {}",
                symbol, status
            )));
        }

        let body: ApiResponse<Product> = response
            .json()
            .await
            .map_err(|e| decode_error("Failed to parse product response", e))?;

        match body.result {
            Some(product) if body.success => Ok(product),
            _ => Err(AlertError::Api(format!(
                "Delta product {} response did not report success",
                symbol
            ))),
        }
    }
}

fn parse_ticker(entry: Value) -> Result<ContractSnapshot, AlertError> {
    let raw: RawTicker = serde_json::from_value(entry)
        .map_err(|e| AlertError::Parse(format!("malformed ticker: {}", e)))?;
    ContractSnapshot::try_from(raw)
}

/// Body read failures: a timeout mid-body is still a network failure.
fn decode_error(context: &str, err: reqwest::Error) -> AlertError {
    if err.is_timeout() {
        AlertError::from_transport(context, err)
    } else {
        AlertError::Api(format!("{}: {}", context, err))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_perpetual_tickers_parses_and_drops() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/tickers"))
            .and(query_param("contract_types", "perpetual_futures"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "result": [
                    { "symbol": "BTCUSD", "funding_rate": "0.05", "mark_price": "65000", "volume": 10 },
                    { "symbol": "ETHUSD", "funding_rate": -0.12 },
                    { "symbol": "BADUSD", "funding_rate": "n/a" },
                    { "symbol": "NULLUSD", "funding_rate": null },
                    { "funding_rate": "0.3" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DeltaClient::with_base_url(&server.uri()).unwrap();
        let tickers = client.get_perpetual_tickers().await.unwrap();

        assert_eq!(tickers.len(), 2);
        assert_eq!(tickers[0].symbol, "BTCUSD");
        assert_eq!(tickers[0].mark_price, Some(dec!(65000)));
        assert_eq!(tickers[1].funding_rate, dec!(-0.12));
        assert_eq!(tickers[1].mark_price, None);
    }

    #[tokio::test]
    async fn test_malformed_entries_do_not_fail_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/tickers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "result": [
                    { "symbol": "ETHUSD", "funding_rate": "-0.12" },
                    null,
                    { "symbol": 42, "funding_rate": "0.3" },
                    "SOLUSD",
                    { "symbol": "SOLUSD", "funding_rate": "0.09", "mark_price": ["150"] }
                ]
            })))
            .mount(&server)
            .await;

        let client = DeltaClient::with_base_url(&server.uri()).unwrap();
        let tickers = client.get_perpetual_tickers().await.unwrap();

        let symbols: Vec<&str> = tickers.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["ETHUSD", "SOLUSD"]);
        assert_eq!(tickers[1].mark_price, None);
    }

    #[test]
    fn test_parse_ticker_reports_parse_error() {
        let err = parse_ticker(json!(null)).unwrap_err();
        assert_eq!(err.kind(), "ParseError");

        let err = parse_ticker(json!({ "symbol": "XUSD", "funding_rate": "n/a" })).unwrap_err();
        assert!(matches!(err, AlertError::Parse(_)));
    }

    #[tokio::test]
    async fn test_body_timeout_is_network_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        // Headers arrive promptly, the body never completes.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"success\": true, ",
                )
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let config = ExchangeConfig {
            base_url: format!("http://{}", addr),
            timeout_secs: 1,
            ..ExchangeConfig::default()
        };
        let client = DeltaClient::new(&config).unwrap();
        let err = client.get_perpetual_tickers().await.unwrap_err();
        assert!(matches!(err, AlertError::Network(_)), "got {:?}", err);

        server.abort();
    }

    #[tokio::test]
    async fn test_get_perpetual_tickers_error_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/tickers"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = DeltaClient::with_base_url(&server.uri()).unwrap();
        let err = client.get_perpetual_tickers().await.unwrap_err();
        assert!(matches!(err, AlertError::Api(_)));
    }

    #[tokio::test]
    async fn test_get_perpetual_tickers_without_success_flag_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/tickers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
            .mount(&server)
            .await;

        let client = DeltaClient::with_base_url(&server.uri()).unwrap();
        let err = client.get_perpetual_tickers().await.unwrap_err();
        assert!(matches!(err, AlertError::Api(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Port 9 (discard) on localhost is not listening in test environments.
        let client = DeltaClient::with_base_url("http://127.0.0.1:9").unwrap();
        let err = client.get_perpetual_tickers().await.unwrap_err();
        assert!(matches!(err, AlertError::Network(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_get_product() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/products/ETHUSD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "result": {
                    "symbol": "ETHUSD",
                    "product_specs": { "rate_exchange_interval": 14400 }
                }
            })))
            .mount(&server)
            .await;

        let client = DeltaClient::with_base_url(&server.uri()).unwrap();
        let product = client.get_product("ETHUSD").await.unwrap();
        assert_eq!(product.funding_interval_hours(), Some(4));

        let missing = client.get_product("SOLUSD").await.unwrap_err();
        assert!(matches!(missing, AlertError::Api(_)));
    }
}
