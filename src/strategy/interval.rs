//! Funding interval lookup with per-run memoization.

use crate::exchange::DeltaClient;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Resolves funding settlement intervals (hours) per symbol.
///
/// Each distinct symbol is queried at most once per resolver; failed lookups
/// are cached as unknown too, so a flaky product endpoint is not retried
/// within the same run.
#[derive(Debug, Default)]
pub struct IntervalResolver {
    cache: HashMap<String, Option<u32>>,
}

impl IntervalResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Funding interval for `symbol` in hours, or `None` if unknown.
    pub async fn resolve(&mut self, client: &DeltaClient, symbol: &str) -> Option<u32> {
        if let Some(cached) = self.cache.get(symbol) {
            return *cached;
        }

        let hours = match client.get_product(symbol).await {
            Ok(product) => {
                let hours = product.funding_interval_hours();
                if hours.is_none() {
                    warn!(symbol, "🔎 [RESOLVE] Product has no usable funding interval");
                }
                hours
            }
            Err(e) => {
                warn!(symbol, error = %e, "🔎 [RESOLVE] Interval lookup failed");
                None
            }
        };

        debug!(symbol, ?hours, "Resolved funding interval");
        self.cache.insert(symbol.to_string(), hours);
        hours
    }

    #[cfg(test)]
    fn cached(&self, symbol: &str) -> Option<Option<u32>> {
        self.cache.get(symbol).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn product_body(seconds: u64) -> serde_json::Value {
        json!({
            "success": true,
            "result": { "product_specs": { "rate_exchange_interval": seconds } }
        })
    }

    #[tokio::test]
    async fn test_resolve_is_memoized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/products/ETHUSD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(product_body(28800)))
            .expect(1)
            .mount(&server)
            .await;

        let client = DeltaClient::with_base_url(&server.uri()).unwrap();
        let mut resolver = IntervalResolver::new();

        assert_eq!(resolver.resolve(&client, "ETHUSD").await, Some(8));
        assert_eq!(resolver.resolve(&client, "ETHUSD").await, Some(8));
        assert_eq!(resolver.cached("ETHUSD"), Some(Some(8)));
    }

    #[tokio::test]
    async fn test_failures_resolve_to_unknown_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/products/BADUSD"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/products/ZEROUSD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(product_body(0)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/products/FAILUSD"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": false })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = DeltaClient::with_base_url(&server.uri()).unwrap();
        let mut resolver = IntervalResolver::new();

        for symbol in ["BADUSD", "ZEROUSD", "FAILUSD"] {
            assert_eq!(resolver.resolve(&client, symbol).await, None);
            assert_eq!(resolver.resolve(&client, symbol).await, None);
            assert_eq!(resolver.cached(symbol), Some(None));
        }
        assert_eq!(resolver.cached("OTHER"), None);
    }
}
