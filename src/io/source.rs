//! Remote payload source - HTTP fetch boundary
//!
//! The endpoint is a spreadsheet-backed web app whose response wrapping and
//! tab naming are both unreliable. Everything here degrades to
//! `Payload::Empty` instead of failing: transport errors, BOM-prefixed
//! bodies, malformed JSON and unknown shapes all yield "no rows".

use crate::domain::types::Payload;
use crate::infra::config::Config;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Opaque fetch boundary - returns the raw response body for one query string
#[async_trait]
pub trait PayloadSource: Send + Sync {
    async fn fetch_body(&self, query: &str) -> anyhow::Result<String>;
}

/// HTTP implementation of the fetch boundary
pub struct HttpSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSource {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.fetch_timeout_ms()))
            .build()?;
        Ok(Self { client, endpoint: config.endpoint().to_string() })
    }
}

#[async_trait]
impl PayloadSource for HttpSource {
    async fn fetch_body(&self, query: &str) -> anyhow::Result<String> {
        // Cache-busting timestamp, same as the original endpoint contract
        let url =
            format!("{}?{}&_={}", self.endpoint, query, chrono::Utc::now().timestamp_millis());
        let body = self.client.get(&url).send().await?.text().await?;
        Ok(body)
    }
}

/// Parse a raw response body into a payload shape.
///
/// Strips a UTF-8 BOM prefix if present; malformed JSON is "no rows",
/// not an error.
pub fn parse_body(raw: &str) -> Payload {
    let cleaned = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    match serde_json::from_str::<serde_json::Value>(cleaned) {
        Ok(json) => Payload::from_json(json),
        Err(e) => {
            debug!(error = %e, "payload_parse_failed");
            Payload::Empty
        }
    }
}

/// Probe query variants in order, accepting the first that yields rows.
///
/// Transport failures on one variant are logged and the next variant is
/// tried; if every variant comes back empty the result is `Payload::Empty`.
pub async fn probe(source: &dyn PayloadSource, variants: &[String]) -> Payload {
    for query in variants {
        let body = match source.fetch_body(query).await {
            Ok(body) => body,
            Err(e) => {
                warn!(query = %query, error = %e, "payload_fetch_failed");
                continue;
            }
        };

        let payload = parse_body(&body);
        if !payload.is_empty() {
            info!(query = %query, rows = payload.len(), "payload_fetched");
            return payload;
        }
        debug!(query = %query, "payload_variant_empty");
    }

    warn!(variants = variants.len(), "payload_all_variants_empty");
    Payload::Empty
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StaticSource {
        bodies: HashMap<String, String>,
    }

    #[async_trait]
    impl PayloadSource for StaticSource {
        async fn fetch_body(&self, query: &str) -> anyhow::Result<String> {
            match self.bodies.get(query) {
                Some(body) => Ok(body.clone()),
                None => Err(anyhow::anyhow!("connection refused")),
            }
        }
    }

    #[test]
    fn test_parse_body_strips_bom() {
        let payload = parse_body("\u{feff}[[\"a\"]]");
        assert!(matches!(payload, Payload::Rows(ref rows) if rows.len() == 1));
    }

    #[test]
    fn test_parse_body_malformed_json() {
        assert_eq!(parse_body("<html>error</html>"), Payload::Empty);
        assert_eq!(parse_body(""), Payload::Empty);
    }

    #[tokio::test]
    async fn test_probe_takes_first_non_empty_variant() {
        let mut bodies = HashMap::new();
        bodies.insert("a=1".to_string(), "[]".to_string());
        bodies.insert("a=2".to_string(), r#"[["大和市","A駅","X","AA-1","standby"]]"#.to_string());
        bodies.insert("a=3".to_string(), r#"[["should","not","reach"]]"#.to_string());
        let source = StaticSource { bodies };

        let variants: Vec<String> =
            ["a=0", "a=1", "a=2", "a=3"].iter().map(|s| s.to_string()).collect();
        let payload = probe(&source, &variants).await;
        match payload {
            Payload::Rows(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0][0], "大和市");
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_all_failing_degrades_to_empty() {
        let source = StaticSource { bodies: HashMap::new() };
        let variants = vec!["a=1".to_string(), "a=2".to_string()];
        assert_eq!(probe(&source, &variants).await, Payload::Empty);
    }
}
