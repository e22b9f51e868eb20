use crate::config::Settings;
use crate::ingest::error::ProviderHttpError;
use crate::ingest::types::{AnnualStatement, CompanyFinancialsResponse, RiskFreeRateResponse};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_COMPANY_PATH: &str = "/server/company/{company_id}";
const DEFAULT_RISK_FREE_PATH: &str = "/risk-free-rate";
const DEFAULT_RETRIES: u32 = 3;
const PROVIDER_NAME: &str = "external_http_json";

/// Used whenever no provider can supply a risk-free rate.
pub const DEFAULT_RISK_FREE_RATE_PCT: f64 = 4.5;

#[async_trait::async_trait]
pub trait FinancialDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Annual statements for `company_id`, at most `years` of them, in any order.
    async fn fetch_statements(&self, company_id: &str, years: usize) -> Result<Vec<AnnualStatement>>;

    /// Current risk-free rate in percent.
    async fn fetch_risk_free_rate(&self) -> Result<f64>;
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Must contain `{company_id}`.
    pub company_path: String,
    pub risk_free_path: String,
    pub timeout: Duration,
    pub retries: u32,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            company_path: DEFAULT_COMPANY_PATH.to_string(),
            risk_free_path: DEFAULT_RISK_FREE_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retries: DEFAULT_RETRIES,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut config = Self::new(settings.require_data_provider_base_url()?);
        config.api_key = settings.data_provider_api_key.clone();

        if let Some(secs) = std::env::var("DATA_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(retries) = std::env::var("DATA_PROVIDER_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
        {
            config.retries = retries;
        }

        if let Some(path) = std::env::var("DATA_PROVIDER_COMPANY_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
        {
            config.company_path = path;
        }

        if let Some(path) = std::env::var("DATA_PROVIDER_RISK_FREE_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
        {
            config.risk_free_path = path;
        }

        anyhow::ensure!(
            config.company_path.contains("{company_id}"),
            "DATA_PROVIDER_COMPANY_PATH must contain {{company_id}} (got {})",
            config.company_path
        );

        Ok(config)
    }

    fn url(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn company_url(&self, company_id: &str) -> String {
        self.url(&self.company_path.replace("{company_id}", company_id.trim()))
    }

    fn risk_free_url(&self) -> String {
        self.url(&self.risk_free_path)
    }
}

#[derive(Debug, Clone)]
pub struct HttpJsonFinancialsProvider {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl HttpJsonFinancialsProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build data provider http client")?;

        Ok(Self { http, config })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.config.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let res = self
            .http
            .get(url)
            .headers(self.headers()?)
            .query(query)
            .send()
            .await
            .context("data provider request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read provider response")?;

        if !status.is_success() {
            return Err(ProviderHttpError {
                provider: PROVIDER_NAME,
                stage: "http",
                detail: format!("status={status}"),
                raw_body: Some(text),
            }
            .into());
        }

        serde_json::from_str::<T>(&text).map_err(|err| {
            ProviderHttpError {
                provider: PROVIDER_NAME,
                stage: "decode",
                detail: err.to_string(),
                raw_body: Some(text),
            }
            .into()
        })
    }

    async fn with_retries<T, F, Fut>(&self, what: &'static str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
        T: Send,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.config.retries {
                        return Err(err);
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(attempt, what, ?backoff, error = %err, "data provider fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl FinancialDataProvider for HttpJsonFinancialsProvider {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_statements(&self, company_id: &str, years: usize) -> Result<Vec<AnnualStatement>> {
        anyhow::ensure!(!company_id.trim().is_empty(), "company_id must be non-empty");

        let url = self.config.company_url(company_id);
        let query = [("years", years.to_string())];
        let resp: CompanyFinancialsResponse = self
            .with_retries("statements", || self.get_json(&url, &query))
            .await
            .with_context(|| format!("failed to fetch statements for {company_id}"))?;

        validate(&resp, company_id)?;

        tracing::debug!(company_id, statements = resp.data.len(), "fetched provider statements");
        Ok(resp.data)
    }

    async fn fetch_risk_free_rate(&self) -> Result<f64> {
        let url = self.config.risk_free_url();
        let resp: RiskFreeRateResponse = self
            .with_retries("risk_free_rate", || self.get_json(&url, &[]))
            .await
            .context("failed to fetch risk-free rate")?;

        anyhow::ensure!(
            resp.rate.is_finite() && resp.rate >= 0.0,
            "provider risk-free rate must be a non-negative number (got {})",
            resp.rate
        );
        Ok(resp.rate)
    }
}

fn validate(resp: &CompanyFinancialsResponse, company_id: &str) -> Result<()> {
    if let Some(status) = resp.status.as_deref() {
        anyhow::ensure!(
            status.eq_ignore_ascii_case("ok") || status.eq_ignore_ascii_case("success"),
            "provider status for {company_id} is {status}"
        );
    }
    anyhow::ensure!(
        !resp.data.is_empty(),
        "provider returned no statements for {company_id}"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_urls_from_config() {
        let mut config = ProviderConfig::new("https://data.example.com/");
        assert_eq!(
            config.company_url(" TCS.NS "),
            "https://data.example.com/server/company/TCS.NS"
        );
        assert_eq!(config.risk_free_url(), "https://data.example.com/risk-free-rate");

        config.company_path = "api/companies/{company_id}/financials".to_string();
        assert_eq!(
            config.company_url("AAPL"),
            "https://data.example.com/api/companies/AAPL/financials"
        );
    }

    #[test]
    fn validate_accepts_ok_status_with_data() {
        let v = json!({
            "status": "OK",
            "data": [{"calendarYear": "2023", "netIncome": 1.0}]
        });
        let resp: CompanyFinancialsResponse = serde_json::from_value(v).unwrap();
        assert!(validate(&resp, "TCS.NS").is_ok());
    }

    #[test]
    fn validate_rejects_error_status_and_empty_data() {
        let failed: CompanyFinancialsResponse = serde_json::from_value(json!({
            "status": "error",
            "data": [{"calendarYear": 2023}]
        }))
        .unwrap();
        assert!(validate(&failed, "TCS.NS").is_err());

        let empty: CompanyFinancialsResponse =
            serde_json::from_value(json!({"status": "ok", "data": []})).unwrap();
        assert!(validate(&empty, "TCS.NS").is_err());
    }

    #[test]
    fn api_key_is_sent_as_header() {
        let mut config = ProviderConfig::new("https://data.example.com");
        config.api_key = Some("secret".to_string());
        let provider = HttpJsonFinancialsProvider::new(config).unwrap();
        let headers = provider.headers().unwrap();
        assert_eq!(headers.get("x-api-key").unwrap(), "secret");
    }

    #[tokio::test]
    async fn retries_until_exhausted() {
        let mut config = ProviderConfig::new("https://data.example.com");
        config.retries = 1;
        let provider = HttpJsonFinancialsProvider::new(config).unwrap();

        let mut calls = 0;
        let res: Result<()> = provider
            .with_retries("test", || {
                calls += 1;
                async { Err(anyhow::anyhow!("boom")) }
            })
            .await;
        assert!(res.is_err());
        assert_eq!(calls, 1);
    }
}
