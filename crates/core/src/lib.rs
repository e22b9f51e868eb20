pub mod analyzer;
pub mod domain;
pub mod ingest;
pub mod report;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub data_provider_base_url: Option<String>,
        pub data_provider_api_key: Option<String>,
        /// Percent. Overrides whatever rate the provider reports.
        pub risk_free_rate_pct: Option<f64>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let risk_free_rate_pct = match std::env::var("RISK_FREE_RATE_PCT") {
                Ok(s) if !s.trim().is_empty() => Some(
                    s.trim()
                        .parse::<f64>()
                        .with_context(|| format!("RISK_FREE_RATE_PCT is not a number: {s}"))?,
                ),
                _ => None,
            };

            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                data_provider_base_url: std::env::var("DATA_PROVIDER_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
                data_provider_api_key: std::env::var("DATA_PROVIDER_API_KEY").ok(),
                risk_free_rate_pct,
            })
        }

        pub fn require_data_provider_base_url(&self) -> anyhow::Result<&str> {
            self.data_provider_base_url
                .as_deref()
                .context("DATA_PROVIDER_BASE_URL is required")
        }
    }
}

use crate::ingest::fallback::FallbackProvider;
use crate::ingest::provider::{HttpJsonFinancialsProvider, ProviderConfig};
use std::sync::Arc;

/// The HTTP provider wrapped in the synthetic fallback, or the synthetic
/// source alone when no provider is configured or `offline` is set.
pub fn build_provider(settings: &config::Settings, offline: bool) -> anyhow::Result<FallbackProvider> {
    if offline || settings.data_provider_base_url.is_none() {
        tracing::warn!(offline, "no data provider configured; analyses use synthetic data");
        return Ok(FallbackProvider::synthetic_only());
    }

    let config = ProviderConfig::from_settings(settings)?;
    let http = HttpJsonFinancialsProvider::new(config)?;
    Ok(FallbackProvider::new(Arc::new(http)))
}
