use crate::domain::record::FinancialRecord;
use crate::ingest::provider::{FinancialDataProvider, DEFAULT_RISK_FREE_RATE_PCT};
use crate::ingest::synthetic::SyntheticProvider;
use crate::ingest::types::AnnualStatement;
use std::sync::Arc;

/// Statements together with the name of the provider that served them.
#[derive(Debug, Clone)]
pub struct SourcedStatements {
    pub source: &'static str,
    pub statements: Vec<AnnualStatement>,
}

#[derive(Debug, Clone)]
pub struct LoadedRecord {
    pub source: &'static str,
    pub record: FinancialRecord,
}

/// Tries the primary provider and substitutes the synthetic history on any
/// failure, so callers always get a record to analyse.
#[derive(Clone)]
pub struct FallbackProvider {
    primary: Option<Arc<dyn FinancialDataProvider>>,
    fallback: SyntheticProvider,
}

impl FallbackProvider {
    pub fn new(primary: Arc<dyn FinancialDataProvider>) -> Self {
        Self {
            primary: Some(primary),
            fallback: SyntheticProvider,
        }
    }

    pub fn synthetic_only() -> Self {
        Self {
            primary: None,
            fallback: SyntheticProvider,
        }
    }

    pub fn primary_name(&self) -> Option<&'static str> {
        self.primary.as_ref().map(|p| p.provider_name())
    }

    pub async fn fetch_with_source(&self, company_id: &str, years: usize) -> SourcedStatements {
        if let Some(primary) = &self.primary {
            match primary.fetch_statements(company_id, years).await {
                Ok(statements) => {
                    return SourcedStatements {
                        source: primary.provider_name(),
                        statements,
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        company_id,
                        provider = primary.provider_name(),
                        error = %format!("{err:#}"),
                        "statement fetch failed; using synthetic data"
                    );
                }
            }
        }

        SourcedStatements {
            source: self.fallback.provider_name(),
            statements: SyntheticProvider::statements(),
        }
    }

    pub async fn risk_free_rate(&self) -> f64 {
        if let Some(primary) = &self.primary {
            match primary.fetch_risk_free_rate().await {
                Ok(rate) => return rate,
                Err(err) => {
                    tracing::warn!(
                        provider = primary.provider_name(),
                        error = %format!("{err:#}"),
                        default = DEFAULT_RISK_FREE_RATE_PCT,
                        "risk-free rate fetch failed; using default"
                    );
                }
            }
        }
        DEFAULT_RISK_FREE_RATE_PCT
    }

    /// Fetches statements and builds a record of the newest `years`.
    /// `risk_free_rate` (percent) overrides the provider's rate when given.
    pub async fn load_record(
        &self,
        company_id: &str,
        years: usize,
        risk_free_rate: Option<f64>,
    ) -> LoadedRecord {
        let risk_free_rate = match risk_free_rate {
            Some(rate) => rate,
            None => self.risk_free_rate().await,
        };

        let sourced = self.fetch_with_source(company_id, years).await;
        let record = FinancialRecord::from_statements(&sourced.statements, years, risk_free_rate);

        tracing::info!(
            company_id,
            source = sourced.source,
            years = record.years(),
            risk_free_rate,
            "loaded financial record"
        );

        LoadedRecord {
            source: sourced.source,
            record,
        }
    }
}
