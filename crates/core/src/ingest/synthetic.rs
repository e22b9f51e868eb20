use crate::ingest::provider::{FinancialDataProvider, DEFAULT_RISK_FREE_RATE_PCT};
use crate::ingest::types::AnnualStatement;
use anyhow::Result;

const FIRST_YEAR: i32 = 2015;
const CASH_BALANCE: f64 = 500.0;

const PAT: [f64; 10] = [100.0, 110.0, 120.0, 115.0, 125.0, 130.0, 140.0, 135.0, 145.0, 150.0];
const CFO: [f64; 10] = [95.0, 105.0, 118.0, 112.0, 122.0, 128.0, 138.0, 133.0, 143.0, 148.0];
const EBITDA: [f64; 10] = [150.0, 160.0, 170.0, 165.0, 175.0, 180.0, 190.0, 185.0, 195.0, 200.0];
const DEPRECIATION: [f64; 10] = [20.0, 20.0, 21.0, 21.0, 22.0, 22.0, 23.0, 23.0, 24.0, 24.0];
const SALES: [f64; 10] = [
    1000.0, 1050.0, 1100.0, 1080.0, 1150.0, 1200.0, 1250.0, 1220.0, 1300.0, 1350.0,
];
const CAPEX: [f64; 10] = [30.0, 32.0, 35.0, 33.0, 38.0, 40.0, 42.0, 41.0, 45.0, 48.0];

/// Fixed ten-year history served when no real provider is reachable, so an
/// analysis can always run. Every company gets the same numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticProvider;

impl SyntheticProvider {
    pub fn statements() -> Vec<AnnualStatement> {
        (0..PAT.len())
            .map(|i| AnnualStatement {
                calendar_year: FIRST_YEAR + i as i32,
                net_income: PAT[i],
                operating_cash_flow: CFO[i],
                ebitda: EBITDA[i],
                depreciation_and_amortization: DEPRECIATION[i],
                revenue: SALES[i],
                // Outflow, as providers report it.
                capital_expenditure: -CAPEX[i],
                cash_and_cash_equivalents: CASH_BALANCE,
                interest_income: None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl FinancialDataProvider for SyntheticProvider {
    fn provider_name(&self) -> &'static str {
        "synthetic"
    }

    async fn fetch_statements(&self, company_id: &str, _years: usize) -> Result<Vec<AnnualStatement>> {
        tracing::debug!(company_id, "serving synthetic statements");
        Ok(Self::statements())
    }

    async fn fetch_risk_free_rate(&self) -> Result<f64> {
        Ok(DEFAULT_RISK_FREE_RATE_PCT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::FinancialRecord;

    #[test]
    fn synthetic_record_matches_fallback_series() {
        let record = FinancialRecord::from_statements(&SyntheticProvider::statements(), 10, 4.5);
        assert_eq!(record.pat(), &PAT);
        assert_eq!(record.cfo(), &CFO);
        assert_eq!(record.ebitda(), &EBITDA);
        assert_eq!(record.depreciation(), &DEPRECIATION);
        assert_eq!(record.sales(), &SALES);
        assert_eq!(record.capex(), &CAPEX);
        assert_eq!(record.cash_balance(), 500.0);
        assert_eq!(record.interest_income(), None);
    }

    #[tokio::test]
    async fn serves_the_same_history_for_any_company() {
        let provider = SyntheticProvider;
        let a = provider.fetch_statements("AAPL", 10).await.unwrap();
        let b = provider.fetch_statements("TCS.NS", 3).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(provider.fetch_risk_free_rate().await.unwrap(), 4.5);
    }
}
