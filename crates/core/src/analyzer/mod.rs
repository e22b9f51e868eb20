//! Profit quality metrics over yearly statement series (oldest first).
//!
//! Every function here is pure and total: degraded input (short series, zero
//! denominators, unknown interest income) yields a defined zero or neutral
//! result, usually with a warning, never an error.

pub mod metrics;
pub mod score;
pub mod stats;

pub use metrics::{
    accrual_quality, accrual_quality_score, cash_earning_rate, cash_earning_score,
    cfo_ebitda_consistency, cfo_ebitda_ratio, cumulative_pat_vs_cfo, depreciation_volatility,
    fcf_generation_flag, fcf_quality, AccrualQuality, CashEarningRate, CashEarningScore,
    CfoEbitdaConsistency, FcfQuality, PatVsCfo, DEFAULT_CFO_EBITDA_THRESHOLD, FULL_HISTORY_YEARS,
};

use crate::domain::record::FinancialRecord;
use serde::{Deserialize, Serialize};

/// All six metrics for one record, each in both of its presentations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitQualityAnalysis {
    pub pat_vs_cfo: PatVsCfo,
    pub cfo_ebitda: CfoEbitdaConsistency,
    pub accrual: AccrualQuality,
    pub accrual_score: u8,
    pub depreciation_volatility: f64,
    pub cash_earnings: CashEarningRate,
    pub cash_score: CashEarningScore,
    pub fcf: FcfQuality,
    pub lacks_fcf_generation: bool,
}

impl ProfitQualityAnalysis {
    /// Warnings raised by individual metrics, in report order.
    pub fn warnings(&self) -> Vec<&str> {
        [
            self.pat_vs_cfo.warning.as_deref(),
            self.cash_score.warning.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn fcf_flag(&self) -> &'static str {
        self.fcf.flag()
    }
}

pub fn analyze(record: &FinancialRecord, cfo_ebitda_threshold: f64) -> ProfitQualityAnalysis {
    let fcf = fcf_quality(record.cfo(), record.depreciation(), record.capex());
    let analysis = ProfitQualityAnalysis {
        pat_vs_cfo: cumulative_pat_vs_cfo(record.pat(), record.cfo()),
        cfo_ebitda: cfo_ebitda_consistency(record.cfo(), record.ebitda(), cfo_ebitda_threshold),
        accrual: accrual_quality(record.pat(), record.cfo()),
        accrual_score: accrual_quality_score(record.pat(), record.cfo()),
        depreciation_volatility: depreciation_volatility(record.depreciation(), record.sales()),
        cash_earnings: cash_earning_rate(
            record.cash_balance(),
            record.risk_free_rate(),
            record.interest_income(),
        ),
        cash_score: cash_earning_score(
            record.cash_balance(),
            record.risk_free_rate(),
            record.interest_income(),
        ),
        lacks_fcf_generation: fcf.lacks_fcf_generation(),
        fcf,
    };

    tracing::debug!(
        years = record.years(),
        pat_vs_cfo = analysis.pat_vs_cfo.value,
        accrual_score = analysis.accrual_score,
        cash_score = analysis.cash_score.score,
        "computed profit quality metrics"
    );

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::FinancialSeries;
    use crate::ingest::synthetic::SyntheticProvider;

    fn fallback_record() -> FinancialRecord {
        FinancialRecord::from_statements(&SyntheticProvider::statements(), 10, 4.5)
    }

    #[test]
    fn analyze_matches_individual_metrics() {
        let record = fallback_record();
        let analysis = analyze(&record, DEFAULT_CFO_EBITDA_THRESHOLD);

        assert_eq!(analysis.pat_vs_cfo, cumulative_pat_vs_cfo(record.pat(), record.cfo()));
        assert_eq!(analysis.pat_vs_cfo.value, 0.978);
        assert_eq!(analysis.cfo_ebitda.ratio, 0.702);
        assert!(analysis.cfo_ebitda.meets_threshold());
        assert_eq!(analysis.accrual_score, 10);
        assert_eq!(
            analysis.depreciation_volatility,
            depreciation_volatility(record.depreciation(), record.sales())
        );
        assert_eq!(analysis.cash_earnings.expected_earnings, 22.5);
        assert_eq!(analysis.cash_score.score, 5);
        assert_eq!(analysis.fcf.negative_years, 0);
        assert_eq!(analysis.fcf_flag(), "No");
        assert_eq!(
            analysis.fcf_flag(),
            fcf_generation_flag(record.cfo(), record.depreciation(), record.capex())
        );
    }

    #[test]
    fn warnings_surface_missing_interest_income() {
        let analysis = analyze(&fallback_record(), DEFAULT_CFO_EBITDA_THRESHOLD);
        assert_eq!(analysis.warnings(), vec!["No interest income data provided"]);
    }

    #[test]
    fn analyze_tolerates_an_empty_record() {
        let record = FinancialRecord::new(FinancialSeries::default(), 0.0, 4.5, None);
        let analysis = analyze(&record, DEFAULT_CFO_EBITDA_THRESHOLD);
        assert_eq!(analysis.pat_vs_cfo.years, 0);
        assert_eq!(analysis.cfo_ebitda.ratio, 0.0);
        assert_eq!(analysis.depreciation_volatility, 0.0);
        assert_eq!(analysis.fcf.total_years, 0);
        assert_eq!(analysis.warnings().len(), 2);
    }

    #[test]
    fn analyze_is_deterministic() {
        let record = fallback_record();
        assert_eq!(analyze(&record, 0.7), analyze(&record, 0.7));
    }
}
