use crate::analyzer::{self, ProfitQualityAnalysis, DEFAULT_CFO_EBITDA_THRESHOLD};
use crate::domain::record::FinancialRecord;
use crate::ingest::fallback::FallbackProvider;
use anyhow::ensure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_YEARS: usize = 10;
pub const MAX_YEARS: usize = 30;

const RULE: &str = "========================================";

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub company_id: String,
    pub years: usize,
    /// Percent. `None` asks the provider.
    pub risk_free_rate: Option<f64>,
    pub cfo_ebitda_threshold: f64,
}

impl AnalysisRequest {
    pub fn new(company_id: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            years: DEFAULT_YEARS,
            risk_free_rate: None,
            cfo_ebitda_threshold: DEFAULT_CFO_EBITDA_THRESHOLD,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            !self.company_id.trim().is_empty(),
            "company_id must be non-empty"
        );
        ensure!(
            (1..=MAX_YEARS).contains(&self.years),
            "years must be 1..={MAX_YEARS} (got {})",
            self.years
        );
        if let Some(rate) = self.risk_free_rate {
            ensure!(
                rate.is_finite() && rate >= 0.0,
                "risk_free_rate must be a non-negative percentage (got {rate})"
            );
        }
        ensure!(
            self.cfo_ebitda_threshold.is_finite(),
            "cfo_ebitda_threshold must be a finite number (got {})",
            self.cfo_ebitda_threshold
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitQualityReport {
    pub company_id: String,
    pub generated_at: DateTime<Utc>,
    pub data_source: String,
    pub years: usize,
    pub risk_free_rate: f64,
    pub cfo_ebitda_threshold: f64,
    pub analysis: ProfitQualityAnalysis,
}

impl ProfitQualityReport {
    pub fn from_record(
        company_id: &str,
        data_source: &str,
        record: &FinancialRecord,
        cfo_ebitda_threshold: f64,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            company_id: company_id.trim().to_string(),
            generated_at,
            data_source: data_source.to_string(),
            years: record.years(),
            risk_free_rate: record.risk_free_rate(),
            cfo_ebitda_threshold,
            analysis: analyzer::analyze(record, cfo_ebitda_threshold),
        }
    }

    /// Plain-text rendering, one numbered section per metric.
    pub fn render_text(&self) -> String {
        let a = &self.analysis;
        let years = a.pat_vs_cfo.years;

        let mut lines = vec![
            "PROFIT QUALITY & ACCRUAL ANALYSIS REPORT".to_string(),
            format!("Company: {}", self.company_id),
            format!("Data Source: {}", self.data_source),
            format!("Risk-Free Rate: {:.2}%", self.risk_free_rate),
            format!("Data Period: {years} years"),
            RULE.to_string(),
            String::new(),
        ];

        if let Some(w) = &a.pat_vs_cfo.warning {
            lines.push(format!("WARNING: {w}"));
        }
        if let Some(w) = &a.cash_score.warning {
            lines.push(format!("WARNING: Cash Score: {w}"));
        }
        if !a.warnings().is_empty() {
            lines.push(String::new());
        }

        let verdict = if a.cfo_ebitda.meets_threshold() {
            "PASS"
        } else {
            "FAIL"
        };

        lines.extend([
            format!("1. CUMULATIVE PAT vs CFO RATIO ({years}Y):"),
            format!("   Value: {}", a.pat_vs_cfo.value),
            String::new(),
            "2. CFO/EBITDA CONSISTENCY RATIO:".to_string(),
            format!(
                "   Value: {} (threshold {}: {verdict})",
                a.cfo_ebitda.ratio, a.cfo_ebitda.threshold
            ),
            String::new(),
            "3. ACCRUAL PROFIT CONVERSION QUALITY (Score 1-10):".to_string(),
            format!("   Score: {}", a.accrual_score),
            format!("   Accrual Ratio: {}", a.accrual.accrual_ratio),
            "   (10 = Low Ratio/Better Quality | 1 = High Ratio/Worse Quality)".to_string(),
            String::new(),
            "4. DEPRECIATION VOLATILITY (as % of sales):".to_string(),
            format!("   Volatility: {}%", a.depreciation_volatility),
            String::new(),
            "5. COMPANY EARNINGS vs RISK-FREE RATE (Score 1-10):".to_string(),
            format!("   Score: {}", a.cash_score.score),
            "   (10 = Earning Much More than Risk-Free | 1 = Earning Less/Equal to Risk-Free)"
                .to_string(),
            String::new(),
            "6. LACK OF FCF GENERATION:".to_string(),
            format!("   Status: {}", a.fcf_flag()),
            "   (Note: FCF = CFO - Capex)".to_string(),
            String::new(),
            RULE.to_string(),
            "Analysis Complete".to_string(),
        ]);

        lines.join("\n")
    }
}

/// Loads the company's record (falling back to synthetic data) and analyses it.
pub async fn analyze_company(
    provider: &FallbackProvider,
    request: &AnalysisRequest,
) -> anyhow::Result<ProfitQualityReport> {
    request.validate()?;

    let company_id = request.company_id.trim();
    let loaded = provider
        .load_record(company_id, request.years, request.risk_free_rate)
        .await;

    Ok(ProfitQualityReport::from_record(
        company_id,
        loaded.source,
        &loaded.record,
        request.cfo_ebitda_threshold,
        Utc::now(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::synthetic::SyntheticProvider;
    use chrono::TimeZone;

    fn fallback_report() -> ProfitQualityReport {
        let record = FinancialRecord::from_statements(&SyntheticProvider::statements(), 10, 4.5);
        let generated_at = Utc.with_ymd_and_hms(2026, 1, 27, 10, 0, 0).unwrap();
        ProfitQualityReport::from_record(" AAPL ", "synthetic", &record, 0.7, generated_at)
    }

    #[test]
    fn renders_all_six_sections() {
        let text = fallback_report().render_text();
        assert!(text.starts_with("PROFIT QUALITY & ACCRUAL ANALYSIS REPORT"));
        assert!(text.contains("Company: AAPL\n"));
        assert!(text.contains("Risk-Free Rate: 4.50%"));
        assert!(text.contains("Data Period: 10 years"));
        assert!(text.contains("1. CUMULATIVE PAT vs CFO RATIO (10Y):\n   Value: 0.978"));
        assert!(text.contains("   Value: 0.702 (threshold 0.7: PASS)"));
        assert!(text.contains("3. ACCRUAL PROFIT CONVERSION QUALITY (Score 1-10):\n   Score: 10"));
        assert!(text.contains("5. COMPANY EARNINGS vs RISK-FREE RATE (Score 1-10):\n   Score: 5"));
        assert!(text.contains("   Status: No"));
        assert!(text.ends_with("Analysis Complete"));
    }

    #[test]
    fn renders_warnings_before_sections() {
        let text = fallback_report().render_text();
        let warning = text
            .find("WARNING: Cash Score: No interest income data provided")
            .unwrap();
        let first_section = text.find("1. CUMULATIVE").unwrap();
        assert!(warning < first_section);
        assert!(!text.contains("Only 3 years available"));
    }

    #[test]
    fn report_serializes_to_json() {
        let v = serde_json::to_value(fallback_report()).unwrap();
        assert_eq!(v["company_id"], "AAPL");
        assert_eq!(v["data_source"], "synthetic");
        assert_eq!(v["cfo_ebitda_threshold"], 0.7);
        assert_eq!(v["analysis"]["pat_vs_cfo"]["value"], 0.978);
        assert_eq!(v["analysis"]["fcf"]["negative_years"], 0);
        assert_eq!(v["analysis"]["lacks_fcf_generation"], false);
    }

    #[test]
    fn validate_rejects_bad_requests() {
        assert!(AnalysisRequest::new("AAPL").validate().is_ok());
        assert!(AnalysisRequest::new("  ").validate().is_err());

        let mut req = AnalysisRequest::new("AAPL");
        req.years = 0;
        assert!(req.validate().is_err());

        let mut req = AnalysisRequest::new("AAPL");
        req.risk_free_rate = Some(f64::NAN);
        assert!(req.validate().is_err());
    }

    #[tokio::test]
    async fn analyze_company_runs_offline() {
        let provider = FallbackProvider::synthetic_only();
        let mut req = AnalysisRequest::new("TCS.NS");
        req.years = 3;
        req.risk_free_rate = Some(4.5);

        let report = analyze_company(&provider, &req).await.unwrap();
        assert_eq!(report.company_id, "TCS.NS");
        assert_eq!(report.data_source, "synthetic");
        assert_eq!(report.years, 3);
        assert_eq!(
            report.analysis.pat_vs_cfo.warning.as_deref(),
            Some("Only 3 years available")
        );
    }
}
