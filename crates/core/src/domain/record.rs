use crate::ingest::types::AnnualStatement;
use serde::Serialize;

/// Parallel yearly series (oldest first) for one company plus the scalars the
/// cash metrics need. Built once per analysis and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialRecord {
    pat: Vec<f64>,
    cfo: Vec<f64>,
    ebitda: Vec<f64>,
    depreciation: Vec<f64>,
    sales: Vec<f64>,
    capex: Vec<f64>,
    cash_balance: f64,
    /// Percent, e.g. 4.5 for 4.5%.
    risk_free_rate: f64,
    interest_income: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct FinancialSeries {
    pub pat: Vec<f64>,
    pub cfo: Vec<f64>,
    pub ebitda: Vec<f64>,
    pub depreciation: Vec<f64>,
    pub sales: Vec<f64>,
    pub capex: Option<Vec<f64>>,
}

impl FinancialRecord {
    pub fn new(
        series: FinancialSeries,
        cash_balance: f64,
        risk_free_rate: f64,
        interest_income: Option<f64>,
    ) -> Self {
        let FinancialSeries {
            pat,
            cfo,
            ebitda,
            depreciation,
            sales,
            capex,
        } = series;

        // Missing or short capex cannot be paired with every CFO year.
        let capex = match capex {
            Some(capex) if capex.len() >= cfo.len() => capex,
            _ => vec![0.0; cfo.len()],
        };

        Self {
            pat,
            cfo,
            ebitda,
            depreciation,
            sales,
            capex,
            cash_balance,
            risk_free_rate,
            interest_income,
        }
    }

    /// Builds a record from provider statements in any order, keeping the
    /// newest `years`. Capex is taken as an absolute amount since providers
    /// report it as an outflow.
    pub fn from_statements(
        statements: &[AnnualStatement],
        years: usize,
        risk_free_rate: f64,
    ) -> Self {
        let mut sorted: Vec<&AnnualStatement> = statements.iter().collect();
        sorted.sort_by_key(|s| s.calendar_year);
        let skip = sorted.len().saturating_sub(years);
        let window = &sorted[skip..];

        let series = FinancialSeries {
            pat: window.iter().map(|s| s.net_income).collect(),
            cfo: window.iter().map(|s| s.operating_cash_flow).collect(),
            ebitda: window.iter().map(|s| s.ebitda).collect(),
            depreciation: window.iter().map(|s| s.depreciation_and_amortization).collect(),
            sales: window.iter().map(|s| s.revenue).collect(),
            capex: Some(window.iter().map(|s| s.capital_expenditure.abs()).collect()),
        };

        let latest = window.last();
        Self::new(
            series,
            latest.map_or(0.0, |s| s.cash_and_cash_equivalents),
            risk_free_rate,
            latest.and_then(|s| s.interest_income),
        )
    }

    pub fn pat(&self) -> &[f64] {
        &self.pat
    }

    pub fn cfo(&self) -> &[f64] {
        &self.cfo
    }

    pub fn ebitda(&self) -> &[f64] {
        &self.ebitda
    }

    pub fn depreciation(&self) -> &[f64] {
        &self.depreciation
    }

    pub fn sales(&self) -> &[f64] {
        &self.sales
    }

    pub fn capex(&self) -> &[f64] {
        &self.capex
    }

    pub fn cash_balance(&self) -> f64 {
        self.cash_balance
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn interest_income(&self) -> Option<f64> {
        self.interest_income
    }

    /// Number of years of CFO history, the series every metric leans on.
    pub fn years(&self) -> usize {
        self.cfo.len()
    }
}
