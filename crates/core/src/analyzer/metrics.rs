use crate::analyzer::score::{self, NEUTRAL_SCORE};
use crate::analyzer::stats::{cv_pct, mean, ratio_or, round_to};
use serde::{Deserialize, Serialize};

/// Length of a complete history; shorter ones carry a warning.
pub const FULL_HISTORY_YEARS: usize = 10;
pub const DEFAULT_CFO_EBITDA_THRESHOLD: f64 = 0.7;

const INSUFFICIENT_DATA: &str = "Insufficient data";
const SHORT_HISTORY: &str = "Only 3 years available";
const MISSING_INTEREST_INCOME: &str = "No interest income data provided";

// FCF generation is flagged past any of these.
const MAX_NEGATIVE_FCF_SHARE: f64 = 0.3;
const MAX_FCF_CV_PCT: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatVsCfo {
    pub value: f64,
    pub years: usize,
    pub warning: Option<String>,
}

/// Cumulative cash conversion: `sum(cfo) / sum(pat)` over every value of both series.
pub fn cumulative_pat_vs_cfo(pat: &[f64], cfo: &[f64]) -> PatVsCfo {
    if pat.is_empty() || cfo.is_empty() {
        return PatVsCfo {
            value: 0.0,
            years: 0,
            warning: Some(INSUFFICIENT_DATA.to_string()),
        };
    }

    let years = pat.len().min(cfo.len());
    let ratio = ratio_or(cfo.iter().sum(), pat.iter().sum(), 0.0);

    PatVsCfo {
        value: round_to(ratio, 3),
        years,
        warning: (years < FULL_HISTORY_YEARS).then(|| SHORT_HISTORY.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfoEbitdaConsistency {
    pub avg_cfo: f64,
    pub avg_ebitda: f64,
    pub ratio: f64,
    pub threshold: f64,
}

impl CfoEbitdaConsistency {
    pub fn meets_threshold(&self) -> bool {
        self.ratio >= self.threshold
    }
}

fn cfo_ebitda_means(cfo: &[f64], ebitda: &[f64]) -> Option<(f64, f64, f64)> {
    if cfo.is_empty() || ebitda.is_empty() {
        return None;
    }
    let avg_cfo = mean(cfo);
    let avg_ebitda = mean(ebitda);
    Some((avg_cfo, avg_ebitda, ratio_or(avg_cfo, avg_ebitda, 0.0)))
}

/// Ratio of average CFO to average EBITDA. `threshold` is carried on the result
/// for the caller to compare against; it does not affect the numbers.
pub fn cfo_ebitda_consistency(cfo: &[f64], ebitda: &[f64], threshold: f64) -> CfoEbitdaConsistency {
    let (avg_cfo, avg_ebitda, ratio) = cfo_ebitda_means(cfo, ebitda).unwrap_or((0.0, 0.0, 0.0));
    CfoEbitdaConsistency {
        avg_cfo: round_to(avg_cfo, 2),
        avg_ebitda: round_to(avg_ebitda, 2),
        ratio: round_to(ratio, 3),
        threshold,
    }
}

/// Bare ratio presentation of [`cfo_ebitda_consistency`].
pub fn cfo_ebitda_ratio(cfo: &[f64], ebitda: &[f64]) -> f64 {
    cfo_ebitda_means(cfo, ebitda).map_or(0.0, |(_, _, ratio)| round_to(ratio, 3))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualQuality {
    pub avg_pat: f64,
    pub avg_cfo: f64,
    pub avg_accruals: f64,
    pub accrual_ratio: f64,
}

struct AccrualStats {
    avg_pat: f64,
    avg_cfo: f64,
    avg_accruals: f64,
    accrual_ratio: f64,
}

fn accrual_stats(pat: &[f64], cfo: &[f64]) -> Option<AccrualStats> {
    if pat.is_empty() || cfo.is_empty() {
        return None;
    }

    let avg_pat = mean(pat);
    let accruals: Vec<f64> = pat.iter().zip(cfo).map(|(p, c)| p - c).collect();

    // A zero average profit leaves nothing to scale accruals against.
    let scaled: Vec<f64> = if avg_pat == 0.0 {
        Vec::new()
    } else {
        accruals.iter().map(|a| a.abs() / avg_pat).collect()
    };

    Some(AccrualStats {
        avg_pat,
        avg_cfo: mean(cfo),
        avg_accruals: mean(&accruals),
        accrual_ratio: mean(&scaled),
    })
}

/// Average accruals (`pat - cfo`) and the mean absolute accrual relative to average PAT.
pub fn accrual_quality(pat: &[f64], cfo: &[f64]) -> AccrualQuality {
    match accrual_stats(pat, cfo) {
        Some(stats) => AccrualQuality {
            avg_pat: round_to(stats.avg_pat, 2),
            avg_cfo: round_to(stats.avg_cfo, 2),
            avg_accruals: round_to(stats.avg_accruals, 2),
            accrual_ratio: round_to(stats.accrual_ratio, 4),
        },
        None => AccrualQuality {
            avg_pat: 0.0,
            avg_cfo: 0.0,
            avg_accruals: 0.0,
            accrual_ratio: 0.0,
        },
    }
}

/// 1..=10 score of the accrual ratio computed by [`accrual_quality`].
pub fn accrual_quality_score(pat: &[f64], cfo: &[f64]) -> u8 {
    let ratio = accrual_stats(pat, cfo).map_or(0.0, |stats| stats.accrual_ratio);
    score::accrual_ratio_score(ratio)
}

/// Coefficient of variation (%) of depreciation as a percentage of sales.
pub fn depreciation_volatility(depreciation: &[f64], sales: &[f64]) -> f64 {
    if depreciation.len() < 2 || sales.len() < 2 {
        return 0.0;
    }

    let ratios: Vec<f64> = depreciation
        .iter()
        .zip(sales)
        .map(|(dep, sales)| ratio_or(*dep, *sales, 0.0) * 100.0)
        .collect();

    round_to(cv_pct(&ratios), 2)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashEarningRate {
    pub cash_balance: f64,
    pub risk_free_rate: f64,
    pub expected_earnings: f64,
    pub actual_earnings: Option<f64>,
    pub earning_rate: Option<f64>,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashEarningScore {
    pub score: u8,
    pub warning: Option<String>,
}

struct CashEarnings {
    expected: f64,
    actual: Option<ActualCashEarnings>,
}

struct ActualCashEarnings {
    earnings: f64,
    rate_pct: f64,
    // actual / expected
    ratio: f64,
}

fn cash_earnings(cash_balance: f64, risk_free_rate_pct: f64, annual_earnings: Option<f64>) -> CashEarnings {
    let expected = cash_balance * risk_free_rate_pct / 100.0;
    let actual = annual_earnings.map(|earnings| ActualCashEarnings {
        earnings,
        rate_pct: ratio_or(earnings, cash_balance, 0.0) * 100.0,
        // Nothing expected means any earnings meet the expectation.
        ratio: ratio_or(earnings, expected, 1.0),
    });
    CashEarnings { expected, actual }
}

/// Compares what the cash balance earned against the risk-free benchmark.
///
/// `risk_free_rate_pct` is a percentage (4.5 means 4.5%). Without
/// `annual_earnings` the actual figures stay unknown and a warning is set.
pub fn cash_earning_rate(
    cash_balance: f64,
    risk_free_rate_pct: f64,
    annual_earnings: Option<f64>,
) -> CashEarningRate {
    let earnings = cash_earnings(cash_balance, risk_free_rate_pct, annual_earnings);
    let warning = earnings
        .actual
        .is_none()
        .then(|| MISSING_INTEREST_INCOME.to_string());

    CashEarningRate {
        cash_balance: round_to(cash_balance, 2),
        risk_free_rate: risk_free_rate_pct,
        expected_earnings: round_to(earnings.expected, 2),
        actual_earnings: earnings.actual.as_ref().map(|a| round_to(a.earnings, 2)),
        earning_rate: earnings.actual.as_ref().map(|a| round_to(a.rate_pct, 3)),
        warning,
    }
}

/// Score presentation of [`cash_earning_rate`]; unknown earnings score neutral.
pub fn cash_earning_score(
    cash_balance: f64,
    risk_free_rate_pct: f64,
    annual_earnings: Option<f64>,
) -> CashEarningScore {
    match cash_earnings(cash_balance, risk_free_rate_pct, annual_earnings).actual {
        Some(actual) => CashEarningScore {
            score: score::earning_ratio_score(actual.ratio),
            warning: None,
        },
        None => CashEarningScore {
            score: NEUTRAL_SCORE,
            warning: Some(MISSING_INTEREST_INCOME.to_string()),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcfQuality {
    pub avg_fcf: f64,
    pub volatility_cv: f64,
    pub negative_years: usize,
    pub total_years: usize,
    pub avg_cfo: f64,
    pub avg_capex: f64,
}

impl FcfQuality {
    fn empty() -> Self {
        Self {
            avg_fcf: 0.0,
            volatility_cv: 0.0,
            negative_years: 0,
            total_years: 0,
            avg_cfo: 0.0,
            avg_capex: 0.0,
        }
    }

    pub fn lacks_fcf_generation(&self) -> bool {
        let negative_share = ratio_or(self.negative_years as f64, self.total_years as f64, 0.0);
        negative_share > MAX_NEGATIVE_FCF_SHARE
            || self.volatility_cv > MAX_FCF_CV_PCT
            || self.avg_fcf < 0.0
    }

    /// "Yes" when the company lacks FCF generation, "No" otherwise.
    pub fn flag(&self) -> &'static str {
        if self.lacks_fcf_generation() {
            "Yes"
        } else {
            "No"
        }
    }
}

/// Free cash flow (`cfo - capex`) level, lumpiness and negative years.
///
/// Depreciation is accepted for call-site compatibility only: it is a non-cash
/// add-back already reflected in CFO, so it never enters FCF.
pub fn fcf_quality(cfo: &[f64], _depreciation: &[f64], capex: &[f64]) -> FcfQuality {
    if cfo.len() < 2 || capex.is_empty() {
        return FcfQuality::empty();
    }

    // A single paired year still counts; its CV is 0.
    let fcf: Vec<f64> = cfo.iter().zip(capex).map(|(c, x)| c - x).collect();

    FcfQuality {
        avg_fcf: round_to(mean(&fcf), 2),
        volatility_cv: round_to(cv_pct(&fcf), 2),
        negative_years: fcf.iter().filter(|v| **v < 0.0).count(),
        total_years: fcf.len(),
        avg_cfo: round_to(mean(cfo), 2),
        avg_capex: round_to(mean(capex), 2),
    }
}

/// Flag presentation of [`fcf_quality`].
pub fn fcf_generation_flag(cfo: &[f64], depreciation: &[f64], capex: &[f64]) -> &'static str {
    fcf_quality(cfo, depreciation, capex).flag()
}
