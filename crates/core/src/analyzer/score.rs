//! Ratio-to-score bucketing. Scores run 1..=10, 10 being the best quality.

/// Score used when an input needed for a score is unknown.
pub const NEUTRAL_SCORE: u8 = 5;

// Upper bounds (exclusive) for accrual ratios, best bucket first.
const ACCRUAL_BUCKETS: [f64; 9] = [0.05, 0.10, 0.15, 0.20, 0.25, 0.30, 0.35, 0.40, 0.45];

// Lower bounds (inclusive) for actual/expected cash earnings, best bucket first.
const CASH_EARNING_BUCKETS: [f64; 8] = [3.0, 2.5, 2.0, 1.5, 1.2, 1.0, 0.8, 0.5];

/// Lower accrual ratio means more of the profit is cash-backed.
pub fn accrual_ratio_score(accrual_ratio: f64) -> u8 {
    ACCRUAL_BUCKETS
        .iter()
        .position(|upper| accrual_ratio < *upper)
        .map(|idx| 10 - idx as u8)
        .unwrap_or(1)
}

/// Scores actual cash earnings relative to what the risk-free rate would have paid.
pub fn earning_ratio_score(earning_ratio: f64) -> u8 {
    if let Some(idx) = CASH_EARNING_BUCKETS
        .iter()
        .position(|lower| earning_ratio >= *lower)
    {
        return 10 - idx as u8;
    }
    if earning_ratio > 0.0 {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accrual_buckets_at_boundaries() {
        assert_eq!(accrual_ratio_score(0.0), 10);
        assert_eq!(accrual_ratio_score(0.0499), 10);
        assert_eq!(accrual_ratio_score(0.05), 9);
        assert_eq!(accrual_ratio_score(0.149), 8);
        assert_eq!(accrual_ratio_score(0.20), 6);
        assert_eq!(accrual_ratio_score(0.30), 4);
        assert_eq!(accrual_ratio_score(0.44), 2);
        assert_eq!(accrual_ratio_score(0.45), 1);
        assert_eq!(accrual_ratio_score(3.0), 1);
    }

    #[test]
    fn cash_earning_buckets_at_boundaries() {
        assert_eq!(earning_ratio_score(4.0), 10);
        assert_eq!(earning_ratio_score(3.0), 10);
        assert_eq!(earning_ratio_score(2.99), 9);
        assert_eq!(earning_ratio_score(2.0), 8);
        assert_eq!(earning_ratio_score(1.5), 7);
        assert_eq!(earning_ratio_score(1.2), 6);
        assert_eq!(earning_ratio_score(1.0), 5);
        assert_eq!(earning_ratio_score(0.8), 4);
        assert_eq!(earning_ratio_score(0.5), 3);
        assert_eq!(earning_ratio_score(0.01), 2);
        assert_eq!(earning_ratio_score(0.0), 1);
        assert_eq!(earning_ratio_score(-0.3), 1);
    }
}
