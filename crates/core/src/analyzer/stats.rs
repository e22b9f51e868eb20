/// Arithmetic mean. Empty input yields 0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation (n - 1 denominator). Fewer than two points yield 0.
pub fn stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Coefficient of variation in percent, 0 when the mean is 0.
pub fn cv_pct(values: &[f64]) -> f64 {
    let m = mean(values);
    if m == 0.0 {
        0.0
    } else {
        stdev(values) / m * 100.0
    }
}

/// `numerator / denominator`, or `fallback` when the denominator is 0.
pub fn ratio_or(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator == 0.0 {
        fallback
    } else {
        numerator / denominator
    }
}

/// Rounds to `places` decimals from the exact binary value, ties to even.
pub fn round_to(value: f64, places: usize) -> f64 {
    // Decimal formatting is correctly rounded, which scaling by 10^places is not.
    format!("{value:.places$}").parse().unwrap_or(value)
}
