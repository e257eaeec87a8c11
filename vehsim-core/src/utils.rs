//! Module containing miscellaneous utility functions.

/// Returns true if `val1` and `val2` are within a relative/absolute `epsilon` of each other,
/// depending on magnitude.  
pub fn almost_eq(val1: f64, val2: f64, epsilon: Option<f64>) -> bool {
    let epsilon = epsilon.unwrap_or(1e-8);
    ((val2 - val1) / (val1 + val2)).abs() < epsilon || (val2 - val1).abs() < epsilon
}

/// Arithmetic mean of `vals`, `None` if empty
pub fn mean<I: IntoIterator<Item = f64>>(vals: I) -> Option<f64> {
    let (sum, n) = vals
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Running sums of `vals`
pub fn cumsum<I: IntoIterator<Item = f64>>(vals: I) -> Vec<f64> {
    vals.into_iter()
        .scan(0.0, |acc, x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}
