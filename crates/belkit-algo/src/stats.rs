//! Summary statistics for score distributions.
//!
//! Includes the D'Agostino–Pearson omnibus normality test. Like the rest of
//! the classical small-sample machinery here, it is computed directly from
//! the published transforms (D'Agostino 1970 for skewness, Anscombe & Glynn
//! 1983 for kurtosis); the omnibus statistic K² = Z₁² + Z₂² is χ²(2), whose
//! survival function has the closed form exp(−K²/2).

/// Minimum sample size for the normality test; the kurtosis z-transform is
/// not defined below this.
pub const MIN_NORMALITY_SAMPLES: usize = 8;

/// Arithmetic mean. Zero for an empty slice.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation (ddof = 0). Zero for an empty slice.
pub fn stddev(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    (xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64).sqrt()
}

/// Median of a sample. Zero for an empty slice.
pub fn median(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn central_moment(xs: &[f64], m: f64, order: i32) -> f64 {
    xs.iter().map(|x| (x - m).powi(order)).sum::<f64>() / xs.len() as f64
}

/// Two-sided p-value of the D'Agostino–Pearson omnibus normality test.
///
/// Returns `None` for samples smaller than [`MIN_NORMALITY_SAMPLES`] and for
/// zero-variance samples, where the statistic is undefined.
pub fn normality_p(xs: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n < MIN_NORMALITY_SAMPLES {
        return None;
    }
    let m = mean(xs);
    let m2 = central_moment(xs, m, 2);
    if m2 <= 0.0 {
        return None;
    }
    let g1 = central_moment(xs, m, 3) / m2.powf(1.5);
    let b2 = central_moment(xs, m, 4) / (m2 * m2);

    let z1 = skewness_z(n as f64, g1);
    let z2 = kurtosis_z(n as f64, b2);
    let k2 = z1 * z1 + z2 * z2;

    // χ²(2) survival function
    Some((-k2 / 2.0).exp())
}

/// Transformed skewness statistic Z₁(g₁), approximately standard normal
/// under the null (D'Agostino 1970).
fn skewness_z(n: f64, g1: f64) -> f64 {
    let y = g1 * (((n + 1.0) * (n + 3.0)) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    let y = if y == 0.0 { 1.0 } else { y };
    delta * (y / alpha + ((y / alpha) * (y / alpha) + 1.0).sqrt()).ln()
}

/// Transformed kurtosis statistic Z₂(b₂), approximately standard normal
/// under the null (Anscombe & Glynn 1983). `b2` is the non-excess kurtosis.
fn kurtosis_z(n: f64, b2: f64) -> f64 {
    let e = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 = 24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let x = (b2 - e) / var_b2.sqrt();

    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * ((6.0 * (n + 3.0) * (n + 5.0)) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());

    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return f64::INFINITY;
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    (term1 - term2) / (2.0 / (9.0 * a)).sqrt()
}
