//! Small statistics kernels used by the pruning stages
//!
//! - [`mean`] of a bit window
//! - [`pearson`] correlation of two equal-length bit windows
//! - [`two_means`] 1-D k-means with k = 2

use crate::errors::TrackingError;

/// Arithmetic mean of 0/1 values, `0.0` for an empty slice
pub fn mean(bits: &[u8]) -> f64 {
    if bits.is_empty() {
        return 0.0;
    }
    bits.iter().map(|&b| b as f64).sum::<f64>() / bits.len() as f64
}

/// Pearson correlation coefficient of two equal-length series.
///
/// Returns `None` when the lengths differ, the series are empty, or either
/// series is constant (correlation undefined).
pub fn pearson(a: &[u8], b: &[u8]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let mean_a = mean(a);
    let mean_b = mean(b);

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x as f64 - mean_a;
        let dy = y as f64 - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a <= 0.0 || var_b <= 0.0 {
        return None;
    }
    Some(cov / (var_a * var_b).sqrt())
}

/// Result of a two-cluster split of scalar samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoMeans {
    /// Centre of the lower cluster
    pub low: f64,
    /// Centre of the upper cluster
    pub high: f64,
    /// Lloyd iterations performed
    pub iterations: usize,
}

impl TwoMeans {
    /// Decision boundary halfway between the two centres
    #[inline]
    pub fn cutoff(&self) -> f64 {
        0.5 * (self.low + self.high)
    }
}

/// Split scalar samples into two clusters with Lloyd's algorithm.
///
/// Centres start at the minimum and maximum sample, so the result is
/// deterministic and neither cluster can end up empty. Needs at least two
/// distinct finite values.
pub fn two_means(values: &[f64], max_iterations: usize) -> Result<TwoMeans, TrackingError> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();

    let (mut low, mut high) = finite
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if finite.len() < 2 || low >= high {
        let mut distinct = finite.clone();
        distinct.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        distinct.dedup();
        return Err(TrackingError::InsufficientData {
            required: 2,
            available: distinct.len(),
        });
    }

    let mut iterations = 0;
    while iterations < max_iterations {
        iterations += 1;
        let boundary = 0.5 * (low + high);

        let (mut sum_lo, mut n_lo, mut sum_hi, mut n_hi) = (0.0, 0usize, 0.0, 0usize);
        for &v in &finite {
            // Ties go to the lower cluster
            if v <= boundary {
                sum_lo += v;
                n_lo += 1;
            } else {
                sum_hi += v;
                n_hi += 1;
            }
        }

        let new_low = sum_lo / n_lo as f64;
        let new_high = sum_hi / n_hi as f64;
        let converged = new_low == low && new_high == high;
        low = new_low;
        high = new_high;
        if converged {
            break;
        }
    }

    Ok(TwoMeans {
        low,
        high,
        iterations,
    })
}
