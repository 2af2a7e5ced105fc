//! Touch and swipe signal aggregation

use crate::config::BiometricNormalizers;
use crate::stress::types::BiometricData;

/// Aggregate biometric proxies with the default normalizers
pub fn aggregate_biometrics(data: &BiometricData) -> f64 {
    aggregate_biometrics_with(data, &BiometricNormalizers::default())
}

/// Aggregate biometric proxies into a single [0,1] value
///
/// Formula: `mean(clamp(avg(pressure) / p), clamp(avg(duration) / d), clamp(avg(velocity) / v))`
/// An empty sequence contributes 0.
pub fn aggregate_biometrics_with(data: &BiometricData, normalizers: &BiometricNormalizers) -> f64 {
    let pressure = normalized_mean(&data.touch_pressure, normalizers.pressure_divisor);
    let duration = normalized_mean(&data.touch_duration, normalizers.duration_divisor);
    let velocity = normalized_mean(&data.swipe_velocity, normalizers.velocity_divisor);

    ((pressure + duration + velocity) / 3.0).clamp(0.0, 1.0)
}

fn normalized_mean(samples: &[f64], divisor: f64) -> f64 {
    if divisor <= 0.0 || !divisor.is_finite() {
        return 0.0;
    }
    match finite_mean(samples) {
        Some(mean) => (mean / divisor).clamp(0.0, 1.0),
        None => 0.0,
    }
}

/// Mean of the finite samples, `None` when there are none
fn finite_mean(samples: &[f64]) -> Option<f64> {
    let (sum, count) = samples
        .iter()
        .filter(|s| s.is_finite())
        .fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
