use serde::{Deserialize, Serialize};

/// Summary statistics of a series of measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub count: usize,
}

impl MetricStats {
    /// Compute statistics over `values`.
    ///
    /// # Returns
    /// `None` for an empty slice
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            mean,
            min,
            max,
            std_dev: population_std_dev(values, mean),
            count: values.len(),
        })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_has_no_stats() {
        assert!(MetricStats::from_values(&[]).is_none());
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn test_single_value() {
        let stats = MetricStats::from_values(&[-95.0]).unwrap();
        assert_eq!(stats.mean, -95.0);
        assert_eq!(stats.min, -95.0);
        assert_eq!(stats.max, -95.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn test_population_std_dev() {
        let stats = MetricStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_relative_eq!(stats.mean, 5.0);
        assert_relative_eq!(stats.std_dev, 2.0);
        assert_relative_eq!(stats.range(), 7.0);
    }
}
