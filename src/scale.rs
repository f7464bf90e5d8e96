/// Piecewise-constant lookup over sorted boundaries, one more range value
/// than boundaries. Bins are lower-inclusive: values below the first
/// boundary map to the first range value, values at or above the last
/// boundary map to the last.
#[derive(Debug, Clone)]
pub struct ThresholdScale<T> {
    domain: Vec<f64>,
    range: Vec<T>,
}

impl<T> ThresholdScale<T> {
    pub fn new(domain: Vec<f64>, range: Vec<T>) -> Self {
        debug_assert_eq!(range.len(), domain.len() + 1);
        debug_assert!(domain.windows(2).all(|w| w[0] < w[1]));
        ThresholdScale { domain, range }
    }

    pub fn get(&self, value: f64) -> &T {
        let idx = self.domain.partition_point(|boundary| *boundary <= value);
        &self.range[idx]
    }

    /// Index of the bin a value falls into.
    pub fn bin_index(&self, value: f64) -> usize {
        self.domain.partition_point(|boundary| *boundary <= value)
    }
}

/// Evenly stepped boundaries over [start, end], end included.
pub fn stepped_thresholds(start: f64, end: f64, step: f64) -> Vec<f64> {
    let count = ((end - start) / step).round() as usize;
    (0..=count).map(|i| start + i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_thresholds_cover_unit_interval() {
        let thresholds = stepped_thresholds(0.0, 1.0, 0.1);
        assert_eq!(thresholds.len(), 11);
        assert_eq!(thresholds[0], 0.0);
        assert_eq!(thresholds[10], 1.0);
    }

    #[test]
    fn bins_partition_the_domain() {
        // Interior boundaries only, as a 10-bin scale over [0, 1]
        let thresholds = stepped_thresholds(0.0, 1.0, 0.1);
        let interior = thresholds[1..thresholds.len() - 1].to_vec();
        let scale = ThresholdScale::new(interior, (0..10).collect());

        // Every probe value lands in exactly one bin; the top bin is closed
        assert_eq!(*scale.get(0.0), 0);
        assert_eq!(*scale.get(0.05), 0);
        assert_eq!(*scale.get(0.1), 1);
        assert_eq!(*scale.get(0.55), 5);
        assert_eq!(*scale.get(0.999), 9);
        assert_eq!(*scale.get(1.0), 9);
    }

    #[test]
    fn boundary_at_seven_tenths_is_pinned() {
        // 7 * 0.1 in f64 sits just above the real 0.7, so the f64 value
        // "0.7" (e.g. a clamped 0.6 + 0.1) stays in the [0.6, 0.7) bin.
        let thresholds = stepped_thresholds(0.0, 1.0, 0.1);
        let interior = thresholds[1..thresholds.len() - 1].to_vec();
        let scale = ThresholdScale::new(interior, (0..10).collect());

        let sum = 0.6 + 0.1;
        assert_eq!(scale.bin_index(sum), 6);
        assert_eq!(*scale.get(sum), 6);
    }

    #[test]
    fn stepped_scale_for_zoom_factors() {
        let scale = ThresholdScale::new(
            vec![1.0, 5.0, 10.0, 30.0],
            vec![1.0, 1.5, 2.0, 3.0, 5.0],
        );
        assert_eq!(*scale.get(0.5), 1.0);
        assert_eq!(*scale.get(1.0), 1.5);
        assert_eq!(*scale.get(7.2), 2.0);
        assert_eq!(*scale.get(100.0), 5.0);
        assert_eq!(*scale.get(f64::INFINITY), 5.0);
    }
}
