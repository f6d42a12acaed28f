//! Per-cluster label histogram.
//!
//! Each cluster keeps a running average of how often each label lands in
//! it. The averages are an exponential moving average over reports and sum
//! to at most 1; the raw counts are kept alongside for diagnostics.

use gmix_core::types::MAX_LABELS;
use serde::Serialize;

/// Fixed-capacity label histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelHistogram {
    average: [f64; MAX_LABELS],
    count: [u32; MAX_LABELS],
    /// One past the highest label ever seen; bounds every scan.
    num_valid: usize,
}

impl LabelHistogram {
    pub fn new() -> Self {
        Self {
            average: [0.0; MAX_LABELS],
            count: [0; MAX_LABELS],
            num_valid: 0,
        }
    }

    /// Reset to a histogram holding only `label`.
    pub fn seed(&mut self, label: usize) {
        *self = Self::new();
        if label < MAX_LABELS {
            self.average[label] = 1.0;
            self.count[label] = 1;
            self.num_valid = label + 1;
        }
    }

    /// Record one more observation of `label`.
    ///
    /// Out-of-range labels are ignored; `Observation::validate` keeps them
    /// from reaching here.
    pub fn report(&mut self, label: usize, rate: f64) {
        if label >= MAX_LABELS {
            return;
        }
        for avg in self.average.iter_mut() {
            *avg *= 1.0 - rate;
        }
        self.average[label] += rate;
        self.count[label] = self.count[label].saturating_add(1);
        self.num_valid = self.num_valid.max(label + 1);

        let total = self.total();
        if total > 1.0 {
            for avg in self.average.iter_mut() {
                *avg /= total;
            }
        }
    }

    /// The two largest averages among the valid labels, as `(first, second)`.
    ///
    /// Single pass with strict comparisons: on ties the earlier label wins.
    pub fn top_two(&self) -> (f64, f64) {
        let mut first = self.average[0];
        let mut second = 0.0;
        for &check in self.average.iter().take(self.num_valid).skip(1) {
            if check > first {
                second = first;
                first = check;
            } else if check > second {
                second = check;
            }
        }
        (first, second)
    }

    pub fn average(&self, label: usize) -> f64 {
        self.average.get(label).copied().unwrap_or(0.0)
    }

    pub fn count(&self, label: usize) -> u32 {
        self.count.get(label).copied().unwrap_or(0)
    }

    pub fn num_valid(&self) -> usize {
        self.num_valid
    }

    /// Sum of all running averages; at most 1 after any report.
    pub fn total(&self) -> f64 {
        self.average.iter().sum()
    }
}

impl Default for LabelHistogram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_holds_a_single_label() {
        let mut h = LabelHistogram::new();
        h.seed(3);
        assert_eq!(h.average(3), 1.0);
        assert_eq!(h.count(3), 1);
        assert_eq!(h.num_valid(), 4);
        assert_eq!(h.total(), 1.0);
    }

    #[test]
    fn reseeding_clears_previous_labels() {
        let mut h = LabelHistogram::new();
        h.seed(1);
        h.report(2, 0.5);
        h.seed(0);
        assert_eq!(h.count(1), 0);
        assert_eq!(h.count(2), 0);
        assert_eq!(h.num_valid(), 1);
    }

    #[test]
    fn report_shifts_mass_and_keeps_total_bounded() {
        let mut h = LabelHistogram::new();
        h.seed(0);
        for _ in 0..50 {
            h.report(1, 0.1);
            assert!(h.total() <= 1.0 + 1e-12);
        }
        assert!(h.average(1) > h.average(0));
        assert_eq!(h.count(1), 50);
        assert_eq!(h.num_valid(), 2);
    }

    #[test]
    fn report_ignores_out_of_range_label() {
        let mut h = LabelHistogram::new();
        h.seed(0);
        let before = h.clone();
        h.report(MAX_LABELS, 0.1);
        assert_eq!(h, before);
    }

    #[test]
    fn top_two_scans_only_valid_labels() {
        let mut h = LabelHistogram::new();
        h.seed(0);
        h.report(2, 0.5);
        // averages: [0.5, 0.0, 0.5]; tie keeps label 0 first
        let (first, second) = h.top_two();
        assert!((first - 0.5).abs() < 1e-12);
        assert!((second - 0.5).abs() < 1e-12);

        h.report(2, 0.5);
        let (first, second) = h.top_two();
        assert!((first - 0.75).abs() < 1e-12);
        assert!((second - 0.25).abs() < 1e-12);
    }
}
