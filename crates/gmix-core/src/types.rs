//! Shared types fed into a mixture model.

use crate::error::{GmixError, ObservationError, Result};
use crate::linalg::Vec2;
use serde::{Deserialize, Serialize};

/// Capacity of each cluster's label histogram. Labels must be below this.
pub const MAX_LABELS: usize = 16;

/// One observation of the input space, tagged with a discrete label.
///
/// The input vector is `(density, thresh)`. The regression target travels
/// alongside as a separate `Vec2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub label: usize,
    pub density: f64,
    pub thresh: f64,
}

impl Observation {
    pub fn new(label: usize, density: f64, thresh: f64) -> Self {
        Self {
            label,
            density,
            thresh,
        }
    }

    /// The input point `(density, thresh)`.
    pub fn input(&self) -> Vec2 {
        Vec2::new(self.density, self.thresh)
    }

    /// Reject observations the engine cannot consume: non-finite inputs or a
    /// label outside the histogram.
    pub fn validate(&self) -> Result<()> {
        if !self.density.is_finite() {
            return Err(GmixError::non_finite("density"));
        }
        if !self.thresh.is_finite() {
            return Err(GmixError::non_finite("thresh"));
        }
        if self.label >= MAX_LABELS {
            return Err(GmixError::Observation(ObservationError::LabelOutOfRange {
                label: self.label,
                capacity: MAX_LABELS,
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_density_then_thresh() {
        let obs = Observation::new(3, 0.25, 0.75);
        assert_eq!(obs.input(), Vec2::new(0.25, 0.75));
    }

    #[test]
    fn validate_rejects_bad_observations() {
        assert!(Observation::new(0, 1.0, 1.0).validate().is_ok());
        assert!(Observation::new(0, f64::NAN, 1.0).validate().is_err());
        assert!(Observation::new(0, 1.0, f64::INFINITY).validate().is_err());
        assert!(Observation::new(MAX_LABELS, 1.0, 1.0).validate().is_err());
    }
}
