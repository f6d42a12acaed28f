//! Per-model tuning parameters.
//!
//! Every threshold and rate of the algorithm lives here so that several
//! independently configured models can coexist. All fields default
//! individually, so a partial TOML table is a valid configuration.

use crate::error::{GmixError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a mixture model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Maximum number of live clusters (default: 10).
    #[serde(default = "default_max_clusters")]
    pub max_clusters: usize,
    /// Learning rate for score, means and covariances (default: 0.1).
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Distance damping of the score update, `exp(-beta·d²)` (default: 1.0).
    #[serde(default = "default_beta")]
    pub beta: f64,
    /// Diagonal variance of a freshly spawned cluster (default: 1.0).
    #[serde(default = "default_initial_variance")]
    pub initial_variance: f64,
    /// Saturation value for squared Mahalanobis distance (default: 1000).
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,
    /// Below this total density no cluster is held responsible (default: 1e-10).
    #[serde(default = "default_min_total_mixture_probability")]
    pub min_total_mixture_probability: f64,
    /// Clusters scoring below this neither vote nor survive (default: 0.05).
    #[serde(default = "default_min_cluster_score")]
    pub min_cluster_score: f64,
    /// A spawn needs every cluster to be farther than this (default: 9).
    #[serde(default = "default_max_mahalanobis_sq")]
    pub max_mahalanobis_sq: f64,
    /// Clusters farther than this skip the statistics update (default: 16).
    #[serde(default = "default_max_mahalanobis_sq_for_update")]
    pub max_mahalanobis_sq_for_update: f64,
    /// A spawn needs the range-normalized error above this (default: 0.1).
    #[serde(default = "default_max_error")]
    pub max_error: f64,
    /// Multiplier on the second input variance for display limits (default: 2).
    #[serde(default = "default_valid_cluster_std_dev")]
    pub valid_cluster_std_dev: f64,
    /// Seconds without an update before a cluster expires (default: 30).
    #[serde(default = "default_max_cluster_lifetime_secs")]
    pub max_cluster_lifetime_secs: f64,
    /// Running-average rate of the label histogram (default: 0.1).
    #[serde(default = "default_label_rate")]
    pub label_rate: f64,
}

// Default value functions
fn default_max_clusters() -> usize { 10 }
fn default_alpha() -> f64 { 0.1 }
fn default_beta() -> f64 { 1.0 }
fn default_initial_variance() -> f64 { 1.0 }
fn default_max_distance() -> f64 { 1000.0 }
fn default_min_total_mixture_probability() -> f64 { 1e-10 }
fn default_min_cluster_score() -> f64 { 0.05 }
fn default_max_mahalanobis_sq() -> f64 { 9.0 }
fn default_max_mahalanobis_sq_for_update() -> f64 { 16.0 }
fn default_max_error() -> f64 { 0.1 }
fn default_valid_cluster_std_dev() -> f64 { 2.0 }
fn default_max_cluster_lifetime_secs() -> f64 { 30.0 }
fn default_label_rate() -> f64 { 0.1 }

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_clusters: default_max_clusters(),
            alpha: default_alpha(),
            beta: default_beta(),
            initial_variance: default_initial_variance(),
            max_distance: default_max_distance(),
            min_total_mixture_probability: default_min_total_mixture_probability(),
            min_cluster_score: default_min_cluster_score(),
            max_mahalanobis_sq: default_max_mahalanobis_sq(),
            max_mahalanobis_sq_for_update: default_max_mahalanobis_sq_for_update(),
            max_error: default_max_error(),
            valid_cluster_std_dev: default_valid_cluster_std_dev(),
            max_cluster_lifetime_secs: default_max_cluster_lifetime_secs(),
            label_rate: default_label_rate(),
        }
    }
}

impl ModelConfig {
    pub fn with_max_clusters(mut self, max_clusters: usize) -> Self {
        self.max_clusters = max_clusters;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_initial_variance(mut self, variance: f64) -> Self {
        self.initial_variance = variance;
        self
    }

    pub fn with_min_cluster_score(mut self, score: f64) -> Self {
        self.min_cluster_score = score;
        self
    }

    pub fn with_max_mahalanobis_sq_for_update(mut self, distance: f64) -> Self {
        self.max_mahalanobis_sq_for_update = distance;
        self
    }

    pub fn with_max_cluster_lifetime_secs(mut self, secs: f64) -> Self {
        self.max_cluster_lifetime_secs = secs;
        self
    }

    /// Check every field, reporting the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.max_clusters == 0 {
            return Err(GmixError::invalid_config(
                "max_clusters",
                "0",
                "at least one cluster is required",
            ));
        }

        let fields = [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("initial_variance", self.initial_variance),
            ("max_distance", self.max_distance),
            ("min_total_mixture_probability", self.min_total_mixture_probability),
            ("min_cluster_score", self.min_cluster_score),
            ("max_mahalanobis_sq", self.max_mahalanobis_sq),
            ("max_mahalanobis_sq_for_update", self.max_mahalanobis_sq_for_update),
            ("max_error", self.max_error),
            ("valid_cluster_std_dev", self.valid_cluster_std_dev),
            ("max_cluster_lifetime_secs", self.max_cluster_lifetime_secs),
            ("label_rate", self.label_rate),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(GmixError::invalid_config(field, value.to_string(), "must be finite"));
            }
            if value < 0.0 {
                return Err(GmixError::out_of_range(field, 0.0, f64::MAX, value));
            }
        }

        unit_interval("alpha", self.alpha)?;
        unit_interval("label_rate", self.label_rate)?;
        positive("initial_variance", self.initial_variance)?;
        positive("max_distance", self.max_distance)?;
        positive("max_cluster_lifetime_secs", self.max_cluster_lifetime_secs)?;
        Ok(())
    }
}

/// `value` must lie in `(0, 1]`.
fn unit_interval(field: &str, value: f64) -> Result<()> {
    if value <= 0.0 || value > 1.0 {
        return Err(GmixError::out_of_range(field, 0.0, 1.0, value));
    }
    Ok(())
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value <= 0.0 {
        return Err(GmixError::invalid_config(field, value.to_string(), "must be positive"));
    }
    Ok(())
}
