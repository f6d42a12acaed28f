//! Cluster - one Gaussian over the input space plus a local linear
//! predictor of the output.
//!
//! A cluster is scored, weighted and updated once per observation by the
//! owning model, in this order:
//!
//! 1. `score` - Mahalanobis distance and density of the input
//! 2. `update_input_probability` - normalize density into responsibility
//! 3. `contribute_to_output` - add the weighted local prediction
//! 4. `update` - fold the observation into the statistics
//!
//! Numerical trouble is never raised. A covariance that stops being positive
//! definite turns `log_norm_factor` non-finite, the cluster stops updating,
//! and the next maintenance pass removes it.

use crate::labels::LabelHistogram;
use gmix_core::clock::Timestamp;
use gmix_core::config::ModelConfig;
use gmix_core::linalg::{Gaussian2D, Mat2x2, Vec2};
use gmix_core::numeric::{safe_exp, zdiv};
use gmix_core::types::Observation;
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt;
use tracing::debug;

/// Model-unique cluster identifier, for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClusterId(pub u64);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a cluster was removed by the maintenance pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PruneCause {
    /// Score decayed below the minimum cluster score.
    LowScore,
    /// Not updated within the maximum lifetime.
    Expired,
    /// Normalization factor went non-finite.
    Degenerate,
}

/// What `Cluster::update` did with an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// Normalization factor is non-finite; statistics are frozen.
    SkippedDegenerate,
    /// Observation too far away to be trusted.
    SkippedDistant,
}

/// One mixture component.
#[derive(Debug, Clone)]
pub struct Cluster {
    id: ClusterId,
    gaussian_in: Gaussian2D,
    /// Output mean plus the input/output cross-covariance used as a
    /// regression coefficient store. Never symmetrized or validated.
    gaussian_out: Gaussian2D,
    llt_in: Mat2x2,
    inv_covariance_in: Mat2x2,
    log_norm_factor: f64,
    score: f64,

    // Per-observation scratch
    mahalanobis_sq: f64,
    probability_of_in: f64,
    probability_condition_input: f64,

    labels: LabelHistogram,
    primary_id: f64,
    secondary_id: f64,
    weight: f64,
    min_y: f64,
    max_y: f64,
    timestamp: Timestamp,
}

impl Cluster {
    /// Seed a cluster at `observation` with target `output`.
    ///
    /// The covariance starts isotropic at `initial_variance`, the output
    /// cross-covariance at zero and the score at 1.
    pub fn new(
        id: ClusterId,
        observation: &Observation,
        output: &Vec2,
        now: Timestamp,
        config: &ModelConfig,
    ) -> Self {
        let variance = config.initial_variance;
        let mut labels = LabelHistogram::new();
        labels.seed(observation.label);

        let mut cluster = Self {
            id,
            gaussian_in: Gaussian2D::new(observation.input(), Mat2x2::isotropic(variance)),
            gaussian_out: Gaussian2D::new(*output, Mat2x2::zero()),
            llt_in: Mat2x2::zero(),
            inv_covariance_in: Mat2x2::isotropic(1.0 / variance),
            log_norm_factor: 0.0,
            score: 1.0,
            mahalanobis_sq: 0.0,
            probability_of_in: 0.0,
            probability_condition_input: 0.0,
            labels,
            primary_id: 0.0,
            secondary_id: 0.0,
            weight: 0.0,
            min_y: 0.0,
            max_y: 0.0,
            timestamp: now,
        };
        debug!(cluster = %id, "initializing cluster");
        cluster.llt_in = cluster.gaussian_in.covariance.cholesky();
        cluster.update_normal();
        cluster.update_limits(config);
        cluster
    }

    /// Squared Mahalanobis distance of `input` (saturated at
    /// `max_distance`) and its density under this cluster. Pure.
    pub fn evaluate(&self, input: &Vec2, config: &ModelConfig) -> (f64, f64) {
        let delta = *input - self.gaussian_in.mean;
        let raw = self.inv_covariance_in.quadratic_form(&delta);
        // NaN from a broken inverse counts as maximally far.
        let mahalanobis_sq = if raw.is_nan() || raw > config.max_distance {
            config.max_distance
        } else {
            raw
        };
        let probability = safe_exp(self.log_norm_factor - 0.5 * mahalanobis_sq);
        (mahalanobis_sq, probability)
    }

    /// Score `input` and keep the distance and density for this cycle.
    pub fn score(&mut self, input: &Vec2, config: &ModelConfig) {
        let (mahalanobis_sq, probability) = self.evaluate(input, config);
        self.mahalanobis_sq = mahalanobis_sq;
        self.probability_of_in = probability;
    }

    /// Turn this cycle's density into a responsibility given the mixture
    /// total. A vanishing total means nobody is responsible.
    pub fn update_input_probability(&mut self, total_probability: f64, config: &ModelConfig) {
        self.probability_condition_input =
            if total_probability > config.min_total_mixture_probability {
                zdiv(self.probability_of_in, total_probability)
            } else {
                0.0
            };
    }

    /// Conditional expectation of the output at `input`:
    /// `μ_out + Σ_outᵀ · Σ_in⁻¹ · (input − μ_in)`.
    pub fn predict(&self, input: &Vec2) -> Vec2 {
        let input_delta = *input - self.gaussian_in.mean;
        let inv_covariance_delta = self.inv_covariance_in.dot_vec(&input_delta);
        let input_covariance = self
            .gaussian_out
            .covariance
            .transpose()
            .dot_vec(&inv_covariance_delta);
        self.gaussian_out.mean + input_covariance
    }

    /// Add this cluster's responsibility-weighted prediction to `output`.
    pub fn contribute_to_output(&self, input: &Vec2, output: &mut Vec2) {
        *output += self.predict(input) * self.probability_condition_input;
    }

    /// Fold one observation into the statistics.
    ///
    /// Skipped entirely when the cluster is degenerate or the observation
    /// lies beyond `max_mahalanobis_sq_for_update`.
    pub fn update(
        &mut self,
        observation: &Observation,
        output: &Vec2,
        now: Timestamp,
        config: &ModelConfig,
    ) -> UpdateOutcome {
        debug!(cluster = %self.id, log_norm_factor = self.log_norm_factor, "update");
        if self.is_degenerate() {
            return UpdateOutcome::SkippedDegenerate;
        }
        debug!(cluster = %self.id, mahalanobis_sq = self.mahalanobis_sq, "update");
        if self.mahalanobis_sq > config.max_mahalanobis_sq_for_update {
            return UpdateOutcome::SkippedDistant;
        }

        let score_weight = config.alpha * safe_exp(-config.beta * self.mahalanobis_sq);
        self.score += score_weight * (self.probability_condition_input - self.score);

        let weight = config.alpha * self.probability_condition_input;

        let delta_mean_in = self
            .gaussian_in
            .weighted_mean_update(&observation.input(), weight);
        let delta_mean_out = self.gaussian_out.weighted_mean_update(output, weight);

        self.gaussian_in
            .weighted_covariance_update(&delta_mean_in, &delta_mean_in, weight);
        self.gaussian_out
            .weighted_covariance_update(&delta_mean_in, &delta_mean_out, weight);

        self.llt_in = self.gaussian_in.covariance.cholesky();
        self.inv_covariance_in = self.gaussian_in.covariance.inverse();
        if !self.inv_covariance_in.is_finite() {
            debug!(cluster = %self.id, "input covariance is singular");
        }

        self.update_normal();
        self.update_limits(config);

        self.labels.report(observation.label, config.label_rate);

        self.timestamp = now;
        UpdateOutcome::Applied
    }

    /// Recompute the log normalization factor from the Cholesky factor.
    pub fn update_normal(&mut self) {
        self.log_norm_factor = -(2.0 * PI * self.llt_in.a.sqrt() * self.llt_in.d.sqrt()).ln();
    }

    /// Recompute the display band along the second input axis.
    pub fn update_limits(&mut self, config: &ModelConfig) {
        let radius_y = self.gaussian_in.covariance.d * config.valid_cluster_std_dev;
        self.max_y = self.gaussian_in.mean.b + radius_y;
        self.min_y = self.gaussian_in.mean.b - radius_y;
    }

    /// Rank the cluster by its two dominant label masses times the
    /// covariance eccentricity factor `(b·c)/(a·d)`.
    ///
    /// `primary_id` and `secondary_id` receive the label *masses*, not the
    /// label indices.
    pub fn weigh(&mut self) {
        let (first, second) = self.labels.top_two();
        let cov = &self.gaussian_in.covariance;
        let eccentricity_factor = zdiv(cov.b * cov.c, cov.a * cov.d);
        self.weight = (first + second) * eccentricity_factor;
        self.primary_id = first;
        self.secondary_id = second;
    }

    /// The maintenance verdict: `None` if the cluster should stay.
    pub fn health(&self, now: Timestamp, config: &ModelConfig) -> Option<PruneCause> {
        if self.score < config.min_cluster_score {
            Some(PruneCause::LowScore)
        } else if self.timestamp.is_expired(now, config.max_cluster_lifetime_secs) {
            Some(PruneCause::Expired)
        } else if self.is_degenerate() {
            Some(PruneCause::Degenerate)
        } else {
            None
        }
    }

    pub fn is_degenerate(&self) -> bool {
        !self.log_norm_factor.is_finite()
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn gaussian_in(&self) -> &Gaussian2D {
        &self.gaussian_in
    }

    pub fn gaussian_out(&self) -> &Gaussian2D {
        &self.gaussian_out
    }

    pub fn cholesky_in(&self) -> &Mat2x2 {
        &self.llt_in
    }

    pub fn inv_covariance_in(&self) -> &Mat2x2 {
        &self.inv_covariance_in
    }

    pub fn log_norm_factor(&self) -> f64 {
        self.log_norm_factor
    }

    pub fn score_value(&self) -> f64 {
        self.score
    }

    pub fn mahalanobis_sq(&self) -> f64 {
        self.mahalanobis_sq
    }

    pub fn probability_of_in(&self) -> f64 {
        self.probability_of_in
    }

    pub fn probability_condition_input(&self) -> f64 {
        self.probability_condition_input
    }

    pub fn labels(&self) -> &LabelHistogram {
        &self.labels
    }

    pub fn primary_id(&self) -> f64 {
        self.primary_id
    }

    pub fn secondary_id(&self) -> f64 {
        self.secondary_id
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ModelConfig {
        ModelConfig::default()
    }

    fn seeded(x: f64, y: f64, label: usize) -> Cluster {
        Cluster::new(
            ClusterId(0),
            &Observation::new(label, x, y),
            &Vec2::new(x, y),
            Timestamp::default(),
            &config(),
        )
    }

    #[test]
    fn new_cluster_starts_healthy() {
        let c = seeded(1.0, 2.0, 2);
        assert_eq!(c.score_value(), 1.0);
        assert!(c.log_norm_factor().is_finite());
        assert_eq!(c.gaussian_in().mean, Vec2::new(1.0, 2.0));
        assert_eq!(c.gaussian_out().covariance, Mat2x2::zero());
        assert_eq!(c.inv_covariance_in(), &Mat2x2::isotropic(1.0));
        assert_eq!(c.labels().average(2), 1.0);
        assert_eq!(c.labels().count(2), 1);
        assert!(c.health(Timestamp::default(), &config()).is_none());
    }

    #[test]
    fn norm_factor_uses_cholesky_diagonal() {
        let c = seeded(0.0, 0.0, 0);
        // unit variance: L = I, factor = -ln(2π)
        assert!((c.log_norm_factor() + (2.0 * PI).ln()).abs() < 1e-12);
    }

    #[test]
    fn score_at_mean_is_peak_density() {
        let mut c = seeded(0.0, 0.0, 0);
        c.score(&Vec2::ZERO, &config());
        assert_eq!(c.mahalanobis_sq(), 0.0);
        assert!((c.probability_of_in() - 1.0 / (2.0 * PI)).abs() < 1e-12);
    }

    #[test]
    fn score_saturates_far_away() {
        let mut c = seeded(0.0, 0.0, 0);
        c.score(&Vec2::new(1e6, -1e6), &config());
        assert_eq!(c.mahalanobis_sq(), config().max_distance);
        assert!(c.probability_of_in().is_finite());
        assert!(c.probability_of_in() >= 0.0);
    }

    #[test]
    fn score_is_finite_for_degenerate_cluster() {
        let mut c = seeded(0.0, 0.0, 0);
        c.gaussian_in.covariance = Mat2x2::new(1.0, 1.0, 1.0, 1.0);
        c.llt_in = c.gaussian_in.covariance.cholesky();
        c.inv_covariance_in = c.gaussian_in.covariance.inverse();
        c.update_normal();
        assert!(c.is_degenerate());

        c.score(&Vec2::new(0.5, 0.5), &config());
        assert!(c.probability_of_in().is_finite());
        assert!(c.mahalanobis_sq().is_finite());
    }

    #[test]
    fn responsibility_is_zero_below_mixture_floor() {
        let mut c = seeded(0.0, 0.0, 0);
        c.score(&Vec2::ZERO, &config());
        c.update_input_probability(1e-20, &config());
        assert_eq!(c.probability_condition_input(), 0.0);

        c.update_input_probability(c.probability_of_in() * 2.0, &config());
        assert!((c.probability_condition_input() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn prediction_with_zero_cross_covariance_is_output_mean() {
        let c = seeded(0.0, 0.0, 0);
        assert_eq!(c.predict(&Vec2::new(3.0, -2.0)), Vec2::ZERO);
    }

    #[test]
    fn prediction_follows_cross_covariance() {
        let mut c = seeded(0.0, 0.0, 0);
        c.gaussian_out.covariance = Mat2x2::new(2.0, 0.0, 0.0, 0.5);
        // inv = I, so predicted = Σ_outᵀ·δ
        assert_eq!(c.predict(&Vec2::new(1.0, 2.0)), Vec2::new(2.0, 1.0));

        c.gaussian_out.covariance = Mat2x2::new(0.0, 1.0, 0.0, 0.0);
        // transpose moves b into the lower-left slot
        assert_eq!(c.predict(&Vec2::new(3.0, 0.0)), Vec2::new(0.0, 3.0));
    }

    #[test]
    fn contribution_is_weighted_by_responsibility() {
        let mut c = seeded(0.0, 0.0, 0);
        c.gaussian_out.mean = Vec2::new(4.0, 8.0);
        c.probability_condition_input = 0.25;
        let mut out = Vec2::new(1.0, 1.0);
        c.contribute_to_output(&Vec2::ZERO, &mut out);
        assert_eq!(out, Vec2::new(2.0, 3.0));
    }

    #[test]
    fn update_moves_means_toward_observation() {
        let cfg = config();
        let mut c = seeded(0.0, 0.0, 0);
        let obs = Observation::new(1, 1.0, 1.0);
        let target = Vec2::new(2.0, 2.0);
        c.score(&obs.input(), &cfg);
        c.update_input_probability(c.probability_of_in(), &cfg);
        let outcome = c.update(&obs, &target, Timestamp(5.0), &cfg);

        assert_eq!(outcome, UpdateOutcome::Applied);
        assert!((c.gaussian_in().mean.a - 0.1).abs() < 1e-12);
        assert!((c.gaussian_out().mean.b - 0.2).abs() < 1e-12);
        assert!(c.gaussian_out().covariance.a > 0.0);
        assert_eq!(c.timestamp(), Timestamp(5.0));
        assert_eq!(c.labels().count(1), 1);
        assert!(c.log_norm_factor().is_finite());
    }

    #[test]
    fn score_update_is_damped_by_distance() {
        let cfg = config();
        let d2 = 2.0;
        let pci = 0.4;

        let mut c = seeded(0.0, 0.0, 0);
        c.mahalanobis_sq = d2;
        c.probability_condition_input = pci;
        c.update(&Observation::new(0, 1.0, 1.0), &Vec2::ZERO, Timestamp(1.0), &cfg);
        let expected = 1.0 + cfg.alpha * (-cfg.beta * d2).exp() * (pci - 1.0);
        assert!((c.score_value() - expected).abs() < 1e-12);

        // Without damping the same step pulls the score further down
        let undamped = cfg.clone().with_beta(0.0);
        let mut c = seeded(0.0, 0.0, 0);
        c.mahalanobis_sq = d2;
        c.probability_condition_input = pci;
        c.update(&Observation::new(0, 1.0, 1.0), &Vec2::ZERO, Timestamp(1.0), &undamped);
        assert!((c.score_value() - (1.0 + undamped.alpha * (pci - 1.0))).abs() < 1e-12);
        assert!((c.score_value() - expected).abs() > 1e-3);
    }

    #[test]
    fn update_skips_distant_observation() {
        let cfg = config();
        let mut c = seeded(0.0, 0.0, 0);
        let obs = Observation::new(0, 10.0, 10.0);
        c.score(&obs.input(), &cfg);
        c.update_input_probability(c.probability_of_in(), &cfg);
        let before = *c.gaussian_in();

        let outcome = c.update(&obs, &Vec2::ZERO, Timestamp(1.0), &cfg);
        assert_eq!(outcome, UpdateOutcome::SkippedDistant);
        assert_eq!(c.gaussian_in(), &before);
        assert_eq!(c.timestamp(), Timestamp::default());
    }

    #[test]
    fn update_skips_degenerate_cluster() {
        let cfg = config();
        let mut c = seeded(0.0, 0.0, 0);
        c.log_norm_factor = f64::NAN;
        c.score(&Vec2::ZERO, &cfg);
        let outcome = c.update(&Observation::new(0, 0.0, 0.0), &Vec2::ZERO, Timestamp(1.0), &cfg);
        assert_eq!(outcome, UpdateOutcome::SkippedDegenerate);
        assert_eq!(c.health(Timestamp(1.0), &cfg), Some(PruneCause::Degenerate));
    }

    #[test]
    fn limits_follow_second_axis() {
        let c = seeded(0.0, 5.0, 0);
        // variance 1, multiplier 2
        assert_eq!(c.max_y(), 7.0);
        assert_eq!(c.min_y(), 3.0);
    }

    #[test]
    fn weigh_stores_label_masses_not_indices() {
        let mut c = seeded(0.0, 0.0, 3);
        c.labels.report(5, 0.25);
        c.gaussian_in.covariance = Mat2x2::new(2.0, 1.0, 1.0, 2.0);
        c.weigh();

        assert!((c.primary_id() - 0.75).abs() < 1e-12);
        assert!((c.secondary_id() - 0.25).abs() < 1e-12);
        // eccentricity = (1·1)/(2·2)
        assert!((c.weight() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn weigh_of_isotropic_cluster_is_zero() {
        let mut c = seeded(0.0, 0.0, 0);
        c.weigh();
        assert_eq!(c.weight(), 0.0);
        assert_eq!(c.primary_id(), 1.0);
    }

    #[test]
    fn health_reports_low_score_and_expiry() {
        let cfg = config();
        let mut c = seeded(0.0, 0.0, 0);
        assert_eq!(
            c.health(Timestamp(cfg.max_cluster_lifetime_secs + 1.0), &cfg),
            Some(PruneCause::Expired)
        );
        c.score = cfg.min_cluster_score / 2.0;
        assert_eq!(c.health(Timestamp::default(), &cfg), Some(PruneCause::LowScore));
    }
}
