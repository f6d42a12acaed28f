//! Model - a fixed-capacity mixture of clusters fitted one observation at a
//! time.
//!
//! Each call to `add_value`:
//! 1. Widens the running input/output extrema
//! 2. Scores every cluster against the input and sums the densities
//! 3. Blends the responsibility-weighted predictions of live clusters
//! 4. Measures the range-normalized error of that blend
//! 5. Updates every cluster with the observation
//! 6. Prunes clusters that decayed, expired or went degenerate
//! 7. Spawns a cluster if nobody both fits the input and predicts the output
//!
//! Cluster storage is reserved up front; steady-state steps do not allocate.

use crate::cluster::{Cluster, ClusterId, UpdateOutcome};
use crate::metrics::ModelStats;
use gmix_core::clock::{Clock, MonotonicClock};
use gmix_core::config::ModelConfig;
use gmix_core::error::{GmixError, Result};
use gmix_core::linalg::{Mat2x2, Vec2};
use gmix_core::numeric::zdiv;
use gmix_core::types::Observation;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

/// Outcome of one `add_value` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepReport {
    /// Blended output prediction made before the update.
    pub output: Vec2,
    /// Largest range-normalized error over the two output axes.
    pub max_error: f64,
    /// Smallest squared Mahalanobis distance over all clusters.
    pub best_distance: f64,
    /// Sum of all cluster densities at the input.
    pub total_probability: f64,
    /// Cluster spawned at the end of the step, if any.
    pub spawned: Option<ClusterId>,
    /// Clusters removed by the maintenance pass.
    pub pruned: usize,
}

/// Component-wise running extrema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Range2 {
    fn point(v: Vec2) -> Self {
        Self { min: v, max: v }
    }

    fn include(&mut self, v: Vec2) {
        self.min = self.min.min(&v);
        self.max = self.max.max(&v);
    }

    /// `max − min` per axis.
    pub fn span(&self) -> Vec2 {
        self.max - self.min
    }
}

/// A serializable view of one cluster.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSnapshot {
    pub id: ClusterId,
    pub mean_in: Vec2,
    pub covariance_in: Mat2x2,
    pub mean_out: Vec2,
    pub covariance_out: Mat2x2,
    pub log_norm_factor: f64,
    pub score: f64,
    pub weight: f64,
    pub primary_id: f64,
    pub secondary_id: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub age_secs: f64,
    pub label_counts: Vec<u32>,
}

/// A serializable diagnostic view of the whole model. There is no way to
/// restore a model from it.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSnapshot {
    pub name: String,
    pub num_clusters: usize,
    pub input_range: Option<Range2>,
    pub output_range: Option<Range2>,
    pub clusters: Vec<ClusterSnapshot>,
    pub stats: ModelStats,
}

impl ModelSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The mixture model.
pub struct Model<C: Clock = MonotonicClock> {
    name: String,
    config: ModelConfig,
    clock: C,
    /// Live clusters, dense. Removal swaps with the last; order is not
    /// meaningful.
    clusters: Vec<Cluster>,
    next_id: u64,
    input_range: Option<Range2>,
    output_range: Option<Range2>,
    last_output: Vec2,
    last_max_error: f64,
    last_best_distance: f64,
    stats: ModelStats,
}

impl Model<MonotonicClock> {
    /// Create a model with default configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self::build(name.into(), ModelConfig::default(), MonotonicClock::new())
    }

    /// Create a model with the specified configuration.
    pub fn from_config(name: impl Into<String>, config: ModelConfig) -> Result<Self> {
        Self::with_clock(name, config, MonotonicClock::new())
    }
}

impl<C: Clock> Model<C> {
    /// Create a model driven by a caller-supplied clock.
    pub fn with_clock(name: impl Into<String>, config: ModelConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(name.into(), config, clock))
    }

    fn build(name: String, config: ModelConfig, clock: C) -> Self {
        debug!(model = %name, "initializing model");
        Self {
            clusters: Vec::with_capacity(config.max_clusters),
            name,
            config,
            clock,
            next_id: 0,
            input_range: None,
            output_range: None,
            last_output: Vec2::ZERO,
            last_max_error: 0.0,
            last_best_distance: 0.0,
            stats: ModelStats::default(),
        }
    }

    /// Feed one observation and its target output through a full cycle.
    ///
    /// Malformed input (non-finite numbers, out-of-range label) is rejected
    /// before any state changes.
    pub fn add_value(&mut self, observation: &Observation, value: &Vec2) -> Result<StepReport> {
        if let Err(e) = validate(observation, value) {
            warn!(model = %self.name, error = %e, "rejected observation");
            self.stats.observations_rejected += 1;
            return Err(e);
        }
        self.stats.observations += 1;

        let input = observation.input();
        self.track_ranges(&input, value);

        let total_probability = self.score_sum_of_clusters(&input);
        let mut output = Vec2::ZERO;
        let best_distance = self.output_and_best_distance(total_probability, &input, &mut output);

        let min_max_delta = self.output_range.map(|r| r.span()).unwrap_or(Vec2::ZERO);
        let max_error = max_error(&output, value, &min_max_delta);
        debug!(model = %self.name, max_error, best_distance, "scored observation");

        self.update_clusters(observation, value);
        let pruned = self.prune();

        let spawned = if self.clusters.len() < self.config.max_clusters
            && (self.is_empty()
                || (max_error > self.config.max_error
                    && best_distance > self.config.max_mahalanobis_sq))
        {
            self.add_cluster(observation, value)
                .map(|index| self.clusters[index].id())
        } else {
            None
        };

        self.last_output = output;
        self.last_max_error = max_error;
        self.last_best_distance = best_distance;

        Ok(StepReport {
            output,
            max_error,
            best_distance,
            total_probability,
            spawned,
            pruned,
        })
    }

    /// Responsibility-weighted output at `input`, without touching any state.
    pub fn predict(&self, input: &Vec2) -> Vec2 {
        let total: f64 = self
            .clusters
            .iter()
            .map(|cluster| cluster.evaluate(input, &self.config).1)
            .sum();
        if total <= self.config.min_total_mixture_probability {
            return Vec2::ZERO;
        }

        let mut output = Vec2::ZERO;
        for cluster in self.clusters.iter() {
            if cluster.score_value() > self.config.min_cluster_score {
                let (_, density) = cluster.evaluate(input, &self.config);
                output += cluster.predict(input) * zdiv(density, total);
            }
        }
        output
    }

    /// Seed a new cluster in the first free slot. Returns its index, or
    /// `None` when the model is already at capacity.
    pub fn add_cluster(&mut self, observation: &Observation, value: &Vec2) -> Option<usize> {
        if self.clusters.len() >= self.config.max_clusters {
            warn!(
                model = %self.name,
                capacity = self.config.max_clusters,
                "cluster capacity reached"
            );
            return None;
        }
        let id = ClusterId(self.next_id);
        self.next_id += 1;

        let now = self.clock.now();
        self.clusters
            .push(Cluster::new(id, observation, value, now, &self.config));
        self.stats.clusters_spawned += 1;
        info!(
            model = %self.name,
            cluster = %id,
            density = observation.density,
            thresh = observation.thresh,
            "spawned cluster"
        );
        Some(self.clusters.len() - 1)
    }

    /// Remove the cluster at `index`, moving the last cluster into its slot.
    pub fn remove_cluster(&mut self, index: usize) -> Option<Cluster> {
        if index >= self.clusters.len() {
            return None;
        }
        Some(self.clusters.swap_remove(index))
    }

    /// Refresh the label-mass ranking of every cluster.
    pub fn weigh_clusters(&mut self) {
        for cluster in self.clusters.iter_mut() {
            cluster.weigh();
        }
    }

    fn track_ranges(&mut self, input: &Vec2, value: &Vec2) {
        if self.input_range.is_none() || self.output_range.is_none() {
            self.input_range = Some(Range2::point(*input));
            self.output_range = Some(Range2::point(*value));
            return;
        }
        if let Some(inputs) = self.input_range.as_mut() {
            inputs.include(*input);
        }
        if let Some(outputs) = self.output_range.as_mut() {
            outputs.include(*value);
        }
    }

    fn score_sum_of_clusters(&mut self, input: &Vec2) -> f64 {
        let mut score_sum = 0.0;
        for cluster in self.clusters.iter_mut() {
            cluster.score(input, &self.config);
            score_sum += cluster.probability_of_in();
        }
        score_sum
    }

    fn output_and_best_distance(
        &mut self,
        total_probability: f64,
        input: &Vec2,
        output: &mut Vec2,
    ) -> f64 {
        let mut best_match_distance = self.config.max_distance;
        for cluster in self.clusters.iter_mut() {
            cluster.update_input_probability(total_probability, &self.config);
            if cluster.score_value() > self.config.min_cluster_score {
                cluster.contribute_to_output(input, output);
            }
            if cluster.mahalanobis_sq() < best_match_distance {
                best_match_distance = cluster.mahalanobis_sq();
            }
        }
        best_match_distance
    }

    fn update_clusters(&mut self, observation: &Observation, value: &Vec2) {
        let now = self.clock.now();
        for cluster in self.clusters.iter_mut() {
            match cluster.update(observation, value, now, &self.config) {
                UpdateOutcome::Applied => {}
                UpdateOutcome::SkippedDistant => self.stats.updates_skipped_distant += 1,
                UpdateOutcome::SkippedDegenerate => self.stats.updates_skipped_degenerate += 1,
            }
        }
    }

    /// Maintenance pass. Every slot is examined, including the one swapped
    /// into a just-vacated index.
    fn prune(&mut self) -> usize {
        let now = self.clock.now();
        let mut pruned = 0;
        let mut i = 0;
        while i < self.clusters.len() {
            match self.clusters[i].health(now, &self.config) {
                Some(cause) => {
                    let id = self.clusters[i].id();
                    self.remove_cluster(i);
                    self.stats.record_prune(cause);
                    pruned += 1;
                    info!(model = %self.name, cluster = %id, ?cause, "pruned cluster");
                }
                None => i += 1,
            }
        }

        for (i, c) in self.clusters.iter().enumerate() {
            let cov = &c.gaussian_in().covariance;
            trace!(
                "{}: µ<{:6.3}, {:7.3}> ∑[{:6.3}, {:6.3}; {:6.3}, {:6.3}] : weight:{:5.3} score:{:5.3}",
                i,
                c.gaussian_in().mean.a,
                c.gaussian_in().mean.b,
                cov.a,
                cov.b,
                cov.c,
                cov.d,
                c.weight(),
                c.score_value()
            );
        }
        pruned
    }

    /// Build a serializable snapshot of the current state.
    pub fn snapshot(&self) -> ModelSnapshot {
        let now = self.clock.now();
        let clusters = self
            .clusters
            .iter()
            .map(|c| ClusterSnapshot {
                id: c.id(),
                mean_in: c.gaussian_in().mean,
                covariance_in: c.gaussian_in().covariance,
                mean_out: c.gaussian_out().mean,
                covariance_out: c.gaussian_out().covariance,
                log_norm_factor: c.log_norm_factor(),
                score: c.score_value(),
                weight: c.weight(),
                primary_id: c.primary_id(),
                secondary_id: c.secondary_id(),
                min_y: c.min_y(),
                max_y: c.max_y(),
                age_secs: c.timestamp().elapsed(now),
                label_counts: (0..c.labels().num_valid())
                    .map(|label| c.labels().count(label))
                    .collect(),
            })
            .collect();

        ModelSnapshot {
            name: self.name.clone(),
            num_clusters: self.clusters.len(),
            input_range: self.input_range,
            output_range: self.output_range,
            clusters,
            stats: self.stats.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn num_clusters(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn input_range(&self) -> Option<Range2> {
        self.input_range
    }

    pub fn output_range(&self) -> Option<Range2> {
        self.output_range
    }

    /// Blended prediction of the most recent `add_value`.
    pub fn last_output(&self) -> Vec2 {
        self.last_output
    }

    pub fn last_max_error(&self) -> f64 {
        self.last_max_error
    }

    pub fn last_best_distance(&self) -> f64 {
        self.last_best_distance
    }

    pub fn stats(&self) -> &ModelStats {
        &self.stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

fn validate(observation: &Observation, value: &Vec2) -> Result<()> {
    observation.validate()?;
    if !value.a.is_finite() {
        return Err(GmixError::non_finite("value.a"));
    }
    if !value.b.is_finite() {
        return Err(GmixError::non_finite("value.b"));
    }
    Ok(())
}

/// Largest per-axis error, each normalized by the observed output span.
fn max_error(output: &Vec2, value: &Vec2, min_max_delta: &Vec2) -> f64 {
    let output_delta = *value - *output;
    let a_error = zdiv(output_delta.a, min_max_delta.a).abs();
    let b_error = zdiv(output_delta.b, min_max_delta.b).abs();
    a_error.max(b_error)
}
