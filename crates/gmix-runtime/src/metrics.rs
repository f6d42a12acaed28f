//! Running counters describing a model's lifetime.

use crate::cluster::PruneCause;
use serde::Serialize;

/// Counters accumulated across every `add_value` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelStats {
    /// Observations accepted.
    pub observations: u64,
    /// Observations refused as malformed.
    pub observations_rejected: u64,
    pub clusters_spawned: u64,
    pub pruned_low_score: u64,
    pub pruned_expired: u64,
    pub pruned_degenerate: u64,
    /// Cluster updates skipped because the observation was too far away.
    pub updates_skipped_distant: u64,
    /// Cluster updates skipped because the cluster was degenerate.
    pub updates_skipped_degenerate: u64,
}

impl ModelStats {
    pub fn record_prune(&mut self, cause: PruneCause) {
        match cause {
            PruneCause::LowScore => self.pruned_low_score += 1,
            PruneCause::Expired => self.pruned_expired += 1,
            PruneCause::Degenerate => self.pruned_degenerate += 1,
        }
    }

    pub fn total_pruned(&self) -> u64 {
        self.pruned_low_score + self.pruned_expired + self.pruned_degenerate
    }
}
