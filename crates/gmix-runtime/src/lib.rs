//! # gmix Runtime
//!
//! The incremental clustering and regression engine.
//!
//! A [`model::Model`] owns a fixed-capacity set of [`cluster::Cluster`]s.
//! Every observation is scored against all clusters, their local linear
//! predictions are blended by responsibility, the statistics are updated,
//! and the cluster set is maintained: decayed, stale or degenerate clusters
//! are pruned and a new one is spawned where no cluster fits.

pub mod cluster;
pub mod labels;
pub mod metrics;
pub mod model;
pub mod prelude;
