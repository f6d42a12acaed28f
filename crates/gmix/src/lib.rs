//! # gmix
//!
//! Online Gaussian mixture clustering and regression over 2-D observations.
//!
//! A model keeps a small, bounded set of clusters. Each cluster is a
//! Gaussian over the input plane with a local linear map to a 2-D output.
//! Observations arrive one at a time; every call to `add_value` predicts the
//! output from the current mixture, updates the clusters toward the
//! observation, prunes clusters that decayed, expired or collapsed, and
//! spawns a new cluster wherever the mixture neither fits the input nor
//! predicts the output well enough.
//!
//! ## Quick Start
//!
//! ```rust
//! use gmix::prelude::*;
//!
//! let mut model = Model::new("sensor");
//!
//! // The first observation always seeds a cluster
//! let report = model
//!     .add_value(&Observation::new(0, 0.0, 0.0), &Vec2::new(0.0, 0.0))
//!     .unwrap();
//! assert!(report.spawned.is_some());
//!
//! // A far observation with a far target gets its own cluster
//! model
//!     .add_value(&Observation::new(1, 10.0, 10.0), &Vec2::new(10.0, 10.0))
//!     .unwrap();
//! assert_eq!(model.num_clusters(), 2);
//!
//! // Prediction is read-only
//! let y = model.predict(&Vec2::new(0.0, 0.0));
//! assert!(y.is_finite());
//! ```
//!
//! ## Architecture
//!
//! - [`gmix_core`] - 2x2 linear algebra, numeric helpers, clock, config, errors
//! - [`gmix_runtime`] - Clusters, label histograms, the model and its statistics
//!
//! ## Cluster Lifecycle
//!
//! | Event | Condition |
//! |-------|-----------|
//! | Spawn | Model empty, or error above `max_error` and every cluster farther than `max_mahalanobis_sq` |
//! | Update | Cluster within `max_mahalanobis_sq_for_update` and numerically healthy |
//! | Prune | Score below `min_cluster_score`, older than `max_cluster_lifetime_secs`, or degenerate |
//!
//! ## Deterministic Time
//!
//! Expiry reads a [`Clock`](gmix_core::clock::Clock). Recorded streams and
//! tests drive a `ManualClock`:
//!
//! ```rust
//! use gmix::prelude::*;
//!
//! let mut model =
//!     Model::with_clock("replay", ModelConfig::default(), ManualClock::new()).unwrap();
//! model.add_value(&Observation::new(0, 0.0, 0.0), &Vec2::ZERO).unwrap();
//!
//! model.clock_mut().advance(60.0);
//! let report = model
//!     .add_value(&Observation::new(0, 50.0, 50.0), &Vec2::new(5.0, 5.0))
//!     .unwrap();
//! assert_eq!(report.pruned, 1);
//! ```

// Re-export all subcrates
pub use gmix_core as core;
pub use gmix_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use gmix::prelude::*;
/// ```
pub mod prelude {
    pub use gmix_runtime::prelude::*;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
