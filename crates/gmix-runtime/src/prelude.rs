//! gmix Runtime Prelude - convenient imports for common usage.
//!
//! ```rust
//! use gmix_runtime::prelude::*;
//! ```

// Re-export the model
pub use crate::model::{ClusterSnapshot, Model, ModelSnapshot, Range2, StepReport};

// Re-export clusters
pub use crate::cluster::{Cluster, ClusterId, PruneCause, UpdateOutcome};

pub use crate::labels::LabelHistogram;

pub use crate::metrics::ModelStats;

// Re-export from core
pub use gmix_core::prelude::*;
