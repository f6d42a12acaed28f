//! gmix Core Prelude - convenient imports for common usage.
//!
//! ```rust
//! use gmix_core::prelude::*;
//! ```

pub use crate::types::{Observation, MAX_LABELS};

pub use crate::linalg::{Gaussian2D, Mat2x2, Vec2};

pub use crate::numeric::{safe_exp, zdiv};

pub use crate::clock::{Clock, ManualClock, MonotonicClock, Timestamp};

pub use crate::config::ModelConfig;

pub use crate::error::{ConfigError, GmixError, ObservationError, Result};
