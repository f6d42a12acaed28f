//! # gmix Core
//!
//! Shared types for online Gaussian mixture regression over 2-D inputs
//! and 2-D outputs:
//!
//! - **linalg** - `Vec2`, `Mat2x2` and `Gaussian2D` with the handful of
//!   operations the engine needs (Cholesky, inverse, rank-one blends)
//! - **numeric** - `safe_exp` and `zdiv`, the two conventions that keep
//!   degenerate statistics finite
//! - **clock** - the timestamp source used to age clusters
//! - **config** - every threshold and rate of the algorithm, per model
//! - **types** - the `Observation` fed into a model
//!
//! ## Quick Start
//!
//! ```rust
//! use gmix_core::prelude::*;
//!
//! let cov = Mat2x2::new(4.0, 2.0, 2.0, 3.0);
//! let llt = cov.cholesky();
//! assert!((llt.a - 2.0).abs() < 1e-12);
//!
//! let obs = Observation::new(0, 1.0, 2.0);
//! assert_eq!(obs.input(), Vec2::new(1.0, 2.0));
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod linalg;
pub mod numeric;
pub mod prelude;
pub mod types;
