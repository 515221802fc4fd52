//! Linear models for regression.
//!
//! This module provides:
//! - `LinearRegression`: Ordinary least squares linear regression, solved through
//!   an SVD so that rank-deficient designs get the minimum-norm solution (or a
//!   `SingularTrainingMatrix` error under `SolverPolicy::Strict`)
//!
//! # Examples
//!
//! ```rust
//! use equiscope::{LinearRegression, SolverPolicy};
//! use ndarray::array;
//!
//! let x = array![[1.0], [2.0], [3.0]];
//! let y = array![2.0, 4.0, 6.0];
//!
//! let mut model = LinearRegression::new().solver(SolverPolicy::Strict);
//! model.fit(&x, &y).unwrap();
//! let predictions = model.predict(&x).unwrap();
//! assert!((predictions[2] - 6.0).abs() < 1e-10);
//! ```

mod linear_regression;

pub use linear_regression::LinearRegression;
