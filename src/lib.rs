//! Startup valuation estimation from five business metrics.
//!
//! A linear regression is fitted on a small table of comparable startups and
//! evaluated on a user query.
//!
//! ```rust
//! use equiscope::{QueryVector, ValuationEstimator};
//!
//! let estimator = ValuationEstimator::new();
//! let model = estimator.fit().unwrap();
//!
//! let query = QueryVector::new(2.0, 1.0, 500.0, 10.0, 15.0);
//! let valuation = model.predict(&query).unwrap();
//! assert!((valuation - 20.0).abs() < 1e-6);
//! ```

pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod config;
pub mod dataset;
pub mod error;
pub mod estimator;
pub mod linalg;
pub mod linear_model;
pub mod metrics;
pub mod report;
pub mod session;

pub use config::{EstimatorConfig, SolverPolicy};
pub use dataset::{Dataset, TrainingSample, COMPARABLES, FEATURE_NAMES, N_FEATURES};
pub use error::{Error, Result};
pub use estimator::{FittedModel, QueryVector, ValuationEstimator};
pub use linear_model::LinearRegression;
pub use report::{NegativePolicy, ValuationReport};
pub use session::{Authenticator, Session, StaticCredentials};

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;
