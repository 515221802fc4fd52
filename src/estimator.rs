//! Valuation estimation: a typed wrapper around [`LinearRegression`] fitted on
//! the comparables dataset.
//!
//! The model is fitted once and then shared read-only; prediction validates the
//! query and evaluates `intercept + Σ weight_i * feature_i` over the features in
//! [`FEATURE_NAMES`] order.

use crate::config::EstimatorConfig;
use crate::dataset::{Dataset, FEATURE_NAMES, N_FEATURES};
use crate::error::{Error, Result};
use crate::linear_model::LinearRegression;

/// Upper bound of the monthly growth percentage a query may carry.
pub const GROWTH_RATE_MAX: f64 = 100.0;

/// One set of startup metrics to be valued.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryVector {
    pub funding: f64,
    pub revenue: f64,
    pub users: f64,
    pub burn_rate: f64,
    pub growth_rate: f64,
}

impl QueryVector {
    pub const fn new(
        funding: f64,
        revenue: f64,
        users: f64,
        burn_rate: f64,
        growth_rate: f64,
    ) -> Self {
        Self {
            funding,
            revenue,
            users,
            burn_rate,
            growth_rate,
        }
    }

    pub const fn from_features(features: [f64; N_FEATURES]) -> Self {
        Self::new(features[0], features[1], features[2], features[3], features[4])
    }

    pub fn features(&self) -> [f64; N_FEATURES] {
        [
            self.funding,
            self.revenue,
            self.users,
            self.burn_rate,
            self.growth_rate,
        ]
    }

    /// Checks every field; the first violation found is reported.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in FEATURE_NAMES.into_iter().zip(self.features()) {
            if !value.is_finite() {
                return Err(Error::invalid_input(name, format!("must be finite, got {value}")));
            }
            if value < 0.0 {
                return Err(Error::invalid_input(
                    name,
                    format!("must be non-negative, got {value}"),
                ));
            }
        }

        if self.growth_rate > GROWTH_RATE_MAX {
            return Err(Error::invalid_input(
                "growth_rate",
                format!("must be at most {GROWTH_RATE_MAX}, got {}", self.growth_rate),
            ));
        }

        Ok(())
    }
}

impl Default for QueryVector {
    fn default() -> Self {
        Self::new(2.0, 1.0, 500.0, 10.0, 15.0)
    }
}

/// Regression coefficients plus what the fit learned about its training data.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedModel {
    weights: [f64; N_FEATURES],
    intercept: f64,
    rank: usize,
    training_r2: f64,
    feature_ranges: [(f64, f64); N_FEATURES],
}

impl FittedModel {
    pub fn weights(&self) -> &[f64; N_FEATURES] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Numerical rank of the centered training design matrix.
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn is_full_rank(&self) -> bool {
        self.rank == N_FEATURES
    }

    pub fn training_r2(&self) -> f64 {
        self.training_r2
    }

    pub fn feature_ranges(&self) -> &[(f64, f64); N_FEATURES] {
        &self.feature_ranges
    }

    /// Predicted valuation for `query`, with no lower bound.
    ///
    /// Rejects an invalid query with `Error::InvalidInput` before any arithmetic,
    /// and a sum that overflows with `Error::NonFiniteResult`.
    pub fn predict(&self, query: &QueryVector) -> Result<f64> {
        query.validate()?;

        let value = self.evaluate(&query.features());
        if !value.is_finite() {
            return Err(Error::NonFiniteResult { value });
        }

        Ok(value)
    }

    /// Whether every feature of `query` lies inside the range spanned by the
    /// training samples.
    pub fn within_training_range(&self, query: &QueryVector) -> bool {
        self.feature_ranges
            .iter()
            .zip(query.features())
            .all(|(&(lo, hi), value)| value >= lo && value <= hi)
    }

    fn evaluate(&self, features: &[f64; N_FEATURES]) -> f64 {
        let mut total = self.intercept;
        for (weight, value) in self.weights.iter().zip(features) {
            total += weight * value;
        }
        total
    }
}

#[derive(Clone, Debug)]
pub struct ValuationEstimator {
    dataset: Dataset,
    config: EstimatorConfig,
}

impl ValuationEstimator {
    /// Estimator over the embedded comparables with default configuration.
    pub fn new() -> Self {
        Self {
            dataset: Dataset::comparables(),
            config: EstimatorConfig::default(),
        }
    }

    /// Applies `config`, loading the replacement dataset if one is named.
    pub fn with_config(config: EstimatorConfig) -> Result<Self> {
        let dataset = match &config.dataset_path {
            Some(path) => Dataset::from_csv_path(path)?,
            None => Dataset::comparables(),
        };
        Ok(Self { dataset, config })
    }

    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.dataset = dataset;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Fits ordinary least squares with an intercept over the training set.
    pub fn fit(&self) -> Result<FittedModel> {
        let tolerance = self.config.rank_tolerance;
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(Error::InvalidConfigValue {
                key: crate::config::RANK_TOLERANCE_VAR,
                value: tolerance.to_string(),
            });
        }

        let x = &self.dataset.features;
        let y = &self.dataset.labels;

        if x.ncols() != N_FEATURES {
            return Err(Error::ShapeMismatch {
                what: "feature columns",
                got: x.ncols(),
                expected: N_FEATURES,
            });
        }

        let mut regression = LinearRegression::new()
            .solver(self.config.solver)
            .rank_tolerance(tolerance);
        regression.fit(x, y)?;

        let coefficients = regression.coefficients.as_ref().ok_or(Error::NotFitted)?;
        let mut weights = [0.0; N_FEATURES];
        for (weight, &c) in weights.iter_mut().zip(coefficients.iter()) {
            *weight = c;
        }

        let intercept = regression.intercept.ok_or(Error::NotFitted)?;
        let rank = regression.rank.ok_or(Error::NotFitted)?;
        let training_r2 = regression.score(x, y)?;

        log::info!(
            "fitted valuation model on {} samples ({} solver): rank {}/{}, training R² {:.6}",
            self.dataset.n_samples(),
            self.config.solver,
            rank,
            N_FEATURES,
            training_r2
        );
        log::debug!("weights {:?}, intercept {}", weights, intercept);

        Ok(FittedModel {
            weights,
            intercept,
            rank,
            training_r2,
            feature_ranges: self.dataset.feature_ranges(),
        })
    }
}

impl Default for ValuationEstimator {
    fn default() -> Self {
        Self::new()
    }
}
