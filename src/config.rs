//! Runtime configuration read from `EQUISCOPE_*` environment variables.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const SOLVER_VAR: &str = "EQUISCOPE_SOLVER";
pub const RANK_TOLERANCE_VAR: &str = "EQUISCOPE_RANK_TOLERANCE";
pub const DATASET_VAR: &str = "EQUISCOPE_DATASET";

pub const DEFAULT_RANK_TOLERANCE: f64 = 1e-10;

/// How a fit treats a design matrix without full column rank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SolverPolicy {
    /// Return the least-squares solution with the smallest weight norm.
    #[default]
    MinimumNorm,
    /// Fail with `Error::SingularTrainingMatrix`.
    Strict,
}

impl FromStr for SolverPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min-norm" | "minimum-norm" | "lstsq" => Ok(SolverPolicy::MinimumNorm),
            "strict" => Ok(SolverPolicy::Strict),
            _ => Err(Error::InvalidConfigValue {
                key: SOLVER_VAR,
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SolverPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverPolicy::MinimumNorm => write!(f, "min-norm"),
            SolverPolicy::Strict => write!(f, "strict"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EstimatorConfig {
    pub solver: SolverPolicy,
    /// Singular values at or below `rank_tolerance * sigma_max` count as zero.
    pub rank_tolerance: f64,
    /// CSV file replacing the embedded comparables.
    pub dataset_path: Option<PathBuf>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            solver: SolverPolicy::default(),
            rank_tolerance: DEFAULT_RANK_TOLERANCE,
            dataset_path: None,
        }
    }
}

impl EstimatorConfig {
    pub fn solver(mut self, solver: SolverPolicy) -> Self {
        self.solver = solver;
        self
    }

    pub fn rank_tolerance(mut self, rank_tolerance: f64) -> Self {
        self.rank_tolerance = rank_tolerance;
        self
    }

    pub fn dataset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_path = Some(path.into());
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(solver) = lookup(SOLVER_VAR) {
            config.solver = solver.parse()?;
        }

        if let Some(raw) = lookup(RANK_TOLERANCE_VAR) {
            let tolerance = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|t| t.is_finite() && *t > 0.0)
                .ok_or(Error::InvalidConfigValue {
                    key: RANK_TOLERANCE_VAR,
                    value: raw.clone(),
                })?;
            config.rank_tolerance = tolerance;
        }

        if let Some(path) = lookup(DATASET_VAR) {
            if path.trim().is_empty() {
                return Err(Error::InvalidConfigValue {
                    key: DATASET_VAR,
                    value: path,
                });
            }
            config.dataset_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }
}
