use crate::config::{SolverPolicy, DEFAULT_RANK_TOLERANCE};
use crate::error::{Error, Result};
use crate::linalg;
use crate::{Matrix, Vector};

#[derive(Clone, Debug)]
pub struct LinearRegression {
    pub coefficients: Option<Vector>,
    pub intercept: Option<f64>,
    /// Numerical rank of the (centered) design matrix seen by the last fit.
    pub rank: Option<usize>,
    fit_intercept: bool,
    solver: SolverPolicy,
    rank_tolerance: f64,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            rank: None,
            fit_intercept: true,
            solver: SolverPolicy::default(),
            rank_tolerance: DEFAULT_RANK_TOLERANCE,
        }
    }

    pub fn with_intercept(fit_intercept: bool) -> Self {
        Self {
            fit_intercept,
            ..Self::new()
        }
    }

    pub fn solver(mut self, solver: SolverPolicy) -> Self {
        self.solver = solver;
        self
    }

    pub fn rank_tolerance(mut self, rank_tolerance: f64) -> Self {
        if !(rank_tolerance.is_finite() && rank_tolerance > 0.0) {
            panic!("rank_tolerance must be positive, got {}", rank_tolerance);
        }
        self.rank_tolerance = rank_tolerance;
        self
    }

    pub fn fit(&mut self, x: &Matrix, y: &Vector) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(Error::ShapeMismatch {
                what: "targets",
                got: y.len(),
                expected: x.nrows(),
            });
        }

        if x.nrows() == 0 {
            return Err(Error::EmptyDataset);
        }

        let (coeffs, intercept, rank) = if self.fit_intercept {
            self.fit_with_intercept(x, y)?
        } else {
            let (coeffs, rank) = self.fit_without_intercept(x, y)?;
            (coeffs, 0.0, rank)
        };

        self.coefficients = Some(coeffs);
        self.intercept = Some(intercept);
        self.rank = Some(rank);
        Ok(())
    }

    pub fn predict(&self, x: &Matrix) -> Result<Vector> {
        let coeffs = self.coefficients.as_ref().ok_or(Error::NotFitted)?;
        let intercept = self.intercept.unwrap_or(0.0);

        if x.ncols() != coeffs.len() {
            return Err(Error::ShapeMismatch {
                what: "features",
                got: x.ncols(),
                expected: coeffs.len(),
            });
        }

        let predictions = x.dot(coeffs) + intercept;
        Ok(predictions)
    }

    pub fn score(&self, x: &Matrix, y: &Vector) -> Result<f64> {
        let y_pred = self.predict(x)?;
        crate::metrics::r2_score(y, &y_pred)
    }

    fn fit_with_intercept(&self, x: &Matrix, y: &Vector) -> Result<(Vector, f64, usize)> {
        let y_mean = y.mean().ok_or(Error::EmptyDataset)?;
        let x_means = x.mean_axis(ndarray::Axis(0)).ok_or(Error::EmptyDataset)?;

        let mut x_centered = x.clone();
        for mut row in x_centered.axis_iter_mut(ndarray::Axis(0)) {
            row -= &x_means;
        }

        let y_centered = y - y_mean;

        let (coeffs, rank) = self.solve_least_squares(&x_centered, &y_centered)?;
        let intercept = y_mean - coeffs.dot(&x_means);

        Ok((coeffs, intercept, rank))
    }

    fn fit_without_intercept(&self, x: &Matrix, y: &Vector) -> Result<(Vector, usize)> {
        self.solve_least_squares(x, y)
    }

    fn solve_least_squares(&self, x: &Matrix, y: &Vector) -> Result<(Vector, usize)> {
        let solved = linalg::lstsq(x, y, self.rank_tolerance)?;
        let required = x.ncols();

        if solved.rank < required {
            match self.solver {
                SolverPolicy::Strict => {
                    return Err(Error::SingularTrainingMatrix {
                        rank: solved.rank,
                        required,
                    });
                }
                SolverPolicy::MinimumNorm => {
                    log::warn!(
                        "design matrix has rank {} of {} features, using minimum-norm solution",
                        solved.rank,
                        required
                    );
                }
            }
        }

        Ok((solved.solution, solved.rank))
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_regression_simple() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();

        for (pred, actual) in predictions.iter().zip(y.iter()) {
            assert!((pred - actual).abs() < 1e-10);
        }
        assert_eq!(model.rank, Some(1));
    }

    #[test]
    fn test_linear_regression_without_intercept() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut model = LinearRegression::with_intercept(false);
        model.fit(&x, &y).unwrap();

        let coeffs = model.coefficients.as_ref().unwrap();
        assert!((coeffs[0] - 2.0).abs() < 1e-10);
        assert_eq!(model.intercept.unwrap(), 0.0);
    }

    #[test]
    fn test_linear_regression_multivariate() {
        // y = 1 + 2 x0 + 3 x1 on non-collinear points.
        let x = array![[1.0, 2.0], [2.0, 1.0], [3.0, 5.0], [4.0, 3.0], [0.0, 1.0]];
        let y = x.rows().into_iter().map(|r| 1.0 + 2.0 * r[0] + 3.0 * r[1]).collect::<Vector>();

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let coeffs = model.coefficients.as_ref().unwrap();
        assert!((coeffs[0] - 2.0).abs() < 1e-9);
        assert!((coeffs[1] - 3.0).abs() < 1e-9);
        assert!((model.intercept.unwrap() - 1.0).abs() < 1e-9);
        assert!((model.score(&x, &y).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_features_minimum_norm() {
        // Second column duplicates the first; weight is shared equally.
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![5.0, 7.0, 9.0, 11.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let coeffs = model.coefficients.as_ref().unwrap();
        assert_eq!(model.rank, Some(1));
        assert!((coeffs[0] - 1.0).abs() < 1e-9);
        assert!((coeffs[1] - 1.0).abs() < 1e-9);
        assert!((model.intercept.unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_collinear_features_strict() {
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![5.0, 7.0, 9.0, 11.0];

        let mut model = LinearRegression::new().solver(SolverPolicy::Strict);
        let err = model.fit(&x, &y).unwrap_err();

        assert!(matches!(
            err,
            Error::SingularTrainingMatrix { rank: 1, required: 2 }
        ));
        assert!(model.coefficients.is_none());
    }

    #[test]
    fn test_predict_without_fit() {
        let x = array![[1.0], [2.0]];
        let model = LinearRegression::new();

        assert!(matches!(model.predict(&x), Err(Error::NotFitted)));
    }

    #[test]
    fn test_dimension_mismatch() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0, 3.0];

        let mut model = LinearRegression::new();
        assert!(model.fit(&x, &y).is_err());
    }

    #[test]
    fn test_predict_feature_mismatch() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 2.0, 3.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let wide = array![[1.0, 2.0]];
        assert!(matches!(
            model.predict(&wide),
            Err(Error::ShapeMismatch { got: 2, expected: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_rank_tolerance() {
        std::panic::catch_unwind(|| {
            LinearRegression::new().rank_tolerance(0.0);
        })
        .expect_err("Should panic on zero tolerance");
    }
}
