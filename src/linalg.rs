//! Least-squares solving through a one-sided Jacobi singular value decomposition.
//!
//! The solver handles rank-deficient and under-determined systems by returning
//! the minimum-norm solution, and reports the numerical rank so that callers can
//! decide whether such a solution is acceptable.

use crate::error::{Error, Result};
use crate::{Matrix, Vector};

const MAX_SWEEPS: usize = 60;

#[derive(Clone, Debug)]
pub struct LeastSquares {
    /// Minimum-norm minimizer of `||a x - b||`.
    pub solution: Vector,
    /// Unsorted, one per column of `a`.
    pub singular_values: Vector,
    pub rank: usize,
}

/// Solves `a x ≈ b` in the least-squares sense.
///
/// Singular values at or below `rank_tolerance * sigma_max` are treated as
/// zero and their directions are left out of the solution.
pub fn lstsq(a: &Matrix, b: &Vector, rank_tolerance: f64) -> Result<LeastSquares> {
    let (m, n) = a.dim();

    if m == 0 || n == 0 {
        return Err(Error::EmptyDataset);
    }

    if b.len() != m {
        return Err(Error::ShapeMismatch {
            what: "right-hand side",
            got: b.len(),
            expected: m,
        });
    }

    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
        return Err(Error::invalid_input(
            "design matrix",
            "contains non-finite values",
        ));
    }

    let (orthogonal, singular_values, v) = jacobi_svd(a)?;

    let sigma_max = singular_values.iter().cloned().fold(0.0, f64::max);
    let cutoff = rank_tolerance * sigma_max;

    let mut solution = Vector::zeros(n);
    let mut rank = 0;

    for k in 0..n {
        let sigma = singular_values[k];
        if sigma <= cutoff || sigma == 0.0 {
            continue;
        }

        rank += 1;
        // The k-th column of A V is sigma_k u_k.
        let coef = orthogonal.column(k).dot(b) / (sigma * sigma);
        solution.scaled_add(coef, &v.column(k));
    }

    Ok(LeastSquares {
        solution,
        singular_values,
        rank,
    })
}

/// Numerical rank of `a` under the same cutoff rule as [`lstsq`].
pub fn rank(a: &Matrix, rank_tolerance: f64) -> Result<usize> {
    if a.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let (_, singular_values, _) = jacobi_svd(a)?;
    let sigma_max = singular_values.iter().cloned().fold(0.0, f64::max);
    let cutoff = rank_tolerance * sigma_max;

    Ok(singular_values.iter().filter(|&&s| s > cutoff && s > 0.0).count())
}

/// Orthogonalizes the columns of `a` by plane rotations.
///
/// Returns `(A V, sigma, V)` where the columns of `A V` are mutually orthogonal
/// and `sigma` holds their norms.
fn jacobi_svd(a: &Matrix) -> Result<(Matrix, Vector, Matrix)> {
    let (m, n) = a.dim();
    let mut b = a.clone();
    let mut v = Matrix::eye(n);

    // A pair of columns counts as orthogonal once their cosine is within the
    // rounding error of an m-term dot product.
    let orthogonality_eps = 4.0 * m.max(1) as f64 * f64::EPSILON;

    // Columns whose squared norm falls under this floor are numerically zero.
    let frobenius_sq = a.iter().map(|x| x * x).sum::<f64>();
    let floor = f64::EPSILON * f64::EPSILON * frobenius_sq;

    for sweep in 0..MAX_SWEEPS {
        let mut rotated = false;

        for p in 0..n.saturating_sub(1) {
            for q in (p + 1)..n {
                let alpha = b.column(p).dot(&b.column(p));
                let beta = b.column(q).dot(&b.column(q));
                let gamma = b.column(p).dot(&b.column(q));

                if alpha.min(beta) <= floor
                    || gamma.abs() <= orthogonality_eps * (alpha * beta).sqrt()
                {
                    continue;
                }

                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = c * t;

                rotate_columns(&mut b, p, q, c, s);
                rotate_columns(&mut v, p, q, c, s);
            }
        }

        if !rotated {
            log::debug!("jacobi svd converged after {} sweeps", sweep + 1);
            let singular_values = Vector::from_iter(
                b.columns().into_iter().map(|col| col.dot(&col).sqrt()),
            );
            return Ok((b, singular_values, v));
        }
    }

    Err(Error::NoConvergence { sweeps: MAX_SWEEPS })
}

fn rotate_columns(m: &mut Matrix, p: usize, q: usize, c: f64, s: f64) {
    for i in 0..m.nrows() {
        let xp = m[(i, p)];
        let xq = m[(i, q)];
        m[(i, p)] = c * xp - s * xq;
        m[(i, q)] = s * xp + c * xq;
    }
}
