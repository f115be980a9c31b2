use nalgebra::{DMatrix, DVector};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("matrix is singular to working precision")]
    Singular,
    #[error("matrix is {rows}x{cols} but right-hand side has length {len}")]
    Dimension { rows: usize, cols: usize, len: usize },
}

/// Solves `A·x = b`, overwriting `b` with `x`.
pub trait LinearSolver {
    fn solve(&self, a: DMatrix<f64>, b: &mut [f64]) -> Result<(), SolveError>;
}

/// Dense LU factorisation with partial pivoting.
///
/// A pivot smaller than `pivot_tol` times the largest pivot is treated as
/// zero, so nearly singular systems are rejected rather than producing a
/// huge, meaningless correction.
#[derive(Debug, Clone, Copy)]
pub struct DenseLU {
    pub pivot_tol: f64,
}

impl Default for DenseLU {
    fn default() -> Self {
        Self { pivot_tol: 1e-13 }
    }
}

impl LinearSolver for DenseLU {
    fn solve(&self, a: DMatrix<f64>, b: &mut [f64]) -> Result<(), SolveError> {
        let (rows, cols) = a.shape();
        if rows != cols || rows != b.len() {
            return Err(SolveError::Dimension {
                rows,
                cols,
                len: b.len(),
            });
        }
        if rows == 0 {
            return Ok(());
        }

        let lu = a.lu();
        let pivots = lu.u().diagonal().map(|u| u.abs());
        let max = pivots.max();
        if !(max.is_finite() && max > 0.0) || pivots.min() <= self.pivot_tol * max {
            return Err(SolveError::Singular);
        }

        let x = lu
            .solve(&DVector::from_column_slice(b))
            .ok_or(SolveError::Singular)?;
        if x.iter().any(|x| !x.is_finite()) {
            return Err(SolveError::Singular);
        }
        b.copy_from_slice(x.as_slice());
        Ok(())
    }
}
