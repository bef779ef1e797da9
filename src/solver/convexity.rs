//! Convexity check for quadratic objectives.
//!
//! The relaxation solver needs a positive semidefinite P. The check runs a
//! symmetric eigen-decomposition on the dense Hessian, which is fine for the
//! model sizes a diet problem produces.

use nalgebra::SymmetricEigen;
use nalgebra_sparse::CscMatrix;

use crate::error::{DietError, Result};
use crate::sparse::upper_to_symmetric;

/// Relative tolerance on the smallest eigenvalue.
const EIG_TOL: f64 = 1e-9;

/// Ensure the upper-triangular Hessian `p` is positive semidefinite.
pub fn ensure_convex(p: &CscMatrix<f64>) -> Result<()> {
    if p.nnz() == 0 {
        return Ok(());
    }

    let hessian = upper_to_symmetric(p);
    let eigen = SymmetricEigen::new(hessian);
    let min = eigen.eigenvalues.min();
    let scale = eigen.eigenvalues.amax().max(1.0);

    if min < -EIG_TOL * scale {
        return Err(DietError::UnsupportedModel(format!(
            "objective is not convex (smallest Hessian eigenvalue {:.3e})",
            min
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::Triplets;

    #[test]
    fn test_linear_is_convex() {
        let p = CscMatrix::zeros(3, 3);
        assert!(ensure_convex(&p).is_ok());
    }

    #[test]
    fn test_psd_accepted() {
        // x^2 + xy + y^2
        let p = [(0, 0, 2.0), (0, 1, 1.0), (1, 1, 2.0)]
            .into_iter()
            .collect::<Triplets>()
            .to_csc(2, 2);
        assert!(ensure_convex(&p).is_ok());
    }

    #[test]
    fn test_indefinite_rejected() {
        // xy alone is indefinite
        let p = [(0, 1, 1.0)].into_iter().collect::<Triplets>().to_csc(2, 2);
        assert!(matches!(
            ensure_convex(&p),
            Err(DietError::UnsupportedModel(_))
        ));
    }
}
