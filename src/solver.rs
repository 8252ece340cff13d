//! Boundary-condition partitioning and the reduced linear solve.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::config::SolverSettings;
use crate::errors::AnalysisError;

/// Full-length displacement and reaction vectors of a solved system.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Displacements at every degree of freedom. Restrained entries are zero.
    pub displacements: DVector<f64>,
    /// `K·U − F` at every degree of freedom. Only restrained entries are reactions;
    /// the free entries are the equilibrium residual.
    pub reactions: DVector<f64>,
}

/// Degrees of freedom not listed in `fixed_dofs`, in ascending order.
#[must_use]
pub fn free_dofs(dof_count: usize, fixed_dofs: &[usize]) -> Vec<usize> {
    let mut fixed = vec![false; dof_count];
    for &dof in fixed_dofs {
        if let Some(flag) = fixed.get_mut(dof) {
            *flag = true;
        }
    }
    (0..dof_count).filter(|&dof| !fixed[dof]).collect()
}

/// Solve `K·U = F` with the degrees of freedom in `fixed_dofs` held at zero.
///
/// The free-free block is checked for conditioning before the solve so a
/// mechanism is reported as [`AnalysisError::SingularStiffness`] instead of
/// producing non-finite displacements. A system with no free degrees of
/// freedom is valid and yields zero displacements.
///
/// # Errors
///
/// Returns [`AnalysisError::SingularStiffness`] when the reduced stiffness matrix
/// is singular or too badly conditioned for `settings`.
///
/// # Examples
/// ```
/// use nalgebra::{DMatrix, DVector};
/// use truss2d::{solver, SolverSettings};
///
/// let k = DMatrix::from_row_slice(2, 2, &[2.0, -2.0, -2.0, 2.0]);
/// let f = DVector::from_vec(vec![0.0, 4.0]);
/// let solution = solver::solve(&k, &f, &[0], &SolverSettings::default()).unwrap();
/// assert_eq!(solution.displacements[1], 2.0);
/// assert_eq!(solution.reactions[0], -4.0);
/// ```
pub fn solve(
    stiffness: &DMatrix<f64>,
    loads: &DVector<f64>,
    fixed_dofs: &[usize],
    settings: &SolverSettings,
) -> Result<Solution, AnalysisError> {
    let free = free_dofs(loads.len(), fixed_dofs);
    let free_len = free.len();
    debug!(
        free_dofs = free_len,
        fixed_dofs = loads.len() - free_len,
        "partitioned stiffness matrix"
    );

    let mut displacements = DVector::zeros(loads.len());
    if free_len > 0 {
        let k_ff = stiffness.select_rows(&free).select_columns(&free);
        let f_f = loads.select_rows(&free);

        let conditioning = reciprocal_condition(&k_ff);
        // Negated so NaN conditioning (an all-zero block) is also rejected.
        if !(conditioning > settings.singularity_tolerance) {
            return Err(AnalysisError::SingularStiffness {
                free_dofs: free_len,
                conditioning,
            });
        }

        let solution = k_ff
            .lu()
            .solve(&f_f)
            .filter(|solution| solution.iter().all(|value| value.is_finite()))
            .ok_or(AnalysisError::SingularStiffness {
                free_dofs: free_len,
                conditioning,
            })?;
        for (idx, &dof) in free.iter().enumerate() {
            displacements[dof] = solution[idx];
        }
    }

    let reactions = stiffness * &displacements - loads;
    Ok(Solution {
        displacements,
        reactions,
    })
}

/// Ratio of the smallest to the largest singular value of `matrix`.
///
/// Zero for a rank-deficient matrix and NaN for a matrix of zeros.
fn reciprocal_condition(matrix: &DMatrix<f64>) -> f64 {
    let singular_values = matrix.singular_values();
    singular_values.min() / singular_values.max()
}
