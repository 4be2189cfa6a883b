use crate::c64;
use crate::defaults::ASSIGNMENT_WEIGHT_SCALE;
use crate::error::{DynamicsError, Result};
use crate::hamiltonian::validate_permutation;
use crate::linalg::dagger;
use itertools::iproduct;
use ndarray::prelude::*;
use pathfinding::prelude::{kuhn_munkres, Matrix as pfMatrix};
use serde::{Deserialize, Serialize};

/// Strategy used to match the adiabatic states of two consecutive steps.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentPolicy {
    /// take the largest remaining squared overlap until all states are matched
    #[default]
    Greedy,
    /// maximize the sum of the squared overlaps (Kuhn-Munkres)
    Optimal,
}

/// Overlap `X = U_prev^† U_new` between the adiabatic states of two steps
pub fn state_overlap(u_prev: ArrayView2<c64>, u_new: ArrayView2<c64>) -> Array2<c64> {
    dagger(u_prev).dot(&u_new)
}

/// Matches the old states (rows of `overlap`) to the new states (columns).
/// `perm[i] = j` means that the new state `j` carries the identity of old state `i`.
pub fn get_reordering(overlap: ArrayView2<c64>, policy: AssignmentPolicy) -> Result<Vec<usize>> {
    let n: usize = overlap.nrows();
    DynamicsError::check_dim("state overlap", n, overlap.ncols())?;
    let weights: Array2<f64> = overlap.mapv(|val| val.norm_sqr());
    if weights.iter().any(|val| !val.is_finite()) {
        return Err(DynamicsError::Degeneracy(String::from(
            "state overlap contains non-finite elements",
        )));
    }
    let perm: Vec<usize> = match policy {
        AssignmentPolicy::Greedy => greedy_assignment(weights.view()),
        AssignmentPolicy::Optimal => optimal_assignment(weights.view())?,
    };
    validate_permutation(&perm, n)?;
    Ok(perm)
}

fn greedy_assignment(weights: ArrayView2<f64>) -> Vec<usize> {
    let n: usize = weights.nrows();
    let mut perm: Vec<usize> = vec![0; n];
    let mut row_done: Vec<bool> = vec![false; n];
    let mut col_done: Vec<bool> = vec![false; n];

    for _ in 0..n {
        let mut best: Option<(usize, usize)> = None;
        let mut best_val: f64 = f64::NEG_INFINITY;
        // row-major scan, the first maximum wins
        for (i, j) in iproduct!(0..n, 0..n).filter(|&(i, j)| !row_done[i] && !col_done[j]) {
            if weights[[i, j]] > best_val {
                best_val = weights[[i, j]];
                best = Some((i, j));
            }
        }
        if let Some((i, j)) = best {
            perm[i] = j;
            row_done[i] = true;
            col_done[j] = true;
        }
    }
    perm
}

fn optimal_assignment(weights: ArrayView2<f64>) -> Result<Vec<usize>> {
    let scaled: Vec<i64> = weights
        .iter()
        .map(|val| (val * ASSIGNMENT_WEIGHT_SCALE).round() as i64)
        .collect();
    let matrix = pfMatrix::square_from_vec(scaled)
        .map_err(|err| DynamicsError::Degeneracy(format!("{:?}", err)))?;
    let (_max_overlap, order) = kuhn_munkres(&matrix);
    Ok(order)
}

/// Move the amplitude of old state `i` to index `perm[i]`
pub fn permute_amplitudes(mut c: ArrayViewMut1<c64>, perm: &[usize]) -> Result<()> {
    validate_permutation(perm, c.len())?;
    let old: Array1<c64> = c.to_owned();
    for (i, &pi) in perm.iter().enumerate() {
        c[pi] = old[i];
    }
    Ok(())
}

/// Move column `i` of `u` to column `perm[i]`
pub fn permute_columns(u: &mut Array2<c64>, perm: &[usize]) -> Result<()> {
    validate_permutation(perm, u.ncols())?;
    let old: Array2<c64> = u.clone();
    for (i, &pi) in perm.iter().enumerate() {
        u.column_mut(pi).assign(&old.column(i));
    }
    Ok(())
}

/// Amplitude counterpart of a phase change of the basis states, `C_j <- C_j conj(phase_j)`
pub fn phase_correct_amplitudes(mut c: ArrayViewMut1<c64>, phases: ArrayView1<c64>) -> Result<()> {
    DynamicsError::check_dim("phase factors", c.len(), phases.len())?;
    c.zip_mut_with(&phases, |val, phase| *val *= phase.conj());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::norm_sqr;
    use approx::assert_abs_diff_eq;

    fn real(mat: Array2<f64>) -> Array2<c64> {
        mat.mapv(|val| c64::new(val, 0.0))
    }

    #[test]
    fn identity_overlap_keeps_order() {
        let overlap: Array2<c64> = Array2::eye(4);
        for policy in [AssignmentPolicy::Greedy, AssignmentPolicy::Optimal] {
            assert_eq!(get_reordering(overlap.view(), policy).unwrap(), vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn swapped_states_are_detected() {
        let overlap = real(array![
            [0.1, 0.99, 0.0],
            [0.99, -0.1, 0.0],
            [0.0, 0.0, -1.0]
        ]);
        for policy in [AssignmentPolicy::Greedy, AssignmentPolicy::Optimal] {
            assert_eq!(get_reordering(overlap.view(), policy).unwrap(), vec![1, 0, 2]);
        }
    }

    #[test]
    fn optimal_assignment_beats_greedy_choice() {
        // greedy takes (0,0) first and is left with the weak pair (1,1)
        let overlap = real(array![[0.9, 0.85], [0.85, 0.1]]);
        assert_eq!(
            get_reordering(overlap.view(), AssignmentPolicy::Greedy).unwrap(),
            vec![0, 1]
        );
        assert_eq!(
            get_reordering(overlap.view(), AssignmentPolicy::Optimal).unwrap(),
            vec![1, 0]
        );
    }

    #[test]
    fn ties_prefer_lowest_indices() {
        let overlap = real(array![[0.5, 0.5], [0.5, 0.5]]);
        assert_eq!(
            get_reordering(overlap.view(), AssignmentPolicy::Greedy).unwrap(),
            vec![0, 1]
        );
    }

    #[test]
    fn non_finite_overlap_is_an_error() {
        let overlap = real(array![[f64::NAN, 0.0], [0.0, 1.0]]);
        assert!(matches!(
            get_reordering(overlap.view(), AssignmentPolicy::Greedy),
            Err(DynamicsError::Degeneracy(_))
        ));
    }

    #[test]
    fn permutation_and_phases_preserve_norm() {
        let mut c: Array1<c64> = array![
            c64::new(0.6, 0.0),
            c64::new(0.0, 0.48),
            c64::new(0.64, 0.0)
        ];
        permute_amplitudes(c.view_mut(), &[2, 0, 1]).unwrap();
        assert_eq!(c[2], c64::new(0.6, 0.0));
        assert_eq!(c[0], c64::new(0.0, 0.48));
        let phases: Array1<c64> = array![
            c64::new(0.0, 1.0),
            c64::new(-1.0, 0.0),
            c64::new(0.6, 0.8)
        ];
        phase_correct_amplitudes(c.view_mut(), phases.view()).unwrap();
        assert_abs_diff_eq!(norm_sqr(c.view()), 1.0, epsilon = 1e-12);
        assert!(matches!(
            permute_amplitudes(c.view_mut(), &[0, 0, 1]),
            Err(DynamicsError::InvalidPermutation(_))
        ));
    }

    #[test]
    fn columns_follow_the_permutation() {
        let mut u: Array2<c64> = real(array![[1.0, 2.0], [3.0, 4.0]]);
        permute_columns(&mut u, &[1, 0]).unwrap();
        assert_eq!(u, real(array![[2.0, 1.0], [4.0, 3.0]]));
    }
}
