//! Small dense linear algebra for normal-equation fits

use crate::{MathError, Result};

/// Build the ridge-regularised normal equations `(XᵀX + λI) w = Xᵀy`.
///
/// Returns `(XᵀX + λI, Xᵀy)`. Every row of `rows` must have the same width.
pub fn ridge_normal_equations(
    rows: &[Vec<f64>],
    targets: &[f64],
    lambda: f64,
) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    if rows.len() != targets.len() {
        return Err(MathError::InvalidInput(format!(
            "Design matrix has {} rows but {} targets",
            rows.len(),
            targets.len()
        )));
    }
    let cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != cols) {
        return Err(MathError::InvalidInput(
            "Design matrix rows have different widths".to_string(),
        ));
    }

    let mut xtx = vec![vec![0.0; cols]; cols];
    let mut xty = vec![0.0; cols];
    for (row, &y) in rows.iter().zip(targets) {
        for a in 0..cols {
            for b in 0..cols {
                xtx[a][b] += row[a] * row[b];
            }
            xty[a] += row[a] * y;
        }
    }
    for (i, row) in xtx.iter_mut().enumerate() {
        row[i] += lambda;
    }

    Ok((xtx, xty))
}

/// Solve `matrix · w = rhs` by Gauss-Jordan elimination with partial pivoting.
///
/// A column whose pivot is exactly zero after row exchange is left unsolved:
/// its component keeps whatever the eliminated right-hand side holds, so the
/// result may contain non-finite values for singular systems and callers
/// decide how to treat them.
pub fn solve_linear_system(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Result<Vec<f64>> {
    let n = rhs.len();
    if matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(format!(
            "Expected a {n}x{n} matrix for a right-hand side of length {n}"
        )));
    }

    for i in 0..n {
        let mut max_row = i;
        for r in i + 1..n {
            if matrix[r][i].abs() > matrix[max_row][i].abs() {
                max_row = r;
            }
        }
        if max_row != i {
            matrix.swap(i, max_row);
            rhs.swap(i, max_row);
        }

        let pivot = matrix[i][i];
        if pivot == 0.0 {
            continue;
        }
        for c in i..n {
            matrix[i][c] /= pivot;
        }
        rhs[i] /= pivot;

        for r in 0..n {
            if r == i {
                continue;
            }
            let factor = matrix[r][i];
            if factor == 0.0 {
                continue;
            }
            for c in i..n {
                let delta = factor * matrix[i][c];
                matrix[r][c] -= delta;
            }
            rhs[r] -= factor * rhs[i];
        }
    }

    Ok(rhs)
}
