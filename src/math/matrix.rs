use rand::Rng;
use serde::{Serialize, Deserialize};
use std::fmt;

use crate::error::{Result, XorError};

/// Dense row-major matrix. Rows index the batch, columns the features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![value; cols]; rows]
        }
    }

    /// Glorot (Xavier) uniform initialization: samples from
    /// U(-limit, limit) with `limit = sqrt(6 / (rows + cols))`.
    ///
    /// `rows` is the fan-in and `cols` the fan-out of the layer.
    pub fn glorot_uniform<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let limit = (6.0 / (rows + cols) as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = rng.gen_range(-limit..limit);
            }
        }
        res
    }

    /// Builds a matrix from row vectors, rejecting empty or ragged input.
    pub fn from_rows(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = data.first().map(|row| row.len()).ok_or(XorError::EmptyBatch)?;
        if let Some((row, bad)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(XorError::FeatureMismatch { row, expected: cols, got: bad.len() });
        }
        Ok(Matrix { rows: data.len(), cols, data })
    }

    /// Builds a `rows x cols` matrix from a flat row-major slice. A matrix
    /// with rows but no columns is rejected.
    pub fn from_flat(rows: usize, cols: usize, values: &[f64]) -> Result<Matrix> {
        if values.len() != rows * cols || (cols == 0 && rows != 0) {
            return Err(XorError::ShapeMismatch {
                op: "reshape",
                left_rows: rows,
                left_cols: cols,
                right_rows: 1,
                right_cols: values.len(),
            });
        }
        let data = values.chunks(cols.max(1)).map(|row| row.to_vec()).collect();
        Ok(Matrix { rows, cols, data })
    }

    /// A single column holding `values`.
    pub fn column(values: &[f64]) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.iter().map(|v| vec![*v]).collect(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row-major copy of every element.
    pub fn flatten(&self) -> Vec<f64> {
        self.data.iter().flatten().copied().collect()
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|x| functor(*x)).collect())
                .collect(),
        }
    }

    /// Element-wise combination of two same-shape matrices.
    pub fn zip_map<F>(&self, rhs: &Matrix, op: &'static str, functor: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same_shape(rhs, op)?;
        let data = self.data.iter().zip(rhs.data.iter())
            .map(|(row_a, row_b)| {
                row_a.iter().zip(row_b.iter()).map(|(x, y)| functor(*x, *y)).collect()
            })
            .collect();
        Ok(Matrix { rows: self.rows, cols: self.cols, data })
    }

    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_map(rhs, "add", |a, b| a + b)
    }

    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_map(rhs, "subtract", |a, b| a - b)
    }

    /// Hadamard product.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_map(rhs, "multiply element-wise", |a, b| a * b)
    }

    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(self.mismatch(rhs, "matmul"));
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        Ok(res)
    }

    /// Adds the `1 x cols` row `bias` to every row.
    pub fn add_row(&self, bias: &Matrix) -> Result<Matrix> {
        if bias.rows != 1 || bias.cols != self.cols {
            return Err(self.mismatch(bias, "add bias"));
        }
        let data = self.data.iter()
            .map(|row| row.iter().zip(bias.data[0].iter()).map(|(x, b)| x + b).collect())
            .collect();
        Ok(Matrix { rows: self.rows, cols: self.cols, data })
    }

    /// Sums over the batch dimension, producing a `1 x cols` row.
    pub fn column_sums(&self) -> Matrix {
        let mut res = Matrix::zeros(1, self.cols);
        for row in &self.data {
            for (acc, x) in res.data[0].iter_mut().zip(row.iter()) {
                *acc += x;
            }
        }
        res
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_same_shape(&self, rhs: &Matrix, op: &'static str) -> Result<()> {
        if self.shape() != rhs.shape() {
            return Err(self.mismatch(rhs, op));
        }
        Ok(())
    }

    fn mismatch(&self, rhs: &Matrix, op: &'static str) -> XorError {
        XorError::ShapeMismatch {
            op,
            left_rows: self.rows,
            left_cols: self.cols,
            right_rows: rhs.rows,
            right_cols: rhs.cols,
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

/// Tab-separated rows, one line per row.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.data {
            for value in row {
                write!(f, "{value}\t")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn matmul_multiplies_rows_by_columns() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = Matrix::from_rows(vec![vec![5.0], vec![6.0]]).unwrap();
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.shape(), (2, 1));
        assert_eq!(c.flatten(), vec![17.0, 39.0]);
    }

    #[test]
    fn matmul_rejects_inner_dimension_mismatch() {
        let a = Matrix::zeros(4, 2);
        let b = Matrix::zeros(3, 1);
        let err = a.matmul(&b).unwrap_err();
        assert!(matches!(err, XorError::ShapeMismatch { op: "matmul", .. }));
        assert!(err.to_string().contains("4x2"));
    }

    #[test]
    fn from_rows_rejects_ragged_and_empty() {
        assert!(matches!(Matrix::from_rows(vec![]), Err(XorError::EmptyBatch)));
        let ragged = Matrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]);
        assert!(matches!(
            ragged,
            Err(XorError::FeatureMismatch { row: 1, expected: 2, got: 1 })
        ));
    }

    #[test]
    fn add_row_broadcasts_bias() {
        let x = Matrix::from_rows(vec![vec![1.0, 1.0], vec![2.0, 2.0]]).unwrap();
        let b = Matrix::from_rows(vec![vec![0.5, -1.0]]).unwrap();
        assert_eq!(x.add_row(&b).unwrap().flatten(), vec![1.5, 0.0, 2.5, 1.0]);
        assert!(x.add_row(&Matrix::zeros(1, 3)).is_err());
    }

    #[test]
    fn column_sums_reduce_batch() {
        let x = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(x.column_sums().flatten(), vec![4.0, 6.0]);
    }

    #[test]
    fn glorot_uniform_stays_within_limit() {
        let mut rng = StdRng::seed_from_u64(7);
        let w = Matrix::glorot_uniform(8, 4, &mut rng);
        let limit = (6.0f64 / 12.0).sqrt();
        assert_eq!(w.shape(), (8, 4));
        assert!(w.flatten().iter().all(|v| v.abs() < limit));
    }

    #[test]
    fn from_flat_rejects_rows_without_columns() {
        let err = Matrix::from_flat(3, 0, &[]).unwrap_err();
        assert!(matches!(err, XorError::ShapeMismatch { op: "reshape", left_rows: 3, left_cols: 0, .. }));
        assert!(Matrix::from_flat(2, 2, &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn display_prints_tab_separated_rows() {
        let x = Matrix::from_flat(2, 2, &[1.0, 0.5, 0.0, 2.0]).unwrap();
        assert_eq!(x.to_string(), "1\t0.5\t\n0\t2\t\n");
    }
}
