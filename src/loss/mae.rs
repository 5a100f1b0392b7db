use crate::error::Result;
use crate::math::matrix::Matrix;

pub struct MaeLoss;

impl MaeLoss {
    /// Scalar MAE: mean(|expected - predicted|)
    pub fn loss(expected: &Matrix, predicted: &Matrix) -> Result<f64> {
        let diff = expected.sub(predicted)?;
        let n = diff.len() as f64;
        Ok(diff.flatten().iter().map(|d| d.abs()).sum::<f64>() / n)
    }

    /// Per-output subgradient w.r.t. `predicted`: sign(p - y) / n  (0 when equal)
    pub fn derivative(expected: &Matrix, predicted: &Matrix) -> Result<Matrix> {
        let n = predicted.len() as f64;
        predicted.zip_map(expected, "differentiate absolute difference", |p, y| {
            let diff = p - y;
            if diff > 0.0 { 1.0 / n } else if diff < 0.0 { -1.0 / n } else { 0.0 }
        })
    }
}
