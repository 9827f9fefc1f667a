use super::Matrix;
use crate::dtype::DType;
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A matrix is written as a sequence of rows, each a sequence of floats.
///
/// Entries are widened to `f64` on the way out, so an `f32` matrix survives
/// a round trip exactly: the shortest `f64` decimal parses back to the same
/// `f64`, which narrows back to the same `f32` without rounding.
impl<F: DType> Serialize for Matrix<F> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(
            self.iter_rows()
                .map(|row| row.iter().map(|&x| x.as_f64()).collect::<Vec<f64>>()),
        )
    }
}

impl<'de, F: DType> Deserialize<'de> for Matrix<F> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<Vec<f64>>::deserialize(deserializer)?
            .into_iter()
            .map(|row| row.into_iter().map(F::from_f64).collect())
            .collect();
        Matrix::from_rows(rows).map_err(D::Error::custom)
    }
}
