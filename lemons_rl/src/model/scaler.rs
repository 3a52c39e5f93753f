use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Per column standardisation of inputs (zero mean, unit variance).
/// Columns with (almost) no variance are only shifted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer{
    mean: Array1<f32>,
    scale: Array1<f32>,
}

impl Standardizer{

    pub fn fit(x: ArrayView2<f32>) -> Self{
        let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(x.ncols()));
        let scale = x.std_axis(Axis(0), 0.0).mapv(|s| if s > 1e-6 { s } else { 1.0 });
        Self{mean, scale}
    }

    pub fn transform(&self, x: ArrayView2<f32>) -> Array2<f32>{
        (&x - &self.mean) / &self.scale
    }

    pub fn mean(&self) -> &Array1<f32>{
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f32>{
        &self.scale
    }
}
