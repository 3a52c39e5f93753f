mod config;
mod scaler;
mod linear;
mod mlp;

pub use config::*;
pub use scaler::*;
pub use linear::*;
pub use mlp::*;

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use rand::seq::SliceRandom;
use crate::error::LemonsRlError;

/// Function approximator estimating expected discounted payoff of feature row (which includes
/// candidate action).
///
/// Agent never inspects internals of the model, it only calls [`fit`](ValueModel::fit) with
/// collected examples and [`predict`](ValueModel::predict) with one row per candidate action.
pub trait ValueModel: Send{
    /// Trains model on rows of `x` with targets `y`.
    /// Uses `batch_size` and `epochs` of config, holdout split is done by caller.
    fn fit(&mut self, x: ArrayView2<f32>, y: ArrayView1<f32>, config: &FitConfig) -> Result<(), LemonsRlError>;

    /// Predicts one value per row of `x`.
    fn predict(&self, x: ArrayView2<f32>) -> Result<Array1<f32>, LemonsRlError>;
}

impl<T: ValueModel + ?Sized> ValueModel for Box<T>{
    fn fit(&mut self, x: ArrayView2<f32>, y: ArrayView1<f32>, config: &FitConfig) -> Result<(), LemonsRlError> {
        self.as_mut().fit(x, y, config)
    }

    fn predict(&self, x: ArrayView2<f32>) -> Result<Array1<f32>, LemonsRlError> {
        self.as_ref().predict(x)
    }
}

/// Mean squared error between prediction and target.
/// Returns `0` for empty input.
pub fn mean_squared_error(prediction: ArrayView1<f32>, target: ArrayView1<f32>) -> f32{
    let diff = &prediction - &target;
    diff.mapv(|d| d * d).mean().unwrap_or(0.0)
}

pub(crate) fn check_input_width(x: &ArrayView2<f32>, input_dim: usize) -> Result<(), LemonsRlError>{
    if x.ncols() != input_dim{
        return Err(LemonsRlError::DimensionMismatch {
            expected: input_dim,
            got: x.ncols(),
            context: "input width".into(),
        })
    }
    Ok(())
}

pub(crate) fn check_training_data(x: &ArrayView2<f32>, y: &ArrayView1<f32>, input_dim: usize) -> Result<(), LemonsRlError>{
    check_input_width(x, input_dim)?;
    if x.nrows() != y.len(){
        return Err(LemonsRlError::DimensionMismatch {
            expected: x.nrows(),
            got: y.len(),
            context: "number of targets".into(),
        })
    }
    if x.nrows() == 0{
        return Err(LemonsRlError::NoTrainingData)
    }
    Ok(())
}

/// Shuffled row indices split into mini-batches.
pub(crate) fn mini_batches<R: Rng + ?Sized>(rows: usize, batch_size: usize, rng: &mut R) -> Vec<Vec<usize>>{
    let mut indices: Vec<usize> = (0..rows).collect();
    indices.shuffle(rng);
    indices.chunks(batch_size.max(1)).map(|c| c.to_vec()).collect()
}

pub(crate) fn batch_loss(prediction: &Array1<f32>, target: &ArrayView1<f32>) -> Result<f32, LemonsRlError>{
    let loss = mean_squared_error(prediction.view(), target.view());
    if !loss.is_finite(){
        return Err(LemonsRlError::NonFiniteLoss(loss))
    }
    Ok(loss)
}

pub(crate) fn select_rows(x: &ArrayView2<f32>, y: &ArrayView1<f32>, rows: &[usize]) -> (ndarray::Array2<f32>, Array1<f32>){
    (x.select(Axis(0), rows), y.select(Axis(0), rows))
}
