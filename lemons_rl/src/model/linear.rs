use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::error::LemonsRlError;
use crate::model::{batch_loss, check_input_width, check_training_data, mini_batches, select_rows, FitConfig, Standardizer, ValueModel};

/// Linear regression on standardised inputs, trained with mini-batch gradient descent on
/// squared error.
///
/// Input scaling is estimated on first call to [`fit`](ValueModel::fit) and kept afterwards,
/// so subsequent fits continue training in the same input space.
/// Until first fit every prediction is `0`.
#[derive(Debug, Clone)]
pub struct LinearValueModel{
    weights: Array1<f32>,
    bias: f32,
    scaler: Option<Standardizer>,
    learning_rate: f32,
    rng: StdRng,
}

impl LinearValueModel{
    pub fn new(input_dim: usize, learning_rate: f32, seed: u64) -> Self{
        Self{
            weights: Array1::zeros(input_dim),
            bias: 0.0,
            scaler: None,
            learning_rate,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn input_dim(&self) -> usize{
        self.weights.len()
    }

    pub fn weights(&self) -> &Array1<f32>{
        &self.weights
    }

    pub fn bias(&self) -> f32{
        self.bias
    }

    pub fn is_fitted(&self) -> bool{
        self.scaler.is_some()
    }
}

impl ValueModel for LinearValueModel{
    fn fit(&mut self, x: ArrayView2<f32>, y: ArrayView1<f32>, config: &FitConfig) -> Result<(), LemonsRlError> {
        check_training_data(&x, &y, self.input_dim())?;
        let scaler = self.scaler.get_or_insert_with(|| Standardizer::fit(x));
        let xs = scaler.transform(x);
        let xs = xs.view();

        for _epoch in 0..config.epochs{
            for batch in mini_batches(xs.nrows(), config.batch_size, &mut self.rng){
                let (xb, yb) = select_rows(&xs, &y, &batch);
                let prediction = xb.dot(&self.weights) + self.bias;
                batch_loss(&prediction, &yb.view())?;
                let error = (prediction - &yb) * (2.0 / batch.len() as f32);
                let grad_w = xb.t().dot(&error);
                self.weights.scaled_add(-self.learning_rate, &grad_w);
                self.bias -= self.learning_rate * error.sum();
            }
        }
        #[cfg(feature = "log_trace")]
        log::trace!("Linear model after fit: weights {:?}, bias {}", self.weights, self.bias);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f32>) -> Result<Array1<f32>, LemonsRlError> {
        check_input_width(&x, self.input_dim())?;
        match &self.scaler{
            None => Ok(Array1::zeros(x.nrows())),
            Some(scaler) => Ok(scaler.transform(x).dot(&self.weights) + self.bias)
        }
    }
}
