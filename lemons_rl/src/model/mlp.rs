use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::error::LemonsRlError;
use crate::model::{batch_loss, check_input_width, check_training_data, mini_batches, select_rows, FitConfig, Standardizer, ValueModel};

/// Network with one hidden ReLU layer and linear output, trained with mini-batch gradient
/// descent on squared error. Inputs are standardised like in [`LinearValueModel`](crate::model::LinearValueModel).
///
/// Until first fit every prediction is `0`, which makes untrained agents play uniformly.
#[derive(Debug, Clone)]
pub struct MlpValueModel{
    hidden_weights: Array2<f32>,
    hidden_bias: Array1<f32>,
    output_weights: Array1<f32>,
    output_bias: f32,
    scaler: Option<Standardizer>,
    learning_rate: f32,
    rng: StdRng,
}

struct Forward{
    pre_activation: Array2<f32>,
    activation: Array2<f32>,
    output: Array1<f32>,
}

impl MlpValueModel{

    /// Creates network with weights initialised uniformly in Glorot range.
    pub fn new(input_dim: usize, hidden: usize, learning_rate: f32, seed: u64) -> Self{
        let mut rng = StdRng::seed_from_u64(seed);
        let limit_hidden = (6.0 / (input_dim + hidden).max(1) as f32).sqrt();
        let limit_output = (6.0 / (hidden + 1) as f32).sqrt();
        let hidden_weights = Array2::from_shape_fn((input_dim, hidden), |_| rng.random_range(-limit_hidden..=limit_hidden));
        let output_weights = Array1::from_shape_fn(hidden, |_| rng.random_range(-limit_output..=limit_output));
        Self{
            hidden_weights,
            hidden_bias: Array1::zeros(hidden),
            output_weights,
            output_bias: 0.0,
            scaler: None,
            learning_rate,
            rng,
        }
    }

    pub fn input_dim(&self) -> usize{
        self.hidden_weights.nrows()
    }

    pub fn hidden_width(&self) -> usize{
        self.hidden_weights.ncols()
    }

    pub fn is_fitted(&self) -> bool{
        self.scaler.is_some()
    }

    fn forward(&self, x: ArrayView2<f32>) -> Forward{
        let pre_activation = x.dot(&self.hidden_weights) + &self.hidden_bias;
        let activation = pre_activation.mapv(|z| z.max(0.0));
        let output = activation.dot(&self.output_weights) + self.output_bias;
        Forward{pre_activation, activation, output}
    }

    fn step(&mut self, x: ArrayView2<f32>, y: ArrayView1<f32>) -> Result<f32, LemonsRlError>{
        let Forward{pre_activation, activation, output} = self.forward(x);
        let loss = batch_loss(&output, &y)?;
        let d_output = (output - &y) * (2.0 / y.len() as f32);

        let grad_output_weights = activation.t().dot(&d_output);
        let grad_output_bias = d_output.sum();

        let d_activation = d_output.view().insert_axis(Axis(1))
            .dot(&self.output_weights.view().insert_axis(Axis(0)));
        let d_pre = d_activation * pre_activation.mapv(|z| if z > 0.0 { 1.0 } else { 0.0 });
        let grad_hidden_weights = x.t().dot(&d_pre);
        let grad_hidden_bias = d_pre.sum_axis(Axis(0));

        let lr = self.learning_rate;
        self.output_weights.scaled_add(-lr, &grad_output_weights);
        self.output_bias -= lr * grad_output_bias;
        self.hidden_weights.scaled_add(-lr, &grad_hidden_weights);
        self.hidden_bias.scaled_add(-lr, &grad_hidden_bias);
        Ok(loss)
    }
}

impl ValueModel for MlpValueModel{
    fn fit(&mut self, x: ArrayView2<f32>, y: ArrayView1<f32>, config: &FitConfig) -> Result<(), LemonsRlError> {
        check_training_data(&x, &y, self.input_dim())?;
        let xs = self.scaler.get_or_insert_with(|| Standardizer::fit(x)).transform(x);
        let xs = xs.view();

        for _epoch in 0..config.epochs{
            for batch in mini_batches(xs.nrows(), config.batch_size, &mut self.rng){
                let (xb, yb) = select_rows(&xs, &y, &batch);
                let _loss = self.step(xb.view(), yb.view())?;
                #[cfg(feature = "log_trace")]
                log::trace!("MLP epoch {_epoch}: batch loss {_loss}");
            }
        }
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f32>) -> Result<Array1<f32>, LemonsRlError> {
        check_input_width(&x, self.input_dim())?;
        match &self.scaler{
            None => Ok(Array1::zeros(x.nrows())),
            Some(scaler) => Ok(self.forward(scaler.transform(x).view()).output)
        }
    }
}

#[cfg(test)]
mod tests{
    use ndarray::{Array1, Array2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use crate::model::{mean_squared_error, FitConfig, MlpValueModel, ValueModel};

    #[test]
    fn predicts_zero_before_fit(){
        let model = MlpValueModel::new(10, 16, 0.01, 5);
        assert!(!model.is_fitted());
        let p = model.predict(Array2::<f32>::ones((3, 10)).view()).unwrap();
        assert_eq!(p, Array1::<f32>::zeros(3));
    }

    #[test]
    fn training_reduces_error_on_nonlinear_target(){
        let mut rng = StdRng::seed_from_u64(11);
        let x = Array2::from_shape_fn((300, 2), |_| rng.random_range(-3.0f32..3.0));
        let y: Array1<f32> = x.rows().into_iter().map(|r| r[0].abs() + 0.5 * r[1]).collect();
        let mut model = MlpValueModel::new(2, 16, 0.02, 2);
        let config = FitConfig{batch_size: 10, epochs: 1, holdout_fraction: 0.0};
        model.fit(x.view(), y.view(), &config).unwrap();
        let early = mean_squared_error(model.predict(x.view()).unwrap().view(), y.view());
        let config = FitConfig{batch_size: 10, epochs: 60, holdout_fraction: 0.0};
        model.fit(x.view(), y.view(), &config).unwrap();
        let late = mean_squared_error(model.predict(x.view()).unwrap().view(), y.view());
        assert!(late < early);
        assert!(late < 0.3);
    }
}
