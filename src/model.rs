//! The trainable-model capability consumed by the train/evaluate harness.

use std::str::FromStr;

use rand::Rng;
use rand_distr::Distribution;

use crate::{
    autodiff::{Tape, Variable},
    dataset::Sample,
    error::{Error, Result},
};

/// A supervised model that can take one training step and report its error on a partition.
///
/// The training-step algorithm is opaque to callers; the harness owns only the
/// epoch loop and bookkeeping around this trait.
pub trait Model<const M: usize, const N: usize> {
    /// Number of input features the model consumes.
    fn input_count(&self) -> usize;

    /// Number of output values the model produces.
    fn output_count(&self) -> usize;

    /// Update the parameters with one full-batch momentum gradient-descent step on the mean
    /// squared error over `train`.
    fn train_step(
        &mut self,
        train: &[Sample<M, N>],
        learning_rate: f64,
        momentum: f64,
    ) -> Result<()>;

    /// Compute the mean squared error over `samples` without touching the parameters.
    fn mean_squared_error(&self, samples: &[Sample<M, N>]) -> f64;
}

/// Nonlinearity applied by every neuron of a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// The identity function.
    Identity,
    /// The logistic sigmoid.
    Sigmoid,
    /// The hyperbolic tangent.
    Tanh,
    /// The rectified linear unit.
    Relu,
}

impl Activation {
    /// Apply the nonlinearity to a variable on the tape.
    fn call<'a>(self, x: &Variable<'a>) -> Variable<'a> {
        match self {
            Self::Identity => x.identity(),
            Self::Sigmoid => x.sigmoid(),
            Self::Tanh => x.tanh(),
            Self::Relu => x.relu(),
        }
    }

    /// Apply the nonlinearity to a plain scalar, outside the tape.
    fn eval(self, x: f64) -> f64 {
        match self {
            Self::Identity => x,
            Self::Sigmoid => {
                let exp = x.exp();
                exp / (1.0 + exp)
            }
            Self::Tanh => x.tanh(),
            Self::Relu => x.max(0.0),
        }
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "identity" => Ok(Self::Identity),
            "sigmoid" => Ok(Self::Sigmoid),
            "tanh" => Ok(Self::Tanh),
            "relu" => Ok(Self::Relu),
            _ => Err(Error::InvalidParameter(format!(
                "unknown activation {:?}",
                s
            ))),
        }
    }
}

/// A trainable scalar paired with its momentum velocity.
#[derive(Debug)]
struct Parameter<'a> {
    var: Variable<'a>,
    velocity: f64,
}

impl<'a> Parameter<'a> {
    fn rand<R, D>(tape: &'a Tape, rng: &mut R, distribution: D) -> Self
    where
        R: Rng,
        D: Distribution<f64>,
    {
        Self {
            var: tape.add_variable(rng.sample(distribution)),
            velocity: 0.0,
        }
    }

    fn learn(&mut self, gradients: &[f64], learning_rate: f64, momentum: f64) {
        self.velocity = momentum * self.velocity - learning_rate * self.var.gradient(gradients);
        self.var.value += self.velocity;
    }
}

/// A neuron holding a set of weights and a bias.
struct Neuron<'a> {
    bias: Parameter<'a>,
    weights: Vec<Parameter<'a>>,
    activation: Activation,
}

impl<'a> Neuron<'a> {
    /// Create a new neuron with randomized weights and bias.
    fn rand<R, D>(
        tape: &'a Tape,
        rng: &mut R,
        distribution: D,
        activation: Activation,
        input_size: usize,
    ) -> Self
    where
        R: Rng,
        D: Distribution<f64> + Copy,
    {
        Self {
            bias: Parameter::rand(tape, rng, distribution),
            weights: (0..input_size)
                .map(|_| Parameter::rand(tape, rng, distribution))
                .collect(),
            activation,
        }
    }

    /// Applies the neuron to the given input, recording the computation on the tape.
    fn forward(&self, input: &[Variable<'a>]) -> Variable<'a> {
        assert_eq!(input.len(), self.weights.len());
        self.activation.call(
            &self
                .weights
                .iter()
                .zip(input)
                .fold(self.bias.var, |acc, (w, x)| acc + &w.var * x),
        )
    }

    /// Applies the neuron to a plain scalar input, outside the tape.
    fn predict(&self, input: &[f64]) -> f64 {
        assert_eq!(input.len(), self.weights.len());
        self.activation.eval(
            self.weights
                .iter()
                .zip(input)
                .fold(self.bias.var.value, |acc, (w, x)| acc + w.var.value * x),
        )
    }

    fn parameters(&mut self) -> Vec<&mut Parameter<'a>> {
        let mut params: Vec<_> = self.weights.iter_mut().collect();
        params.push(&mut self.bias);
        params
    }
}

/// A layer of neurons.
struct Layer<'a> {
    neurons: Vec<Neuron<'a>>,
}

impl<'a> Layer<'a> {
    /// Create a new layer with randomized neurons.
    fn rand<R, D>(
        tape: &'a Tape,
        rng: &mut R,
        distribution: D,
        activation: Activation,
        input_size: usize,
        output_size: usize,
    ) -> Self
    where
        R: Rng,
        D: Distribution<f64> + Copy,
    {
        Self {
            neurons: (0..output_size)
                .map(|_| Neuron::rand(tape, rng, distribution, activation, input_size))
                .collect(),
        }
    }

    /// Applies the layer to the given input, recording the computation on the tape.
    fn forward(&self, input: &[Variable<'a>]) -> Vec<Variable<'a>> {
        self.neurons
            .iter()
            .map(|neuron| neuron.forward(input))
            .collect()
    }

    /// Applies the layer to a plain scalar input, outside the tape.
    fn predict(&self, input: &[f64]) -> Vec<f64> {
        self.neurons
            .iter()
            .map(|neuron| neuron.predict(input))
            .collect()
    }

    fn parameters(&mut self) -> Vec<&mut Parameter<'a>> {
        self.neurons
            .iter_mut()
            .flat_map(|neuron| neuron.parameters())
            .collect()
    }
}

/// A multi-layer perceptron trained with momentum gradient descent.
pub struct Mlp<'a> {
    tape: &'a Tape,
    layers: Vec<Layer<'a>>,
    inputs: usize,
    outputs: usize,
}

impl<'a> Mlp<'a> {
    /// Create a new MLP from an ordered list of layer widths (input, hidden..., output), with
    /// weights and biases drawn from the given distribution and every layer applying the given
    /// activation.
    pub fn rand<R, D>(
        tape: &'a Tape,
        rng: &mut R,
        distribution: D,
        activation: Activation,
        widths: &[usize],
    ) -> Result<Self>
    where
        R: Rng,
        D: Distribution<f64> + Copy,
    {
        if widths.len() < 2 {
            return Err(Error::InvalidParameter(format!(
                "an MLP needs at least an input and an output width, got {:?}",
                widths
            )));
        }
        if widths.contains(&0) {
            return Err(Error::InvalidParameter(format!(
                "layer widths must be positive, got {:?}",
                widths
            )));
        }
        let layers = widths
            .windows(2)
            .map(|w| Layer::rand(tape, rng, distribution, activation, w[0], w[1]))
            .collect();
        // Everything recorded past this point is per-step scratch that train_step reclaims.
        tape.mark();
        Ok(Self {
            tape,
            layers,
            inputs: widths[0],
            outputs: widths[widths.len() - 1],
        })
    }

    /// Applies the MLP to the given input, recording the computation on the tape.
    fn forward(&self, input: &[Variable<'a>]) -> Vec<Variable<'a>> {
        match self.layers.split_first() {
            Some((layer, ls)) => ls
                .iter()
                .fold(layer.forward(input), |acc, layer| layer.forward(&acc)),
            None => Vec::new(),
        }
    }

    /// Applies the MLP to a plain scalar input, outside the tape.
    pub fn predict(&self, input: &[f64]) -> Vec<f64> {
        match self.layers.split_first() {
            Some((layer, ls)) => ls
                .iter()
                .fold(layer.predict(input), |acc, layer| layer.predict(&acc)),
            None => Vec::new(),
        }
    }

    /// Returns a list of all parameters of the MLP.
    fn parameters(&mut self) -> Vec<&mut Parameter<'a>> {
        self.layers
            .iter_mut()
            .flat_map(|layer| layer.parameters())
            .collect()
    }

    fn loss_sample<const M: usize, const N: usize>(&self, sample: &Sample<M, N>) -> Variable<'a> {
        let input: Vec<_> = sample
            .input
            .iter()
            .map(|x| self.tape.add_variable(*x))
            .collect();
        let pred = self.forward(&input);
        let mut loss = self.tape.add_variable(0.0);
        for (p, o) in pred.iter().zip(sample.output) {
            let diff = p - &self.tape.add_variable(o);
            loss = loss + diff * diff;
        }
        loss / self.tape.add_variable(sample.output.len() as f64)
    }

    fn loss_dataset<const M: usize, const N: usize>(&self, samples: &[Sample<M, N>]) -> Variable<'a> {
        let mut loss = self.tape.add_variable(0.0);
        for sample in samples {
            loss = loss + self.loss_sample(sample);
        }
        loss / self.tape.add_variable(samples.len() as f64)
    }
}

impl<const M: usize, const N: usize> Model<M, N> for Mlp<'_> {
    fn input_count(&self) -> usize {
        self.inputs
    }

    fn output_count(&self) -> usize {
        self.outputs
    }

    fn train_step(
        &mut self,
        train: &[Sample<M, N>],
        learning_rate: f64,
        momentum: f64,
    ) -> Result<()> {
        let loss = self.loss_dataset(train);
        if !loss.value.is_finite() {
            self.tape.clean();
            return Err(Error::Training(format!(
                "loss became non-finite: {}",
                loss.value
            )));
        }
        let gradients = loss.gradients();
        for param in self.parameters() {
            param.learn(&gradients, learning_rate, momentum);
        }
        self.tape.clean();
        Ok(())
    }

    fn mean_squared_error(&self, samples: &[Sample<M, N>]) -> f64 {
        let mut total = 0.0;
        for sample in samples {
            let pred = self.predict(&sample.input);
            let mut loss = 0.0;
            for (p, o) in pred.iter().zip(sample.output) {
                let diff = p - o;
                loss += diff * diff;
            }
            total += loss / sample.output.len() as f64;
        }
        total / samples.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use rand_distr::StandardNormal;

    use super::*;

    #[test]
    fn rejects_degenerate_widths() {
        let tape = Tape::default();
        let mut rng = StdRng::seed_from_u64(0);
        let single = Mlp::rand(&tape, &mut rng, StandardNormal, Activation::Tanh, &[2]);
        assert!(matches!(single, Err(Error::InvalidParameter(_))));
        let hollow = Mlp::rand(&tape, &mut rng, StandardNormal, Activation::Tanh, &[2, 0, 1]);
        assert!(matches!(hollow, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn reports_layer_widths() {
        let tape = Tape::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mlp = Mlp::rand(&tape, &mut rng, StandardNormal, Activation::Tanh, &[2, 8, 1]).unwrap();
        assert_eq!(Model::<2, 1>::input_count(&mlp), 2);
        assert_eq!(Model::<2, 1>::output_count(&mlp), 1);
    }

    #[test]
    fn parses_activation_names() {
        assert_eq!("tanh".parse::<Activation>().unwrap(), Activation::Tanh);
        assert_eq!(
            "sigmoid".parse::<Activation>().unwrap(),
            Activation::Sigmoid
        );
        assert!("softmax".parse::<Activation>().is_err());
    }

    #[test]
    fn gradient_descent_fits_a_line() {
        let tape = Tape::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut mlp = Mlp::rand(
            &tape,
            &mut rng,
            StandardNormal,
            Activation::Identity,
            &[1, 1],
        )
        .unwrap();

        let samples: Vec<Sample<1, 1>> = (0..20)
            .map(|i| {
                let x = -1.0 + i as f64 / 10.0;
                Sample {
                    input: [x],
                    output: [2.0 * x],
                }
            })
            .collect();

        let initial = mlp.mean_squared_error(&samples);
        for _ in 0..500 {
            mlp.train_step(&samples, 0.05, 0.5).unwrap();
        }
        let fitted = mlp.mean_squared_error(&samples);
        assert!(fitted < initial);
        assert!(fitted < 1e-2, "mse after fitting: {}", fitted);
    }

    #[test]
    fn non_finite_loss_aborts_training() {
        let tape = Tape::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut mlp = Mlp::rand(
            &tape,
            &mut rng,
            StandardNormal,
            Activation::Identity,
            &[1, 1],
        )
        .unwrap();
        let samples = [Sample {
            input: [f64::INFINITY],
            output: [0.0],
        }];
        let result = mlp.train_step(&samples, 0.1, 0.0);
        assert!(matches!(result, Err(Error::Training(_))));
    }
}
