use burn::{
    config::Config,
    module::Module,
    nn::{Linear, LinearConfig, Lstm, LstmConfig},
    tensor::{backend::Backend, Tensor},
};
use tracing::info;

#[derive(Config, Debug)]
pub struct RegressorConfig {
    /// Features per time step.
    #[config(default = 1)]
    pub input_size: usize,
    #[config(default = 50)]
    pub hidden_size: usize,
    /// Stacked LSTM layers.
    #[config(default = 1)]
    pub num_layers: usize,
}

impl RegressorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Regressor<B> {
        assert!(self.num_layers > 0, "num_layers must be positive");
        let lstm = (0..self.num_layers)
            .map(|layer| {
                let d_input = if layer == 0 {
                    self.input_size
                } else {
                    self.hidden_size
                };
                LstmConfig::new(d_input, self.hidden_size, true).init(device)
            })
            .collect();
        Regressor {
            lstm,
            linear: LinearConfig::new(self.hidden_size, 1).init(device),
        }
    }
}

/// LSTM over the whole sequence, then a linear readout of the last step.
#[derive(Module, Debug)]
pub struct Regressor<B: Backend> {
    lstm: Vec<Lstm<B>>,
    linear: Linear<B>,
}

impl<B: Backend> Regressor<B> {
    /// `[batch, sequence_length, input_size]` -> `[batch, 1]`
    ///
    /// Every call starts from a zero hidden and cell state.
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let mut hidden = input;
        for lstm in &self.lstm {
            let (output, _) = lstm.forward(hidden, None);
            hidden = output;
        }
        let [batch_size, seq_len, d_hidden] = hidden.dims();
        let last = hidden
            .slice([0..batch_size, seq_len - 1..seq_len, 0..d_hidden])
            .reshape([batch_size, d_hidden]);
        self.linear.forward(last)
    }
}

pub fn build_model<B: Backend>(config: &RegressorConfig, device: &B::Device) -> Regressor<B> {
    let model = config.init(device);
    info!(
        hidden_size = config.hidden_size,
        num_layers = config.num_layers,
        params = model.num_params(),
        "built model"
    );
    model
}
