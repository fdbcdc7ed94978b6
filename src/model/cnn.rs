//! CNN Model Architecture for Plant Disease Classification
//!
//! The network the served record was trained with. Loading a record only
//! succeeds when this structure (and the [`PlantClassifierConfig`] used to
//! build it) matches the one used at training time.

use burn::{
    config::Config,
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d,
        Relu,
    },
    tensor::{backend::Backend, Tensor},
};

/// Configuration for the PlantClassifier CNN model
#[derive(Config, Debug)]
pub struct PlantClassifierConfig {
    /// Number of output classes
    #[config(default = "38")]
    pub num_classes: usize,

    /// Input image size (square)
    #[config(default = "128")]
    pub input_size: usize,

    /// Dropout rate used at training time (inactive during inference)
    #[config(default = "0.3")]
    pub dropout_rate: f64,

    /// Number of input channels (3 for RGB)
    #[config(default = "3")]
    pub in_channels: usize,

    /// Base number of convolutional filters
    #[config(default = "32")]
    pub base_filters: usize,
}

/// Conv2d, BatchNorm, ReLU and a 2x2 MaxPool
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv: Conv2d<B>,
    pub bn: BatchNorm<B, 2>,
    pub relu: Relu,
    pub pool: MaxPool2d,
}

impl<B: Backend> ConvBlock<B> {
    pub fn new(in_channels: usize, out_channels: usize, kernel_size: usize, device: &B::Device) -> Self {
        let conv = Conv2dConfig::new([in_channels, out_channels], [kernel_size, kernel_size])
            .with_padding(PaddingConfig2d::Same)
            .init(device);

        Self {
            conv,
            bn: BatchNormConfig::new(out_channels).init(device),
            relu: Relu::new(),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.bn.forward(x);
        let x = self.relu.forward(x);
        self.pool.forward(x)
    }
}

/// Plant Disease Classifier CNN
///
/// Architecture:
/// - 4 convolutional blocks (32 -> 64 -> 128 -> 256 filters at the default width)
/// - Global Average Pooling
/// - Fully connected classifier with dropout
///
/// Input is NCHW `[batch, 3, 128, 128]`.
#[derive(Module, Debug)]
pub struct PlantClassifier<B: Backend> {
    pub conv1: ConvBlock<B>,
    pub conv2: ConvBlock<B>,
    pub conv3: ConvBlock<B>,
    pub conv4: ConvBlock<B>,

    pub global_pool: AdaptiveAvgPool2d,

    pub fc1: Linear<B>,
    pub dropout: Dropout,
    pub fc2: Linear<B>,

    num_classes: usize,
}

impl<B: Backend> PlantClassifier<B> {
    /// Create a new PlantClassifier from configuration
    pub fn new(config: &PlantClassifierConfig, device: &B::Device) -> Self {
        let base = config.base_filters;

        // 128 -> 64 -> 32 -> 16 -> 8
        let conv1 = ConvBlock::new(config.in_channels, base, 3, device);
        let conv2 = ConvBlock::new(base, base * 2, 3, device);
        let conv3 = ConvBlock::new(base * 2, base * 4, 3, device);
        let conv4 = ConvBlock::new(base * 4, base * 8, 3, device);

        Self {
            conv1,
            conv2,
            conv3,
            conv4,
            global_pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            fc1: LinearConfig::new(base * 8, 256).init(device),
            dropout: DropoutConfig::new(config.dropout_rate).init(),
            fc2: LinearConfig::new(256, config.num_classes).init(device),
            num_classes: config.num_classes,
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `x` - Input tensor of shape [batch_size, 3, height, width]
    ///
    /// # Returns
    /// * Logits tensor of shape [batch_size, num_classes]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.conv1.forward(x);
        let x = self.conv2.forward(x);
        let x = self.conv3.forward(x);
        let x = self.conv4.forward(x);

        // [B, C, H, W] -> [B, C, 1, 1] -> [B, C]
        let x = self.global_pool.forward(x);
        let [batch_size, channels, _, _] = x.dims();
        let x = x.reshape([batch_size, channels]);

        let x = self.fc1.forward(x);
        let x = Relu::new().forward(x);
        let x = self.dropout.forward(x);
        self.fc2.forward(x)
    }

    /// Forward pass with the final softmax, yielding class probabilities
    pub fn forward_softmax(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let logits = self.forward(x);
        burn::tensor::activation::softmax(logits, 1)
    }

    /// Get the number of output classes
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray;

    fn small_config() -> PlantClassifierConfig {
        PlantClassifierConfig::new().with_base_filters(4)
    }

    #[test]
    fn test_default_config_matches_served_model() {
        let config = PlantClassifierConfig::new();
        assert_eq!(config.num_classes, 38);
        assert_eq!(config.input_size, 128);
        assert_eq!(config.in_channels, 3);
        assert_eq!(config.base_filters, 32);
    }

    #[test]
    fn test_plant_classifier_output_shape() {
        let device = Default::default();
        let model = PlantClassifier::<TestBackend>::new(&small_config(), &device);

        let input = Tensor::<TestBackend, 4>::zeros([2, 3, 128, 128], &device);
        let output = model.forward(input);

        assert_eq!(output.dims(), [2, 38]);
        assert_eq!(model.num_classes(), 38);
    }

    #[test]
    fn test_forward_softmax_sums_to_one() {
        let device = Default::default();
        let model = PlantClassifier::<TestBackend>::new(&small_config(), &device);

        let input = Tensor::<TestBackend, 4>::ones([1, 3, 128, 128], &device);
        let probs: Vec<f32> = model.forward_softmax(input).into_data().to_vec().unwrap();

        assert_eq!(probs.len(), 38);
        assert!(probs.iter().all(|&p| p >= 0.0));
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    }
}
