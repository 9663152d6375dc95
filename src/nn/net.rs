//! Dual-head residual network: a stem, a tower of residual blocks, and a
//! policy head + value head (spec §4.G). Grounded on the teacher's
//! `QuoridorNet` (conv + linear policy/value heads over a `burn::Backend`),
//! generalized into a real residual tower with batch normalization, since
//! the teacher's two-conv scaffold doesn't generalize across two very
//! differently-sized boards.

use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Initializer, Linear, LinearConfig, PaddingConfig2d, Relu};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::nn::config::NetConfig;

fn same_padding_conv(in_ch: usize, out_ch: usize) -> Conv2dConfig {
    Conv2dConfig::new([in_ch, out_ch], [3, 3])
        .with_padding(PaddingConfig2d::Explicit(1, 1))
        .with_initializer(Initializer::KaimingUniform {
            gain: 1.0,
            fan_out_only: false,
        })
}

#[derive(Module, Debug)]
pub struct ResBlock<B: Backend> {
    conv1: Conv2d<B>,
    bn1: BatchNorm<B, 2>,
    conv2: Conv2d<B>,
    bn2: BatchNorm<B, 2>,
}

impl<B: Backend> ResBlock<B> {
    pub fn new(channels: usize, device: &B::Device) -> Self {
        Self {
            conv1: same_padding_conv(channels, channels).init(device),
            bn1: BatchNormConfig::new(channels).init(device),
            conv2: same_padding_conv(channels, channels).init(device),
            bn2: BatchNormConfig::new(channels).init(device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let relu = Relu::new();
        let residual = x.clone();
        let out = self.conv1.forward(x);
        let out = self.bn1.forward(out);
        let out = relu.forward(out);
        let out = self.conv2.forward(out);
        let out = self.bn2.forward(out);
        relu.forward(out + residual)
    }
}

#[derive(Module, Debug)]
pub struct DualHeadNet<B: Backend> {
    stem_conv: Conv2d<B>,
    stem_bn: BatchNorm<B, 2>,
    tower: Vec<ResBlock<B>>,

    policy_conv: Conv2d<B>,
    policy_bn: BatchNorm<B, 2>,
    policy_fc: Linear<B>,

    value_conv: Conv2d<B>,
    value_bn: BatchNorm<B, 2>,
    value_fc1: Linear<B>,
    value_fc2: Linear<B>,

    board_rows: usize,
    board_cols: usize,
}

pub struct NetOutput<B: Backend> {
    /// `[batch, action_space_size]`, unnormalized.
    pub policy_logits: Tensor<B, 2>,
    /// `[batch, 1]`, bounded to `(-1, 1)` by `tanh`.
    pub value: Tensor<B, 2>,
}

impl<B: Backend> DualHeadNet<B> {
    pub fn new(config: &NetConfig, device: &B::Device) -> Self {
        let stem_conv = same_padding_conv(config.in_channels, config.residual_channels).init(device);
        let stem_bn = BatchNormConfig::new(config.residual_channels).init(device);

        let tower = (0..config.num_residual_blocks)
            .map(|_| ResBlock::new(config.residual_channels, device))
            .collect();

        let board_squares = config.board_squares();

        let policy_conv = Conv2dConfig::new([config.residual_channels, 2], [1, 1])
            .with_initializer(Initializer::KaimingUniform {
                gain: 1.0,
                fan_out_only: false,
            })
            .init(device);
        let policy_bn = BatchNormConfig::new(2).init(device);
        let policy_fc = LinearConfig::new(2 * board_squares, config.action_space_size).init(device);

        let value_conv = Conv2dConfig::new([config.residual_channels, 1], [1, 1])
            .with_initializer(Initializer::KaimingUniform {
                gain: 1.0,
                fan_out_only: false,
            })
            .init(device);
        let value_bn = BatchNormConfig::new(1).init(device);
        let value_fc1 = LinearConfig::new(board_squares, config.value_hidden).init(device);
        let value_fc2 = LinearConfig::new(config.value_hidden, 1)
            .with_initializer(Initializer::XavierNormal { gain: 1.0 })
            .init(device);

        Self {
            stem_conv,
            stem_bn,
            tower,
            policy_conv,
            policy_bn,
            policy_fc,
            value_conv,
            value_bn,
            value_fc1,
            value_fc2,
            board_rows: config.board_rows,
            board_cols: config.board_cols,
        }
    }

    /// `x`: `[batch, in_channels, board_rows, board_cols]`.
    pub fn forward(&self, x: Tensor<B, 4>) -> NetOutput<B> {
        let relu = Relu::new();
        let batch = x.dims()[0];

        let mut out = self.stem_conv.forward(x);
        out = self.stem_bn.forward(out);
        out = relu.forward(out);

        for block in &self.tower {
            out = block.forward(out);
        }

        let policy = self.policy_conv.forward(out.clone());
        let policy = self.policy_bn.forward(policy);
        let policy = relu.forward(policy);
        let policy = policy.reshape([batch, 2 * self.board_rows * self.board_cols]);
        let policy_logits = self.policy_fc.forward(policy);

        let value = self.value_conv.forward(out);
        let value = self.value_bn.forward(value);
        let value = relu.forward(value);
        let value = value.reshape([batch, self.board_rows * self.board_cols]);
        let value = self.value_fc1.forward(value);
        let value = relu.forward(value);
        let value = self.value_fc2.forward(value).tanh();

        NetOutput {
            policy_logits,
            value,
        }
    }
}

/// Bridges a trained [`DualHeadNet`] to the backend-agnostic
/// [`crate::mcts::PolicyValueNet`] trait MCTS/self-play/arena depend on.
/// Single-state inference only — batching happens one simulation at a
/// time, matching the teacher's scaffold rather than the batched GPU path
/// its comments sketch but never implement.
pub struct InferenceNet<B: Backend> {
    model: DualHeadNet<B>,
    device: B::Device,
}

impl<B: Backend> InferenceNet<B> {
    pub fn new(model: DualHeadNet<B>, device: B::Device) -> Self {
        Self { model, device }
    }

    pub fn model(&self) -> &DualHeadNet<B> {
        &self.model
    }

    pub fn into_model(self) -> DualHeadNet<B> {
        self.model
    }
}

impl<B: Backend, S: crate::game::GameState> crate::mcts::PolicyValueNet<S> for InferenceNet<B> {
    fn predict(&self, state: &S) -> (Vec<f32>, f32) {
        let planes = state.to_tensor_planes();
        let input = Tensor::<B, 4>::from_data(
            burn::tensor::TensorData::new(planes.data, [1, planes.channels, planes.rows, planes.cols]),
            &self.device,
        );
        let output = self.model.forward(input);
        let policy_logits: Vec<f32> = output.policy_logits.into_data().to_vec().expect("policy tensor is f32");
        let value: Vec<f32> = output.value.into_data().to_vec().expect("value tensor is f32");
        (policy_logits, value[0])
    }
}
