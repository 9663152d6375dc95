//! Supervised training step over self-play examples (spec §4.J).
//!
//! Policy head is trained against the MCTS visit distribution with a soft
//! cross-entropy loss (the targets are not one-hot); the value head is
//! trained with MSE against game outcomes.

use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::activation::log_softmax;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{Tensor, TensorData};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::nn::net::DualHeadNet;
use crate::selfplay::TrainingExample;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerConfig {
    pub learning_rate: f64,
    pub weight_decay: f32,
    pub epochs: u32,
    pub batch_size: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            weight_decay: 1e-4,
            epochs: 10,
            batch_size: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainLossSummary {
    pub policy_loss: f32,
    pub value_loss: f32,
    pub total_loss: f32,
}

/// Run `config.epochs` passes over `examples`, shuffling each epoch, and
/// return the trained model plus the average per-batch losses over the
/// final epoch.
pub fn train<B: AutodiffBackend>(
    mut model: DualHeadNet<B>,
    examples: &[TrainingExample],
    config: TrainerConfig,
    device: &B::Device,
    rng: &mut StdRng,
) -> (DualHeadNet<B>, TrainLossSummary) {
    assert!(!examples.is_empty(), "train called with no examples");

    let mut optimizer = AdamConfig::new()
        .with_weight_decay(Some(burn::optim::decay::WeightDecayConfig::new(config.weight_decay)))
        .init();

    let mut indices: Vec<usize> = (0..examples.len()).collect();
    let mut last_epoch_summary = TrainLossSummary {
        policy_loss: 0.0,
        value_loss: 0.0,
        total_loss: 0.0,
    };

    for _epoch in 0..config.epochs {
        indices.shuffle(rng);
        let mut policy_loss_sum = 0.0f32;
        let mut value_loss_sum = 0.0f32;
        let mut batch_count = 0usize;

        for chunk in indices.chunks(config.batch_size) {
            let batch: Vec<&TrainingExample> = chunk.iter().map(|&i| &examples[i]).collect();
            let (state_tensor, policy_tensor, value_tensor) = build_batch::<B>(&batch, device);

            let output = model.forward(state_tensor);

            let log_probs = log_softmax(output.policy_logits, 1);
            let policy_loss = -(policy_tensor * log_probs).sum_dim(1).mean();

            let value_diff = output.value - value_tensor;
            let value_loss = value_diff.clone().powf_scalar(2.0).mean();

            let loss = policy_loss.clone() + value_loss.clone();

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(config.learning_rate, model, grads);

            policy_loss_sum += policy_loss.into_scalar().elem::<f32>();
            value_loss_sum += value_loss.into_scalar().elem::<f32>();
            batch_count += 1;
        }

        let batch_count = batch_count.max(1) as f32;
        last_epoch_summary = TrainLossSummary {
            policy_loss: policy_loss_sum / batch_count,
            value_loss: value_loss_sum / batch_count,
            total_loss: (policy_loss_sum + value_loss_sum) / batch_count,
        };
        log::debug!(
            "epoch summary: policy_loss={:.4} value_loss={:.4}",
            last_epoch_summary.policy_loss,
            last_epoch_summary.value_loss
        );
    }

    (model, last_epoch_summary)
}

fn build_batch<B: AutodiffBackend>(
    batch: &[&TrainingExample],
    device: &B::Device,
) -> (Tensor<B, 4>, Tensor<B, 2>, Tensor<B, 2>) {
    let batch_size = batch.len();
    let first = &batch[0].state_tensor;
    let (channels, rows, cols) = (first.channels, first.rows, first.cols);
    let action_space_size = batch[0].policy_target.len();

    let mut state_flat = Vec::with_capacity(batch_size * channels * rows * cols);
    let mut policy_flat = Vec::with_capacity(batch_size * action_space_size);
    let mut value_flat = Vec::with_capacity(batch_size);

    for example in batch {
        state_flat.extend_from_slice(&example.state_tensor.data);
        policy_flat.extend_from_slice(&example.policy_target);
        value_flat.push(example.value_target);
    }

    let state_tensor = Tensor::<B, 4>::from_data(
        TensorData::new(state_flat, [batch_size, channels, rows, cols]),
        device,
    );
    let policy_tensor = Tensor::<B, 2>::from_data(
        TensorData::new(policy_flat, [batch_size, action_space_size]),
        device,
    );
    let value_tensor = Tensor::<B, 2>::from_data(TensorData::new(value_flat, [batch_size, 1]), device);

    (state_tensor, policy_tensor, value_tensor)
}
