//! Self-play game generation (spec §4.I): play full games against the
//! current network via MCTS, recording `(state, policy, outcome)` triples
//! for the trainer.

use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::prelude::Distribution;

use crate::game::{GameState, TensorPlanes};
use crate::mcts::{Mcts, MctsConfig, PolicyValueNet};
use crate::player::Player;

/// Self-play games are capped at this many plies; a position that hasn't
/// terminated by then is recorded as a draw (spec §4.I edge case: "runaway
/// games").
pub const MAX_GAME_LENGTH: u32 = 200;

/// Ply at which move selection switches from exploratory to greedy
/// temperature (spec §4.I "temperature schedule").
pub const TEMPERATURE_THRESHOLD_PLY: u32 = 30;
pub const EARLY_TEMPERATURE: f32 = 1.0;
pub const LATE_TEMPERATURE: f32 = 0.01;

#[derive(Debug, Clone)]
pub struct TrainingExample {
    pub state_tensor: TensorPlanes,
    /// Length `ACTION_SPACE_SIZE`, zero outside the legal set recorded at
    /// that ply.
    pub policy_target: Vec<f32>,
    /// `z` from the perspective of the player to move when this example was
    /// recorded: `1.0` win, `-1.0` loss, `0.0` draw or move-cap cutoff.
    pub value_target: f32,
}

/// Play one self-play game to completion (or to [`MAX_GAME_LENGTH`]) and
/// return one training example per ply.
pub fn play_game<S, N>(initial: S, net: &N, mcts_config: MctsConfig, rng: &mut StdRng) -> Vec<TrainingExample>
where
    S: GameState,
    N: PolicyValueNet<S>,
{
    let mut state = initial;
    let mut records: Vec<(TensorPlanes, Vec<f32>, Player)> = Vec::new();
    let mut ply = 0u32;

    while !state.is_terminal() && ply < MAX_GAME_LENGTH {
        let temperature = if ply < TEMPERATURE_THRESHOLD_PLY {
            EARLY_TEMPERATURE
        } else {
            LATE_TEMPERATURE
        };
        let mcts = Mcts::new(
            net,
            MctsConfig {
                temperature,
                ..mcts_config
            },
        );
        let distribution = mcts.search(&state, rng);

        let mut policy_target = vec![0.0; state.action_space_size()];
        for &(action, prob) in &distribution {
            policy_target[action as usize] = prob;
        }
        records.push((state.to_tensor_planes(), policy_target, state.current_player()));

        let action = sample_action(&distribution, rng);
        state = state.apply_move(action);
        ply += 1;
    }

    let winner = state.winner();
    records
        .into_iter()
        .map(|(state_tensor, policy_target, player)| {
            let value_target = match winner {
                Some(w) if w == player => 1.0,
                Some(_) => -1.0,
                None => 0.0,
            };
            TrainingExample {
                state_tensor,
                policy_target,
                value_target,
            }
        })
        .collect()
}

/// Play `num_games` self-play games starting from fresh `S::default()`
/// positions, pooling every recorded example.
pub fn generate_training_data<S, N>(
    num_games: u32,
    net: &N,
    mcts_config: MctsConfig,
    rng: &mut StdRng,
) -> Vec<TrainingExample>
where
    S: GameState + Default,
    N: PolicyValueNet<S>,
{
    let mut examples = Vec::new();
    for _ in 0..num_games {
        examples.extend(play_game(S::default(), net, mcts_config, rng));
    }
    examples
}

/// Spec §4.J step 4: if the policy distribution sums to zero (or is
/// otherwise degenerate), fall back to a uniform pick over the legal actions
/// rather than panicking.
fn sample_action(distribution: &[(crate::game::ActionIndex, f32)], rng: &mut StdRng) -> crate::game::ActionIndex {
    use rand::Rng;

    let weights: Vec<f32> = distribution.iter().map(|&(_, p)| p).collect();
    match WeightedIndex::new(&weights) {
        Ok(dist) => distribution[dist.sample(rng)].0,
        Err(_) => distribution[rng.random_range(0..distribution.len())].0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::state::AnimalState;
    use crate::mcts::seeded_rng;

    struct UniformNet {
        action_space_size: usize,
    }

    impl PolicyValueNet<AnimalState> for UniformNet {
        fn predict(&self, _state: &AnimalState) -> (Vec<f32>, f32) {
            (vec![0.0; self.action_space_size], 0.0)
        }
    }

    #[test]
    fn play_game_terminates_and_produces_examples() {
        let net = UniformNet {
            action_space_size: <AnimalState as GameState>::ACTION_SPACE_SIZE,
        };
        let mut rng = seeded_rng(1);
        let examples = play_game(
            AnimalState::new(),
            &net,
            MctsConfig {
                num_simulations: 4,
                ..Default::default()
            },
            &mut rng,
        );
        assert!(!examples.is_empty());
        for ex in &examples {
            assert!(ex.value_target == 1.0 || ex.value_target == -1.0 || ex.value_target == 0.0);
            let sum: f32 = ex.policy_target.iter().sum();
            assert!((sum - 1.0).abs() < 1e-3);
        }
    }
}
