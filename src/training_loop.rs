//! The generational self-play training loop (spec §4.M): self-play →
//! supervised training → arena gating → promote, repeated for
//! `num_generations`. Grounded on the original `run_training` (self-play,
//! train a challenger, pit it against the incumbent, adopt on a win-rate
//! threshold), reworked around a typed [`ProgressEvent`] channel and an
//! [`AtomicBool`] stop flag per spec §5/§9 ("a typed bounded channel with
//! explicit back-pressure and a single-reader contract; cancellation is a
//! one-shot atomic flag set from the control side and polled between
//! phases").

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;

use burn::tensor::backend::AutodiffBackend;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::arena::pit;
use crate::error::ShogiResult;
use crate::game::GameState;
use crate::mcts::MctsConfig;
use crate::nn::config::NetConfig;
use crate::nn::net::{DualHeadNet, InferenceNet};
use crate::nn::weights;
use crate::player::Player;
use crate::progress::ProgressEvent;
use crate::selfplay::generate_training_data;
use crate::trainer::{train, TrainerConfig};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub num_generations: u32,
    pub num_self_play_games: u32,
    pub num_simulations: u32,
    pub arena_games: u32,
    /// Challenger is adopted when its arena win rate is at least this
    /// (spec §4.M default 0.55).
    pub win_rate_threshold: f32,
    pub model_path: PathBuf,
    /// Seed for the RNG driving self-play/arena; each generation derives its
    /// own seed from this plus the generation index so a rerun from the same
    /// seed and weights reproduces the same run (spec §5 "deterministic
    /// given (seed, network weights)").
    pub seed: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            num_generations: 10,
            num_self_play_games: 5,
            num_simulations: 25,
            arena_games: 10,
            win_rate_threshold: 0.55,
            model_path: PathBuf::from("best_model.mpk"),
            seed: 0,
        }
    }
}

/// Run the generational loop, persisting (and, if already present, resuming
/// from) the best network at `loop_config.model_path`.
///
/// Cancellation is polled via `stop_signal` between phases only — never
/// mid-simulation or mid-epoch — so a stop request never leaves a partial
/// inference or a partially trained epoch behind (spec §5). `progress`
/// receives one event per phase transition, in emission order; the final
/// event is always either [`ProgressEvent::Stopped`] or
/// [`ProgressEvent::Done`].
pub fn run_training<S, B>(
    net_config: &NetConfig,
    loop_config: LoopConfig,
    progress: &SyncSender<ProgressEvent>,
    stop_signal: &AtomicBool,
    device: &B::Device,
) -> ShogiResult<()>
where
    S: GameState + Default,
    B: AutodiffBackend,
{
    let mut best_network = match weights::load::<B>(net_config, &loop_config.model_path, device) {
        Ok(model) => model,
        Err(_) => DualHeadNet::new(net_config, device),
    };

    let trainer_config = TrainerConfig::default();
    let mcts_config = MctsConfig {
        num_simulations: loop_config.num_simulations,
        ..MctsConfig::default()
    };

    for generation in 0..loop_config.num_generations {
        if stop_signal.load(Ordering::SeqCst) {
            send(progress, ProgressEvent::Stopped { generation });
            return Ok(());
        }

        let mut rng = StdRng::seed_from_u64(loop_config.seed.wrapping_add(generation as u64));

        // ── Phase 1: self-play ──────────────────────────────────────────
        send(
            progress,
            ProgressEvent::SelfPlayStarted {
                generation,
                num_games: loop_config.num_self_play_games,
            },
        );

        let best_for_inference = InferenceNet::new(best_network.clone(), device.clone());
        let examples = generate_training_data::<S, _>(
            loop_config.num_self_play_games,
            &best_for_inference,
            mcts_config,
            &mut rng,
        );

        send(
            progress,
            ProgressEvent::SelfPlayFinished {
                generation,
                num_examples: examples.len(),
            },
        );

        if stop_signal.load(Ordering::SeqCst) {
            send(progress, ProgressEvent::Stopped { generation });
            return Ok(());
        }

        // ── Phase 2: train a challenger ───────────────────────────────────
        send(progress, ProgressEvent::TrainingStarted { generation });

        let challenger = best_network.clone();
        let (challenger, losses) = train(challenger, &examples, trainer_config, device, &mut rng);

        send(
            progress,
            ProgressEvent::TrainingFinished {
                generation,
                policy_loss: losses.policy_loss,
                value_loss: losses.value_loss,
            },
        );

        if stop_signal.load(Ordering::SeqCst) {
            send(progress, ProgressEvent::Stopped { generation });
            return Ok(());
        }

        // ── Phase 3: arena — challenger vs incumbent ─────────────────────
        send(
            progress,
            ProgressEvent::ArenaStarted {
                generation,
                num_games: loop_config.arena_games,
            },
        );

        let challenger_net = InferenceNet::new(challenger.clone(), device.clone());
        let incumbent_net = InferenceNet::new(best_network.clone(), device.clone());
        let result = pit::<S, _, _>(
            loop_config.arena_games,
            &challenger_net,
            &incumbent_net,
            loop_config.num_simulations,
            &mut rng,
        );
        let win_rate = result.win_rate_a();

        // ── Phase 4: promotion ────────────────────────────────────────────
        let promoted = win_rate >= loop_config.win_rate_threshold;
        if promoted {
            best_network = challenger;
            weights::save(&best_network, &loop_config.model_path)?;
            log::info!(
                "generation {generation}: challenger adopted (win_rate={win_rate:.3}, w={}, l={}, d={})",
                result.wins_a,
                result.wins_b,
                result.draws
            );
        } else {
            log::info!(
                "generation {generation}: challenger rejected (win_rate={win_rate:.3}, w={}, l={}, d={})",
                result.wins_a,
                result.wins_b,
                result.draws
            );
        }

        send(
            progress,
            ProgressEvent::ArenaFinished {
                generation,
                win_rate,
                promoted,
            },
        );
        send(progress, ProgressEvent::GenerationDone { generation });
    }

    send(
        progress,
        ProgressEvent::Done {
            final_generation: loop_config.num_generations,
        },
    );
    Ok(())
}

/// Best-effort send: a disconnected receiver means the caller stopped
/// listening, which is not itself a reason to abort an in-flight generation.
fn send(progress: &SyncSender<ProgressEvent>, event: ProgressEvent) {
    let _ = progress.try_send(event);
}

/// Move-selector used for player-facing integrations that want a single
/// best move out of a trained network rather than the full distribution
/// (spec §6.3's "surrounding collaborators ... consume ... the operations
/// above"). Greedy: always plays the highest-probability move at
/// temperature 0, matching the Python `_make_mcts_fn` helper used by both
/// the arena and any external play surface.
pub fn greedy_move<S, B>(state: &S, net: &DualHeadNet<B>, device: &B::Device, num_simulations: u32) -> Option<u32>
where
    S: GameState,
    B: burn::tensor::backend::Backend,
{
    if state.is_terminal() {
        return None;
    }
    let inference_net = InferenceNet::new(net.clone(), device.clone());
    let mcts = crate::mcts::Mcts::new(
        &inference_net,
        MctsConfig {
            num_simulations,
            temperature: 0.0,
            ..MctsConfig::default()
        },
    );
    let mut rng = crate::mcts::seeded_rng(0);
    mcts.search(state, &mut rng).into_iter().next().map(|(action, _)| action)
}

/// Whether `winner` is Player::First / Player::Second, exposed for
/// integrations that only have access to `run_training`'s side effects
/// (the persisted weights file) and want to sanity-check a loaded model by
/// playing it against itself.
pub fn winner_index(winner: Option<Player>) -> Option<usize> {
    winner.map(|p| p.as_index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::state::AnimalState;
    use burn_ndarray::{NdArray, NdArrayDevice};
    use std::sync::mpsc::sync_channel;

    type TestBackend = burn::backend::Autodiff<NdArray<f32>>;

    #[test]
    fn run_training_emits_done_when_not_stopped() {
        let dir = std::env::temp_dir().join(format!("shogi_zero_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let model_path = dir.join("model");

        let net_config = NetConfig::for_animal();
        let loop_config = LoopConfig {
            num_generations: 1,
            num_self_play_games: 1,
            num_simulations: 2,
            arena_games: 1,
            model_path: model_path.clone(),
            ..LoopConfig::default()
        };
        let (tx, rx) = sync_channel(64);
        let stop = AtomicBool::new(false);
        let device = NdArrayDevice::Cpu;

        run_training::<AnimalState, TestBackend>(&net_config, loop_config, &tx, &stop, &device).unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert!(matches!(events.last(), Some(ProgressEvent::Done { .. })));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn run_training_stops_immediately_when_flag_is_set() {
        let net_config = NetConfig::for_animal();
        let loop_config = LoopConfig {
            num_generations: 3,
            model_path: PathBuf::from("/tmp/shogi_zero_never_written.mpk"),
            ..LoopConfig::default()
        };
        let (tx, rx) = sync_channel(64);
        let stop = AtomicBool::new(true);
        let device = NdArrayDevice::Cpu;

        run_training::<AnimalState, TestBackend>(&net_config, loop_config, &tx, &stop, &device).unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ProgressEvent::Stopped { generation: 0 }));
    }
}
