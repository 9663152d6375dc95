//! Arena: play two networks against each other to decide whether a newly
//! trained generation should be promoted (spec §4.K).

use rand::rngs::StdRng;

use crate::game::GameState;
use crate::mcts::{Mcts, MctsConfig, PolicyValueNet};
use crate::player::Player;

/// Arena games use greedy move selection (temperature 0): MCTS still
/// explores via Dirichlet root noise, but once the simulation budget is
/// spent the most-visited move is always played, so results reflect
/// playing strength rather than additional sampling noise.
const ARENA_TEMPERATURE: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaResult {
    pub wins_a: u32,
    pub wins_b: u32,
    pub draws: u32,
}

impl ArenaResult {
    pub fn games_played(&self) -> u32 {
        self.wins_a + self.wins_b + self.draws
    }

    /// `A`'s win rate among decisive games, per spec §4.K's promotion
    /// threshold (draws are excluded from the denominator).
    pub fn win_rate_a(&self) -> f32 {
        let decisive = self.wins_a + self.wins_b;
        if decisive == 0 {
            0.5
        } else {
            self.wins_a as f32 / decisive as f32
        }
    }
}

/// Play `num_games` games between `net_a` and `net_b`, alternating which
/// network moves first by game index parity, and tally results from `A`'s
/// perspective.
pub fn pit<S, NA, NB>(num_games: u32, net_a: &NA, net_b: &NB, num_simulations: u32, rng: &mut StdRng) -> ArenaResult
where
    S: GameState + Default,
    NA: PolicyValueNet<S>,
    NB: PolicyValueNet<S>,
{
    let mut result = ArenaResult::default();
    let config = MctsConfig {
        num_simulations,
        temperature: ARENA_TEMPERATURE,
        ..MctsConfig::default()
    };

    for game_idx in 0..num_games {
        let a_moves_first = game_idx % 2 == 0;
        let winner_seat = play_one_game::<S, NA, NB>(net_a, net_b, a_moves_first, config, rng);

        match winner_seat {
            Some(seat) => {
                let a_won = (seat == Player::First) == a_moves_first;
                if a_won {
                    result.wins_a += 1;
                } else {
                    result.wins_b += 1;
                }
            }
            None => result.draws += 1,
        }
    }

    result
}

fn play_one_game<S, NA, NB>(net_a: &NA, net_b: &NB, a_moves_first: bool, config: MctsConfig, rng: &mut StdRng) -> Option<Player>
where
    S: GameState + Default,
    NA: PolicyValueNet<S>,
    NB: PolicyValueNet<S>,
{
    let mut state = S::default();
    let mut ply = 0u32;

    while !state.is_terminal() && ply < crate::selfplay::MAX_GAME_LENGTH {
        let net_is_a = (state.current_player() == Player::First) == a_moves_first;
        let action = if net_is_a {
            Mcts::new(net_a, config).search(&state, rng)[0].0
        } else {
            Mcts::new(net_b, config).search(&state, rng)[0].0
        };
        state = state.apply_move(action);
        ply += 1;
    }

    state.winner()
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
    fn pit_tallies_to_games_played() {
        let net_a = UniformNet {
            action_space_size: <AnimalState as GameState>::ACTION_SPACE_SIZE,
        };
        let net_b = UniformNet {
            action_space_size: <AnimalState as GameState>::ACTION_SPACE_SIZE,
        };
        let mut rng = seeded_rng(3);
        let result = pit::<AnimalState, _, _>(4, &net_a, &net_b, 4, &mut rng);
        assert_eq!(result.games_played(), 4);
    }
}
