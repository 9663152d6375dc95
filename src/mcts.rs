//! PUCT Monte Carlo Tree Search (spec §4.H), generic over `GameState` and a
//! backend-agnostic [`PolicyValueNet`] trait — grounded on the teacher's
//! `PolicyValueNet`/`GameAdapter` split, which keeps the search itself free
//! of any `burn` dependency so it can be unit-tested with a dummy net.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Dirichlet, Distribution};

use crate::game::{ActionIndex, GameState};

/// Inference backend used by [`Mcts`]. `policy_priors` is indexed by
/// `ActionIndex` and has length `S::ACTION_SPACE_SIZE`; entries for illegal
/// actions are ignored by the search (they are masked out before
/// normalization).
pub trait PolicyValueNet<S: GameState> {
    fn predict(&self, state: &S) -> (Vec<f32>, f32);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MctsConfig {
    pub num_simulations: u32,
    pub c_puct: f32,
    pub temperature: f32,
    pub dirichlet_alpha: f32,
    pub dirichlet_epsilon: f32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 50,
            c_puct: 1.4,
            temperature: 1.0,
            dirichlet_alpha: 0.3,
            dirichlet_epsilon: 0.25,
        }
    }
}

struct Edge<S: GameState> {
    prior: f32,
    visit_count: u32,
    total_value: f32,
    /// The subtree reached by this edge, created and expanded the first time
    /// a simulation visits it, then reused (and its own statistics
    /// accumulated) by every later simulation that selects this action
    /// (spec §3 MCTS tree node: "children (map from legal ActionIndex to
    /// child node)").
    child: Option<Box<Node<S>>>,
}

impl<S: GameState> Edge<S> {
    fn mean_value(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.total_value / self.visit_count as f32
        }
    }
}

struct Node<S: GameState> {
    state: S,
    edges: BTreeMap<ActionIndex, Edge<S>>,
    expanded: bool,
}

impl<S: GameState> Node<S> {
    fn new(state: S) -> Self {
        Self {
            state,
            edges: BTreeMap::new(),
            expanded: false,
        }
    }

    fn visit_total(&self) -> u32 {
        self.edges.values().map(|e| e.visit_count).sum()
    }
}

/// PUCT search over a single root position. A fresh `Mcts` is constructed
/// per move (the tree is not reused across moves), matching the teacher's
/// per-call `get_move` pattern.
pub struct Mcts<'a, S: GameState, N: PolicyValueNet<S>> {
    net: &'a N,
    config: MctsConfig,
    _marker: std::marker::PhantomData<S>,
}

impl<'a, S: GameState, N: PolicyValueNet<S>> Mcts<'a, S, N> {
    pub fn new(net: &'a N, config: MctsConfig) -> Self {
        Self {
            net,
            config,
            _marker: std::marker::PhantomData,
        }
    }

    /// Run the configured number of simulations from `root_state` and
    /// return the visit-count distribution over legal actions, reshaped by
    /// `self.config.temperature` (spec §4.H "temperature-based move
    /// selection").
    pub fn search(&self, root_state: &S, rng: &mut StdRng) -> Vec<(ActionIndex, f32)> {
        let mut root = Node::new(root_state.clone());
        if root.state.is_terminal() {
            return Vec::new();
        }
        // The root's own network value estimate is discarded: per spec §4.I
        // / design note §9, the root is never updated by backup, only used
        // to seed its children's priors.
        let _ = self.expand(&mut root);
        self.apply_dirichlet_noise(&mut root, rng);

        for _ in 0..self.config.num_simulations {
            self.simulate(&mut root, rng);
        }

        self.visit_distribution(&root)
    }

    /// Expand `node`: evaluate the network once, mask+normalize its policy
    /// logits over the legal moves, and create one zero-visit edge per legal
    /// action with that prior (spec §4.H step 2 / §4.I "leaf" case). Returns
    /// the network's value estimate for `node.state`, which the caller uses
    /// as the leaf value — expansion never recurses further on its own.
    fn expand(&self, node: &mut Node<S>) -> f32 {
        node.expanded = true;

        let legal = node.state.legal_moves();
        if legal.is_empty() {
            return 0.0;
        }

        let (policy_logits, value) = self.net.predict(&node.state);
        let masked = masked_softmax(&policy_logits, &legal);

        for (&action, &prior) in legal.iter().zip(masked.iter()) {
            node.edges.insert(
                action,
                Edge {
                    prior,
                    visit_count: 0,
                    total_value: 0.0,
                    child: None,
                },
            );
        }

        value
    }

    fn apply_dirichlet_noise(&self, root: &mut Node<S>, rng: &mut StdRng) {
        let n = root.edges.len();
        if n == 0 {
            return;
        }
        let alpha = self.config.dirichlet_alpha.max(1e-3);
        let dirichlet = Dirichlet::new(vec![alpha; n]).expect("dirichlet_alpha must be positive");
        let noise = dirichlet.sample(rng);

        let eps = self.config.dirichlet_epsilon;
        for (edge, &n_i) in root.edges.values_mut().zip(noise.iter()) {
            edge.prior = (1.0 - eps) * edge.prior + eps * n_i;
        }
    }

    /// One simulation: descend the **persistent** tree by PUCT selection,
    /// creating and expanding the child node the first time an edge is
    /// traversed, reusing it (and continuing to recurse into it) on every
    /// later simulation that selects the same action — then back up the
    /// resulting value with alternating sign at every edge visited along the
    /// path (spec §4.H "sign-flipped backup"). The root node's own edges
    /// accumulate visit/value statistics from this call, but the root
    /// itself is never re-evaluated by the network again (spec design note
    /// §9: "the root's statistics are never read as Q-values").
    fn simulate(&self, node: &mut Node<S>, rng: &mut StdRng) -> f32 {
        if node.state.is_terminal() {
            return terminal_value(&node.state);
        }
        debug_assert!(node.expanded, "simulate called on an un-expanded non-terminal node");

        let action = self.select_action(node);
        let edge = node.edges.get_mut(&action).expect("action came from node.edges");

        if edge.child.is_none() {
            let child_state = node.state.apply_move(action);
            edge.child = Some(Box::new(Node::new(child_state)));
        }
        let child = edge.child.as_mut().expect("just ensured Some above");

        // Uniform treatment of "just created" and "already visited" children:
        // a freshly created child is either terminal (returns its fixed
        // terminal value) or gets a single network evaluation (its leaf
        // value, with no further recursion — spec §4.I step 2); an
        // already-expanded child recurses through `simulate` again, which
        // itself bottoms out the same way further down the tree.
        let child_value = if child.state.is_terminal() {
            terminal_value(&child.state)
        } else if !child.expanded {
            self.expand(child)
        } else {
            self.simulate(child, rng)
        };
        let value = -child_value;

        edge.visit_count += 1;
        edge.total_value += value;

        value
    }

    fn select_action(&self, node: &Node<S>) -> ActionIndex {
        let sqrt_total = ((node.visit_total() + 1) as f32).sqrt();

        node.edges
            .iter()
            .max_by(|(_, a), (_, b)| {
                let score_a = a.mean_value() + self.config.c_puct * a.prior * sqrt_total / (1.0 + a.visit_count as f32);
                let score_b = b.mean_value() + self.config.c_puct * b.prior * sqrt_total / (1.0 + b.visit_count as f32);
                score_a.partial_cmp(&score_b).expect("scores are never NaN")
            })
            .map(|(&action, _)| action)
            .expect("node.edges is non-empty: simulate() returns early on terminal states")
    }

    fn visit_distribution(&self, root: &Node<S>) -> Vec<(ActionIndex, f32)> {
        if root.edges.is_empty() {
            return Vec::new();
        }

        if self.config.temperature <= 1e-3 {
            let (&best_action, _) = root
                .edges
                .iter()
                .max_by_key(|(_, e)| e.visit_count)
                .expect("checked non-empty above");
            return vec![(best_action, 1.0)];
        }

        let inv_temp = 1.0 / self.config.temperature;
        let max_visits = root.edges.values().map(|e| e.visit_count).max().unwrap_or(0).max(1) as f32;
        // Normalize visit counts by the max before exponentiating: raising the
        // raw count to 1/τ (as low as 0.01 past spec §4.J's temperature
        // threshold) overflows f32 well before the final normalization, e.g.
        // 3^100 already exceeds f32::MAX. Dividing by max_visits first keeps
        // every base in [0, 1], so the power is always finite, and the result
        // is identical after normalizing since the common factor cancels.
        let weighted: Vec<(ActionIndex, f32)> = root
            .edges
            .iter()
            .map(|(&action, e)| (action, (e.visit_count as f32 / max_visits).powf(inv_temp)))
            .collect();
        let total: f32 = weighted.iter().map(|(_, w)| w).sum();

        if total <= 0.0 || !total.is_finite() {
            let uniform = 1.0 / weighted.len() as f32;
            weighted.into_iter().map(|(a, _)| (a, uniform)).collect()
        } else {
            weighted.into_iter().map(|(a, w)| (a, w / total)).collect()
        }
    }
}

fn terminal_value<S: GameState>(state: &S) -> f32 {
    match state.winner() {
        Some(winner) if winner == state.current_player() => 1.0,
        Some(_) => -1.0,
        None => 0.0,
    }
}

/// Softmax over `logits` restricted to `legal` indices, returned in the
/// same order as `legal`.
fn masked_softmax(logits: &[f32], legal: &[ActionIndex]) -> Vec<f32> {
    let legal_logits: Vec<f32> = legal.iter().map(|&a| logits[a as usize]).collect();
    let max_logit = legal_logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = legal_logits.iter().map(|&l| (l - max_logit).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

/// Construct the seeded RNG [`Mcts::search`] expects, from an external
/// source of entropy so callers control reproducibility.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::state::AnimalState;

    struct UniformNet {
        action_space_size: usize,
    }

    impl PolicyValueNet<AnimalState> for UniformNet {
        fn predict(&self, _state: &AnimalState) -> (Vec<f32>, f32) {
            (vec![0.0; self.action_space_size], 0.0)
        }
    }

    #[test]
    fn search_returns_a_distribution_over_legal_moves() {
        let net = UniformNet {
            action_space_size: <AnimalState as GameState>::ACTION_SPACE_SIZE,
        };
        let mcts = Mcts::new(&net, MctsConfig {
            num_simulations: 16,
            ..Default::default()
        });
        let mut rng = seeded_rng(42);
        let state = AnimalState::new();
        let dist = mcts.search(&state, &mut rng);

        assert!(!dist.is_empty());
        let total: f32 = dist.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-3);
        let legal = state.legal_moves();
        for (action, _) in &dist {
            assert!(legal.contains(action));
        }
    }

    #[test]
    fn zero_temperature_is_deterministic_argmax() {
        let net = UniformNet {
            action_space_size: <AnimalState as GameState>::ACTION_SPACE_SIZE,
        };
        let mcts = Mcts::new(&net, MctsConfig {
            num_simulations: 8,
            temperature: 0.0,
            ..Default::default()
        });
        let mut rng = seeded_rng(7);
        let state = AnimalState::new();
        let dist = mcts.search(&state, &mut rng);
        assert_eq!(dist.len(), 1);
        assert_eq!(dist[0].1, 1.0);
    }

    /// Each simulation extends the deepest-visited path by at most one ply
    /// (a freshly created child is expanded and returned as a leaf
    /// immediately, never descended into further within the same
    /// simulation) — so `num_simulations` bounds recursion depth, and a
    /// simulation count far larger than this tiny board's game length still
    /// terminates promptly rather than replaying a full game to completion
    /// on every single simulation.
    #[test]
    fn large_simulation_counts_stay_bounded() {
        let net = UniformNet {
            action_space_size: <AnimalState as GameState>::ACTION_SPACE_SIZE,
        };
        let mcts = Mcts::new(&net, MctsConfig {
            num_simulations: 300,
            ..Default::default()
        });
        let mut rng = seeded_rng(11);
        let state = AnimalState::new();
        let dist = mcts.search(&state, &mut rng);

        assert!(!dist.is_empty());
        let total: f32 = dist.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-3);
    }

    /// Spec §8 end-to-end scenario 7: a terminal root (no legal moves) must
    /// make `search` return the all-zero / empty distribution rather than
    /// invoking the network or crashing.
    #[test]
    fn search_on_terminal_root_returns_empty_distribution() {
        use crate::animal::board::Board;
        use crate::animal::types::PieceKind;
        use crate::player::Player;

        let board = Board::empty().set_piece(0, 0, Some(crate::animal::types::Piece::new(PieceKind::Giraffe, Player::First)));
        let state = AnimalState::from_parts(board, Player::First);
        assert!(state.is_terminal());

        let net = UniformNet {
            action_space_size: <AnimalState as GameState>::ACTION_SPACE_SIZE,
        };
        let mcts = Mcts::new(&net, MctsConfig {
            num_simulations: 4,
            ..Default::default()
        });
        let mut rng = seeded_rng(1);
        let dist = mcts.search(&state, &mut rng);
        assert!(dist.is_empty());
    }
}
