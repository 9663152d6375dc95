//! Network architecture configuration (spec §4.G).
//!
//! Both variants share the same dual-head residual tower; only the input
//! shape, action space, and tower depth differ. `NetConfig::for_animal` /
//! `for_full` are the two instantiations actually used; the struct stays
//! generic so a reader constructing a custom config (e.g. for a smaller
//! debug net) does not have to thread separate parameters everywhere.

use crate::animal::state::PLANE_CHANNELS as ANIMAL_PLANE_CHANNELS;
use crate::animal::types::{COLS as ANIMAL_COLS, ROWS as ANIMAL_ROWS};
use crate::full::codec::ACTION_SPACE_SIZE as FULL_ACTION_SPACE_SIZE;
use crate::full::state::PLANE_CHANNELS as FULL_PLANE_CHANNELS;
use crate::full::types::{COLS as FULL_COLS, ROWS as FULL_ROWS};
use crate::animal::codec::ACTION_SPACE_SIZE as ANIMAL_ACTION_SPACE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetConfig {
    pub in_channels: usize,
    pub board_rows: usize,
    pub board_cols: usize,
    pub action_space_size: usize,
    /// Channel width of every residual block's convolutions.
    pub residual_channels: usize,
    pub num_residual_blocks: usize,
    /// Hidden layer width in the value head's first dense layer.
    pub value_hidden: usize,
}

impl NetConfig {
    /// Small tower for the 3x4 board: fewer channels, fewer blocks, the
    /// board is tiny enough that a deep tower would just overfit.
    pub fn for_animal() -> Self {
        Self {
            in_channels: ANIMAL_PLANE_CHANNELS,
            board_rows: ANIMAL_ROWS,
            board_cols: ANIMAL_COLS,
            action_space_size: ANIMAL_ACTION_SPACE_SIZE,
            residual_channels: 64,
            num_residual_blocks: 3,
            value_hidden: 64,
        }
    }

    /// Full-size tower for the 9x9 board.
    pub fn for_full() -> Self {
        Self {
            in_channels: FULL_PLANE_CHANNELS,
            board_rows: FULL_ROWS,
            board_cols: FULL_COLS,
            action_space_size: FULL_ACTION_SPACE_SIZE,
            residual_channels: 128,
            num_residual_blocks: 5,
            value_hidden: 64,
        }
    }

    pub fn board_squares(&self) -> usize {
        self.board_rows * self.board_cols
    }
}
