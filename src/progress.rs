//! Progress events emitted by the generational training loop (spec §5, §9
//! "typed bounded channel with explicit back-pressure"). A
//! `std::sync::mpsc::SyncSender<ProgressEvent>` is the bounded channel;
//! `try_send` callers decide how to handle a full channel rather than the
//! training loop silently dropping or blocking on a stalled consumer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase")]
pub enum ProgressEvent {
    SelfPlayStarted { generation: u32, num_games: u32 },
    SelfPlayFinished { generation: u32, num_examples: usize },
    TrainingStarted { generation: u32 },
    TrainingFinished { generation: u32, policy_loss: f32, value_loss: f32 },
    ArenaStarted { generation: u32, num_games: u32 },
    ArenaFinished { generation: u32, win_rate: f32, promoted: bool },
    GenerationDone { generation: u32 },
    Stopped { generation: u32 },
    Done { final_generation: u32 },
}
