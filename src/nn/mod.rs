//! Dual-head policy+value network (spec §4.G).

pub mod config;
pub mod net;
pub mod weights;

pub use config::NetConfig;
pub use net::{DualHeadNet, NetOutput};
