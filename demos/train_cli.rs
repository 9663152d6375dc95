//! Minimal binary driving `shogi_zero::training_loop::run_training` end to
//! end. Grounded on the teacher's `main_cli.rs` (a `clap`-derived `Args`
//! struct, a plain loop, `println!` progress) — not part of the core per
//! spec.md §1/§6.3, which excludes CLI/HTTP/display surfaces; this exists
//! only so the library is exercisable, the way `main_cli.rs` exercises
//! `bot.rs` for Quoridor.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::sync_channel;
use std::thread;

use anyhow::Result;
use burn::backend::Autodiff;
use burn_ndarray::{NdArray, NdArrayDevice};
use clap::Parser;
use clap_derive::ValueEnum;

use shogi_zero::animal::state::AnimalState;
use shogi_zero::full::state::FullState;
use shogi_zero::nn::config::NetConfig;
use shogi_zero::progress::ProgressEvent;
use shogi_zero::training_loop::{run_training, LoopConfig};

type Backend = Autodiff<NdArray<f32>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Variant {
    Animal,
    Full,
}

#[derive(clap_derive::Parser, Debug)]
#[command(about = "Run the self-play generational training loop")]
struct Args {
    #[arg(short, long, default_value = "animal")]
    variant: Variant,

    #[arg(short = 'g', long, default_value_t = 10)]
    num_generations: u32,

    #[arg(short = 's', long, default_value_t = 5)]
    num_self_play_games: u32,

    #[arg(short = 'n', long, default_value_t = 25)]
    num_simulations: u32,

    #[arg(short = 'a', long, default_value_t = 10)]
    arena_games: u32,

    #[arg(short = 'w', long, default_value_t = 0.55)]
    win_rate_threshold: f32,

    #[arg(short = 'm', long, default_value = "best_model.mpk")]
    model_path: PathBuf,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let loop_config = LoopConfig {
        num_generations: args.num_generations,
        num_self_play_games: args.num_self_play_games,
        num_simulations: args.num_simulations,
        arena_games: args.arena_games,
        win_rate_threshold: args.win_rate_threshold,
        model_path: args.model_path,
        seed: args.seed,
    };

    let (progress_tx, progress_rx) = sync_channel::<ProgressEvent>(64);
    let stop_signal = AtomicBool::new(false);
    let device = NdArrayDevice::Cpu;

    let printer = thread::spawn(move || {
        for event in progress_rx.iter() {
            println!("{event:?}");
        }
    });

    let net_config = match args.variant {
        Variant::Animal => NetConfig::for_animal(),
        Variant::Full => NetConfig::for_full(),
    };

    let result = match args.variant {
        Variant::Animal => run_training::<AnimalState, Backend>(
            &net_config,
            loop_config,
            &progress_tx,
            &stop_signal,
            &device,
        ),
        Variant::Full => run_training::<FullState, Backend>(
            &net_config,
            loop_config,
            &progress_tx,
            &stop_signal,
            &device,
        ),
    };

    drop(progress_tx);
    printer.join().expect("progress printer thread panicked");
    result.map_err(Into::into)
}
