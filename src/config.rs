use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_PACE_MS: u64 = 150;
pub const DEFAULT_FPS: u64 = 30;

#[derive(Parser, Debug, Clone)]
#[command(name = "pacman", about = "Eat every cake, dodge the ghosts")]
pub struct Args {
    /// Milliseconds between simulation rounds
    #[arg(
        long,
        env = "PACMAN_TICK_MS",
        default_value_t = DEFAULT_PACE_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub pace_ms: u64,

    /// Redraws per second
    #[arg(
        long,
        env = "PACMAN_FPS",
        default_value_t = DEFAULT_FPS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub fps: u64,

    /// Maze files to play in order instead of the built-in mazes
    #[arg(long)]
    pub maze: Vec<PathBuf>,

    /// Seed for ghost movement
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write a log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn settings(&self) -> Settings {
        Settings {
            pace: Duration::from_millis(self.pace_ms),
            seed: self.seed,
        }
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.fps.max(1))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Delay the pacing actor waits between simulation rounds.
    pub pace: Duration,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            pace: Duration::from_millis(DEFAULT_PACE_MS),
            seed: None,
        }
    }
}
