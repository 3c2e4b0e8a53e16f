#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that populates a freshly configured board.
//!
//! Colors are drawn from a pool holding every palette entry `quota_per_color`
//! times. The pool is shuffled with a seeded generator and handed out to the
//! empty cells of the board in row-major order.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};
use trio_tiles_core::{
    Color, Command, Event, Occupancy, OccupancyView, DEFAULT_CHARACTER_PALETTE,
    DEFAULT_QUOTA_PER_COLOR, DEFAULT_SPAWN_COUNT, DEFAULT_SPAWN_SEED,
};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    count: usize,
    palette: Vec<Color>,
    quota_per_color: usize,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// `count` is the number of characters spawned per board; it is capped by
    /// the size of the color pool and by the number of empty cells.
    #[must_use]
    pub fn new(count: usize, palette: Vec<Color>, quota_per_color: usize, rng_seed: u64) -> Self {
        Self {
            count,
            palette,
            quota_per_color,
            rng_seed,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            DEFAULT_SPAWN_COUNT,
            DEFAULT_CHARACTER_PALETTE.to_vec(),
            DEFAULT_QUOTA_PER_COLOR,
            DEFAULT_SPAWN_SEED,
        )
    }
}

/// Pure system that emits spawn commands whenever a board is configured.
#[derive(Debug)]
pub struct Spawning {
    count: usize,
    palette: Vec<Color>,
    quota_per_color: usize,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            count: config.count,
            palette: config.palette,
            quota_per_color: config.quota_per_color,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and the occupancy view to emit spawn commands.
    ///
    /// Only batches containing [`Event::BoardConfigured`] produce commands; the
    /// view must already reflect that configuration, reserved row included.
    pub fn handle(&mut self, events: &[Event], occupancy: &OccupancyView<'_>, out: &mut Vec<Command>) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::BoardConfigured { .. }))
        {
            return;
        }

        let pool = self.shuffled_pool();
        if pool.len() < self.count {
            warn!(
                requested = self.count,
                available = pool.len(),
                "color pool smaller than spawn count"
            );
        }

        let before = out.len();
        out.extend(
            occupancy
                .cells()
                .filter(|(_, state)| *state == Occupancy::Empty)
                .map(|(cell, _)| cell)
                .zip(pool)
                .take(self.count)
                .map(|(cell, color)| Command::SpawnCharacter { cell, color }),
        );
        debug!(spawned = out.len() - before, "spawn commands emitted");
    }

    fn shuffled_pool(&mut self) -> Vec<Color> {
        let mut pool: Vec<Color> = self
            .palette
            .iter()
            .flat_map(|color| std::iter::repeat(*color).take(self.quota_per_color))
            .collect();
        pool.shuffle(&mut self.rng);
        pool
    }
}

impl Default for Spawning {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
