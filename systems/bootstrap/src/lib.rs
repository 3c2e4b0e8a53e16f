#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Trio Tiles session.
//!
//! The bootstrap owns the load-time [`GameConfig`], validates it and turns it
//! into the batch of commands that configures a fresh world.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trio_tiles_core::{
    Color, Command, WorldPoint, DEFAULT_ARRIVAL_TOLERANCE, DEFAULT_CELL_HEIGHT,
    DEFAULT_CELL_PALETTE, DEFAULT_CELL_WIDTH, DEFAULT_CHARACTER_PALETTE, DEFAULT_COLUMNS,
    DEFAULT_HOLDING_SLOTS, DEFAULT_MATCH_THRESHOLD, DEFAULT_MOVEMENT_SPEED, DEFAULT_PICK_RADIUS,
    DEFAULT_QUOTA_PER_COLOR, DEFAULT_ROWS, DEFAULT_SPAWN_COUNT, DEFAULT_SPAWN_SEED,
};
use trio_tiles_world::{query, World};

/// Errors reported while validating a game configuration.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A required part of the configuration is absent.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(&'static str),
    /// A board dimension is zero.
    #[error("board {field} must be at least 1, got {value}")]
    InvalidDimension {
        /// Name of the offending field.
        field: &'static str,
        /// Value supplied by the configuration.
        value: u32,
    },
    /// A measure that has to be strictly positive and finite is not.
    #[error("{field} must be a positive finite number, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Value supplied by the configuration.
        value: f32,
    },
    /// The match threshold is zero.
    #[error("match threshold must be at least 1")]
    ZeroThreshold,
}

/// Board layout parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of rows; the last one is reserved.
    pub rows: u32,
    /// Number of columns.
    pub columns: u32,
    /// World-space width of a cell along X.
    pub cell_width: f32,
    /// World-space height of a cell along Z.
    pub cell_height: f32,
    /// Colors painted onto the board cells.
    pub cell_palette: Vec<Color>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            cell_width: DEFAULT_CELL_WIDTH,
            cell_height: DEFAULT_CELL_HEIGHT,
            cell_palette: DEFAULT_CELL_PALETTE.to_vec(),
        }
    }
}

/// Parameters controlling the initial population of the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Number of characters to spawn.
    pub count: usize,
    /// Colors characters are drawn from.
    pub palette: Vec<Color>,
    /// How many characters of each palette color enter the pool.
    pub quota_per_color: usize,
    /// Seed of the pool shuffle.
    pub seed: u64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_SPAWN_COUNT,
            palette: DEFAULT_CHARACTER_PALETTE.to_vec(),
            quota_per_color: DEFAULT_QUOTA_PER_COLOR,
            seed: DEFAULT_SPAWN_SEED,
        }
    }
}

/// Parameters of the movement system.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Linear speed in world units per second.
    pub speed: f32,
    /// Per-axis distance under which a character counts as arrived.
    pub arrival_tolerance: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_MOVEMENT_SPEED,
            arrival_tolerance: DEFAULT_ARRIVAL_TOLERANCE,
        }
    }
}

/// Complete load-time configuration of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of same-colored placements that clear a color.
    pub match_threshold: u32,
    /// Radius within which a click selects a character.
    pub pick_radius: f32,
    /// Holding-slot positions in allocation order.
    pub holding_slots: Vec<WorldPoint>,
    /// Board layout.
    pub board: BoardConfig,
    /// Initial population.
    pub spawn: SpawnConfig,
    /// Movement tuning.
    pub movement: MovementConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            pick_radius: DEFAULT_PICK_RADIUS,
            holding_slots: DEFAULT_HOLDING_SLOTS.to_vec(),
            board: BoardConfig::default(),
            spawn: SpawnConfig::default(),
            movement: MovementConfig::default(),
        }
    }
}

impl GameConfig {
    /// Checks that the configuration describes a playable session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.cell_palette.is_empty() {
            return Err(ConfigError::ConfigurationMissing("board.cell_palette"));
        }
        if self.spawn.palette.is_empty() {
            return Err(ConfigError::ConfigurationMissing("spawn.palette"));
        }
        if self.holding_slots.is_empty() {
            return Err(ConfigError::ConfigurationMissing("holding_slots"));
        }

        for (field, value) in [("rows", self.board.rows), ("columns", self.board.columns)] {
            if value == 0 {
                return Err(ConfigError::InvalidDimension { field, value });
            }
        }

        for (field, value) in [
            ("board.cell_width", self.board.cell_width),
            ("board.cell_height", self.board.cell_height),
            ("movement.speed", self.movement.speed),
            ("movement.arrival_tolerance", self.movement.arrival_tolerance),
            ("pick_radius", self.pick_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        if self.match_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        Ok(())
    }
}

/// Produces data required to greet the player and start a session.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Validates the configuration and returns the commands that set up a world.
    ///
    /// Board configuration comes last; its `BoardConfigured` event is what the
    /// spawning system reacts to.
    pub fn startup_commands(&self, config: &GameConfig) -> Result<Vec<Command>, ConfigError> {
        config.validate()?;
        Ok(vec![
            Command::ConfigureHoldingSlots {
                positions: config.holding_slots.clone(),
            },
            Command::ConfigureBoard {
                rows: config.board.rows,
                columns: config.board.columns,
                cell_width: config.board.cell_width,
                cell_height: config.board.cell_height,
                cell_palette: config.board.cell_palette.clone(),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn missing_palette_is_reported() {
        let mut config = GameConfig::default();
        config.spawn.palette.clear();

        assert_eq!(
            config.validate(),
            Err(ConfigError::ConfigurationMissing("spawn.palette"))
        );
    }

    #[test]
    fn zero_rows_are_rejected() {
        let mut config = GameConfig::default();
        config.board.rows = 0;

        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDimension {
                field: "rows",
                value: 0
            })
        );
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        let mut config = GameConfig::default();
        config.movement.speed = 0.0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "movement.speed",
                ..
            })
        ));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            match_threshold = 4

            [board]
            rows = 5
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.match_threshold, 4);
        assert_eq!(config.board.rows, 5);
        assert_eq!(config.board.columns, 6);
        assert_eq!(config.spawn, SpawnConfig::default());
    }

    #[test]
    fn startup_commands_configure_slots_then_board() {
        let commands = Bootstrap
            .startup_commands(&GameConfig::default())
            .expect("valid configuration");

        assert!(matches!(
            commands.as_slice(),
            [
                Command::ConfigureHoldingSlots { positions },
                Command::ConfigureBoard {
                    rows: 9,
                    columns: 6,
                    ..
                },
            ] if positions.len() == 5
        ));
    }

    #[test]
    fn invalid_configuration_produces_no_commands() {
        let mut config = GameConfig::default();
        config.match_threshold = 0;

        assert_eq!(
            Bootstrap.startup_commands(&config),
            Err(ConfigError::ZeroThreshold)
        );
    }

    #[test]
    fn default_configuration_matches_default_world() {
        let config = GameConfig::default();
        let world = World::new();
        let board = query::board(&world);

        assert_eq!(
            board.dimensions(),
            (config.board.columns, config.board.rows)
        );
        assert_eq!(board.cell_width(), config.board.cell_width);
        assert_eq!(board.cell_height(), config.board.cell_height);
        let slots: Vec<WorldPoint> = query::holding_slots(&world)
            .iter()
            .map(|(_, slot)| slot.position())
            .collect();
        assert_eq!(slots, config.holding_slots);
    }

    #[test]
    fn welcome_banner_comes_from_world() {
        let world = World::new();
        assert_eq!(
            Bootstrap.welcome_banner(&world),
            "Welcome to Trio Tiles."
        );
    }
}
