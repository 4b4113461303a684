//! Session configuration and the errors raised while validating it.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::{GOAL_COUNT, MIN_MAZE_DIMENSION};

const DEFAULT_DIMENSION: u32 = 21;
const DEFAULT_TIME_LIMIT_SECS: f32 = 30.0;
const DEFAULT_MAX_STAGES: u32 = 5;
const DEFAULT_HEALTH: u32 = 3;
const DEFAULT_COUNTDOWN_STEP_MS: u64 = 200;
const DEFAULT_SETTLE_DELAY_MS: u64 = 1_500;
const DEFAULT_MOVE_SPEED: f32 = 5.0;
const DEFAULT_SEED: u64 = 0x5eed_c0de;

/// Tunable parameters for a playthrough.
///
/// Every field has a default, so partial TOML documents are accepted.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Number of maze columns; must be odd and at least five.
    pub width: u32,
    /// Number of maze rows; must be odd and at least five.
    pub height: u32,
    /// Seconds available per stage. Identical for every stage.
    pub initial_time_limit_secs: f32,
    /// Number of stages to clear before the game is won.
    pub max_stages: u32,
    /// Health restored at the start of every stage.
    pub initial_health: u32,
    /// Milliseconds each countdown number stays on screen.
    pub countdown_step_ms: u64,
    /// Milliseconds the collection prompt stays on screen before play starts.
    pub settle_delay_ms: u64,
    /// Player glide speed in tiles per second.
    pub move_speed_tiles_per_sec: f32,
    /// Seed for the session random number generator.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_DIMENSION,
            height: DEFAULT_DIMENSION,
            initial_time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            max_stages: DEFAULT_MAX_STAGES,
            initial_health: DEFAULT_HEALTH,
            countdown_step_ms: DEFAULT_COUNTDOWN_STEP_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            move_speed_tiles_per_sec: DEFAULT_MOVE_SPEED,
            seed: DEFAULT_SEED,
        }
    }
}

impl SessionConfig {
    /// Checks the invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate_dimensions(self.width, self.height)?;
        if self.max_stages == 0 {
            return Err(ConfigurationError::NoStages);
        }
        if self.initial_health == 0 {
            return Err(ConfigurationError::NoHealth);
        }
        if !(self.initial_time_limit_secs.is_finite() && self.initial_time_limit_secs > 0.0) {
            return Err(ConfigurationError::NonPositiveTimeLimit {
                seconds: self.initial_time_limit_secs,
            });
        }
        if Duration::try_from_secs_f32(self.initial_time_limit_secs).is_err() {
            return Err(ConfigurationError::TimeLimitOutOfRange {
                seconds: self.initial_time_limit_secs,
            });
        }
        if !(self.move_speed_tiles_per_sec.is_finite() && self.move_speed_tiles_per_sec > 0.0) {
            return Err(ConfigurationError::NonPositiveMoveSpeed {
                speed: self.move_speed_tiles_per_sec,
            });
        }
        Ok(())
    }

    /// Stage time limit as a duration.
    ///
    /// Limits too large for a [`Duration`] saturate; [`SessionConfig::validate`]
    /// rejects them before a session starts.
    #[must_use]
    pub fn time_limit(&self) -> Duration {
        let seconds = self.initial_time_limit_secs.max(0.0);
        Duration::try_from_secs_f32(seconds).unwrap_or(Duration::MAX)
    }

    /// Duration of a single countdown number.
    #[must_use]
    pub const fn countdown_step(&self) -> Duration {
        Duration::from_millis(self.countdown_step_ms)
    }

    /// Duration of the collection prompt.
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Checks that a maze of `width` by `height` cells can be carved.
pub fn validate_dimensions(width: u32, height: u32) -> Result<(), ConfigurationError> {
    for value in [width, height] {
        if value < MIN_MAZE_DIMENSION {
            return Err(ConfigurationError::DimensionTooSmall {
                value,
                minimum: MIN_MAZE_DIMENSION,
            });
        }
        if value % 2 == 0 {
            return Err(ConfigurationError::EvenDimension { value });
        }
    }
    Ok(())
}

/// Fatal setup problems surfaced before a session starts.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigurationError {
    /// A maze dimension is below the supported minimum.
    #[error("maze dimension {value} is smaller than the minimum of {minimum}")]
    DimensionTooSmall {
        /// Offending dimension.
        value: u32,
        /// Smallest accepted dimension.
        minimum: u32,
    },
    /// A maze dimension is even.
    #[error("maze dimension {value} must be odd")]
    EvenDimension {
        /// Offending dimension.
        value: u32,
    },
    /// The maze has fewer walkable cells than crystals to place.
    #[error("maze has {available} walkable cells but {} crystals are required", GOAL_COUNT)]
    InsufficientPathCells {
        /// Number of distinct walkable cells found.
        available: usize,
    },
    /// `max_stages` is zero.
    #[error("at least one stage is required")]
    NoStages,
    /// `initial_health` is zero.
    #[error("initial health must be positive")]
    NoHealth,
    /// The time limit is zero, negative or not finite.
    #[error("stage time limit must be positive (received {seconds}s)")]
    NonPositiveTimeLimit {
        /// Configured time limit in seconds.
        seconds: f32,
    },
    /// The time limit does not fit in a duration.
    #[error("stage time limit of {seconds}s is too large")]
    TimeLimitOutOfRange {
        /// Configured time limit in seconds.
        seconds: f32,
    },
    /// The glide speed is zero, negative or not finite.
    #[error("move speed must be positive (received {speed} tiles/s)")]
    NonPositiveMoveSpeed {
        /// Configured speed in tiles per second.
        speed: f32,
    },
}
