#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Crystal Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation layers to react to deterministically. Systems consume event
//! streams, query immutable snapshots, and respond exclusively with new
//! command batches.

mod cancellation;
mod config;
mod grid;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use cancellation::CancellationToken;
pub use config::{validate_dimensions, ConfigurationError, SessionConfig};
pub use grid::{CellState, GoalSet, Grid, MazeLayout};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Crystal Maze.";

/// Number of crystals hidden in every stage.
pub const GOAL_COUNT: usize = 3;

/// Cell every stage starts from.
pub const START_CELL: CellCoord = CellCoord::new(1, 1);

/// Smallest odd dimension for which the maze algorithm is defined.
pub const MIN_MAZE_DIMENSION: u32 = 5;

/// Number of numeric steps shown before a stage begins.
pub const COUNTDOWN_STEPS: u8 = 3;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Leaves the initial state and starts the first stage.
    StartGame,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Delivers a single edge-triggered input gathered by an adapter.
    Input {
        /// Input edge observed on this frame.
        edge: InputEdge,
    },
    /// Requests that the listed lit tiles become dark.
    DarkenTiles {
        /// Cells selected by the decay task.
        cells: Vec<CellCoord>,
        /// Token of the decay task that produced the request.
        token: CancellationToken,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a stage began its setup and countdown.
    StageStarted {
        /// Values derived for the stage.
        settings: StageSettings,
    },
    /// Carries the freshly generated maze and its crystals.
    MazeGenerated {
        /// Grid, walkable cells and start cell of the stage.
        layout: MazeLayout,
        /// Crystal cells placed for the stage.
        goals: GoalSet,
    },
    /// Shows or hides the whole maze.
    MazeVisibilityChanged {
        /// Whether the maze should be drawn.
        visible: bool,
    },
    /// Numeric countdown value to display.
    CountdownStep {
        /// Remaining count, from [`COUNTDOWN_STEPS`] down to one.
        value: u8,
    },
    /// The countdown finished and the collection prompt is shown.
    CollectPrompt,
    /// Player control is enabled and the stage timer is running.
    PlayStarted {
        /// Schedule for the background decay task of the stage.
        schedule: DecaySchedule,
    },
    /// The player was put on a cell without gliding.
    PlayerPlaced {
        /// Cell the player now occupies.
        cell: CellCoord,
    },
    /// The player started gliding towards a neighbouring floor cell.
    PlayerMoved {
        /// Cell the player left.
        from: CellCoord,
        /// Cell the player is heading to.
        to: CellCoord,
    },
    /// The player finished gliding and accepts input again.
    PlayerArrived {
        /// Cell the player arrived at.
        cell: CellCoord,
    },
    /// Shows or hides the player sprite.
    PlayerVisibilityChanged {
        /// Whether the player should be drawn.
        visible: bool,
    },
    /// A floor tile became lit.
    TileLit {
        /// Cell of the tile.
        cell: CellCoord,
    },
    /// A batch of lit tiles became dark.
    TilesDarkened {
        /// Cells that were darkened.
        cells: Vec<CellCoord>,
    },
    /// The player attempted to step off the maze floor.
    WrongPath {
        /// Cell the player tried to enter, when it lies inside the coordinate space.
        attempted: Option<CellCoord>,
    },
    /// Remaining health changed.
    HealthChanged {
        /// Health after the change.
        health: u32,
    },
    /// A crystal was collected.
    GoalCollected {
        /// Cell of the collected crystal.
        cell: CellCoord,
        /// Zero-based index of the collected crystal within the stage.
        index: u32,
    },
    /// Reports the time left on the stage clock.
    TimeRemaining {
        /// Time left before the stage times out.
        remaining: Duration,
    },
    /// All crystals of a stage were collected.
    StageCleared {
        /// Stage that was cleared.
        stage: StageNumber,
    },
    /// The session ended in failure.
    GameOver {
        /// Cause of the failure.
        reason: GameOverReason,
        /// Menu entry highlighted when the menu opens.
        default_option: MenuOption,
    },
    /// The highlighted game-over menu entry changed.
    MenuSelectionChanged {
        /// Entry that is now highlighted.
        option: MenuOption,
    },
    /// Every stage was cleared.
    GameCleared,
    /// Asks the adapter to load another scene.
    SceneRequested {
        /// Scene to load.
        scene: SceneRequest,
    },
    /// Fire-and-forget sound cue.
    SoundRequested {
        /// Sound to play.
        sound: SoundKind,
    },
    /// The decay task of a stage was cancelled.
    DecayCancelled {
        /// Stage whose decay task stopped.
        stage: StageNumber,
    },
}

/// Edge-triggered input delivered by adapters once per press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputEdge {
    /// Up arrow or equivalent.
    Up,
    /// Down arrow or equivalent.
    Down,
    /// Left arrow or equivalent.
    Left,
    /// Right arrow or equivalent.
    Right,
    /// Confirmation key.
    Confirm,
}

impl InputEdge {
    /// Movement direction mapped to the input, if any.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Up => Some(Direction::North),
            Self::Down => Some(Direction::South),
            Self::Left => Some(Direction::West),
            Self::Right => Some(Direction::East),
            Self::Confirm => None,
        }
    }
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in a fixed order.
    pub const ALL: [Direction; 4] = [Self::North, Self::South, Self::West, Self::East];

    /// Input edge that moves the player in this direction.
    #[must_use]
    pub const fn input_edge(self) -> InputEdge {
        match self {
            Self::North => InputEdge::Up,
            Self::South => InputEdge::Down,
            Self::West => InputEdge::Left,
            Self::East => InputEdge::Right,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Neighbouring cell `distance` steps away, or `None` when it would underflow.
    #[must_use]
    pub fn offset(self, direction: Direction, distance: u32) -> Option<CellCoord> {
        match direction {
            Direction::North => self
                .row
                .checked_sub(distance)
                .map(|row| Self::new(self.column, row)),
            Direction::South => self
                .row
                .checked_add(distance)
                .map(|row| Self::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(distance)
                .map(|column| Self::new(column, self.row)),
            Direction::East => self
                .column
                .checked_add(distance)
                .map(|column| Self::new(column, self.row)),
        }
    }

    /// Orthogonally adjacent cell in the provided direction.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        self.offset(direction, 1)
    }
}

/// One-based stage index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageNumber(u32);

impl StageNumber {
    /// The stage every session starts with.
    pub const FIRST: StageNumber = StageNumber(1);

    /// Creates a stage number, clamping zero to the first stage.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 {
            Self::FIRST
        } else {
            Self(value)
        }
    }

    /// Retrieves the numeric stage index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Stage following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Values derived deterministically from the stage number and session config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageSettings {
    stage: StageNumber,
    time_limit: Duration,
    tiles_per_decay: u32,
    decay_interval: Duration,
}

impl StageSettings {
    /// Derives the settings for `stage`.
    ///
    /// The time limit is the configured initial limit for every stage. Decay
    /// darkens `5 + (stage - 1) * 2` tiles every
    /// `max(5.0, 10.0 - (stage - 1) * 0.5)` seconds.
    #[must_use]
    pub fn derive(config: &SessionConfig, stage: StageNumber) -> Self {
        let elapsed_stages = stage.get().saturating_sub(1);
        let interval_secs = (10.0 - f64::from(elapsed_stages) * 0.5).max(5.0);
        Self {
            stage,
            time_limit: config.time_limit(),
            tiles_per_decay: elapsed_stages.saturating_mul(2).saturating_add(5),
            decay_interval: Duration::from_secs_f64(interval_secs),
        }
    }

    /// Stage the settings belong to.
    #[must_use]
    pub const fn stage(&self) -> StageNumber {
        self.stage
    }

    /// Time available to collect every crystal.
    #[must_use]
    pub const fn time_limit(&self) -> Duration {
        self.time_limit
    }

    /// Number of tiles darkened per decay tick.
    #[must_use]
    pub const fn tiles_per_decay(&self) -> u32 {
        self.tiles_per_decay
    }

    /// Delay between decay ticks.
    #[must_use]
    pub const fn decay_interval(&self) -> Duration {
        self.decay_interval
    }
}

/// Everything a decay task needs to run for one stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecaySchedule {
    /// Stage the task belongs to.
    pub stage: StageNumber,
    /// Delay between decay ticks.
    pub interval: Duration,
    /// Upper bound on tiles darkened per tick.
    pub tiles_per_tick: u32,
    /// Seed for the task's sampling RNG.
    pub seed: u64,
    /// Signal that stops the task.
    pub token: CancellationToken,
}

/// Entries of the game-over menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum MenuOption {
    /// Reload the main scene and play again from the first stage.
    #[default]
    Retry,
    /// Leave to the title scene.
    ReturnToTitle,
}

impl MenuOption {
    /// Position of the entry in the menu.
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Self::Retry => 0,
            Self::ReturnToTitle => 1,
        }
    }

    /// The other entry of the two-entry menu.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Retry => Self::ReturnToTitle,
            Self::ReturnToTitle => Self::Retry,
        }
    }
}

/// Scenes the world can ask adapters to load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneRequest {
    /// Title screen.
    Title,
    /// Reload the main scene, starting a fresh session.
    ReloadMain,
    /// Result screen shown after clearing every stage.
    Result,
}

/// Sound cues emitted by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundKind {
    /// First step of a glide.
    Footstep,
    /// Wrong-path penalty.
    Damage,
    /// Crystal collected.
    Get,
    /// Stage cleared.
    StageClear,
    /// Game-over menu highlight moved.
    MenuMove,
    /// Game-over menu entry confirmed.
    MenuSelect,
}

/// Causes of a game over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameOverReason {
    /// The stage clock reached zero.
    Timeout,
    /// Health dropped to zero after wrong moves.
    HealthDepleted,
}

/// Coarse phase of the progression state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// Session created, no stage started yet.
    Init,
    /// Stage generated, countdown running, input ignored.
    Countdown,
    /// Player control enabled and clock running.
    Playing,
    /// Terminal failure state with the retry menu open.
    GameOver,
    /// Terminal success state.
    GameClear,
    /// The player left for the title scene.
    Exited,
}

impl GamePhase {
    /// Reports whether no further stage transitions can happen.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::GameClear | Self::Exited)
    }
}
