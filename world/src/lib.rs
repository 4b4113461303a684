#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state and stage progression for Crystal Maze.
//!
//! A [`World`] owns one playthrough: the current stage (maze, walkable set,
//! tile lighting and crystals), the player, health, the stage clock and the
//! cancellation signal of the running decay task. Every mutation goes through
//! [`apply`]; read access goes through [`query`].
//!
//! Stage data is rebuilt as a whole on every stage start and swapped in with a
//! single assignment, so readers never observe a half-replaced stage.

mod membership;
mod player;
mod tiles;

use std::time::Duration;

use crystal_maze_core::{
    CancellationToken, Command, ConfigurationError, DecaySchedule, Direction, Event, GameOverReason,
    GamePhase, GoalSet, InputEdge, MazeLayout, MenuOption, SceneRequest, SessionConfig,
    SoundKind, StageNumber, StageSettings, COUNTDOWN_STEPS, GOAL_COUNT, WELCOME_BANNER,
};
use crystal_maze_system_goal_placement::place_goals;
use crystal_maze_system_maze_generation::{dead_ends, generate_with};
use crystal_maze_system_stage_clock::{ClockStatus, StageClock};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use self::{membership::PathMembership, player::Player, tiles::TileArena};

/// Represents the authoritative Crystal Maze session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: SessionConfig,
    rng: ChaCha8Rng,
    phase: GamePhase,
    stage_number: StageNumber,
    stage: Option<Stage>,
    health: u32,
    player: Player,
    clock: StageClock,
    countdown: Countdown,
    decay_token: Option<CancellationToken>,
    menu_selection: MenuOption,
}

impl World {
    /// Creates a session in the initial phase after validating `config`.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let health = config.initial_health;
        Ok(Self {
            banner: WELCOME_BANNER,
            config,
            rng,
            phase: GamePhase::Init,
            stage_number: StageNumber::FIRST,
            stage: None,
            health,
            player: Player::new(crystal_maze_core::START_CELL),
            clock: StageClock::new(),
            countdown: Countdown::default(),
            decay_token: None,
            menu_selection: MenuOption::default(),
        })
    }

    fn reset_session(&mut self) {
        self.phase = GamePhase::Init;
        self.stage_number = StageNumber::FIRST;
        self.stage = None;
        self.health = self.config.initial_health;
        self.player = Player::new(crystal_maze_core::START_CELL);
        self.clock = StageClock::new();
        self.countdown = Countdown::default();
        self.menu_selection = MenuOption::default();
    }

    fn start_stage(&mut self, out_events: &mut Vec<Event>) {
        self.cancel_decay(out_events);
        self.clock.stop();
        self.player.set_can_move(false);

        let settings = StageSettings::derive(&self.config, self.stage_number);
        let stage = match Stage::generate(&self.config, settings, &mut self.rng) {
            Ok(stage) => stage,
            Err(error) => {
                tracing::error!(%error, stage = settings.stage().get(), "stage generation failed");
                self.phase = GamePhase::Exited;
                return;
            }
        };

        tracing::info!(
            stage = settings.stage().get(),
            path_cells = stage.layout.path_cells().len(),
            "stage started"
        );

        out_events.push(Event::StageStarted { settings });
        out_events.push(Event::MazeVisibilityChanged { visible: false });
        out_events.push(Event::PlayerVisibilityChanged { visible: false });
        out_events.push(Event::MazeGenerated {
            layout: stage.layout.clone(),
            goals: stage.goals.clone(),
        });

        let start = stage.layout.start();
        self.stage = Some(stage);
        self.phase = GamePhase::Countdown;

        self.health = self.config.initial_health;
        out_events.push(Event::HealthChanged {
            health: self.health,
        });
        out_events.push(Event::TimeRemaining {
            remaining: settings.time_limit(),
        });

        self.player.place(start);
        out_events.push(Event::PlayerPlaced { cell: start });
        self.light_tile(start, out_events);

        self.countdown = Countdown::default();
        out_events.push(Event::CountdownStep {
            value: COUNTDOWN_STEPS,
        });
    }

    fn advance_countdown(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.countdown.elapsed = self.countdown.elapsed.saturating_add(dt);
        loop {
            match self.countdown.step {
                CountdownStep::Number(value) => {
                    let step = self.config.countdown_step();
                    if self.countdown.elapsed < step {
                        return;
                    }
                    self.countdown.elapsed -= step;
                    if value > 1 {
                        self.countdown.step = CountdownStep::Number(value - 1);
                        out_events.push(Event::CountdownStep { value: value - 1 });
                    } else {
                        self.countdown.step = CountdownStep::Prompt;
                        out_events.push(Event::CollectPrompt);
                    }
                }
                CountdownStep::Prompt => {
                    if self.countdown.elapsed < self.config.settle_delay() {
                        return;
                    }
                    self.begin_play(out_events);
                    return;
                }
            }
        }
    }

    fn begin_play(&mut self, out_events: &mut Vec<Event>) {
        let Some(stage) = self.stage.as_ref() else {
            return;
        };
        let settings = stage.settings;

        self.phase = GamePhase::Playing;
        out_events.push(Event::MazeVisibilityChanged { visible: true });
        out_events.push(Event::PlayerVisibilityChanged { visible: true });
        self.player.set_can_move(true);

        let token = CancellationToken::new();
        self.decay_token = Some(token.clone());
        out_events.push(Event::PlayStarted {
            schedule: DecaySchedule {
                stage: settings.stage(),
                interval: settings.decay_interval(),
                tiles_per_tick: settings.tiles_per_decay(),
                seed: self.rng.gen(),
                token,
            },
        });

        self.clock.start(settings.time_limit());
    }

    fn advance_play(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self
            .player
            .advance(dt, self.config.move_speed_tiles_per_sec)
        {
            out_events.push(Event::PlayerArrived {
                cell: self.player.cell(),
            });
        }

        match self.clock.advance(dt) {
            ClockStatus::Idle => {}
            ClockStatus::Running { remaining } => {
                out_events.push(Event::TimeRemaining { remaining });
            }
            ClockStatus::Expired => {
                out_events.push(Event::TimeRemaining {
                    remaining: Duration::ZERO,
                });
                self.game_over(GameOverReason::Timeout, out_events);
            }
        }
    }

    fn try_move(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if !self.player.accepts_input() {
            return;
        }
        let Some(stage) = self.stage.as_ref() else {
            return;
        };

        let from = self.player.cell();
        let attempted = from.step(direction);
        match attempted.filter(|cell| stage.membership.contains(*cell)) {
            Some(to) => {
                self.player.begin_glide(to);
                out_events.push(Event::PlayerMoved { from, to });
                out_events.push(Event::SoundRequested {
                    sound: SoundKind::Footstep,
                });
                self.light_tile(to, out_events);
                self.on_goal_reached(to, out_events);
            }
            None => self.on_wrong_path(attempted, out_events),
        }
    }

    fn on_wrong_path(&mut self, attempted: Option<crystal_maze_core::CellCoord>, out_events: &mut Vec<Event>) {
        if self.phase.is_terminal() {
            return;
        }

        self.player.set_can_move(false);
        self.health = self.health.saturating_sub(1);
        tracing::debug!(health = self.health, ?attempted, "wrong path");
        out_events.push(Event::WrongPath { attempted });
        out_events.push(Event::HealthChanged {
            health: self.health,
        });
        out_events.push(Event::SoundRequested {
            sound: SoundKind::Damage,
        });

        if self.health == 0 {
            self.game_over(GameOverReason::HealthDepleted, out_events);
            return;
        }

        let Some(start) = self.stage.as_ref().map(|stage| stage.layout.start()) else {
            return;
        };
        self.player.place(start);
        out_events.push(Event::PlayerPlaced { cell: start });
        self.player.set_can_move(true);
        out_events.push(Event::PlayerArrived { cell: start });
    }

    fn on_goal_reached(&mut self, cell: crystal_maze_core::CellCoord, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        if !stage.goals.remove(cell) {
            return;
        }

        stage.collected += 1;
        let index = stage.collected - 1;
        let collected = stage.collected;
        tracing::debug!(?cell, collected, "crystal collected");
        out_events.push(Event::GoalCollected { cell, index });
        out_events.push(Event::SoundRequested {
            sound: SoundKind::Get,
        });

        if usize::try_from(collected).map_or(true, |count| count >= GOAL_COUNT) {
            self.clear_stage(out_events);
        }
    }

    fn clear_stage(&mut self, out_events: &mut Vec<Event>) {
        let cleared = self.stage_number;
        self.clock.stop();
        self.player.set_can_move(false);
        self.cancel_decay(out_events);
        out_events.push(Event::PlayerVisibilityChanged { visible: false });
        out_events.push(Event::StageCleared { stage: cleared });
        out_events.push(Event::SoundRequested {
            sound: SoundKind::StageClear,
        });

        self.stage_number = cleared.next();
        if self.stage_number.get() > self.config.max_stages {
            self.phase = GamePhase::GameClear;
            tracing::info!(stages = self.config.max_stages, "game cleared");
            out_events.push(Event::GameCleared);
            out_events.push(Event::SceneRequested {
                scene: SceneRequest::Result,
            });
        } else {
            self.start_stage(out_events);
        }
    }

    fn game_over(&mut self, reason: GameOverReason, out_events: &mut Vec<Event>) {
        if self.phase.is_terminal() {
            return;
        }

        self.phase = GamePhase::GameOver;
        self.clock.stop();
        self.player.set_can_move(false);
        self.cancel_decay(out_events);
        self.menu_selection = MenuOption::default();
        tracing::info!(?reason, stage = self.stage_number.get(), "game over");

        out_events.push(Event::PlayerVisibilityChanged { visible: false });
        out_events.push(Event::MazeVisibilityChanged { visible: false });
        out_events.push(Event::GameOver {
            reason,
            default_option: self.menu_selection,
        });
    }

    fn handle_menu_input(&mut self, edge: InputEdge, out_events: &mut Vec<Event>) {
        match edge {
            InputEdge::Up | InputEdge::Down => {
                self.menu_selection = self.menu_selection.toggled();
                out_events.push(Event::MenuSelectionChanged {
                    option: self.menu_selection,
                });
                out_events.push(Event::SoundRequested {
                    sound: SoundKind::MenuMove,
                });
            }
            InputEdge::Confirm => {
                self.cancel_decay(out_events);
                out_events.push(Event::SoundRequested {
                    sound: SoundKind::MenuSelect,
                });
                match self.menu_selection {
                    MenuOption::Retry => {
                        out_events.push(Event::SceneRequested {
                            scene: SceneRequest::ReloadMain,
                        });
                        self.reset_session();
                        self.start_stage(out_events);
                    }
                    MenuOption::ReturnToTitle => {
                        self.phase = GamePhase::Exited;
                        out_events.push(Event::SceneRequested {
                            scene: SceneRequest::Title,
                        });
                    }
                }
            }
            InputEdge::Left | InputEdge::Right => {}
        }
    }

    fn darken_tiles(
        &mut self,
        cells: Vec<crystal_maze_core::CellCoord>,
        token: &CancellationToken,
        out_events: &mut Vec<Event>,
    ) {
        if self.phase != GamePhase::Playing || token.is_cancelled() {
            return;
        }
        if self.decay_token.as_ref() != Some(token) {
            return;
        }
        let Some(stage) = self.stage.as_mut() else {
            return;
        };

        let darkened: Vec<_> = cells
            .into_iter()
            .filter(|cell| stage.tiles.darken(*cell))
            .collect();
        if !darkened.is_empty() {
            out_events.push(Event::TilesDarkened { cells: darkened });
        }
    }

    fn light_tile(&mut self, cell: crystal_maze_core::CellCoord, out_events: &mut Vec<Event>) {
        if let Some(stage) = self.stage.as_mut() {
            if stage.tiles.light(cell) {
                out_events.push(Event::TileLit { cell });
            }
        }
    }

    fn cancel_decay(&mut self, out_events: &mut Vec<Event>) {
        if let Some(token) = self.decay_token.take() {
            token.cancel();
            tracing::debug!(stage = self.stage_number.get(), "decay cancelled");
            out_events.push(Event::DecayCancelled {
                stage: self.stage_number,
            });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Within one frame, adapters apply input commands before the tick so that a
/// crystal collected on the final frame wins over the clock running out.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartGame => {
            if world.phase == GamePhase::Init {
                world.start_stage(out_events);
            }
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            match world.phase {
                GamePhase::Countdown => world.advance_countdown(dt, out_events),
                GamePhase::Playing => world.advance_play(dt, out_events),
                GamePhase::Init | GamePhase::GameOver | GamePhase::GameClear | GamePhase::Exited => {}
            }
        }
        Command::Input { edge } => match world.phase {
            GamePhase::Playing => {
                if let Some(direction) = edge.direction() {
                    world.try_move(direction, out_events);
                }
            }
            GamePhase::GameOver => world.handle_menu_input(edge, out_events),
            GamePhase::Init | GamePhase::Countdown | GamePhase::GameClear | GamePhase::Exited => {}
        },
        Command::DarkenTiles { cells, token } => world.darken_tiles(cells, &token, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use crystal_maze_core::{
        CancellationToken, CellCoord, GamePhase, MazeLayout, MenuOption, SessionConfig,
        StageNumber, StageSettings,
    };
    use glam::Vec2;

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(world: &World) -> &SessionConfig {
        &world.config
    }

    /// Current phase of the progression state machine.
    #[must_use]
    pub fn phase(world: &World) -> GamePhase {
        world.phase
    }

    /// Cumulative stage counter. Exceeds `max_stages` by one once the game is cleared.
    #[must_use]
    pub fn stage_number(world: &World) -> StageNumber {
        world.stage_number
    }

    /// Settings of the stage currently on screen, if any.
    #[must_use]
    pub fn stage_settings(world: &World) -> Option<StageSettings> {
        world.stage.as_ref().map(|stage| stage.settings)
    }

    /// Remaining health.
    #[must_use]
    pub fn health(world: &World) -> u32 {
        world.health
    }

    /// Maze of the current stage, if one was generated.
    #[must_use]
    pub fn layout(world: &World) -> Option<&MazeLayout> {
        world.stage.as_ref().map(|stage| &stage.layout)
    }

    /// Reports whether the cell is walkable floor of the current stage.
    #[must_use]
    pub fn is_path(world: &World, cell: CellCoord) -> bool {
        world
            .stage
            .as_ref()
            .map_or(false, |stage| stage.membership.contains(cell))
    }

    /// Crystals still waiting in the current stage.
    #[must_use]
    pub fn goals(world: &World) -> &[CellCoord] {
        match world.stage.as_ref() {
            Some(stage) => stage.goals.cells(),
            None => &[],
        }
    }

    /// Crystals collected in the current stage.
    #[must_use]
    pub fn collected_goals(world: &World) -> u32 {
        world.stage.as_ref().map_or(0, |stage| stage.collected)
    }

    /// Lit floor tiles of the current stage in row-major order.
    #[must_use]
    pub fn lit_tiles(world: &World) -> Vec<CellCoord> {
        world
            .stage
            .as_ref()
            .map_or_else(Vec::new, |stage| stage.tiles.lit_cells())
    }

    /// Reports whether the tile on `cell` is lit.
    #[must_use]
    pub fn is_lit(world: &World, cell: CellCoord) -> bool {
        world
            .stage
            .as_ref()
            .map_or(false, |stage| stage.tiles.is_lit(cell))
    }

    /// Cell the player occupies logically.
    #[must_use]
    pub fn player_cell(world: &World) -> CellCoord {
        world.player.cell()
    }

    /// Presented player position in tile units, interpolated while gliding.
    #[must_use]
    pub fn player_position(world: &World) -> Vec2 {
        world.player.position()
    }

    /// Reports whether movement input would currently be accepted.
    #[must_use]
    pub fn player_accepts_input(world: &World) -> bool {
        world.phase == GamePhase::Playing && world.player.accepts_input()
    }

    /// Time left on the stage clock.
    #[must_use]
    pub fn time_remaining(world: &World) -> Duration {
        if world.clock.is_active() {
            world.clock.remaining()
        } else {
            world
                .stage
                .as_ref()
                .filter(|_| world.phase == GamePhase::Countdown)
                .map_or(world.clock.remaining(), |stage| stage.settings.time_limit())
        }
    }

    /// Highlighted entry of the game-over menu.
    #[must_use]
    pub fn menu_selection(world: &World) -> MenuOption {
        world.menu_selection
    }

    /// Cancellation signal of the live decay task, if one is running.
    #[must_use]
    pub fn decay_token(world: &World) -> Option<&CancellationToken> {
        world.decay_token.as_ref()
    }
}

/// Everything that belongs to one maze instance. Replaced wholesale per stage.
#[derive(Debug)]
struct Stage {
    settings: StageSettings,
    layout: MazeLayout,
    membership: PathMembership,
    tiles: TileArena,
    goals: GoalSet,
    collected: u32,
}

impl Stage {
    fn generate(
        config: &SessionConfig,
        settings: StageSettings,
        rng: &mut ChaCha8Rng,
    ) -> Result<Self, ConfigurationError> {
        let layout = generate_with(config.width, config.height, rng)?;
        let ends = dead_ends(&layout);
        let goals = place_goals(&layout, &ends, GOAL_COUNT, rng)?;
        Ok(Self {
            settings,
            membership: PathMembership::from_path(layout.path_cells()),
            tiles: TileArena::from_layout(&layout),
            layout,
            goals,
            collected: 0,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CountdownStep {
    Number(u8),
    Prompt,
}

#[derive(Clone, Copy, Debug)]
struct Countdown {
    step: CountdownStep,
    elapsed: Duration,
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            step: CountdownStep::Number(COUNTDOWN_STEPS),
            elapsed: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn countdown_total(config: &SessionConfig) -> Duration {
        config.countdown_step() * u32::from(COUNTDOWN_STEPS) + config.settle_delay()
    }

    #[test]
    fn new_world_rejects_invalid_config() {
        let config = SessionConfig {
            width: 8,
            ..SessionConfig::default()
        };
        assert_eq!(
            World::new(config).map(|_| ()),
            Err(ConfigurationError::EvenDimension { value: 8 })
        );
    }

    #[test]
    fn start_game_only_works_from_init() {
        let mut world = World::new(SessionConfig::default()).expect("valid config");
        let mut events = Vec::new();
        apply(&mut world, Command::StartGame, &mut events);
        assert_eq!(query::phase(&world), GamePhase::Countdown);

        events.clear();
        apply(&mut world, Command::StartGame, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn countdown_emits_numbers_then_prompt_then_play() {
        let config = SessionConfig::default();
        let mut world = World::new(config.clone()).expect("valid config");
        let mut events = Vec::new();
        apply(&mut world, Command::StartGame, &mut events);
        assert!(events.contains(&Event::CountdownStep { value: 3 }));

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: config.countdown_step() * 3,
            },
            &mut events,
        );
        assert!(events.contains(&Event::CountdownStep { value: 2 }));
        assert!(events.contains(&Event::CountdownStep { value: 1 }));
        assert!(events.contains(&Event::CollectPrompt));
        assert_eq!(query::phase(&world), GamePhase::Countdown);

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: config.settle_delay(),
            },
            &mut events,
        );
        assert_eq!(query::phase(&world), GamePhase::Playing);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::PlayStarted { .. })));
        assert!(query::player_accepts_input(&world));
    }

    #[test]
    fn input_is_ignored_during_countdown() {
        let config = SessionConfig::default();
        let mut world = World::new(config.clone()).expect("valid config");
        let mut events = Vec::new();
        apply(&mut world, Command::StartGame, &mut events);

        events.clear();
        apply(
            &mut world,
            Command::Input {
                edge: InputEdge::Up,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::health(&world), config.initial_health);
        assert!(countdown_total(&config) > Duration::ZERO);
    }

    #[test]
    fn stale_decay_token_cannot_darken_tiles() {
        let config = SessionConfig::default();
        let mut world = World::new(config.clone()).expect("valid config");
        let mut events = Vec::new();
        apply(&mut world, Command::StartGame, &mut events);
        apply(
            &mut world,
            Command::Tick {
                dt: countdown_total(&config),
            },
            &mut events,
        );

        let lit_before = query::lit_tiles(&world);
        let stale = CancellationToken::new();
        events.clear();
        apply(
            &mut world,
            Command::DarkenTiles {
                cells: lit_before.clone(),
                token: stale,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::lit_tiles(&world), lit_before);
    }
}
