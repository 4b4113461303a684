#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for Crystal Maze adapters.
//!
//! The world never touches presentation objects. Adapters implement
//! [`Presenter`] and [`Hud`], keep a [`SceneSync`] arena that maps maze cells
//! to their own handles, and feed it the events returned by the world.

use std::fmt;

use anyhow::{Context, Result as AnyResult};
use crystal_maze_core::{
    CellCoord, CellState, Event, MazeLayout, MenuOption, SceneRequest, SoundKind, StageNumber,
};
use crystal_maze_system_stage_clock::display_seconds;
use glam::Vec2;

/// Kinds of objects a presenter can instantiate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Impassable wall tile.
    Wall,
    /// Walkable floor tile; hidden while dark.
    Floor,
    /// Crystal waiting to be collected.
    Crystal,
    /// The player avatar.
    Player,
}

/// Render/prefab layer that owns the actual drawable objects.
pub trait Presenter {
    /// Opaque reference to a drawable created by the presenter.
    type Handle: Copy + fmt::Debug;

    /// Creates a drawable of `kind` on `cell`.
    fn instantiate(&mut self, kind: TileKind, cell: CellCoord) -> AnyResult<Self::Handle>;

    /// Removes a drawable created by [`Presenter::instantiate`].
    fn destroy(&mut self, handle: Self::Handle) -> AnyResult<()>;

    /// Shows or hides a drawable.
    fn set_visible(&mut self, handle: Self::Handle, visible: bool) -> AnyResult<()>;

    /// Moves a drawable to a position expressed in tile units.
    fn move_to(&mut self, handle: Self::Handle, position: Vec2) -> AnyResult<()>;
}

/// Audio and UI layer. Every call is a fire-and-forget notification.
pub trait Hud {
    /// Plays a one-shot sound cue.
    fn play_sound(&mut self, sound: SoundKind);

    /// Shows the whole seconds left on the stage clock.
    fn update_timer_display(&mut self, seconds: u64);

    /// Shows the remaining health.
    fn update_health_display(&mut self, health: u32);

    /// Marks the crystal icon at `index` as collected.
    fn update_goal_display(&mut self, index: u32);

    /// Resets every crystal icon to uncollected.
    fn reset_goal_display(&mut self);

    /// Shows the label of the stage that is starting.
    fn update_stage_display(&mut self, stage: StageNumber);

    /// Shows a countdown number.
    fn show_countdown(&mut self, value: u8);

    /// Shows the "collect the crystals" prompt.
    fn show_collect_prompt(&mut self);

    /// Hides countdown and prompt text once play starts.
    fn hide_countdown(&mut self);

    /// Opens the game-over menu with `default_option` highlighted.
    fn show_game_over_menu(&mut self, default_option: MenuOption);

    /// Moves the game-over menu highlight.
    fn update_menu_selection(&mut self, option: MenuOption);

    /// Loads another scene.
    fn request_scene(&mut self, scene: SceneRequest);
}

/// Forwards world events to the audio/UI layer.
pub fn dispatch_hud<H>(events: &[Event], hud: &mut H)
where
    H: Hud + ?Sized,
{
    for event in events {
        match event {
            Event::StageStarted { settings } => {
                hud.update_stage_display(settings.stage());
                hud.reset_goal_display();
            }
            Event::CountdownStep { value } => hud.show_countdown(*value),
            Event::CollectPrompt => hud.show_collect_prompt(),
            Event::PlayStarted { .. } => hud.hide_countdown(),
            Event::TimeRemaining { remaining } => {
                hud.update_timer_display(display_seconds(*remaining));
            }
            Event::HealthChanged { health } => hud.update_health_display(*health),
            Event::GoalCollected { index, .. } => hud.update_goal_display(*index),
            Event::GameOver { default_option, .. } => hud.show_game_over_menu(*default_option),
            Event::MenuSelectionChanged { option } => hud.update_menu_selection(*option),
            Event::SceneRequested { scene } => hud.request_scene(*scene),
            Event::SoundRequested { sound } => hud.play_sound(*sound),
            _ => {}
        }
    }
}

/// Walls are always lit; only floor tiles change.
#[derive(Clone, Copy, Debug)]
struct TileSlot<H> {
    handle: H,
    kind: TileKind,
    lit: bool,
}

/// Arena of presenter handles indexed by cell coordinate.
///
/// Tile handles live only here; core data never references them.
#[derive(Debug)]
pub struct SceneSync<H> {
    width: u32,
    height: u32,
    tiles: Vec<TileSlot<H>>,
    crystals: Vec<(CellCoord, H)>,
    player: Option<H>,
    maze_visible: bool,
    player_visible: bool,
}

impl<H> Default for SceneSync<H> {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            tiles: Vec::new(),
            crystals: Vec::new(),
            player: None,
            maze_visible: false,
            player_visible: false,
        }
    }
}

impl<H> SceneSync<H>
where
    H: Copy + fmt::Debug,
{
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tile handles currently alive.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Handle of the crystal on `cell`, if one is still shown.
    #[must_use]
    pub fn crystal_at(&self, cell: CellCoord) -> Option<H> {
        self.crystals
            .iter()
            .find(|(crystal, _)| *crystal == cell)
            .map(|(_, handle)| *handle)
    }

    /// Handle of the player avatar, once it was placed.
    #[must_use]
    pub fn player(&self) -> Option<H> {
        self.player
    }

    /// Reports whether the maze is currently shown.
    #[must_use]
    pub fn maze_visible(&self) -> bool {
        self.maze_visible
    }

    /// Applies world events to the presenter.
    pub fn apply<P>(&mut self, events: &[Event], presenter: &mut P) -> AnyResult<()>
    where
        P: Presenter<Handle = H> + ?Sized,
    {
        for event in events {
            match event {
                Event::MazeGenerated { layout, goals } => {
                    self.rebuild(layout, goals.cells(), presenter)?;
                }
                Event::MazeVisibilityChanged { visible } => {
                    self.maze_visible = *visible;
                    self.refresh_maze(presenter)?;
                }
                Event::TileLit { cell } => self.set_lit(*cell, true, presenter)?,
                Event::TilesDarkened { cells } => {
                    for cell in cells {
                        self.set_lit(*cell, false, presenter)?;
                    }
                }
                Event::GoalCollected { cell, .. } => self.remove_crystal(*cell, presenter)?,
                Event::PlayerPlaced { cell } => self.place_player(*cell, presenter)?,
                Event::PlayerVisibilityChanged { visible } => {
                    self.player_visible = *visible;
                    if let Some(handle) = self.player {
                        presenter
                            .set_visible(handle, *visible)
                            .context("failed to toggle player visibility")?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Moves the player avatar to its interpolated position.
    pub fn sync_player<P>(&mut self, position: Vec2, presenter: &mut P) -> AnyResult<()>
    where
        P: Presenter<Handle = H> + ?Sized,
    {
        match self.player {
            Some(handle) => presenter
                .move_to(handle, position)
                .context("failed to move player"),
            None => Ok(()),
        }
    }

    fn rebuild<P>(
        &mut self,
        layout: &MazeLayout,
        crystals: &[CellCoord],
        presenter: &mut P,
    ) -> AnyResult<()>
    where
        P: Presenter<Handle = H> + ?Sized,
    {
        self.clear(presenter)?;

        let grid = layout.grid();
        self.width = grid.width();
        self.height = grid.height();
        for row in 0..grid.height() {
            for column in 0..grid.width() {
                let cell = CellCoord::new(column, row);
                let kind = match grid.get(cell) {
                    Some(CellState::Floor) => TileKind::Floor,
                    _ => TileKind::Wall,
                };
                let handle = presenter
                    .instantiate(kind, cell)
                    .with_context(|| format!("failed to instantiate {kind:?} at {cell:?}"))?;
                presenter.set_visible(handle, self.maze_visible)?;
                self.tiles.push(TileSlot {
                    handle,
                    kind,
                    lit: true,
                });
            }
        }

        for cell in crystals {
            let handle = presenter
                .instantiate(TileKind::Crystal, *cell)
                .with_context(|| format!("failed to instantiate crystal at {cell:?}"))?;
            presenter.set_visible(handle, self.maze_visible)?;
            self.crystals.push((*cell, handle));
        }
        Ok(())
    }

    fn clear<P>(&mut self, presenter: &mut P) -> AnyResult<()>
    where
        P: Presenter<Handle = H> + ?Sized,
    {
        for slot in self.tiles.drain(..) {
            presenter
                .destroy(slot.handle)
                .context("failed to destroy tile")?;
        }
        for (_, handle) in self.crystals.drain(..) {
            presenter
                .destroy(handle)
                .context("failed to destroy crystal")?;
        }
        Ok(())
    }

    fn refresh_maze<P>(&mut self, presenter: &mut P) -> AnyResult<()>
    where
        P: Presenter<Handle = H> + ?Sized,
    {
        for slot in &self.tiles {
            presenter.set_visible(slot.handle, self.maze_visible && slot.lit)?;
        }
        for (_, handle) in &self.crystals {
            presenter.set_visible(*handle, self.maze_visible)?;
        }
        Ok(())
    }

    fn set_lit<P>(&mut self, cell: CellCoord, lit: bool, presenter: &mut P) -> AnyResult<()>
    where
        P: Presenter<Handle = H> + ?Sized,
    {
        let Some(index) = self.index(cell) else {
            return Ok(());
        };
        let maze_visible = self.maze_visible;
        let Some(slot) = self.tiles.get_mut(index) else {
            return Ok(());
        };
        if slot.kind != TileKind::Floor {
            return Ok(());
        }
        slot.lit = lit;
        presenter
            .set_visible(slot.handle, maze_visible && lit)
            .with_context(|| format!("failed to update tile at {cell:?}"))
    }

    fn remove_crystal<P>(&mut self, cell: CellCoord, presenter: &mut P) -> AnyResult<()>
    where
        P: Presenter<Handle = H> + ?Sized,
    {
        if let Some(position) = self.crystals.iter().position(|(crystal, _)| *crystal == cell) {
            let (_, handle) = self.crystals.swap_remove(position);
            presenter
                .destroy(handle)
                .with_context(|| format!("failed to destroy crystal at {cell:?}"))?;
        }
        Ok(())
    }

    fn place_player<P>(&mut self, cell: CellCoord, presenter: &mut P) -> AnyResult<()>
    where
        P: Presenter<Handle = H> + ?Sized,
    {
        let handle = match self.player {
            Some(handle) => handle,
            None => {
                let handle = presenter
                    .instantiate(TileKind::Player, cell)
                    .context("failed to instantiate player")?;
                presenter.set_visible(handle, self.player_visible)?;
                self.player = Some(handle);
                handle
            }
        };
        presenter.move_to(
            handle,
            Vec2::new(cell.column() as f32, cell.row() as f32),
        )
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use crystal_maze_core::{GoalSet, Grid, SessionConfig, StageSettings};
    use std::{collections::HashMap, time::Duration};

    #[derive(Debug, Default)]
    struct RecordingPresenter {
        next: u32,
        alive: HashMap<u32, (TileKind, CellCoord)>,
        visible: HashMap<u32, bool>,
        positions: HashMap<u32, Vec2>,
        fail_on: Option<TileKind>,
    }

    impl RecordingPresenter {
        fn visible_count(&self, kind: TileKind) -> usize {
            self.alive
                .iter()
                .filter(|(handle, (alive_kind, _))| {
                    *alive_kind == kind && self.visible.get(handle).copied().unwrap_or(false)
                })
                .count()
        }
    }

    impl Presenter for RecordingPresenter {
        type Handle = u32;

        fn instantiate(&mut self, kind: TileKind, cell: CellCoord) -> AnyResult<u32> {
            if self.fail_on == Some(kind) {
                bail!("no prefab for {kind:?}");
            }
            self.next += 1;
            let _ = self.alive.insert(self.next, (kind, cell));
            Ok(self.next)
        }

        fn destroy(&mut self, handle: u32) -> AnyResult<()> {
            let _ = self.alive.remove(&handle);
            let _ = self.visible.remove(&handle);
            Ok(())
        }

        fn set_visible(&mut self, handle: u32, visible: bool) -> AnyResult<()> {
            let _ = self.visible.insert(handle, visible);
            Ok(())
        }

        fn move_to(&mut self, handle: u32, position: Vec2) -> AnyResult<()> {
            let _ = self.positions.insert(handle, position);
            Ok(())
        }
    }

    fn corridor() -> MazeLayout {
        let mut grid = Grid::filled(5, 3, CellState::Wall);
        for column in 1..4 {
            grid.set(CellCoord::new(column, 1), CellState::Floor);
        }
        MazeLayout::new(grid, CellCoord::new(1, 1))
    }

    fn generated() -> Event {
        Event::MazeGenerated {
            layout: corridor(),
            goals: GoalSet::new(vec![CellCoord::new(3, 1)]),
        }
    }

    #[test]
    fn maze_generation_creates_one_handle_per_cell() {
        let mut presenter = RecordingPresenter::default();
        let mut sync = SceneSync::new();
        sync.apply(&[generated()], &mut presenter)
            .expect("presenter accepts every tile");

        assert_eq!(sync.tile_count(), 15);
        assert!(sync.crystal_at(CellCoord::new(3, 1)).is_some());
        assert_eq!(presenter.alive.len(), 16);
        assert_eq!(presenter.visible_count(TileKind::Floor), 0);

        sync.apply(&[generated()], &mut presenter)
            .expect("regeneration succeeds");
        assert_eq!(presenter.alive.len(), 16);
    }

    #[test]
    fn dark_tiles_stay_hidden_when_the_maze_is_shown() {
        let mut presenter = RecordingPresenter::default();
        let mut sync = SceneSync::new();
        let events = [
            generated(),
            Event::TilesDarkened {
                cells: vec![CellCoord::new(2, 1)],
            },
            Event::MazeVisibilityChanged { visible: true },
        ];
        sync.apply(&events, &mut presenter).expect("sync succeeds");

        assert!(sync.maze_visible());
        assert_eq!(presenter.visible_count(TileKind::Floor), 2);
        assert_eq!(presenter.visible_count(TileKind::Wall), 12);

        sync.apply(
            &[Event::TileLit {
                cell: CellCoord::new(2, 1),
            }],
            &mut presenter,
        )
        .expect("sync succeeds");
        assert_eq!(presenter.visible_count(TileKind::Floor), 3);
    }

    #[test]
    fn collected_crystal_is_destroyed() {
        let mut presenter = RecordingPresenter::default();
        let mut sync = SceneSync::new();
        let cell = CellCoord::new(3, 1);
        sync.apply(
            &[generated(), Event::GoalCollected { cell, index: 0 }],
            &mut presenter,
        )
        .expect("sync succeeds");

        assert!(sync.crystal_at(cell).is_none());
        assert!(!presenter
            .alive
            .values()
            .any(|(kind, _)| *kind == TileKind::Crystal));
    }

    #[test]
    fn player_is_created_once_and_follows_glide() {
        let mut presenter = RecordingPresenter::default();
        let mut sync = SceneSync::new();
        sync.apply(
            &[
                Event::PlayerPlaced {
                    cell: CellCoord::new(1, 1),
                },
                Event::PlayerPlaced {
                    cell: CellCoord::new(1, 1),
                },
                Event::PlayerVisibilityChanged { visible: true },
            ],
            &mut presenter,
        )
        .expect("sync succeeds");

        let handle = sync.player().expect("player created");
        assert_eq!(presenter.alive.len(), 1);
        assert_eq!(presenter.visible.get(&handle), Some(&true));

        sync.sync_player(Vec2::new(1.5, 1.0), &mut presenter)
            .expect("move succeeds");
        assert_eq!(presenter.positions.get(&handle), Some(&Vec2::new(1.5, 1.0)));
    }

    #[test]
    fn presenter_failures_carry_context() {
        let mut presenter = RecordingPresenter {
            fail_on: Some(TileKind::Crystal),
            ..RecordingPresenter::default()
        };
        let mut sync = SceneSync::new();
        let error = sync
            .apply(&[generated()], &mut presenter)
            .expect_err("crystal prefab is missing");

        assert!(error.to_string().contains("crystal"));
    }

    #[derive(Debug, Default)]
    struct RecordingHud {
        calls: Vec<String>,
    }

    impl Hud for RecordingHud {
        fn play_sound(&mut self, sound: SoundKind) {
            self.calls.push(format!("sound {sound:?}"));
        }

        fn update_timer_display(&mut self, seconds: u64) {
            self.calls.push(format!("timer {seconds}"));
        }

        fn update_health_display(&mut self, health: u32) {
            self.calls.push(format!("health {health}"));
        }

        fn update_goal_display(&mut self, index: u32) {
            self.calls.push(format!("goal {index}"));
        }

        fn reset_goal_display(&mut self) {
            self.calls.push("goals reset".to_owned());
        }

        fn update_stage_display(&mut self, stage: StageNumber) {
            self.calls.push(format!("stage {}", stage.get()));
        }

        fn show_countdown(&mut self, value: u8) {
            self.calls.push(format!("countdown {value}"));
        }

        fn show_collect_prompt(&mut self) {
            self.calls.push("prompt".to_owned());
        }

        fn hide_countdown(&mut self) {
            self.calls.push("countdown hidden".to_owned());
        }

        fn show_game_over_menu(&mut self, default_option: MenuOption) {
            self.calls.push(format!("menu {}", default_option.index()));
        }

        fn update_menu_selection(&mut self, option: MenuOption) {
            self.calls.push(format!("selection {}", option.index()));
        }

        fn request_scene(&mut self, scene: SceneRequest) {
            self.calls.push(format!("scene {scene:?}"));
        }
    }

    #[test]
    fn hud_receives_notifications_in_event_order() {
        let settings = StageSettings::derive(&SessionConfig::default(), StageNumber::new(2));
        let events = [
            Event::StageStarted { settings },
            Event::CountdownStep { value: 3 },
            Event::TimeRemaining {
                remaining: Duration::from_millis(29_100),
            },
            Event::HealthChanged { health: 2 },
            Event::GoalCollected {
                cell: CellCoord::new(3, 1),
                index: 0,
            },
            Event::SoundRequested {
                sound: SoundKind::Get,
            },
            Event::TilesDarkened { cells: Vec::new() },
            Event::MenuSelectionChanged {
                option: MenuOption::ReturnToTitle,
            },
        ];
        let mut hud = RecordingHud::default();
        dispatch_hud(&events, &mut hud);

        assert_eq!(
            hud.calls,
            vec![
                "stage 2",
                "goals reset",
                "countdown 3",
                "timer 30",
                "health 2",
                "goal 0",
                "sound Get",
                "selection 1",
            ]
        );
    }
}
