//! Terminal presentation: a bookkeeping presenter, a logging HUD and an ASCII dump.

use std::collections::{HashMap, HashSet};

use anyhow::{bail, Result as AnyResult};
use crystal_maze_core::{CellCoord, CellState, MenuOption, SceneRequest, SoundKind, StageNumber};
use crystal_maze_rendering::{Hud, Presenter, TileKind};
use crystal_maze_system_bootstrap::Bootstrap;
use crystal_maze_world::{query, World};
use glam::Vec2;

/// Presenter that only tracks which drawables exist and which are shown.
#[derive(Debug, Default)]
pub(crate) struct TextPresenter {
    next: usize,
    alive: HashMap<usize, TileKind>,
    visible: HashSet<usize>,
    player_position: Option<Vec2>,
}

impl TextPresenter {
    pub(crate) fn alive_count(&self) -> usize {
        self.alive.len()
    }

    pub(crate) fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub(crate) fn player_position(&self) -> Option<Vec2> {
        self.player_position
    }
}

impl Presenter for TextPresenter {
    type Handle = usize;

    fn instantiate(&mut self, kind: TileKind, _cell: CellCoord) -> AnyResult<usize> {
        self.next += 1;
        let _ = self.alive.insert(self.next, kind);
        Ok(self.next)
    }

    fn destroy(&mut self, handle: usize) -> AnyResult<()> {
        if self.alive.remove(&handle).is_none() {
            bail!("drawable {handle} was already destroyed");
        }
        let _ = self.visible.remove(&handle);
        Ok(())
    }

    fn set_visible(&mut self, handle: usize, visible: bool) -> AnyResult<()> {
        if !self.alive.contains_key(&handle) {
            bail!("drawable {handle} does not exist");
        }
        if visible {
            let _ = self.visible.insert(handle);
        } else {
            let _ = self.visible.remove(&handle);
        }
        Ok(())
    }

    fn move_to(&mut self, handle: usize, position: Vec2) -> AnyResult<()> {
        match self.alive.get(&handle) {
            Some(TileKind::Player) => {
                self.player_position = Some(position);
                Ok(())
            }
            Some(kind) => bail!("{kind:?} drawables are static"),
            None => bail!("drawable {handle} does not exist"),
        }
    }
}

/// HUD that reports through `tracing` and remembers scene requests.
#[derive(Debug, Default)]
pub(crate) struct TextHud {
    bootstrap: Bootstrap,
    last_timer: Option<u64>,
    collected: u32,
    scene_request: Option<SceneRequest>,
}

impl TextHud {
    pub(crate) fn take_scene_request(&mut self) -> Option<SceneRequest> {
        self.scene_request.take()
    }
}

impl Hud for TextHud {
    fn play_sound(&mut self, sound: SoundKind) {
        tracing::trace!(?sound, "sound");
    }

    fn update_timer_display(&mut self, seconds: u64) {
        if self.last_timer != Some(seconds) {
            self.last_timer = Some(seconds);
            tracing::debug!(seconds, "timer");
        }
    }

    fn update_health_display(&mut self, health: u32) {
        tracing::info!(health, "health");
    }

    fn update_goal_display(&mut self, index: u32) {
        self.collected = index + 1;
        tracing::info!(collected = self.collected, "crystal");
    }

    fn reset_goal_display(&mut self) {
        self.collected = 0;
    }

    fn update_stage_display(&mut self, stage: StageNumber) {
        let label = self.bootstrap.stage_label(stage).unwrap_or("?");
        println!("== stage {label} ({}) ==", stage.get());
    }

    fn show_countdown(&mut self, value: u8) {
        tracing::debug!(value, "countdown");
    }

    fn show_collect_prompt(&mut self) {
        println!("{}", self.bootstrap.collect_prompt());
    }

    fn hide_countdown(&mut self) {
        self.last_timer = None;
    }

    fn show_game_over_menu(&mut self, default_option: MenuOption) {
        println!("GAME OVER");
        tracing::debug!(?default_option, "menu opened");
    }

    fn update_menu_selection(&mut self, option: MenuOption) {
        tracing::debug!(?option, "menu selection");
    }

    fn request_scene(&mut self, scene: SceneRequest) {
        self.scene_request = Some(scene);
    }
}

/// Draws the current maze: `#` wall, `.` lit floor, blank dark floor,
/// `*` crystal, `@` player.
pub(crate) fn render_ascii(world: &World) -> String {
    let Some(layout) = query::layout(world) else {
        return String::new();
    };
    let grid = layout.grid();
    let player = query::player_cell(world);
    let goals = query::goals(world);

    let mut out = String::new();
    for row in 0..grid.height() {
        for column in 0..grid.width() {
            let cell = CellCoord::new(column, row);
            let glyph = if cell == player {
                '@'
            } else if goals.contains(&cell) {
                '*'
            } else {
                match grid.get(cell) {
                    Some(CellState::Floor) if query::is_lit(world, cell) => '.',
                    Some(CellState::Floor) => ' ',
                    _ => '#',
                }
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}
