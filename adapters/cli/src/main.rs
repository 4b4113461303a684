#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Crystal Maze session.

mod autopilot;
mod text;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use crystal_maze_core::{Command, Event, SceneRequest, SessionConfig};
use crystal_maze_rendering::{dispatch_hud, SceneSync};
use crystal_maze_system_bootstrap::Bootstrap;
use crystal_maze_system_visibility_decay::VisibilityDecay;
use crystal_maze_world::{self as world, query, World};
use serde::Deserialize;
use tracing_subscriber::filter::EnvFilter;

use crate::{
    autopilot::Autopilot,
    text::{render_ascii, TextHud, TextPresenter},
};

const DEFAULT_FRAMES: u32 = 20_000;
const DEFAULT_FRAME_MS: u64 = 16;
const DEFAULT_RETRIES: u32 = 1;

#[derive(Parser, Debug)]
#[command(name = "crystal-maze")]
#[command(about = "Run a headless Crystal Maze session driven by an autopilot")]
struct Args {
    /// TOML file with `[session]` and `[run]` tables
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the session RNG
    #[arg(long)]
    seed: Option<u64>,
    /// Maze width in cells (odd, at least 5)
    #[arg(long)]
    width: Option<u32>,
    /// Maze height in cells (odd, at least 5)
    #[arg(long)]
    height: Option<u32>,
    /// Number of stages to clear
    #[arg(long)]
    max_stages: Option<u32>,
    /// Upper bound on simulated frames
    #[arg(long)]
    frames: Option<u32>,
    /// Simulated milliseconds per frame
    #[arg(long)]
    frame_ms: Option<u64>,
    /// Deliberate wrong moves the autopilot makes before following routes
    #[arg(long)]
    blunders: Option<u32>,
    /// Print the maze whenever a stage starts and when the run ends
    #[arg(long)]
    print_maze: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    session: SessionConfig,
    run: RunSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RunSettings {
    frames: u32,
    frame_ms: u64,
    blunders: u32,
    retries: u32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            frames: DEFAULT_FRAMES,
            frame_ms: DEFAULT_FRAME_MS,
            blunders: 0,
            retries: DEFAULT_RETRIES,
        }
    }
}

impl ConfigFile {
    fn load(path: Option<&PathBuf>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    fn apply_overrides(mut self, args: &Args) -> Self {
        if let Some(seed) = args.seed {
            self.session.seed = seed;
        }
        if let Some(width) = args.width {
            self.session.width = width;
        }
        if let Some(height) = args.height {
            self.session.height = height;
        }
        if let Some(max_stages) = args.max_stages {
            self.session.max_stages = max_stages;
        }
        if let Some(frames) = args.frames {
            self.run.frames = frames;
        }
        if let Some(frame_ms) = args.frame_ms {
            self.run.frame_ms = frame_ms;
        }
        if let Some(blunders) = args.blunders {
            self.run.blunders = blunders;
        }
        self
    }
}

/// Everything that lives outside the world for one run.
struct Session {
    world: World,
    decay: VisibilityDecay,
    autopilot: Autopilot,
    scene: SceneSync<usize>,
    presenter: TextPresenter,
    hud: TextHud,
    print_maze: bool,
}

impl Session {
    /// Applies one frame: input first, then the tick, then decay.
    fn frame(&mut self, dt: Duration) -> Result<Option<SceneRequest>> {
        let mut events = Vec::new();
        if let Some(edge) = self.autopilot.next_input(&self.world) {
            world::apply(&mut self.world, Command::Input { edge }, &mut events);
        }
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        let lit = query::lit_tiles(&self.world);
        self.decay.handle(&events, &lit, &mut commands);
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        self.present(&events)
    }

    fn start(&mut self) -> Result<()> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::StartGame, &mut events);
        let _ = self.present(&events)?;
        Ok(())
    }

    fn present(&mut self, events: &[Event]) -> Result<Option<SceneRequest>> {
        self.scene
            .apply(events, &mut self.presenter)
            .context("failed to update the scene")?;
        self.scene
            .sync_player(query::player_position(&self.world), &mut self.presenter)?;
        dispatch_hud(events, &mut self.hud);

        if self.print_maze
            && events
                .iter()
                .any(|event| matches!(event, Event::PlayStarted { .. }))
        {
            print!("{}", render_ascii(&self.world));
        }
        Ok(self.hud.take_scene_request())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let file = ConfigFile::load(args.config.as_ref())?.apply_overrides(&args);
    let world = World::new(file.session).context("invalid session configuration")?;

    let bootstrap = Bootstrap::default();
    println!("{}", bootstrap.welcome_banner(&world));

    let mut session = Session {
        world,
        decay: VisibilityDecay::new(),
        autopilot: Autopilot::new(file.run.blunders, file.run.retries),
        scene: SceneSync::new(),
        presenter: TextPresenter::default(),
        hud: TextHud::default(),
        print_maze: args.print_maze,
    };
    session.start()?;

    let dt = Duration::from_millis(file.run.frame_ms);
    let mut frames_run = 0;
    let mut outcome = None;
    for _ in 0..file.run.frames {
        frames_run += 1;
        match session.frame(dt)? {
            Some(SceneRequest::ReloadMain) => {
                tracing::info!("reloading main scene");
            }
            Some(scene) => {
                outcome = Some(scene);
                break;
            }
            None => {}
        }
    }

    if session.print_maze {
        print!("{}", render_ascii(&session.world));
    }

    tracing::debug!(
        drawables = session.presenter.alive_count(),
        visible = session.presenter.visible_count(),
        player = ?session.presenter.player_position(),
        "presenter state"
    );
    println!(
        "frames: {frames_run}, stage: {}, phase: {:?}, health: {}, time left: {:.1}s, scene: {}",
        query::stage_number(&session.world).get(),
        query::phase(&session.world),
        query::health(&session.world),
        query::time_remaining(&session.world).as_secs_f32(),
        match outcome {
            Some(SceneRequest::Result) => "result",
            Some(SceneRequest::Title) => "title",
            Some(SceneRequest::ReloadMain) | None => "none",
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crystal_maze_core::GamePhase;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["crystal-maze"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn command_line_overrides_config_file_values() {
        let file: ConfigFile = toml::from_str(
            r#"
            [session]
            width = 15
            seed = 9

            [run]
            blunders = 2
            "#,
        )
        .expect("valid toml");
        let file = file.apply_overrides(&args(&["--width", "11", "--frames", "50"]));

        assert_eq!(file.session.width, 11);
        assert_eq!(file.session.height, 21);
        assert_eq!(file.session.seed, 9);
        assert_eq!(file.run.blunders, 2);
        assert_eq!(file.run.frames, 50);
        assert_eq!(file.run.frame_ms, DEFAULT_FRAME_MS);
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let parsed: Result<ConfigFile, _> = toml::from_str("[run]\nspeed = 3\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn autopilot_session_clears_every_stage() {
        let config = SessionConfig {
            width: 9,
            height: 9,
            max_stages: 2,
            initial_time_limit_secs: 600.0,
            ..SessionConfig::default()
        };
        let mut session = Session {
            world: World::new(config).expect("valid config"),
            decay: VisibilityDecay::new(),
            autopilot: Autopilot::new(0, 0),
            scene: SceneSync::new(),
            presenter: TextPresenter::default(),
            hud: TextHud::default(),
            print_maze: false,
        };
        session.start().expect("session starts");

        let mut outcome = None;
        for _ in 0..20_000 {
            if let Some(scene) = session.frame(Duration::from_millis(16)).expect("frame") {
                outcome = Some(scene);
                break;
            }
        }

        assert_eq!(outcome, Some(SceneRequest::Result));
        assert_eq!(query::phase(&session.world), GamePhase::GameClear);
    }

    #[test]
    fn blundering_autopilot_retries_then_leaves() {
        let config = SessionConfig {
            width: 9,
            height: 9,
            ..SessionConfig::default()
        };
        let mut session = Session {
            world: World::new(config).expect("valid config"),
            decay: VisibilityDecay::new(),
            autopilot: Autopilot::new(6, 1),
            scene: SceneSync::new(),
            presenter: TextPresenter::default(),
            hud: TextHud::default(),
            print_maze: false,
        };
        session.start().expect("session starts");

        let mut scenes = Vec::new();
        for _ in 0..2_000 {
            if let Some(scene) = session.frame(Duration::from_millis(16)).expect("frame") {
                scenes.push(scene);
                if scene == SceneRequest::Title {
                    break;
                }
            }
        }

        assert_eq!(scenes, vec![SceneRequest::ReloadMain, SceneRequest::Title]);
        assert_eq!(query::phase(&session.world), GamePhase::Exited);
    }
}
