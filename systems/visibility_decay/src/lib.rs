#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Background decay that periodically darkens lit maze tiles.
//!
//! The system owns at most one task at a time. A task is created by
//! [`Event::PlayStarted`], fires once per elapsed interval of simulated time and
//! stops for good once its cancellation token is signalled. Every emitted
//! [`Command::DarkenTiles`] carries the task's token so the world can reject
//! requests from a task that was already replaced.

use std::time::Duration;

use crystal_maze_core::{CancellationToken, CellCoord, Command, DecaySchedule, Event, StageNumber};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Event-driven system that emits tile darkening commands for the running stage.
#[derive(Debug, Default)]
pub struct VisibilityDecay {
    task: Option<DecayTask>,
}

impl VisibilityDecay {
    /// Creates an idle decay system.
    #[must_use]
    pub const fn new() -> Self {
        Self { task: None }
    }

    /// Reports whether a decay task is currently scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .map_or(false, |task| !task.token.is_cancelled())
    }

    /// Consumes world events and the current lit tiles to emit darkening commands.
    ///
    /// `lit_tiles` should mirror the world's `query::lit_tiles`. Tiles chosen by
    /// one firing are not offered again to later firings within the same call.
    pub fn handle(&mut self, events: &[Event], lit_tiles: &[CellCoord], out: &mut Vec<Command>) {
        let mut candidates: Option<Vec<CellCoord>> = None;

        for event in events {
            match event {
                Event::PlayStarted { schedule } => {
                    if let Some(previous) = self.task.take() {
                        previous.token.cancel();
                    }
                    tracing::debug!(
                        stage = schedule.stage.get(),
                        interval_ms = whole_millis(schedule.interval),
                        tiles = schedule.tiles_per_tick,
                        "decay task scheduled"
                    );
                    self.task = Some(DecayTask::new(schedule));
                }
                Event::DecayCancelled { .. } => self.drop_cancelled(),
                Event::TimeAdvanced { dt } => {
                    self.drop_cancelled();
                    let Some(task) = self.task.as_mut() else {
                        continue;
                    };
                    let firings = task.accumulate(*dt);
                    for _ in 0..firings {
                        let pool = candidates.get_or_insert_with(|| lit_tiles.to_vec());
                        let cells = task.sample(pool);
                        if cells.is_empty() {
                            continue;
                        }
                        tracing::trace!(
                            stage = task.stage.get(),
                            count = cells.len(),
                            "decay fired"
                        );
                        out.push(Command::DarkenTiles {
                            cells,
                            token: task.token.clone(),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    fn drop_cancelled(&mut self) {
        if self
            .task
            .as_ref()
            .map_or(false, |task| task.token.is_cancelled())
        {
            if let Some(task) = self.task.take() {
                tracing::debug!(stage = task.stage.get(), "decay task stopped");
            }
        }
    }
}

#[derive(Debug)]
struct DecayTask {
    stage: StageNumber,
    interval: Duration,
    tiles_per_tick: usize,
    accumulator: Duration,
    rng: ChaCha8Rng,
    token: CancellationToken,
}

impl DecayTask {
    fn new(schedule: &DecaySchedule) -> Self {
        Self {
            stage: schedule.stage,
            interval: schedule.interval,
            tiles_per_tick: usize::try_from(schedule.tiles_per_tick).unwrap_or(usize::MAX),
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(schedule.seed),
            token: schedule.token.clone(),
        }
    }

    /// Adds `dt` and returns the number of whole intervals that elapsed.
    fn accumulate(&mut self, dt: Duration) -> usize {
        if self.interval.is_zero() {
            return 0;
        }
        self.accumulator = self.accumulator.saturating_add(dt);
        let mut firings = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            firings += 1;
        }
        firings
    }

    /// Draws up to `tiles_per_tick` distinct cells out of `pool`.
    fn sample(&mut self, pool: &mut Vec<CellCoord>) -> Vec<CellCoord> {
        let count = self.tiles_per_tick.min(pool.len());
        let mut chosen = Vec::with_capacity(count);
        for _ in 0..count {
            let index = self.rng.gen_range(0..pool.len());
            chosen.push(pool.swap_remove(index));
        }
        chosen
    }
}

/// Millisecond count for log fields, saturating at `u64::MAX`.
fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
