#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Crystal Maze experience.

use crystal_maze_core::StageNumber;
use crystal_maze_world::{query, World};

const STAGE_NUMERALS: [&str; 6] = ["零", "壱", "弍", "参", "肆", "伍"];
const COLLECT_PROMPT: &str = "結晶を集めよ";

/// Produces data required to greet the player.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Label shown for `stage`, or `None` beyond the numeral table.
    #[must_use]
    pub fn stage_label(&self, stage: StageNumber) -> Option<&'static str> {
        usize::try_from(stage.get())
            .ok()
            .and_then(|index| STAGE_NUMERALS.get(index).copied())
    }

    /// Text shown once the countdown finishes.
    #[must_use]
    pub const fn collect_prompt(&self) -> &'static str {
        COLLECT_PROMPT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crystal_maze_core::SessionConfig;

    #[test]
    fn labels_cover_the_default_stage_count() {
        let bootstrap = Bootstrap;
        assert_eq!(bootstrap.stage_label(StageNumber::FIRST), Some("壱"));
        assert_eq!(bootstrap.stage_label(StageNumber::new(5)), Some("伍"));
        assert_eq!(bootstrap.stage_label(StageNumber::new(6)), None);
    }

    #[test]
    fn banner_comes_from_the_world() {
        let world = World::new(SessionConfig::default()).expect("valid config");
        let bootstrap = Bootstrap;
        assert_eq!(bootstrap.welcome_banner(&world), "Welcome to Crystal Maze.");
    }
}
