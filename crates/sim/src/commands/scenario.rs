use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use creature_content::{CreatureCatalogLoader, MapLoader, Scenario, TuningLoader};
use creature_core::{AiTuning, TurnStart};

/// Where the content lives and how to seed the run.
#[derive(Args, Clone, Debug)]
pub(crate) struct ScenarioArgs {
    /// Level file (RON rows and spawn table)
    #[arg(long, value_name = "FILE")]
    pub map: PathBuf,

    /// Creature catalog (RON)
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// AI tuning (TOML); built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub tuning: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Rounds to simulate
    #[arg(long, default_value_t = 100)]
    pub turns: usize,

    /// How far away the player can be noticed
    #[arg(long, default_value_t = TurnStart::DEFAULT_STEALTH_RANGE)]
    pub stealth_range: i32,

    /// Treat every turn as one the player spent resting
    #[arg(long)]
    pub resting: bool,
}

impl ScenarioArgs {
    pub fn load(&self) -> Result<Scenario> {
        let tuning = match &self.tuning {
            Some(path) => TuningLoader::load(path)?,
            None => AiTuning::default(),
        };
        let catalog = CreatureCatalogLoader::load(&self.catalog)?;
        let level = MapLoader::load(&self.map)?;
        tracing::info!(
            map = %self.map.display(),
            templates = catalog.len(),
            seed = self.seed,
            "scenario loaded"
        );
        Ok(Scenario::new(level, catalog, tuning))
    }

    pub fn turn_start(&self) -> TurnStart {
        TurnStart {
            stealth_range: self.stealth_range,
            player_rested: self.resting,
        }
    }
}
