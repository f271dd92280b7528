//! AI tuning loader.

use std::path::Path;

use anyhow::Context;
use creature_core::AiTuning;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`AiTuning`] from TOML files.
///
/// Every key is optional; missing keys keep their default value.
pub struct TuningLoader;

impl TuningLoader {
    /// Load tuning from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing AiTuning
    ///
    /// # Returns
    ///
    /// Returns an AiTuning with every unspecified field at its default.
    pub fn load(path: &Path) -> LoadResult<AiTuning> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<AiTuning> {
        let tuning: AiTuning = toml::from_str(content).context("Failed to parse tuning TOML")?;
        validate(&tuning)?;
        Ok(tuning)
    }
}

fn validate(tuning: &AiTuning) -> LoadResult<()> {
    let percents = [
        ("retain_awareness_percent", tuning.retain_awareness_percent),
        ("notice_percent", tuning.notice_percent),
        ("ability_use_percent", tuning.ability_use_percent),
        ("invisible_notice_percent", tuning.invisible_notice_percent),
        ("flit_percent", tuning.flit_percent),
        ("flee_near_death_percent", tuning.flee_near_death_percent),
        ("recover_courage_percent", tuning.recover_courage_percent),
        ("ally_flee_health_percent", tuning.ally_flee_health_percent),
        ("mill_percent", tuning.mill_percent),
        ("worshiper_mill_percent", tuning.worshiper_mill_percent),
        ("captor_mill_percent", tuning.captor_mill_percent),
    ];
    for (key, value) in percents {
        anyhow::ensure!((0..=100).contains(&value), "{key} must be a percentage, got {value}");
    }
    anyhow::ensure!(
        tuning.flee_near_death_percent <= tuning.recover_courage_percent,
        "flee_near_death_percent ({}) exceeds recover_courage_percent ({})",
        tuning.flee_near_death_percent,
        tuning.recover_courage_percent
    );
    anyhow::ensure!(
        tuning.corpse_abandon_threshold < tuning.corpse_absorption_turns,
        "corpse_abandon_threshold must be below corpse_absorption_turns"
    );
    anyhow::ensure!(tuning.entry_summon_one_in >= 0, "entry_summon_one_in must not be negative");
    Ok(())
}
