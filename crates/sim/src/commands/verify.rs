//! Replay a scenario twice and compare digests turn by turn.

use anyhow::Result;
use clap::Parser;
use console::style;
use creature_core::StateDigest;

use super::ScenarioArgs;

/// Check that a seeded run is reproducible
#[derive(Parser)]
pub struct Verify {
    #[command(flatten)]
    scenario: ScenarioArgs,
}

impl Verify {
    pub fn execute(self) -> Result<()> {
        let scenario = self.scenario.load()?;
        let start = self.scenario.turn_start();
        let replay = || -> Result<Vec<StateDigest>> {
            let mut session = scenario.start(self.scenario.seed)?;
            Ok(session.run(self.scenario.turns, start))
        };

        let first = replay()?;
        let second = replay()?;

        if let Some((round, (a, b))) = first
            .iter()
            .zip(&second)
            .enumerate()
            .find(|(_, (a, b))| a != b)
        {
            anyhow::bail!("runs diverged after round {}: {a} vs {b}", round + 1);
        }
        anyhow::ensure!(
            first.len() == second.len(),
            "runs lasted {} and {} rounds",
            first.len(),
            second.len()
        );

        let last = first.last().map_or_else(|| "-".to_string(), ToString::to_string);
        tracing::info!(rounds = first.len(), digest = %last, "runs match");
        println!(
            "{} {} rounds, final digest {}",
            style("Deterministic:").bold().green(),
            first.len(),
            last
        );
        Ok(())
    }
}
