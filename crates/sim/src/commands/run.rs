//! Run a scenario and report the outcome.

use anyhow::Result;
use clap::Parser;
use console::style;
use creature_content::Session;
use creature_core::{TurnAction, TurnReport};

use super::ScenarioArgs;

/// Run a scenario and print a per-creature summary
#[derive(Parser)]
pub struct Run {
    #[command(flatten)]
    scenario: ScenarioArgs,
}

impl Run {
    pub fn execute(self) -> Result<()> {
        let scenario = self.scenario.load()?;
        let mut session = scenario.start(self.scenario.seed)?;
        let start = self.scenario.turn_start();

        let mut tally = Tally::default();
        for round in 1..=self.scenario.turns {
            let reports = session.step(start);
            for report in &reports {
                tally.record(report);
                log_report(&session, report);
            }
            if session.sim.world().monsters().next().is_none() {
                tracing::info!(round, "no creatures left");
                break;
            }
        }

        print_summary(&session, &tally);
        Ok(())
    }
}

fn log_report(session: &Session, report: &TurnReport) {
    let name = session
        .sim
        .creature(report.creature)
        .map_or("<removed>", |monst| monst.name.as_str());
    if report.state_before != report.state_after {
        tracing::info!(
            creature = %report.creature,
            name,
            from = %report.state_before,
            to = %report.state_after,
            rule = ?report.transition,
            "state changed"
        );
    }
    tracing::debug!(creature = %report.creature, name, action = ?report.action, "turn");
}

/// Counts of what creatures did over the run.
#[derive(Default)]
struct Tally {
    turns: usize,
    moves: usize,
    attacks: usize,
    spells: usize,
}

impl Tally {
    fn record(&mut self, report: &TurnReport) {
        self.turns += 1;
        match report.action {
            TurnAction::Moved { .. }
            | TurnAction::Swapped { .. }
            | TurnAction::Swarmed { .. }
            | TurnAction::Blinked { .. } => self.moves += 1,
            TurnAction::Attacked { .. } => self.attacks += 1,
            TurnAction::Cast { .. } | TurnAction::Summoned { .. } => self.spells += 1,
            TurnAction::Idle | TurnAction::Skipped | TurnAction::Absorbing => {}
        }
    }
}

fn print_summary(session: &Session, tally: &Tally) {
    println!(
        "{} {} rounds, {} creature turns ({} moves, {} attacks, {} spells)",
        style("Run:").bold().cyan(),
        session.sim.turn_number(),
        tally.turns,
        tally.moves,
        tally.attacks,
        tally.spells
    );
    println!("{} {}", style("Digest:").bold().cyan(), session.sim.state_digest());
    println!();
    println!(
        "{:<6} {:<18} {:<10} {:<14} {}",
        style("id").bold(),
        style("name").bold(),
        style("at").bold(),
        style("state").bold(),
        style("health").bold()
    );
    for monst in session.sim.world().player_then_others() {
        let health = format!("{}/{}", monst.health.current, monst.health.max);
        let state = if monst.is_player {
            style("player".to_string()).green()
        } else {
            style(monst.state.to_string()).yellow()
        };
        println!(
            "{:<6} {:<18} {:<10} {:<14} {}",
            monst.id.to_string(),
            monst.name,
            monst.position.to_string(),
            state,
            health
        );
    }
}
