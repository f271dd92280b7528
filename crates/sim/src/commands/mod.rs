//! Command implementations for creature-sim
//!
//! Both commands share [`ScenarioArgs`] for locating content and seeding the run.

mod run;
mod scenario;
mod verify;

pub use run::Run;
pub use verify::Verify;

pub(crate) use scenario::ScenarioArgs;
