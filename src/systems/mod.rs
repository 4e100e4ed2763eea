/*!
Game-system collaborators.

A game system supplies die rolls (with its own explosion rules) and the
schemas it knows about. Systems are looked up by name in a static registry;
randomness comes from a [`RandomSource`] so rolls can be pinned in tests.

Registered systems:
  generic     - exploding dice reroll on the maximum face
  rolemaster  - generic rules plus open-ended percentile (d%!)
*/

pub mod dice;

use rand::Rng;

pub use dice::{GenericSystem, RolemasterSystem};

pub const DEFAULT_SYSTEM: &str = "generic";

/// Inclusive integer source.
pub trait RandomSource {
    fn between(&mut self, low: u32, high: u32) -> u32;
}

/// Thread-local RNG from `rand`.
#[derive(Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn between(&mut self, low: u32, high: u32) -> u32 {
        rand::thread_rng().gen_range(low..=high)
    }
}

pub trait GameSystem {
    fn name(&self) -> &'static str;

    /// Roll one die with `sides` faces, applying the system's explosion rule.
    fn roll_die(&mut self, sides: u32, explode: bool) -> i64;

    fn list_schemas(&self) -> Vec<String> {
        Vec::new()
    }

    fn get_schema(&self, _name: &str) -> Option<serde_json::Value> {
        None
    }
}

type Factory = fn(Box<dyn RandomSource>) -> Box<dyn GameSystem>;

fn generic(rng: Box<dyn RandomSource>) -> Box<dyn GameSystem> {
    Box::new(GenericSystem::new(rng))
}

fn rolemaster(rng: Box<dyn RandomSource>) -> Box<dyn GameSystem> {
    Box::new(RolemasterSystem::new(rng))
}

const REGISTRY: &[(&str, Factory)] = &[("generic", generic), ("rolemaster", rolemaster)];

/// Registered system names, sorted.
pub fn system_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = REGISTRY.iter().map(|(name, _)| *name).collect();
    names.sort_unstable();
    names
}

pub fn create_system(name: &str) -> Option<Box<dyn GameSystem>> {
    create_system_with(name, Box::new(ThreadRandom))
}

pub fn create_system_with(name: &str, rng: Box<dyn RandomSource>) -> Option<Box<dyn GameSystem>> {
    REGISTRY
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, factory)| factory(rng))
}
