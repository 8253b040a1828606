//! Demo player - plays a level on its own
//!
//! Lives outside the simulation: it reads the simulation and submits
//! ordinary commands, which are recorded like a human's. A demo run can
//! therefore be replayed without the RNG.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{ActionKind, Command, Simulation, Skill, skills};

/// Ticks between decisions
const MIN_THINK_TICKS: u32 = 8;
const MAX_THINK_TICKS: u32 = 40;

#[derive(Debug, Clone)]
pub struct DemoPlayer {
    rng: Pcg32,
    cooldown: u32,
}

impl DemoPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            cooldown: MIN_THINK_TICKS,
        }
    }

    /// Decide what to do before the next tick
    pub fn think(&mut self, sim: &Simulation) -> Option<Command> {
        if sim.is_ended() || sim.is_paused() {
            return None;
        }
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return None;
        }
        self.cooldown = self.rng.random_range(MIN_THINK_TICKS..=MAX_THINK_TICKS);

        // Speed things up while the entrance is still busy
        if sim.remaining_to_release() > 0 && self.rng.random_bool(0.15) {
            return Some(Command::ChangeReleaseRate(10));
        }

        // Keep the first walker as a blocker so the rest have somewhere safe to turn
        let has_blocker = sim
            .lemmings()
            .iter()
            .any(|lem| lem.kind() == ActionKind::Blocking);

        let candidates: Vec<(usize, Skill)> = sim
            .lemmings()
            .iter()
            .enumerate()
            .flat_map(|(i, lem)| Skill::ALL.iter().map(move |&skill| (i, lem, skill)))
            .filter(|(_, lem, skill)| {
                sim.skills().get(*skill) > 0
                    && *skill != Skill::Bomber
                    && (has_blocker || *skill == Skill::Blocker || sim.lemmings().len() < 3)
                    && skills::check(*skill, lem, sim.terrain(), sim.tuning()).is_ok()
            })
            .map(|(i, _, skill)| (i, skill))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let (index, skill) = candidates[self.rng.random_range(0..candidates.len())];
        let lemming = sim.lemmings()[index].id;
        log::debug!("Demo: {skill:?} -> lemming {}", lemming.0);
        Some(Command::AssignSkill { lemming, skill })
    }
}
