//! Fixed timestep simulation step
//!
//! Advances the level by exactly one tick, in a fixed phase order:
//! commands, nuke, release, lemmings, removal, end conditions, timer.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::behavior::{self, Ctx};
use super::event::{EndReason, GameEvent, Outcome};
use super::lemming::{Action, ActionKind, Lemming, LemmingId};
use super::skills::{self, Rejection, Skill};
use super::state::{Command, Phase, Simulation};
use super::stencil::Mask;
use crate::level::{LevelObject, ObjectKind, Terrain};
use crate::persistence::{EventKind, ReplayEvent, Target};
use crate::release_interval;
use crate::tuning::Tuning;

/// What one call to `step` did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Frame number of the tick this report covers
    pub frame: u64,
    /// World advanced (false while paused or after the level ended)
    pub advanced: bool,
    pub events: Vec<GameEvent>,
}

/// Advance the simulation by one fixed tick
pub fn step(sim: &mut Simulation) -> StepReport {
    let mut report = StepReport {
        frame: sim.frame,
        advanced: false,
        events: Vec::new(),
    };
    if sim.is_ended() {
        return report;
    }
    let events = &mut report.events;

    if sim.paused {
        drain_commands(sim, events);
        if sim.paused {
            return report;
        }
    }

    drain_replay(sim, events);
    drain_commands(sim, events);

    // A pause pressed this frame takes effect before the world moves
    if sim.paused {
        return report;
    }

    if sim.nuking {
        light_next_fuse(sim);
    }
    release(sim, events);
    update_lemmings(sim, events);
    for object in &mut sim.level.objects {
        object.tick();
    }
    remove_finished(sim);
    debug_assert!(sim.counters.is_consistent());

    check_end(sim, events);
    sim.frame += 1;
    report.advanced = true;
    report
}

/// Apply replay events due at the current frame
fn drain_replay(sim: &mut Simulation, events: &mut Vec<GameEvent>) {
    let Some(cursor) = sim.playback.as_mut() else {
        return;
    };
    let due: Vec<ReplayEvent> = cursor.take_due(sim.frame).to_vec();
    for event in due {
        let result = match (event.target, event.kind) {
            (Target::Lemming(id), EventKind::AssignSkill(skill)) => {
                apply_skill(sim, LemmingId(id), skill, events)
            }
            (Target::Global, EventKind::ChangeReleaseRate(delta)) => {
                apply_release_rate(sim, delta, events);
                Ok(())
            }
            (Target::Global, EventKind::Nuke) => {
                apply_nuke(sim, events);
                Ok(())
            }
            _ => Err(Rejection::NoTarget),
        };
        if let Err(reason) = result {
            log::warn!(
                "Replay desync at frame {}: {:?} on {:?} rejected ({:?})",
                sim.frame,
                event.kind,
                event.target,
                reason
            );
            events.push(GameEvent::ReplayDesync {
                frame: sim.frame,
                reason,
            });
        }
    }
}

/// Apply queued live commands
fn drain_commands(sim: &mut Simulation, events: &mut Vec<GameEvent>) {
    while let Some(command) = sim.pending.pop_front() {
        if command.is_game_action() && sim.is_replaying() {
            match command {
                Command::AssignSkill { lemming, skill } => events.push(GameEvent::SkillRejected {
                    id: Some(lemming),
                    skill,
                    reason: Rejection::ReplayActive,
                }),
                Command::AssignSkillAt { skill, .. } => events.push(GameEvent::SkillRejected {
                    id: None,
                    skill,
                    reason: Rejection::ReplayActive,
                }),
                _ => log::debug!("Ignoring {command:?} during replay"),
            }
            continue;
        }

        match command {
            Command::AssignSkill { lemming, skill } => {
                // Rejections are reported through the event list
                let _ = apply_skill(sim, lemming, skill, events);
            }
            Command::AssignSkillAt { point, skill } => match sim.lemming_at(point, skill) {
                Some(id) => {
                    let _ = apply_skill(sim, id, skill, events);
                }
                None => events.push(GameEvent::SkillRejected {
                    id: None,
                    skill,
                    reason: Rejection::NoTarget,
                }),
            },
            Command::ChangeReleaseRate(delta) => apply_release_rate(sim, delta, events),
            Command::Nuke => apply_nuke(sim, events),
            Command::TogglePause => {
                sim.paused = !sim.paused;
                events.push(GameEvent::Paused {
                    paused: sim.paused,
                });
            }
            Command::ToggleFastForward => {
                sim.fast_forward = !sim.fast_forward;
                events.push(GameEvent::FastForward {
                    enabled: sim.fast_forward,
                });
            }
        }
    }
}

fn apply_skill(
    sim: &mut Simulation,
    id: LemmingId,
    skill: Skill,
    events: &mut Vec<GameEvent>,
) -> Result<(), Rejection> {
    match sim.assign(id, skill) {
        Ok(()) => {
            sim.recorder
                .record(sim.frame, Target::Lemming(id.0), EventKind::AssignSkill(skill));
            events.push(GameEvent::SkillAssigned { id, skill });
            Ok(())
        }
        Err(reason) => {
            events.push(GameEvent::SkillRejected {
                id: Some(id),
                skill,
                reason,
            });
            Err(reason)
        }
    }
}

fn apply_release_rate(sim: &mut Simulation, delta: i32, events: &mut Vec<GameEvent>) {
    if let Some(rate) = sim.change_release_rate(delta) {
        sim.recorder
            .record(sim.frame, Target::Global, EventKind::ChangeReleaseRate(delta));
        events.push(GameEvent::ReleaseRateChanged { rate });
    }
}

fn apply_nuke(sim: &mut Simulation, events: &mut Vec<GameEvent>) {
    if sim.nuking {
        return;
    }
    sim.nuking = true;
    sim.recorder.record(sim.frame, Target::Global, EventKind::Nuke);
    events.push(GameEvent::NukeStarted);
    log::info!("Nuke started at frame {}", sim.frame);
}

/// Nuke: one new fuse per tick, in creation order. Costs no bomber budget.
fn light_next_fuse(sim: &mut Simulation) {
    let fuse = sim.tuning.bomb_fuse_ticks;
    if let Some(lem) = sim
        .lemmings
        .iter_mut()
        .find(|lem| lem.fuse.is_none() && skills::accepts(Skill::Bomber, lem.kind()))
    {
        lem.fuse = Some(fuse);
    }
}

/// Entrance scheduling
fn release(sim: &mut Simulation, events: &mut Vec<GameEvent>) {
    if sim.nuking || sim.remaining_to_release() == 0 || sim.entrances.is_empty() {
        return;
    }
    if sim.release_cooldown > 0 {
        sim.release_cooldown -= 1;
        return;
    }

    let entrance = sim.entrances[sim.next_entrance % sim.entrances.len()];
    sim.next_entrance = (sim.next_entrance + 1) % sim.entrances.len();
    let at = sim.level.objects[entrance].rect.bottom_center();

    let id = LemmingId(sim.next_id);
    sim.next_id += 1;
    sim.lemmings.push(Lemming::spawn(id, at));
    sim.counters.released += 1;
    sim.counters.out += 1;
    sim.release_cooldown = release_interval(sim.release_rate).saturating_sub(1);

    log::debug!("Frame {}: released lemming {} at {}", sim.frame, id.0, at);
    events.push(GameEvent::Released { id, at });
}

/// Every active lemming in creation order: fuse, transition, triggers
fn update_lemmings(sim: &mut Simulation, events: &mut Vec<GameEvent>) {
    let Simulation {
        level,
        tuning,
        lemmings,
        ..
    } = sim;

    for lem in lemmings.iter_mut() {
        let from = lem.pos();
        {
            let mut ctx = Ctx {
                terrain: &mut level.terrain,
                tuning,
                events: &mut *events,
            };
            behavior::burn_fuse(lem, &mut ctx);
            behavior::advance(lem, &mut ctx);
        }
        if !lem.is_terminal() {
            check_triggers(lem, from, &mut level.objects, &mut level.terrain, tuning, events);
        }
        lem.advance_animation();
    }
}

/// Object of `kind` whose trigger area covers the pixel
fn trigger_owner(mask: Mask, objects: &[LevelObject], kind: ObjectKind, lem: &Lemming) -> Option<usize> {
    if let Some(index) = mask.object() {
        if objects.get(index).is_some_and(|o| o.kind == kind) {
            return Some(index);
        }
    }
    // Overlapping trigger areas keep only the last owner id in the stencil
    objects
        .iter()
        .position(|o| o.kind == kind && o.trigger.contains(lem.pos()))
}

/// Move a lemming into a terminal action, tearing down a blocker field
fn finish(lem: &mut Lemming, action: Action, terrain: &mut Terrain, tuning: &Tuning) {
    if lem.kind() == ActionKind::Blocking {
        behavior::clear_blocker(lem, terrain, tuning);
    }
    lem.set_action(action);
}

/// Foot pixels covered this tick, in travel order.
///
/// A downward move sweeps the landing column so thin trigger areas cannot be
/// skipped at three pixels per tick; any other move only tests where it ended.
fn foot_path(from: IVec2, to: IVec2) -> impl Iterator<Item = IVec2> {
    let top = if to.y <= from.y {
        to.y
    } else if to.x == from.x {
        from.y + 1
    } else {
        from.y
    };
    (top..=to.y).map(move |y| IVec2::new(to.x, y))
}

/// Run trigger checks along the foot's path; the lemming stops at the first
/// pixel that finishes it
fn check_triggers(
    lem: &mut Lemming,
    from: IVec2,
    objects: &mut [LevelObject],
    terrain: &mut Terrain,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    let end = lem.pos();
    for at in foot_path(from, end) {
        if !terrain.stencil().get(at.x, at.y).intersects(Mask::TRIGGER) {
            continue;
        }
        lem.y = at.y;
        if trigger_at(lem, objects, terrain, tuning, events) {
            return;
        }
    }
    lem.y = end.y;
}

/// Apply the trigger under the lemming's foot; true if it finished the lemming
fn trigger_at(
    lem: &mut Lemming,
    objects: &mut [LevelObject],
    terrain: &mut Terrain,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> bool {
    let mask = terrain.stencil().get(lem.x, lem.y);
    let id = lem.id;

    if mask.contains(Mask::EXIT) {
        if let Some(object) = trigger_owner(mask, objects, ObjectKind::Exit, lem) {
            finish(lem, Action::Exited, terrain, tuning);
            log::debug!("Lemming {} exited", id.0);
            events.push(GameEvent::Exited { id, object });
            return true;
        }
    }
    if mask.contains(Mask::FIRE) {
        if let Some(object) = trigger_owner(mask, objects, ObjectKind::Fire, lem) {
            finish(lem, Action::Burning, terrain, tuning);
            events.push(GameEvent::Burned { id, object });
            return true;
        }
    }
    if mask.contains(Mask::TRAP) {
        if let Some(object) = trigger_owner(mask, objects, ObjectKind::Trap, lem) {
            let trap = &mut objects[object];
            if !trap.is_busy() {
                trap.state.busy_ticks = tuning.trap_busy_ticks;
                finish(lem, Action::Trapped, terrain, tuning);
                events.push(GameEvent::Trapped { id, object });
                return true;
            }
        }
    }
    // Floaters drift over water under the umbrella, climbers are on the wall
    if mask.contains(Mask::WATER)
        && !matches!(
            lem.kind(),
            ActionKind::Floating | ActionKind::Climbing | ActionKind::Hoisting
        )
    {
        finish(lem, Action::Drowning, terrain, tuning);
        events.push(GameEvent::Drowned { id, at: lem.pos() });
        return true;
    }
    false
}

/// Drop terminal lemmings from the active set and count them
fn remove_finished(sim: &mut Simulation) {
    let counters = &mut sim.counters;
    sim.lemmings.retain(|lem| {
        if !lem.is_terminal() {
            return true;
        }
        counters.out -= 1;
        if lem.kind() == ActionKind::Exited {
            counters.exited += 1;
        } else {
            counters.dead += 1;
        }
        false
    });
}

fn end_level(sim: &mut Simulation, reason: EndReason, events: &mut Vec<GameEvent>) {
    let outcome = if sim.counters.exited >= sim.level.params.to_rescue {
        Outcome::Won
    } else {
        Outcome::Lost
    };
    sim.phase = Phase::Ended { outcome, reason };
    log::info!(
        "Level `{}` ended at frame {}: {:?} ({:?}), saved {}/{}",
        sim.level.id,
        sim.frame,
        outcome,
        reason,
        sim.counters.exited,
        sim.level.params.to_rescue
    );
    events.push(GameEvent::LevelEnded { outcome, reason });
}

/// Level end: everyone accounted for, or the clock ran out
fn check_end(sim: &mut Simulation, events: &mut Vec<GameEvent>) {
    let nothing_left = sim.nuking || sim.remaining_to_release() == 0;
    if sim.counters.out == 0 && nothing_left {
        end_level(sim, EndReason::AllAccountedFor, events);
        return;
    }

    sim.time_remaining = sim.time_remaining.saturating_sub(1);
    if sim.time_remaining == 0 {
        events.push(GameEvent::TimeUp);
        end_level(sim, EndReason::TimeUp, events);
    }
}
