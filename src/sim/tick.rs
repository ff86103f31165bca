//! Discrete simulation tick
//!
//! Advances the whole population by one step. The agent iteration order is
//! spawn order and is semantically load-bearing: a later agent observes the
//! already-updated state of earlier agents within the same tick. The wall
//! pass is a single sequential sweep per agent, never iterated to a fixed
//! point, so a bounce off a later wall is not re-checked against earlier
//! walls. Both behaviors are preserved deliberately for parity with the
//! reference simulation.

use std::cmp::Ordering;

use log::info;
use serde::{Deserialize, Serialize};

use super::agent::{Agent, Status};
use super::state::{SimState, TickStats};

/// Speed adjustment requested by the input collaborator
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedDelta {
    pub agent_id: u32,
    pub delta: f32,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Applied before the sweep; the target's heading is re-normalized
    pub speed_delta: Option<SpeedDelta>,
}

/// Advance the simulation by one tick and return the aggregate counts
pub fn tick(state: &mut SimState, input: &TickInput) -> TickStats {
    if let Some(req) = input.speed_delta {
        state.adjust_speed(req.agent_id, req.delta);
    }

    state.time_ticks += 1;
    let now = state.time_ticks;
    let buffer_ticks = state.config.buffer_ticks;
    let agent_count = state.agents.len();

    for i in 0..agent_count {
        let mut candidate = state.agents[i].next_position();
        let radius = state.agents[i].radius();

        // Wall pass: one sweep in arena order, adopting each bounce as the
        // new candidate for the remaining walls.
        for wall in &state.walls {
            let bounce = wall.bounce_calc(state.agents[i].pos(), candidate, radius);
            if bounce.hit {
                candidate = bounce.pos;
                let heading = Agent::normalize_direction(bounce.direction_deg);
                state.agents[i].set_direction(heading);
            }
        }

        // Agent pass: cheap x-distance broad phase, Resolved peers skipped.
        for j in 0..agent_count {
            if j == i {
                continue;
            }
            let other_x = state.agents[j].pos().x;
            let combined = radius + state.agents[j].radius();
            if (other_x - candidate.x).abs() >= combined {
                continue;
            }
            if state.agents[j].status() == Status::Resolved {
                continue;
            }
            let resolved = state.agents[i].resolve_agent_bounce(candidate, &state.agents[j]);
            if let Some((halt_pos, reversed)) = resolved {
                candidate = halt_pos;
                state.agents[i].set_direction(reversed);
                transmit(state, i, j, now);
            }
        }

        state.agents[i].set_position(candidate);
        state.agents[i].expire_status(now, buffer_ticks);
    }

    let stats = state.stats();
    maybe_trigger_lockdown(state, &stats, now);
    stats
}

/// Symmetric contact transmission: when exactly one of the pair is Affected
/// and the other Neutral, the Neutral one becomes Affected this tick.
fn transmit(state: &mut SimState, i: usize, j: usize, now: u64) {
    match (state.agents[i].status(), state.agents[j].status()) {
        (Status::Affected, Status::Neutral) => state.agents[j].expose(now),
        (Status::Neutral, Status::Affected) => state.agents[i].expose(now),
        _ => {}
    }
}

/// One-shot aggregate policy: the first tick the Affected fraction exceeds
/// the threshold, permanently zero the speed of the leading fraction of the
/// population. The latch guarantees at most one firing per run.
fn maybe_trigger_lockdown(state: &mut SimState, stats: &TickStats, now: u64) {
    if state.lockdown_done || stats.population == 0 {
        return;
    }
    let affected_fraction = stats.affected as f32 / stats.population as f32;
    if affected_fraction <= state.config.lockdown_threshold {
        return;
    }

    // Snapshot-time rank on the horizontal coordinate, id as tiebreak; the
    // rank is not persisted and means nothing outside this trigger.
    let mut ranked: Vec<(f32, u32, usize)> = state
        .agents
        .iter()
        .enumerate()
        .map(|(idx, a)| (a.pos().x, a.id(), idx))
        .collect();
    ranked.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });

    let halt_count = (stats.population as f32 * state.config.lockdown_fraction) as usize;
    for &(_, _, idx) in ranked.iter().take(halt_count) {
        state.agents[idx].halt();
    }
    state.lockdown_done = true;
    info!(
        "lockdown at tick {now}: affected fraction {affected_fraction:.2}, halted {halt_count} of {}",
        stats.population
    );
}
