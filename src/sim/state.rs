//! Simulation state and setup
//!
//! `SimState` is the explicit context threaded through every tick: the
//! ordered wall set (read-only after setup), the agent population in spawn
//! order, the tick counter, and the lockdown latch. Construction builds the
//! arena and places the population; there is no teardown beyond drop.

use glam::Vec2;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::agent::{Agent, Status};
use super::wall::{Wall, WallError};
use crate::settings::SimConfig;

/// Setup-time failures; all fatal before the run starts
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("could not place agent {agent} without overlap after {attempts} attempts")]
    PlacementInfeasible { agent: u32, attempts: u32 },
    #[error(transparent)]
    Wall(#[from] WallError),
}

/// Aggregate per-tick counts for the statistics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStats {
    pub affected: usize,
    pub resolved: usize,
    pub population: usize,
}

/// One drawable agent for the render collaborator
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AgentSprite {
    pub pos: Vec2,
    pub radius: f32,
    pub color: [u8; 3],
}

/// Per-tick drawable snapshot; the core never draws it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub agents: Vec<AgentSprite>,
    pub walls: Vec<(Vec2, Vec2)>,
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    /// Run configuration, fixed after setup
    pub config: SimConfig,
    /// Arena boundary, in enumeration order (order is load-bearing)
    pub walls: Vec<Wall>,
    /// Population in spawn order (order is load-bearing)
    pub agents: Vec<Agent>,
    /// Tick counter
    pub time_ticks: u64,
    /// Latch for the one-shot lockdown policy
    pub lockdown_done: bool,
}

impl SimState {
    /// Build the rectangular reference arena and place the population
    pub fn new(config: SimConfig) -> Result<Self, SetupError> {
        let inset = config.wall_inset;
        let (w, h) = (config.width, config.height);
        let walls = vec![
            Wall::new(Vec2::new(inset, inset), Vec2::new(w - inset, inset))?,
            Wall::new(Vec2::new(w - inset, inset), Vec2::new(w - inset, h - inset))?,
            Wall::new(Vec2::new(w - inset, h - inset), Vec2::new(inset, h - inset))?,
            Wall::new(Vec2::new(inset, h - inset), Vec2::new(inset, inset))?,
        ];
        Self::with_arena(config, walls)
    }

    /// Arena collaborator seam: caller supplies the ordered wall list
    pub fn with_arena(config: SimConfig, walls: Vec<Wall>) -> Result<Self, SetupError> {
        validate_config(&config)?;
        let agents = place_population(&config)?;
        info!(
            "setup complete: {} walls, {} agents, seed {}",
            walls.len(),
            agents.len(),
            config.seed
        );
        Ok(Self {
            config,
            walls,
            agents,
            time_ticks: 0,
            lockdown_done: false,
        })
    }

    /// Aggregate counts, recomputed by scanning the full population
    pub fn stats(&self) -> TickStats {
        let mut affected = 0;
        let mut resolved = 0;
        for agent in &self.agents {
            match agent.status() {
                Status::Affected => affected += 1,
                Status::Resolved => resolved += 1,
                Status::Neutral => {}
            }
        }
        TickStats {
            affected,
            resolved,
            population: self.agents.len(),
        }
    }

    /// Drawable snapshot for the render collaborator
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            agents: self
                .agents
                .iter()
                .map(|a| AgentSprite {
                    pos: a.pos(),
                    radius: a.radius(),
                    color: a.status().color(),
                })
                .collect(),
            walls: self.walls.iter().map(|w| (w.p1(), w.p2())).collect(),
        }
    }

    pub fn agent_by_id(&self, id: u32) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    /// Input collaborator seam: apply a speed delta to one agent between
    /// ticks, re-normalizing its heading. Returns false for an unknown id.
    pub fn adjust_speed(&mut self, id: u32, delta: f32) -> bool {
        match self.agents.iter_mut().find(|a| a.id() == id) {
            Some(agent) => {
                agent.adjust_speed(delta);
                agent.normalize_heading();
                true
            }
            None => false,
        }
    }
}

fn validate_config(config: &SimConfig) -> Result<(), SetupError> {
    let invalid = |msg: &str| Err(SetupError::InvalidConfig(msg.to_string()));
    if config.width <= 0.0 || config.height <= 0.0 {
        return invalid("arena dimensions must be positive");
    }
    if config.wall_inset < 0.0 || 2.0 * config.wall_inset >= config.width.min(config.height) {
        return invalid("wall inset must leave a non-empty arena");
    }
    if config.population == 0 {
        return invalid("population must be at least 1");
    }
    if config.initial_affected > config.population {
        return invalid("initial_affected exceeds population");
    }
    if config.agent_radius <= 0.0 {
        return invalid("agent radius must be positive");
    }
    if config.agent_speed < 0.0 {
        return invalid("agent speed must be non-negative");
    }
    if config.spawn_margin as i32 >= (config.width - config.spawn_margin) as i32
        || config.spawn_margin as i32 >= (config.height - config.spawn_margin) as i32
    {
        return invalid("spawn margin leaves no room to place agents");
    }
    if !(0.0..=1.0).contains(&config.lockdown_threshold) {
        return invalid("lockdown threshold must be in [0, 1]");
    }
    if !(0.0..=1.0).contains(&config.lockdown_fraction) {
        return invalid("lockdown fraction must be in [0, 1]");
    }
    if config.max_placement_attempts == 0 {
        return invalid("placement attempt cap must be at least 1");
    }
    Ok(())
}

/// Rejection-sampled placement: draw position and heading until the new
/// agent overlaps nobody already placed, bounded per agent.
///
/// The leader agent is pinned at its configured spawn; the rest draw from
/// the seeded RNG on the integer lattice inside the spawn bounds. The first
/// `initial_affected` agents in spawn order start Affected at tick 0.
fn place_population(config: &SimConfig) -> Result<Vec<Agent>, SetupError> {
    let mut rng = Pcg32::seed_from_u64(config.seed);
    let mut agents: Vec<Agent> = Vec::with_capacity(config.population as usize);

    agents.push(Agent::with_kinematics(
        1,
        config.leader_spawn,
        config.leader_direction,
        config.agent_speed,
        config.agent_radius,
    ));

    let x_range = config.spawn_margin as i32..(config.width - config.spawn_margin) as i32;
    let y_range = config.spawn_margin as i32..(config.height - config.spawn_margin) as i32;

    for n in 0..config.population.saturating_sub(1) {
        let id = n + 10;
        let mut placed = None;
        for _ in 0..config.max_placement_attempts {
            let pos = Vec2::new(
                rng.random_range(x_range.clone()) as f32,
                rng.random_range(y_range.clone()) as f32,
            );
            let direction = rng.random_range(0..360) as f32;
            let candidate =
                Agent::with_kinematics(id, pos, direction, config.agent_speed, config.agent_radius);
            if agents.iter().all(|a| !a.overlaps(&candidate)) {
                placed = Some(candidate);
                break;
            }
        }
        match placed {
            Some(agent) => agents.push(agent),
            None => {
                return Err(SetupError::PlacementInfeasible {
                    agent: id,
                    attempts: config.max_placement_attempts,
                });
            }
        }
    }

    for agent in agents.iter_mut().take(config.initial_affected as usize) {
        // Seeding cannot regress a fresh Neutral agent
        agent.expose(0);
    }

    debug!("placed {} agents", agents.len());
    Ok(agents)
}
