//! Run parameters
//!
//! Everything the arena/setup collaborator supplies: arena geometry,
//! population and placement bounds, status timing, and the lockdown policy.
//! Persisted as JSON next to the binary rather than inside the core.

use std::fs;
use std::io;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Simulation run parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Arena dimensions
    pub width: f32,
    pub height: f32,
    /// Inset of the boundary walls from the arena edge
    pub wall_inset: f32,

    /// Total population, leader included
    pub population: u32,
    /// Agents seeded as Affected at tick 0, in spawn order
    pub initial_affected: u32,
    pub agent_radius: f32,
    /// Displacement per tick
    pub agent_speed: f32,
    /// Margin between random spawn positions and the arena edge
    pub spawn_margin: f32,
    /// The leader agent's fixed spawn and heading
    pub leader_spawn: Vec2,
    pub leader_direction: f32,

    /// Ticks an agent stays Affected before resolving
    pub buffer_ticks: u64,
    /// Affected fraction that triggers the one-shot lockdown
    pub lockdown_threshold: f32,
    /// Fraction of the population halted by the lockdown
    pub lockdown_fraction: f32,

    /// Placement retry cap per agent
    pub max_placement_attempts: u32,
    /// RNG seed for placement
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            wall_inset: WALL_INSET,
            population: 21,
            initial_affected: 1,
            agent_radius: AGENT_RADIUS,
            agent_speed: AGENT_SPEED,
            spawn_margin: SPAWN_MARGIN,
            leader_spawn: Vec2::new(20.0, 30.0),
            leader_direction: 2.0,
            buffer_ticks: STATUS_BUFFER_TICKS,
            lockdown_threshold: LOCKDOWN_THRESHOLD,
            lockdown_fraction: LOCKDOWN_FRACTION,
            max_placement_attempts: MAX_PLACEMENT_ATTEMPTS,
            seed: 0,
        }
    }
}

impl SimConfig {
    /// Load a config file, falling back to defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    log::info!("loaded config from {}", path.display());
                    config
                }
                Err(err) => {
                    log::warn!("config {} unreadable ({err}), using defaults", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("config {} missing ({err}), using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the config as pretty-printed JSON
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)
    }
}
