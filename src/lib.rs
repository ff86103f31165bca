//! Contagion Sim - circular agents bouncing inside a walled arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (walls, agents, status spread, tick driver)
//! - `settings`: Run parameters with JSON load/save
//!
//! Rendering, input devices, and statistics displays are external
//! collaborators: the simulation hands out per-tick snapshots and aggregate
//! counts and accepts speed adjustments between ticks, but never draws.

pub mod settings;
pub mod sim;

pub use settings::SimConfig;

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Arena dimensions (pixels)
    pub const ARENA_WIDTH: f32 = 720.0;
    pub const ARENA_HEIGHT: f32 = 480.0;
    /// Inset of the boundary walls from the arena edge
    pub const WALL_INSET: f32 = 10.0;

    /// Agent defaults
    pub const AGENT_RADIUS: f32 = 8.0;
    pub const AGENT_SPEED: f32 = 0.6;
    /// Margin kept between spawn positions and the arena edge
    pub const SPAWN_MARGIN: f32 = 20.0;

    /// Ticks an agent stays Affected before it becomes Resolved
    pub const STATUS_BUFFER_TICKS: u64 = 600;
    /// Affected fraction of the population that triggers the one-shot lockdown
    pub const LOCKDOWN_THRESHOLD: f32 = 0.3;
    /// Fraction of the population halted by the lockdown
    pub const LOCKDOWN_FRACTION: f32 = 0.5;

    /// Placement retry cap per agent before setup fails
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 1000;
}

/// Unit vector for a heading given in degrees
#[inline]
pub fn heading_to_vec(deg: f32) -> Vec2 {
    let rad = deg.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Heading in degrees for a displacement vector (atan2, in (-180, 180])
#[inline]
pub fn vec_to_heading(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}
