//! Deterministic simulation module
//!
//! All simulation logic lives here. This module must be pure and deterministic:
//! - Discrete ticks only
//! - Seeded RNG only (used at setup, never mid-run)
//! - Stable iteration order (spawn order; in-tick ordering is load-bearing)
//! - No rendering or platform dependencies

pub mod agent;
pub mod state;
pub mod tick;
pub mod wall;

pub use agent::{Agent, Status, StatusError};
pub use state::{AgentSprite, FrameSnapshot, SetupError, SimState, TickStats};
pub use tick::{SpeedDelta, TickInput, tick};
pub use wall::{Wall, WallBounce, WallError};
