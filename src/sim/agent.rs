//! Mobile agents and their contact-transmitted status
//!
//! An agent is a circle with a heading in degrees and a per-tick speed.
//! Status advances monotonically Neutral -> Affected -> Resolved and never
//! regresses; Resolved agents keep moving but no longer catch or transmit.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{AGENT_RADIUS, AGENT_SPEED};
use crate::heading_to_vec;

/// Rejected status transitions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("status cannot regress from {from:?} to {to:?}")]
    InvalidTransition { from: Status, to: Status },
}

/// Contact-transmitted status marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Neutral,
    Affected,
    /// Terminal: neither catches nor transmits
    Resolved,
}

impl Status {
    fn rank(self) -> u8 {
        match self {
            Status::Neutral => 0,
            Status::Affected => 1,
            Status::Resolved => 2,
        }
    }

    /// Draw color for the render snapshot
    pub fn color(self) -> [u8; 3] {
        match self {
            Status::Neutral => [128, 128, 128],
            Status::Affected => [200, 40, 40],
            Status::Resolved => [60, 160, 60],
        }
    }
}

/// A moving circular agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    id: u32,
    pos: Vec2,
    /// Heading in degrees, held in [0, 360)
    direction_deg: f32,
    /// Displacement per tick
    speed: f32,
    radius: f32,
    status: Status,
    /// Tick the agent entered Affected
    affected_at: Option<u64>,
    /// Tick the agent entered Resolved
    resolved_at: Option<u64>,
}

/// Agents are the same agent iff their ids match
impl PartialEq for Agent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Agent {}

impl Agent {
    pub fn new(id: u32, pos: Vec2, direction_deg: f32) -> Self {
        Self::with_kinematics(id, pos, direction_deg, AGENT_SPEED, AGENT_RADIUS)
    }

    pub fn with_kinematics(id: u32, pos: Vec2, direction_deg: f32, speed: f32, radius: f32) -> Self {
        Self {
            id,
            pos,
            direction_deg: Self::normalize_direction(direction_deg),
            speed,
            radius,
            status: Status::Neutral,
            affected_at: None,
            resolved_at: None,
        }
    }

    /// Apply one wrap-around correction to bring an angle into [0, 360)
    ///
    /// A single subtraction/addition of 360 only: inputs more than one full
    /// period out of range stay unnormalized. Every angle the simulation
    /// produces is at most one period out.
    pub fn normalize_direction(mut angle: f32) -> f32 {
        if angle >= 360.0 {
            angle -= 360.0;
        } else if angle < 0.0 {
            angle += 360.0;
        }
        angle
    }

    /// Re-normalize the stored heading in place
    pub fn normalize_heading(&mut self) {
        self.direction_deg = Self::normalize_direction(self.direction_deg);
    }

    /// Project the position one tick ahead along the current heading
    pub fn next_position(&self) -> Vec2 {
        self.pos + self.speed * heading_to_vec(self.direction_deg)
    }

    /// Strict overlap test at the agents' current positions
    pub fn overlaps(&self, other: &Agent) -> bool {
        self.overlaps_at(self.pos, other)
    }

    /// Strict overlap test with this agent hypothetically at `pos`
    pub fn overlaps_at(&self, pos: Vec2, other: &Agent) -> bool {
        pos.distance(other.pos) < self.radius + other.radius
    }

    /// Halt-and-reverse resolution against another agent
    ///
    /// If moving to `candidate` would overlap `other`, the agent stays at
    /// its pre-move position and its heading flips by 180 degrees. This is
    /// not a reflection about the contact normal.
    pub fn resolve_agent_bounce(&self, candidate: Vec2, other: &Agent) -> Option<(Vec2, f32)> {
        if self.overlaps_at(candidate, other) {
            let reversed = Self::normalize_direction(self.direction_deg + 180.0);
            Some((self.pos, reversed))
        } else {
            None
        }
    }

    /// Advance the status, recording the entry tick
    ///
    /// Re-asserting the current status is a no-op; any regression is
    /// rejected.
    pub fn advance_status(&mut self, to: Status, now: u64) -> Result<(), StatusError> {
        if to.rank() < self.status.rank() {
            return Err(StatusError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        if to == self.status {
            return Ok(());
        }
        match to {
            Status::Affected => self.affected_at = Some(now),
            Status::Resolved => self.resolved_at = Some(now),
            Status::Neutral => {}
        }
        self.status = to;
        Ok(())
    }

    /// Contact exposure: a Neutral agent becomes Affected, stamped with the
    /// current tick; Affected and Resolved agents are unchanged
    pub fn expose(&mut self, now: u64) {
        if self.status == Status::Neutral {
            self.status = Status::Affected;
            self.affected_at = Some(now);
        }
    }

    /// Expire an Affected status once it has lasted `buffer_ticks`
    pub fn expire_status(&mut self, now: u64, buffer_ticks: u64) {
        if self.status != Status::Affected {
            return;
        }
        if let Some(entered) = self.affected_at {
            if now.saturating_sub(entered) >= buffer_ticks {
                self.status = Status::Resolved;
                self.resolved_at = Some(now);
            }
        }
    }

    /// Input-collaborator seam: apply a speed delta, flooring at zero
    pub fn adjust_speed(&mut self, delta: f32) {
        self.speed = (self.speed + delta).max(0.0);
    }

    pub fn halt(&mut self) {
        self.speed = 0.0;
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn direction(&self) -> f32 {
        self.direction_deg
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    #[inline]
    pub fn affected_at(&self) -> Option<u64> {
        self.affected_at
    }

    #[inline]
    pub fn resolved_at(&self) -> Option<u64> {
        self.resolved_at
    }

    pub fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    /// Set the heading verbatim; callers normalize afterwards when needed
    pub fn set_direction(&mut self, direction_deg: f32) {
        self.direction_deg = direction_deg;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_equality_is_id_based() {
        let a = Agent::new(7, Vec2::new(0.0, 0.0), 0.0);
        let b = Agent::new(7, Vec2::new(50.0, 50.0), 180.0);
        let c = Agent::new(8, Vec2::new(0.0, 0.0), 0.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_overlap_strictness() {
        let a = Agent::new(1, Vec2::new(0.0, 0.0), 0.0);
        let near = Agent::new(2, Vec2::new(15.9, 0.0), 0.0);
        let touching = Agent::new(3, Vec2::new(16.0, 0.0), 0.0);
        let far = Agent::new(4, Vec2::new(20.0, 0.0), 0.0);
        assert!(a.overlaps(&near));
        assert!(!a.overlaps(&touching));
        assert!(!a.overlaps(&far));
    }

    #[test]
    fn test_next_position_is_pure() {
        let a = Agent::new(1, Vec2::new(10.0, 10.0), 0.0);
        let next = a.next_position();
        assert!((next.x - 10.6).abs() < 1e-5);
        assert!((next.y - 10.0).abs() < 1e-5);
        assert_eq!(a.pos(), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_halt_and_reverse() {
        let a = Agent::new(1, Vec2::new(0.0, 0.0), 45.0);
        let other = Agent::new(2, Vec2::new(10.0, 0.0), 0.0);
        let (pos, dir) = a
            .resolve_agent_bounce(Vec2::new(5.0, 0.0), &other)
            .expect("overlap at candidate");
        assert_eq!(pos, Vec2::new(0.0, 0.0));
        assert!((dir - 225.0).abs() < 1e-5);
        // No overlap at the candidate: no correction
        assert!(
            a.resolve_agent_bounce(Vec2::new(-10.0, 0.0), &other)
                .is_none()
        );
    }

    #[test]
    fn test_single_correction_limitation() {
        // Documented: one correction only, two periods out stays out
        assert_eq!(Agent::normalize_direction(800.0), 440.0);
        assert_eq!(Agent::normalize_direction(-400.0), -40.0);
    }

    #[test]
    fn test_status_advances_and_stamps() {
        let mut a = Agent::new(1, Vec2::ZERO, 0.0);
        a.advance_status(Status::Affected, 12).unwrap();
        assert_eq!(a.status(), Status::Affected);
        assert_eq!(a.affected_at(), Some(12));
        a.advance_status(Status::Resolved, 40).unwrap();
        assert_eq!(a.resolved_at(), Some(40));
    }

    #[test]
    fn test_status_never_regresses() {
        let mut a = Agent::new(1, Vec2::ZERO, 0.0);
        a.advance_status(Status::Resolved, 5).unwrap();
        let err = a.advance_status(Status::Affected, 6).unwrap_err();
        assert_eq!(
            err,
            StatusError::InvalidTransition {
                from: Status::Resolved,
                to: Status::Affected,
            }
        );
        assert_eq!(a.status(), Status::Resolved);

        let mut b = Agent::new(2, Vec2::ZERO, 0.0);
        b.advance_status(Status::Affected, 1).unwrap();
        assert!(b.advance_status(Status::Neutral, 2).is_err());
    }

    #[test]
    fn test_expose_only_affects_neutral() {
        let mut a = Agent::new(1, Vec2::ZERO, 0.0);
        a.expose(3);
        assert_eq!(a.status(), Status::Affected);
        assert_eq!(a.affected_at(), Some(3));
        // Re-exposure keeps the original stamp
        a.expose(9);
        assert_eq!(a.affected_at(), Some(3));
        a.advance_status(Status::Resolved, 20).unwrap();
        a.expose(30);
        assert_eq!(a.status(), Status::Resolved);
    }

    #[test]
    fn test_expire_status_after_buffer() {
        let mut a = Agent::new(1, Vec2::ZERO, 0.0);
        a.expose(10);
        a.expire_status(14, 5);
        assert_eq!(a.status(), Status::Affected);
        a.expire_status(15, 5);
        assert_eq!(a.status(), Status::Resolved);
        assert_eq!(a.resolved_at(), Some(15));
    }

    #[test]
    fn test_adjust_speed_floors_at_zero() {
        let mut a = Agent::new(1, Vec2::ZERO, 0.0);
        a.adjust_speed(-10.0);
        assert_eq!(a.speed(), 0.0);
        a.adjust_speed(0.1);
        assert!((a.speed() - 0.1).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_normalized_direction_in_range(tenths in -3599i32..7200) {
            // Tenth-degree lattice over one period out of range on both sides
            let n = Agent::normalize_direction(tenths as f32 / 10.0);
            prop_assert!((0.0..360.0).contains(&n));
        }
    }
}
