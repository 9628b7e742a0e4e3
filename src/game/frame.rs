//! Canonical coordinate frame
//!
//! All decision logic assumes the own team attacks toward +X. When the
//! server assigns the right side, positions are mirrored through the center
//! spot and directions rotated by 180 degrees. Conversion happens in exactly
//! two places: on perception ingestion and on command emission.

use crate::net::protocol::Side;

use super::geometry::{normalize_dir, Vec2};

/// Maps between the server's raw frame and the canonical frame of one team
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateFrame {
    side: Side,
}

impl CoordinateFrame {
    pub fn new(side: Side) -> Self {
        Self { side }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Raw server position to canonical position
    pub fn to_canonical_pos(&self, raw: Vec2) -> Vec2 {
        match self.side {
            Side::Left => raw,
            Side::Right => -raw,
        }
    }

    /// Raw server direction (degrees) to canonical direction
    pub fn to_canonical_dir(&self, raw: f64) -> f64 {
        match self.side {
            Side::Left => raw,
            Side::Right => normalize_dir(raw + 180.0),
        }
    }

    /// Canonical position back to the raw server frame
    pub fn to_raw_pos(&self, pos: Vec2) -> Vec2 {
        // Point reflection is its own inverse
        self.to_canonical_pos(pos)
    }

    /// Canonical direction back to the raw server frame
    pub fn to_raw_dir(&self, dir: f64) -> f64 {
        self.to_canonical_dir(dir)
    }
}
