//! Orientation codes as reported by the device. Faces are numbered 1 through 8, every other value
//! means no face is up.

use std::fmt::Display;

use crate::error::{Result, TrackerError};

/// One of the eight faces of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Face(u8);

impl Face {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;

    pub fn new(code: i64) -> Option<Face> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&code) {
            Some(Face(code as u8))
        } else {
            None
        }
    }

    /// Like [Face::new], for callers that treat an out of range code as a mistake.
    pub fn try_new(code: i64) -> Result<Face> {
        Face::new(code).ok_or(TrackerError::InvalidCode(code))
    }

    pub fn code(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Face> {
        (Self::MIN..=Self::MAX).map(Face)
    }
}

impl Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decoded orientation notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Idle,
    Face(Face),
}

impl Orientation {
    pub fn from_code(code: i64) -> Self {
        match Face::new(code) {
            Some(face) => Orientation::Face(face),
            None => Orientation::Idle,
        }
    }
}
