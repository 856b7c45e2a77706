//! Direction-vector kinematics for a four-wheel mecanum vehicle.
//!
//! Each named `Motion` maps to a fixed vector of per-wheel directions, indexed
//! front-left, front-right, rear-left, rear-right. The rollers of the four
//! wheels are mirrored so that combining forward, backward and stopped wheels
//! yields translation along eight headings plus rotation in place.
//!
//! ```text
//!   FL ---- FR
//!    |  ↑   |
//!    |      |
//!   RL ---- RR
//! ```
//!
//! # Example
//! ```rust
//! use mecanum_core::utils::math::kinematics::{Motion, WheelDirection};
//! let v = Motion::from_clock(3).unwrap().direction_vector();
//! assert_eq!(v[1], WheelDirection::Backward);
//! ```

use serde::{Deserialize, Serialize};

/// Rotation state of a single wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelDirection {
    #[default]
    Stopped,
    Forward,
    Backward,
}

impl WheelDirection {
    /// Map a sign to a direction: positive forward, negative backward, zero stopped.
    pub const fn from_sign(sign: i8) -> Self {
        match sign {
            0 => WheelDirection::Stopped,
            s if s > 0 => WheelDirection::Forward,
            _ => WheelDirection::Backward,
        }
    }

    pub const fn sign(self) -> i8 {
        match self {
            WheelDirection::Stopped => 0,
            WheelDirection::Forward => 1,
            WheelDirection::Backward => -1,
        }
    }

    pub const fn reversed(self) -> Self {
        match self {
            WheelDirection::Stopped => WheelDirection::Stopped,
            WheelDirection::Forward => WheelDirection::Backward,
            WheelDirection::Backward => WheelDirection::Forward,
        }
    }
}

/// Per-wheel directions ordered front-left, front-right, rear-left, rear-right.
pub type DirectionVector = [WheelDirection; 4];

const F: WheelDirection = WheelDirection::Forward;
const B: WheelDirection = WheelDirection::Backward;
const S: WheelDirection = WheelDirection::Stopped;

/// Named vehicle motions.
///
/// Translations are named by the clock position of their heading, 12 o'clock
/// being straight ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    Clock12,
    Clock6,
    Clock2,
    Clock10,
    Clock4,
    Clock8,
    Clock3,
    Clock9,
    Clockwise,
    /// Same wheel vector as `Clockwise`, kept as its own entry point.
    RotateClockwise,
    Anticlockwise,
    Stop,
}

impl Motion {
    pub const ALL: [Motion; 12] = [
        Motion::Clock12,
        Motion::Clock6,
        Motion::Clock2,
        Motion::Clock10,
        Motion::Clock4,
        Motion::Clock8,
        Motion::Clock3,
        Motion::Clock9,
        Motion::Clockwise,
        Motion::RotateClockwise,
        Motion::Anticlockwise,
        Motion::Stop,
    ];

    /// Wheel directions that produce this motion.
    pub const fn direction_vector(self) -> DirectionVector {
        match self {
            Motion::Clock12 => [F, F, F, F],
            Motion::Clock6 => [B, B, B, B],
            Motion::Clock2 => [F, S, S, F],
            Motion::Clock10 => [S, F, F, S],
            Motion::Clock4 => [S, B, B, S],
            Motion::Clock8 => [B, S, S, B],
            Motion::Clock3 => [F, B, B, F],
            Motion::Clock9 => [B, F, F, B],
            Motion::Clockwise | Motion::RotateClockwise => [F, B, F, B],
            Motion::Anticlockwise => [B, F, B, F],
            Motion::Stop => [S, S, S, S],
        }
    }

    /// Translation heading for a clock position, if the vehicle has one.
    pub const fn from_clock(hour: u8) -> Option<Self> {
        match hour {
            12 => Some(Motion::Clock12),
            2 => Some(Motion::Clock2),
            3 => Some(Motion::Clock3),
            4 => Some(Motion::Clock4),
            6 => Some(Motion::Clock6),
            8 => Some(Motion::Clock8),
            9 => Some(Motion::Clock9),
            10 => Some(Motion::Clock10),
            _ => None,
        }
    }

    pub const fn clock_position(self) -> Option<u8> {
        match self {
            Motion::Clock12 => Some(12),
            Motion::Clock2 => Some(2),
            Motion::Clock3 => Some(3),
            Motion::Clock4 => Some(4),
            Motion::Clock6 => Some(6),
            Motion::Clock8 => Some(8),
            Motion::Clock9 => Some(9),
            Motion::Clock10 => Some(10),
            _ => None,
        }
    }

    /// Motion whose wheel vector is the exact negation of this one.
    pub const fn opposite(self) -> Self {
        match self {
            Motion::Clock12 => Motion::Clock6,
            Motion::Clock6 => Motion::Clock12,
            Motion::Clock2 => Motion::Clock8,
            Motion::Clock8 => Motion::Clock2,
            Motion::Clock10 => Motion::Clock4,
            Motion::Clock4 => Motion::Clock10,
            Motion::Clock3 => Motion::Clock9,
            Motion::Clock9 => Motion::Clock3,
            Motion::Clockwise | Motion::RotateClockwise => Motion::Anticlockwise,
            Motion::Anticlockwise => Motion::Clockwise,
            Motion::Stop => Motion::Stop,
        }
    }
}
