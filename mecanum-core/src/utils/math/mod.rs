//! Math utilities for the mecanum vehicle.
//!
//! This module provides the direction-vector kinematics for four-wheel mecanum motion.

pub mod kinematics;
