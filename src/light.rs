//! Orbiting point light.
//!
//! The lit-sphere scene starts its light at the camera eye and swings it around
//! the origin by a fixed angle every tick, about one of the three world axes.

use glam::{Mat3, Vec3};
use std::fmt;
use std::str::FromStr;

/// Angle the light advances per tick, in radians.
pub const LIGHT_STEP: f32 = 0.03;

/// World axis the light orbits around.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RotateAxis {
    #[default]
    X,
    Y,
    Z,
}

impl RotateAxis {
    pub const ALL: [RotateAxis; 3] = [RotateAxis::X, RotateAxis::Y, RotateAxis::Z];

    /// Rotates `point` by `angle` radians about this axis through `origin`.
    pub fn rotate(self, point: Vec3, origin: Vec3, angle: f32) -> Vec3 {
        let rotation = match self {
            RotateAxis::X => Mat3::from_rotation_x(angle),
            RotateAxis::Y => Mat3::from_rotation_y(angle),
            RotateAxis::Z => Mat3::from_rotation_z(angle),
        };
        origin + rotation * (point - origin)
    }

    /// The next axis in X → Y → Z → X order.
    pub fn next(self) -> Self {
        match self {
            RotateAxis::X => RotateAxis::Y,
            RotateAxis::Y => RotateAxis::Z,
            RotateAxis::Z => RotateAxis::X,
        }
    }
}

impl fmt::Display for RotateAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RotateAxis::X => "x",
            RotateAxis::Y => "y",
            RotateAxis::Z => "z",
        };
        f.write_str(name)
    }
}

impl FromStr for RotateAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(RotateAxis::X),
            "y" => Ok(RotateAxis::Y),
            "z" => Ok(RotateAxis::Z),
            other => Err(format!("unknown axis '{other}', expected x, y or z")),
        }
    }
}

/// A light that advances around an axis once per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitLight {
    pub position: Vec3,
    pub axis: RotateAxis,
    pub origin: Vec3,
    pub step: f32,
}

impl OrbitLight {
    pub fn new(position: Vec3, axis: RotateAxis) -> Self {
        Self {
            position,
            axis,
            origin: Vec3::ZERO,
            step: LIGHT_STEP,
        }
    }

    /// Moves the light one step and returns its new position.
    pub fn advance(&mut self) -> Vec3 {
        self.position = self.axis.rotate(self.position, self.origin, self.step);
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn quarter_turns_about_each_axis() {
        let x = RotateAxis::X.rotate(Vec3::Y, Vec3::ZERO, FRAC_PI_2);
        assert!(x.abs_diff_eq(Vec3::Z, 1e-6));

        let y = RotateAxis::Y.rotate(Vec3::Z, Vec3::ZERO, FRAC_PI_2);
        assert!(y.abs_diff_eq(Vec3::X, 1e-6));

        let z = RotateAxis::Z.rotate(Vec3::X, Vec3::ZERO, FRAC_PI_2);
        assert!(z.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn rotation_about_offset_origin() {
        let origin = Vec3::new(1.0, 0.0, 0.0);
        let moved = RotateAxis::Z.rotate(Vec3::new(2.0, 0.0, 0.0), origin, FRAC_PI_2);
        assert!(moved.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn orbit_preserves_distance() {
        let mut light = OrbitLight::new(Vec3::new(2.0, 2.0, 4.0), RotateAxis::Y);
        let radius = light.position.length();
        for _ in 0..500 {
            light.advance();
        }
        assert!((light.position.length() - radius).abs() < 1e-3);
    }

    #[test]
    fn parses_axis_names() {
        assert_eq!("Y".parse::<RotateAxis>(), Ok(RotateAxis::Y));
        assert_eq!(" z ".parse::<RotateAxis>(), Ok(RotateAxis::Z));
        assert!("w".parse::<RotateAxis>().is_err());
        assert_eq!(RotateAxis::Z.next(), RotateAxis::X);
    }
}
