//! User-adjustable scene parameters.
//!
//! Rates arrive in UI units: an integer-ish value in `[-100, 100]` that maps
//! linearly onto `[-scale, scale]` radians per tick. Radii are accepted in
//! `[0, 10]`. Anything non-numeric or out of range is invalid input and is handled
//! according to the configured [`InvalidInputPolicy`]: by default it is dropped
//! and the previous value stays, with no buffer write and no restart.

use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use glam::Vec3;

use crate::error::{RenderError, Result};
use crate::light::RotateAxis;
use crate::scheduler::Axis;

/// Accepted range of a rate in UI units.
pub const RATE_INPUT_RANGE: RangeInclusive<f32> = -100.0..=100.0;
/// Accepted sphere radius range.
pub const RADIUS_RANGE: RangeInclusive<f32> = 0.0..=10.0;
/// Default per-axis rate, radians per tick.
pub const DEFAULT_RATE: f32 = 0.01;
pub const DEFAULT_RADIUS: f32 = 2.0;

/// Radians per tick at full UI deflection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RateScale {
    #[default]
    Fast,
    Slow,
}

impl RateScale {
    pub fn factor(self) -> f32 {
        match self {
            RateScale::Fast => 0.2,
            RateScale::Slow => 0.1,
        }
    }

    /// UI units to radians per tick.
    pub fn to_rate(self, input: f32) -> f32 {
        input / 100.0 * self.factor()
    }

    /// Radians per tick back to UI units.
    pub fn to_input(self, rate: f32) -> f32 {
        rate / self.factor() * 100.0
    }
}

impl FromStr for RateScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0.2" | "fast" => Ok(RateScale::Fast),
            "0.1" | "slow" => Ok(RateScale::Slow),
            other => Err(format!("unknown rate scale '{other}', expected 0.2 or 0.1")),
        }
    }
}

/// What happens to invalid user input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InvalidInputPolicy {
    /// Drop it and keep the previous value.
    #[default]
    Silent,
    /// Drop it, keep the previous value and log a warning.
    Warn,
    /// Fail with [`RenderError::InvalidInput`].
    Reject,
}

impl InvalidInputPolicy {
    /// Applies the policy to a rejected value. `Ok(false)` means "ignored".
    fn refuse(self, field: &'static str, value: impl fmt::Display) -> Result<bool> {
        match self {
            InvalidInputPolicy::Silent => Ok(false),
            InvalidInputPolicy::Warn => {
                log::warn!("ignoring invalid {field}: {value}");
                Ok(false)
            }
            InvalidInputPolicy::Reject => Err(RenderError::InvalidInput {
                field,
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for InvalidInputPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "silent" => Ok(InvalidInputPolicy::Silent),
            "warn" => Ok(InvalidInputPolicy::Warn),
            "reject" => Ok(InvalidInputPolicy::Reject),
            other => Err(format!(
                "unknown input policy '{other}', expected silent, warn or reject"
            )),
        }
    }
}

/// Converts a rate in UI units, or `None` if it is NaN or outside `[-100, 100]`.
pub fn rate_from_input(input: f32, scale: RateScale) -> Option<f32> {
    RATE_INPUT_RANGE
        .contains(&input)
        .then(|| scale.to_rate(input))
}

/// Parses and converts a rate typed as text.
pub fn parse_rate(input: &str, scale: RateScale) -> Option<f32> {
    input
        .trim()
        .parse::<f32>()
        .ok()
        .and_then(|value| rate_from_input(value, scale))
}

/// Rate from a click along a horizontal track, `fraction` in `[0, 1]` from the left.
///
/// The centre of the track is zero; the ends are full deflection either way.
pub fn rate_from_track(fraction: f32, scale: RateScale) -> Option<f32> {
    if !(0.0..=1.0).contains(&fraction) {
        return None;
    }
    rate_from_input(fraction * 200.0 - 100.0, scale)
}

/// Parses a sphere radius, or `None` if it is NaN or outside `[0, 10]`.
pub fn parse_radius(input: &str) -> Option<f32> {
    input
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|radius| RADIUS_RANGE.contains(radius))
}

/// Everything a scene can be parameterised with.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneParams {
    /// Radians per tick about each axis.
    pub rate: Vec3,
    pub rate_scale: RateScale,
    pub radius: f32,
    pub light_axis: RotateAxis,
    /// Image file used as the surface texture.
    pub material: Option<PathBuf>,
    pub policy: InvalidInputPolicy,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            rate: Vec3::splat(DEFAULT_RATE),
            rate_scale: RateScale::Fast,
            radius: DEFAULT_RADIUS,
            light_axis: RotateAxis::X,
            material: None,
            policy: InvalidInputPolicy::Silent,
        }
    }
}

impl SceneParams {
    /// Current rate of `axis` in UI units.
    pub fn rate_input(&self, axis: Axis) -> f32 {
        self.rate_scale.to_input(self.rate[axis.index()])
    }

    /// Sets one axis from a UI value. Returns whether the value was taken.
    pub fn set_rate_input(&mut self, axis: Axis, input: f32) -> Result<bool> {
        match rate_from_input(input, self.rate_scale) {
            Some(rate) => {
                self.rate[axis.index()] = rate;
                Ok(true)
            }
            None => self.policy.refuse(rate_field(axis), input),
        }
    }

    /// Like [`set_rate_input`](Self::set_rate_input) for text.
    pub fn set_rate_text(&mut self, axis: Axis, input: &str) -> Result<bool> {
        match parse_rate(input, self.rate_scale) {
            Some(rate) => {
                self.rate[axis.index()] = rate;
                Ok(true)
            }
            None => self.policy.refuse(rate_field(axis), input),
        }
    }

    /// Moves one axis by `delta` UI units. Stepping past the range is rejected.
    pub fn step_rate(&mut self, axis: Axis, delta: f32) -> Result<bool> {
        let stepped = (self.rate_input(axis) + delta).round();
        self.set_rate_input(axis, stepped)
    }

    /// Sets one axis from a click position along a track.
    pub fn set_rate_track(&mut self, axis: Axis, fraction: f32) -> Result<bool> {
        match rate_from_track(fraction, self.rate_scale) {
            Some(rate) => {
                self.rate[axis.index()] = rate;
                Ok(true)
            }
            None => self.policy.refuse(rate_field(axis), fraction),
        }
    }

    /// Sets the sphere radius.
    ///
    /// A zero radius is refused like out-of-range input: it would collapse the
    /// sphere and leave its normals undefined.
    pub fn set_radius(&mut self, radius: f32) -> Result<bool> {
        if radius > 0.0 && RADIUS_RANGE.contains(&radius) {
            self.radius = radius;
            Ok(true)
        } else {
            self.policy.refuse("radius", radius)
        }
    }

    pub fn set_radius_text(&mut self, input: &str) -> Result<bool> {
        match parse_radius(input) {
            Some(radius) => self.set_radius(radius),
            None => self.policy.refuse("radius", input),
        }
    }
}

fn rate_field(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "x rate",
        Axis::Y => "y rate",
        Axis::Z => "z rate",
    }
}
