use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

use crate::basic::{pid::PidGains, scaler::Scaler};
use crate::msg_define::Axis;

/// Angle stage gains of the published critically damped tuning.
pub const ANGLE_GAINS: PidGains = PidGains::new(9.244681, 0.0, 0.06382979);
/// Rate damping stage gains of the published critically damped tuning.
pub const VELOCITY_GAINS: PidGains = PidGains::new(33.7766, 0.0, 0.2553191);

#[derive(Debug)]
pub enum ParamError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    Invalid { name: &'static str, reason: &'static str },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::Io(e) => write!(f, "could not read parameter file: {e}"),
            ParamError::Parse(e) => write!(f, "bad parameter file: {e}"),
            ParamError::Serialize(e) => write!(f, "could not serialize parameters: {e}"),
            ParamError::Invalid { name, reason } => write!(f, "parameter {name} {reason}"),
        }
    }
}

impl std::error::Error for ParamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParamError::Io(e) => Some(e),
            ParamError::Parse(e) => Some(e),
            ParamError::Serialize(e) => Some(e),
            ParamError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ParamError {
    fn from(e: std::io::Error) -> Self {
        ParamError::Io(e)
    }
}

impl From<toml::de::Error> for ParamError {
    fn from(e: toml::de::Error) -> Self {
        ParamError::Parse(e)
    }
}

impl From<toml::ser::Error> for ParamError {
    fn from(e: toml::ser::Error) -> Self {
        ParamError::Serialize(e)
    }
}

/// Tuning of the ship rotation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipParams {
    /// rad/s, handed to the body once at init
    pub max_angular_speed: f32,
    /// degree per second of target motion for a unit turn input
    pub turn_speed_scale: f32,
    pub axis: Axis,
    /// seed the derivative memory with the first error (no first tick kick)
    pub seed_derivative: bool,
    /// angle tracking stage, error in degree
    pub angle: PidGains,
    /// rate damping stage, error in rad/s
    pub velocity: PidGains,
}

impl Default for ShipParams {
    fn default() -> Self {
        Self {
            max_angular_speed: 7.0,
            turn_speed_scale: 180.0,
            axis: Axis::Z,
            seed_derivative: false,
            angle: ANGLE_GAINS,
            velocity: VELOCITY_GAINS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyParams {
    pub inertia: f32,
    pub angular_drag: f32,
    /// degree about the controlled axis
    pub initial_angle: f32,
    /// rad/s about the controlled axis
    pub initial_angular_velocity: f32,
}

impl Default for BodyParams {
    fn default() -> Self {
        Self {
            inertia: 1.0,
            angular_drag: 0.05,
            initial_angle: 0.0,
            initial_angular_velocity: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    pub step_hz: f32,
    /// pace ticks against the wall clock instead of running lock-step
    pub realtime: bool,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            step_hz: 50.0,
            realtime: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotParams {
    pub ship: ShipParams,
    pub body: BodyParams,
    pub sim: SimParams,
    /// keyboard channel to turn input mapping
    pub input: Scaler,
}

impl Default for PilotParams {
    fn default() -> Self {
        Self {
            ship: ShipParams::default(),
            body: BodyParams::default(),
            sim: SimParams::default(),
            input: Scaler::rc_channel(),
        }
    }
}

fn check_positive(name: &'static str, val: f32) -> Result<(), ParamError> {
    if val.is_finite() && val > 0.0 {
        Ok(())
    } else {
        Err(ParamError::Invalid {
            name,
            reason: "must be a finite positive number",
        })
    }
}

fn check_finite(name: &'static str, val: f32) -> Result<(), ParamError> {
    if val.is_finite() {
        Ok(())
    } else {
        Err(ParamError::Invalid {
            name,
            reason: "must be finite",
        })
    }
}

fn check_gains(name: &'static str, gains: &PidGains) -> Result<(), ParamError> {
    if !gains.is_finite() {
        return Err(ParamError::Invalid {
            name,
            reason: "gains must be finite",
        });
    }
    if gains.has_negative() {
        tracing::warn!(?gains, "{name} has negative gains, the loop will push away from its target");
    }
    Ok(())
}

impl PilotParams {
    pub fn from_toml_str(s: &str) -> Result<Self, ParamError> {
        let params: PilotParams = toml::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    pub fn load<P>(filepath: P) -> Result<Self, ParamError>
    where
        P: AsRef<Path>,
    {
        let toml_str = std::fs::read_to_string(filepath.as_ref())?;
        let params = Self::from_toml_str(&toml_str)?;
        tracing::info!("parameters loaded from {}", filepath.as_ref().display());
        Ok(params)
    }

    pub fn to_toml_string(&self) -> Result<String, ParamError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        check_gains("ship.angle", &self.ship.angle)?;
        check_gains("ship.velocity", &self.ship.velocity)?;
        check_positive("ship.max_angular_speed", self.ship.max_angular_speed)?;
        check_finite("ship.turn_speed_scale", self.ship.turn_speed_scale)?;
        check_positive("body.inertia", self.body.inertia)?;
        if !(self.body.angular_drag.is_finite() && self.body.angular_drag >= 0.0) {
            return Err(ParamError::Invalid {
                name: "body.angular_drag",
                reason: "must be finite and not negative",
            });
        }
        check_finite("body.initial_angle", self.body.initial_angle)?;
        check_finite("body.initial_angular_velocity", self.body.initial_angular_velocity)?;
        check_positive("sim.step_hz", self.sim.step_hz)?;
        check_finite("input.scale_p", self.input.scale_p)?;
        check_finite("input.scale_n", self.input.scale_n)?;
        check_finite("input.offset", self.input.offset)?;
        check_finite("input.deadband", self.input.deadband)?;
        if !(self.input.min <= self.input.max) {
            return Err(ParamError::Invalid {
                name: "input",
                reason: "min must not exceed max",
            });
        }
        Ok(())
    }
}
